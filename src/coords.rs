//! Coordinate structure used to reference specific locations within lexer input
#![allow(clippy::len_without_is_empty)]

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::ops::Sub;

/// A [Coords] represents a single location within the lexer input
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Coords {
    /// The absolute character position
    pub absolute: usize,
    /// The row position, starting at 1
    pub line: usize,
    /// The column position, starting at 1 for the first character of a line
    pub column: usize,
}

impl Coords {
    /// Produce the coordinates of the character that follows `c` at the current position
    pub fn advance(&self, c: char) -> Coords {
        if c == '\n' {
            Coords {
                absolute: self.absolute + 1,
                line: self.line + 1,
                column: 0,
            }
        } else {
            Coords {
                absolute: self.absolute + 1,
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl Display for Coords {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[abs: {}, line: {}, column: {}]",
            self.absolute, self.line, self.column
        )
    }
}

impl Default for Coords {
    /// The default set of coordinates are positioned just before the first character of the
    /// first row
    fn default() -> Self {
        Coords {
            absolute: 0,
            line: 1,
            column: 0,
        }
    }
}

impl PartialOrd<Self> for Coords {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coords {
    fn cmp(&self, other: &Self) -> Ordering {
        self.absolute.cmp(&other.absolute)
    }
}

impl Sub for Coords {
    type Output = usize;

    /// The distance between two sets of coordinates, in characters
    fn sub(self, rhs: Self) -> Self::Output {
        self.absolute.abs_diff(rhs.absolute)
    }
}

/// A [Span] represents a linear interval within the lexer input, between two different [Coords]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd)]
pub struct Span {
    /// Start [Coords] for the span
    pub start: Coords,
    /// End [Coords] for the span
    pub end: Coords,
}

impl Span {
    /// Get the length of the span, minimum is 1
    pub fn len(&self) -> usize {
        match self.start.cmp(&self.end) {
            Ordering::Less => self.end - self.start + 1,
            Ordering::Equal => 1,
            Ordering::Greater => self.start - self.end + 1,
        }
    }

    /// A span which covers both `self` and `other`
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "start: {}, end: {}, length: {}",
            self.start,
            self.end,
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Coords, Span};

    #[test]
    fn should_advance_columns_and_lines() {
        let start = Coords::default();
        let a = start.advance('a');
        assert_eq!(a.absolute, 1);
        assert_eq!(a.column, 1);
        let nl = a.advance('\n');
        assert_eq!(nl.line, 2);
        assert_eq!(nl.column, 0);
        let b = nl.advance('b');
        assert_eq!((b.line, b.column, b.absolute), (2, 1, 3));
    }

    #[test]
    fn single_position_spans_should_have_length_one() {
        let c = Coords::default().advance('{');
        let span = Span { start: c, end: c };
        assert_eq!(span.len(), 1);
    }

    #[test]
    fn merged_spans_should_cover_both_inputs() {
        let a = Coords::default().advance('[');
        let b = a.advance('1').advance(']');
        let merged = Span { start: a, end: a }.merge(&Span { start: b, end: b });
        assert_eq!(merged.start, a);
        assert_eq!(merged.end, b);
        assert_eq!(merged.len(), 3);
    }
}
