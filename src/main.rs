//! `json-shape` CLI: decode a JSON file into one of a few sample destinations and print the
//! result.
//!
//! ```sh
//! # Decode into a dynamic value
//! json-shape fixtures/json/valid/map_complete.json
//!
//! # Decode into the Person record, rejecting unknown and missing fields
//! json-shape --shape person --strict fixtures/json/valid/person.json
//! ```
//!
//! A decode failure is logged, and the destination is printed anyway. Decoding never partially
//! populates a destination, so on failure that's the untouched default.

use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use json_shape::decode_record;
use json_shape::lexer::Lexer;
use json_shape::parser::Parser;
use json_shape::{Decode, DecoderOptions, JsonValue};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Education {
    institution_name: String,
    degree: String,
}

decode_record!(Education {
    institution_name: String => "institution_name",
    degree: String => "degree",
});

#[derive(Debug, Default)]
struct Person {
    name: String,
    age: i64,
    balance: f64,
    education: Education,
    scores: Vec<i64>,
}

decode_record!(Person {
    name: String => "name",
    age: i64 => "age",
    balance: f64 => "balance",
    education: Education => "current_education",
    scores: Vec<i64> => "scores",
});

#[derive(Debug, Default)]
struct Scores {
    values: Vec<f64>,
}

decode_record!(Scores {
    values: Vec<f64> => "values",
});

/// The destination to decode into
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Any JSON value
    Dynamic,
    /// A person record, with a nested education record and integer scores
    Person,
    /// A record holding a list of float values
    Scores,
}

#[derive(ClapParser)]
#[command(
    name = "json-shape",
    version,
    about = "Decode a JSON file into a typed destination"
)]
struct Cli {
    /// The JSON file to decode
    file: PathBuf,

    /// Destination shape
    #[arg(short, long, value_enum, default_value_t = Shape::Dynamic)]
    shape: Shape,

    /// Fail on unknown object keys and on record fields missing from the document
    #[arg(long)]
    strict: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let input = fs::read(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    debug!(bytes = input.len(), file = %cli.file.display(), "read input");

    let options = if cli.strict {
        DecoderOptions::strict()
    } else {
        DecoderOptions::default()
    };
    let mut parser = Parser::new(Lexer::from_bytes(&input)).with_options(options);
    if let Err(err) = parser.process() {
        error!(%err, "failed to parse input");
    }

    match cli.shape {
        Shape::Dynamic => decode_and_print::<JsonValue>(&parser),
        Shape::Person => decode_and_print::<Person>(&parser),
        Shape::Scores => decode_and_print::<Scores>(&parser),
    }
    Ok(())
}

/// Decode into a fresh `T`, logging any failure, and print whatever the destination holds
fn decode_and_print<T: Decode + Default + Debug>(parser: &Parser) {
    let mut destination = T::default();
    if parser.root().is_some() {
        if let Err(err) = parser.decode(&mut destination) {
            error!(%err, "failed to decode input");
        }
    }
    println!("{:#?}", destination);
}
