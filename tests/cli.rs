use assert_cmd::Command;
use predicates::prelude::*;

fn json_shape() -> Command {
    let mut cmd = Command::cargo_bin("json-shape").unwrap();
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn should_print_a_decoded_person() {
    json_shape()
        .args(["--shape", "person", "fixtures/json/valid/person.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: \"arief\""))
        .stdout(predicate::str::contains("balance: 200.0"))
        .stdout(predicate::str::contains("degree: \"Y\""));
}

#[test]
fn should_print_dynamic_values_by_default() {
    json_shape()
        .arg("fixtures/json/valid/array_same_type.json")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Array("))
        .stdout(predicate::str::contains("\"test\"").count(4));
}

#[test]
fn decode_failures_should_be_logged_and_the_default_printed() {
    json_shape()
        .args(["--shape", "scores", "fixtures/json/valid/person.json", "--strict"])
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to decode input"))
        .stdout(predicate::str::contains("values: []"));
}

#[test]
fn parse_failures_should_be_logged() {
    json_shape()
        .arg("fixtures/json/invalid/missing_value.json")
        .assert()
        .success()
        .stderr(predicate::str::contains("failed to parse input"))
        .stdout(predicate::str::contains("Null"));
}

#[test]
fn missing_files_should_be_fatal() {
    json_shape()
        .arg("fixtures/json/does_not_exist.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn unknown_shapes_should_be_rejected() {
    json_shape()
        .args(["--shape", "nope", "fixtures/json/valid/person.json"])
        .assert()
        .failure();
}
