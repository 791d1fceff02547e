//! Helpers for validating JSON documents against the frozen contracts in
//! `contracts/`.

use std::path::PathBuf;

use jsonschema::JSONSchema;
use serde_json::Value;

/// Absolute path of a file below the workspace `contracts/` directory.
pub fn contract_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../contracts")
        .join(relative)
}

/// Loads and parses one contract JSON file.
///
/// # Panics
/// Panics when the file is missing or not JSON; callers are tests.
pub fn load_json(relative: &str) -> Value {
    let path = contract_path(relative);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|error| panic!("{} should be readable: {error}", path.display()));
    serde_json::from_str(&raw)
        .unwrap_or_else(|error| panic!("{} should be valid json: {error}", path.display()))
}

/// Compiles a contract schema.
///
/// # Panics
/// Panics when the schema does not compile.
pub fn compile_validator(relative: &str) -> JSONSchema {
    let schema = load_json(relative);
    JSONSchema::compile(&schema).expect("schema should compile")
}
