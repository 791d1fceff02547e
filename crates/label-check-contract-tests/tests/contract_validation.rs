//! Validates fixtures and live payloads against frozen JSON schemas.

use label_check_contract_tests::{compile_validator, load_json};
use label_check_core::{FieldStore, SubmissionPayload, TextField, VolumeUnit};
use label_check_verdict::classify_response;

const REQUEST_SCHEMA: &str = "submit-label-request.schema.json";
const RESPONSE_SCHEMA: &str = "submit-label-response.schema.json";

#[test]
fn request_fixture_matches_schema() {
    let validator = compile_validator(REQUEST_SCHEMA);
    let fixture = load_json("fixtures/submit-label-request.valid.json");
    assert!(
        validator.is_valid(&fixture),
        "request fixture should validate against schema"
    );
}

#[test]
fn response_fixture_matches_schema() {
    let validator = compile_validator(RESPONSE_SCHEMA);
    let fixture = load_json("fixtures/submit-label-response.valid.json");
    assert!(
        validator.is_valid(&fixture),
        "response fixture should validate against schema"
    );
}

#[test]
fn assembled_payloads_match_request_schema() {
    let validator = compile_validator(REQUEST_SCHEMA);

    let mut store = FieldStore::new();
    store.set(TextField::BrandName, "Acme Vodka");
    store.set(TextField::ProductClass, "Vodka");
    store.set(TextField::NetContents, "750");

    for alcohol in ["40", "40%", "40%5", ".5"] {
        assert!(store.set(TextField::AlcoholContent, alcohol), "{alcohol}");
        for unit in [VolumeUnit::Milliliters, VolumeUnit::Liters, VolumeUnit::Ounces] {
            store.set_unit(unit);
            for image in [None, Some("data:image/jpeg;base64,/9j/4AAQ".to_string())] {
                let payload = SubmissionPayload::assemble(store.fields(), image);
                let value = serde_json::to_value(&payload).expect("payload should encode");
                assert!(validator.is_valid(&value), "{value}");
            }
        }
    }
}

#[test]
fn response_fixture_classifies_as_inconsistent_success() {
    let fixture = load_json("fixtures/submit-label-response.valid.json");
    let body = serde_json::to_vec(&fixture).expect("fixture should encode");

    let resolution = classify_response(200, &body);
    assert!(resolution.ok);
    assert!(resolution.shows_error());
    assert_eq!(resolution.inconsistencies().len(), 2);
    let extracted = resolution
        .verdict
        .and_then(|verdict| verdict.image_extracted)
        .expect("extraction should parse");
    assert_eq!(extracted.net_contents.as_deref(), Some("750ml"));
}
