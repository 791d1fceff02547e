//! Integration tests for verdict parsing and the display rule.

use label_check_verdict::{
    Outcome, Resolution, Verdict, VerdictError, classify_response, verdict_from_value,
};

fn parse_verdict(raw: &str) -> Result<Verdict, VerdictError> {
    verdict_from_value(serde_json::from_str(raw).expect("test input is JSON"))
}

#[test]
fn verdict_parsing_tests_reads_backend_result_shape() {
    let raw = r#"{
        "imageExtracted": {
            "brand_name": "ACME",
            "alcohol_content": "40%",
            "net_contents": "750ml",
            "health_warning": true,
            "product_class": "Vodka",
            "all_text": ["ACME", "VODKA", "40%", "750ml"],
            "full_text": "ACMEVODKA40%750ml"
        },
        "errors": []
    }"#;

    let verdict = parse_verdict(raw).expect("verdict should parse");
    assert!(verdict.is_consistent());
    let extracted = verdict.image_extracted.expect("extraction present");
    assert_eq!(extracted.product_class.as_deref(), Some("Vodka"));
    assert!(extracted.health_warning);
    assert_eq!(extracted.all_text.len(), 4);
}

#[test]
fn verdict_parsing_tests_tolerates_null_extraction() {
    let verdict = parse_verdict(r#"{"imageExtracted":null,"errors":["Invalid base64 image format"]}"#)
        .expect("verdict should parse");
    assert!(verdict.image_extracted.is_none());
    assert_eq!(verdict.errors, vec!["Invalid base64 image format".to_string()]);
}

#[test]
fn verdict_parsing_tests_consistent_success_shows_success() {
    let resolution = classify_response(200, br#"{"success":true,"result":{"errors":[]}}"#);
    assert!(resolution.ok);
    assert!(!resolution.shows_error());
    assert!(resolution.verdict.expect("verdict present").is_consistent());
}

#[test]
fn verdict_parsing_tests_inconsistent_success_shows_error() {
    let resolution = classify_response(
        200,
        br#"{"success":true,"result":{"errors":["brand mismatch"]}}"#,
    );
    assert!(resolution.ok);
    assert!(resolution.shows_error());
    assert_eq!(resolution.inconsistencies(), ["brand mismatch".to_string()]);
}

#[test]
fn verdict_parsing_tests_outcome_accessors() {
    assert!(Outcome::InFlight.is_in_flight());
    assert!(Outcome::Idle.resolution().is_none());

    let outcome = Outcome::Resolved(Resolution::failure("bad image"));
    assert!(!outcome.is_in_flight());
    assert_eq!(outcome.resolution().map(|r| r.message.as_str()), Some("bad image"));
}

#[test]
fn verdict_parsing_tests_malformed_extraction_keeps_inconsistencies() {
    for extracted in [r#"{"health_warning":null}"#, r#""n/a""#, "[1,2]"] {
        let body = format!(
            r#"{{"success":true,"result":{{"errors":["brand mismatch"],"imageExtracted":{extracted}}}}}"#
        );
        let resolution = classify_response(200, body.as_bytes());
        assert!(resolution.ok);
        assert!(resolution.shows_error(), "{body}");
        assert_eq!(resolution.inconsistencies(), ["brand mismatch".to_string()]);
        let verdict = resolution.verdict.expect("verdict kept");
        assert!(verdict.image_extracted.is_none());
    }
}

#[test]
fn verdict_parsing_tests_rejects_mistyped_errors() {
    assert!(parse_verdict(r#"{"errors":"brand mismatch"}"#).is_err());
    assert!(parse_verdict("42").is_err());
}
