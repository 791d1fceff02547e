//! Shared fixtures for app integration tests.

use std::sync::Mutex;

use label_check_app::LabelForm;
use label_check_capture::LabelFile;
use label_check_core::TextField;
use label_check_submit::{HttpReply, SubmitEndpoint, SubmitTransport, TransportError, Url};
use serde_json::Value;

/// Canned behavior of [`ScriptedTransport`].
#[allow(dead_code)]
pub enum Script {
    /// Respond with status and JSON body text.
    Reply(u16, &'static str),
    /// Fail before any response.
    Unreachable,
}

/// Transport that records every request body and answers from a script.
pub struct ScriptedTransport {
    script: Script,
    requests: Mutex<Vec<Value>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("request log lock").clone()
    }
}

impl SubmitTransport for ScriptedTransport {
    async fn post_json(&self, url: &Url, body: Vec<u8>) -> Result<HttpReply, TransportError> {
        assert_eq!(url.path(), "/api/submit-label");
        let value = serde_json::from_slice(&body).expect("request body should be json");
        self.requests.lock().expect("request log lock").push(value);

        match &self.script {
            Script::Reply(status, body) => Ok(HttpReply {
                status: *status,
                body: body.as_bytes().to_vec(),
            }),
            Script::Unreachable => Err(TransportError::Connect("connection refused".to_string())),
        }
    }
}

/// Endpoint used by all fixtures.
#[allow(dead_code)]
pub fn endpoint() -> SubmitEndpoint {
    SubmitEndpoint::from_base("https://verify.example.test").expect("fixture endpoint is valid")
}

/// In-memory PNG fixture.
#[allow(dead_code)]
pub fn png() -> LabelFile {
    LabelFile::from_bytes("label.png", "image/png", b"\x89PNG".to_vec())
}

/// Fills every text field without attaching an image.
#[allow(dead_code)]
pub fn fill_fields(form: &mut LabelForm) {
    assert!(form.set_field(TextField::BrandName, "Acme Vodka"));
    assert!(form.set_field(TextField::ProductClass, "Vodka"));
    assert!(form.set_field(TextField::AlcoholContent, "40"));
    assert!(form.set_field(TextField::NetContents, "750"));
}

/// Complete form with an attached image.
#[allow(dead_code)]
pub async fn complete_form() -> LabelForm {
    let mut form = LabelForm::new();
    fill_fields(&mut form);
    assert!(form.attach_image(Some(png())).await);
    form
}
