//! Shared fakes for the integration tests: a scripted [`Backend`] and a
//! [`Host`] that records everything the components ask of it.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use chessgen::api::{Backend, Credentials};
use chessgen::error::TransportError;
use chessgen::page::Document;
use chessgen::page::host::Host;
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub credentials: Credentials,
}

/// Answers requests from a queue, in order. An empty queue answers with a
/// network error.
#[derive(Default)]
pub struct FakeBackend {
    responses: RefCell<VecDeque<Result<Value, TransportError>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(body));
        self
    }

    pub fn refuse(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(TransportError::Network {
                method: "POST",
                url: "http://localhost:5000/api".to_string(),
                message: message.to_string(),
            }));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn answer(
        &self,
        method: &'static str,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        self.calls.borrow_mut().push(Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
            credentials,
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    method,
                    url: path.to_string(),
                    message: "no response scripted".to_string(),
                })
            })
    }
}

impl Backend for FakeBackend {
    fn get(&self, path: &str, credentials: Credentials) -> Result<Value, TransportError> {
        self.answer("GET", path, None, credentials)
    }

    fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        self.answer("POST", path, body, credentials)
    }

    fn put(
        &self,
        path: &str,
        body: Option<&Value>,
        credentials: Credentials,
    ) -> Result<Value, TransportError> {
        self.answer("PUT", path, body, credentials)
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

pub struct RecordingHost {
    /// The document at every repaint.
    pub snapshots: Vec<Document>,
    pub confirm_answer: bool,
    pub confirmations: Vec<String>,
    pub alerts: Vec<String>,
    pub navigations: Vec<String>,
    pub clipboard: Option<String>,
    pub clipboard_broken: bool,
    pub pauses: Vec<Duration>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            snapshots: Vec::new(),
            confirm_answer: true,
            confirmations: Vec::new(),
            alerts: Vec::new(),
            navigations: Vec::new(),
            clipboard: None,
            clipboard_broken: false,
            pauses: Vec::new(),
        }
    }

    pub fn declining() -> Self {
        Self {
            confirm_answer: false,
            ..Self::new()
        }
    }
}

impl Host for RecordingHost {
    fn repaint(&mut self, doc: &Document) {
        self.snapshots.push(doc.clone());
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirmations.push(message.to_string());
        self.confirm_answer
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn navigate(&mut self, page: &str) {
        self.navigations.push(page.to_string());
    }

    fn write_clipboard(&mut self, text: &str) -> anyhow::Result<()> {
        if self.clipboard_broken {
            anyhow::bail!("clipboard unavailable");
        }
        self.clipboard = Some(text.to_string());
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const SAMPLE_FEN: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";

pub fn sample_data() -> Value {
    json!({
        "fen": SAMPLE_FEN,
        "white_material": 39,
        "black_material": 36.5,
        "material_difference": 2.5,
        "turn": "Blanc",
        "eval_line1": "+0.45",
        "eval_line2": "Mat en 3",
        "attempts": 12345,
        "time_seconds": 7.25
    })
}

pub fn generation_success() -> Value {
    json!({ "success": true, "data": sample_data() })
}
