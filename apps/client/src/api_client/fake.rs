//! Scripted in-memory `GrantService` for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use super::{Document, GrantService, DEFAULT_DOCUMENT_NAME};
use crate::errors::ClientError;
use crate::models::{GenerateResponse, GenerationRequest, StatusResponse};

type Scripted = Result<Value, u16>;

/// Answers from queues of scripted responses. An exhausted status queue
/// keeps answering `processing`; an exhausted save queue returns a small
/// document.
#[derive(Default)]
pub struct FakeGrantService {
    generate_script: Mutex<VecDeque<Scripted>>,
    status_script: Mutex<VecDeque<Scripted>>,
    save_script: Mutex<VecDeque<Result<Bytes, u16>>>,
    generate_requests: Mutex<Vec<GenerationRequest>>,
    saved_content: Mutex<Vec<Value>>,
    status_calls: Mutex<u32>,
}

impl FakeGrantService {
    pub fn push_generate(&self, body: Value) {
        self.generate_script.lock().unwrap().push_back(Ok(body));
    }

    pub fn push_generate_failure(&self) {
        self.generate_script.lock().unwrap().push_back(Err(0));
    }

    pub fn push_status(&self, body: Value) {
        self.status_script.lock().unwrap().push_back(Ok(body));
    }

    /// Next status request fails with a malformed body.
    pub fn push_status_failure(&self) {
        self.status_script.lock().unwrap().push_back(Err(0));
    }

    pub fn push_save_failure(&self, status: u16) {
        self.save_script.lock().unwrap().push_back(Err(status));
    }

    pub fn generate_requests(&self) -> Vec<GenerationRequest> {
        self.generate_requests.lock().unwrap().clone()
    }

    pub fn saved_content(&self) -> Vec<Value> {
        self.saved_content.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> u32 {
        *self.status_calls.lock().unwrap()
    }
}

fn malformed() -> ClientError {
    ClientError::Parse(serde_json::from_str::<Value>("<html>").unwrap_err())
}

#[async_trait]
impl GrantService for FakeGrantService {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerateResponse, ClientError> {
        self.generate_requests.lock().unwrap().push(request.clone());
        let next = self
            .generate_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "processing"})));
        match next {
            Ok(body) => Ok(serde_json::from_value(body)?),
            Err(_) => Err(malformed()),
        }
    }

    async fn status(&self) -> Result<StatusResponse, ClientError> {
        *self.status_calls.lock().unwrap() += 1;
        let next = self
            .status_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"status": "processing"})));
        match next {
            Ok(body) => Ok(serde_json::from_value(body)?),
            Err(_) => Err(malformed()),
        }
    }

    async fn save(&self, content: &Value) -> Result<Document, ClientError> {
        self.saved_content.lock().unwrap().push(content.clone());
        let next = self
            .save_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(b"PK\x03\x04docx")));
        match next {
            Ok(bytes) => Ok(Document {
                filename: DEFAULT_DOCUMENT_NAME.to_string(),
                bytes,
            }),
            Err(status) => Err(ClientError::Api {
                status,
                message: "save failed".to_string(),
            }),
        }
    }
}
