//! Scripted in-memory transport for tests.
//!
//! Responses are replayed in the order they were queued and every request
//! is recorded for later inspection.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::{ApiError, Request, Response, Transport};

#[derive(Default)]
pub struct ScriptedTransport {
    queue: Mutex<VecDeque<(Duration, Result<Response, ApiError>)>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response.
    pub fn push_response(&self, response: Response) {
        self.queue.lock().push_back((Duration::ZERO, Ok(response)));
    }

    /// Queue a JSON body with the given status.
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_response(Response::json_value(status, &body));
    }

    /// Queue a `{success: true, data}` envelope.
    pub fn push_ok(&self, data: Value) {
        self.push_json(200, json!({"success": true, "data": data, "message": "ok"}));
    }

    /// Queue a `{success: false, message}` envelope.
    pub fn push_fail(&self, message: &str) {
        self.push_json(200, json!({"success": false, "data": null, "message": message}));
    }

    /// Queue a bare status with no body.
    pub fn push_status(&self, status: u16) {
        self.push_response(Response::new(status, Default::default(), Vec::new()));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: ApiError) {
        self.queue.lock().push_back((Duration::ZERO, Err(error)));
    }

    /// Queue an envelope that only arrives after `delay`.
    pub fn push_ok_delayed(&self, data: Value, delay: Duration) {
        let body = json!({"success": true, "data": data, "message": "ok"});
        self.queue
            .lock()
            .push_back((delay, Ok(Response::json_value(200, &body))));
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.requests.lock().last().cloned()
    }

    /// Responses queued but not yet consumed.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: Request) -> Result<Response, ApiError> {
        let path = request.path.clone();
        self.requests.lock().push(request);

        let next = self.queue.lock().pop_front();
        match next {
            Some((delay, result)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                result
            }
            None => Err(ApiError::network(format!(
                "no scripted response for {}",
                path
            ))),
        }
    }
}
