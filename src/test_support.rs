use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::services::{ApiRequest, ApiResponse, HttpTransport};

enum Reply {
    Respond(ApiResponse),
    NetworkDown,
}

/// In-memory transport keyed by `ApiRequest::describe()`. Unscripted requests
/// fail like a dropped connection.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: HashMap<String, Reply>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, request: &str, body: &str) -> Self {
        self.respond(request, 200, None, body)
    }

    pub fn ok_with_link(self, request: &str, body: &str, link: &str) -> Self {
        self.respond(request, 200, Some(link), body)
    }

    pub fn status(self, request: &str, status: u16, body: &str) -> Self {
        self.respond(request, status, None, body)
    }

    pub fn network_down(mut self, request: &str) -> Self {
        self.replies.insert(request.to_string(), Reply::NetworkDown);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    fn respond(mut self, request: &str, status: u16, link: Option<&str>, body: &str) -> Self {
        self.replies.insert(
            request.to_string(),
            Reply::Respond(ApiResponse {
                status,
                link: link.map(ToString::to_string),
                body: body.to_string(),
            }),
        );
        self
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, request: ApiRequest) -> AppResult<ApiResponse> {
        let key = request.describe();
        self.seen.lock().unwrap().push(key.clone());
        match self.replies.get(&key) {
            Some(Reply::Respond(response)) => Ok(response.clone()),
            Some(Reply::NetworkDown) | None => {
                Err(AppError::Transport(format!("connection refused: {key}")))
            }
        }
    }
}
