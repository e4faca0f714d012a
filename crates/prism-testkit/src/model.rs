//! Scripted model client.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use prism_core::errors::{PrismResult, TransformError};
use prism_core::traits::{ChatChoice, ChatRequest, ChatResponse, ChoiceMessage, ModelClient};

enum Reply {
    Content(String),
    Response(ChatResponse),
    Failure(String),
}

/// Model client that replays scripted replies and records every request.
/// When the script runs dry it falls back to the default reply, so simple
/// tests only need `with_reply`.
pub struct MockModelClient {
    script: Mutex<VecDeque<Reply>>,
    default_reply: String,
    calls: Mutex<Vec<ChatRequest>>,
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockModelClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: "ok".to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Set the reply used whenever the script is empty.
    pub fn with_reply(mut self, content: impl Into<String>) -> Self {
        self.default_reply = content.into();
        self
    }

    /// Queue one reply with the given content.
    pub fn push_reply(&self, content: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Reply::Content(content.into()));
    }

    /// Queue one full response, for tests that need usage numbers.
    pub fn push_response(&self, response: ChatResponse) {
        self.script
            .lock()
            .unwrap()
            .push_back(Reply::Response(response));
    }

    /// Queue one failed invocation.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Reply::Failure(message.into()));
    }

    /// Every request received so far, in call order.
    pub fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn content_response(content: String) -> ChatResponse {
        ChatResponse {
            choices: vec![ChatChoice {
                message: ChoiceMessage {
                    content: Some(content),
                    role: Some("assistant".to_string()),
                },
            }],
            usage: None,
        }
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn chat(&self, request: ChatRequest) -> PrismResult<ChatResponse> {
        self.calls.lock().unwrap().push(request);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Reply::Content(content)) => Ok(Self::content_response(content)),
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(message)) => {
                Err(TransformError::ModelInvocation { message }.into())
            }
            None => Ok(Self::content_response(self.default_reply.clone())),
        }
    }
}
