use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

use crate::state::{ChatMessage, Emotion};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// Decoded success body of the chat endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub emotion: Option<Emotion>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self::with_http_client(Client::new(), endpoint)
    }

    pub fn with_http_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the whole conversation and decode the reply.
    pub async fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply> {
        let request = ChatRequest { messages };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("chat endpoint error {}: {}", status, text));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply)
    }
}
