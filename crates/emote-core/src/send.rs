//! The send cycle: optimistic append, one request, reconcile.
//!
//! Front-ends that must stay responsive while the request is in flight call
//! [`submit`] and [`settle`] around their own task; [`send_cycle`] runs the
//! whole thing inline.

use anyhow::Result;
use async_trait::async_trait;

use crate::client::{ChatClient, ChatReply};
use crate::state::{ChatMessage, Conversation};

/// Anything that can answer a conversation with one reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply>;
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatReply> {
        ChatClient::send(self, messages).await
    }
}

/// Start a send: append the trimmed user text and mark the conversation busy.
///
/// Returns `None` when the text is blank or a send is already in flight.
pub fn submit(conversation: &Conversation, input: &str) -> Option<Conversation> {
    let text = input.trim();
    if text.is_empty() || conversation.is_busy() {
        return None;
    }
    Some(
        conversation
            .append(ChatMessage::user(text))
            .with_busy(true),
    )
}

/// Finish a send with its outcome. Busy is cleared whichever branch runs.
pub fn settle(conversation: &Conversation, outcome: Result<ChatReply>) -> Conversation {
    let message = match outcome {
        Ok(reply) => {
            let emotion = reply.emotion.unwrap_or_default();
            tracing::info!(emotion = emotion.as_str(), "reply received");
            ChatMessage::assistant(reply.reply, emotion)
        }
        Err(e) => {
            tracing::error!(error = ?e, "send failed");
            ChatMessage::send_failed()
        }
    };
    conversation.append(message).with_busy(false)
}

pub async fn send_cycle<B>(backend: &B, conversation: &Conversation, input: &str) -> Conversation
where
    B: ChatBackend + ?Sized,
{
    let Some(pending) = submit(conversation, input) else {
        return conversation.clone();
    };

    tracing::debug!(messages = pending.len(), "sending conversation");
    let outcome = backend.send(pending.messages()).await;
    settle(&pending, outcome)
}
