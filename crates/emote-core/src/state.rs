//! UI-agnostic conversation state
//!
//! This module contains the message model shared by every front-end. A
//! [`Conversation`] is never edited in place: each mutation hands back a new
//! value, so whatever a UI rendered last is exactly what it can send.

use serde::{Deserialize, Serialize};

/// Content of the assistant message appended when a send fails for any reason.
pub const SEND_FAILED_REPLY: &str = "An error occurred... (check the log)";

/// Mood tag attached to assistant replies, only used to pick an avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    /// Also what any label outside this set decodes to
    #[default]
    #[serde(other)]
    Neutral,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
        }
    }

    pub fn all() -> [Emotion; 5] {
        [
            Emotion::Neutral,
            Emotion::Happy,
            Emotion::Sad,
            Emotion::Angry,
            Emotion::Surprised,
        ]
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            emotion: None,
        }
    }

    pub fn assistant(content: impl Into<String>, emotion: Emotion) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            emotion: Some(emotion),
        }
    }

    /// The fixed reply shown when the endpoint could not be reached or answered badly
    pub fn send_failed() -> Self {
        Self::assistant(SEND_FAILED_REPLY, Emotion::Sad)
    }

    /// Emotion used for display; untagged messages count as neutral
    pub fn effective_emotion(&self) -> Emotion {
        self.emotion.unwrap_or_default()
    }
}

/// Ordered, append-only chat history plus the busy flag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    busy: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new conversation with `message` appended; the busy flag is carried over.
    pub fn append(&self, message: ChatMessage) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(message);
        Self {
            messages,
            busy: self.busy,
        }
    }

    pub fn with_busy(&self, busy: bool) -> Self {
        Self {
            messages: self.messages.clone(),
            busy,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_leaves_original_untouched() {
        let empty = Conversation::new();
        let one = empty.append(ChatMessage::user("hello"));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(one.last(), Some(&ChatMessage::user("hello")));
    }

    #[test]
    fn test_append_preserves_order_and_busy() {
        let conversation = Conversation::new()
            .with_busy(true)
            .append(ChatMessage::user("first"))
            .append(ChatMessage::assistant("second", Emotion::Happy));

        assert!(conversation.is_busy());
        let contents: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[test]
    fn test_user_message_serializes_without_emotion() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_assistant_message_serializes_emotion() {
        let json = serde_json::to_value(ChatMessage::assistant("yay", Emotion::Surprised)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "assistant", "content": "yay", "emotion": "surprised"})
        );
    }

    #[test]
    fn test_unknown_emotion_decodes_as_neutral() {
        let emotion: Emotion = serde_json::from_str("\"worried\"").unwrap();
        assert_eq!(emotion, Emotion::Neutral);
    }

    #[test]
    fn test_effective_emotion_defaults_to_neutral() {
        assert_eq!(ChatMessage::user("x").effective_emotion(), Emotion::Neutral);
        assert_eq!(ChatMessage::send_failed().effective_emotion(), Emotion::Sad);
    }

    #[test]
    fn test_emotion_as_str_matches_serde() {
        for emotion in Emotion::all() {
            let json = serde_json::to_string(&emotion).unwrap();
            assert_eq!(json, format!("\"{}\"", emotion.as_str()));
        }
    }
}
