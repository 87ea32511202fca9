pub mod avatar;
pub mod client;
pub mod config;
pub mod send;
pub mod state;

// Re-export main types for convenience
pub use avatar::{assistant_avatar, avatar_for, user_avatar, Avatar};
pub use client::{ChatClient, ChatReply, DEFAULT_ENDPOINT};
pub use config::Config;
pub use send::{send_cycle, settle, submit, ChatBackend};
pub use state::{ChatMessage, ChatRole, Conversation, Emotion, SEND_FAILED_REPLY};
