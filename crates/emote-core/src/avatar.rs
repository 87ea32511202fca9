use crate::state::{ChatMessage, ChatRole, Emotion};

/// A display avatar: the fixed asset path plus a text face for terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avatar {
    pub path: &'static str,
    pub face: &'static str,
    pub label: &'static str,
}

const USER: Avatar = Avatar {
    path: "/avatars/user_default.png",
    face: "(._.)",
    label: "User",
};

pub fn assistant_avatar(emotion: Emotion) -> Avatar {
    let (path, face) = match emotion {
        Emotion::Neutral => ("/avatars/ai_neutral.png", "(o_o)"),
        Emotion::Happy => ("/avatars/ai_happy.png", "(^o^)"),
        Emotion::Sad => ("/avatars/ai_sad.png", "(T_T)"),
        Emotion::Angry => ("/avatars/ai_angry.png", "(>_<)"),
        Emotion::Surprised => ("/avatars/ai_surprised.png", "(O_O)"),
    };
    Avatar {
        path,
        face,
        label: "Assistant",
    }
}

pub fn user_avatar() -> Avatar {
    USER
}

/// Pick the avatar for a message by role and, for the assistant, by emotion
pub fn avatar_for(message: &ChatMessage) -> Avatar {
    match message.role {
        ChatRole::User => user_avatar(),
        ChatRole::Assistant => assistant_avatar(message.effective_emotion()),
    }
}
