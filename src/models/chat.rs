use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One conversation turn. A message carries either free text (user turns,
/// fallback assistant turns) or an already-formatted bullet list (normal
/// assistant replies). Only text-bearing messages are forwarded upstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullets: Option<Vec<String>>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: Some(text.into()),
            bullets: None,
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: Some(text.into()),
            bullets: None,
        }
    }

    pub fn assistant_bullets(bullets: Vec<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: None,
            bullets: Some(bullets),
        }
    }
}

/// In-memory ordered conversation transcript. Append-only for the lifetime
/// of a session; never persisted.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_preserves_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("my tomato leaves have spots"));
        transcript.push(ChatMessage::assistant_bullets(vec![
            "Apply copper spray".to_string(),
            "Avoid overhead water".to_string(),
        ]));
        transcript.push(ChatMessage::user("is it safe for seedlings?"));

        let roles: Vec<ChatRole> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant, ChatRole::User]);
        assert_eq!(
            transcript.messages()[2].text.as_deref(),
            Some("is it safe for seedlings?")
        );
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = ChatMessage::user("hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("bullets").is_none());
    }

    #[test]
    fn deserializes_messages_without_text() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","bullets":["Rotate crops"]}"#).unwrap();
        assert_eq!(msg.role, ChatRole::Assistant);
        assert!(msg.text.is_none());
        assert_eq!(msg.bullets.unwrap(), vec!["Rotate crops".to_string()]);
    }
}
