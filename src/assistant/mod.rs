use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who spoke on the radio.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    Driver,
    Engineer,
}

/// One radio exchange. Messages are value records: once appended to the log
/// they are never edited or removed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    /// Base64 audio data URL when speech synthesis succeeded
    pub audio: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn driver(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Driver,
            text: text.into(),
            audio: None,
            timestamp: Utc::now(),
        }
    }

    pub fn engineer(text: impl Into<String>, audio: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: ChatRole::Engineer,
            text: text.into(),
            audio,
            timestamp: Utc::now(),
        }
    }
}

/// Insertion-ordered, append-only radio transcript.
#[derive(Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// First sentence of a rationale, used as the spoken part of an alert.
pub fn first_sentence(text: &str) -> &str {
    text.split('.').next().unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_insertion_order() {
        let mut log = ChatLog::new();
        log.push(ChatMessage::driver("how are the tires?"));
        log.push(ChatMessage::engineer("holding up, three laps left", None));
        log.push(ChatMessage::driver("copy"));

        let roles: Vec<ChatRole> = log.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::Driver, ChatRole::Engineer, ChatRole::Driver]
        );
        assert_eq!(log.messages()[1].text, "holding up, three laps left");
    }

    #[test]
    fn test_messages_get_unique_ids() {
        let a = ChatMessage::driver("one");
        let b = ChatMessage::driver("one");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_first_sentence() {
        assert_eq!(
            first_sentence("SAFETY CAR DEPLOYED. Cheap pit stop opportunity."),
            "SAFETY CAR DEPLOYED"
        );
        assert_eq!(first_sentence("no punctuation"), "no punctuation");
    }
}
