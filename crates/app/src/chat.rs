//! Conversation with the stall advisor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marketbook_ai::{Advice, Advisor};
use marketbook_inventory::Stall;

pub const GREETING: &str = "Hello! I'm the Market Guru.\n\
Tell me what you want to sell and I'll help you pick a great stall!";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Model replies produced by the offline rules.
    #[serde(default)]
    pub offline: bool,
}

/// Message history; at most one question is in flight at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
    pending: bool,
    next_id: u64,
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatTranscript {
    /// Transcript opened with the advisor's greeting.
    pub fn new() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            pending: false,
            next_id: 0,
        };
        transcript.push(ChatRole::Model, GREETING.to_string(), false);
        transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record a user question.
    ///
    /// Returns the question to send, or `None` when the input is blank or a
    /// previous question is still unanswered.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        if self.pending || input.trim().is_empty() {
            return None;
        }
        self.pending = true;
        self.push(ChatRole::User, input.to_string(), false);
        Some(input.to_string())
    }

    /// Record the answer to the pending question.
    pub fn receive(&mut self, advice: Advice) {
        let offline = advice.is_offline();
        self.push(ChatRole::Model, advice.text, offline);
        self.pending = false;
    }

    /// Submit `input` and wait for the advisor's answer.
    pub async fn ask(&mut self, advisor: &Advisor, input: &str, stalls: &[Stall]) -> Option<&ChatMessage> {
        let question = self.submit(input)?;
        let advice = advisor.advise(&question, stalls).await;
        self.receive(advice);
        self.messages.last()
    }

    fn push(&mut self, role: ChatRole, text: String, offline: bool) {
        self.messages.push(ChatMessage {
            id: self.next_id,
            role,
            text,
            timestamp: Utc::now(),
            offline,
        });
        self.next_id += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketbook_core::{Price, StallId};
    use marketbook_inventory::Zone;

    fn stalls() -> Vec<Stall> {
        vec![Stall::new(StallId::new("STALL-A1").unwrap(), "A1", Zone::Food, Price::new(350.0).unwrap(), "2x2 m")]
    }

    #[test]
    fn starts_with_a_greeting() {
        let chat = ChatTranscript::new();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, ChatRole::Model);
        assert_eq!(chat.messages()[0].text, GREETING);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut chat = ChatTranscript::new();
        assert_eq!(chat.submit("   "), None);
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn second_question_waits_for_the_first_answer() {
        let mut chat = ChatTranscript::new();
        assert!(chat.submit("noodles").is_some());
        assert!(chat.is_pending());
        assert_eq!(chat.submit("and drinks?"), None);
        assert_eq!(chat.messages().len(), 2);
    }

    #[tokio::test]
    async fn offline_answers_are_marked() {
        let mut chat = ChatTranscript::new();
        let reply = chat.ask(&Advisor::offline(), "grilled pork skewers", &stalls()).await.unwrap();
        assert_eq!(reply.role, ChatRole::Model);
        assert!(reply.offline);
        assert!(reply.text.contains("A1"));
        assert!(!chat.is_pending());

        let ids: Vec<u64> = chat.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
