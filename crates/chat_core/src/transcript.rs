use crate::{Message, MessageId};

/// Append-only, never-empty log of conversation messages in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// A transcript seeded with the welcome message.
    pub fn new() -> Self {
        Self {
            messages: vec![Message::welcome()],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.id() == id)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}
