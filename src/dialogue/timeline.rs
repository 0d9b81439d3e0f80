//! Message timeline — append-only log with a queued/revealed split.
//!
//! The controller appends messages as it generates them. Presentation layers
//! move them into the visible slice one at a time, optionally pacing bot
//! messages with a typing delay. Reveal order is always append order.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Bot,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub author: Author,
    pub text: String,
    /// Position in the timeline, starting at 0 for each session run.
    pub sequence: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MessageTimeline {
    messages: Vec<Message>,
    revealed: usize,
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message and return its sequence index.
    pub fn append(&mut self, author: Author, text: impl Into<String>) -> usize {
        let sequence = self.messages.len();
        self.messages.push(Message {
            author,
            text: text.into(),
            sequence,
            created_at: Utc::now(),
        });
        sequence
    }

    /// The next message waiting to be revealed.
    pub fn next_pending(&self) -> Option<&Message> {
        self.messages.get(self.revealed)
    }

    /// Move one queued message into the visible log.
    pub fn reveal_next(&mut self) -> Option<&Message> {
        let message = self.messages.get(self.revealed)?;
        self.revealed += 1;
        Some(message)
    }

    /// Reveal everything still queued, returning the newly visible messages.
    pub fn reveal_all(&mut self) -> &[Message] {
        let start = self.revealed;
        self.revealed = self.messages.len();
        &self.messages[start..]
    }

    pub fn revealed(&self) -> &[Message] {
        &self.messages[..self.revealed]
    }

    pub fn pending(&self) -> &[Message] {
        &self.messages[self.revealed..]
    }

    /// Every generated message, revealed or not.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.revealed = 0;
    }
}

/// Plays revealed messages with a typing delay before each bot message.
///
/// User messages are shown immediately. Callers take the messages out of the
/// timeline first, so no session state is held while the pacer sleeps.
#[derive(Debug, Clone, Copy)]
pub struct RevealPacer {
    delay: Duration,
}

impl RevealPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn play<F>(&self, messages: &[Message], mut on_reveal: F)
    where
        F: FnMut(&Message),
    {
        for message in messages {
            if message.author == Author::Bot && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            on_reveal(message);
        }
    }
}
