//! The conversation transcript: an ordered, append-only message store.

/// Which side of the conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Entered by the user (or echoed back by the server for voice turns).
    Human,
    /// Produced by the advisory service.
    Agent,
}

/// One immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Display position; strictly increasing, never reused.
    pub position: u64,
    /// Who the message is attributed to.
    pub origin: Origin,
    /// Renderable text. Binary inputs are represented by summary lines.
    pub content: String,
}

/// Ordered transcript of a chat session.
///
/// Grows monotonically through [`append`](Transcript::append); entries are
/// never reordered or edited in place. The only reset is dropping the whole
/// session.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<Message>,
    next_position: u64,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message and return its position.
    pub fn append(&mut self, origin: Origin, content: impl Into<String>) -> u64 {
        let position = self.next_position;
        self.next_position += 1;
        self.entries.push(Message {
            position,
            origin,
            content: content.into(),
        });
        position
    }

    /// Number of messages appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no messages have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All messages, in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    /// The most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }
}
