//! Conversation-related types.

use std::collections::VecDeque;

use concierge_model::ModelMessage;

/// The default number of turns a conversation keeps.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// One message in the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// What the user said, possibly annotated.
    Human(String),
    /// What the assistant replied.
    Assistant(String),
}

impl Turn {
    /// Returns the text of this turn.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            Turn::Human(text) | Turn::Assistant(text) => text,
        }
    }

    fn to_message(&self) -> ModelMessage {
        match self {
            Turn::Human(text) => ModelMessage::User(text.clone()),
            Turn::Assistant(text) => ModelMessage::assistant(text.clone()),
        }
    }
}

/// The turns sent to the model on every call, oldest first.
///
/// The buffer is bounded: [`truncate`](Self::truncate) drops the oldest
/// turns until at most `capacity` remain, preserving the relative order.
#[derive(Clone, Debug)]
pub struct ConversationBuffer {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl ConversationBuffer {
    /// Creates an empty buffer. A zero capacity is raised to one.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends a turn at the newest end.
    #[inline]
    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
    }

    /// Keeps only the `capacity` most recent turns.
    pub fn truncate(&mut self) {
        let overflow = self.turns.len().saturating_sub(self.capacity);
        if overflow > 0 {
            trace!("dropping {overflow} oldest turns");
            self.turns.drain(..overflow);
        }
    }

    /// Returns the turns, oldest first.
    #[inline]
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Returns the number of turns held.
    #[inline]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns `true` if the buffer holds no turn.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the maximum number of turns kept after truncation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all turns.
    #[inline]
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub(crate) fn to_messages(&self) -> impl Iterator<Item = ModelMessage> {
        self.turns.iter().map(Turn::to_message)
    }
}

impl Default for ConversationBuffer {
    #[inline]
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_most_recent_turns() {
        let mut buffer = ConversationBuffer::with_capacity(5);
        for idx in 1..=12 {
            buffer.append(Turn::Human(format!("turn {idx}")));
            buffer.truncate();
            assert!(buffer.len() <= 5);
        }
        let texts: Vec<_> = buffer.turns().map(Turn::text).collect();
        assert_eq!(texts, ["turn 8", "turn 9", "turn 10", "turn 11", "turn 12"]);
    }

    #[test]
    fn test_truncate_after_each_side() {
        let mut buffer = ConversationBuffer::with_capacity(3);
        for idx in 0..4 {
            buffer.append(Turn::Human(format!("q{idx}")));
            assert!(buffer.len() <= 4);
            buffer.truncate();
            buffer.append(Turn::Assistant(format!("a{idx}")));
            assert!(buffer.len() <= 4);
            buffer.truncate();
            assert!(buffer.len() <= 3);
        }
        let turns: Vec<_> = buffer.turns().cloned().collect();
        assert_eq!(
            turns,
            [
                Turn::Assistant("a2".to_owned()),
                Turn::Human("q3".to_owned()),
                Turn::Assistant("a3".to_owned()),
            ]
        );
    }

    #[test]
    fn test_to_messages() {
        let mut buffer = ConversationBuffer::default();
        buffer.append(Turn::Human("hi".to_owned()));
        buffer.append(Turn::Assistant("welcome".to_owned()));
        let messages: Vec<_> = buffer.to_messages().collect();
        assert_eq!(
            messages,
            [
                ModelMessage::User("hi".to_owned()),
                ModelMessage::assistant("welcome"),
            ]
        );
    }

    #[test]
    fn test_zero_capacity() {
        let mut buffer = ConversationBuffer::with_capacity(0);
        buffer.append(Turn::Human("hi".to_owned()));
        buffer.append(Turn::Human("again".to_owned()));
        buffer.truncate();
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.turns().next().map(Turn::text), Some("again"));
    }
}
