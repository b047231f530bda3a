//! Per-session state.

use crate::conversation::ConversationBuffer;
use crate::memory::EntityMemory;

/// Everything one conversation remembers between two utterances.
///
/// A dialogue belongs to exactly one session. Nothing in it is shared
/// with other sessions, so concurrent sessions never observe each
/// other's entities or turns.
#[derive(Clone, Debug, Default)]
pub struct Dialogue {
    pub(crate) memory: EntityMemory,
    pub(crate) buffer: ConversationBuffer,
}

impl Dialogue {
    /// Creates an empty dialogue keeping at most `history_capacity` turns.
    #[inline]
    pub fn with_history_capacity(history_capacity: usize) -> Self {
        Self {
            memory: EntityMemory::new(),
            buffer: ConversationBuffer::with_capacity(history_capacity),
        }
    }

    /// Returns the entity memory.
    #[inline]
    pub fn memory(&self) -> &EntityMemory {
        &self.memory
    }

    /// Returns the conversation buffer.
    #[inline]
    pub fn buffer(&self) -> &ConversationBuffer {
        &self.buffer
    }

    /// Forgets all turns and entities.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.buffer.clear();
    }
}
