//! Capability traits for the two persistence backends.
//!
//! The recorder talks to both backends only through these traits; concrete
//! implementations live in `ainon-memory` and are injected at construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::action::{ActorId, RecordId};
use crate::error::BackendResult;
use crate::payload::{KnowledgeDocument, MemoryMessage};

/// Acknowledgement of a single backend write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteAck {
    /// Idempotency key of the acknowledged write.
    pub record_id: RecordId,
    /// True when the backend had already seen this record id and kept the
    /// original entry untouched.
    pub deduplicated: bool,
}

/// A message as it sits in an actor's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Position in the actor's timeline, starting at 1.
    pub seq: u64,
    /// The message itself.
    pub message: MemoryMessage,
}

/// Append-only per-actor conversational memory.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Append a message to the actor's ordered timeline.
    ///
    /// Appends for the same actor are serialized by the store, preserving
    /// per-actor ordering; concurrent appends for different actors are safe.
    /// Replaying a message with an already-seen record id is a no-op and
    /// acknowledges with `deduplicated: true`.
    async fn append(&self, actor: &ActorId, message: MemoryMessage) -> BackendResult<WriteAck>;

    /// The most recent messages for an actor, oldest first.
    async fn timeline(&self, actor: &ActorId, limit: usize) -> BackendResult<Vec<StoredMessage>>;
}

/// Semantic knowledge index.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Insert a document into the index. Calls are independent of one
    /// another; no ordering is guaranteed relative to other documents.
    /// Replaying a document with an already-seen record id is a no-op.
    async fn index(&self, document: KnowledgeDocument) -> BackendResult<WriteAck>;

    /// Content search over indexed documents, newest first.
    async fn search(&self, query: &str, limit: usize) -> BackendResult<Vec<KnowledgeDocument>>;
}
