//! Per-wallet conversational timeline backed by SQLite.

use ainon_types::action::{ActorId, RecordId};
use ainon_types::error::{BackendError, BackendResult};
use ainon_types::payload::MemoryMessage;
use ainon_types::store::{MemoryStore, StoredMessage, WriteAck};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::{classify_sqlite, SharedConnection};

/// Append-only memory store keyed by actor, backed by SQLite.
#[derive(Clone)]
pub struct TimelineStore {
    conn: SharedConnection,
}

impl TimelineStore {
    /// Create a new timeline store wrapping the given connection.
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MemoryStore for TimelineStore {
    async fn append(&self, actor: &ActorId, message: MemoryMessage) -> BackendResult<WriteAck> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BackendError::Permanent(e.to_string()))?;
        let metadata = serde_json::to_string(&message.metadata)
            .map_err(|e| BackendError::Permanent(e.to_string()))?;

        // Seq allocation and insert happen under one lock hold; that is what
        // serializes appends for the same actor.
        let seq: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE actor = ?1",
                rusqlite::params![actor.as_str()],
                |row| row.get(0),
            )
            .map_err(classify_sqlite)?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO messages
                 (record_id, actor, seq, name, role, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    message.record_id.as_str(),
                    actor.as_str(),
                    seq,
                    message.name,
                    message.role,
                    message.content,
                    metadata,
                    message.timestamp.to_rfc3339(),
                ],
            )
            .map_err(classify_sqlite)?;

        let deduplicated = inserted == 0;
        if deduplicated {
            debug!(record_id = %message.record_id, actor = %actor, "duplicate append ignored");
        }

        Ok(WriteAck {
            record_id: message.record_id,
            deduplicated,
        })
    }

    async fn timeline(&self, actor: &ActorId, limit: usize) -> BackendResult<Vec<StoredMessage>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BackendError::Permanent(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT seq, name, role, content, metadata, record_id, created_at
                 FROM messages WHERE actor = ?1 ORDER BY seq DESC LIMIT ?2",
            )
            .map_err(classify_sqlite)?;

        let rows = stmt
            .query_map(rusqlite::params![actor.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .map_err(classify_sqlite)?;

        let mut messages = Vec::new();
        for row in rows {
            let (seq, name, role, content, meta_str, record_id, created_str) =
                row.map_err(classify_sqlite)?;
            let metadata = serde_json::from_str(&meta_str).unwrap_or_default();
            let timestamp = chrono::DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            messages.push(StoredMessage {
                seq: seq as u64,
                message: MemoryMessage {
                    name,
                    role,
                    content,
                    metadata,
                    record_id: RecordId(record_id),
                    timestamp,
                },
            });
        }

        // Fetched newest-first for the LIMIT; callers read oldest-first.
        messages.reverse();
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ainon_types::action::ActionRecord;

    fn setup() -> TimelineStore {
        TimelineStore::new(crate::open_in_memory().unwrap())
    }

    fn message(actor: &str, amount: &str) -> MemoryMessage {
        let action = ActionRecord::new(actor, "swap", "momentum", amount).unwrap();
        MemoryMessage::from_action(&action)
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let store = setup();
        let actor = ActorId::from("0xABC");
        let msg = message("0xABC", "1.5");

        let ack = store.append(&actor, msg.clone()).await.unwrap();
        assert!(!ack.deduplicated);
        assert_eq!(ack.record_id, msg.record_id);

        let timeline = store.timeline(&actor, 10).await.unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].seq, 1);
        assert_eq!(timeline[0].message.content, msg.content);
        assert_eq!(timeline[0].message.metadata, msg.metadata);
    }

    #[tokio::test]
    async fn test_replay_deduplicates() {
        let store = setup();
        let actor = ActorId::from("0xABC");
        let msg = message("0xABC", "1.5");

        let first = store.append(&actor, msg.clone()).await.unwrap();
        let second = store.append(&actor, msg).await.unwrap();
        assert!(!first.deduplicated);
        assert!(second.deduplicated);

        let timeline = store.timeline(&actor, 10).await.unwrap();
        assert_eq!(timeline.len(), 1);
    }

    #[tokio::test]
    async fn test_per_actor_ordering() {
        let store = setup();
        let actor = ActorId::from("0xABC");

        for amount in ["1.0", "2.0", "3.0"] {
            store.append(&actor, message("0xABC", amount)).await.unwrap();
        }

        let timeline = store.timeline(&actor, 10).await.unwrap();
        let seqs: Vec<u64> = timeline.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert!(timeline[0].message.content.contains("1.0"));
        assert!(timeline[2].message.content.contains("3.0"));
    }

    #[tokio::test]
    async fn test_actors_are_independent() {
        let store = setup();
        let alice = ActorId::from("0xAAA");
        let bob = ActorId::from("0xBBB");

        store.append(&alice, message("0xAAA", "1.0")).await.unwrap();
        store.append(&bob, message("0xBBB", "2.0")).await.unwrap();

        assert_eq!(store.timeline(&alice, 10).await.unwrap().len(), 1);
        assert_eq!(store.timeline(&bob, 10).await.unwrap().len(), 1);
        // Each actor's timeline starts at seq 1.
        assert_eq!(store.timeline(&bob, 10).await.unwrap()[0].seq, 1);
    }

    #[tokio::test]
    async fn test_timeline_limit_keeps_newest() {
        let store = setup();
        let actor = ActorId::from("0xABC");
        for amount in ["1.0", "2.0", "3.0", "4.0"] {
            store.append(&actor, message("0xABC", amount)).await.unwrap();
        }

        let timeline = store.timeline(&actor, 2).await.unwrap();
        assert_eq!(timeline.len(), 2);
        // The two newest, oldest-first.
        assert_eq!(timeline[0].seq, 3);
        assert_eq!(timeline[1].seq, 4);
    }
}
