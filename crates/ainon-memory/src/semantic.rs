//! Semantic knowledge index backed by SQLite.
//!
//! Search is LIKE-based content matching, newest first. Good enough for a
//! single-node deployment; a vector index can slot in behind the same trait.

use ainon_types::action::RecordId;
use ainon_types::error::{BackendError, BackendResult};
use ainon_types::payload::KnowledgeDocument;
use ainon_types::store::{KnowledgeStore, WriteAck};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::{classify_sqlite, SharedConnection};

/// Knowledge document index backed by SQLite.
#[derive(Clone)]
pub struct SemanticIndex {
    conn: SharedConnection,
}

impl SemanticIndex {
    /// Create a new index wrapping the given connection.
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl KnowledgeStore for SemanticIndex {
    async fn index(&self, document: KnowledgeDocument) -> BackendResult<WriteAck> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BackendError::Permanent(e.to_string()))?;
        let metadata = serde_json::to_string(&document.metadata)
            .map_err(|e| BackendError::Permanent(e.to_string()))?;

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO documents (record_id, content, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    document.record_id.as_str(),
                    document.content,
                    metadata,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(classify_sqlite)?;

        let deduplicated = inserted == 0;
        if deduplicated {
            debug!(record_id = %document.record_id, "duplicate document ignored");
        }

        Ok(WriteAck {
            record_id: document.record_id,
            deduplicated,
        })
    }

    async fn search(&self, query: &str, limit: usize) -> BackendResult<Vec<KnowledgeDocument>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BackendError::Permanent(e.to_string()))?;

        let mut sql = String::from("SELECT content, metadata, record_id FROM documents");
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
        if !query.is_empty() {
            sql.push_str(" WHERE content LIKE ?1");
            params.push(Box::new(format!("%{query}%")));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        sql.push_str(&format!(" LIMIT {limit}"));

        let mut stmt = conn.prepare(&sql).map_err(classify_sqlite)?;
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(classify_sqlite)?;

        let mut documents = Vec::new();
        for row in rows {
            let (content, meta_str, record_id) = row.map_err(classify_sqlite)?;
            let metadata = serde_json::from_str(&meta_str).unwrap_or_default();
            documents.push(KnowledgeDocument {
                content,
                metadata,
                record_id: RecordId(record_id),
            });
        }
        Ok(documents)
    }
}
