//! Backend-specific payloads derived from an action record.
//!
//! One [`ActionRecord`] yields exactly one memory message and one knowledge
//! document. The two payloads share the record id so a caller can correlate
//! or deduplicate across backends; the id rides as a struct field rather than
//! a metadata entry so the wire metadata maps stay minimal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

use crate::action::{ActionRecord, RecordId};

/// Source tag stamped on everything this agent writes.
pub const SOURCE_TAG: &str = "AinonAgent";

/// Role recorded on memory messages.
pub const MESSAGE_ROLE: &str = "assistant";

/// A message appended to an actor's conversational timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMessage {
    /// Name of the writing agent.
    pub name: String,
    /// Conversational role.
    pub role: String,
    /// Human-readable description of the action.
    pub content: String,
    /// Wire metadata: `wallet`, `strategy`, `amount`.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Idempotency key, shared with the knowledge document.
    pub record_id: RecordId,
    /// When the recorder accepted the action.
    pub timestamp: DateTime<Utc>,
}

impl MemoryMessage {
    /// Derive the timeline message for an action.
    pub fn from_action(action: &ActionRecord) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("wallet".to_string(), json!(action.actor().as_str()));
        metadata.insert("strategy".to_string(), json!(action.strategy()));
        metadata.insert("amount".to_string(), json!(action.amount()));

        Self {
            name: SOURCE_TAG.to_string(),
            role: MESSAGE_ROLE.to_string(),
            content: format!(
                "User performed {} of {} BNB with strategy {}",
                action.kind(),
                action.amount(),
                action.strategy()
            ),
            metadata,
            record_id: action.record_id().clone(),
            timestamp: action.timestamp(),
        }
    }
}

/// A document inserted into the semantic knowledge index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Searchable description of the executed strategy.
    pub content: String,
    /// Wire metadata: `wallet`, `action`, `source`.
    pub metadata: HashMap<String, serde_json::Value>,
    /// Idempotency key, shared with the memory message.
    pub record_id: RecordId,
}

impl KnowledgeDocument {
    /// Derive the index document for an action.
    pub fn from_action(action: &ActionRecord) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("wallet".to_string(), json!(action.actor().as_str()));
        metadata.insert("action".to_string(), json!(action.kind()));
        metadata.insert("source".to_string(), json!(SOURCE_TAG));

        Self {
            content: format!(
                "Executed {} strategy via {} of {} BNB",
                action.strategy(),
                action.kind(),
                action.amount()
            ),
            metadata,
            record_id: action.record_id().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> ActionRecord {
        ActionRecord::new("0xABC", "swap", "momentum", "1.5").unwrap()
    }

    #[test]
    fn test_memory_message_shape() {
        let action = action();
        let message = MemoryMessage::from_action(&action);

        assert_eq!(message.name, "AinonAgent");
        assert_eq!(message.role, "assistant");
        assert_eq!(
            message.content,
            "User performed swap of 1.5 BNB with strategy momentum"
        );

        let mut expected = HashMap::new();
        expected.insert("wallet".to_string(), json!("0xABC"));
        expected.insert("strategy".to_string(), json!("momentum"));
        expected.insert("amount".to_string(), json!("1.5"));
        assert_eq!(message.metadata, expected);

        assert_eq!(&message.record_id, action.record_id());
        assert_eq!(message.timestamp, action.timestamp());
    }

    #[test]
    fn test_knowledge_document_shape() {
        let action = action();
        let document = KnowledgeDocument::from_action(&action);

        assert_eq!(
            document.content,
            "Executed momentum strategy via swap of 1.5 BNB"
        );

        let mut expected = HashMap::new();
        expected.insert("wallet".to_string(), json!("0xABC"));
        expected.insert("action".to_string(), json!("swap"));
        expected.insert("source".to_string(), json!("AinonAgent"));
        assert_eq!(document.metadata, expected);
    }

    #[test]
    fn test_payloads_share_record_id() {
        let action = action();
        let message = MemoryMessage::from_action(&action);
        let document = KnowledgeDocument::from_action(&action);
        assert_eq!(message.record_id, document.record_id);
    }
}
