//! The dual-write orchestrator.

use std::sync::Arc;
use std::time::Duration;

use ainon_types::action::{ActionRecord, ActorId};
use ainon_types::error::RecordError;
use ainon_types::outcome::{RecordOutcome, RecordResult, WriteStatus};
use ainon_types::payload::{KnowledgeDocument, MemoryMessage};
use ainon_types::store::{KnowledgeStore, MemoryStore};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::retry::{retry_write, RetryConfig, RetryOutcome};

/// The backends enabled in this deployment.
///
/// Either side may be absent: a deployment can run memory-only or
/// knowledge-only without a separate code path. An unconfigured side is
/// reported as [`WriteStatus::Skipped`].
#[derive(Clone, Default)]
pub struct BackendSet {
    memory: Option<Arc<dyn MemoryStore>>,
    knowledge: Option<Arc<dyn KnowledgeStore>>,
}

impl BackendSet {
    /// An empty set; add sides with the `with_*` methods.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable the conversational memory backend.
    pub fn with_memory(mut self, store: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(store);
        self
    }

    /// Enable the semantic knowledge backend.
    pub fn with_knowledge(mut self, store: Arc<dyn KnowledgeStore>) -> Self {
        self.knowledge = Some(store);
        self
    }

    /// True when no backend is configured.
    pub fn is_empty(&self) -> bool {
        self.memory.is_none() && self.knowledge.is_none()
    }
}

/// Tuning for the recorder's write path.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Retry policy applied to each backend write independently.
    pub retry: RetryConfig,
    /// Bound on one side's total latency, retries included. On expiry the
    /// in-flight write is abandoned and the side reports
    /// [`WriteStatus::TimedOut`].
    pub write_timeout: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Records agent actions as durable facts in both configured backends.
///
/// Holds no locks and no resources beyond the injected store handles; the
/// process entry point owns backend lifecycle.
pub struct ActionRecorder {
    backends: BackendSet,
    config: RecorderConfig,
}

impl ActionRecorder {
    /// Create a recorder with default retry/timeout tuning.
    pub fn new(backends: BackendSet) -> Self {
        Self::with_config(backends, RecorderConfig::default())
    }

    /// Create a recorder with explicit tuning.
    pub fn with_config(backends: BackendSet, config: RecorderConfig) -> Self {
        Self { backends, config }
    }

    /// Validate raw inputs and record the action in both backends.
    ///
    /// Validation failures return before either backend is contacted. The
    /// two writes then run concurrently and independently; the call waits
    /// for both (retries included) and reports a composite result rather
    /// than pretending the pair is atomic. Only when every attempted side
    /// fails does the call itself fail, with both reasons aggregated.
    pub async fn record(
        &self,
        actor: &str,
        kind: &str,
        strategy: &str,
        amount: &str,
    ) -> Result<RecordResult, RecordError> {
        let action = ActionRecord::new(actor, kind, strategy, amount)?;
        self.record_action(&action).await
    }

    /// Record a previously built action.
    ///
    /// This is the compensation path: replaying an action keeps its record
    /// id, so a backend that already holds the entry deduplicates instead
    /// of duplicating.
    pub async fn record_action(&self, action: &ActionRecord) -> Result<RecordResult, RecordError> {
        if self.backends.is_empty() {
            warn!("no backends configured; nothing will be recorded");
        }

        let message = MemoryMessage::from_action(action);
        let document = KnowledgeDocument::from_action(action);

        // Independent writes: neither blocks the other, and one side
        // failing never rolls the other back.
        let (memory, knowledge) = tokio::join!(
            self.write_memory(action.actor(), message),
            self.write_knowledge(document),
        );

        let result = RecordResult {
            record_id: action.record_id().clone(),
            memory,
            knowledge,
        };

        match result.outcome() {
            RecordOutcome::BothFailed => {
                warn!(record_id = %result.record_id, "both backend writes failed");
                Err(RecordError::DualWriteFailure {
                    memory: result.memory.to_string(),
                    knowledge: result.knowledge.to_string(),
                })
            }
            outcome => {
                if result.is_partial() {
                    warn!(
                        record_id = %result.record_id,
                        ?outcome,
                        "partial write; replay the failed side with the same record id"
                    );
                } else {
                    info!(record_id = %result.record_id, "action recorded");
                }
                Ok(result)
            }
        }
    }

    async fn write_memory(&self, actor: &ActorId, message: MemoryMessage) -> WriteStatus {
        let Some(store) = &self.backends.memory else {
            return WriteStatus::Skipped;
        };
        let record_id = message.record_id.clone();

        let write = retry_write(&self.config.retry, || store.append(actor, message.clone()));
        match timeout(self.config.write_timeout, write).await {
            Ok(RetryOutcome::Success { result, attempts }) => {
                if result.deduplicated {
                    debug!(record_id = %record_id, "memory entry already present");
                }
                WriteStatus::Success { attempts }
            }
            Ok(RetryOutcome::Exhausted {
                last_error,
                attempts,
            }) => WriteStatus::Failed {
                reason: last_error.to_string(),
                attempts,
            },
            Err(_) => {
                warn!(record_id = %record_id, "memory write timed out; outcome unknown");
                WriteStatus::TimedOut
            }
        }
    }

    async fn write_knowledge(&self, document: KnowledgeDocument) -> WriteStatus {
        let Some(store) = &self.backends.knowledge else {
            return WriteStatus::Skipped;
        };
        let record_id = document.record_id.clone();

        let write = retry_write(&self.config.retry, || store.index(document.clone()));
        match timeout(self.config.write_timeout, write).await {
            Ok(RetryOutcome::Success { result, attempts }) => {
                if result.deduplicated {
                    debug!(record_id = %record_id, "knowledge document already present");
                }
                WriteStatus::Success { attempts }
            }
            Ok(RetryOutcome::Exhausted {
                last_error,
                attempts,
            }) => WriteStatus::Failed {
                reason: last_error.to_string(),
                attempts,
            },
            Err(_) => {
                warn!(record_id = %record_id, "knowledge write timed out; outcome unknown");
                WriteStatus::TimedOut
            }
        }
    }
}
