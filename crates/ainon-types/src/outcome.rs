//! Composite result of a dual write.
//!
//! The two backend writes are attempted independently; neither blocks the
//! other and the pair is not a transaction. The caller always learns what
//! happened on each side, so a partial success is never silent.

use serde::{Deserialize, Serialize};

use crate::action::RecordId;

/// Terminal status of one backend write, after retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    /// The write was acknowledged.
    Success {
        /// Attempts made (1 = first try succeeded).
        attempts: u32,
    },
    /// The write failed and no further attempts will be made.
    Failed {
        /// Why the last attempt failed.
        reason: String,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// The write did not complete within the per-call timeout. The in-flight
    /// attempt was abandoned but the backend may still complete it out of
    /// band: treat this as unknown, not failed.
    TimedOut,
    /// The backend is not configured in this deployment.
    Skipped,
}

impl WriteStatus {
    /// Whether the write was acknowledged.
    pub fn is_success(&self) -> bool {
        matches!(self, WriteStatus::Success { .. })
    }

    /// Whether the side needs compensation (failed outright or outcome
    /// unknown). A skipped side never counts.
    pub fn needs_compensation(&self) -> bool {
        matches!(self, WriteStatus::Failed { .. } | WriteStatus::TimedOut)
    }
}

impl std::fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteStatus::Success { attempts } => write!(f, "ok ({attempts} attempt(s))"),
            WriteStatus::Failed { reason, attempts } => {
                write!(f, "failed after {attempts} attempt(s): {reason}")
            }
            WriteStatus::TimedOut => write!(f, "timed out (outcome unknown)"),
            WriteStatus::Skipped => write!(f, "skipped (not configured)"),
        }
    }
}

/// The four terminal states of a single record call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// Every attempted side was acknowledged.
    BothOk,
    /// The memory write landed; the knowledge write needs compensation.
    MemoryOnlyOk,
    /// The knowledge write landed; the memory write needs compensation.
    KnowledgeOnlyOk,
    /// Every attempted side failed.
    BothFailed,
}

/// What happened to one recorded action, per backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    /// Idempotency key of the action; re-submitting with this key is safe.
    pub record_id: RecordId,
    /// Status of the memory timeline write.
    pub memory: WriteStatus,
    /// Status of the knowledge index write.
    pub knowledge: WriteStatus,
}

impl RecordResult {
    /// Collapse the two side statuses into the call's terminal state.
    ///
    /// Defined over the attempted sides: a skipped backend counts as
    /// not-failed, so a memory-only deployment whose single write lands
    /// reports `BothOk`.
    pub fn outcome(&self) -> RecordOutcome {
        match (
            self.memory.needs_compensation(),
            self.knowledge.needs_compensation(),
        ) {
            (false, false) => RecordOutcome::BothOk,
            (false, true) => RecordOutcome::MemoryOnlyOk,
            (true, false) => RecordOutcome::KnowledgeOnlyOk,
            (true, true) => RecordOutcome::BothFailed,
        }
    }

    /// True when exactly one attempted side failed.
    pub fn is_partial(&self) -> bool {
        matches!(
            self.outcome(),
            RecordOutcome::MemoryOnlyOk | RecordOutcome::KnowledgeOnlyOk
        )
    }
}
