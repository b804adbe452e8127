//! Action records: the immutable unit of work the recorder persists.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::ValidationError;

/// Identity of the wallet/agent an action is recorded on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    /// Borrow the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Deterministic idempotency key for one recorded action.
///
/// Derived from the action's identity fields, so replaying the same record
/// (e.g. when compensating a partial failure) hits the same key in both
/// backends and deduplicates instead of duplicating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last timestamp handed out, in epoch millis. Guards per-process monotonicity.
static LAST_TIMESTAMP_MS: AtomicI64 = AtomicI64::new(0);

/// Wall-clock now, bumped by 1 ms whenever it would not advance past the
/// previous call in this process.
fn monotonic_now() -> DateTime<Utc> {
    let now_ms = Utc::now().timestamp_millis();
    let mut prev = LAST_TIMESTAMP_MS.load(Ordering::Relaxed);
    loop {
        let next = now_ms.max(prev + 1);
        match LAST_TIMESTAMP_MS.compare_exchange_weak(
            prev,
            next,
            Ordering::SeqCst,
            Ordering::Relaxed,
        ) {
            Ok(_) => {
                return Utc
                    .timestamp_millis_opt(next)
                    .single()
                    .unwrap_or_else(Utc::now)
            }
            Err(observed) => prev = observed,
        }
    }
}

/// One agent action, validated and ready to be written to both backends.
///
/// Construction either yields a fully populated record or fails with a
/// [`ValidationError`]; there is no partially filled state, and the fields
/// cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    actor: ActorId,
    kind: String,
    strategy: String,
    amount: String,
    timestamp: DateTime<Utc>,
    record_id: RecordId,
}

impl ActionRecord {
    /// Validate the raw inputs and build a record stamped with the current
    /// (process-monotonic) time.
    pub fn new(
        actor: &str,
        kind: &str,
        strategy: &str,
        amount: &str,
    ) -> Result<Self, ValidationError> {
        Self::with_timestamp(actor, kind, strategy, amount, monotonic_now())
    }

    /// Validate the raw inputs and build a record with an explicit timestamp.
    ///
    /// Used when replaying a previously built record (compensation after a
    /// partial failure): the same inputs and timestamp derive the same
    /// record id, so the retried write deduplicates.
    pub fn with_timestamp(
        actor: &str,
        kind: &str,
        strategy: &str,
        amount: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let actor = required("actor", actor)?;
        let kind = required("action", kind)?;
        let strategy = required("strategy", strategy)?;
        let amount = validated_amount(amount)?;

        let record_id = derive_record_id(
            &actor,
            timestamp.timestamp_millis(),
            &kind,
            &strategy,
            &amount,
        );

        Ok(Self {
            actor: ActorId(actor),
            kind,
            strategy,
            amount,
            timestamp,
            record_id,
        })
    }

    /// The acting wallet/agent identity.
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// What was done, e.g. "swap" or "stake".
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Label of the decision strategy that produced the action.
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// The quantity involved, in its canonical (trimmed) textual form.
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// When the recorder accepted the action.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The idempotency key shared by both backend payloads.
    pub fn record_id(&self) -> &RecordId {
        &self.record_id
    }
}

/// Trim a required field, rejecting empty/whitespace-only values.
fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Validate the amount as a finite, non-negative decimal.
///
/// The canonical form is the trimmed original text: both backends carry the
/// amount as a string on the wire, so normalizing the numeric value here
/// would change what gets persisted.
fn validated_amount(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("amount"));
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(trimmed.to_string()),
        _ => Err(ValidationError::InvalidAmount(trimmed.to_string())),
    }
}

/// Derive the idempotency key from the action's identity fields.
fn derive_record_id(
    actor: &str,
    timestamp_ms: i64,
    kind: &str,
    strategy: &str,
    amount: &str,
) -> RecordId {
    let mut hasher = Sha256::new();
    for part in [actor, &timestamp_ms.to_string(), kind, strategy, amount] {
        hasher.update(part.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hex::encode(hasher.finalize());
    RecordId(digest[..32].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_fields() {
        assert_eq!(
            ActionRecord::new("", "swap", "momentum", "1.5"),
            Err(ValidationError::EmptyField("actor"))
        );
        assert_eq!(
            ActionRecord::new("0xABC", "  ", "momentum", "1.5"),
            Err(ValidationError::EmptyField("action"))
        );
        assert_eq!(
            ActionRecord::new("0xABC", "swap", "", "1.5"),
            Err(ValidationError::EmptyField("strategy"))
        );
        assert_eq!(
            ActionRecord::new("0xABC", "swap", "momentum", ""),
            Err(ValidationError::EmptyField("amount"))
        );
    }

    #[test]
    fn test_rejects_malformed_amounts() {
        for bad in ["abc", "-1", "-0.5", "NaN", "inf", "1.5 BNB"] {
            let result = ActionRecord::new("0xABC", "swap", "momentum", bad);
            assert!(
                matches!(result, Err(ValidationError::InvalidAmount(_))),
                "amount '{bad}' should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_accepts_well_formed_amounts() {
        for good in ["1.5", "0", "0.0001", " 2 "] {
            assert!(ActionRecord::new("0xABC", "swap", "momentum", good).is_ok());
        }
    }

    #[test]
    fn test_record_id_deterministic_for_same_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let a = ActionRecord::with_timestamp("0xABC", "swap", "momentum", "1.5", ts).unwrap();
        let b = ActionRecord::with_timestamp("0xABC", "swap", "momentum", "1.5", ts).unwrap();
        assert_eq!(a.record_id(), b.record_id());
        assert_eq!(a, b);
    }

    #[test]
    fn test_record_id_differs_across_inputs() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let base = ActionRecord::with_timestamp("0xABC", "swap", "momentum", "1.5", ts).unwrap();
        let other_actor =
            ActionRecord::with_timestamp("0xDEF", "swap", "momentum", "1.5", ts).unwrap();
        let other_amount =
            ActionRecord::with_timestamp("0xABC", "swap", "momentum", "2.5", ts).unwrap();
        assert_ne!(base.record_id(), other_actor.record_id());
        assert_ne!(base.record_id(), other_amount.record_id());
    }

    #[test]
    fn test_timestamps_monotonic_per_process() {
        let first = ActionRecord::new("0xABC", "swap", "momentum", "1.5").unwrap();
        let second = ActionRecord::new("0xABC", "swap", "momentum", "1.5").unwrap();
        assert!(second.timestamp() > first.timestamp());
        assert_ne!(first.record_id(), second.record_id());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let record = ActionRecord::new(" 0xABC ", " swap", "momentum ", " 1.5 ").unwrap();
        assert_eq!(record.actor().as_str(), "0xABC");
        assert_eq!(record.kind(), "swap");
        assert_eq!(record.strategy(), "momentum");
        assert_eq!(record.amount(), "1.5");
    }
}
