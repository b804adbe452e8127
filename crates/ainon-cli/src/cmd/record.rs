//! The `record` command: one action, two stores, explicit exit code.

use std::sync::Arc;

use ainon_memory::{SemanticIndex, TimelineStore};
use ainon_recorder::{ActionRecorder, BackendSet};
use ainon_types::error::RecordError;
use ainon_types::outcome::RecordOutcome;

use crate::config::RecorderSettings;

/// Both writes acknowledged.
pub const EXIT_OK: i32 = 0;
/// Malformed arguments; nothing was recorded.
pub const EXIT_VALIDATION: i32 = 1;
/// Exactly one side failed after retries.
pub const EXIT_PARTIAL: i32 = 2;
/// Both sides failed; nothing durable can be assumed.
pub const EXIT_TOTAL: i32 = 3;

/// Record one action and map the composite outcome onto an exit code.
pub async fn cmd_record(
    settings: &RecorderSettings,
    wallet: &str,
    action: &str,
    strategy: &str,
    amount: &str,
) -> i32 {
    let recorder = match build_recorder(settings) {
        Ok(recorder) => recorder,
        Err(e) => {
            eprintln!("cannot open backends: {e}");
            return EXIT_TOTAL;
        }
    };

    match recorder.record(wallet, action, strategy, amount).await {
        Ok(result) => {
            println!("record {}", result.record_id);
            println!("  memory:    {}", result.memory);
            println!("  knowledge: {}", result.knowledge);
            match result.outcome() {
                RecordOutcome::BothOk => EXIT_OK,
                _ => EXIT_PARTIAL,
            }
        }
        Err(RecordError::Validation(e)) => {
            eprintln!("invalid action: {e}");
            EXIT_VALIDATION
        }
        Err(e @ RecordError::DualWriteFailure { .. }) => {
            eprintln!("{e}");
            EXIT_TOTAL
        }
    }
}

/// Open the store once and wire the enabled backends into a recorder.
fn build_recorder(settings: &RecorderSettings) -> anyhow::Result<ActionRecorder> {
    if !settings.backends.memory && !settings.backends.knowledge {
        anyhow::bail!("no backends enabled in config");
    }

    let conn = ainon_memory::open_store(&settings.db_path())?;
    let mut backends = BackendSet::new();
    if settings.backends.memory {
        backends = backends.with_memory(Arc::new(TimelineStore::new(conn.clone())));
    }
    if settings.backends.knowledge {
        backends = backends.with_knowledge(Arc::new(SemanticIndex::new(conn)));
    }

    Ok(ActionRecorder::with_config(
        backends,
        settings.recorder_config(),
    ))
}
