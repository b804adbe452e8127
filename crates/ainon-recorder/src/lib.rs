//! The Ainon action recorder.
//!
//! Accepts one structured agent action, validates it, and fans it out to the
//! conversational memory store and the semantic knowledge store. The two
//! writes are independent (no cross-backend transaction); each side gets
//! bounded retries with backoff, and the caller always receives a composite
//! result naming what happened on each side.

pub mod recorder;
pub mod retry;

pub use recorder::{ActionRecorder, BackendSet, RecorderConfig};
pub use retry::{RetryConfig, RetryOutcome};
