//! Codec ports for the opaque values embedded in legacy schedules.

use serde_json::Value;
use thiserror::Error;

use crate::domain::models::IsoDuration;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PayloadDecodeError(pub String);

/// Decodes an encoded argument blob into native values.
pub trait PayloadCodec: Send + Sync {
    fn decode(&self, blob: &Value) -> Result<Value, PayloadDecodeError>;
}

/// Encodes a schedule period into the form stored in `schedule`.
pub trait RecurrenceCodec: Send + Sync {
    fn encode(&self, period: &IsoDuration) -> Value;
}
