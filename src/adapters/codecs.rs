//! Default codec implementations.
//!
//! Legacy databases carry call arguments as Python pickles (protocol 0 text)
//! inside string fields; JSON text is accepted for hand-made exports. The
//! scheduler reads recurrence rules as JSON text in `schedule`.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::domain::models::document::json_type_name;
use crate::domain::models::{IsoDuration, PayloadEncoding, RecurrenceRule};
use crate::domain::ports::{PayloadCodec, PayloadDecodeError, RecurrenceCodec};

/// Codec for the configured payload encoding.
pub fn payload_codec(encoding: PayloadEncoding) -> Arc<dyn PayloadCodec> {
    match encoding {
        PayloadEncoding::Pickle => Arc::new(PicklePayloadCodec),
        PayloadEncoding::Json => Arc::new(JsonPayloadCodec),
    }
}

fn encoded_text(blob: &Value) -> Result<&str, PayloadDecodeError> {
    blob.as_str().ok_or_else(|| {
        PayloadDecodeError(format!(
            "expected an encoded string, found {}",
            json_type_name(blob)
        ))
    })
}

/// Decodes argument blobs stored as Python pickles.
///
/// Python 2 byte strings (`S'...'`) are decoded as UTF-8 so they come out as
/// JSON strings; tuples and sets become arrays.
#[derive(Debug, Clone, Copy, Default)]
pub struct PicklePayloadCodec;

impl PayloadCodec for PicklePayloadCodec {
    fn decode(&self, blob: &Value) -> Result<Value, PayloadDecodeError> {
        let text = encoded_text(blob)?;
        let options = serde_pickle::DeOptions::new().decode_strings();
        serde_pickle::from_slice(text.as_bytes(), options).map_err(|e| PayloadDecodeError(e.to_string()))
    }
}

/// Decodes argument blobs stored as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadCodec;

impl PayloadCodec for JsonPayloadCodec {
    fn decode(&self, blob: &Value) -> Result<Value, PayloadDecodeError> {
        serde_json::from_str(encoded_text(blob)?).map_err(|e| PayloadDecodeError(e.to_string()))
    }
}

/// Encodes a period as a fixed-interval recurrence rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalRecurrenceCodec;

impl IntervalRecurrenceCodec {
    /// Read back a value produced by [`RecurrenceCodec::encode`].
    pub fn decode(value: &Value) -> Option<RecurrenceRule> {
        let parsed: Value = serde_json::from_str(value.as_str()?).ok()?;
        Some(RecurrenceRule {
            run_every_secs: parsed.get("run_every")?.as_u64()?,
            relative: parsed.get("relative")?.as_bool()?,
        })
    }
}

impl RecurrenceCodec for IntervalRecurrenceCodec {
    fn encode(&self, period: &IsoDuration) -> Value {
        let rule = RecurrenceRule::every(period);
        Value::String(
            json!({
                "type": "interval",
                "run_every": rule.run_every_secs,
                "relative": rule.relative,
            })
            .to_string(),
        )
    }
}
