//! Conversion of legacy scheduled-call documents into the new schedule shape.
//!
//! Conversion of a single record is pure: the legacy document is rewritten
//! in memory and only persisted once every step has succeeded, so a record
//! that fails to convert is left exactly as it was in the store.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::adapters::codecs::{payload_codec, IntervalRecurrenceCodec};
use crate::domain::errors::{MigrationError, MigrationResult};
use crate::domain::models::document::json_type_name;
use crate::domain::models::scheduled_call::legacy::call_request;
use crate::domain::models::scheduled_call::{fields, legacy};
use crate::domain::models::timestamp::{epoch_seconds, format_iso8601, parse_legacy_datetime};
use crate::domain::models::{Document, IsoInterval, MigrationSettings, PayloadEncoding, ResourceId, ScheduledTask};
use crate::domain::ports::{DocumentCollection, PayloadCodec, RecurrenceCodec};

/// Result of converting one record.
#[derive(Debug, Clone)]
pub struct ConvertedSchedule {
    pub document: Document,
    pub task: ScheduledTask,
    /// Set when the call request carried a consumer tag.
    pub resource: Option<ResourceId>,
}

/// Counters for a schedule conversion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub converted: usize,
    pub consumer_resources: usize,
    pub by_task: BTreeMap<String, usize>,
}

/// Rewrites legacy scheduled calls.
#[derive(Clone)]
pub struct ScheduleConverter {
    payload_codec: Arc<dyn PayloadCodec>,
    recurrence_codec: Arc<dyn RecurrenceCodec>,
    task_prefix: Option<String>,
}

impl Default for ScheduleConverter {
    fn default() -> Self {
        Self::new(payload_codec(PayloadEncoding::default()), Arc::new(IntervalRecurrenceCodec))
    }
}

impl ScheduleConverter {
    pub fn new(payload_codec: Arc<dyn PayloadCodec>, recurrence_codec: Arc<dyn RecurrenceCodec>) -> Self {
        Self {
            payload_codec,
            recurrence_codec,
            task_prefix: None,
        }
    }

    /// Converter using the payload encoding and task prefix from `settings`.
    pub fn from_settings(settings: &MigrationSettings) -> Self {
        Self::new(payload_codec(settings.payload_codec), Arc::new(IntervalRecurrenceCodec))
            .with_task_prefix(settings.task_prefix.clone())
    }

    /// Qualify task identifiers with a dotted module prefix.
    pub fn with_task_prefix(mut self, prefix: Option<String>) -> Self {
        self.task_prefix = prefix;
        self
    }

    /// Convert one legacy record, stamping it with the current time.
    pub fn convert(&self, legacy: Document) -> MigrationResult<ConvertedSchedule> {
        self.convert_at(legacy, Utc::now())
    }

    /// Convert one legacy record, stamping `last_updated` with `now`.
    pub fn convert_at(&self, legacy: Document, now: DateTime<Utc>) -> MigrationResult<ConvertedSchedule> {
        let record = legacy.display_id();
        let mut call = legacy;

        call.remove(legacy::CALL_EXIT_STATES);

        let run_count = call
            .remove(legacy::CALL_COUNT)
            .ok_or_else(|| MigrationError::missing(&record, legacy::CALL_COUNT))?;
        call.insert(fields::TOTAL_RUN_COUNT, run_count);

        let iso_schedule = match call.get(legacy::SCHEDULE) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(MigrationError::MalformedSchedule {
                    record,
                    schedule: other.to_string(),
                    reason: format!("expected a string, found {}", json_type_name(other)),
                })
            }
            None => return Err(MigrationError::missing(&record, legacy::SCHEDULE)),
        };
        call.insert(fields::ISO_SCHEDULE, Value::String(iso_schedule.clone()));

        // Start time and occurrence count are dropped; first_run drives the start.
        let interval = iso_schedule
            .parse::<IsoInterval>()
            .map_err(|e| MigrationError::MalformedSchedule {
                record: record.clone(),
                schedule: iso_schedule.clone(),
                reason: e.to_string(),
            })?;
        call.insert(fields::SCHEDULE, self.recurrence_codec.encode(&interval.period));

        let request = match call.remove(legacy::SERIALIZED_CALL_REQUEST) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(MigrationError::invalid(
                    &record,
                    legacy::SERIALIZED_CALL_REQUEST,
                    format!("expected an object, found {}", json_type_name(&other)),
                ))
            }
            None => return Err(MigrationError::missing(&record, legacy::SERIALIZED_CALL_REQUEST)),
        };
        call.insert(fields::ARGS, self.decode_payload(&record, &request, call_request::ARGS)?);
        call.insert(fields::KWARGS, self.decode_payload(&record, &request, call_request::KWARGS)?);
        let principal = request
            .get(call_request::PRINCIPAL)
            .cloned()
            .ok_or_else(|| MigrationError::missing(&record, request_field(call_request::PRINCIPAL)))?;
        call.insert(fields::PRINCIPAL, principal);

        call.remove(legacy::NEXT_RUN);

        let first_run = call
            .get(legacy::FIRST_RUN)
            .map(|v| parse_legacy_datetime(v).map_err(|e| MigrationError::invalid(&record, legacy::FIRST_RUN, e)))
            .transpose()?
            .flatten()
            .ok_or_else(|| MigrationError::missing(&record, legacy::FIRST_RUN))?;
        call.insert(fields::FIRST_RUN, Value::String(format_iso8601(&first_run)));

        let last_run = match call.remove(legacy::LAST_RUN) {
            Some(value) => {
                parse_legacy_datetime(&value).map_err(|e| MigrationError::invalid(&record, legacy::LAST_RUN, e))?
            }
            None => None,
        };
        call.insert(
            fields::LAST_RUN_AT,
            last_run.map_or(Value::Null, |dt| Value::String(format_iso8601(&dt))),
        );

        let task = resolve_task(&record, &request)?;
        call.insert(
            fields::TASK,
            Value::String(task.qualified(self.task_prefix.as_deref())),
        );

        call.insert(fields::LAST_UPDATED, Value::from(epoch_seconds(now)));

        let tags = request_tags(&record, &request)?;
        let resource = ResourceId::first_consumer_tag(tags);
        if let Some(ref resource) = resource {
            call.insert(fields::RESOURCE, Value::String(resource.to_string()));
        }

        Ok(ConvertedSchedule {
            document: call,
            task,
            resource,
        })
    }

    fn decode_payload(&self, record: &str, request: &Map<String, Value>, field: &str) -> MigrationResult<Value> {
        let blob = request
            .get(field)
            .ok_or_else(|| MigrationError::missing(record, request_field(field)))?;
        self.payload_codec
            .decode(blob)
            .map_err(|e| MigrationError::PayloadDecode {
                record: record.to_string(),
                field: request_field(field),
                reason: e.to_string(),
            })
    }
}

fn request_field(field: &str) -> String {
    format!("{}.{field}", legacy::SERIALIZED_CALL_REQUEST)
}

fn resolve_task(record: &str, request: &Map<String, Value>) -> MigrationResult<ScheduledTask> {
    let name = match request.get(call_request::CALLABLE_NAME) {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(MigrationError::invalid(
                record,
                request_field(call_request::CALLABLE_NAME),
                format!("expected a string, found {}", json_type_name(other)),
            ))
        }
        None => return Err(MigrationError::missing(record, request_field(call_request::CALLABLE_NAME))),
    };
    ScheduledTask::from_callable_name(name).ok_or_else(|| MigrationError::UnknownTask {
        record: record.to_string(),
        name: name.clone(),
    })
}

fn request_tags<'a>(record: &str, request: &'a Map<String, Value>) -> MigrationResult<Vec<&'a str>> {
    match request.get(call_request::TAGS) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(tags)) => tags
            .iter()
            .map(|tag| {
                tag.as_str().ok_or_else(|| {
                    MigrationError::invalid(
                        record,
                        request_field(call_request::TAGS),
                        format!("tag must be a string, found {}", json_type_name(tag)),
                    )
                })
            })
            .collect(),
        Some(other) => Err(MigrationError::invalid(
            record,
            request_field(call_request::TAGS),
            format!("expected a list, found {}", json_type_name(other)),
        )),
    }
}

/// Convert and persist every document in `schedules`.
///
/// Aborts on the first record that fails to convert; records converted
/// before it stay converted.
#[instrument(skip_all, fields(collection = %schedules.name()))]
pub async fn convert_schedules(
    schedules: &dyn DocumentCollection,
    converter: &ScheduleConverter,
) -> MigrationResult<ConversionReport> {
    let mut report = ConversionReport::default();

    for legacy in schedules.find(None).await? {
        let converted = converter.convert(legacy)?;
        debug!(
            schedule_id = %converted.document.display_id(),
            task = %converted.task,
            resource = ?converted.resource.as_ref().map(ToString::to_string),
            "converted scheduled call"
        );
        schedules.save(&converted.document).await?;

        report.converted += 1;
        if converted.resource.is_some() {
            report.consumer_resources += 1;
        }
        *report.by_task.entry(converted.task.to_string()).or_default() += 1;
    }

    info!(
        converted = report.converted,
        consumer_resources = report.consumer_resources,
        "schedule conversion pass complete"
    );
    Ok(report)
}
