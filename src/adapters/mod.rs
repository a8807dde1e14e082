//! Adapters implementing the domain ports.

pub mod codecs;
pub mod json_dump;
pub mod memory;
pub mod sqlite;

pub use codecs::{payload_codec, IntervalRecurrenceCodec, JsonPayloadCodec, PicklePayloadCodec};
pub use memory::InMemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;
