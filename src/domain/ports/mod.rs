//! Port trait definitions (Hexagonal Architecture)
//!
//! - DocumentStore / DocumentCollection: named collections of JSON documents
//! - PayloadCodec: decoding of opaque encoded call arguments
//! - RecurrenceCodec: encoding of schedule periods for the scheduler
//!
//! The migration passes only see these traits; the store connection and the
//! concrete encodings are supplied by the adapters layer.

pub mod codecs;
pub mod document_store;

pub use codecs::{PayloadCodec, PayloadDecodeError, RecurrenceCodec};
pub use document_store::{DocumentCollection, DocumentStore};
