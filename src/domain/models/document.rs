//! Schemaless document model shared by every collection.
//!
//! Documents are JSON objects keyed by an `_id` field. Legacy dumps may carry
//! the identifier in extended-JSON form (`{"$oid": "..."}`); [`Document::id`]
//! accepts both.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field on every document.
pub const ID_FIELD: &str = "_id";

/// A single stored document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create a document with only its identifier set.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.insert(ID_FIELD, Value::String(id.into()));
        doc
    }

    /// The document identifier, if present and textual.
    pub fn id(&self) -> Option<&str> {
        match self.0.get(ID_FIELD)? {
            Value::String(s) => Some(s),
            Value::Object(obj) => obj.get("$oid").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Identifier for log and error messages; never fails.
    pub fn display_id(&self) -> String {
        self.id().map_or_else(|| "<no _id>".to_string(), str::to_string)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.shift_remove(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Copy of this document restricted to `fields` plus `_id`.
    pub fn project(&self, fields: &[&str]) -> Self {
        let map = self
            .0
            .iter()
            .filter(|(k, _)| k.as_str() == ID_FIELD || fields.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self(map)
    }

    /// Apply a partial update in place. Sets run before unsets.
    pub fn apply(&mut self, update: &FieldUpdate) {
        for (field, value) in &update.set {
            self.0.insert(field.clone(), value.clone());
        }
        for field in &update.unset {
            self.0.shift_remove(field);
        }
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Document {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(format!("expected a JSON object, found {}", json_type_name(&other))),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

/// Partial field update applied to one or many documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    set: Vec<(String, Value)>,
    unset: Vec<String>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((field.into(), value.into()));
        self
    }

    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.unset.push(field.into());
        self
    }

    pub fn sets(&self) -> &[(String, Value)] {
        &self.set
    }

    pub fn unsets(&self) -> &[String] {
        &self.unset
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }
}

/// Short JSON type name used in error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
