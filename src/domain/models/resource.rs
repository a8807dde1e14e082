//! Resource identifiers linking a schedule to the entity it acts on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix of the tag marking a consumer-owned schedule.
pub const CONSUMER_TAG_PREFIX: &str = "pulp:consumer:";

const IMPORTER_PREFIX: &str = "pulp:importer:";
const DISTRIBUTOR_PREFIX: &str = "pulp:distributor:";

/// The owner of a schedule, rendered as `pulp:<kind>:...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    Importer { repo_id: String, importer_id: String },
    Distributor { repo_id: String, distributor_id: String },
    /// Full tag value, kept verbatim.
    Consumer(String),
}

impl ResourceId {
    pub fn importer(repo_id: impl Into<String>, importer_id: impl Into<String>) -> Self {
        Self::Importer {
            repo_id: repo_id.into(),
            importer_id: importer_id.into(),
        }
    }

    pub fn distributor(repo_id: impl Into<String>, distributor_id: impl Into<String>) -> Self {
        Self::Distributor {
            repo_id: repo_id.into(),
            distributor_id: distributor_id.into(),
        }
    }

    /// Wrap a tag if it follows the consumer tag convention.
    pub fn from_consumer_tag(tag: &str) -> Option<Self> {
        tag.starts_with(CONSUMER_TAG_PREFIX)
            .then(|| Self::Consumer(tag.to_string()))
    }

    /// First consumer tag in list order.
    pub fn first_consumer_tag<'a, I>(tags: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter().find_map(Self::from_consumer_tag)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Importer { .. } => "importer",
            Self::Distributor { .. } => "distributor",
            Self::Consumer(_) => "consumer",
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Importer { repo_id, importer_id } => {
                write!(f, "{IMPORTER_PREFIX}{repo_id}:{importer_id}")
            }
            Self::Distributor {
                repo_id,
                distributor_id,
            } => write!(f, "{DISTRIBUTOR_PREFIX}{repo_id}:{distributor_id}"),
            Self::Consumer(tag) => f.write_str(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a recognised resource identifier")]
pub struct ResourceParseError(pub String);

impl FromStr for ResourceId {
    type Err = ResourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ResourceParseError(s.to_string());
        if let Some(consumer) = s.strip_prefix(CONSUMER_TAG_PREFIX) {
            return if consumer.is_empty() {
                Err(invalid())
            } else {
                Ok(Self::Consumer(s.to_string()))
            };
        }
        let (prefix, rest) = if let Some(rest) = s.strip_prefix(IMPORTER_PREFIX) {
            (IMPORTER_PREFIX, rest)
        } else if let Some(rest) = s.strip_prefix(DISTRIBUTOR_PREFIX) {
            (DISTRIBUTOR_PREFIX, rest)
        } else {
            return Err(invalid());
        };
        // Repository ids cannot contain ':'; plugin ids may.
        let (repo_id, child_id) = rest.split_once(':').ok_or_else(invalid)?;
        if repo_id.is_empty() || child_id.is_empty() {
            return Err(invalid());
        }
        Ok(if prefix == IMPORTER_PREFIX {
            Self::importer(repo_id, child_id)
        } else {
            Self::distributor(repo_id, child_id)
        })
    }
}
