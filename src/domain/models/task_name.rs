//! Canonical task identifiers and the legacy callable-name table.
//!
//! Only five kinds of call could ever be scheduled by the legacy dispatcher,
//! so the table is closed: any other callable name is an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The task a migrated schedule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduledTask {
    RepositoryPublish,
    RepositorySyncWithAutoPublish,
    ConsumerInstallContent,
    ConsumerUpdateContent,
    ConsumerUninstallContent,
}

/// Legacy callable name → canonical task.
const NAMES_TO_TASKS: [(&str, ScheduledTask); 5] = [
    ("publish_itinerary", ScheduledTask::RepositoryPublish),
    (
        "sync_with_auto_publish_itinerary",
        ScheduledTask::RepositorySyncWithAutoPublish,
    ),
    (
        "consumer_content_install_itinerary",
        ScheduledTask::ConsumerInstallContent,
    ),
    (
        "consumer_content_update_itinerary",
        ScheduledTask::ConsumerUpdateContent,
    ),
    (
        "consumer_content_uninstall_itinerary",
        ScheduledTask::ConsumerUninstallContent,
    ),
];

impl ScheduledTask {
    pub const ALL: [Self; 5] = [
        Self::RepositoryPublish,
        Self::RepositorySyncWithAutoPublish,
        Self::ConsumerInstallContent,
        Self::ConsumerUpdateContent,
        Self::ConsumerUninstallContent,
    ];

    /// Look up the task for a legacy callable name.
    pub fn from_callable_name(name: &str) -> Option<Self> {
        NAMES_TO_TASKS
            .iter()
            .find(|(legacy, _)| *legacy == name)
            .map(|(_, task)| *task)
    }

    /// Look up a task by its canonical identifier, either bare or qualified
    /// with `prefix`.
    pub fn from_canonical(identifier: &str, prefix: Option<&str>) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|task| identifier == task.as_str() || identifier == task.qualified(prefix))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RepositoryPublish => "repository.publish",
            Self::RepositorySyncWithAutoPublish => "repository.sync_with_auto_publish",
            Self::ConsumerInstallContent => "consumer.install_content",
            Self::ConsumerUpdateContent => "consumer.update_content",
            Self::ConsumerUninstallContent => "consumer.uninstall_content",
        }
    }

    /// Canonical identifier under an optional dotted module prefix,
    /// e.g. `pulp.server.tasks.repository.publish`.
    pub fn qualified(&self, prefix: Option<&str>) -> String {
        match prefix.map(|p| p.trim_end_matches('.')).filter(|p| !p.is_empty()) {
            Some(prefix) => format!("{prefix}.{}", self.as_str()),
            None => self.as_str().to_string(),
        }
    }

    pub fn legacy_name(&self) -> &'static str {
        NAMES_TO_TASKS
            .iter()
            .find(|(_, task)| task == self)
            .map_or("", |(legacy, _)| legacy)
    }
}

impl fmt::Display for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
