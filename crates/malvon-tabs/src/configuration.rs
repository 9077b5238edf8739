//! Shared web configuration
//!
//! A profile owns one [`WebConfiguration`] behind an `Arc`; its tabs refer
//! to it through [`ConfigurationHandle`], which never keeps it alive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// Where cookies, cache and local storage live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoragePartition {
    /// On-disk store keyed by a stable identifier
    Persistent(Uuid),
    /// In-memory store discarded with the profile
    Ephemeral,
}

impl StoragePartition {
    pub fn is_persistent(&self) -> bool {
        matches!(self, StoragePartition::Persistent(_))
    }
}

/// Renderer preferences enabled for every profile.
const DEFAULT_PREFERENCES: &[(&str, bool)] = &[
    ("allowsPictureInPictureMediaPlayback", true),
    ("acceleratedCompositingEnabled", true),
    ("webGLEnabled", true),
    ("mediaSourceEnabled", true),
    ("developerExtrasEnabled", true),
    ("elementFullscreenEnabled", true),
    ("backspaceKeyNavigationEnabled", false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfiguration {
    pub partition: StoragePartition,
    pub preferences: BTreeMap<String, bool>,
}

impl WebConfiguration {
    pub fn persistent(partition_id: Uuid) -> Self {
        Self::with_partition(StoragePartition::Persistent(partition_id))
    }

    pub fn ephemeral() -> Self {
        Self::with_partition(StoragePartition::Ephemeral)
    }

    fn with_partition(partition: StoragePartition) -> Self {
        Self {
            partition,
            preferences: DEFAULT_PREFERENCES
                .iter()
                .map(|(key, value)| (key.to_string(), *value))
                .collect(),
        }
    }

    pub fn preference(&self, key: &str) -> Option<bool> {
        self.preferences.get(key).copied()
    }
}

impl Default for WebConfiguration {
    /// Used when a tab lost its profile's configuration: nothing persists.
    fn default() -> Self {
        Self::ephemeral()
    }
}

/// Non-owning reference from a tab to its profile's configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationHandle(Weak<WebConfiguration>);

impl ConfigurationHandle {
    pub fn new(configuration: &Arc<WebConfiguration>) -> Self {
        Self(Arc::downgrade(configuration))
    }

    /// A handle that refers to nothing.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    pub fn upgrade(&self) -> Option<Arc<WebConfiguration>> {
        self.0.upgrade()
    }

    pub fn is_attached(&self) -> bool {
        self.0.strong_count() > 0
    }
}
