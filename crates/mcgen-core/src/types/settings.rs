//! Settings table accumulated during resolution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value settings populated while resolving firmware-role configurations
/// and read back by the artifact synthesizer.
///
/// The resolver owns the table exclusively; downstream consumers get it
/// read-only. Backed by a `BTreeMap` so iteration order is deterministic and
/// rendered artifacts are byte-identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsTable(BTreeMap<String, String>);

impl SettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
