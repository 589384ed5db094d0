//! Canonical processing-element records.

use serde::{Deserialize, Serialize};

use super::family::{CpuFamily, OsHint};

/// One processing unit from the hardware topology.
///
/// Elements are created once by the topology normalizer and immutable
/// afterwards. The element name is the unique key in the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Unique element name (e.g. `psu_cortexa53_0`).
    pub name: String,
    pub family: CpuFamily,
    /// Core index within the cluster.
    pub core: u32,
    /// Execution domain tag. The `"none"` sentinel normalizes to `None`.
    pub domain: Option<String>,
    pub os_hint: OsHint,
}

impl Element {
    pub fn new(
        name: impl Into<String>,
        family: CpuFamily,
        core: u32,
        domain: Option<String>,
        os_hint: OsHint,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            core,
            domain: normalize_domain(domain),
            os_hint,
        }
    }
}

/// Normalize the `"none"`/`"None"` sentinel and empty tags to `None`.
pub fn normalize_domain(domain: Option<String>) -> Option<String> {
    domain.filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("none"))
}
