//! Candidate and resolved build configurations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::family::{CpuFamily, OsHint};

/// Role a configuration plays in the deployed stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Linux,
    Baremetal,
    Freertos,
    /// First-stage boot loader (a baremetal image with the `fsbl` domain).
    Fsbl,
    /// Dedicated firmware controller image (PMU/PLM/PSM).
    FirmwareStage,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Linux => "linux",
            Role::Baremetal => "baremetal",
            Role::Freertos => "freertos",
            Role::Fsbl => "fsbl",
            Role::FirmwareStage => "firmware-stage",
        };
        f.write_str(name)
    }
}

/// A possible build target derived from one topology element, before user
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Derived multiconfig name. Empty denotes the implicit default Linux
    /// configuration, which has no descriptor file of its own.
    pub name: String,
    /// Name of the source element.
    pub element: String,
    pub family: CpuFamily,
    pub core: u32,
    pub domain: Option<String>,
    pub role: Role,
    /// Member of the minimal default set enabled absent user selection.
    pub minimal: bool,
    /// Hint carried from the element; decides the LTO profile split.
    pub os_hint: OsHint,
}

impl Candidate {
    /// True for the implicit default Linux configuration.
    pub fn is_implicit_linux(&self) -> bool {
        self.role == Role::Linux && self.name.is_empty()
    }
}

/// Derive the deterministic multiconfig name for a candidate.
///
/// Naming follows the downstream convention: `{family}-{core}[-{domain}]-{role}`
/// for baremetal and FreeRTOS, `{family}-{core}-fsbl-baremetal` for the boot
/// loader, and `{family}-{domain}-linux` for a domain-qualified Linux
/// configuration (empty for the default one). Firmware stages use their fixed
/// controller names (`microblaze-pmu`, ...).
pub fn mc_name(family: CpuFamily, core: u32, domain: Option<&str>, role: Role) -> String {
    let prefix = family.mc_prefix();
    match role {
        Role::Linux => domain
            .map(|d| format!("{prefix}-{d}-linux"))
            .unwrap_or_default(),
        Role::Fsbl => format!("{prefix}-{core}-fsbl-baremetal"),
        Role::Baremetal | Role::Freertos => {
            let suffix = domain.map(|d| format!("-{d}")).unwrap_or_default();
            format!("{prefix}-{core}{suffix}-{role}")
        }
        Role::FirmwareStage => prefix.to_string(),
    }
}

/// A candidate that survived selection, plus its tuning and rendering data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolved {
    pub candidate: Candidate,
    /// Distribution/profile tag (`standalone`, `standalone-nolto`, `freertos`).
    /// Linux configurations have none.
    pub distro: Option<String>,
    /// Tune identifier for `DEFAULTTUNE`.
    pub tune: Option<String>,
    /// Extra key/value lines appended to the descriptor.
    pub extra_lines: Vec<String>,
}

impl Resolved {
    /// Descriptor file stem: `{machine}-{name}`.
    pub fn conf_stem(&self, machine: &str) -> String {
        format!("{}-{}", machine, self.candidate.name)
    }
}
