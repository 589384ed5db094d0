//! CPU family, SoC family, and OS hint enumerations.
//!
//! Families are a closed enumeration so that the expander dispatches with an
//! exhaustive `match`: adding a family is a compile-time-checked change, not
//! a silent "unknown cpu" fallthrough.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// CPU families understood by the configuration expander.
///
/// Parsed from the compatible strings emitted by the hardware-description
/// extractors (`arm,cortex-a53`, `xlnx,microblaze`, `pmu-microblaze`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CpuFamily {
    CortexA9,
    CortexA53,
    CortexA72,
    CortexA78,
    CortexR5,
    CortexR52,
    /// General-purpose microblaze, presumed Linux-hosted.
    Microblaze,
    /// ZynqMP platform-management unit.
    PmuMicroblaze,
    /// Versal platform-loader-and-manager controller.
    PmcMicroblaze,
    /// Versal power-system manager.
    PsmMicroblaze,
}

impl CpuFamily {
    /// Short prefix used in derived multiconfig names (`cortexa53-0-baremetal`).
    pub fn mc_prefix(self) -> &'static str {
        match self {
            CpuFamily::CortexA9 => "cortexa9",
            CpuFamily::CortexA53 => "cortexa53",
            CpuFamily::CortexA72 => "cortexa72",
            CpuFamily::CortexA78 => "cortexa78",
            CpuFamily::CortexR5 => "cortexr5",
            CpuFamily::CortexR52 => "cortexr52",
            CpuFamily::Microblaze => "microblaze",
            CpuFamily::PmuMicroblaze => "microblaze-pmu",
            CpuFamily::PmcMicroblaze => "microblaze-pmc",
            CpuFamily::PsmMicroblaze => "microblaze-psm",
        }
    }

    /// Default tune identifier for firmware and standalone configurations.
    ///
    /// cortex-a78 has no dedicated tune file yet and reuses cortexa72.
    pub fn tune(self) -> &'static str {
        match self {
            CpuFamily::CortexA9 => "cortexa9",
            CpuFamily::CortexA53 => "cortexa53",
            CpuFamily::CortexA72 => "cortexa72",
            CpuFamily::CortexA78 => "cortexa72",
            CpuFamily::CortexR5 => "cortexr5",
            CpuFamily::CortexR52 => "cortexr52",
            CpuFamily::Microblaze => "microblaze",
            CpuFamily::PmuMicroblaze => "microblaze-pmu",
            CpuFamily::PmcMicroblaze => "microblaze-pmc",
            CpuFamily::PsmMicroblaze => "microblaze-psm",
        }
    }

    /// True for the application-core families that can host Linux.
    pub fn is_application_core(self) -> bool {
        matches!(
            self,
            CpuFamily::CortexA9 | CpuFamily::CortexA53 | CpuFamily::CortexA72 | CpuFamily::CortexA78
        )
    }

    /// True for the real-time ARM families.
    pub fn is_realtime_core(self) -> bool {
        matches!(self, CpuFamily::CortexR5 | CpuFamily::CortexR52)
    }

    /// True for the dedicated firmware controllers (PMU/PMC/PSM).
    pub fn is_firmware_stage(self) -> bool {
        matches!(
            self,
            CpuFamily::PmuMicroblaze | CpuFamily::PmcMicroblaze | CpuFamily::PsmMicroblaze
        )
    }
}

impl fmt::Display for CpuFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mc_prefix())
    }
}

impl FromStr for CpuFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Compatible strings carry a vendor prefix ("arm,cortex-a53");
        // the firmware controllers do not.
        let tail = s.rsplit(',').next().unwrap_or(s);
        match tail {
            "cortex-a9" | "cortexa9" => Ok(CpuFamily::CortexA9),
            "cortex-a53" | "cortexa53" => Ok(CpuFamily::CortexA53),
            "cortex-a72" | "cortexa72" => Ok(CpuFamily::CortexA72),
            "cortex-a78" | "cortexa78" => Ok(CpuFamily::CortexA78),
            "cortex-r5" | "cortexr5" => Ok(CpuFamily::CortexR5),
            "cortex-r52" | "cortexr52" => Ok(CpuFamily::CortexR52),
            "microblaze" => Ok(CpuFamily::Microblaze),
            "pmu-microblaze" => Ok(CpuFamily::PmuMicroblaze),
            "pmc-microblaze" => Ok(CpuFamily::PmcMicroblaze),
            "psm-microblaze" => Ok(CpuFamily::PsmMicroblaze),
            _ => Err(CoreError::UnknownCpuFamily(s.to_string())),
        }
    }
}

/// Target SoC family. Gates first-stage boot loader emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SocFamily {
    Zynq,
    ZynqMp,
    Versal,
    VersalNet,
    Microblaze,
}

impl fmt::Display for SocFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocFamily::Zynq => "zynq",
            SocFamily::ZynqMp => "zynqmp",
            SocFamily::Versal => "versal",
            SocFamily::VersalNet => "versal-net",
            SocFamily::Microblaze => "microblaze",
        };
        f.write_str(name)
    }
}

impl FromStr for SocFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zynq" => Ok(SocFamily::Zynq),
            "zynqmp" => Ok(SocFamily::ZynqMp),
            "versal" => Ok(SocFamily::Versal),
            "versal-net" => Ok(SocFamily::VersalNet),
            "microblaze" => Ok(SocFamily::Microblaze),
            _ => Err(CoreError::UnknownSocFamily(s.to_string())),
        }
    }
}

/// Operating-system hint attached to a topology element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsHint {
    /// No hint: the expander applies the per-family defaults.
    #[default]
    None,
    Linux,
    Baremetal,
    Freertos,
    Fsbl,
}

impl OsHint {
    /// Parse an os-hint token.
    ///
    /// Hints are prefix-matched so qualified values such as `linux-dom0`
    /// still select the Linux role.
    pub fn from_token(token: &str) -> Result<Self, CoreError> {
        let token = token.to_ascii_lowercase();
        if token.is_empty() || token == "none" {
            Ok(OsHint::None)
        } else if token.starts_with("linux") {
            Ok(OsHint::Linux)
        } else if token.starts_with("baremetal") {
            Ok(OsHint::Baremetal)
        } else if token.starts_with("freertos") {
            Ok(OsHint::Freertos)
        } else if token.starts_with("fsbl") {
            Ok(OsHint::Fsbl)
        } else {
            Err(CoreError::UnknownOsHint(token))
        }
    }
}

impl fmt::Display for OsHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsHint::None => "none",
            OsHint::Linux => "linux",
            OsHint::Baremetal => "baremetal",
            OsHint::Freertos => "freertos",
            OsHint::Fsbl => "fsbl",
        };
        f.write_str(name)
    }
}
