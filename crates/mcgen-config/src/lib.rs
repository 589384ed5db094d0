//! Configuration primitives for mcgen.
//!
//! This crate parses the TOML-based `mcgen.toml` (at an explicit path or
//! discovered from the working directory upwards) so the CLI and the
//! resolution pipeline load the machine name, SoC family, enabled
//! multiconfig set, and per-component image source overrides from a single
//! schema.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mcgen_core::SocFamily;

pub(crate) type Result<T> = std::result::Result<T, ConfigError>;

/// Default project configuration file name.
pub const CONFIG_FILE: &str = "mcgen.toml";

/// Project configuration loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct McgenConfig {
    /// Target machine name; prefixes every descriptor file.
    pub machine: String,

    /// SoC family token (`zynq`, `zynqmp`, `versal`, `versal-net`,
    /// `microblaze`).
    pub soc_family: String,

    /// Multiconfig selection.
    pub multiconfig: MultiConfig,

    /// Programmable-logic overlay mode (`full` or `dfx`). Recorded for the
    /// external device-tree tooling; not interpreted here.
    pub overlay: Option<String>,

    /// Per-component image source overrides, keyed by component
    /// (`fsbl`, `r5fsbl`, `pmu`, `plm`, `psm`).
    pub components: HashMap<String, ComponentSource>,

    /// Output and search directories.
    pub dirs: Dirs,
}

/// Multiconfig selection options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MultiConfig {
    /// User-enabled configuration names. Empty selects the minimal set.
    pub enabled: Vec<String>,

    /// Enable the full candidate set instead of the minimal one.
    pub full: bool,
}

/// Where a boot component's image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Resolve through the multiconfig dependency (the normal path).
    #[default]
    Default,
    /// The image is already embedded in the base boot image; the stage is
    /// removed from the boot-image partition list.
    BaseImage,
    /// Take the image from the hardware-description directory.
    HwDescription,
    /// Take the image from an explicit local path.
    LocalPath,
}

/// Image source override for one boot component.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ComponentSource {
    pub source: SourceKind,

    /// Local path to the image (`source = "local-path"`).
    pub path: Option<PathBuf>,

    /// Image file name relative to the hardware-description directory
    /// (`source = "hw-description"`).
    pub image: Option<String>,
}

/// Output and search directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Dirs {
    /// Root for generated configuration artifacts. Descriptors land in
    /// `{config_dir}/multiconfig/`.
    pub config_dir: PathBuf,

    /// Directory holding the generated device-tree files referenced by
    /// descriptors.
    pub dts_dir: PathBuf,

    /// Directory with `psu_init.c`/`psu_init.h` for the first-stage boot
    /// loader. Falls back to the hardware-description directory.
    pub psu_init: Option<PathBuf>,

    /// Hardware-description directory searched by `hw-description` sources.
    pub hw_description: Option<PathBuf>,
}

impl Dirs {
    /// Directory the first-stage boot loader reads its init files from.
    /// Defaults to the hardware-description directory, then the working
    /// directory.
    pub fn psu_init_dir(&self) -> PathBuf {
        self.psu_init
            .clone()
            .or_else(|| self.hw_description.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for Dirs {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("conf"),
            dts_dir: PathBuf::from("dts"),
            psu_init: None,
            hw_description: None,
        }
    }
}

impl McgenConfig {
    /// Loads configuration from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_str(&contents)
    }

    /// Parses configuration from a TOML string and normalizes it.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self> {
        let mut config = toml::from_str::<McgenConfig>(contents).map_err(ConfigError::Parse)?;
        config.normalize();
        Ok(config)
    }

    /// Load configuration for the current working directory, walking up the
    /// ancestor chain until an `mcgen.toml` is found.
    pub fn discover() -> Result<Self> {
        let path = discover_path().ok_or(ConfigError::NotFound)?;
        Self::from_file(path)
    }

    /// Normalize the enabled set: lowercase, underscores to hyphens.
    fn normalize(&mut self) {
        for name in &mut self.multiconfig.enabled {
            *name = name.to_ascii_lowercase().replace('_', "-");
        }
    }

    /// Parsed SoC family.
    pub fn soc(&self) -> Result<SocFamily> {
        self.soc_family
            .parse()
            .map_err(|_| ConfigError::UnknownSocFamily(self.soc_family.clone()))
    }

    /// Source override for a component, defaulting to dependency resolution.
    pub fn component_source(&self, component: &str) -> ComponentSource {
        self.components.get(component).cloned().unwrap_or_default()
    }

    /// Validate the fields the pipeline depends on.
    pub fn validate(&self) -> Result<()> {
        if self.machine.is_empty() {
            return Err(ConfigError::MissingMachine);
        }
        self.soc()?;
        if let Some(mode) = self.overlay.as_deref() {
            if mode != "full" && mode != "dfx" {
                return Err(ConfigError::InvalidOverlay(mode.to_string()));
            }
        }
        Ok(())
    }
}

fn discover_path() -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    for ancestor in cwd.ancestors() {
        let candidate = ancestor.join(CONFIG_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Errors that can occur while loading mcgen configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("No {CONFIG_FILE} found in the working directory or its ancestors")]
    NotFound,

    #[error("Machine name is required (set `machine` in {CONFIG_FILE})")]
    MissingMachine,

    #[error("Unknown soc family: {0}")]
    UnknownSocFamily(String),

    #[error("Invalid overlay mode `{0}` (expected `full` or `dfx`)")]
    InvalidOverlay(String),
}
