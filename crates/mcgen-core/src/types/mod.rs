//! Data model for the multiconfig resolution pipeline.
//!
//! The pipeline moves through three representations:
//! - `Element`: one processing unit from the hardware topology
//! - `Candidate`: a build target derivable from an element, before selection
//! - `Resolved`: a selected candidate plus tuning and dependency data
//!
//! `SettingsTable` is the key/value store populated while resolving
//! firmware-role configurations and read back when rendering artifacts.

pub mod candidate;
pub mod element;
pub mod family;
pub mod settings;

pub use candidate::{mc_name, Candidate, Resolved, Role};
pub use element::Element;
pub use family::{CpuFamily, OsHint, SocFamily};
pub use settings::SettingsTable;
