//! mcgen Core - Fundamental types for the multiconfig generator.
//!
//! This crate provides the data model shared by the pipeline, the artifact
//! synthesizer, and the CLI: processing-element records, candidate and
//! resolved configurations, and the settings table accumulated during
//! resolution.

pub mod error;
pub mod types;

pub use error::CoreError;
pub use types::{
    mc_name, Candidate, CpuFamily, Element, OsHint, Resolved, Role, SettingsTable, SocFamily,
};
