//! Artifact synthesis for resolved multiconfig sets.
//!
//! Takes a [`Resolution`] and materializes it on disk: one descriptor file
//! per named configuration under `conf/multiconfig/`, plus a single
//! machine-override fragment wiring boot components into the parent build.
//!
//! Writes are atomic (staged through a temporary file in the destination
//! directory, then renamed) so a half-written descriptor is never observed.
//! A failure on one descriptor is recorded in the summary and does not stop
//! the remaining files from being written.

pub mod render;

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info};

use mcgen_config::McgenConfig;
use mcgen_pipeline::Resolution;

pub use render::{render_descriptor, render_machine_overrides, ConfEmitter};

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EmitError>;

/// Outcome of one synthesis run.
#[derive(Debug, Default)]
pub struct EmitSummary {
    /// Paths written, in emission order.
    pub written: Vec<PathBuf>,
    /// Descriptors that could not be written. The run continues past these.
    pub failed: Vec<(PathBuf, std::io::Error)>,
}

impl EmitSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes descriptor files and the machine-override fragment.
pub struct Synthesizer<'a> {
    config: &'a McgenConfig,
    out_dir: PathBuf,
}

impl<'a> Synthesizer<'a> {
    /// `root` is the build tree the configuration directories hang off.
    pub fn new(config: &'a McgenConfig, root: &Path) -> Self {
        Self {
            config,
            out_dir: root.join(&config.dirs.config_dir),
        }
    }

    /// Materialize the whole resolution. Directory creation failures abort;
    /// individual descriptor failures are collected in the summary.
    pub fn synthesize(&self, resolution: &Resolution) -> Result<EmitSummary> {
        let multiconfig_dir = self.out_dir.join("multiconfig");
        fs::create_dir_all(&multiconfig_dir).map_err(|source| EmitError::CreateDir {
            path: multiconfig_dir.clone(),
            source,
        })?;

        let machine = &self.config.machine;
        let mut summary = EmitSummary::default();

        for resolved in &resolution.resolved {
            // The implicit default Linux configuration is the parent build
            // itself and has no descriptor file.
            if resolved.candidate.name.is_empty() {
                debug!("skipping implicit default configuration");
                continue;
            }

            let path = multiconfig_dir.join(format!("{}.conf", resolved.conf_stem(machine)));
            let text = render_descriptor(resolved, machine);
            match write_atomic(&path, &text) {
                Ok(()) => {
                    debug!(path = %path.display(), "wrote descriptor");
                    summary.written.push(path);
                }
                Err(err) => {
                    error!(path = %path.display(), error = %err, "descriptor write failed");
                    summary.failed.push((path, err));
                }
            }
        }

        let fragment = render_machine_overrides(resolution, machine);
        if !fragment.is_empty() {
            let path = self.out_dir.join(format!("{machine}-overrides.conf"));
            write_atomic(&path, &fragment).map_err(|source| EmitError::Write {
                path: path.clone(),
                source,
            })?;
            summary.written.push(path);
        }

        info!(
            written = summary.written.len(),
            failed = summary.failed.len(),
            "synthesis complete"
        );
        Ok(summary)
    }
}

/// Stage in the destination directory, then rename over the target.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
