//! Topology normalizer.
//!
//! Converts raw per-element attribute rows into canonical [`Element`]
//! records. Rows are whitespace-delimited `cpu core domain name os-hint`
//! (the format produced by the hardware-description extraction tooling).

use std::collections::HashSet;

use tracing::warn;

use mcgen_core::types::element::normalize_domain;
use mcgen_core::{CpuFamily, Element, OsHint};

use crate::error::PipelineError;

/// Normalized hardware topology, in input order.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub elements: Vec<Element>,
}

impl Topology {
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Parse raw topology text into canonical element records.
///
/// Lines starting with `#` (and not `[`) are comments; blank lines are
/// skipped. A wrong field count or a duplicate element name is fatal. An
/// unknown CPU family only drops that element: one unsupported core must not
/// abort the whole run.
pub fn parse_topology(text: &str) -> Result<Topology, PipelineError> {
    let mut topology = Topology::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || (line.starts_with('#') && !line.starts_with('[')) {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(PipelineError::MalformedRow {
                line_no,
                reason: format!("expected 5 fields, found {}", fields.len()),
            });
        }
        let (cpu, core, domain, name, os_hint) =
            (fields[0], fields[1], fields[2], fields[3], fields[4]);

        if !seen.insert(name.to_string()) {
            return Err(PipelineError::DuplicateElement {
                name: name.to_string(),
                line_no,
            });
        }

        let family = match cpu.parse::<CpuFamily>() {
            Ok(family) => family,
            Err(_) => {
                warn!("Unknown CPU {} (element {}), skipping", cpu, name);
                continue;
            }
        };

        let core: u32 = core.parse().map_err(|_| PipelineError::MalformedRow {
            line_no,
            reason: format!("core index `{core}` is not a non-negative integer"),
        })?;

        let os_hint = match OsHint::from_token(os_hint) {
            Ok(hint) => hint,
            Err(_) => {
                warn!(
                    "{} for unknown OS ({}), parsing Baremetal",
                    family, os_hint
                );
                OsHint::Baremetal
            }
        };

        topology.elements.push(Element {
            name: name.to_string(),
            family,
            core,
            domain: normalize_domain(Some(domain.to_string())),
            os_hint,
        });
    }

    Ok(topology)
}
