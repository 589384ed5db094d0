//! Selection filter.
//!
//! Intersects the candidate set with the user-enabled names, substituting
//! the minimal default set when no selection was given. Output order follows
//! the enabled set; it affects emission order only, since references resolve
//! by name.

use tracing::{debug, error};

use mcgen_core::Candidate;

use crate::expand::Expansion;

/// Select the candidates that survive into resolution.
///
/// The implicit default Linux candidate is not user-addressable and is
/// always carried through. Enabled names with no matching candidate are
/// reported and skipped; the run continues with the rest.
pub fn filter(expansion: &Expansion, enabled: &[String], full: bool) -> Vec<Candidate> {
    let mut survivors: Vec<Candidate> = Vec::new();

    if full {
        survivors.extend(expansion.candidates.iter().cloned());
        return survivors;
    }

    if let Some(implicit) = expansion.implicit_linux() {
        survivors.push(implicit.clone());
    }

    let minimal = expansion.minimal_names();
    let chosen: Vec<&str> = if enabled.is_empty() {
        minimal
    } else {
        enabled.iter().map(String::as_str).collect()
    };

    for name in chosen {
        if survivors.iter().any(|c| c.name == name) {
            debug!("multiconfig {} enabled twice, keeping first", name);
            continue;
        }
        match expansion.by_name(name) {
            Some(candidate) => survivors.push(candidate.clone()),
            None => error!("Unable to find selected multiconfig ({})", name),
        }
    }

    survivors
}
