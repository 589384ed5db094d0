//! mcgen resolution pipeline.
//!
//! Turns a hardware topology plus the user's selection into resolved build
//! configurations and the settings table the artifact synthesizer renders:
//!
//! 1. [`topology`] normalizes raw per-element rows into canonical records.
//! 2. [`expand`] applies per-CPU-family policy, yielding candidates.
//! 3. [`filter`] intersects candidates with the enabled set.
//! 4. [`resolve`] derives tunes, profiles, dependency references, and deploy
//!    directories, accumulating the shared settings table.
//!
//! The pipeline is pure and in-memory; the only I/O happens in the caller
//! (reading the topology) and in `mcgen-emit` (writing artifacts).

pub mod error;
pub mod expand;
pub mod filter;
pub mod resolve;
pub mod topology;

pub use error::PipelineError;
pub use expand::{expand, Expansion};
pub use filter::filter;
pub use resolve::{resolve, Resolution};
pub use topology::{parse_topology, Topology};

use mcgen_config::McgenConfig;

/// Run the full in-memory pipeline over raw topology text.
pub fn run_pipeline(topology_text: &str, config: &McgenConfig) -> Result<Resolution, PipelineError> {
    let soc = config.soc()?;
    let topology = parse_topology(topology_text)?;
    let expansion = expand(&topology, soc);
    let survivors = filter(
        &expansion,
        &config.multiconfig.enabled,
        config.multiconfig.full,
    );
    Ok(resolve(survivors, config, soc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_end_to_end() {
        let topology = "\
arm,cortex-a53 0 none psu_cortexa53_0 none
arm,cortex-a53 1 none psu_cortexa53_1 none
pmu-microblaze 0 none psu_pmu_0 none
";
        let config = McgenConfig::from_str(
            "machine = \"zcu102\"\nsoc_family = \"zynqmp\"",
        )
        .unwrap();

        let resolution = run_pipeline(topology, &config).unwrap();
        // Minimal default set: A53 FSBL + PMU firmware (implicit Linux is
        // carried but not named).
        let names: Vec<&str> = resolution
            .resolved
            .iter()
            .map(|r| r.candidate.name.as_str())
            .collect();
        assert_eq!(names, vec!["", "cortexa53-0-fsbl-baremetal", "microblaze-pmu"]);
        assert_eq!(
            resolution.settings.get("BBMULTICONFIG"),
            Some("cortexa53-0-fsbl-baremetal microblaze-pmu")
        );
        assert!(resolution.settings.contains("FsblMcDepends"));
        assert!(resolution.settings.contains("PmuMcDepends"));
    }
}
