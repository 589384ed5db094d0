//! Configuration expander.
//!
//! Applies per-CPU-family policy to each topology element, producing zero or
//! more candidate configurations with an assigned role. The dispatch over
//! [`CpuFamily`] is exhaustive so adding a family is a compile-time-checked
//! change.

use tracing::{debug, warn};

use mcgen_core::{mc_name, Candidate, CpuFamily, Element, OsHint, Role, SocFamily};

use crate::topology::Topology;

/// Full candidate set for one topology, in emission order.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub candidates: Vec<Candidate>,
}

impl Expansion {
    /// Names of the minimal default set, in candidate order.
    pub fn minimal_names(&self) -> Vec<&str> {
        self.candidates
            .iter()
            .filter(|c| c.minimal)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Look up a candidate by its derived name.
    pub fn by_name(&self, name: &str) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| !c.name.is_empty() && c.name == name)
    }

    /// The implicit default Linux candidate, when one was derived.
    pub fn implicit_linux(&self) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.is_implicit_linux())
    }

    /// Record a candidate. Two elements deriving the same non-empty name is
    /// a latent topology ambiguity: the later one wins (compatibility with
    /// the established behavior) and a diagnostic is surfaced.
    fn push(&mut self, candidate: Candidate) {
        if !candidate.name.is_empty() {
            if let Some(pos) = self
                .candidates
                .iter()
                .position(|c| c.name == candidate.name)
            {
                warn!(
                    "multiconfig name {} derived from both {} and {}; keeping the latter",
                    candidate.name, self.candidates[pos].element, candidate.element
                );
                self.candidates[pos] = candidate;
                return;
            }
        }
        self.candidates.push(candidate);
    }
}

/// Expand every topology element into its candidate configurations.
pub fn expand(topology: &Topology, soc: SocFamily) -> Expansion {
    let mut expander = Expander {
        soc,
        expansion: Expansion::default(),
        linux_done: false,
        fsbl_done: false,
        r5_fsbl_done: false,
    };
    for element in topology.iter() {
        expander.element(element);
    }
    expander.expansion
}

struct Expander {
    soc: SocFamily,
    expansion: Expansion,
    /// Only one Linux configuration per run; the first A-core claims it.
    linux_done: bool,
    /// A9/A53 first-stage boot loader emitted.
    fsbl_done: bool,
    /// R5 first-stage boot loader emitted (ZynqMP only).
    r5_fsbl_done: bool,
}

impl Expander {
    fn element(&mut self, element: &Element) {
        match element.family {
            CpuFamily::CortexA9
            | CpuFamily::CortexA53
            | CpuFamily::CortexA72
            | CpuFamily::CortexA78 => self.application_core(element),
            CpuFamily::CortexR5 | CpuFamily::CortexR52 => self.realtime_core(element),
            CpuFamily::Microblaze => {
                // Presumed Linux-hosted; no standalone candidates.
                debug!("microblaze element {} hosts Linux itself", element.name);
            }
            CpuFamily::PmuMicroblaze | CpuFamily::PmcMicroblaze | CpuFamily::PsmMicroblaze => {
                self.firmware_stage(element);
            }
        }
    }

    /// Cortex-A policy: Linux by default on core 0, plus baremetal and
    /// FreeRTOS alternatives; an FSBL stage where the SoC needs one.
    fn application_core(&mut self, element: &Element) {
        match element.os_hint {
            OsHint::None => {
                if element.core == 0 {
                    self.fsbl(element);
                    self.linux(element);
                }
                self.candidate(element, Role::Baremetal, false);
                self.candidate(element, Role::Freertos, false);
            }
            OsHint::Linux => self.linux(element),
            OsHint::Baremetal => self.candidate(element, Role::Baremetal, false),
            OsHint::Freertos => self.candidate(element, Role::Freertos, false),
            OsHint::Fsbl => self.explicit_fsbl(element),
        }
    }

    /// Cortex-R policy: no Linux; unsupported hints degrade to baremetal.
    fn realtime_core(&mut self, element: &Element) {
        match element.os_hint {
            OsHint::None => {
                if element.core == 0 {
                    self.fsbl(element);
                }
                self.candidate(element, Role::Baremetal, false);
                self.candidate(element, Role::Freertos, false);
            }
            OsHint::Baremetal => self.candidate(element, Role::Baremetal, false),
            OsHint::Freertos => self.candidate(element, Role::Freertos, false),
            OsHint::Linux => {
                warn!(
                    "{} cannot host Linux (element {}), parsing Baremetal",
                    element.family, element.name
                );
                self.candidate(element, Role::Baremetal, false);
            }
            OsHint::Fsbl => self.explicit_fsbl(element),
        }
    }

    /// Dedicated firmware controllers always yield exactly one minimal-set
    /// candidate with a fixed name.
    fn firmware_stage(&mut self, element: &Element) {
        self.expansion.push(Candidate {
            name: element.family.mc_prefix().to_string(),
            element: element.name.clone(),
            family: element.family,
            core: element.core,
            domain: None,
            role: Role::FirmwareStage,
            minimal: true,
            os_hint: element.os_hint,
        });
    }

    fn linux(&mut self, element: &Element) {
        if self.linux_done {
            return;
        }
        self.linux_done = true;
        let name = mc_name(
            element.family,
            element.core,
            element.domain.as_deref(),
            Role::Linux,
        );
        self.expansion.push(Candidate {
            name,
            element: element.name.clone(),
            family: element.family,
            core: element.core,
            domain: element.domain.clone(),
            role: Role::Linux,
            minimal: false,
            os_hint: element.os_hint,
        });
    }

    /// Emit the first-stage boot loader candidate when the SoC requires one
    /// for this family/core combination.
    fn fsbl(&mut self, element: &Element) {
        let minimal = match (self.soc, element.family) {
            (SocFamily::Zynq, CpuFamily::CortexA9) | (SocFamily::ZynqMp, CpuFamily::CortexA53) => {
                if self.fsbl_done {
                    return;
                }
                self.fsbl_done = true;
                true
            }
            (SocFamily::ZynqMp, CpuFamily::CortexR5) => {
                if self.r5_fsbl_done {
                    return;
                }
                self.r5_fsbl_done = true;
                false
            }
            _ => return,
        };
        self.candidate(element, Role::Fsbl, minimal);
    }

    /// An explicit `fsbl` hint is honored only where the SoC actually boots
    /// through an FSBL on this family; elsewhere it degrades to baremetal.
    fn explicit_fsbl(&mut self, element: &Element) {
        let capable = matches!(
            (self.soc, element.family),
            (SocFamily::Zynq, CpuFamily::CortexA9)
                | (SocFamily::ZynqMp, CpuFamily::CortexA53)
                | (SocFamily::ZynqMp, CpuFamily::CortexR5)
        ) && element.core == 0;
        if capable {
            let minimal = element.family != CpuFamily::CortexR5;
            match element.family {
                CpuFamily::CortexR5 => self.r5_fsbl_done = true,
                _ => self.fsbl_done = true,
            }
            self.candidate(element, Role::Fsbl, minimal);
        } else {
            warn!(
                "{} core {} has no FSBL stage on {}, parsing Baremetal",
                element.family, element.core, self.soc
            );
            self.candidate(element, Role::Baremetal, false);
        }
    }

    fn candidate(&mut self, element: &Element, role: Role, minimal: bool) {
        // The boot loader is a baremetal image pinned to the `fsbl` domain.
        let domain = match role {
            Role::Fsbl => Some("fsbl".to_string()),
            _ => element.domain.clone(),
        };
        let name = mc_name(element.family, element.core, element.domain.as_deref(), role);
        self.expansion.push(Candidate {
            name,
            element: element.name.clone(),
            family: element.family,
            core: element.core,
            domain,
            role,
            minimal,
            os_hint: element.os_hint,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::parse_topology;

    fn expand_text(text: &str, soc: SocFamily) -> Expansion {
        expand(&parse_topology(text).unwrap(), soc)
    }

    fn names(expansion: &Expansion) -> Vec<&str> {
        expansion
            .candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect()
    }

    #[test]
    fn test_a53_core0_default_expansion() {
        let expansion = expand_text(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            SocFamily::ZynqMp,
        );
        assert_eq!(
            names(&expansion),
            vec![
                "cortexa53-0-fsbl-baremetal",
                "",
                "cortexa53-0-baremetal",
                "cortexa53-0-freertos",
            ]
        );
        assert!(expansion.implicit_linux().is_some());
        assert_eq!(expansion.minimal_names(), vec!["cortexa53-0-fsbl-baremetal"]);
    }

    #[test]
    fn test_explicit_linux_hint_yields_only_linux() {
        let expansion = expand_text(
            "arm,cortex-a53 0 none psu_cortexa53_0 linux\n",
            SocFamily::ZynqMp,
        );
        assert_eq!(expansion.candidates.len(), 1);
        assert!(expansion.candidates[0].is_implicit_linux());
    }

    #[test]
    fn test_only_first_a_core_gets_linux() {
        let expansion = expand_text(
            "\
arm,cortex-a53 0 none psu_cortexa53_0 none
arm,cortex-a53 1 none psu_cortexa53_1 none
",
            SocFamily::ZynqMp,
        );
        let linux_count = expansion
            .candidates
            .iter()
            .filter(|c| c.role == Role::Linux)
            .count();
        assert_eq!(linux_count, 1);
        // Core 1 still gets the baremetal/freertos pair.
        assert!(expansion.by_name("cortexa53-1-baremetal").is_some());
        assert!(expansion.by_name("cortexa53-1-freertos").is_some());
    }

    #[test]
    fn test_domain_qualified_names() {
        let expansion = expand_text(
            "arm,cortex-r5 1 rpu1 psu_cortexr5_1 none\n",
            SocFamily::ZynqMp,
        );
        assert_eq!(
            names(&expansion),
            vec!["cortexr5-1-rpu1-baremetal", "cortexr5-1-rpu1-freertos"]
        );
    }

    #[test]
    fn test_zynq_a9_fsbl_is_minimal() {
        let expansion = expand_text(
            "arm,cortex-a9 0 none ps7_cortexa9_0 none\n",
            SocFamily::Zynq,
        );
        let fsbl = expansion.by_name("cortexa9-0-fsbl-baremetal").unwrap();
        assert_eq!(fsbl.role, Role::Fsbl);
        assert!(fsbl.minimal);
    }

    #[test]
    fn test_r5_fsbl_not_minimal() {
        let expansion = expand_text(
            "arm,cortex-r5 0 none psu_cortexr5_0 none\n",
            SocFamily::ZynqMp,
        );
        let fsbl = expansion.by_name("cortexr5-0-fsbl-baremetal").unwrap();
        assert!(!fsbl.minimal);
        assert_eq!(fsbl.domain.as_deref(), Some("fsbl"));
    }

    #[test]
    fn test_versal_has_no_fsbl() {
        let expansion = expand_text(
            "arm,cortex-a72 0 none psv_cortexa72_0 none\n",
            SocFamily::Versal,
        );
        assert!(expansion
            .candidates
            .iter()
            .all(|c| c.role != Role::Fsbl));
    }

    #[test]
    fn test_firmware_stages_always_minimal() {
        let expansion = expand_text(
            "\
pmc-microblaze 0 none psv_pmc_0 none
psm-microblaze 0 none psv_psm_0 none
",
            SocFamily::Versal,
        );
        assert_eq!(
            expansion.minimal_names(),
            vec!["microblaze-pmc", "microblaze-psm"]
        );
        assert!(expansion
            .candidates
            .iter()
            .all(|c| c.role == Role::FirmwareStage));
    }

    #[test]
    fn test_generic_microblaze_yields_nothing() {
        let expansion = expand_text(
            "xlnx,microblaze 0 none microblaze_0 linux\n",
            SocFamily::Microblaze,
        );
        assert!(expansion.candidates.is_empty());
    }

    #[test]
    fn test_linux_hint_on_r5_degrades_to_baremetal() {
        let expansion = expand_text(
            "arm,cortex-r5 0 none psu_cortexr5_0 linux\n",
            SocFamily::ZynqMp,
        );
        assert_eq!(names(&expansion), vec!["cortexr5-0-baremetal"]);
    }

    #[test]
    fn test_name_collision_keeps_last() {
        // Two elements deriving the same candidate name: the later wins.
        let expansion = expand_text(
            "\
arm,cortex-a53 0 none first baremetal
arm,cortex-a53 0 none second baremetal
",
            SocFamily::ZynqMp,
        );
        assert_eq!(expansion.candidates.len(), 1);
        assert_eq!(expansion.candidates[0].element, "second");
    }

    #[test]
    fn test_fsbl_hint_on_versal_degrades() {
        let expansion = expand_text(
            "arm,cortex-a72 0 none psv_cortexa72_0 fsbl\n",
            SocFamily::Versal,
        );
        assert_eq!(names(&expansion), vec!["cortexa72-0-baremetal"]);
    }

    #[test]
    fn test_fsbl_hint_on_zynqmp_a53() {
        let expansion = expand_text(
            "arm,cortex-a53 0 none psu_cortexa53_0 fsbl\n",
            SocFamily::ZynqMp,
        );
        let fsbl = expansion.by_name("cortexa53-0-fsbl-baremetal").unwrap();
        assert_eq!(fsbl.role, Role::Fsbl);
        assert!(fsbl.minimal);
    }
}
