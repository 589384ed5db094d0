//! Dependency and tuning resolver.
//!
//! Derives tune identifiers, distribution profiles, dependency references,
//! and deploy-directory conventions for each surviving candidate, while
//! accumulating the shared settings table. The table is owned here and
//! handed to the synthesizer read-only.

use std::path::Path;

use tracing::{info, warn};

use mcgen_config::{McgenConfig, SourceKind};
use mcgen_core::{Candidate, CpuFamily, Resolved, Role, SettingsTable, SocFamily};

/// Output of the resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved configurations in filter order.
    pub resolved: Vec<Resolved>,
    /// Shared settings accumulated while resolving; read-only downstream.
    pub settings: SettingsTable,
    /// Boot components whose image is already embedded in the base boot
    /// image; downstream excludes these stages from the partition list.
    pub removed: Vec<String>,
}

/// Settings-table wiring for one boot component.
struct ComponentKeys {
    /// Component name in the configuration (`[components.fsbl]`).
    component: &'static str,
    /// Key prefix in the settings table (`FsblMcDepends`, ...).
    prefix: &'static str,
    /// Deploy-directory key (kept verbatim from the downstream contract).
    deploy_key: &'static str,
    /// Recipe whose deploy task dependent configurations wait on.
    recipe: &'static str,
}

const FSBL: ComponentKeys = ComponentKeys {
    component: "fsbl",
    prefix: "Fsbl",
    deploy_key: "FsblDeployDir",
    recipe: "fsbl-firmware",
};
const R5_FSBL: ComponentKeys = ComponentKeys {
    component: "r5fsbl",
    prefix: "R5Fsbl",
    deploy_key: "R5FsblDeployDir",
    recipe: "fsbl-firmware",
};
const PMU: ComponentKeys = ComponentKeys {
    component: "pmu",
    prefix: "Pmu",
    deploy_key: "PmuFWDeployDir",
    recipe: "pmu-firmware",
};
const PLM: ComponentKeys = ComponentKeys {
    component: "plm",
    prefix: "Plm",
    deploy_key: "PlmDeployDir",
    recipe: "plm-firmware",
};
const PSM: ComponentKeys = ComponentKeys {
    component: "psm",
    prefix: "Psm",
    deploy_key: "PsmFWDeployDir",
    recipe: "psm-firmware",
};

/// Resolve the surviving candidates against the project configuration.
pub fn resolve(survivors: Vec<Candidate>, config: &McgenConfig, soc: SocFamily) -> Resolution {
    let mut resolution = Resolution::default();

    for candidate in survivors {
        let resolved = match candidate.role {
            Role::Linux => resolve_linux(candidate, config, soc, &mut resolution),
            Role::Baremetal => resolve_baremetal(candidate),
            Role::Freertos => resolve_freertos(candidate),
            Role::Fsbl => resolve_fsbl(candidate, config, &mut resolution),
            Role::FirmwareStage => {
                match resolve_firmware_stage(candidate, config, &mut resolution) {
                    Some(resolved) => resolved,
                    None => continue,
                }
            }
        };
        resolution.resolved.push(resolved);
    }

    let aggregate = resolution
        .resolved
        .iter()
        .map(|r| r.candidate.name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    resolution.settings.set("BBMULTICONFIG", aggregate);

    resolution
}

/// Linux has no dependency entry; it only publishes the device-tree path
/// dependents read back.
fn resolve_linux(
    candidate: Candidate,
    config: &McgenConfig,
    soc: SocFamily,
    resolution: &mut Resolution,
) -> Resolved {
    info!(
        "Generating {} Linux configuration [ {} ]",
        candidate.family,
        candidate.domain.as_deref().unwrap_or("none")
    );
    let dts_name = if candidate.name.is_empty() {
        format!("{}-{}-linux.dts", candidate.family.mc_prefix(), soc)
    } else {
        format!("{}.dts", candidate.name)
    };
    let dts_file = config.dirs.dts_dir.join(dts_name);
    resolution
        .settings
        .set("LinuxDT", dts_file.display().to_string());
    Resolved {
        candidate,
        distro: None,
        tune: None,
        extra_lines: Vec::new(),
    }
}

fn resolve_baremetal(candidate: Candidate) -> Resolved {
    info!(
        "Generating {} baremetal configuration for core {} [ {} ]",
        candidate.family,
        candidate.core,
        candidate.domain.as_deref().unwrap_or("none")
    );
    let distro = standalone_distro(candidate.family, candidate.domain.as_deref());
    let tune = candidate.family.tune().to_string();
    Resolved {
        candidate,
        distro: Some(distro),
        tune: Some(tune),
        extra_lines: Vec::new(),
    }
}

fn resolve_freertos(candidate: Candidate) -> Resolved {
    info!(
        "Generating {} FreeRTOS configuration for core {} [ {} ]",
        candidate.family,
        candidate.core,
        candidate.domain.as_deref().unwrap_or("none")
    );
    let tune = candidate.family.tune().to_string();
    Resolved {
        candidate,
        distro: Some("freertos".to_string()),
        tune: Some(tune),
        extra_lines: Vec::new(),
    }
}

/// The boot loader always builds as plain standalone, and publishes the
/// dependency reference and deploy directory dependents are wired to.
fn resolve_fsbl(
    candidate: Candidate,
    config: &McgenConfig,
    resolution: &mut Resolution,
) -> Resolved {
    info!(
        "Generating {} baremetal configuration for FSBL",
        candidate.family
    );
    let keys = if candidate.family == CpuFamily::CortexR5 {
        &R5_FSBL
    } else {
        &FSBL
    };
    let stem = format!("{}-{}", config.machine, candidate.name);
    wire_component(keys, &stem, config, resolution);

    let init_path = config.dirs.psu_init_dir();
    for init_file in ["psu_init.c", "psu_init.h"] {
        if !init_path.join(init_file).is_file() {
            warn!(
                "Unable to find {} in {}",
                init_file,
                init_path.display()
            );
        }
    }
    let extra_lines = vec![format!("PSU_INIT_PATH = \"{}\"", init_path.display())];

    let tune = candidate.family.tune().to_string();
    Resolved {
        candidate,
        distro: Some("standalone".to_string()),
        tune: Some(tune),
        extra_lines,
    }
}

fn resolve_firmware_stage(
    candidate: Candidate,
    config: &McgenConfig,
    resolution: &mut Resolution,
) -> Option<Resolved> {
    let (keys, distro, cflags) = match candidate.family {
        CpuFamily::PmuMicroblaze => (&PMU, "standalone", "-DVERSAL_PLM=1"),
        CpuFamily::PmcMicroblaze => (&PLM, "standalone", "-DVERSAL_PLM=1"),
        CpuFamily::PsmMicroblaze => (&PSM, "standalone-nolto", "-DVERSAL_psm=1"),
        // The expander only routes the three firmware controllers here, but
        // resolve() takes arbitrary candidates.
        other => {
            warn!(
                "{} is not a firmware controller, dropping {}",
                other, candidate.name
            );
            return None;
        }
    };
    info!(
        "Generating microblaze baremetal configuration for {}",
        candidate.name
    );
    let stem = format!("{}-{}", config.machine, candidate.name);
    wire_component(keys, &stem, config, resolution);

    let tune = candidate.family.tune();
    resolution
        .settings
        .set(format!("{}Tune", keys.prefix), tune);

    Some(Resolved {
        candidate,
        distro: Some(distro.to_string()),
        tune: Some(tune.to_string()),
        extra_lines: vec![format!("TARGET_CFLAGS += \"{cflags}\"")],
    })
}

/// Record how a boot component's image is obtained.
///
/// The default path wires a multiconfig dependency on the component's deploy
/// task. Non-default sources suppress that and substitute an explicit image
/// location; a missing backing artifact is only a warning here, the real
/// failure belongs to the downstream build.
fn wire_component(
    keys: &ComponentKeys,
    stem: &str,
    config: &McgenConfig,
    resolution: &mut Resolution,
) {
    let source = config.component_source(keys.component);
    match source.source {
        SourceKind::Default => {
            resolution.settings.set(
                format!("{}McDepends", keys.prefix),
                format!("mc::{}:{}:do_deploy", stem, keys.recipe),
            );
            resolution.settings.set(
                keys.deploy_key,
                format!("${{TMPDIR}}-{}/deploy/images/${{MACHINE}}", stem),
            );
        }
        SourceKind::BaseImage => {
            resolution.removed.push(keys.component.to_string());
        }
        SourceKind::HwDescription => {
            resolution.settings.set(
                format!("{}Depends", keys.prefix),
                "${SYSTEM_DTFILE_DEPENDS}:do_populate_sysroot",
            );
            resolution
                .settings
                .set(keys.deploy_key, "${SYSTEM_DTFILE_DIR}");
            match source.image.as_deref() {
                Some(image) => {
                    let image = image.strip_suffix(".elf").unwrap_or(image);
                    check_backing_elf(config.dirs.hw_description.as_deref(), image, keys);
                    resolution
                        .settings
                        .set(format!("{}ImageName", keys.prefix), image);
                }
                None => warn!(
                    "No image name specified for {} hw-description source",
                    keys.component
                ),
            }
        }
        SourceKind::LocalPath => match source.path.as_deref() {
            Some(path) => {
                let deploy_dir = path.parent().unwrap_or_else(|| Path::new(""));
                let image = path
                    .file_name()
                    .map(|n| {
                        let name = n.to_string_lossy();
                        name.strip_suffix(".elf").unwrap_or(name.as_ref()).to_string()
                    })
                    .unwrap_or_default();
                check_backing_elf(Some(deploy_dir), &image, keys);
                resolution
                    .settings
                    .set(keys.deploy_key, deploy_dir.display().to_string());
                resolution
                    .settings
                    .set(format!("{}ImageName", keys.prefix), image);
            }
            None => warn!(
                "No path specified for {} local-path source, the build will fail downstream",
                keys.component
            ),
        },
    }
}

fn check_backing_elf(dir: Option<&Path>, image: &str, keys: &ComponentKeys) {
    let Some(dir) = dir else { return };
    let elf = dir.join(format!("{image}.elf"));
    if !elf.is_file() {
        warn!(
            "Specified {} elf not found: {}, make sure the .elf file exists",
            keys.component,
            elf.display()
        );
    }
}

/// Standalone profile selection.
///
/// A domainless image builds without LTO; a domain-qualified one keeps it.
/// This hardware/toolchain policy is preserved verbatim and not derivable
/// from other fields. cortex-a72/a78 have no LTO-enabled profile at all.
fn standalone_distro(family: CpuFamily, domain: Option<&str>) -> String {
    let nolto = match family {
        CpuFamily::CortexA72 | CpuFamily::CortexA78 => true,
        _ => domain.is_none(),
    };
    if nolto {
        "standalone-nolto".to_string()
    } else {
        "standalone".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::expand;
    use crate::filter::filter;
    use crate::topology::parse_topology;
    use mcgen_core::OsHint;

    fn config(extra: &str) -> McgenConfig {
        let toml = format!("machine = \"zcu102\"\nsoc_family = \"zynqmp\"\n{extra}");
        McgenConfig::from_str(&toml).unwrap()
    }

    fn run(rows: &str, config: &McgenConfig, soc: SocFamily) -> Resolution {
        let expansion = expand(&parse_topology(rows).unwrap(), soc);
        let survivors = filter(
            &expansion,
            &config.multiconfig.enabled,
            config.multiconfig.full,
        );
        resolve(survivors, config, soc)
    }

    #[test]
    fn test_fsbl_dependency_wiring() {
        let config = config("");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(
            resolution.settings.get("FsblMcDepends"),
            Some("mc::zcu102-cortexa53-0-fsbl-baremetal:fsbl-firmware:do_deploy")
        );
        assert_eq!(
            resolution.settings.get("FsblDeployDir"),
            Some("${TMPDIR}-zcu102-cortexa53-0-fsbl-baremetal/deploy/images/${MACHINE}")
        );
    }

    #[test]
    fn test_firmware_stage_settings() {
        let config = config("");
        let resolution = run(
            "pmu-microblaze 0 none psu_pmu_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(resolution.settings.get("PmuTune"), Some("microblaze-pmu"));
        assert_eq!(
            resolution.settings.get("PmuMcDepends"),
            Some("mc::zcu102-microblaze-pmu:pmu-firmware:do_deploy")
        );
        let pmu = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.name == "microblaze-pmu")
            .unwrap();
        assert_eq!(pmu.distro.as_deref(), Some("standalone"));
        assert_eq!(
            pmu.extra_lines,
            vec!["TARGET_CFLAGS += \"-DVERSAL_PLM=1\""]
        );
    }

    #[test]
    fn test_psm_uses_nolto() {
        let mut config = config("");
        config.soc_family = "versal".to_string();
        let resolution = run(
            "psm-microblaze 0 none psv_psm_0 none\n",
            &config,
            SocFamily::Versal,
        );
        let psm = &resolution.resolved[0];
        assert_eq!(psm.distro.as_deref(), Some("standalone-nolto"));
        assert_eq!(resolution.settings.get("PsmTune"), Some("microblaze-psm"));
        assert!(resolution.settings.contains("PsmFWDeployDir"));
    }

    #[test]
    fn test_domain_controls_lto() {
        // Domain "none": nolto. Qualified domain: LTO profile.
        assert_eq!(
            standalone_distro(CpuFamily::CortexA53, None),
            "standalone-nolto"
        );
        assert_eq!(
            standalone_distro(CpuFamily::CortexA53, Some("dom0")),
            "standalone"
        );
        // a72/a78 never build the LTO profile.
        assert_eq!(
            standalone_distro(CpuFamily::CortexA72, Some("dom0")),
            "standalone-nolto"
        );
    }

    #[test]
    fn test_linux_records_device_tree() {
        let config = config("");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(
            resolution.settings.get("LinuxDT"),
            Some("dts/cortexa53-zynqmp-linux.dts")
        );
    }

    #[test]
    fn test_aggregate_excludes_implicit_linux() {
        let config = config("[multiconfig]\nenabled = [\"cortexa53-0-baremetal\", \"cortexa53-0-freertos\"]");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(
            resolution.settings.get("BBMULTICONFIG"),
            Some("cortexa53-0-baremetal cortexa53-0-freertos")
        );
        // The implicit Linux configuration is resolved but unnamed.
        assert_eq!(resolution.resolved.len(), 3);
    }

    #[test]
    fn test_base_image_source_sets_removal_flag() {
        let config = config("[components.plm]\nsource = \"base-image\"");
        let resolution = run(
            "pmc-microblaze 0 none psv_pmc_0 none\n",
            &config,
            SocFamily::Versal,
        );
        assert_eq!(resolution.removed, vec!["plm"]);
        assert!(!resolution.settings.contains("PlmMcDepends"));
        assert!(!resolution.settings.contains("PlmDeployDir"));
    }

    #[test]
    fn test_local_path_source_substitutes_image() {
        let config = config("[components.fsbl]\nsource = \"local-path\"\npath = \"/opt/images/fsbl.elf\"");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert!(!resolution.settings.contains("FsblMcDepends"));
        assert_eq!(resolution.settings.get("FsblDeployDir"), Some("/opt/images"));
        assert_eq!(resolution.settings.get("FsblImageName"), Some("fsbl"));
    }

    #[test]
    fn test_hw_description_source() {
        let config = config(
            "[components.fsbl]\nsource = \"hw-description\"\nimage = \"fsbl_a53.elf\"",
        );
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(
            resolution.settings.get("FsblDepends"),
            Some("${SYSTEM_DTFILE_DEPENDS}:do_populate_sysroot")
        );
        assert_eq!(
            resolution.settings.get("FsblDeployDir"),
            Some("${SYSTEM_DTFILE_DIR}")
        );
        assert_eq!(resolution.settings.get("FsblImageName"), Some("fsbl_a53"));
    }

    #[test]
    fn test_fsbl_always_carries_psu_init_path() {
        // The init path line is present even without [dirs] configuration.
        let config = config("");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        let fsbl = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.role == Role::Fsbl)
            .unwrap();
        assert_eq!(fsbl.extra_lines, vec!["PSU_INIT_PATH = \".\""]);
    }

    #[test]
    fn test_fsbl_psu_init_path_prefers_configured_dirs() {
        let config = config("[dirs]\npsu_init = \"/proj/init\"");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        let fsbl = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.role == Role::Fsbl)
            .unwrap();
        assert_eq!(fsbl.extra_lines, vec!["PSU_INIT_PATH = \"/proj/init\""]);

        let fallback = config_with_hw();
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &fallback,
            SocFamily::ZynqMp,
        );
        let fsbl = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.role == Role::Fsbl)
            .unwrap();
        assert_eq!(fsbl.extra_lines, vec!["PSU_INIT_PATH = \"/proj/hw\""]);
    }

    fn config_with_hw() -> McgenConfig {
        config("[dirs]\nhw_description = \"/proj/hw\"")
    }

    #[test]
    fn test_arm_family_firmware_candidate_is_dropped() {
        // resolve() takes arbitrary candidates; a firmware-stage role on an
        // ARM family must not panic, only drop the candidate.
        let config = config("");
        let candidate = Candidate {
            name: "cortexa53-bogus".to_string(),
            element: "psu_cortexa53_0".to_string(),
            family: CpuFamily::CortexA53,
            core: 0,
            domain: None,
            role: Role::FirmwareStage,
            minimal: false,
            os_hint: OsHint::None,
        };
        let resolution = resolve(vec![candidate], &config, SocFamily::ZynqMp);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.settings.get("BBMULTICONFIG"), Some(""));
    }

    #[test]
    fn test_elf_suffix_stripped_once() {
        let config = config(
            "[components.fsbl]\nsource = \"hw-description\"\nimage = \"fsbl.elf.elf\"",
        );
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        assert_eq!(resolution.settings.get("FsblImageName"), Some("fsbl.elf"));
    }

    #[test]
    fn test_fsbl_forces_standalone_profile() {
        let config = config("");
        let resolution = run(
            "arm,cortex-a53 0 none psu_cortexa53_0 none\n",
            &config,
            SocFamily::ZynqMp,
        );
        let fsbl = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.role == Role::Fsbl)
            .unwrap();
        // Domain "fsbl" is set, so the generic rule would also give
        // "standalone"; the profile is forced regardless.
        assert_eq!(fsbl.distro.as_deref(), Some("standalone"));
        assert_eq!(fsbl.tune.as_deref(), Some("cortexa53"));
    }

    #[test]
    fn test_explicit_baremetal_hint_keeps_domain_profile() {
        let config = config("[multiconfig]\nenabled = [\"cortexr5-0-rpu0-baremetal\"]");
        let resolution = run(
            "arm,cortex-r5 0 rpu0 psu_cortexr5_0 baremetal\n",
            &config,
            SocFamily::ZynqMp,
        );
        let bm = resolution
            .resolved
            .iter()
            .find(|r| r.candidate.name == "cortexr5-0-rpu0-baremetal")
            .unwrap();
        assert_eq!(bm.candidate.os_hint, OsHint::Baremetal);
        assert_eq!(bm.distro.as_deref(), Some("standalone"));
    }
}
