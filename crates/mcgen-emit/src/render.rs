//! Line-oriented rendering of configuration artifacts.
//!
//! Descriptors are plain `KEY = "value"` text consumed by the downstream
//! build system. Rendering is separated from writing so descriptors can be
//! asserted on byte-for-byte.

use std::fmt::Write;
use std::path::Path;

use mcgen_core::{Resolved, Role, SettingsTable};
use mcgen_pipeline::Resolution;

/// Accumulates conf-file text.
///
/// Values render inside double quotes; rendering identical input twice
/// yields identical bytes.
pub struct ConfEmitter {
    buffer: String,
}

impl ConfEmitter {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(1024),
        }
    }

    /// Emit a raw line.
    pub fn line(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Emit an empty line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Emit `KEY = "value"`.
    pub fn assign(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.buffer, "{key} = \"{value}\"");
    }

    /// Emit `KEY .= "value"` (append assignment).
    pub fn append(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.buffer, "{key} .= \"{value}\"");
    }

    /// Emit `KEY += "value"`.
    pub fn add(&mut self, key: &str, value: &str) {
        let _ = writeln!(self.buffer, "{key} += \"{value}\"");
    }

    pub fn finalize(self) -> String {
        self.buffer
    }
}

impl Default for ConfEmitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one multiconfig descriptor.
///
/// Every descriptor redirects TMPDIR per multiconfig; firmware and
/// standalone descriptors additionally pin the distribution profile, the
/// default tune, and the software-platform machine.
pub fn render_descriptor(resolved: &Resolved, machine: &str) -> String {
    let mut out = ConfEmitter::new();
    out.append("TMPDIR", "-${BB_CURRENT_MC}");
    out.blank();

    let candidate = &resolved.candidate;
    match candidate.role {
        Role::Linux => {
            out.assign(
                "CONFIG_DTFILE",
                &format!("${{CONFIG_DTFILE_DIR}}/{}.dts", candidate.name),
            );
        }
        _ => {
            if let Some(distro) = resolved.distro.as_deref() {
                out.assign("DISTRO", distro);
            }
            if let Some(tune) = resolved.tune.as_deref() {
                out.assign("DEFAULTTUNE", tune);
            }
            out.assign(
                "CONFIG_DTFILE",
                &format!("${{CONFIG_DTFILE_DIR}}/{}-{}.dts", machine, candidate.name),
            );
            out.assign("ESW_MACHINE", &candidate.element);
        }
    }

    for extra in &resolved.extra_lines {
        out.line(extra);
    }

    out.finalize()
}

/// One boot component's variables in the machine-override fragment.
struct ComponentVars {
    component: &'static str,
    comment: &'static str,
    prefix: &'static str,
    var: &'static str,
    deploy_key: &'static str,
    deploy_var: &'static str,
    image_var: &'static str,
    /// Boot-image partition to drop when the stage is already embedded.
    bif_remove: Option<&'static str>,
}

const COMPONENTS: &[ComponentVars] = &[
    ComponentVars {
        component: "fsbl",
        comment: "# First Stage Boot Loader",
        prefix: "Fsbl",
        var: "FSBL",
        deploy_key: "FsblDeployDir",
        deploy_var: "FSBL_DEPLOY_DIR",
        image_var: "FSBL_IMAGE_NAME",
        bif_remove: None,
    },
    ComponentVars {
        component: "r5fsbl",
        comment: "# Cortex-R5 First Stage Boot Loader",
        prefix: "R5Fsbl",
        var: "R5FSBL",
        deploy_key: "R5FsblDeployDir",
        deploy_var: "R5FSBL_DEPLOY_DIR",
        image_var: "R5FSBL_IMAGE_NAME",
        bif_remove: None,
    },
    ComponentVars {
        component: "pmu",
        comment: "# PMU Firmware",
        prefix: "Pmu",
        var: "PMU",
        deploy_key: "PmuFWDeployDir",
        deploy_var: "PMU_FIRMWARE_DEPLOY_DIR",
        image_var: "PMU_FIRMWARE_IMAGE_NAME",
        bif_remove: None,
    },
    ComponentVars {
        component: "plm",
        comment: "# Platform Loader and Manager",
        prefix: "Plm",
        var: "PLM",
        deploy_key: "PlmDeployDir",
        deploy_var: "PLM_DEPLOY_DIR",
        image_var: "PLM_IMAGE_NAME",
        bif_remove: Some("plmfw"),
    },
    ComponentVars {
        component: "psm",
        comment: "# PSM Firmware",
        prefix: "Psm",
        var: "PSM",
        deploy_key: "PsmFWDeployDir",
        deploy_var: "PSM_FIRMWARE_DEPLOY_DIR",
        image_var: "PSM_FIRMWARE_IMAGE_NAME",
        bif_remove: Some("psmfw"),
    },
];

/// Render the machine-override fragment: the default-domain device tree,
/// tune file registrations, boot component wiring, and the aggregate
/// multiconfig directive.
pub fn render_machine_overrides(resolution: &Resolution, machine: &str) -> String {
    let mut out = ConfEmitter::new();
    let settings = &resolution.settings;

    if let Some(dt) = settings.get("LinuxDT") {
        render_default_dt(&mut out, dt);
    }

    for prefix in ["Pmu", "Plm", "Psm"] {
        if let Some(tune) = settings.get(&format!("{prefix}Tune")) {
            out.assign(
                &format!("TUNEFILE[{tune}]"),
                &format!("conf/machine/include/{machine}/microblaze.inc"),
            );
        }
    }

    for vars in COMPONENTS {
        render_component(&mut out, settings, &resolution.removed, vars);
    }

    if let Some(aggregate) = settings.get("BBMULTICONFIG") {
        if !aggregate.is_empty() {
            out.blank();
            out.add("BBMULTICONFIG", aggregate);
        }
    }

    out.finalize()
}

/// Point the parent build at the default (Linux) domain device tree. The
/// directory is resolved through BBPATH so layers can relocate it.
fn render_default_dt(out: &mut ConfEmitter, dt: &str) {
    let dt = Path::new(dt);
    let dir = dt.parent().unwrap_or_else(|| Path::new(""));
    let file = dt
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    out.line("# Set the default (linux) domain device tree");
    out.line(&format!(
        "CONFIG_DTFILE_DIR := \"${{@bb.utils.which(d.getVar('BBPATH'), 'conf/{}')}}\"",
        dir.display()
    ));
    out.line(&format!("CONFIG_DTFILE ?= \"${{CONFIG_DTFILE_DIR}}/{file}\""));
    out.line("CONFIG_DTFILE[vardepsexclude] += \"CONFIG_DTFILE_DIR\"");
}

fn render_component(
    out: &mut ConfEmitter,
    settings: &SettingsTable,
    removed: &[String],
    vars: &ComponentVars,
) {
    let depends = settings.get(&format!("{}Depends", vars.prefix));
    let mc_depends = settings.get(&format!("{}McDepends", vars.prefix));
    let deploy_dir = settings.get(vars.deploy_key);

    if depends.is_some() || mc_depends.is_some() || deploy_dir.is_some() {
        out.blank();
        out.line(vars.comment);
        out.assign(&format!("{}_DEPENDS", vars.var), depends.unwrap_or(""));
        out.assign(&format!("{}_MCDEPENDS", vars.var), mc_depends.unwrap_or(""));
        out.assign(
            vars.deploy_var,
            deploy_dir.unwrap_or("").trim_end_matches('/'),
        );
        if let Some(image) = settings.get(&format!("{}ImageName", vars.prefix)) {
            out.assign(vars.image_var, image);
        }
    }

    if removed.iter().any(|c| c == vars.component) {
        if let Some(partition) = vars.bif_remove {
            out.blank();
            out.line(&format!(
                "# Remove the {} from the base boot image",
                vars.var
            ));
            out.line(&format!("BIF_PARTITION_ATTR:remove = \"{partition}\""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcgen_core::{Candidate, CpuFamily, OsHint};

    fn baremetal_resolved() -> Resolved {
        Resolved {
            candidate: Candidate {
                name: "cortexa53-0-baremetal".to_string(),
                element: "psu_cortexa53_0".to_string(),
                family: CpuFamily::CortexA53,
                core: 0,
                domain: None,
                role: Role::Baremetal,
                minimal: false,
                os_hint: OsHint::None,
            },
            distro: Some("standalone-nolto".to_string()),
            tune: Some("cortexa53".to_string()),
            extra_lines: Vec::new(),
        }
    }

    #[test]
    fn test_baremetal_descriptor() {
        let text = render_descriptor(&baremetal_resolved(), "zcu102");
        let expected = "\
TMPDIR .= \"-${BB_CURRENT_MC}\"

DISTRO = \"standalone-nolto\"
DEFAULTTUNE = \"cortexa53\"
CONFIG_DTFILE = \"${CONFIG_DTFILE_DIR}/zcu102-cortexa53-0-baremetal.dts\"
ESW_MACHINE = \"psu_cortexa53_0\"
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_linux_descriptor_has_no_distro() {
        let mut resolved = baremetal_resolved();
        resolved.candidate.name = "cortexa53-dom0-linux".to_string();
        resolved.candidate.role = Role::Linux;
        resolved.distro = None;
        resolved.tune = None;

        let text = render_descriptor(&resolved, "zcu102");
        assert!(text.contains("CONFIG_DTFILE = \"${CONFIG_DTFILE_DIR}/cortexa53-dom0-linux.dts\""));
        assert!(!text.contains("DISTRO"));
        assert!(!text.contains("ESW_MACHINE"));
    }

    #[test]
    fn test_extra_lines_appended() {
        let mut resolved = baremetal_resolved();
        resolved.extra_lines = vec!["PSU_INIT_PATH = \"/hw\"".to_string()];
        let text = render_descriptor(&resolved, "zcu102");
        assert!(text.ends_with("PSU_INIT_PATH = \"/hw\"\n"));
    }

    #[test]
    fn test_machine_overrides_wiring() {
        let mut resolution = Resolution::default();
        resolution.settings.set("PmuTune", "microblaze-pmu");
        resolution.settings.set(
            "PmuMcDepends",
            "mc::zcu102-microblaze-pmu:pmu-firmware:do_deploy",
        );
        resolution.settings.set(
            "PmuFWDeployDir",
            "${TMPDIR}-zcu102-microblaze-pmu/deploy/images/${MACHINE}/",
        );
        resolution
            .settings
            .set("BBMULTICONFIG", "microblaze-pmu cortexa53-0-baremetal");

        let text = render_machine_overrides(&resolution, "zcu102");
        assert!(text.contains(
            "TUNEFILE[microblaze-pmu] = \"conf/machine/include/zcu102/microblaze.inc\""
        ));
        assert!(text.contains("# PMU Firmware"));
        assert!(text.contains(
            "PMU_MCDEPENDS = \"mc::zcu102-microblaze-pmu:pmu-firmware:do_deploy\""
        ));
        // Trailing slash on the deploy dir is trimmed.
        assert!(text.contains(
            "PMU_FIRMWARE_DEPLOY_DIR = \"${TMPDIR}-zcu102-microblaze-pmu/deploy/images/${MACHINE}\""
        ));
        assert!(text
            .ends_with("BBMULTICONFIG += \"microblaze-pmu cortexa53-0-baremetal\"\n"));
    }

    #[test]
    fn test_default_device_tree_block() {
        let mut resolution = Resolution::default();
        resolution
            .settings
            .set("LinuxDT", "dts/cortexa53-zynqmp-linux.dts");

        let text = render_machine_overrides(&resolution, "zcu102");
        assert!(text.starts_with("# Set the default (linux) domain device tree\n"));
        assert!(text.contains(
            "CONFIG_DTFILE_DIR := \"${@bb.utils.which(d.getVar('BBPATH'), 'conf/dts')}\""
        ));
        assert!(text.contains(
            "CONFIG_DTFILE ?= \"${CONFIG_DTFILE_DIR}/cortexa53-zynqmp-linux.dts\""
        ));
        assert!(text.contains("CONFIG_DTFILE[vardepsexclude] += \"CONFIG_DTFILE_DIR\""));
    }

    #[test]
    fn test_removed_stage_drops_partition() {
        let mut resolution = Resolution::default();
        resolution.removed.push("plm".to_string());
        let text = render_machine_overrides(&resolution, "vck190");
        assert!(text.contains("BIF_PARTITION_ATTR:remove = \"plmfw\""));
        // No wiring block for a removed component.
        assert!(!text.contains("PLM_MCDEPENDS"));
    }

    #[test]
    fn test_empty_resolution_renders_nothing() {
        let resolution = Resolution::default();
        let text = render_machine_overrides(&resolution, "zcu102");
        assert!(text.is_empty());
    }
}
