//! NetInstall image creation through System Image Utility's build scripts.
//!
//! `createNetInstall.sh` expects `createCommon.sh` and `createVariables.sh`
//! beside the build root. The variables are handed over through the
//! environment instead, so `createVariables.sh` only has to exist.

use crate::nbi::{
    error::{Context, ErrorExt, Result},
    platform::run_tool,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Resources directory inside System Image Utility.app.
const SIU_RESOURCES: &str = "Contents/Frameworks/SIUFoundation.framework/Versions/A/XPCServices/com.apple.SIUAgent.xpc/Contents/Resources";

/// System Image Utility location up to 10.9.
const SIU_APP_LEGACY: &str = "/System/Library/CoreServices/System Image Utility.app";

/// System Image Utility location from 10.10 on.
const SIU_APP: &str = "/System/Library/CoreServices/Applications/System Image Utility.app";

const CREATE_COMMON: &str = "createCommon.sh";
const CREATE_VARIABLES: &str = "createVariables.sh";
const CREATE_NETINSTALL: &str = "createNetInstall.sh";

/// Parses dotted OS versions such as `10.9`, `10.9.5` or `10.10`.
///
/// Missing components count as zero; anything past the patch level is ignored.
pub fn parse_os_version(version: &str) -> Option<semver::Version> {
    let mut parts = [0u64; 3];
    let mut seen = 0;
    for (slot, part) in parts.iter_mut().zip(version.trim().split('.')) {
        *slot = part.parse().ok()?;
        seen += 1;
    }
    if seen == 0 {
        return None;
    }
    Some(semver::Version::new(parts[0], parts[1], parts[2]))
}

/// Returns the SIU resources directory for a host running `host_version`.
///
/// Unparseable versions are treated as current releases.
pub fn siu_resources_for(host_version: &str) -> PathBuf {
    let moved_in = semver::Version::new(10, 10, 0);
    let app = match parse_os_version(host_version) {
        Some(version) if version < moved_in => SIU_APP_LEGACY,
        _ => SIU_APP,
    };
    Path::new(app).join(SIU_RESOURCES)
}

/// Returns the host's OS version via `sw_vers`.
pub async fn host_version() -> Result<String> {
    let stdout = run_tool(Command::new("/usr/bin/sw_vers").arg("-productVersion"))
        .await
        .context("reading host OS version")?;
    Ok(String::from_utf8_lossy(&stdout).trim().to_string())
}

/// Locates the SIU resources directory for this host.
pub async fn detect_siu_resources() -> Result<PathBuf> {
    let version = host_version().await?;
    let resources = siu_resources_for(&version);
    log::debug!(
        "Host is OS X {}, using SIU resources at {}",
        version,
        resources.display()
    );
    Ok(resources)
}

/// Parameters for one `createNetInstall.sh` run.
#[derive(Debug)]
pub struct NetInstallJob<'a> {
    /// Build root holding the helper scripts
    pub workdir: &'a Path,
    /// `.nbi` bundle to create
    pub bundle_path: &'a Path,
    /// Volume name of the NetInstall image
    pub volume_name: &'a str,
    /// Mount point of the installer
    pub install_source: &'a Path,
    /// NetInstall image size in megabytes
    pub size_mb: u32,
}

impl NetInstallJob<'_> {
    /// Environment `createNetInstall.sh` reads in place of createVariables.sh.
    pub fn environment(&self) -> Vec<(&'static str, String)> {
        vec![
            ("destPath", self.bundle_path.display().to_string()),
            ("dmgTarget", "NetInstall".to_string()),
            ("dmgVolName", self.volume_name.to_string()),
            ("destVolFSType", "JHFS+".to_string()),
            ("installSource", self.install_source.display().to_string()),
            ("scriptsDebugKey", "INFO".to_string()),
            ("ownershipInfoKey", "root:wheel".to_string()),
        ]
    }
}

/// Copies `createCommon.sh` into `workdir` and creates an empty
/// `createVariables.sh` next to it.
pub async fn prepare_workdir(resources: &Path, workdir: &Path) -> Result<()> {
    let common_source = resources.join(CREATE_COMMON);
    let common_target = workdir.join(CREATE_COMMON);

    tokio::fs::copy(&common_source, &common_target)
        .await
        .fs_context("copying build script", &common_source)?;

    let variables = workdir.join(CREATE_VARIABLES);
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&variables)
        .await
        .fs_context("creating", &variables)?;

    Ok(())
}

/// Runs `createNetInstall.sh` for `job`.
pub async fn create_netinstall(resources: &Path, job: &NetInstallJob<'_>) -> Result<()> {
    let script = resources.join(CREATE_NETINSTALL);
    log::info!("Creating NetInstall image at {}", job.bundle_path.display());

    let mut command = Command::new(&script);
    command
        .arg(job.workdir)
        .arg(job.size_mb.to_string())
        .env_clear()
        .env("PATH", "/usr/bin:/bin:/usr/sbin:/sbin")
        .envs(job.environment());

    run_tool(&mut command)
        .await
        .with_context(|| format!("building {}", job.bundle_path.display()))?;
    Ok(())
}

/// Removes the helper scripts placed by [`prepare_workdir`].
pub async fn cleanup_workdir(workdir: &Path) -> Result<()> {
    for name in [CREATE_COMMON, CREATE_VARIABLES] {
        let path = workdir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("removing", &path),
        }
    }
    Ok(())
}
