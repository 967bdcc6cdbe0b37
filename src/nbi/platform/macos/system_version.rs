//! OS version detection for installer sources.
//!
//! The installer's own version lives in BaseSystem.dmg at
//! `System/Library/CoreServices/SystemVersion.plist`.

use super::MountedImage;
use crate::nbi::error::{Context, Error, ErrorExt, Result};
use serde::Deserialize;
use std::path::Path;

/// Location of SystemVersion.plist relative to a system volume.
pub const SYSTEM_VERSION_PLIST: &str = "System/Library/CoreServices/SystemVersion.plist";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SystemVersionPlist {
    product_user_visible_version: Option<String>,
    product_version: Option<String>,
    product_build_version: Option<String>,
}

/// OS version and build of an installer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OsVersion {
    pub product_version: String,
    pub build_version: String,
}

impl OsVersion {
    /// Reads a SystemVersion.plist file.
    ///
    /// Prefers `ProductUserVisibleVersion`, falling back to `ProductVersion`.
    pub fn from_plist(path: &Path) -> Result<Self> {
        let raw: SystemVersionPlist = plist::from_file(path)
            .map_err(Error::from)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let product_version = raw
            .product_user_visible_version
            .or(raw.product_version)
            .with_context(|| format!("{} has no product version", path.display()))?;
        let build_version = raw
            .product_build_version
            .with_context(|| format!("{} has no build version", path.display()))?;

        Ok(Self {
            product_version,
            build_version,
        })
    }

    /// NBI description, e.g. `OS X 10.9.5-13F34`.
    pub fn description(&self) -> String {
        format!("OS X {}-{}", self.product_version, self.build_version)
    }

    /// `major.minor` part of the version, e.g. `10.9`.
    pub fn short_version(&self) -> String {
        self.product_version
            .split('.')
            .take(2)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Reads the OS version of the installer mounted at `installer_mount`.
///
/// Mounts the installer's BaseSystem.dmg below `mount_root`, reads its
/// SystemVersion.plist and detaches it again.
pub async fn read_installer_version(installer_mount: &Path, mount_root: &Path) -> Result<OsVersion> {
    let base_system = installer_mount.join("BaseSystem.dmg");
    let metadata = tokio::fs::metadata(&base_system)
        .await
        .fs_context("Missing BaseSystem.dmg in", installer_mount)?;
    if !metadata.is_file() {
        crate::bail!("Missing BaseSystem.dmg in {}", installer_mount.display());
    }

    let mounted = MountedImage::attach(&base_system, mount_root, None).await?;
    let plist_path = mounted.mount_point().join(SYSTEM_VERSION_PLIST);
    let version = OsVersion::from_plist(&plist_path);
    mounted.detach().await?;

    let version = version?;
    log::info!("Installer is {}", version.description());
    Ok(version)
}
