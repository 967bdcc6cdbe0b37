//! Adding interpreter frameworks to BaseSystem.dmg.
//!
//! The frameworks come from the installer's own packages. Each package's
//! `Payload` is pulled out with `xar`, decoded to cpio once and reused by
//! every framework that needs it.

use crate::nbi::{
    builder::tool_detection::XAR,
    error::{Context, Result},
    payload::{self, ExtractOptions},
    platform::{
        macos::{ImageFormat, MountedImage, hdiutil},
        run_tool,
    },
    settings::Framework,
    utils::fs,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const BASE_SYSTEM_DMG: &str = "BaseSystem.dmg";
const BASE_SYSTEM_SHADOW: &str = "BaseSystem.shadow";
const BASE_SYSTEM_NEW: &str = "BaseSystemNew.dmg";

/// Room BaseSystem.dmg gets before frameworks are copied in.
const BASE_SYSTEM_SIZE: &str = "10G";

/// Decoded package payloads, keyed by package name.
struct PayloadCache<'a> {
    installer_mount: &'a Path,
    tmp: &'a Path,
    archives: HashMap<&'static str, PathBuf>,
}

impl<'a> PayloadCache<'a> {
    fn new(installer_mount: &'a Path, tmp: &'a Path) -> Self {
        Self {
            installer_mount,
            tmp,
            archives: HashMap::new(),
        }
    }

    /// Returns the cpio archive of `package`, extracting it on first use.
    async fn archive(&mut self, package: &'static str) -> Result<PathBuf> {
        if let Some(archive) = self.archives.get(package) {
            log::debug!("Using cached payload of {}.pkg", package);
            return Ok(archive.clone());
        }

        let pkg = self
            .installer_mount
            .join("Packages")
            .join(format!("{package}.pkg"));
        log::info!("Extracting payload of {}", pkg.display());

        let xar = XAR
            .as_deref()
            .context("xar is required to add frameworks but was not found in PATH")?;
        run_tool(
            Command::new(xar)
                .arg("-x")
                .arg("-f")
                .arg(&pkg)
                .arg("Payload")
                .arg("-C")
                .arg(self.tmp),
        )
        .await
        .with_context(|| format!("extracting Payload from {}", pkg.display()))?;

        let raw = self.tmp.join("Payload");
        let archive = self.tmp.join(format!("Payload-{package}.cpio"));
        let format = payload::decode_payload(&raw, &archive).await?;
        log::debug!("{}.pkg payload was {:?}", package, format);
        fs::remove_file(&raw).await?;

        self.archives.insert(package, archive.clone());
        Ok(archive)
    }

    async fn clear(self) -> Result<()> {
        for archive in self.archives.values() {
            fs::remove_file(archive).await?;
        }
        Ok(())
    }
}

/// Copies `frameworks` from the installer's packages into the
/// BaseSystem.dmg found on `netinstall_volume`.
///
/// `tmp` holds the shadow file, mount points and extracted payloads.
pub async fn add_frameworks(
    frameworks: &[Framework],
    netinstall_volume: &Path,
    installer_mount: &Path,
    tmp: &Path,
) -> Result<()> {
    let base_system = netinstall_volume.join(BASE_SYSTEM_DMG);
    let shadow = tmp.join(BASE_SYSTEM_SHADOW);

    hdiutil::resize(&base_system, BASE_SYSTEM_SIZE, &shadow).await?;
    let volume = MountedImage::attach(&base_system, tmp, Some(&shadow)).await?;

    let mut cache = PayloadCache::new(installer_mount, tmp);
    let options = ExtractOptions {
        preserve_owners: true,
    };

    for framework in frameworks {
        log::info!(
            "Adding {} framework from {} to {}",
            framework,
            installer_mount.display(),
            base_system.display()
        );

        for &package in framework.source_packages() {
            let archive = cache.archive(package).await?;
            let stats = payload::extract_archive(
                &archive,
                volume.mount_point(),
                framework.patterns(),
                options,
            )
            .await
            .with_context(|| format!("adding {} from {}.pkg", framework, package))?;

            log::debug!(
                "{}.pkg: {} files, {} directories, {} symlinks, {} hard links",
                package,
                stats.files,
                stats.directories,
                stats.symlinks,
                stats.hard_links
            );
        }
    }

    cache.clear().await?;
    volume.detach().await?;

    let rebuilt = tmp.join(BASE_SYSTEM_NEW);
    fs::remove_file(&rebuilt).await?;
    hdiutil::convert(&base_system, ImageFormat::ReadOnly, Some(&shadow), &rebuilt).await?;

    fs::remove_file(&base_system).await?;
    fs::move_file(&rebuilt, &base_system).await?;
    fs::remove_file(&shadow).await
}
