//! Main NBI build sequence.

use crate::nbi::{
    BuiltNbi, Result, Settings,
    error::ErrorExt,
    image_info::{self, NbImageInfo},
    modify,
    platform::macos::{
        MountedImage,
        netinstall::{self, NetInstallJob},
        system_version,
    },
    utils::fs,
};
use std::path::Path;

/// Builds one NBI from its settings.
#[derive(Debug)]
pub struct NbiBuilder {
    settings: Settings,
}

impl NbiBuilder {
    /// Creates a builder for `settings`.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns the settings this builder runs with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the full build.
    ///
    /// Images attached along the way are detached again, also when a step
    /// fails. The scratch directory is removed on return.
    pub async fn build(&self) -> Result<BuiltNbi> {
        let settings = &self.settings;

        let tmp = tempfile::Builder::new()
            .prefix("autonbi")
            .tempdir()
            .fs_context("creating temporary directory in", std::env::temp_dir())?;
        log::debug!("Using scratch directory {}", tmp.path().display());

        fs::create_dir_all(settings.destination(), false).await?;

        let installer = MountedImage::attach(settings.install_source(), tmp.path(), None).await?;
        let result = self.build_from(installer.mount_point(), tmp.path()).await;
        let detached = installer.detach().await;

        let built = result?;
        detached?;
        log::info!("Created {}", built.bundle_path.display());
        Ok(built)
    }

    async fn build_from(&self, installer_mount: &Path, tmp: &Path) -> Result<BuiltNbi> {
        let settings = &self.settings;
        let bundle_name = settings.bundle_name();
        let bundle_path = settings.bundle_path();

        let version = system_version::read_installer_version(installer_mount, tmp).await?;
        let description = version.description();

        let resources = match settings.siu_resources() {
            Some(resources) => resources.to_path_buf(),
            None => netinstall::detect_siu_resources().await?,
        };

        let job = NetInstallJob {
            workdir: settings.destination(),
            bundle_path: &bundle_path,
            volume_name: &bundle_name,
            install_source: installer_mount,
            size_mb: settings.netinstall_size_mb(),
        };
        let os_version = version.short_version();
        let info = BundleInfo {
            description: &description,
            enabled: settings.is_enabled(),
            os_version: &os_version,
        };
        create_bundle(&resources, &job, &info).await?;

        let modified = settings.needs_modification();
        if modified {
            modify::modify_netinstall(settings, installer_mount, tmp).await?;
        }

        let netinstall_image = settings.netinstall_image();
        tokio::fs::metadata(&netinstall_image)
            .await
            .fs_context("missing NetInstall image", &netinstall_image)?;

        Ok(BuiltNbi {
            bundle_path,
            netinstall_image,
            description,
            modified,
        })
    }
}

/// NBImageInfo values that do not come from the bundle itself.
struct BundleInfo<'a> {
    description: &'a str,
    enabled: bool,
    os_version: &'a str,
}

/// Runs `createNetInstall.sh` for `job` and writes NBImageInfo.plist.
///
/// The helper scripts placed in the work dir are removed whether or not the
/// bundle could be created.
async fn create_bundle(resources: &Path, job: &NetInstallJob<'_>, info: &BundleInfo<'_>) -> Result<()> {
    netinstall::prepare_workdir(resources, job.workdir).await?;

    let created = write_bundle(resources, job, info).await;
    let cleaned = netinstall::cleanup_workdir(job.workdir).await;

    created?;
    cleaned
}

async fn write_bundle(resources: &Path, job: &NetInstallJob<'_>, info: &BundleInfo<'_>) -> Result<()> {
    netinstall::create_netinstall(resources, job).await?;

    let enabled_systems = image_info::read_supported_models(job.bundle_path)?;
    NbImageInfo::netinstall(
        job.volume_name,
        info.description,
        info.enabled,
        enabled_systems,
        info.os_version,
    )
    .write_to_bundle(job.bundle_path)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    /// SIU resources whose build script runs `body`.
    fn fake_resources(body: &str) -> tempfile::TempDir {
        let resources = tempfile::tempdir().unwrap();
        std::fs::write(resources.path().join("createCommon.sh"), "# common").unwrap();
        let script = resources.path().join("createNetInstall.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        resources
    }

    fn assert_workdir_clean(workdir: &Path) {
        assert!(!workdir.join("createCommon.sh").exists());
        assert!(!workdir.join("createVariables.sh").exists());
    }

    const INFO: BundleInfo<'static> = BundleInfo {
        description: "OS X 10.9.5-13F34",
        enabled: true,
        os_version: "10.9",
    };

    #[tokio::test]
    async fn bundle_gets_image_info_and_workdir_is_cleaned() {
        let resources = fake_resources("mkdir -p \"$destPath\"");
        let workdir = tempfile::tempdir().unwrap();
        let bundle = workdir.path().join("Mavericks.nbi");
        let job = NetInstallJob {
            workdir: workdir.path(),
            bundle_path: &bundle,
            volume_name: "Mavericks",
            install_source: Path::new("/tmp/dmg.abc"),
            size_mb: 7000,
        };

        create_bundle(resources.path(), &job, &INFO).await.unwrap();

        let info = NbImageInfo::read_from_bundle(&bundle).unwrap();
        assert_eq!(info.name, "Mavericks");
        assert_eq!(info.description, "OS X 10.9.5-13F34");
        assert!(info.is_enabled);
        assert_workdir_clean(workdir.path());
    }

    #[tokio::test]
    async fn failed_image_info_still_cleans_workdir() {
        // The script succeeds without creating the bundle, so the plist cannot be written.
        let resources = fake_resources("exit 0");
        let workdir = tempfile::tempdir().unwrap();
        let bundle = workdir.path().join("Mavericks.nbi");
        let job = NetInstallJob {
            workdir: workdir.path(),
            bundle_path: &bundle,
            volume_name: "Mavericks",
            install_source: Path::new("/tmp/dmg.abc"),
            size_mb: 7000,
        };

        assert!(create_bundle(resources.path(), &job, &INFO).await.is_err());
        assert_workdir_clean(workdir.path());
    }

    #[tokio::test]
    async fn failed_build_script_cleans_workdir() {
        let resources = fake_resources("echo 'disk full' >&2; exit 1");
        let workdir = tempfile::tempdir().unwrap();
        let bundle = workdir.path().join("Mavericks.nbi");
        let job = NetInstallJob {
            workdir: workdir.path(),
            bundle_path: &bundle,
            volume_name: "Mavericks",
            install_source: Path::new("/tmp/dmg.abc"),
            size_mb: 7000,
        };

        let err = create_bundle(resources.path(), &job, &INFO).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_workdir_clean(workdir.path());
    }
}
