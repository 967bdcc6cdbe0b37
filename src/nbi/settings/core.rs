//! Core Settings struct and implementations.

use super::Framework;
use std::path::{Path, PathBuf};

/// NetInstall image size handed to `createNetInstall.sh`, in megabytes.
pub const DEFAULT_NETINSTALL_SIZE_MB: u32 = 7000;

/// Main settings for an NBI build.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). All paths are
/// absolute once built.
///
/// # Examples
///
/// ```no_run
/// use autonbi::nbi::{Framework, SettingsBuilder};
///
/// # fn example() -> autonbi::nbi::Result<()> {
/// let settings = SettingsBuilder::new()
///     .name("Mavericks")
///     .destination("/Users/admin/BuildRoot")
///     .install_source("/Applications/Install OS X Mavericks.app/Contents/SharedSupport/InstallESD.dmg")
///     .framework(Framework::Python)
///     .build()?;
///
/// assert_eq!(settings.bundle_name(), "Mavericks+Python");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Base NBI name as given on the command line.
    name: String,

    /// Build root where the bundle and temporary files are written.
    destination: PathBuf,

    /// InstallESD.dmg (or equivalent disk image) to build from.
    install_source: PathBuf,

    /// Folder copied onto the NetInstall volume.
    overlay_folder: Option<PathBuf>,

    /// Value of `IsEnabled` in NBImageInfo.plist.
    enabled: bool,

    /// Frameworks injected into BaseSystem.dmg, in suffix order.
    frameworks: Vec<Framework>,

    /// Override for the System Image Utility resources directory.
    ///
    /// None means detect from the host OS version.
    siu_resources: Option<PathBuf>,

    /// NetInstall image size in megabytes.
    netinstall_size_mb: u32,
}

impl Settings {
    /// Returns the base name given on the command line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the effective bundle name.
    ///
    /// Adding frameworks appends `+Python` and/or `+Ruby` to the base name.
    pub fn bundle_name(&self) -> String {
        let mut name = self.name.clone();
        for framework in &self.frameworks {
            name.push_str(&framework.name_suffix());
        }
        name
    }

    /// Returns the path of the `.nbi` bundle directory.
    pub fn bundle_path(&self) -> PathBuf {
        self.destination.join(format!("{}.nbi", self.bundle_name()))
    }

    /// Returns the path of the NetInstall image inside the bundle.
    pub fn netinstall_image(&self) -> PathBuf {
        self.bundle_path().join("NetInstall.dmg")
    }

    /// Returns the build root.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Returns the installer disk image.
    pub fn install_source(&self) -> &Path {
        &self.install_source
    }

    /// Returns the resolved overlay folder, if any.
    pub fn overlay_folder(&self) -> Option<&Path> {
        self.overlay_folder.as_deref()
    }

    /// Returns whether the NBI is enabled by default.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the frameworks to add.
    pub fn frameworks(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Returns true when the NetInstall image has to be opened and resealed.
    pub fn needs_modification(&self) -> bool {
        self.overlay_folder.is_some() || !self.frameworks.is_empty()
    }

    /// Returns the SIU resources override.
    pub fn siu_resources(&self) -> Option<&Path> {
        self.siu_resources.as_deref()
    }

    /// Returns the NetInstall image size in megabytes.
    pub fn netinstall_size_mb(&self) -> u32 {
        self.netinstall_size_mb
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        name: String,
        destination: PathBuf,
        install_source: PathBuf,
        overlay_folder: Option<PathBuf>,
        enabled: bool,
        frameworks: Vec<Framework>,
        siu_resources: Option<PathBuf>,
        netinstall_size_mb: u32,
    ) -> Self {
        Self {
            name,
            destination,
            install_source,
            overlay_folder,
            enabled,
            frameworks,
            siu_resources,
            netinstall_size_mb,
        }
    }
}
