//! Builder for constructing Settings.

use super::{DEFAULT_NETINSTALL_SIZE_MB, Framework, Settings};
use crate::nbi::error::{Context, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Required fields are `name`, `destination` and `install_source`. The
/// overlay folder may be given either as a path or as the name of a folder
/// inside the build root.
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    name: Option<String>,
    destination: Option<PathBuf>,
    install_source: Option<PathBuf>,
    overlay_folder: Option<PathBuf>,
    enabled: bool,
    frameworks: Vec<Framework>,
    siu_resources: Option<PathBuf>,
    netinstall_size_mb: Option<u32>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the NBI name, without the `.nbi` extension.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the build root.
    pub fn destination<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.destination = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the installer disk image.
    pub fn install_source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.install_source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the folder to copy onto the NetInstall volume.
    pub fn overlay_folder<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.overlay_folder = Some(path.as_ref().to_path_buf());
        self
    }

    /// Marks the NBI enabled in NBImageInfo.plist.
    ///
    /// Default: false
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a framework to inject into BaseSystem.dmg.
    pub fn framework(mut self, framework: Framework) -> Self {
        self.frameworks.push(framework);
        self
    }

    /// Overrides the System Image Utility resources directory.
    ///
    /// Default: detected from the host OS version
    pub fn siu_resources<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.siu_resources = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the NetInstall image size in megabytes.
    ///
    /// Default: [`DEFAULT_NETINSTALL_SIZE_MB`]
    pub fn netinstall_size_mb(mut self, size: u32) -> Self {
        self.netinstall_size_mb = Some(size);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, the name is empty or
    /// contains a path separator, or the overlay folder cannot be found.
    pub fn build(self) -> Result<Settings> {
        let name = self.name.context("name is required")?;
        if name.trim().is_empty() {
            crate::bail!("NBI name cannot be empty");
        }
        if name.contains('/') {
            crate::bail!("NBI name '{}' must not contain '/'", name);
        }

        let destination = self.destination.context("destination is required")?;
        let destination = absolute(&destination)?;

        let install_source = self.install_source.context("install_source is required")?;
        let install_source = absolute(&install_source)?;

        let overlay_folder = self
            .overlay_folder
            .map(|folder| resolve_overlay_folder(&folder, &destination))
            .transpose()?;

        let mut frameworks = self.frameworks;
        frameworks.sort();
        frameworks.dedup();

        let siu_resources = self.siu_resources.map(|p| absolute(&p)).transpose()?;

        let netinstall_size_mb = self
            .netinstall_size_mb
            .unwrap_or(DEFAULT_NETINSTALL_SIZE_MB);
        if netinstall_size_mb == 0 {
            crate::bail!("NetInstall size must be greater than zero");
        }

        Ok(Settings::new(
            name,
            destination,
            install_source,
            overlay_folder,
            self.enabled,
            frameworks,
            siu_resources,
            netinstall_size_mb,
        ))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving absolute path", path)?
        .into_owned())
}

/// Finds the overlay folder: an existing directory path wins, otherwise the
/// folder of that name inside the build root.
fn resolve_overlay_folder(folder: &Path, destination: &Path) -> Result<PathBuf> {
    if folder.is_dir() {
        return absolute(folder);
    }

    let in_build_root = destination.join(folder);
    if in_build_root.is_dir() {
        return Ok(in_build_root);
    }

    crate::bail!(
        "{} is not a valid path - unable to proceed (also looked for {})",
        folder.display(),
        in_build_root.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(root: &Path) -> SettingsBuilder {
        SettingsBuilder::new()
            .name("Mavericks")
            .destination(root)
            .install_source(root.join("InstallESD.dmg"))
    }

    #[test]
    fn plain_build_uses_name_for_bundle() {
        let root = tempfile::tempdir().unwrap();
        let settings = base(root.path()).build().unwrap();

        assert_eq!(settings.bundle_name(), "Mavericks");
        assert_eq!(settings.bundle_path(), root.path().join("Mavericks.nbi"));
        assert_eq!(
            settings.netinstall_image(),
            root.path().join("Mavericks.nbi/NetInstall.dmg")
        );
        assert!(!settings.is_enabled());
        assert!(!settings.needs_modification());
        assert_eq!(settings.netinstall_size_mb(), DEFAULT_NETINSTALL_SIZE_MB);
    }

    #[test]
    fn frameworks_suffix_the_bundle_name_in_fixed_order() {
        let root = tempfile::tempdir().unwrap();
        let settings = base(root.path())
            .framework(Framework::Ruby)
            .framework(Framework::Python)
            .framework(Framework::Ruby)
            .build()
            .unwrap();

        assert_eq!(settings.frameworks(), &[Framework::Python, Framework::Ruby]);
        assert_eq!(settings.bundle_name(), "Mavericks+Python+Ruby");
        assert!(settings.needs_modification());
    }

    #[test]
    fn ruby_only_suffix() {
        let root = tempfile::tempdir().unwrap();
        let settings = base(root.path()).framework(Framework::Ruby).build().unwrap();
        assert_eq!(settings.bundle_name(), "Mavericks+Ruby");
    }

    #[test]
    fn overlay_folder_is_found_in_build_root() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("Packages")).unwrap();

        let settings = base(root.path())
            .overlay_folder("Packages")
            .build()
            .unwrap();

        assert_eq!(
            settings.overlay_folder(),
            Some(root.path().join("Packages").as_path())
        );
        assert!(settings.needs_modification());
    }

    #[test]
    fn overlay_folder_accepts_existing_path() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();

        let settings = base(root.path())
            .overlay_folder(elsewhere.path())
            .build()
            .unwrap();

        assert_eq!(settings.overlay_folder(), Some(elsewhere.path()));
    }

    #[test]
    fn missing_overlay_folder_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = base(root.path()).overlay_folder("Nope").build().unwrap_err();
        assert!(err.to_string().contains("not a valid path"));
    }

    #[test]
    fn name_is_validated() {
        let root = tempfile::tempdir().unwrap();
        assert!(base(root.path()).name("").build().is_err());
        assert!(base(root.path()).name("a/b").build().is_err());
        assert!(
            SettingsBuilder::new()
                .destination(root.path())
                .install_source("x.dmg")
                .build()
                .is_err()
        );
    }

    #[test]
    fn relative_destination_is_made_absolute() {
        let settings = SettingsBuilder::new()
            .name("Lion")
            .destination("BuildRoot")
            .install_source("InstallESD.dmg")
            .build()
            .unwrap();
        assert!(settings.destination().is_absolute());
        assert!(settings.destination().ends_with("BuildRoot"));
    }
}
