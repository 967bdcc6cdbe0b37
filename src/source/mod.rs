//! Installer source resolution.
//!
//! `--source` may name an installer app, a disk image, or a folder holding
//! one or more installer apps. [`resolve`] turns it into the candidate
//! `InstallESD.dmg` images an NBI can be built from.

use crate::nbi::{Error, Result, error::ErrorExt};
use std::path::{Path, PathBuf};

/// Name prefixes of installer apps found inside a folder.
const INSTALLER_PREFIXES: [&str; 2] = ["Install OS X", "Install Mac OS X"];

/// File name suffix of the installer disk image.
const INSTALL_ESD: &str = "InstallESD.dmg";

/// What kind of path `--source` points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A folder to search for installer apps
    Folder(PathBuf),
    /// An `Install OS X *.app` bundle
    InstallerApp(PathBuf),
    /// A `.dmg` or `.sparseimage` used as is
    DiskImage(PathBuf),
}

impl SourceKind {
    /// Classifies `path`.
    pub fn detect(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).fs_context("not a valid path:", path)?;

        if metadata.is_dir() {
            if path.extension().is_some_and(|ext| ext == "app") {
                return Ok(Self::InstallerApp(path.to_path_buf()));
            }
            return Ok(Self::Folder(path.to_path_buf()));
        }

        let is_image = path
            .extension()
            .is_some_and(|ext| ext == "dmg" || ext == "sparseimage");
        if metadata.is_file() && is_image {
            return Ok(Self::DiskImage(path.to_path_buf()));
        }

        crate::bail!(
            "{} is neither an installer app nor a disk image",
            path.display()
        )
    }
}

/// One installer an NBI can be built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstallerCandidate {
    /// Installer app, or the disk image itself when given directly
    pub app: PathBuf,
    /// Disk image handed to the build
    pub install_esd: PathBuf,
}

impl InstallerCandidate {
    /// Name shown when picking between installers.
    pub fn display_name(&self) -> String {
        self.app
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.app.display().to_string())
    }
}

/// Outcome of resolving `--source`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Single(InstallerCandidate),
    /// Several installers, sorted by path
    Multiple(Vec<InstallerCandidate>),
}

impl Resolution {
    /// Returns the only candidate, failing with
    /// [`Error::MultipleInstallers`] when there is a choice to make.
    pub fn require_single(self, source: &Path) -> Result<InstallerCandidate> {
        match self {
            Self::Single(candidate) => Ok(candidate),
            Self::Multiple(candidates) => Err(Error::MultipleInstallers {
                path: source.to_path_buf(),
                count: candidates.len(),
            }),
        }
    }
}

/// Resolves `source` into installer candidates.
pub fn resolve(source: &Path) -> Result<Resolution> {
    match SourceKind::detect(source)? {
        SourceKind::InstallerApp(app) => {
            let install_esd = app.join("Contents/SharedSupport").join(INSTALL_ESD);
            if !install_esd.is_file() {
                crate::bail!("{} does not contain {}", app.display(), INSTALL_ESD);
            }
            log::debug!("Using installer app {}", app.display());
            Ok(Resolution::Single(InstallerCandidate { app, install_esd }))
        }
        SourceKind::DiskImage(image) => Ok(Resolution::Single(InstallerCandidate {
            app: image.clone(),
            install_esd: image,
        })),
        SourceKind::Folder(folder) => {
            let mut candidates = locate_installers(&folder)?;
            match candidates.len() {
                0 => Err(Error::NoInstallers(folder)),
                1 => Ok(Resolution::Single(candidates.remove(0))),
                _ => Ok(Resolution::Multiple(candidates)),
            }
        }
    }
}

/// Finds installer apps directly inside `folder` that carry an
/// `InstallESD.dmg` somewhere below them.
pub fn locate_installers(folder: &Path) -> Result<Vec<InstallerCandidate>> {
    log::info!("Locating installers in {}", folder.display());

    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(folder).fs_context("reading directory", folder)? {
        let entry = entry.fs_context("reading directory", folder)?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !INSTALLER_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
            continue;
        }

        let app = entry.path();
        if let Some(install_esd) = find_install_esd(&app)? {
            log::debug!("Found {}", install_esd.display());
            candidates.push(InstallerCandidate { app, install_esd });
        }
    }

    candidates.sort_by(|a, b| a.app.cmp(&b.app));
    Ok(candidates)
}

fn find_install_esd(app: &Path) -> Result<Option<PathBuf>> {
    for entry in walkdir::WalkDir::new(app).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(INSTALL_ESD)
        {
            return Ok(Some(entry.into_path()));
        }
    }
    Ok(None)
}
