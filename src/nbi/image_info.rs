//! NBImageInfo.plist generation.
//!
//! NetBoot servers read `NBImageInfo.plist` at the root of every `.nbi` bundle
//! to decide whether and how to offer the image. `IsEnabled` controls whether
//! the image shows up for clients at all.

use crate::nbi::error::{Context, Error, ErrorExt, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the image metadata inside an NBI bundle.
pub const NBIMAGEINFO_PLIST: &str = "NBImageInfo.plist";

/// Location of the supported-models list inside an NBI bundle.
pub const PLATFORM_SUPPORT_PLIST: &str = "i386/PlatformSupport.plist";

/// Image index written for every NBI.
pub const DEFAULT_INDEX: u32 = 5000;

/// Contents of NBImageInfo.plist for a NetInstall image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NbImageInfo {
    #[serde(rename = "IsInstall")]
    pub is_install: bool,
    #[serde(rename = "Index")]
    pub index: u32,
    #[serde(rename = "Kind")]
    pub kind: u32,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "IsEnabled")]
    pub is_enabled: bool,
    #[serde(rename = "SupportsDiskless")]
    pub supports_diskless: bool,
    #[serde(rename = "RootPath")]
    pub root_path: String,
    #[serde(rename = "EnabledSystemIdentifiers")]
    pub enabled_system_identifiers: Vec<String>,
    #[serde(rename = "BootFile")]
    pub boot_file: String,
    #[serde(rename = "Architectures")]
    pub architectures: Vec<String>,
    #[serde(rename = "BackwardCompatible")]
    pub backward_compatible: bool,
    #[serde(rename = "DisabledSystemIdentifiers")]
    pub disabled_system_identifiers: Vec<String>,
    #[serde(rename = "Type")]
    pub boot_type: String,
    #[serde(rename = "IsDefault")]
    pub is_default: bool,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "osVersion")]
    pub os_version: String,
}

impl NbImageInfo {
    /// Metadata for a NetInstall image booting over NFS.
    pub fn netinstall(
        name: &str,
        description: &str,
        enabled: bool,
        enabled_systems: Vec<String>,
        os_version: &str,
    ) -> Self {
        Self {
            is_install: true,
            index: DEFAULT_INDEX,
            kind: 1,
            description: description.to_string(),
            language: "Default".to_string(),
            is_enabled: enabled,
            supports_diskless: false,
            root_path: "NetInstall.dmg".to_string(),
            enabled_system_identifiers: enabled_systems,
            boot_file: "booter".to_string(),
            architectures: vec!["i386".to_string()],
            backward_compatible: false,
            disabled_system_identifiers: Vec::new(),
            boot_type: "NFS".to_string(),
            is_default: false,
            name: name.to_string(),
            os_version: os_version.to_string(),
        }
    }

    /// Writes the metadata as `NBImageInfo.plist` into `bundle_path`.
    pub fn write_to_bundle(&self, bundle_path: &Path) -> Result<()> {
        let path = bundle_path.join(NBIMAGEINFO_PLIST);
        log::debug!("Writing {}", path.display());
        plist::to_file_xml(&path, self)
            .map_err(Error::from)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Reads `NBImageInfo.plist` from `bundle_path`.
    pub fn read_from_bundle(bundle_path: &Path) -> Result<Self> {
        let path = bundle_path.join(NBIMAGEINFO_PLIST);
        plist::from_file(&path)
            .map_err(Error::from)
            .with_context(|| format!("reading {}", path.display()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct PlatformSupport {
    #[serde(rename = "SupportedModelProperties", default)]
    supported_model_properties: Vec<String>,
}

/// Reads the model identifiers an NBI supports from its PlatformSupport.plist.
///
/// A bundle without the file supports no explicit models.
pub fn read_supported_models(bundle_path: &Path) -> Result<Vec<String>> {
    let path = bundle_path.join(PLATFORM_SUPPORT_PLIST);
    match std::fs::metadata(&path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} not found, enabling no system identifiers", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).fs_context("reading", &path),
    }

    let support: PlatformSupport = plist::from_file(&path)
        .map_err(Error::from)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(support.supported_model_properties)
}
