//! Post-build modification of the NetInstall image.
//!
//! `NetInstall.dmg` is attached read/write through a shadow file, changed,
//! and then sealed into a sparse image that replaces the original.

pub mod frameworks;
pub mod overlay;

use crate::nbi::{
    error::Result,
    platform::macos::{ImageFormat, MountedImage, hdiutil},
    settings::Settings,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Returns the shadow file used while modifying `image`.
pub fn shadow_path(image: &Path) -> PathBuf {
    let mut name = image.file_name().unwrap_or_default().to_os_string();
    name.push(".shadow");
    image.with_file_name(name)
}

/// Applies the overlay folder and frameworks requested in `settings` to the
/// bundle's NetInstall image.
///
/// `installer_mount` is the attached installer image, `tmp` a scratch
/// directory for mount points and payloads.
pub async fn modify_netinstall(settings: &Settings, installer_mount: &Path, tmp: &Path) -> Result<()> {
    let image = settings.netinstall_image();
    let shadow = shadow_path(&image);

    log::info!("Modifying {}", image.display());
    let volume = MountedImage::attach(&image, tmp, Some(&shadow)).await?;

    if let Some(folder) = settings.overlay_folder() {
        overlay::overlay_folder(folder, volume.mount_point()).await?;
    }

    if !settings.frameworks().is_empty() {
        frameworks::add_frameworks(
            settings.frameworks(),
            volume.mount_point(),
            installer_mount,
            tmp,
        )
        .await?;
    }

    volume.detach().await?;
    seal(&image, &shadow).await
}

/// Folds `shadow` into `image`, leaving a sparse image under the original name.
async fn seal(image: &Path, shadow: &Path) -> Result<()> {
    let sparse = image.with_extension(ImageFormat::SparseImage.extension());
    fs::remove_file(&sparse).await?;

    hdiutil::convert(image, ImageFormat::SparseImage, Some(shadow), &sparse).await?;

    fs::remove_file(shadow).await?;
    fs::remove_file(image).await?;
    fs::move_file(&sparse, image).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_sits_next_to_the_image() {
        assert_eq!(
            shadow_path(Path::new("/BuildRoot/Mavericks.nbi/NetInstall.dmg")),
            Path::new("/BuildRoot/Mavericks.nbi/NetInstall.dmg.shadow")
        );
    }
}
