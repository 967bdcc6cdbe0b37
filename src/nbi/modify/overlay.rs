//! Replacing a top-level folder of the NetInstall volume.

use crate::nbi::{
    error::{Context, Result},
    utils::fs,
};
use std::path::{Path, PathBuf};

/// Copies `source` onto `volume` as `<volume>/<basename of source>`.
///
/// Whatever the volume held under that name is removed first, so the result
/// mirrors `source` exactly. Returns the target path.
pub async fn overlay_folder(source: &Path, volume: &Path) -> Result<PathBuf> {
    if !source.is_dir() {
        crate::bail!("{} is not a directory", source.display());
    }
    let name = source
        .file_name()
        .with_context(|| format!("{} has no folder name", source.display()))?;
    let target = volume.join(name);

    log::info!(
        "Replacing {} with {}",
        target.display(),
        source.display()
    );

    fs::create_dir_all(&target, true).await?;
    fs::copy_dir(source, &target)
        .await
        .with_context(|| format!("copying {} to {}", source.display(), target.display()))?;

    Ok(target)
}
