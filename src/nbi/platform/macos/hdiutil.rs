//! Disk image handling through `hdiutil`.
//!
//! Images are attached under a private mount root with `-mountRandom`, never
//! shown in Finder (`-nobrowse`), and with ownership honoured (`-owners on`)
//! so the NetInstall build sees real file owners. Writes to read-only images
//! go to a shadow file that is later folded back in with [`convert`].

use crate::nbi::{
    error::{Context, Error, Result},
    platform::run_tool,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const HDIUTIL: &str = "/usr/bin/hdiutil";

/// Target formats for [`convert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// UDRO - read-only image
    ReadOnly,
    /// UDSP - sparse image, shrinks to its contents
    SparseImage,
}

impl ImageFormat {
    /// hdiutil format code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "UDRO",
            Self::SparseImage => "UDSP",
        }
    }

    /// File extension hdiutil gives images of this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::ReadOnly => "dmg",
            Self::SparseImage => "sparseimage",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AttachOutput {
    #[serde(rename = "system-entities", default)]
    system_entities: Vec<SystemEntity>,
}

#[derive(Debug, Deserialize)]
struct SystemEntity {
    #[serde(rename = "mount-point")]
    mount_point: Option<PathBuf>,
}

/// Extracts mount points from `hdiutil attach -plist` output, in order.
pub fn parse_mount_points(output: &[u8]) -> Result<Vec<PathBuf>> {
    let parsed: AttachOutput = plist::from_bytes(output)
        .map_err(Error::from)
        .context("parsing hdiutil attach output")?;

    Ok(parsed
        .system_entities
        .into_iter()
        .filter_map(|entity| entity.mount_point)
        .collect())
}

/// An attached disk image.
///
/// Call [`MountedImage::detach`] when done. Dropping a still-attached image
/// force-detaches it so failed builds do not leave volumes behind.
#[derive(Debug)]
pub struct MountedImage {
    image: PathBuf,
    mount_point: PathBuf,
    shadow: Option<PathBuf>,
    attached: bool,
}

impl MountedImage {
    /// Attaches `image` below `mount_root`, optionally through a shadow file.
    pub async fn attach(image: &Path, mount_root: &Path, shadow: Option<&Path>) -> Result<Self> {
        log::info!("Mounting {}", image.display());

        let mut command = Command::new(HDIUTIL);
        command
            .arg("attach")
            .arg(image)
            .arg("-mountRandom")
            .arg(mount_root)
            .args(["-nobrowse", "-plist", "-owners", "on"]);
        if let Some(shadow) = shadow {
            command.arg("-shadow").arg(shadow);
        }

        let stdout = run_tool(&mut command)
            .await
            .with_context(|| format!("mounting {}", image.display()))?;

        let mount_point = parse_mount_points(&stdout)?
            .into_iter()
            .next()
            .with_context(|| format!("hdiutil reported no mount point for {}", image.display()))?;

        log::debug!("{} mounted at {}", image.display(), mount_point.display());

        Ok(Self {
            image: image.to_path_buf(),
            mount_point,
            shadow: shadow.map(Path::to_path_buf),
            attached: true,
        })
    }

    /// Path of the attached image.
    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Where the image's volume is mounted.
    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Shadow file receiving writes, if attached with one.
    pub fn shadow(&self) -> Option<&Path> {
        self.shadow.as_deref()
    }

    /// Detaches the image, forcing it if a polite detach fails.
    pub async fn detach(mut self) -> Result<()> {
        self.attached = false;
        detach(&self.mount_point).await
    }
}

impl Drop for MountedImage {
    fn drop(&mut self) {
        if self.attached {
            log::warn!(
                "Force-detaching {} from {}",
                self.image.display(),
                self.mount_point.display()
            );
            let _ = std::process::Command::new(HDIUTIL)
                .arg("detach")
                .arg(&self.mount_point)
                .arg("-force")
                .output();
        }
    }
}

/// Detaches the volume at `mount_point`.
///
/// A failed polite detach is retried with `-force`.
pub async fn detach(mount_point: &Path) -> Result<()> {
    log::debug!("Detaching {}", mount_point.display());

    let polite = run_tool(Command::new(HDIUTIL).arg("detach").arg(mount_point)).await;
    if let Err(e) = polite {
        log::warn!("Polite unmount failed: {}", e);
        log::warn!("Attempting to force unmount {}", mount_point.display());

        run_tool(
            Command::new(HDIUTIL)
                .arg("detach")
                .arg(mount_point)
                .arg("-force"),
        )
        .await
        .with_context(|| format!("failed to unmount {}", mount_point.display()))?;
    }

    Ok(())
}

/// Converts `source` into `output`, folding in writes held by `shadow`.
pub async fn convert(
    source: &Path,
    format: ImageFormat,
    shadow: Option<&Path>,
    output: &Path,
) -> Result<()> {
    log::info!(
        "Converting {} to {} at {}",
        source.display(),
        format.as_str(),
        output.display()
    );

    let mut command = Command::new(HDIUTIL);
    command
        .arg("convert")
        .arg(source)
        .args(["-format", format.as_str()]);
    if let Some(shadow) = shadow {
        command.arg("-shadow").arg(shadow);
    }
    command.arg("-o").arg(output);

    run_tool(&mut command)
        .await
        .context("disk image conversion failed")?;
    Ok(())
}

/// Grows `image` to `size` (hdiutil size syntax, e.g. `10G`) through `shadow`.
pub async fn resize(image: &Path, size: &str, shadow: &Path) -> Result<()> {
    log::debug!("Resizing {} to {}", image.display(), size);

    run_tool(
        Command::new(HDIUTIL)
            .args(["resize", "-size", size])
            .arg("-shadow")
            .arg(shadow)
            .arg(image),
    )
    .await
    .with_context(|| format!("resizing {}", image.display()))?;
    Ok(())
}
