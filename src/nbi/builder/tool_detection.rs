//! External tool detection.
//!
//! `hdiutil` and the System Image Utility scripts are found at fixed paths;
//! `xar` is looked up on PATH once and cached.

use std::path::PathBuf;
use std::sync::LazyLock;

/// Location of `xar`, needed to pull `Payload` out of installer packages.
pub static XAR: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("xar") {
    Ok(path) => {
        log::debug!("Found xar at: {}", path.display());
        Some(path)
    }
    Err(e) => {
        log::debug!("xar not found in PATH: {}", e);
        None
    }
});
