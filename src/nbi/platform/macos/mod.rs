//! macOS imaging tools.
//!
//! - [`hdiutil`] - attach, detach, convert and resize disk images
//! - [`netinstall`] - System Image Utility's `createNetInstall.sh`
//! - [`system_version`] - OS version of a mounted installer

pub mod hdiutil;
pub mod netinstall;
pub mod system_version;

pub use hdiutil::{ImageFormat, MountedImage};
pub use system_version::OsVersion;
