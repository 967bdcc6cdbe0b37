//! NetBoot Image construction.
//!
//! This module holds everything needed to turn a mounted OS X installer into
//! an NBI bundle:
//!
//! - [`settings`] - validated build configuration
//! - [`builder`] - the [`NbiBuilder`] orchestrator
//! - [`image_info`] - `NBImageInfo.plist` generation
//! - [`modify`] - NetInstall volume customization (overlay folder, frameworks)
//! - [`payload`] - installer package payload decoding (pbzx, xz, gzip, cpio)
//! - [`platform`] - wrappers around macOS tools (`hdiutil`, `createNetInstall.sh`)
//! - [`utils`] - filesystem helpers

pub mod builder;
pub mod error;
pub mod image_info;
pub mod modify;
pub mod payload;
pub mod platform;
pub mod settings;
pub mod utils;

pub use builder::{BuiltNbi, NbiBuilder};
pub use error::{Error, Result};
pub use settings::{Framework, Settings, SettingsBuilder};
