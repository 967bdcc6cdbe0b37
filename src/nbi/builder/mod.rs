//! NBI build orchestration.
//!
//! [`NbiBuilder`] takes validated [`Settings`](crate::nbi::Settings) and
//! produces `<destination>/<name>.nbi`:
//!
//! 1. attach the installer image and read its OS version
//! 2. run Apple's `createNetInstall.sh` against it
//! 3. write `NBImageInfo.plist`
//! 4. apply overlay folder and frameworks, if requested
//!
//! # Example
//!
//! ```no_run
//! use autonbi::nbi::{NbiBuilder, SettingsBuilder};
//!
//! # async fn example() -> autonbi::nbi::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .name("Mavericks")
//!     .destination("/Users/admin/BuildRoot")
//!     .install_source("/Users/admin/InstallESD.dmg")
//!     .enabled(true)
//!     .build()?;
//!
//! let built = NbiBuilder::new(settings).build().await?;
//! println!("Created {}", built.bundle_path.display());
//! # Ok(())
//! # }
//! ```

mod orchestrator;
pub(crate) mod tool_detection;

pub use orchestrator::NbiBuilder;

use std::path::PathBuf;

/// A finished NBI bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltNbi {
    /// The `.nbi` bundle directory
    pub bundle_path: PathBuf,
    /// NetInstall image inside the bundle
    pub netinstall_image: PathBuf,
    /// Description written to NBImageInfo.plist, e.g. `OS X 10.9.5-13F34`
    pub description: String,
    /// Whether the NetInstall image was modified after creation
    pub modified: bool,
}
