//! AutoNBI - automated Apple NetBoot Image (NBI) builder.
//!
//! Turns an OS X installer source (a folder of installer apps, a single
//! `Install OS X *.app`, or an `InstallESD.dmg`) into a `<name>.nbi` bundle,
//! optionally customizing the NetInstall volume:
//! - overlaying a user-supplied folder
//! - injecting the Python and Ruby frameworks into `BaseSystem.dmg`
//! - marking the image enabled in `NBImageInfo.plist`
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod nbi;
pub mod source;

// Re-export commonly used types
pub use error::{AutoNbiError, CliError, Result};
