//! Configuration structures for NBI builds.
//!
//! [`Settings`] is constructed through [`SettingsBuilder`], which validates
//! required fields and resolves the overlay folder against the build root.

mod builder;
mod core;
mod framework;

pub use builder::SettingsBuilder;
pub use core::{DEFAULT_NETINSTALL_SIZE_MB, Settings};
pub use framework::Framework;
