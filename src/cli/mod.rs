//! Command line interface for AutoNBI.
//!
//! Parses arguments, checks privileges, resolves the installer source and
//! hands a validated [`Settings`](crate::nbi::Settings) to the builder.

mod args;
mod output;
mod picker;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::error::{CliError, Result};
use crate::nbi::{Framework, NbiBuilder, Settings, SettingsBuilder};
use crate::source::{self, InstallerCandidate, Resolution};
use clap::CommandFactory;
use std::path::Path;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = RuntimeConfig::from(&args);
    ensure_root()?;

    let candidate = select_installer(&args.source, &config)?;
    config.progress(&format!(
        "Building from {}",
        candidate.install_esd.display()
    ))?;

    let settings = settings_from(&args, &candidate)?;
    config.section(&format!("Creating {}.nbi", settings.bundle_name()))?;
    if let Some(folder) = settings.overlay_folder() {
        config.indent(&format!("Overlay folder: {}", folder.display()))?;
    }
    for framework in settings.frameworks() {
        config.indent(&format!("Adding framework: {}", framework))?;
    }

    let built = NbiBuilder::new(settings).build().await?;

    config.success(&format!("Created {}", built.bundle_path.display()))?;
    config.indent(&built.description)?;
    config
        .output()
        .detail(&format!("NetInstall image: {}", built.netinstall_image.display()))?;

    Ok(0)
}

#[cfg(unix)]
fn is_root() -> bool {
    users::get_effective_uid() == 0
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

/// Refuses to continue without root, printing usage first.
fn ensure_root() -> Result<()> {
    if is_root() {
        return Ok(());
    }
    Args::command().print_help()?;
    Err(CliError::NotRoot.into())
}

/// Resolves `source` to one installer, prompting unless in automatic mode.
fn select_installer(source: &Path, config: &RuntimeConfig) -> Result<InstallerCandidate> {
    match source::resolve(source)? {
        Resolution::Single(candidate) => Ok(candidate),
        resolution @ Resolution::Multiple(_) if config.is_auto() => {
            config.warn("multiple installers found, refusing to pick one in automatic mode")?;
            Ok(resolution.require_single(source)?)
        }
        Resolution::Multiple(candidates) => {
            config.section(&format!("Found {} installers", candidates.len()))?;
            picker::pick_installer(candidates)
        }
    }
}

fn settings_from(args: &Args, candidate: &InstallerCandidate) -> Result<Settings> {
    let mut builder = SettingsBuilder::new()
        .name(&args.name)
        .destination(&args.destination)
        .install_source(&candidate.install_esd)
        .enabled(args.enable_nbi)
        .netinstall_size_mb(args.netinstall_size);

    if let Some(folder) = &args.folder {
        builder = builder.overlay_folder(folder);
    }
    if args.add_python {
        builder = builder.framework(Framework::Python);
    }
    if args.add_ruby {
        builder = builder.framework(Framework::Ruby);
    }
    if let Some(resources) = &args.siu_resources {
        builder = builder.siu_resources(resources);
    }

    Ok(builder.build()?)
}
