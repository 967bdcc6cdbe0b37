//! Command line argument parsing and validation.

use crate::nbi::settings::DEFAULT_NETINSTALL_SIZE_MB;
use clap::Parser;
use std::path::PathBuf;

/// Automated NetBoot Image builder
#[derive(Parser, Debug)]
#[command(
    name = "autonbi",
    version,
    about = "Builds Apple NetBoot Image (NBI) bundles from OS X installers",
    long_about = "Builds a NetInstall NBI from an OS X installer app, an InstallESD.dmg, or a folder
holding installer apps, using the System Image Utility scripts of the host.

Must be run as root.

Usage:
  sudo autonbi -s /Applications -d ~/BuildRoot -n Mavericks
  sudo autonbi -s ~/InstallESD.dmg -d ~/BuildRoot -n Mavericks -f Packages -a
  sudo autonbi -s /Applications -d ~/BuildRoot -n Yosemite -p -r -e

Exit code 0 = <destination>/<name>.nbi exists."
)]
pub struct Args {
    /// Path to a folder, installer app, or DMG containing the installer source
    #[arg(short = 's', long, value_name = "PATH")]
    pub source: PathBuf,

    /// Build root where the NBI is created
    #[arg(short = 'd', long, value_name = "PATH")]
    pub destination: PathBuf,

    /// NBI bundle name, without the .nbi extension
    #[arg(short = 'n', long, value_name = "NAME")]
    pub name: String,

    /// Folder to copy onto the NetInstall volume, replacing the folder of
    /// the same name
    ///
    /// An existing directory is used as given; otherwise the name is looked
    /// up inside the destination.
    #[arg(short = 'f', long, value_name = "FOLDER")]
    pub folder: Option<PathBuf>,

    /// Run without prompting; fails if the source holds several installers
    #[arg(short = 'a', long)]
    pub auto: bool,

    /// Mark the NBI enabled in NBImageInfo.plist
    #[arg(short = 'e', long)]
    pub enable_nbi: bool,

    /// Add the Python framework to BaseSystem.dmg
    #[arg(short = 'p', long)]
    pub add_python: bool,

    /// Add the Ruby framework to BaseSystem.dmg
    #[arg(short = 'r', long)]
    pub add_ruby: bool,

    /// System Image Utility resources directory (detected from the host OS
    /// version by default)
    #[arg(long, env = "AUTONBI_SIU_RESOURCES", value_name = "PATH")]
    pub siu_resources: Option<PathBuf>,

    /// Size of the NetInstall image in megabytes
    #[arg(
        long,
        env = "AUTONBI_NETINSTALL_SIZE",
        value_name = "MB",
        default_value_t = DEFAULT_NETINSTALL_SIZE_MB
    )]
    pub netinstall_size: u32,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.source.as_os_str().is_empty() {
            return Err("Source cannot be empty".to_string());
        }
        if self.destination.as_os_str().is_empty() {
            return Err("Destination cannot be empty".to_string());
        }
        if self.name.is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if self.name.contains('/') {
            return Err(format!("Name must not contain '/': {}", self.name));
        }
        if self.netinstall_size == 0 {
            return Err("NetInstall size must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,

    /// Never prompt
    auto: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(),
            auto: args.auto,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Whether prompts are disabled
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Print success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
