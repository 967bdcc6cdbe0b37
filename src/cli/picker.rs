//! Interactive installer selection.

use crate::error::{CliError, Result};
use crate::source::InstallerCandidate;
use inquire::Select;
use std::io::IsTerminal;

/// Labels shown for `candidates`, numbered from 1.
fn labels(candidates: &[InstallerCandidate]) -> Vec<String> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| format!("{}: {}", i + 1, candidate.display_name()))
        .collect()
}

/// Asks which of several installers to build from.
///
/// The answer is read from standard input, which must be a terminal.
pub fn pick_installer(candidates: Vec<InstallerCandidate>) -> Result<InstallerCandidate> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::SelectionCancelled {
            reason: "standard input is not a terminal, use --auto with a single installer"
                .to_string(),
        }
        .into());
    }

    let Some(choice) = Select::new("Choose an installer to build from", labels(&candidates))
        .with_starting_cursor(0)
        .with_page_size(10)
        .without_filtering()
        .with_help_message("↑↓ to move, ENTER to select, ESC to cancel")
        .raw_prompt_skippable()?
    else {
        return Err(CliError::SelectionCancelled {
            reason: "no installer selected".to_string(),
        }
        .into());
    };

    candidates
        .into_iter()
        .nth(choice.index)
        .ok_or_else(|| {
            CliError::SelectionCancelled {
                reason: format!("index {} out of range", choice.index),
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn labels_are_numbered_app_names() {
        let candidates = [
            "/Applications/Install OS X Mavericks.app",
            "/Applications/Install OS X Yosemite.app",
        ]
        .map(|app| InstallerCandidate {
            app: PathBuf::from(app),
            install_esd: PathBuf::from(app).join("Contents/SharedSupport/InstallESD.dmg"),
        });

        assert_eq!(
            labels(&candidates),
            ["1: Install OS X Mavericks.app", "2: Install OS X Yosemite.app"]
        );
    }
}
