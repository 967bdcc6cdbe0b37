//! Wrappers around platform-native imaging tools.
//!
//! NBIs can only be produced on macOS, where `hdiutil`, `xar` and System
//! Image Utility live. The wrappers compile everywhere so that their output
//! parsers stay testable; invoking them elsewhere fails at spawn time.

pub mod macos;

use crate::nbi::error::{Error, Result};
use tokio::process::Command;

/// Runs an external tool to completion and returns its stdout.
///
/// A non-zero exit becomes [`Error::CommandFailed`] carrying the tool's stderr.
pub(crate) async fn run_tool(command: &mut Command) -> Result<Vec<u8>> {
    let display = describe(command.as_std());
    log::debug!("Running {}", display);

    let output = command.output().await.map_err(|e| {
        Error::GenericError(format!("Failed to execute {}: {}", display, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CommandFailed {
            command: display,
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Renders a command line for log and error messages.
fn describe(command: &std::process::Command) -> String {
    std::iter::once(command.get_program())
        .chain(command.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_joins_program_and_args() {
        let mut command = std::process::Command::new("/usr/bin/hdiutil");
        command.args(["detach", "/tmp/dmg.x1", "-force"]);
        assert_eq!(describe(&command), "/usr/bin/hdiutil detach /tmp/dmg.x1 -force");
    }

    #[tokio::test]
    async fn failing_tool_reports_command_failed() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo nope >&2; exit 3"]);

        match run_tool(&mut command).await {
            Err(Error::CommandFailed { command, stderr }) => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn successful_tool_returns_stdout() {
        let mut command = Command::new("sh");
        command.args(["-c", "printf mounted"]);
        assert_eq!(run_tool(&mut command).await.unwrap(), b"mounted");
    }
}
