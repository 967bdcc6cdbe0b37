//! Colored terminal output.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes user-facing status lines, colored when attached to a terminal.
#[derive(Debug, Clone, Default)]
pub struct OutputManager;

impl OutputManager {
    pub fn new() -> Self {
        Self
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(color_choice(io::stdout().is_terminal()))
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(color_choice(io::stderr().is_terminal()))
    }

    fn write_tagged(
        stream: &mut StandardStream,
        tag: &str,
        color: Color,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(stream, "{}", tag)?;
        stream.reset()?;
        writeln!(stream, " {}", message)
    }

    /// Print a dimmed detail line.
    pub fn detail(&self, message: &str) -> io::Result<()> {
        let mut stdout = self.stdout();
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(stdout, "{}", message)?;
        stdout.reset()
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        Self::write_tagged(&mut self.stderr(), "warning:", Color::Yellow, message)
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        Self::write_tagged(&mut self.stdout(), "✓", Color::Green, message)
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        Self::write_tagged(&mut self.stdout(), "→", Color::Cyan, message)
    }

    pub fn section(&self, title: &str) -> io::Result<()> {
        let mut stdout = self.stdout();
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(stdout, "{}", title)?;
        writeln!(stdout, "{}", "-".repeat(title.chars().count()))?;
        stdout.reset()
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        writeln!(self.stdout(), "  {}", message)
    }
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}
