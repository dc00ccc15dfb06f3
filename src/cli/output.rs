//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.
//! Status helpers write into the given stream so commands stay testable;
//! only [`error`] goes straight to the process stderr.

use std::fmt::Display;
use std::io::{self, Write};

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Write warning (yellow "Warning:" prefix)
pub fn warning(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}: {}", "Warning".yellow(), msg)
}

/// Write failure (red "Error:" prefix) without aborting the command
pub fn failure(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}: {}", "Error".red(), msg)
}

/// Write success status (green checkmark)
pub fn success(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{} {}", "✓".green(), msg)
}

/// Write section header (cyan bold)
pub fn header(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}", msg.to_string().cyan().bold())
}

/// Write plain output (no color)
pub fn info(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "{}", msg)
}

/// Write indented detail (no color)
pub fn detail(w: &mut dyn Write, msg: &(impl Display + ?Sized)) -> io::Result<()> {
    writeln!(w, "  {}", msg)
}
