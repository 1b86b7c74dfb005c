//! Semantic color helpers for consistent CLI output.
//!
//! Colors are semantic: they convey meaning rather than decoration.

use colored::{ColoredString, Colorize};

/// | Element | Color |
/// |---------|-------|
/// | Success, amounts | Green |
/// | Error | Red |
/// | Warning, addresses | Yellow |
/// | Info, commands | Cyan |
/// | Chain names | Magenta |
pub struct Colors;

impl Colors {
    pub fn success(s: &str) -> ColoredString {
        s.green()
    }

    pub fn error(s: &str) -> ColoredString {
        s.red()
    }

    pub fn warning(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn info(s: &str) -> ColoredString {
        s.cyan()
    }

    pub fn address(s: &str) -> ColoredString {
        s.yellow()
    }

    pub fn amount(s: &str) -> ColoredString {
        s.green()
    }

    pub fn chain(s: &str) -> ColoredString {
        s.magenta()
    }

    pub fn dim(s: &str) -> ColoredString {
        s.dimmed()
    }

    /// `yes` in green or `no` dimmed
    pub fn flag(value: bool) -> ColoredString {
        if value {
            "yes".green()
        } else {
            "no".dimmed()
        }
    }
}
