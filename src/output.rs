//! Terminal output formatting for the litsprite CLI.
//!
//! Provides Cargo-style status output with right-aligned coloured verbs.
//! All status output goes to stderr; stdout is reserved for machine-readable
//! output such as shell completions. Library code reports through the `log`
//! facade, and [`init_logging`] installs an `env_logger` that prints those
//! records in the same verb column.

use std::io::{self, IsTerminal, Write};

use log::{Level, LevelFilter, Record};

/// ANSI escape codes.
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width for right-aligned verb column.
const VERB_WIDTH: usize = 12;

/// Terminal-aware status printer.
///
/// Prints Cargo-style status lines to stderr with optional ANSI colours.
/// Colour is enabled when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }

    /// Printer that never emits escape codes.
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Print a status line with a green bold verb.
    /// e.g. "  Generating hero (4 frames)"
    pub fn status(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print a success/completion line with a green bold verb.
    pub fn success(&self, verb: &str, message: &str) {
        self.print_line(GREEN, verb, message);
    }

    /// Print an informational line with a cyan bold verb.
    pub fn info(&self, verb: &str, message: &str) {
        self.print_line(CYAN, verb, message);
    }

    /// Print a warning line with a yellow bold verb.
    pub fn warning(&self, verb: &str, message: &str) {
        self.print_line(YELLOW, verb, message);
    }

    /// Print an error line with a red bold verb.
    pub fn error(&self, verb: &str, message: &str) {
        self.print_line(RED, verb, message);
    }

    /// Format a string as dim/grey.
    pub fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Format a string as bold.
    pub fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Format a string as cyan (for paths, info).
    pub fn cyan(&self, text: &str) -> String {
        if self.color {
            format!("{CYAN}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn print_line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.format_line(color, verb, message));
    }

    fn format_line(&self, color: &str, verb: &str, message: &str) -> String {
        if self.color {
            format!("{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}")
        } else {
            format!("{verb:>VERB_WIDTH$} {message}")
        }
    }
}

/// Verb and colour for a log level.
fn level_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::Error => ("error", RED),
        Level::Warn => ("warning", YELLOW),
        Level::Info => ("info", CYAN),
        Level::Debug => ("debug", DIM),
        Level::Trace => ("trace", DIM),
    }
}

/// A log record as a status line.
fn log_line(color: bool, record: &Record) -> String {
    let (verb, style) = level_style(record.level());
    Printer { color }.format_line(style, verb, &record.args().to_string())
}

/// Map a `-v` count to a level. Warnings always show.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger for litsprite's own records.
///
/// `RUST_LOG` directives are applied on top of the `-v` level. Only the
/// first call installs a logger.
pub fn init_logging(verbose: u8) {
    let color = io::stderr().is_terminal();
    let _ = env_logger::Builder::new()
        .filter_module("litsprite", level_for_verbosity(verbose))
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format(move |buf, record| writeln!(buf, "{}", log_line(color, record)))
        .try_init();
}

/// Pluralize a count: `plural(1, "map", "maps")` → "1 map".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &std::path::Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_singular() {
        assert_eq!(plural(1, "map", "maps"), "1 map");
    }

    #[test]
    fn test_plural_zero() {
        assert_eq!(plural(0, "map", "maps"), "0 maps");
    }

    #[test]
    fn test_plural_many() {
        assert_eq!(plural(5, "frame", "frames"), "5 frames");
    }

    #[test]
    fn test_display_path_absolute() {
        use std::path::Path;
        // An absolute path outside cwd should stay absolute
        let p = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(p), "/nonexistent/path/to/file");
    }

    #[test]
    fn test_plain_line_is_right_aligned() {
        let line = Printer::plain().format_line(GREEN, "Wrote", "hero_n.png");
        assert_eq!(line, "       Wrote hero_n.png");
    }

    #[test]
    fn test_plain_styles_are_unchanged() {
        let printer = Printer::plain();
        assert_eq!(printer.bold("x"), "x");
        assert_eq!(printer.dim("x"), "x");
        assert_eq!(printer.cyan("x"), "x");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(1), LevelFilter::Info);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn test_level_style() {
        assert_eq!(level_style(Level::Warn).0, "warning");
        assert_eq!(level_style(Level::Error).1, RED);
    }

    #[test]
    fn test_log_records_use_the_verb_column() {
        let line = log_line(
            false,
            &Record::builder()
                .args(format_args!("hero.png has no opaque pixels"))
                .level(Level::Warn)
                .target("litsprite::generate")
                .build(),
        );
        assert_eq!(line, "     warning hero.png has no opaque pixels");
    }

    #[test]
    fn test_init_logging_twice_is_harmless() {
        init_logging(0);
        init_logging(3);
        assert!(log::max_level() >= LevelFilter::Warn);
    }
}
