//! Leveled logging to stderr.
use core::{fmt, str::FromStr};

/// Amount of information logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Errors and warnings only.
    Warning,
    /// Session lifecycle and phases.
    Info,
    /// Every message exchanged.
    Debug,
}

impl Verbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::Silent => "silent",
            Verbosity::Warning => "warning",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "silent" | "0" => Ok(Verbosity::Silent),
            "warning" | "1" => Ok(Verbosity::Warning),
            "info" | "2" => Ok(Verbosity::Info),
            "debug" | "3" => Ok(Verbosity::Debug),
            _ => Err(format!("unknown verbosity `{s}`")),
        }
    }
}

/// Writes messages at or below its verbosity, prefixed by a scope such as
/// `session 3`.
#[derive(Debug, Clone)]
pub struct Logger {
    verbosity: Verbosity,
    scope: String,
}

impl Logger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            scope: String::from("server"),
        }
    }

    /// Same verbosity, other scope.
    pub fn scoped(&self, scope: impl Into<String>) -> Self {
        Self {
            verbosity: self.verbosity,
            scope: scope.into(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Verbosity::Warning, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Verbosity::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Verbosity::Debug, args);
    }

    fn log(&self, level: Verbosity, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            eprintln!("[{}] [{}] {}", level, self.scope, args);
        }
    }
}
