//! Diagnostics sink shared by every stage of a conversion run.

use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Normal progress.
    Info,
    /// Something was defaulted or skipped on purpose.
    Notice,
    /// A stage degraded to an empty contribution.
    Warning,
    /// A record or file could not be processed.
    Failure,
}

impl Severity {
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Info => "[*]",
            Severity::Notice => "[?]",
            Severity::Warning | Severity::Failure => "[!]",
        }
    }
}

pub trait Reporter {
    fn emit(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.emit(Severity::Info, message);
    }

    fn notice(&self, message: &str) {
        self.emit(Severity::Notice, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Severity::Warning, message);
    }

    fn fail(&self, message: &str) {
        self.emit(Severity::Failure, message);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Stream {
    #[default]
    Stdout,
    Stderr,
}

/// Prints to the terminal and mirrors every event into `tracing` at debug level.
///
/// Progress goes to stdout unless built with [`ConsoleReporter::stderr`];
/// warnings and failures always go to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter {
    progress: Stream,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self::default()
    }

    /// For commands whose stdout carries data.
    pub fn stderr() -> Self {
        Self {
            progress: Stream::Stderr,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn emit(&self, severity: Severity, message: &str) {
        tracing::debug!(?severity, "{message}");

        let to_stderr = matches!(severity, Severity::Warning | Severity::Failure)
            || self.progress == Stream::Stderr;
        if to_stderr {
            eprintln!("{} {}", severity.prefix(), message);
        } else {
            println!("{} {}", severity.prefix(), message);
        }
    }
}

/// Keeps every event in memory instead of printing it.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: RefCell<Vec<(Severity, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Severity, String)> {
        self.events.borrow().clone()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events.borrow().iter().any(|(_, m)| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn emit(&self, severity: Severity, message: &str) {
        self.events.borrow_mut().push((severity, message.to_string()));
    }
}
