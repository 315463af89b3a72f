//! The import diagnostic log.
//!
//! One append-only, leveled, category-tagged stream per import run. The
//! logger is an injected capability rather than module-global state: the
//! orchestrator receives it at call time, so two parallel import calls can
//! write to two independent streams. Ambient `tracing` events fire
//! alongside for host-application observability; this stream is the
//! engine's own durable record of what an import did.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{SecondsFormat, Utc};

/// Diagnostic levels, coarser than `tracing`'s on purpose: the log is read
/// by import operators, not developers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagLevel {
    Error,
    Info,
    /// Emitted only when the logger has verbose output enabled.
    Verbose,
}

impl DiagLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagLevel::Error => "ERROR",
            DiagLevel::Info => "INFO",
            DiagLevel::Verbose => "VERBOSE",
        }
    }
}

/// One diagnostic line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
    pub level: DiagLevel,
    pub category: String,
    pub message: String,
    /// Optional structured payload rendered as text.
    pub data: Option<String>,
}

impl LogEntry {
    fn new(level: DiagLevel, category: &str, message: &str, data: Option<&str>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            level,
            category: category.to_string(),
            message: message.to_string(),
            data: data.map(str::to_string),
        }
    }

    fn render(&self) -> String {
        match &self.data {
            Some(data) => format!(
                "{} {} [{}] {} | {}",
                self.timestamp,
                self.level.as_str(),
                self.category,
                self.message,
                data
            ),
            None => format!(
                "{} {} [{}] {}",
                self.timestamp,
                self.level.as_str(),
                self.category,
                self.message
            ),
        }
    }
}

/// Sink for import diagnostics.
pub trait ImportLogger {
    fn verbose_enabled(&self) -> bool {
        false
    }

    fn log(&mut self, entry: LogEntry);

    fn error(&mut self, category: &str, message: &str, data: Option<&str>) {
        self.log(LogEntry::new(DiagLevel::Error, category, message, data));
    }

    fn info(&mut self, category: &str, message: &str, data: Option<&str>) {
        self.log(LogEntry::new(DiagLevel::Info, category, message, data));
    }

    fn verbose(&mut self, category: &str, message: &str, data: Option<&str>) {
        if self.verbose_enabled() {
            self.log(LogEntry::new(DiagLevel::Verbose, category, message, data));
        }
    }
}

/// File-backed logger, the default for CLI imports.
#[derive(Debug)]
pub struct FileLogger {
    writer: BufWriter<std::fs::File>,
    verbose: bool,
}

impl FileLogger {
    /// Open (or append to) a diagnostic log file.
    pub fn open(path: &Path, verbose: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            verbose,
        })
    }
}

impl ImportLogger for FileLogger {
    fn verbose_enabled(&self) -> bool {
        self.verbose
    }

    fn log(&mut self, entry: LogEntry) {
        // A failed diagnostic write must never fail the import itself.
        let _ = writeln!(self.writer, "{}", entry.render());
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// In-memory logger used by tests and by callers that render diagnostics
/// themselves after the run.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    pub entries: Vec<LogEntry>,
    pub verbose: bool,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self {
            verbose: true,
            ..Self::default()
        }
    }

    pub fn messages_at(&self, level: DiagLevel) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.message.as_str())
            .collect()
    }

    /// Render all entries, one line each, for display after a run.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ImportLogger for MemoryLogger {
    fn verbose_enabled(&self) -> bool {
        self.verbose
    }

    fn log(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_entries_are_gated() {
        let mut quiet = MemoryLogger::new();
        quiet.verbose("populate", "cell skipped", None);
        assert!(quiet.entries.is_empty());

        let mut chatty = MemoryLogger::verbose();
        chatty.verbose("populate", "cell skipped", None);
        assert_eq!(chatty.entries.len(), 1);
    }

    #[test]
    fn rendered_lines_carry_level_category_and_data() {
        let mut logger = MemoryLogger::new();
        logger.error("import", "duplicate key", Some("Bus B1"));
        let line = logger.render();
        assert!(line.contains("ERROR"));
        assert!(line.contains("[import]"));
        assert!(line.ends_with("duplicate key | Bus B1"));
    }

    #[test]
    fn file_logger_appends_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("diag.log");
        {
            let mut logger = FileLogger::open(&path, false).expect("open log");
            logger.info("import", "run started", None);
        }
        {
            let mut logger = FileLogger::open(&path, false).expect("reopen log");
            logger.info("import", "run finished", None);
        }
        let contents = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(contents.lines().count(), 2);
    }
}
