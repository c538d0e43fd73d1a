//! Build log sinks
//!
//! The patcher reports progress as human-readable lines. Where those lines go
//! is up to the caller: a CI console, `tracing`, or an in-memory buffer.

use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// 构建日志接收端
pub trait BuildLog: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Plain console output, one line per message
#[derive(Debug, Clone)]
pub struct ConsoleLog {
    stream: ConsoleStream,
    show_info: bool,
}

impl ConsoleLog {
    pub fn new(stream: ConsoleStream) -> Self {
        Self {
            stream,
            show_info: true,
        }
    }

    /// Drop info lines, keep warnings
    pub fn warnings_only(mut self) -> Self {
        self.show_info = false;
        self
    }

    fn emit(&self, message: &str) {
        match self.stream {
            ConsoleStream::Stdout => println!("{message}"),
            ConsoleStream::Stderr => eprintln!("{message}"),
        }
    }
}

impl BuildLog for ConsoleLog {
    fn info(&self, message: &str) {
        if self.show_info {
            self.emit(message);
        }
    }

    fn warn(&self, message: &str) {
        self.emit(message);
    }
}

/// Routes build log lines through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl BuildLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// Collects lines in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<LogLine>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lines().into_iter().map(|l| l.message).collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                level,
                message: message.to_string(),
            });
        }
    }
}

impl BuildLog for MemoryLog {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }
}
