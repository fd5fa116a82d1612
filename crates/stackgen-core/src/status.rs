//! Progress and warning reporting
//!
//! The core reports what it is doing through a [`StatusSink`] and never
//! depends on what the sink does with it.

use colored::Colorize;

pub trait StatusSink {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);

    /// Called before each plan step is applied (`index` is 1-based)
    fn step(&self, index: usize, total: usize, description: &str) {
        self.info(&format!("[{}/{}] {}", index, total, description));
    }
}

/// Plain colored output on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn info(&self, message: &str) {
        eprintln!("{} {}", "info".blue(), message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow(), message);
    }

    fn success(&self, message: &str) {
        eprintln!("{} {}", "done".green(), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use super::StatusSink;
    use std::sync::Mutex;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Level {
        Info,
        Warning,
        Success,
        Error,
    }

    /// Sink that keeps every message for assertions
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        messages: Mutex<Vec<(Level, String)>>,
    }

    impl RecordingSink {
        pub fn messages(&self, level: Level) -> Vec<String> {
            self.messages
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, m)| m.clone())
                .collect()
        }

        fn push(&self, level: Level, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        }
    }

    impl StatusSink for RecordingSink {
        fn info(&self, message: &str) {
            self.push(Level::Info, message);
        }

        fn warning(&self, message: &str) {
            self.push(Level::Warning, message);
        }

        fn success(&self, message: &str) {
            self.push(Level::Success, message);
        }

        fn error(&self, message: &str) {
            self.push(Level::Error, message);
        }
    }
}
