//! Status sink rendering through cliclack's log lines

use crate::status::StatusSink;

/// Forwards core status messages to cliclack
///
/// Terminal write errors are ignored; status output never fails a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliclackSink;

impl StatusSink for CliclackSink {
    fn info(&self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn warning(&self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn success(&self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn error(&self, message: &str) {
        let _ = cliclack::log::error(message);
    }

    fn step(&self, index: usize, total: usize, description: &str) {
        let _ = cliclack::log::step(format!("[{}/{}] {}", index, total, description));
    }
}
