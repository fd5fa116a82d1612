//! Dependency installation through an external package manager
//!
//! The generator only needs a success/failure signal per package; output of
//! the package manager is streamed to the terminal as it arrives.

use crate::error::{Error, Result};
use colored::Colorize;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Default timeout for one package installation (5 minutes)
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(300);

/// Supported JavaScript package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum PackageManager {
    #[default]
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    /// Command a user can run by hand in the package directory
    pub fn install_command(&self) -> String {
        format!("{} install", self.binary())
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "npm" => Some(PackageManager::Npm),
            "pnpm" => Some(PackageManager::Pnpm),
            "yarn" => Some(PackageManager::Yarn),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Installs the dependencies of one package directory
#[allow(async_fn_in_trait)]
pub trait PackageInstaller {
    async fn install(&self, package_dir: &Path) -> Result<()>;
}

/// Runs `<package manager> install` as a child process
#[derive(Debug, Clone)]
pub struct CommandInstaller {
    manager: PackageManager,
    timeout: Duration,
}

impl CommandInstaller {
    pub fn new(manager: PackageManager, timeout: Duration) -> Self {
        Self { manager, timeout }
    }
}

impl PackageInstaller for CommandInstaller {
    async fn install(&self, package_dir: &Path) -> Result<()> {
        let cmd = self.manager.install_command();
        let fail = |message: String| Error::Install {
            package: package_dir.to_path_buf(),
            message,
        };

        println!();
        println!(
            "{} {} {}",
            "Running:".dimmed(),
            cmd.yellow(),
            format!("(in {})", package_dir.display()).dimmed()
        );
        println!();

        let mut child = TokioCommand::new(self.manager.binary())
            .arg("install")
            .current_dir(package_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("could not start {}: {}", self.manager.binary(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| fail("failed to capture stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| fail("failed to capture stderr".to_string()))?;

        let mut stdout_reader = BufReader::new(stdout).lines();
        let mut stderr_reader = BufReader::new(stderr).lines();

        // Stream output until both pipes close
        let output_task = async {
            let mut stdout_open = true;
            let mut stderr_open = true;
            while stdout_open || stderr_open {
                tokio::select! {
                    line = stdout_reader.next_line(), if stdout_open => {
                        match line {
                            Ok(Some(line)) => println!("  {}", line),
                            Ok(None) => stdout_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stdout:".red(), e);
                                stdout_open = false;
                            }
                        }
                    }
                    line = stderr_reader.next_line(), if stderr_open => {
                        match line {
                            Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                            Ok(None) => stderr_open = false,
                            Err(e) => {
                                eprintln!("{} {}", "Error reading stderr:".red(), e);
                                stderr_open = false;
                            }
                        }
                    }
                }
            }
        };

        if timeout(self.timeout, output_task).await.is_err() {
            let _ = child.kill().await;
            return Err(fail(format!(
                "timed out after {} seconds",
                self.timeout.as_secs()
            )));
        }

        match timeout(Duration::from_secs(10), child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(fail(format!(
                "{} exited with code {}",
                cmd,
                status.code().unwrap_or(-1)
            ))),
            Ok(Err(e)) => Err(fail(format!("failed to wait for {}: {}", cmd, e))),
            Err(_) => {
                let _ = child.kill().await;
                Err(fail(format!("{} hung after closing its output", cmd)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_package_manager() {
        assert_eq!(PackageManager::parse("PNPM"), Some(PackageManager::Pnpm));
        assert_eq!(PackageManager::parse(" bun "), Some(PackageManager::Bun));
        assert_eq!(PackageManager::parse("cargo"), None);
        assert_eq!(PackageManager::default(), PackageManager::Npm);
    }

    #[test]
    fn test_install_command() {
        assert_eq!(PackageManager::Yarn.install_command(), "yarn install");
    }

    #[tokio::test]
    async fn test_missing_directory_is_install_error() {
        let installer = CommandInstaller::new(PackageManager::Npm, Duration::from_secs(5));
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = installer.install(&missing).await.unwrap_err();
        assert!(matches!(err, Error::Install { ref package, .. } if package == &missing));
    }
}
