//! Runtime detection for Node.js and the package manager

use super::install::PackageManager;
use anyhow::Result;
use std::process::Command;

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Run `<binary> --version` and report what was found
fn probe(name: &'static str, binary: &str) -> RuntimeInfo {
    let output = Command::new(binary).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("Node.js", "node")
}

/// Check if the given package manager is available
pub fn check_package_manager(manager: PackageManager) -> RuntimeInfo {
    let name = match manager {
        PackageManager::Npm => "npm",
        PackageManager::Pnpm => "pnpm",
        PackageManager::Yarn => "Yarn",
        PackageManager::Bun => "Bun",
    };
    probe(name, manager.binary())
}

/// Check everything needed to install dependencies with `manager`.
///
/// Bun ships its own runtime, every other manager needs Node.js.
pub fn check_install_runtimes(manager: PackageManager) -> Result<Vec<RuntimeInfo>> {
    let mut runtimes = Vec::new();
    if manager != PackageManager::Bun {
        runtimes.push(check_node());
    }
    runtimes.push(check_package_manager(manager));

    let missing: Vec<_> = runtimes.iter().filter(|r| !r.available).collect();
    if !missing.is_empty() {
        anyhow::bail!("{}", missing_message(&missing));
    }

    Ok(runtimes)
}

fn missing_message(missing: &[&RuntimeInfo]) -> String {
    format!(
        "Missing required runtimes:\n{}",
        missing
            .iter()
            .map(|r| format!("  - {}", r.name))
            .collect::<Vec<_>>()
            .join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_unknown_binary_is_unavailable() {
        let info = probe("Nothing", "stackgen-no-such-binary");
        assert!(!info.available);
        assert!(info.version.is_none());
    }

    #[test]
    fn test_missing_message_lists_names() {
        let node = RuntimeInfo {
            name: "Node.js",
            version: None,
            available: false,
        };
        let npm = RuntimeInfo {
            name: "npm",
            version: None,
            available: false,
        };
        assert_eq!(
            missing_message(&[&node, &npm]),
            "Missing required runtimes:\n  - Node.js\n  - npm"
        );
    }
}
