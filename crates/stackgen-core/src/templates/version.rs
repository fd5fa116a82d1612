//! Version comparison for CLI and template store compatibility

use semver::Version;

/// Upgrade command shown in version warnings
pub const UPGRADE_COMMAND: &str = "cargo install stackgen --force";

/// Compare CLI version against the template store version
/// Returns a warning message if the CLI is older than the templates expect
pub fn check_compatibility(cli_version: &str, template_version: &str) -> Option<String> {
    // Unparseable versions can't be compared, so no warning
    let cli_ver = parse_version(cli_version)?;
    let template_ver = parse_version(template_version)?;

    if cli_ver < template_ver {
        Some(format!(
            "Templates were published for stackgen {} or newer, you are running {}. Consider updating: {}",
            template_version, cli_version, UPGRADE_COMMAND
        ))
    } else {
        None
    }
}

/// Parse version string, tolerating a leading 'v'
fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_templates() {
        let warning = check_compatibility("0.1.0", "0.2.0");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_or_newer() {
        assert!(check_compatibility("0.1.0", "0.1.0").is_none());
        assert!(check_compatibility("0.2.0", "v0.1.0").is_none());
    }

    #[test]
    fn test_invalid_versions() {
        assert!(check_compatibility("invalid", "0.1.0").is_none());
        assert!(check_compatibility("0.1.0", "latest").is_none());
    }
}
