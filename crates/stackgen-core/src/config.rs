//! Generator configuration: where templates come from and how to install

use crate::error::Result;
use crate::runtime::install::{PackageManager, DEFAULT_INSTALL_TIMEOUT};
use crate::templates::TemplateSource;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable pointing at a local template directory
pub const TEMPLATE_DIR_ENV: &str = "STACKGEN_TEMPLATE_DIR";

/// Environment variable overriding the remote template URL
pub const TEMPLATE_URL_ENV: &str = "STACKGEN_TEMPLATE_URL";

/// Environment variable selecting the package manager
pub const PACKAGE_MANAGER_ENV: &str = "STACKGEN_PACKAGE_MANAGER";

/// Remote store used when nothing else is configured
pub const DEFAULT_TEMPLATE_URL: &str =
    "https://raw.githubusercontent.com/stackgen-dev/stackgen/main/templates";

/// Templates shipped alongside the workspace
const BUNDLED_TEMPLATE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates");

/// User agent for template downloads
pub const USER_AGENT: &str = concat!("stackgen/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub template_source: TemplateSource,
    pub package_manager: PackageManager,
    pub install_timeout: Duration,
}

impl GeneratorConfig {
    /// Resolve from explicit flags, then the process environment
    pub fn resolve(
        template_dir: Option<PathBuf>,
        package_manager: Option<PackageManager>,
    ) -> Result<Self> {
        Self::resolve_with(template_dir, package_manager, |key| std::env::var(key).ok())
    }

    /// Resolution order for templates: flag, `STACKGEN_TEMPLATE_DIR`,
    /// `STACKGEN_TEMPLATE_URL`, bundled directory, default URL
    pub fn resolve_with(
        template_dir: Option<PathBuf>,
        package_manager: Option<PackageManager>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let bundled = PathBuf::from(BUNDLED_TEMPLATE_DIR);

        let template_source = if let Some(dir) = template_dir {
            TemplateSource::local(dir)
        } else if let Some(dir) = env(TEMPLATE_DIR_ENV) {
            TemplateSource::local(PathBuf::from(dir))
        } else if let Some(url) = env(TEMPLATE_URL_ENV) {
            TemplateSource::remote(&url)?
        } else if bundled.join("template.yaml").is_file() {
            TemplateSource::local(bundled)
        } else {
            TemplateSource::remote(DEFAULT_TEMPLATE_URL)?
        };

        // Unknown names in the environment fall back to npm
        let package_manager = package_manager
            .or_else(|| env(PACKAGE_MANAGER_ENV).and_then(|pm| PackageManager::parse(&pm)))
            .unwrap_or_default();

        Ok(Self {
            template_source,
            package_manager,
            install_timeout: DEFAULT_INSTALL_TIMEOUT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_flag_wins_over_environment() {
        let config = GeneratorConfig::resolve_with(
            Some(PathBuf::from("/srv/templates")),
            Some(PackageManager::Pnpm),
            env_of(&[
                (TEMPLATE_DIR_ENV, "/elsewhere"),
                (PACKAGE_MANAGER_ENV, "yarn"),
            ]),
        )
        .unwrap();
        assert_eq!(
            config.template_source,
            TemplateSource::local(PathBuf::from("/srv/templates"))
        );
        assert_eq!(config.package_manager, PackageManager::Pnpm);
    }

    #[test]
    fn test_environment_url_and_package_manager() {
        let config = GeneratorConfig::resolve_with(
            None,
            None,
            env_of(&[
                (TEMPLATE_URL_ENV, "https://templates.example.com/v1"),
                (PACKAGE_MANAGER_ENV, "bun"),
            ]),
        )
        .unwrap();
        assert!(matches!(config.template_source, TemplateSource::Remote(ref u)
            if u.as_str() == "https://templates.example.com/v1"));
        assert_eq!(config.package_manager, PackageManager::Bun);
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let result =
            GeneratorConfig::resolve_with(None, None, env_of(&[(TEMPLATE_URL_ENV, "not a url")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_package_manager_falls_back_to_npm() {
        let config =
            GeneratorConfig::resolve_with(None, None, env_of(&[(PACKAGE_MANAGER_ENV, "cargo")]))
                .unwrap();
        assert_eq!(config.package_manager, PackageManager::Npm);
    }
}
