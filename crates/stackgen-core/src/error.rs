//! Error taxonomy for option validation, template resolution and materialization

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the core library
pub type Result<T> = std::result::Result<T, Error>;

/// Which kind of template reference failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Tree,
    Fragment,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKind::Tree => write!(f, "tree"),
            TemplateKind::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A closed-set option received a value outside its enumeration
    #[error("invalid {field} '{value}' (expected one of: {expected})")]
    InvalidOption {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: &'static str },

    /// The plan and the template store disagree about what exists
    #[error("template {kind} '{id}' not found")]
    TemplateNotFound { kind: TemplateKind, id: String },

    #[error("template '{id}' is malformed: {message}")]
    Template { id: String, message: String },

    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("failed to {action} manifest {}", .path.display())]
    ManifestIo {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("schema fragment '{id}': {message}")]
    Schema { id: String, message: String },

    /// A plan step failed; steps before it stay on disk
    #[error("setup failed at step {} ({description})", .step + 1)]
    Setup {
        step: usize,
        description: String,
        #[source]
        source: Box<Error>,
    },

    #[error("dependency installation failed in {}: {message}", .package.display())]
    Install { package: PathBuf, message: String },

    #[error("{action} {}", .path.display())]
    Io {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            action,
            source,
        }
    }

    pub(crate) fn not_found(kind: TemplateKind, id: impl Into<String>) -> Self {
        Error::TemplateNotFound {
            kind,
            id: id.into(),
        }
    }

    /// The innermost error, looking through `Setup` wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Setup { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_reports_one_based_step() {
        let err = Error::Setup {
            step: 1,
            description: "overlay app-with-auth".to_string(),
            source: Box::new(Error::not_found(TemplateKind::Tree, "app-with-auth")),
        };
        assert_eq!(
            err.to_string(),
            "setup failed at step 2 (overlay app-with-auth)"
        );
        assert!(matches!(
            err.root_cause(),
            Error::TemplateNotFound {
                kind: TemplateKind::Tree,
                ..
            }
        ));
    }
}
