//! Stackgen Core - template composition for full-stack project scaffolding
//!
//! Given a validated set of project options, this library decides which
//! template trees and dependency fragments to layer onto a base scaffold, in
//! what order, and merges their dependency declarations into one consistent
//! `package.json` per package.
//!
//! # Architecture
//!
//! - **Options** - closed-set option model and validation
//! - **Templates** - the `TemplateStore` seam (local directory, remote zips, in-memory)
//! - **Project** - composition planner, manifest merger, schema rewrite, materializer
//! - **Runtime** - package manager detection and dependency installation
//! - **TUI** - optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use stackgen_core::{plan, Materializer, ProjectOptions, RawOptions};
//!
//! let options = ProjectOptions::from_raw(&raw, &cwd)?;
//! let plan = plan(&options);
//! let report = Materializer::new(&store, &installer, &ConsoleSink)
//!     .run(&plan, &options, &dest)
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod options;
pub mod project;
pub mod runtime;
pub mod status;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use options::{
    Auth, Choice, Database, Framework, FrontendLanguage, Orm, ProjectName, ProjectOptions,
    RawOptions,
};
pub use project::{plan, CompositionPlan, MaterializeReport, Materializer, PackageManifest};
pub use runtime::{CommandInstaller, PackageInstaller, PackageManager};
pub use status::{ConsoleSink, StatusSink};
pub use templates::{MemoryStore, TemplateFetcher, TemplateSource, TemplateStore};

#[cfg(feature = "tui")]
pub use tui::run;
