//! Project composition: planning, manifest merging and materialization
//!
//! Data flows one way: `ProjectOptions` -> [`planner::plan`] ->
//! [`materializer::Materializer::run`], which pulls trees and fragments from a
//! template store and folds fragments into `package.json` via [`package::merge`].

pub mod materializer;
pub mod package;
pub mod planner;
pub mod schema;

pub use materializer::{InstallOutcome, InstallStatus, MaterializeReport, Materializer};
pub use package::{merge, PackageManifest};
pub use planner::{plan, CompositionPlan, PlanStep, PlanWarning};
pub use schema::{rewrite_provider, SchemaProvider, SchemaRewrite};
