//! Composition planning: which template trees and fragments make up a project
//!
//! Planning is a pure function of [`ProjectOptions`]. The resulting steps are
//! applied strictly in order: later trees overwrite files of earlier ones and
//! later fragments win over earlier ones per dependency key.

use super::schema::{SchemaProvider, SchemaRewrite};
use crate::error::{Error, Result, TemplateKind};
use crate::options::{Auth, Database, Framework, Orm, ProjectOptions};
use crate::templates::manifest::RootManifest;
use std::fmt;
use std::path::{Path, PathBuf};

/// Template rows for one framework
#[derive(Debug, Clone, Copy)]
pub struct FrameworkProfile {
    /// Base trees with the package directory each one lands in ("" = project root)
    pub packages: &'static [(&'static str, &'static str)],
    /// Whether auth overlays and ORM schemas can be layered on top
    pub composable: bool,
}

/// Template rows for one authentication strategy
#[derive(Debug, Clone, Copy)]
pub struct AuthProfile {
    pub overlay_tree: Option<&'static str>,
    pub fragment: Option<&'static str>,
    /// Prisma schema fragment to use with this strategy
    pub prisma_schema: &'static str,
}

pub fn framework_profile(framework: Framework) -> FrameworkProfile {
    match framework {
        Framework::NextJs => FrameworkProfile {
            packages: &[("next-tailwind", "")],
            composable: true,
        },
        Framework::React => FrameworkProfile {
            packages: &[("mern-server", "server"), ("mern-client", "client")],
            composable: false,
        },
        Framework::Remix => FrameworkProfile {
            packages: &[("remix", "")],
            composable: false,
        },
    }
}

pub fn auth_profile(auth: Auth) -> AuthProfile {
    match auth {
        Auth::None => AuthProfile {
            overlay_tree: None,
            fragment: None,
            prisma_schema: "prisma-base",
        },
        Auth::HardCoded => AuthProfile {
            overlay_tree: Some("app-with-hard-coded"),
            fragment: Some("hard-coded"),
            prisma_schema: "prisma-hard-coded",
        },
        Auth::NextAuth => AuthProfile {
            overlay_tree: Some("app-with-auth"),
            fragment: Some("next-auth"),
            prisma_schema: "prisma-next-auth",
        },
        Auth::Lucia => AuthProfile {
            overlay_tree: Some("app-with-lucia"),
            fragment: Some("lucia"),
            prisma_schema: "prisma-lucia",
        },
    }
}

/// One unit of composition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanStep {
    /// Package directory relative to the project root
    pub package: PathBuf,
    pub tree: Option<String>,
    pub fragment: Option<String>,
    pub rewrite: Option<SchemaRewrite>,
}

impl PlanStep {
    fn tree(package: &str, tree: &str) -> Self {
        Self {
            package: PathBuf::from(package),
            tree: Some(tree.to_string()),
            fragment: None,
            rewrite: None,
        }
    }
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(tree) = &self.tree {
            parts.push(format!("tree {}", tree));
        }
        if let Some(fragment) = &self.fragment {
            parts.push(format!("fragment {}", fragment));
        }
        if let Some(rewrite) = &self.rewrite {
            parts.push(format!("provider {}", rewrite.provider));
        }
        if self.package != Path::new("") {
            parts.push(format!("in {}/", self.package.display()));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Non-fatal findings made while planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanWarning {
    /// Prisma was selected without a database; PostgreSQL is used instead
    PrismaWithoutDatabase,
    /// Drizzle has no schema templates; nothing is added for it
    DrizzleNotWired,
    /// A database was selected but no ORM will use it
    DatabaseWithoutOrm(Database),
    /// The framework's templates do not support auth/ORM overlays
    CompositionUnsupported(Framework),
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::PrismaWithoutDatabase => {
                write!(f, "Prisma requires a database; defaulting to PostgreSQL")
            }
            PlanWarning::DrizzleNotWired => write!(
                f,
                "Drizzle schema templates are not available yet; no ORM files were added"
            ),
            PlanWarning::DatabaseWithoutOrm(db) => write!(
                f,
                "{} was selected without an ORM; no schema will be generated",
                db
            ),
            PlanWarning::CompositionUnsupported(framework) => write!(
                f,
                "{} templates do not support authentication or ORM options; they were ignored",
                framework
            ),
        }
    }
}

/// Ordered composition steps for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionPlan {
    pub steps: Vec<PlanStep>,
    /// Package directories in installation order
    pub packages: Vec<PathBuf>,
    /// Database used for schema generation after substitution
    pub effective_database: Database,
    pub warnings: Vec<PlanWarning>,
}

impl CompositionPlan {
    /// Fail before anything is written if the store does not list a template
    /// the plan refers to
    pub fn check_against(&self, root: &RootManifest) -> Result<()> {
        for step in &self.steps {
            if let Some(tree) = step.tree.as_deref().filter(|t| !root.has_tree(t)) {
                return Err(Error::not_found(TemplateKind::Tree, tree));
            }
            if let Some(fragment) = step.fragment.as_deref().filter(|f| !root.has_fragment(f)) {
                return Err(Error::not_found(TemplateKind::Fragment, fragment));
            }
        }
        Ok(())
    }
}

/// Build the composition plan for `options`
pub fn plan(options: &ProjectOptions) -> CompositionPlan {
    let profile = framework_profile(options.framework);
    let mut warnings = Vec::new();

    let mut steps: Vec<PlanStep> = profile
        .packages
        .iter()
        .map(|(tree, package)| PlanStep::tree(package, tree))
        .collect();
    let packages = profile
        .packages
        .iter()
        .map(|(_, package)| PathBuf::from(package))
        .collect();

    if !profile.composable {
        if options.auth != Auth::None || options.orm != Orm::None {
            warnings.push(PlanWarning::CompositionUnsupported(options.framework));
        }
        return CompositionPlan {
            steps,
            packages,
            effective_database: options.database,
            warnings,
        };
    }

    let auth = auth_profile(options.auth);
    if auth.overlay_tree.is_some() || auth.fragment.is_some() {
        steps.push(PlanStep {
            package: PathBuf::new(),
            tree: auth.overlay_tree.map(str::to_string),
            fragment: auth.fragment.map(str::to_string),
            rewrite: None,
        });
    }

    let effective_database = match options.orm {
        Orm::Prisma => {
            let (database, provider) = match SchemaProvider::for_database(options.database) {
                Some(provider) => (options.database, provider),
                None => {
                    warnings.push(PlanWarning::PrismaWithoutDatabase);
                    (Database::PostgreSql, SchemaProvider::PostgreSql)
                }
            };
            steps.push(PlanStep {
                package: PathBuf::new(),
                tree: None,
                fragment: Some(auth.prisma_schema.to_string()),
                rewrite: Some(SchemaRewrite { provider }),
            });
            database
        }
        Orm::Drizzle => {
            warnings.push(PlanWarning::DrizzleNotWired);
            options.database
        }
        Orm::None => {
            if options.database != Database::None {
                warnings.push(PlanWarning::DatabaseWithoutOrm(options.database));
            }
            options.database
        }
    };

    CompositionPlan {
        steps,
        packages,
        effective_database,
        warnings,
    }
}
