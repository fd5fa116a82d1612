//! Project option model and validation
//!
//! Every choice the user makes is a closed enumeration. Raw strings from flags
//! or prompts are parsed once into [`ProjectOptions`]; after that the rest of
//! the crate only ever matches on the enums.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// A closed set of user-selectable values
pub trait Choice: Copy + Eq + fmt::Display + 'static {
    /// Option name used in error messages and prompts
    const FIELD: &'static str;

    /// Every variant, in prompt order
    const ALL: &'static [Self];

    fn display_name(&self) -> &'static str;

    /// Extra spellings accepted on the command line (lowercase)
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Parse a value case-insensitively from its display name or an alias
    fn parse(value: &str) -> Result<Self> {
        let wanted = value.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|choice| {
                choice.display_name().to_lowercase() == wanted
                    || choice.aliases().contains(&wanted.as_str())
            })
            .ok_or_else(|| Error::InvalidOption {
                field: Self::FIELD,
                value: value.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|c| c.display_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

macro_rules! display_via_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.display_name())
            }
        })*
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Framework {
    /// MERN stack: Express server plus a React client
    React,
    NextJs,
    Remix,
}

impl Choice for Framework {
    const FIELD: &'static str = "frontend framework";
    const ALL: &'static [Self] = &[Framework::React, Framework::NextJs, Framework::Remix];

    fn display_name(&self) -> &'static str {
        match self {
            Framework::React => "React",
            Framework::NextJs => "Next.js",
            Framework::Remix => "Remix",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Framework::React => &["mern"],
            Framework::NextJs => &["next", "nextjs"],
            Framework::Remix => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrontendLanguage {
    JavaScript,
    TypeScript,
}

impl Choice for FrontendLanguage {
    const FIELD: &'static str = "frontend language";
    const ALL: &'static [Self] = &[FrontendLanguage::JavaScript, FrontendLanguage::TypeScript];

    fn display_name(&self) -> &'static str {
        match self {
            FrontendLanguage::JavaScript => "JavaScript",
            FrontendLanguage::TypeScript => "TypeScript",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            FrontendLanguage::JavaScript => &["js"],
            FrontendLanguage::TypeScript => &["ts"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orm {
    None,
    Prisma,
    Drizzle,
}

impl Choice for Orm {
    const FIELD: &'static str = "ORM";
    const ALL: &'static [Self] = &[Orm::None, Orm::Prisma, Orm::Drizzle];

    fn display_name(&self) -> &'static str {
        match self {
            Orm::None => "None",
            Orm::Prisma => "Prisma",
            Orm::Drizzle => "Drizzle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Database {
    None,
    PostgreSql,
    MySql,
}

impl Choice for Database {
    const FIELD: &'static str = "database";
    const ALL: &'static [Self] = &[Database::None, Database::PostgreSql, Database::MySql];

    fn display_name(&self) -> &'static str {
        match self {
            Database::None => "None",
            Database::PostgreSql => "PostgreSQL",
            Database::MySql => "MySQL",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Database::None => &[],
            Database::PostgreSql => &["postgres", "pg"],
            Database::MySql => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Auth {
    None,
    HardCoded,
    NextAuth,
    Lucia,
}

impl Choice for Auth {
    const FIELD: &'static str = "authentication";
    const ALL: &'static [Self] = &[Auth::None, Auth::HardCoded, Auth::NextAuth, Auth::Lucia];

    fn display_name(&self) -> &'static str {
        match self {
            Auth::None => "None",
            Auth::HardCoded => "Hard-coded",
            Auth::NextAuth => "NextAuth",
            Auth::Lucia => "Lucia Auth",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Auth::None => &[],
            Auth::HardCoded => &["hardcoded", "hard_coded"],
            Auth::NextAuth => &["next-auth", "next_auth"],
            Auth::Lucia => &["lucia"],
        }
    }
}

display_via_name!(Framework, FrontendLanguage, Orm, Database, Auth);

/// Maximum length npm accepts for a package name
const MAX_NAME_LEN: usize = 214;

/// A project name that is safe both as a directory name and as an npm package name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidProjectName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name must not be empty"));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(invalid("name must be at most 214 characters"));
        }
        if name.starts_with('.') || name.starts_with('_') {
            return Err(invalid("name must not start with '.' or '_'"));
        }
        if name.eq_ignore_ascii_case("node_modules") {
            return Err(invalid("name is reserved"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "only ASCII letters, digits, '-', '_' and '.' are allowed",
            ));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated option values, as collected from flags and prompts
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    pub project_name: Option<String>,
    pub framework: Option<String>,
    pub language: Option<String>,
    pub orm: Option<String>,
    pub database: Option<String>,
    pub auth: Option<String>,
    pub install_deps: Option<bool>,
}

/// Default project name when none is given in non-interactive mode
pub const DEFAULT_PROJECT_NAME: &str = "default-project";

/// Validated, immutable description of the project to generate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectOptions {
    pub project_name: ProjectName,
    pub framework: Framework,
    pub language: FrontendLanguage,
    pub orm: Orm,
    pub database: Database,
    pub auth: Auth,
    pub install_deps: bool,
}

impl ProjectOptions {
    /// Validate raw values; omitted fields fall back to their defaults.
    ///
    /// `cwd` resolves the `.` project name to the current directory's name.
    pub fn from_raw(raw: &RawOptions, cwd: &Path) -> Result<Self> {
        let name = raw.project_name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME);
        let name = if is_current_dir_arg(name) {
            cwd.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            name.to_string()
        };

        Ok(Self {
            project_name: ProjectName::parse(&name)?,
            framework: parse_or(raw.framework.as_deref(), Framework::NextJs)?,
            language: parse_or(raw.language.as_deref(), FrontendLanguage::TypeScript)?,
            orm: parse_or(raw.orm.as_deref(), Orm::None)?,
            database: parse_or(raw.database.as_deref(), Database::None)?,
            auth: parse_or(raw.auth.as_deref(), Auth::None)?,
            install_deps: raw.install_deps.unwrap_or(false),
        })
    }
}

fn parse_or<T: Choice>(value: Option<&str>, default: T) -> Result<T> {
    value.map(T::parse).unwrap_or(Ok(default))
}

fn is_current_dir_arg(name: &str) -> bool {
    name == "." || name == "./"
}

/// Directory the project is generated into for a given project name argument
pub fn destination_for(name_arg: Option<&str>, project_name: &ProjectName, cwd: &Path) -> PathBuf {
    match name_arg {
        Some(arg) if is_current_dir_arg(arg) => cwd.to_path_buf(),
        _ => cwd.join(project_name.as_str()),
    }
}
