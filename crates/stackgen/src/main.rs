//! Stackgen CLI - full-stack project scaffolding

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use colored::Colorize;
use stackgen_core::tui::CreateArgs;
use stackgen_core::{ConsoleSink, GeneratorConfig, PackageManager, ProjectOptions, RawOptions, StatusSink};
use std::path::PathBuf;

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "stackgen")]
#[command(about = "Scaffold full-stack web projects from composable templates")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub create: CliCreateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project (the default when no subcommand is given)
    Create(CliCreateArgs),
    /// Print the composition plan for a set of options without writing anything
    Plan(CliCreateArgs),
    /// Build zip files for all trees in a template directory (for publishing a remote store)
    BuildZips(BuildZipsArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct CliCreateArgs {
    /// Project name; `.` scaffolds into the current directory
    pub name: Option<String>,

    /// Frontend framework (React, Next.js, Remix)
    #[arg(short = 'f', long = "frontend")]
    pub framework: Option<String>,

    /// Frontend language (JavaScript, TypeScript)
    #[arg(short, long)]
    pub language: Option<String>,

    /// ORM (None, Prisma, Drizzle)
    #[arg(short, long)]
    pub orm: Option<String>,

    /// Database (None, PostgreSQL, MySQL)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Authentication (None, Hard-coded, NextAuth, Lucia)
    #[arg(short, long)]
    pub auth: Option<String>,

    /// Install dependencies after scaffolding
    #[arg(short, long)]
    pub install: bool,

    /// Local directory to use for templates instead of the configured store (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Package manager used for installation
    #[arg(long = "package-manager", value_enum)]
    pub package_manager: Option<PackageManager>,

    /// Auto-confirm all prompts and use defaults for unset options (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            project_name: args.name,
            framework: args.framework,
            language: args.language,
            orm: args.orm,
            database: args.database,
            auth: args.auth,
            install: args.install,
            template_dir: args.template_dir,
            package_manager: args.package_manager,
            yes: args.yes,
        }
    }
}

impl CliCreateArgs {
    /// Options exactly as given; unset ones fall back to defaults during validation
    fn raw_options(&self) -> RawOptions {
        RawOptions {
            project_name: self.name.clone(),
            framework: self.framework.clone(),
            language: self.language.clone(),
            orm: self.orm.clone(),
            database: self.database.clone(),
            auth: self.auth.clone(),
            install_deps: Some(self.install),
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct BuildZipsArgs {
    /// Template directory to build zips from; defaults to the configured local store
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

async fn create(args: CliCreateArgs) -> Result<()> {
    let result = stackgen_core::run(args.into(), CLI_VERSION).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}

fn print_plan(args: &CliCreateArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let options = ProjectOptions::from_raw(&args.raw_options(), &cwd)?;
    let plan = stackgen_core::plan(&options);

    let sink = ConsoleSink;
    for warning in &plan.warnings {
        sink.warning(&warning.to_string());
    }

    println!(
        "{} {} ({}, {}, {}, {}, {})",
        "Plan for".cyan().bold(),
        options.project_name,
        options.framework,
        options.language,
        options.orm,
        plan.effective_database,
        options.auth
    );
    println!();
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }

    Ok(())
}

async fn build_zips(args: BuildZipsArgs) -> Result<()> {
    let dir = match args.template_dir {
        Some(dir) => dir,
        None => match GeneratorConfig::resolve(None, None)?.template_source {
            stackgen_core::TemplateSource::Local(dir) => dir,
            stackgen_core::TemplateSource::Remote(url) => {
                anyhow::bail!(
                    "No local template directory configured (store is {}); pass --template-dir",
                    url
                )
            }
        },
    };
    stackgen_core::templates::build_zips(&dir).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();

    match args.command {
        Some(Command::Create(create_args)) => create(create_args).await,
        Some(Command::Plan(plan_args)) => print_plan(&plan_args),
        Some(Command::BuildZips(build_args)) => build_zips(build_args).await,
        // No subcommand: top-level flags drive the create flow
        None => create(args.create).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_flags_create() {
        let args = Args::try_parse_from([
            "stackgen", "shop", "-f", "next", "-o", "prisma", "-d", "mysql", "-a", "nextauth", "-y",
        ])
        .unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.create.name.as_deref(), Some("shop"));
        assert_eq!(args.create.framework.as_deref(), Some("next"));
        assert_eq!(args.create.auth.as_deref(), Some("nextauth"));
        assert!(args.create.yes);
        assert!(!args.create.install);
    }

    #[test]
    fn test_plan_subcommand() {
        let args =
            Args::try_parse_from(["stackgen", "plan", "--frontend", "React", "--orm", "Prisma"])
                .unwrap();
        match args.command {
            Some(Command::Plan(plan_args)) => {
                let raw = plan_args.raw_options();
                assert_eq!(raw.framework.as_deref(), Some("React"));
                assert_eq!(raw.install_deps, Some(false));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_package_manager_flag() {
        let args =
            Args::try_parse_from(["stackgen", "create", "--package-manager", "pnpm"]).unwrap();
        match args.command {
            Some(Command::Create(create_args)) => {
                let create: CreateArgs = create_args.into();
                assert_eq!(create.package_manager, Some(PackageManager::Pnpm));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_zips_args() {
        let args =
            Args::try_parse_from(["stackgen", "build-zips", "--template-dir", "templates"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Command::BuildZips(BuildZipsArgs { template_dir: Some(ref d) })) if d == &PathBuf::from("templates")
        ));
    }
}
