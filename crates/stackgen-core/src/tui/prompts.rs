//! Charm-style CLI prompts using cliclack

use super::sink::CliclackSink;
use crate::config::{GeneratorConfig, USER_AGENT};
use crate::options::{
    destination_for, Auth, Choice, Database, Framework, FrontendLanguage, Orm, ProjectName,
    ProjectOptions, RawOptions, DEFAULT_PROJECT_NAME,
};
use crate::project::materializer::{display_package, MaterializeReport, Materializer};
use crate::project::planner::{self, CompositionPlan};
use crate::runtime::{check, CommandInstaller, PackageManager};
use crate::templates::{version, TemplateFetcher, TemplateSource};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project name, or `.` for the current directory
    pub project_name: Option<String>,

    pub framework: Option<String>,
    pub language: Option<String>,
    pub orm: Option<String>,
    pub database: Option<String>,
    pub auth: Option<String>,

    /// Install dependencies without asking
    pub install: bool,

    /// Local directory to use for templates instead of the configured source
    pub template_dir: Option<PathBuf>,

    pub package_manager: Option<PackageManager>,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the CLI with interactive prompts
pub async fn run(args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro("stackgen")?;

    // Step 1: Resolve configuration and load the template store
    let config = GeneratorConfig::resolve(args.template_dir.clone(), args.package_manager)?;
    let fetcher = setup_fetcher(&config);
    let root_manifest = {
        let spinner = cliclack::spinner();
        spinner.start("Loading templates...");
        match fetcher.fetch_root_manifest().await {
            Ok(manifest) => {
                spinner.stop(format!("Templates {}", manifest.version));
                manifest
            }
            Err(e) => {
                spinner.stop("Failed to load templates");
                return Err(e).context("Could not read the template store");
            }
        }
    };

    if let Some(warning) = version::check_compatibility(cli_version, &root_manifest.version) {
        cliclack::log::warning(warning)?;
    }

    // Step 2: Collect options from flags and prompts
    let mut raw = collect_options(&args)?;

    // Step 3: Check install prerequisites before committing to an install
    if raw.install_deps == Some(true) && !check_runtimes(config.package_manager)? {
        raw.install_deps = Some(false);
    }

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let options = ProjectOptions::from_raw(&raw, &cwd)?;

    // Step 4: Pick and confirm the destination
    let project_dir = destination_for(raw.project_name.as_deref(), &options.project_name, &cwd);
    confirm_directory(&project_dir, &args)?;

    // Step 5: Plan, and make sure the store has every template the plan needs
    let plan = planner::plan(&options);
    plan.check_against(&root_manifest)
        .context("The template store is out of date for this stackgen version")?;

    // Step 6: Create project
    let installer = CommandInstaller::new(config.package_manager, config.install_timeout);
    let report = Materializer::new(&fetcher, &installer, &CliclackSink)
        .run(&plan, &options, &project_dir)
        .await?;

    // Step 7: Show next steps
    print_next_steps(
        &options,
        &plan,
        &report,
        &project_dir,
        &cwd,
        config.package_manager,
    )?;

    Ok(())
}

fn setup_fetcher(config: &GeneratorConfig) -> TemplateFetcher {
    match &config.template_source {
        TemplateSource::Local(path) => {
            let _ = cliclack::log::info(format!("Using local templates from {}", path.display()));
        }
        TemplateSource::Remote(url) => {
            let _ = cliclack::log::info(format!("Using remote templates from {}", url));
        }
    }
    TemplateFetcher::new(config.template_source.clone(), USER_AGENT)
}

/// Fill every option not given on the command line, by prompt or by default
fn collect_options(args: &CreateArgs) -> Result<RawOptions> {
    let project_name = match &args.project_name {
        Some(name) => Some(name.clone()),
        None if args.yes => None,
        None => Some(prompt_project_name()?),
    };

    Ok(RawOptions {
        project_name,
        framework: choose::<Framework>(&args.framework, args.yes, "Select a frontend framework", Framework::NextJs)?,
        language: choose::<FrontendLanguage>(
            &args.language,
            args.yes,
            "Choose language for frontend",
            FrontendLanguage::TypeScript,
        )?,
        orm: choose::<Orm>(&args.orm, args.yes, "Choose an ORM for database interaction", Orm::None)?,
        database: choose::<Database>(&args.database, args.yes, "Select a database", Database::None)?,
        auth: choose::<Auth>(&args.auth, args.yes, "Select authentication type", Auth::None)?,
        install_deps: Some(if args.install {
            true
        } else if args.yes {
            false
        } else {
            cliclack::confirm("Do you want to install the dependencies now?")
                .initial_value(true)
                .interact()?
        }),
    })
}

fn prompt_project_name() -> Result<String> {
    let name: String = cliclack::input("Project name")
        .placeholder(DEFAULT_PROJECT_NAME)
        .default_input(DEFAULT_PROJECT_NAME)
        .validate(|input: &String| {
            if input == "." || input == "./" {
                return Ok(());
            }
            ProjectName::parse(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact()?;
    Ok(name)
}

/// Flag value as given, nothing in `--yes` mode, otherwise the prompted choice
fn choose<T: Choice>(
    flag: &Option<String>,
    yes: bool,
    prompt: &str,
    initial: T,
) -> Result<Option<String>> {
    if let Some(value) = flag {
        return Ok(Some(value.clone()));
    }
    if yes {
        return Ok(None);
    }

    let mut select = cliclack::select(prompt).initial_value(initial);
    for choice in T::ALL {
        select = select.item(*choice, choice.display_name(), "");
    }
    let selected: T = select.interact()?;

    Ok(Some(selected.display_name().to_string()))
}

/// Report runtimes; returns false when installation cannot run
fn check_runtimes(manager: PackageManager) -> Result<bool> {
    let spinner = cliclack::spinner();
    spinner.start("Checking runtimes...");

    match check::check_install_runtimes(manager) {
        Ok(runtimes) => {
            let runtime_info: Vec<String> = runtimes
                .iter()
                .map(|r| format!("{} ({})", r.name, r.version.as_deref().unwrap_or("unknown")))
                .collect();
            spinner.stop(format!("Detected runtimes: {}", runtime_info.join(", ")));
            Ok(true)
        }
        Err(e) => {
            spinner.stop("Missing runtimes");
            cliclack::log::warning(format!("{}\nDependencies will not be installed.", e))?;
            Ok(false)
        }
    }
}

fn confirm_directory(path: &Path, args: &CreateArgs) -> Result<()> {
    // Validate parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() && parent != Path::new("") {
            anyhow::bail!("Parent directory does not exist: {}", parent.display());
        }
    }

    if path.exists() && !path.is_dir() {
        anyhow::bail!("{} exists and is not a directory", path.display());
    }

    // Warn if directory exists and has files
    if path.is_dir() {
        if let Ok(entries) = std::fs::read_dir(path) {
            let count = entries.count();
            if count > 0 {
                cliclack::log::warning(format!(
                    "{} has {} existing items; template files will overwrite matching paths",
                    path.display(),
                    count
                ))?;

                // Auto-confirm with --yes flag
                let confirm = if args.yes {
                    true
                } else {
                    cliclack::confirm("Continue anyway?")
                        .initial_value(true)
                        .interact()?
                };

                if !confirm {
                    anyhow::bail!("Setup cancelled.");
                }
            }
        }
    }

    cliclack::log::info(format!("Using directory: {}", path.display()))?;
    Ok(())
}

fn next_steps(
    options: &ProjectOptions,
    plan: &CompositionPlan,
    report: &MaterializeReport,
    project_dir: &Path,
    cwd: &Path,
    manager: PackageManager,
) -> Vec<String> {
    let mut steps = Vec::new();

    if project_dir != cwd {
        steps.push(format!("cd {}", project_dir.display()));
    }

    // Packages still needing an install: all of them if none ran, else the failed ones
    let pending: Vec<&Path> = if report.installs.is_empty() {
        plan.packages.iter().map(PathBuf::as_path).collect()
    } else {
        report.failed_installs()
    };
    for package in pending {
        if package.as_os_str().is_empty() {
            steps.push(manager.install_command());
        } else {
            steps.push(format!(
                "(cd {} && {})",
                display_package(package),
                manager.install_command()
            ));
        }
    }

    if report.schema_path.is_some() {
        steps.push(format!(
            "Set DATABASE_URL in .env for {}, then run: npx prisma db push",
            plan.effective_database
        ));
    }

    match options.framework {
        Framework::React => {
            steps.push(format!("(cd server/ && {} run dev)", manager.binary()));
            steps.push(format!("(cd client/ && {} start)", manager.binary()));
        }
        Framework::NextJs | Framework::Remix => {
            steps.push(format!("{} run dev", manager.binary()));
        }
    }

    steps
}

fn print_next_steps(
    options: &ProjectOptions,
    plan: &CompositionPlan,
    report: &MaterializeReport,
    project_dir: &Path,
    cwd: &Path,
    manager: PackageManager,
) -> Result<()> {
    let steps = next_steps(options, plan, report, project_dir, cwd, manager);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro(format!(
        "Project {} created with {}. Happy coding!",
        options.project_name, options.framework
    ))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::materializer::{InstallOutcome, InstallStatus};

    fn options(framework: Framework, orm: Orm, database: Database) -> ProjectOptions {
        ProjectOptions {
            project_name: ProjectName::parse("shop").unwrap(),
            framework,
            language: FrontendLanguage::JavaScript,
            orm,
            database,
            auth: Auth::None,
            install_deps: false,
        }
    }

    #[test]
    fn test_next_steps_without_install() {
        let opts = options(Framework::NextJs, Orm::Prisma, Database::MySql);
        let plan = planner::plan(&opts);
        let report = MaterializeReport {
            schema_path: Some(PathBuf::from("/work/shop/prisma/schema.prisma")),
            ..Default::default()
        };

        let steps = next_steps(
            &opts,
            &plan,
            &report,
            Path::new("/work/shop"),
            Path::new("/work"),
            PackageManager::Npm,
        );
        assert_eq!(
            steps,
            vec![
                "cd /work/shop",
                "npm install",
                "Set DATABASE_URL in .env for MySQL, then run: npx prisma db push",
                "npm run dev",
            ]
        );
    }

    #[test]
    fn test_next_steps_list_only_failed_installs() {
        let opts = options(Framework::React, Orm::None, Database::None);
        let plan = planner::plan(&opts);
        let report = MaterializeReport {
            installs: vec![
                InstallOutcome {
                    package: PathBuf::from("server"),
                    status: InstallStatus::Installed,
                },
                InstallOutcome {
                    package: PathBuf::from("client"),
                    status: InstallStatus::Failed("exit 1".to_string()),
                },
            ],
            ..Default::default()
        };

        let steps = next_steps(
            &opts,
            &plan,
            &report,
            Path::new("/work/shop"),
            Path::new("/work/shop"),
            PackageManager::Pnpm,
        );
        assert_eq!(
            steps,
            vec![
                "(cd client/ && pnpm install)",
                "(cd server/ && pnpm run dev)",
                "(cd client/ && pnpm start)",
            ]
        );
    }
}
