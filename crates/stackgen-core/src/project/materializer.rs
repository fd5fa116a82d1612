//! Executing a composition plan against a destination directory
//!
//! Steps run strictly in plan order. The in-progress manifests are an explicit
//! value handed from step to step and written once after the last step. A
//! failing step aborts the run; whatever earlier steps wrote stays on disk.

use super::package::{self, merge, PackageManifest, PACKAGE_MANIFEST};
use super::planner::{CompositionPlan, PlanStep};
use super::schema::{rewrite_provider, PRISMA_SCHEMA_PATH};
use crate::error::{Error, Result};
use crate::options::ProjectOptions;
use crate::runtime::install::PackageInstaller;
use crate::status::StatusSink;
use crate::templates::copier::{copy_tree, write_atomic};
use crate::templates::manifest::ManifestFragment;
use crate::templates::store::TemplateStore;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// In-progress manifests keyed by package directory (relative to the project)
pub type Manifests = BTreeMap<PathBuf, PackageManifest>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStatus {
    Installed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub package: PathBuf,
    pub status: InstallStatus,
}

/// What a run produced
#[derive(Debug, Clone, Default)]
pub struct MaterializeReport {
    pub files_written: Vec<PathBuf>,
    pub manifests_written: Vec<PathBuf>,
    pub schema_path: Option<PathBuf>,
    pub installs: Vec<InstallOutcome>,
}

impl MaterializeReport {
    /// Packages whose installation failed
    pub fn failed_installs(&self) -> Vec<&Path> {
        self.installs
            .iter()
            .filter(|o| matches!(o.status, InstallStatus::Failed(_)))
            .map(|o| o.package.as_path())
            .collect()
    }

    /// Distinct files written; a rewritten tree `package.json` counts once
    pub fn written_file_count(&self) -> usize {
        self.files_written
            .iter()
            .chain(&self.manifests_written)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Fold one fragment into the manifest of `package`.
///
/// A package seen for the first time starts from `PackageManifest::new(default_name)`.
pub fn fold_fragment(
    mut manifests: Manifests,
    package: &Path,
    fragment: &ManifestFragment,
    default_name: &str,
) -> Manifests {
    let current = manifests
        .remove(package)
        .unwrap_or_else(|| PackageManifest::new(default_name));
    manifests.insert(package.to_path_buf(), merge(current, fragment));
    manifests
}

/// Name given to a package that has no `package.json` of its own
fn default_package_name(options: &ProjectOptions, package: &Path) -> String {
    match package.file_name() {
        Some(dir) => format!("{}-{}", options.project_name, dir.to_string_lossy()),
        None => options.project_name.to_string(),
    }
}

pub fn display_package(package: &Path) -> String {
    if package.as_os_str().is_empty() {
        ".".to_string()
    } else {
        format!("{}/", package.display())
    }
}

pub struct Materializer<'a, S, I> {
    store: &'a S,
    installer: &'a I,
    status: &'a dyn StatusSink,
}

impl<'a, S: TemplateStore, I: PackageInstaller> Materializer<'a, S, I> {
    pub fn new(store: &'a S, installer: &'a I, status: &'a dyn StatusSink) -> Self {
        Self {
            store,
            installer,
            status,
        }
    }

    /// Apply `plan` under `dest`, then install dependencies if requested
    pub async fn run(
        &self,
        plan: &CompositionPlan,
        options: &ProjectOptions,
        dest: &Path,
    ) -> Result<MaterializeReport> {
        for warning in &plan.warnings {
            self.status.warning(&warning.to_string());
        }

        prepare_destination(dest).await?;

        let mut report = MaterializeReport::default();
        let mut manifests = Manifests::new();
        let total = plan.steps.len();

        for (index, step) in plan.steps.iter().enumerate() {
            let description = step.to_string();
            self.status.step(index + 1, total, &description);

            manifests = match self
                .apply_step(step, options, dest, manifests, &mut report)
                .await
            {
                Ok(manifests) => manifests,
                Err(e) => {
                    let err = Error::Setup {
                        step: index,
                        description,
                        source: Box::new(e),
                    };
                    self.status.error(&err.to_string());
                    return Err(err);
                }
            };
        }

        // A failed write only loses its own package; the rest are still written
        let mut first_error = None;
        for (package_dir, manifest) in &manifests {
            let path = dest.join(package_dir).join(PACKAGE_MANIFEST);
            match package::write_manifest(&path, manifest).await {
                Ok(()) => report.manifests_written.push(path),
                Err(e) => {
                    self.status.error(&e.to_string());
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        self.status.success(&format!(
            "Wrote {} files to {}",
            report.written_file_count(),
            dest.display()
        ));

        if options.install_deps {
            report.installs = self.install_packages(plan, dest).await;
        }

        Ok(report)
    }

    async fn apply_step(
        &self,
        step: &PlanStep,
        options: &ProjectOptions,
        dest: &Path,
        mut manifests: Manifests,
        report: &mut MaterializeReport,
    ) -> Result<Manifests> {
        let package_dir = dest.join(&step.package);

        if let Some(tree_id) = &step.tree {
            let tree = self.store.resolve_tree(tree_id).await?;
            let written = copy_tree(&tree, &package_dir).await?;
            report.files_written.extend(written);

            // The tree's package.json replaced whatever was merged so far
            if tree.files.contains_key(PACKAGE_MANIFEST) {
                manifests.remove(&step.package);
            }
        }

        let fragment_id = match (&step.fragment, step.rewrite) {
            (Some(id), _) => id,
            (None, None) => return Ok(manifests),
            (None, Some(_)) => {
                return Err(Error::Schema {
                    id: String::new(),
                    message: "provider rewrite without a schema fragment".to_string(),
                })
            }
        };
        let fragment = self.store.resolve_fragment(fragment_id).await?;

        // The first fragment for a package starts from whatever the trees put on disk
        if !manifests.contains_key(&step.package) {
            let manifest_path = package_dir.join(PACKAGE_MANIFEST);
            let exists = tokio::fs::try_exists(&manifest_path)
                .await
                .map_err(|e| Error::ManifestIo {
                    path: manifest_path.clone(),
                    action: "read",
                    source: Box::new(e),
                })?;
            if exists {
                let base = package::read_manifest(&manifest_path).await?;
                manifests.insert(step.package.clone(), base);
            }
        }
        let manifests = fold_fragment(
            manifests,
            &step.package,
            &fragment,
            &default_package_name(options, &step.package),
        );

        if let Some(rewrite) = step.rewrite {
            let schema = fragment.schema.as_deref().ok_or_else(|| Error::Schema {
                id: fragment_id.clone(),
                message: "fragment carries no schema".to_string(),
            })?;
            let rewritten =
                rewrite_provider(schema, rewrite.provider).ok_or_else(|| Error::Schema {
                    id: fragment_id.clone(),
                    message: "schema declares no datasource provider".to_string(),
                })?;

            let schema_path = package_dir.join(PRISMA_SCHEMA_PATH);
            write_atomic(&schema_path, rewritten.as_bytes()).await?;
            report.schema_path = Some(schema_path);
        }

        Ok(manifests)
    }

    /// Install each package in plan order; failures are reported, not raised
    pub async fn install_packages(
        &self,
        plan: &CompositionPlan,
        dest: &Path,
    ) -> Vec<InstallOutcome> {
        let mut outcomes = Vec::with_capacity(plan.packages.len());

        for package in &plan.packages {
            let label = display_package(package);
            self.status
                .info(&format!("Installing dependencies in {}", label));

            let status = match self.installer.install(&dest.join(package)).await {
                Ok(()) => {
                    self.status
                        .success(&format!("Dependencies installed in {}", label));
                    InstallStatus::Installed
                }
                Err(e) => {
                    self.status.warning(&e.to_string());
                    InstallStatus::Failed(e.to_string())
                }
            };

            outcomes.push(InstallOutcome {
                package: package.clone(),
                status,
            });
        }

        outcomes
    }
}

async fn prepare_destination(dest: &Path) -> Result<()> {
    if dest.exists() && !dest.is_dir() {
        return Err(Error::io(
            "destination is not a directory:",
            dest,
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        ));
    }
    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| Error::io("failed to create directory", dest, e))
}
