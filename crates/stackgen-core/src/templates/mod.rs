//! Template store access, copying and publishing
//!
//! This module provides:
//! - Store manifest types (RootManifest, ManifestFragment)
//! - The `TemplateStore` trait with local/remote and in-memory implementations
//! - Tree copying with overlay semantics
//! - Version compatibility checking

pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod store;
pub mod version;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub use copier::{copy_tree, write_atomic};
pub use fetcher::{TemplateFetcher, TemplateSource};
pub use manifest::{ManifestFragment, RootManifest};
pub use store::{MemoryStore, TemplateStore, TemplateTree};
pub use version::check_compatibility;

/// Build zip files for all trees of a local template store, for publishing
/// it as a remote store
pub async fn build_zips(dir: &Path) -> Result<()> {
    if !dir.exists() {
        anyhow::bail!("Template directory not found: {}", dir.display());
    }

    let fetcher = TemplateFetcher::new(TemplateSource::local(dir.to_path_buf()), "stackgen");
    let root_manifest = fetcher
        .fetch_root_manifest()
        .await
        .with_context(|| format!("Failed to load root manifest from {}", dir.display()))?;

    println!("{}", "Building template zips...".cyan().bold());
    println!();

    let mut built = 0;
    for tree_id in &root_manifest.trees {
        print!("  {} {}...", "->".blue(), tree_id);

        match TemplateFetcher::build_local_zip(dir, tree_id) {
            Ok(zip_bytes) => {
                let zip_path = dir.join(format!("{}.zip", tree_id));
                std::fs::write(&zip_path, &zip_bytes)
                    .with_context(|| format!("Failed to write {}", zip_path.display()))?;
                println!(" {} ({} bytes)", "done".green(), zip_bytes.len());
                built += 1;
            }
            Err(e) => {
                println!(" {}", "failed".red());
                eprintln!("    Error: {}", e);
            }
        }
    }

    for fragment_id in &root_manifest.fragments {
        let path = dir
            .join(fetcher::FRAGMENTS_DIR)
            .join(format!("{}.yaml", fragment_id));
        if !path.exists() {
            eprintln!(
                "{} Fragment '{}' listed but {} is missing",
                "Warning:".yellow(),
                fragment_id,
                path.display()
            );
        }
    }

    println!();
    println!(
        "{} {} template zip(s) in {}",
        "Built".green().bold(),
        built,
        dir.display()
    );

    Ok(())
}
