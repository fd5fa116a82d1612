//! Copying template trees into a project directory

use crate::error::{Error, Result};
use crate::templates::store::TemplateTree;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Copy every file of `tree` under `target_dir`, overwriting colliding files.
///
/// Returns the written paths (absolute, in tree order).
pub async fn copy_tree(tree: &TemplateTree, target_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir)
        .await
        .map_err(|e| Error::io("failed to create directory", target_dir, e))?;

    let mut written = Vec::with_capacity(tree.files.len());

    for (file_path, content) in &tree.files {
        let relative = safe_relative_path(file_path).ok_or_else(|| Error::Template {
            id: tree.id.clone(),
            message: format!("file path '{}' escapes the project directory", file_path),
        })?;

        let target_path = target_dir.join(relative);
        write_atomic(&target_path, content).await?;
        written.push(target_path);
    }

    Ok(written)
}

/// Write a file through a sibling temp file and a rename, so readers never
/// observe a partially written file
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io("failed to create directory", parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.stackgen-tmp", file_name));

    fs::write(&tmp_path, content)
        .await
        .map_err(|e| Error::io("failed to write", &tmp_path, e))?;

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(Error::io("failed to write", path, e));
    }

    Ok(())
}

/// Template paths must be relative and stay inside the destination
fn safe_relative_path(file_path: &str) -> Option<PathBuf> {
    let path = Path::new(file_path);
    if file_path.is_empty() {
        return None;
    }

    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (!clean.as_os_str().is_empty()).then_some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(
            safe_relative_path("src/app/page.tsx"),
            Some(PathBuf::from("src/app/page.tsx"))
        );
        assert_eq!(safe_relative_path("./.env"), Some(PathBuf::from(".env")));
        assert_eq!(safe_relative_path("../outside.txt"), None);
        assert_eq!(safe_relative_path("src/../../x"), None);
        assert_eq!(safe_relative_path("/etc/passwd"), None);
        assert_eq!(safe_relative_path(""), None);
        assert_eq!(safe_relative_path("."), None);
    }

    #[tokio::test]
    async fn test_later_tree_overwrites_earlier_files() {
        let dir = tempfile::tempdir().unwrap();
        let base = TemplateTree::new("next-tailwind")
            .with_file("app/page.tsx", "base page")
            .with_file("app/layout.tsx", "base layout");
        let overlay = TemplateTree::new("app-with-auth").with_file("app/page.tsx", "auth page");

        copy_tree(&base, dir.path()).await.unwrap();
        let written = copy_tree(&overlay, dir.path()).await.unwrap();

        assert_eq!(written, vec![dir.path().join("app/page.tsx")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app/page.tsx")).unwrap(),
            "auth page"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("app/layout.tsx")).unwrap(),
            "base layout"
        );
    }

    #[tokio::test]
    async fn test_escaping_path_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let tree = TemplateTree::new("evil").with_file("../evil.txt", "x");

        let err = copy_tree(&tree, &dir.path().join("project")).await.unwrap_err();
        assert!(matches!(err, Error::Template { ref id, .. } if id == "evil"));
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prisma/schema.prisma");

        write_atomic(&path, b"model User {}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"model User {}");
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("prisma"))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }
}
