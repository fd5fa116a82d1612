//! `package.json` model and the fragment merge

use crate::error::{Error, Result};
use crate::templates::copier::write_atomic;
use crate::templates::manifest::ManifestFragment;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of a package manifest inside a package directory
pub const PACKAGE_MANIFEST: &str = "package.json";

/// In-memory `package.json`
///
/// Keys the generator does not manage (`private`, `type`, `engines`, ...) are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    #[serde(
        default,
        rename = "devDependencies",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub dev_dependencies: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PackageManifest {
    /// Manifest used when a package has no `package.json` of its own yet
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: Some("0.1.0".to_string()),
            scripts: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
            extra: Map::new(),
        }
    }
}

/// Merge `fragment` into `base`.
///
/// Every key of the fragment overwrites the same key in the base; keys the
/// fragment does not mention are left alone. Applying fragments in sequence
/// therefore resolves conflicts in favour of the latest one.
pub fn merge(mut base: PackageManifest, fragment: &ManifestFragment) -> PackageManifest {
    extend_map(&mut base.dependencies, &fragment.dependencies);
    extend_map(&mut base.dev_dependencies, &fragment.dev_dependencies);
    extend_map(&mut base.scripts, &fragment.scripts);
    base
}

fn extend_map(target: &mut BTreeMap<String, String>, delta: &BTreeMap<String, String>) {
    target.extend(delta.iter().map(|(k, v)| (k.clone(), v.clone())));
}

/// Read and parse a `package.json`
pub async fn read_manifest(path: &Path) -> Result<PackageManifest> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|e| Error::ManifestIo {
            path: path.to_path_buf(),
            action: "read",
            source: Box::new(e),
        })?;

    serde_json::from_slice(&content).map_err(|e| Error::ManifestIo {
        path: path.to_path_buf(),
        action: "parse",
        source: Box::new(e),
    })
}

/// Serialize as two-space indented JSON with a trailing newline
pub fn to_json(manifest: &PackageManifest) -> Result<String> {
    let mut json = serde_json::to_string_pretty(manifest).map_err(|e| Error::ManifestIo {
        path: PACKAGE_MANIFEST.into(),
        action: "serialize",
        source: Box::new(e),
    })?;
    json.push('\n');
    Ok(json)
}

pub async fn write_manifest(path: &Path, manifest: &PackageManifest) -> Result<()> {
    let json = to_json(manifest)?;
    write_atomic(path, json.as_bytes())
        .await
        .map_err(|e| match e {
            Error::Io { source, .. } => Error::ManifestIo {
                path: path.to_path_buf(),
                action: "write",
                source: Box::new(source),
            },
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PackageManifest {
        let mut manifest = PackageManifest::new("shop");
        manifest
            .dependencies
            .insert("next".to_string(), "14.1.0".to_string());
        manifest
            .dependencies
            .insert("axios".to_string(), "^1.6.8".to_string());
        manifest
    }

    #[test]
    fn test_later_fragment_wins_per_key() {
        let f1 = ManifestFragment::default()
            .with_dependency("bcrypt", "5.0.0")
            .with_dependency("next-auth", "4.24.10");
        let f2 = ManifestFragment::default().with_dependency("bcrypt", "5.1.0");

        let merged = merge(merge(base(), &f1), &f2);

        assert_eq!(merged.dependencies["bcrypt"], "5.1.0");
        assert_eq!(merged.dependencies["next-auth"], "4.24.10");
    }

    #[test]
    fn test_merge_never_removes_existing_keys() {
        let fragment = ManifestFragment::default()
            .with_dependency("prisma", "^4.0.0")
            .with_dev_dependency("@types/bcrypt", "5.0.0");

        let merged = merge(base(), &fragment);

        assert_eq!(merged.dependencies["next"], "14.1.0");
        assert_eq!(merged.dependencies["axios"], "^1.6.8");
        assert_eq!(merged.dependencies["prisma"], "^4.0.0");
        assert_eq!(merged.dev_dependencies["@types/bcrypt"], "5.0.0");
        assert_eq!(merged.name, "shop");
    }

    #[test]
    fn test_fragment_overrides_base_version() {
        let fragment = ManifestFragment::default().with_dependency("axios", "^1.7.0");
        let merged = merge(base(), &fragment);
        assert_eq!(merged.dependencies["axios"], "^1.7.0");
    }

    #[test]
    fn test_empty_fragment_is_identity() {
        assert_eq!(merge(base(), &ManifestFragment::default()), base());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let json = r#"{
  "name": "next-tailwind",
  "version": "0.1.0",
  "private": true,
  "scripts": { "dev": "next dev" },
  "dependencies": { "next": "14.1.0" },
  "engines": { "node": ">=18" }
}"#;
        let manifest: PackageManifest = serde_json::from_str(json).unwrap();
        assert!(manifest.dev_dependencies.is_empty());
        assert_eq!(manifest.extra["private"], Value::Bool(true));

        let written = to_json(&manifest).unwrap();
        assert!(written.ends_with("}\n"));
        let reparsed: PackageManifest = serde_json::from_str(&written).unwrap();
        assert_eq!(reparsed, manifest);
        assert!(written.contains("\"engines\""));
        assert!(!written.contains("devDependencies"));
    }

    #[test]
    fn test_empty_maps_are_not_written() {
        let manifest = PackageManifest::new("mern-server");
        let written = to_json(&manifest).unwrap();
        assert_eq!(
            written,
            "{\n  \"name\": \"mern-server\",\n  \"version\": \"0.1.0\"\n}\n"
        );
    }

    #[tokio::test]
    async fn test_read_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PACKAGE_MANIFEST);
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_manifest(&path).await,
            Err(Error::ManifestIo { action: "parse", .. })
        ));
        assert!(matches!(
            read_manifest(&dir.path().join("missing.json")).await,
            Err(Error::ManifestIo { action: "read", .. })
        ));
    }
}
