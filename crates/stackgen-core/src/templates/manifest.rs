//! Template store manifest types and parsing

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root template manifest (templates/template.yaml)
/// Lists the template trees and manifest fragments the store provides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// Semver version for CLI compatibility checking
    pub version: String,

    /// Tree identifiers; each is a directory (local) or `<id>.zip` (remote)
    #[serde(default)]
    pub trees: Vec<String>,

    /// Fragment identifiers; each is `fragments/<id>.yaml`
    #[serde(default)]
    pub fragments: Vec<String>,
}

impl RootManifest {
    pub fn has_tree(&self, id: &str) -> bool {
        self.trees.iter().any(|t| t == id)
    }

    pub fn has_fragment(&self, id: &str) -> bool {
        self.fragments.iter().any(|f| f == id)
    }
}

/// A dependency delta to merge into a package manifest
/// (templates/fragments/<id>.yaml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFragment {
    /// Package name -> version range
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(default, alias = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,

    /// npm scripts to add or replace
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,

    /// Raw Prisma schema body, present on schema fragments only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl ManifestFragment {
    /// Builder-style helper mostly used to assemble fragments in code
    pub fn with_dependency(mut self, name: &str, range: &str) -> Self {
        self.dependencies.insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_dev_dependency(mut self, name: &str, range: &str) -> Self {
        self.dev_dependencies
            .insert(name.to_string(), range.to_string());
        self
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_with_schema() {
        let yaml = r#"
dependencies:
  prisma: "^4.0.0"
  "@prisma/client": "^4.0.0"
devDependencies:
  "@types/bcrypt": "5.0.0"
schema: |
  datasource db {
    provider = "postgresql"
    url      = env("DATABASE_URL")
  }
"#;
        let fragment: ManifestFragment = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(fragment.dependencies.len(), 2);
        assert_eq!(fragment.dependencies["@prisma/client"], "^4.0.0");
        assert_eq!(fragment.dev_dependencies["@types/bcrypt"], "5.0.0");
        assert!(fragment.scripts.is_empty());
        assert!(fragment
            .schema
            .as_deref()
            .unwrap()
            .contains("provider = \"postgresql\""));
    }

    #[test]
    fn test_parse_root_manifest() {
        let yaml = "version: 0.1.0\ntrees: [next-tailwind, app-with-auth]\nfragments: [next-auth]\n";
        let root: RootManifest = serde_yaml::from_str(yaml).unwrap();
        assert!(root.has_tree("app-with-auth"));
        assert!(!root.has_tree("remix"));
        assert!(root.has_fragment("next-auth"));
    }
}
