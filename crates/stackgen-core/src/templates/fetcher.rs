//! Template fetching from a remote URL or a local directory
//!
//! Layout of a template store:
//! - `template.yaml` - root manifest listing trees and fragments
//! - `<tree>/...` - one directory per tree (local), or `<tree>.zip` (remote)
//! - `fragments/<id>.yaml` - one manifest fragment per file
//!
//! Remote trees are published as zips built by [`TemplateFetcher::build_local_zip`],
//! so both sources yield identical trees.

use super::manifest::{ManifestFragment, RootManifest};
use super::store::{TemplateStore, TemplateTree};
use crate::error::{Error, Result, TemplateKind};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Directory (relative to the store root) holding fragment files
pub const FRAGMENTS_DIR: &str = "fragments";

/// Name of the root manifest file
pub const ROOT_MANIFEST: &str = "template.yaml";

/// Template source - either remote URL or local directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    pub fn remote(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: format!("invalid template URL: {}", e),
        })?;
        Ok(Self::Remote(url))
    }

    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Template fetcher - resolves trees and fragments from remote or local sources
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    /// Trees already downloaded/read during this run
    tree_cache: Mutex<HashMap<String, TemplateTree>>,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            tree_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Build a URL by appending path segments, preserving query parameters
    fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Fetch {
                url: base.to_string(),
                message: "URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a URL; `Ok(None)` when the server answers 404
    async fn fetch_bytes(&self, url: Url) -> Result<Option<Vec<u8>>> {
        let fetch_err = |message: String| Error::Fetch {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(fetch_err(format!("HTTP {}", response.status())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;
        Ok(Some(bytes.to_vec()))
    }

    /// Fetch the root manifest listing available trees and fragments
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        let content = match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::build_url(base_url, &[ROOT_MANIFEST])?;
                self.fetch_bytes(url.clone())
                    .await?
                    .ok_or_else(|| Error::Fetch {
                        url: url.to_string(),
                        message: "root manifest not found".to_string(),
                    })?
            }
            TemplateSource::Local(path) => {
                let manifest_path = path.join(ROOT_MANIFEST);
                tokio::fs::read(&manifest_path)
                    .await
                    .map_err(|e| Error::io("failed to read", &manifest_path, e))?
            }
        };

        serde_yaml::from_slice(&content).map_err(|e| Error::Template {
            id: ROOT_MANIFEST.to_string(),
            message: e.to_string(),
        })
    }

    /// Read a tree directory from disk
    pub fn read_local_tree(root: &Path, id: &str) -> Result<TemplateTree> {
        let tree_dir = root.join(id);
        if !tree_dir.is_dir() {
            return Err(Error::not_found(TemplateKind::Tree, id));
        }

        let mut tree = TemplateTree::new(id);
        for entry in WalkDir::new(&tree_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Template {
                id: id.to_string(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&tree_dir)
                .map_err(|e| Error::Template {
                    id: id.to_string(),
                    message: e.to_string(),
                })?;
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let content = std::fs::read(entry.path())
                .map_err(|e| Error::io("failed to read", entry.path(), e))?;
            tree.files.insert(key, content);
        }

        Ok(tree)
    }

    /// Build a zip file for a local tree; entries are stored as `<id>/<path>`
    pub fn build_local_zip(root: &Path, id: &str) -> Result<Vec<u8>> {
        let tree = Self::read_local_tree(root, id)?;
        let zip_err = |e: zip::result::ZipError| Error::Template {
            id: id.to_string(),
            message: e.to_string(),
        };

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            for (path, content) in &tree.files {
                zip.start_file(format!("{}/{}", id, path), options)
                    .map_err(zip_err)?;
                zip.write_all(content)
                    .map_err(|e| Error::io("failed to compress", root.join(id).join(path), e))?;
            }

            zip.finish().map_err(zip_err)?;
        }

        Ok(zip_buffer)
    }

    /// Extract a tree zip, stripping the `<id>/` prefix from entry names
    fn extract_zip(zip_bytes: &[u8], id: &str) -> Result<TemplateTree> {
        let malformed = |message: String| Error::Template {
            id: id.to_string(),
            message,
        };

        let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
            .map_err(|e| malformed(format!("unreadable zip archive: {}", e)))?;

        let prefix = format!("{}/", id);
        let mut tree = TemplateTree::new(id);

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| malformed(e.to_string()))?;
            if file.is_dir() {
                continue;
            }

            let full_path = file.name().to_string();
            let relative_path = full_path
                .strip_prefix(&prefix)
                .unwrap_or(&full_path)
                .to_string();

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)
                .map_err(|e| malformed(e.to_string()))?;
            tree.files.insert(relative_path, contents);
        }

        Ok(tree)
    }

    fn parse_fragment(id: &str, content: &[u8]) -> Result<ManifestFragment> {
        serde_yaml::from_slice(content).map_err(|e| Error::Template {
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    fn cached_tree(&self, id: &str) -> Option<TemplateTree> {
        self.tree_cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(id).cloned())
    }

    fn cache_tree(&self, tree: &TemplateTree) {
        if let Ok(mut cache) = self.tree_cache.lock() {
            cache.insert(tree.id.clone(), tree.clone());
        }
    }
}

impl TemplateStore for TemplateFetcher {
    async fn resolve_tree(&self, id: &str) -> Result<TemplateTree> {
        if let Some(tree) = self.cached_tree(id) {
            return Ok(tree);
        }

        let tree = match &self.source {
            TemplateSource::Remote(base_url) => {
                let zip_name = format!("{}.zip", id);
                let url = Self::build_url(base_url, &[zip_name.as_str()])?;
                let zip_bytes = self
                    .fetch_bytes(url)
                    .await?
                    .ok_or_else(|| Error::not_found(TemplateKind::Tree, id))?;
                Self::extract_zip(&zip_bytes, id)?
            }
            TemplateSource::Local(path) => Self::read_local_tree(path, id)?,
        };

        self.cache_tree(&tree);
        Ok(tree)
    }

    async fn resolve_fragment(&self, id: &str) -> Result<ManifestFragment> {
        let file_name = format!("{}.yaml", id);
        let content = match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::build_url(base_url, &[FRAGMENTS_DIR, file_name.as_str()])?;
                self.fetch_bytes(url).await?
            }
            TemplateSource::Local(path) => {
                let fragment_path = path.join(FRAGMENTS_DIR).join(&file_name);
                match tokio::fs::read(&fragment_path).await {
                    Ok(content) => Some(content),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                    Err(e) => return Err(Error::io("failed to read", fragment_path, e)),
                }
            }
        };

        let content = content.ok_or_else(|| Error::not_found(TemplateKind::Fragment, id))?;
        Self::parse_fragment(id, &content)
    }
}
