//! Hierarchical blob store the catalogs are persisted into.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path-like key made of plain segments: catalog root, optional namespaces, entry.
///
/// Segments are never interpreted; callers filter out separators and dot segments
/// before building keys from provider data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey {
    segments: Vec<String>,
}

impl BlobKey {
    pub fn root(catalog: impl Into<String>) -> Self {
        Self {
            segments: vec![catalog.into()],
        }
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Key of the enclosing namespace; `None` for a catalog root.
    pub fn parent(&self) -> Option<BlobKey> {
        match self.segments.split_last() {
            Some((_, parents)) if !parents.is_empty() => Some(Self {
                segments: parents.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn to_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Minimal store interface: recursive directory creation and whole-file overwrite.
pub trait BlobStore: Send + Sync {
    fn create_dir_all<'a>(&'a self, key: &'a BlobKey) -> BoxFuture<'a, Result<()>>;

    fn write<'a>(&'a self, key: &'a BlobKey, contents: Vec<u8>) -> BoxFuture<'a, Result<()>>;
}

/// Filesystem-backed store rooted at the data directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, key: &BlobKey) -> PathBuf {
        key.to_path(&self.root)
    }
}

impl BlobStore for FsBlobStore {
    fn create_dir_all<'a>(&'a self, key: &'a BlobKey) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let path = self.path_of(key);
            tokio::fs::create_dir_all(&path)
                .await
                .with_context(|| format!("failed to create directory {}", path.display()))
        })
    }

    fn write<'a>(&'a self, key: &'a BlobKey, contents: Vec<u8>) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let path = self.path_of(key);
            tokio::fs::write(&path, contents)
                .await
                .with_context(|| format!("failed to write {}", path.display()))
        })
    }
}
