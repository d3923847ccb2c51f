//! Persistence: the blob store abstraction, its filesystem implementation, and the
//! catalog writer that lays out `all.json`, `count`, and index files.

pub mod blob;
pub mod writer;

pub use blob::{BlobKey, BlobStore, FsBlobStore};
pub use writer::{CatalogWriter, CATALOG_FILE, COUNT_FILE};
