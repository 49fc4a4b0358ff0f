//! `wishlist.json` / `catalog.json` on disk

use fs4::fs_std::FileExt;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{Collection, RecordStore, StoreLock};
use crate::error::Result;
use crate::registry::{CatalogDocument, WishlistItem};

/// Store that reads and rewrites the two JSON documents.
///
/// A missing file reads as an empty collection. Writes go to a temporary
/// file next to the target and are renamed over it, so readers see either
/// the old or the new document. Writers serialize on an advisory lock over
/// a sidecar `<document>.lock` file, which holds across processes.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    wishlist_path: PathBuf,
    catalog_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(wishlist_path: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            wishlist_path: wishlist_path.into(),
            catalog_path: catalog_path.into(),
        }
    }

    /// Store using `wishlist.json` and `catalog.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("wishlist.json"), dir.join("catalog.json"))
    }

    pub fn wishlist_path(&self) -> &Path {
        &self.wishlist_path
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    fn document_path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Wishlist => &self.wishlist_path,
            Collection::Catalog => &self.catalog_path,
        }
    }
}

/// `wishlist.json` -> `wishlist.json.lock`
fn lock_path(document: &Path) -> PathBuf {
    let mut name = document.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn write_atomically<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    trace!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

impl RecordStore for JsonFileStore {
    fn lock(&self, collection: Collection) -> Result<StoreLock> {
        let path = lock_path(self.document_path(collection));
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // never truncated or removed: the inode is what other writers lock
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;

        trace!("Locked {} via {}", collection.as_str(), path.display());
        Ok(StoreLock::held(file))
    }

    fn load_wishlist(&self) -> Result<Vec<WishlistItem>> {
        if !self.wishlist_path.exists() {
            debug!("No wishlist at {}, starting empty", self.wishlist_path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.wishlist_path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_wishlist(&mut self, items: &[WishlistItem]) -> Result<()> {
        write_atomically(&self.wishlist_path, items)
    }

    fn load_catalog(&self) -> Result<CatalogDocument> {
        if !self.catalog_path.exists() {
            debug!("No catalog at {}, starting empty", self.catalog_path.display());
            return Ok(CatalogDocument::default());
        }
        let content = fs::read_to_string(&self.catalog_path)?;
        if content.trim().is_empty() {
            return Ok(CatalogDocument::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_catalog(&mut self, catalog: &CatalogDocument) -> Result<()> {
        write_atomically(&self.catalog_path, catalog)
    }
}
