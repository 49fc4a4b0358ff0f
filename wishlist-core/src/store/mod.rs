//! Record stores backing the registry
//!
//! A store only knows how to load and save whole collections and how to
//! lock one of them. Validation and ordering live in
//! [`crate::registry::Registry`], which wraps every read-modify-write of a
//! collection in the store's lock.

mod json_file;

pub use json_file::JsonFileStore;

use crate::error::Result;
use crate::registry::{CatalogDocument, WishlistItem};

/// The two persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Wishlist,
    Catalog,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Wishlist => "wishlist",
            Collection::Catalog => "catalog",
        }
    }
}

/// Exclusive hold on one collection; released on drop
#[derive(Debug, Default)]
pub struct StoreLock {
    file: Option<std::fs::File>,
}

impl StoreLock {
    /// Lock with nothing to release, for stores no other process can reach
    pub fn unshared() -> Self {
        Self::default()
    }

    pub(crate) fn held(file: std::fs::File) -> Self {
        Self { file: Some(file) }
    }

    pub fn is_shared(&self) -> bool {
        self.file.is_some()
    }
}

/// Get/put access to the two persisted collections
pub trait RecordStore: Send {
    /// Block until no other writer, in this process or another, holds
    /// `collection`
    fn lock(&self, collection: Collection) -> Result<StoreLock> {
        let _ = collection;
        Ok(StoreLock::unshared())
    }

    /// Wishlist items in submission order
    fn load_wishlist(&self) -> Result<Vec<WishlistItem>>;

    fn save_wishlist(&mut self, items: &[WishlistItem]) -> Result<()>;

    fn load_catalog(&self) -> Result<CatalogDocument>;

    fn save_catalog(&mut self, catalog: &CatalogDocument) -> Result<()>;
}

/// Process-local store, used by tests and embedders without a filesystem
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    wishlist: Vec<WishlistItem>,
    catalog: CatalogDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_records(wishlist: Vec<WishlistItem>, catalog: CatalogDocument) -> Self {
        Self { wishlist, catalog }
    }
}

impl RecordStore for MemoryStore {
    fn load_wishlist(&self) -> Result<Vec<WishlistItem>> {
        Ok(self.wishlist.clone())
    }

    fn save_wishlist(&mut self, items: &[WishlistItem]) -> Result<()> {
        self.wishlist = items.to_vec();
        Ok(())
    }

    fn load_catalog(&self) -> Result<CatalogDocument> {
        Ok(self.catalog.clone())
    }

    fn save_catalog(&mut self, catalog: &CatalogDocument) -> Result<()> {
        self.catalog = catalog.clone();
        Ok(())
    }
}
