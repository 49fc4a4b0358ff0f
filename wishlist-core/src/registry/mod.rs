//! Wishlist and catalog registry
//!
//! Owns the wishlist and capability catalog, enforces their data contracts
//! and the wishlist status lifecycle, and computes priority ordering.
//!
//! # Concurrency
//!
//! Every mutation takes the registry lock and then the store's lock on the
//! affected collection, loads it, validates against that fresh state, and
//! saves before releasing both. The store lock is what serializes separate
//! registries and separate processes sharing one set of documents.

mod catalog;
mod wishlist;

pub use catalog::{bump_version, CapabilityType, CatalogDocument, CatalogEntry, Usage};
pub use wishlist::{Category, Status, TransitionExtra, WishlistDraft, WishlistItem};

use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::store::{Collection, RecordStore};

/// Outcome of [`Registry::submit_or_upvote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// A new item was filed
    Created(WishlistItem),
    /// The id already existed; the request counted as an upvote
    Upvoted(WishlistItem),
}

impl Submission {
    pub fn item(&self) -> &WishlistItem {
        match self {
            Submission::Created(item) | Submission::Upvoted(item) => item,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Submission::Created(_))
    }
}

/// The registry, generic over its record store
pub struct Registry<S: RecordStore> {
    store: Mutex<S>,
}

impl<S: RecordStore> Registry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Give the store back, e.g. to inspect it in tests
    pub fn into_store(self) -> Result<S> {
        self.store.into_inner().map_err(|_| RegistryError::LockPoisoned)
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>> {
        self.store.lock().map_err(|_| RegistryError::LockPoisoned)
    }

    /// Run `f` over the wishlist and persist it if `f` succeeds
    fn mutate_wishlist<T>(
        &self,
        f: impl FnOnce(&mut Vec<WishlistItem>) -> Result<T>,
    ) -> Result<T> {
        let mut store = self.lock()?;
        let _held = store.lock(Collection::Wishlist)?;
        let mut items = store.load_wishlist()?;
        let out = f(&mut items)?;
        store.save_wishlist(&items)?;
        Ok(out)
    }

    /// Run `f` over the catalog, bump `updated` and persist if `f` succeeds
    fn mutate_catalog<T>(&self, f: impl FnOnce(&mut CatalogDocument) -> Result<T>) -> Result<T> {
        let mut store = self.lock()?;
        let _held = store.lock(Collection::Catalog)?;
        let mut catalog = store.load_catalog()?;
        let out = f(&mut catalog)?;
        catalog.touch();
        store.save_catalog(&catalog)?;
        Ok(out)
    }

    // -- Wishlist ----------------------------------------------------------

    /// File a new wishlist item
    pub fn create_wishlist_item(&self, draft: WishlistDraft) -> Result<WishlistItem> {
        let item = WishlistItem::from_draft(draft)?;

        self.mutate_wishlist(|items| {
            if items.iter().any(|existing| existing.id == item.id) {
                return Err(RegistryError::DuplicateId(item.id.clone()));
            }
            info!(
                id = %item.id,
                category = %item.category,
                requested_by = %item.requested_by,
                "Wishlist item created"
            );
            items.push(item.clone());
            Ok(item)
        })
    }

    /// Add one vote to an existing item
    pub fn upvote(&self, id: &str) -> Result<WishlistItem> {
        self.mutate_wishlist(|items| {
            let item = find_item_mut(items, id)?;
            item.votes += 1;
            info!(id = %item.id, votes = item.votes, "Wishlist item upvoted");
            Ok(item.clone())
        })
    }

    /// File the draft, or upvote the existing item if its id is taken
    pub fn submit_or_upvote(&self, draft: WishlistDraft) -> Result<Submission> {
        self.mutate_wishlist(|items| {
            // a repeat request counts as demand even if the rest of it is malformed
            let id = draft.id.trim();
            if let Some(existing) = items.iter_mut().find(|existing| existing.id == id) {
                existing.votes += 1;
                info!(
                    id = %existing.id,
                    votes = existing.votes,
                    "Duplicate request collapsed into upvote"
                );
                return Ok(Submission::Upvoted(existing.clone()));
            }
            let item = WishlistItem::from_draft(draft)?;
            info!(id = %item.id, category = %item.category, "Wishlist item created");
            items.push(item.clone());
            Ok(Submission::Created(item))
        })
    }

    /// Move an item through the status lifecycle
    pub fn transition(
        &self,
        id: &str,
        new_status: Status,
        actor: &str,
        extra: TransitionExtra,
    ) -> Result<WishlistItem> {
        if actor.trim().is_empty() {
            return Err(RegistryError::MissingField("actor"));
        }

        self.mutate_wishlist(|items| {
            let item = find_item_mut(items, id)?;
            let from = item.status;
            item.apply_transition(new_status, &extra)?;
            info!(
                id = %item.id,
                actor = %actor,
                from = %from,
                to = %new_status,
                "Wishlist item transitioned"
            );
            Ok(item.clone())
        })
    }

    pub fn get_wishlist_item(&self, id: &str) -> Result<WishlistItem> {
        let store = self.lock()?;
        let items = store.load_wishlist()?;
        items
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// All items in submission order, optionally restricted to one status
    pub fn list_wishlist(&self, status: Option<Status>) -> Result<Vec<WishlistItem>> {
        let store = self.lock()?;
        let items = store.load_wishlist()?;
        Ok(items
            .into_iter()
            .filter(|item| status.map_or(true, |s| item.status == s))
            .collect())
    }

    /// Pending items; by descending votes (ties in submission order) or
    /// plain submission order
    pub fn list_pending(&self, sort_by_votes: bool) -> Result<Vec<WishlistItem>> {
        let mut pending = self.list_wishlist(Some(Status::Pending))?;
        if sort_by_votes {
            // stable: equal votes keep submission order
            pending.sort_by(|a, b| b.votes.cmp(&a.votes));
        }
        debug!("Listing {} pending items", pending.len());
        Ok(pending)
    }

    pub fn remove_wishlist_item(&self, id: &str) -> Result<WishlistItem> {
        self.mutate_wishlist(|items| {
            let index = items
                .iter()
                .position(|item| item.id == id)
                .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
            let removed = items.remove(index);
            info!(id = %removed.id, "Wishlist item removed");
            Ok(removed)
        })
    }

    // -- Catalog -----------------------------------------------------------

    /// Publish a new capability
    pub fn publish_catalog_entry(&self, name: &str, entry: CatalogEntry) -> Result<CatalogEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::MissingField("name"));
        }
        let version = entry.validate_for_publication(name)?;
        let entry = CatalogEntry {
            version: version.to_string(),
            ..entry
        };

        self.mutate_catalog(|catalog| {
            if catalog.capabilities.contains_key(name) {
                return Err(RegistryError::DuplicateCapability(name.to_string()));
            }
            info!(
                capability = %name,
                version = %entry.version,
                added_by = %entry.added_by,
                "Capability published"
            );
            catalog.capabilities.insert(name.to_string(), entry.clone());
            Ok(entry)
        })
    }

    /// Replace a published capability, bumping its version
    pub fn update_catalog_entry(&self, name: &str, mut entry: CatalogEntry) -> Result<CatalogEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::MissingField("name"));
        }
        let proposed = entry.validate_for_publication(name)?;

        self.mutate_catalog(|catalog| {
            let slot = catalog
                .capabilities
                .get_mut(name)
                .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
            // hand-edited files may carry a malformed version
            let version = match slot.parsed_version() {
                Ok(current) => bump_version(&current, &proposed)?,
                Err(_) => proposed,
            };
            info!(
                capability = %name,
                from = %slot.version,
                to = %version,
                "Capability updated"
            );
            entry.version = version.to_string();
            *slot = entry.clone();
            Ok(entry)
        })
    }

    pub fn get_catalog_entry(&self, name: &str) -> Result<CatalogEntry> {
        let store = self.lock()?;
        let catalog = store.load_catalog()?;
        catalog
            .capabilities
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Capabilities in document order
    pub fn list_catalog(&self) -> Result<Vec<(String, CatalogEntry)>> {
        let store = self.lock()?;
        let catalog = store.load_catalog()?;
        Ok(catalog.capabilities.into_iter().collect())
    }

    pub fn remove_catalog_entry(&self, name: &str) -> Result<CatalogEntry> {
        self.mutate_catalog(|catalog| {
            let removed = catalog
                .capabilities
                .shift_remove(name)
                .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
            info!(capability = %name, "Capability removed");
            Ok(removed)
        })
    }
}

fn find_item_mut<'a>(items: &'a mut [WishlistItem], id: &str) -> Result<&'a mut WishlistItem> {
    items
        .iter_mut()
        .find(|item| item.id == id)
        .ok_or_else(|| RegistryError::NotFound(id.to_string()))
}
