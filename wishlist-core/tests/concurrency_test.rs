//! Concurrent callers on one registry never lose updates

mod common;

use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use wishlist_core::registry::{Status, TransitionExtra};
use wishlist_core::store::{JsonFileStore, MemoryStore};
use wishlist_core::{Registry, RegistryError};

use common::draft;

#[test]
fn test_concurrent_upvotes_are_all_counted() {
    let registry = Arc::new(Registry::new(MemoryStore::new()));
    registry.create_wishlist_item(draft("popular", "api")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..25 {
                    registry.upvote("popular").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.get_wishlist_item("popular").unwrap().votes, 1 + 8 * 25);
}

#[test]
fn test_concurrent_upvotes_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Arc::new(Registry::new(JsonFileStore::in_dir(temp_dir.path())));
    registry.create_wishlist_item(draft("popular", "api")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..10 {
                    registry.upvote("popular").unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.get_wishlist_item("popular").unwrap().votes, 41);
}

#[test]
fn test_separate_registries_share_one_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_path_buf();
    Registry::new(JsonFileStore::in_dir(&dir))
        .create_wishlist_item(draft("popular", "api"))
        .unwrap();

    // one registry per call, the way each CLI invocation opens its own
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let dir = dir.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    Registry::new(JsonFileStore::in_dir(&dir))
                        .upvote("popular")
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let registry = Registry::new(JsonFileStore::in_dir(&dir));
    assert_eq!(registry.get_wishlist_item("popular").unwrap().votes, 1 + 4 * 25);
}

#[test]
fn test_separate_registries_race_to_claim() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_path_buf();
    Registry::new(JsonFileStore::in_dir(&dir))
        .create_wishlist_item(draft("contested", "sdk"))
        .unwrap();

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let dir = dir.clone();
            thread::spawn(move || {
                let agent = format!("agent-{n}");
                Registry::new(JsonFileStore::in_dir(&dir)).transition(
                    "contested",
                    Status::Building,
                    &agent,
                    TransitionExtra::assigned(agent.clone()),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
}

#[test]
fn test_racing_claims_have_one_winner() {
    let registry = Arc::new(Registry::new(MemoryStore::new()));
    registry.create_wishlist_item(draft("contested", "sdk")).unwrap();

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let agent = format!("agent-{n}");
                registry.transition(
                    "contested",
                    Status::Building,
                    &agent,
                    TransitionExtra::assigned(agent.clone()),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results.iter().filter(|r| r.is_err()).all(|r| matches!(
        r,
        Err(RegistryError::InvalidTransition {
            from: Status::Building,
            to: Status::Building
        })
    )));

    let stored = registry.get_wishlist_item("contested").unwrap();
    assert_eq!(stored.assigned, winners[0].assigned);
}
