//! Registry over the JSON documents on disk

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wishlist_core::registry::{CatalogDocument, Status, TransitionExtra, WishlistItem};
use wishlist_core::store::{JsonFileStore, RecordStore};
use wishlist_core::Registry;

use common::{catalog_entry, draft, init_test_logging, usage};

#[test]
fn test_documents_survive_reopen() {
    init_test_logging();
    let temp_dir = TempDir::new().unwrap();

    {
        let registry = Registry::new(JsonFileStore::in_dir(temp_dir.path()));
        registry.create_wishlist_item(draft("camera-aliases", "sdk")).unwrap();
        registry.upvote("camera-aliases").unwrap();
        registry
            .publish_catalog_entry("yolo-segmentation", catalog_entry(Some(usage())))
            .unwrap();
    }

    let registry = Registry::new(JsonFileStore::in_dir(temp_dir.path()));
    assert_eq!(registry.get_wishlist_item("camera-aliases").unwrap().votes, 2);
    assert_eq!(
        registry.get_catalog_entry("yolo-segmentation").unwrap(),
        catalog_entry(Some(usage()))
    );
}

#[test]
fn test_wishlist_wire_format() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(JsonFileStore::in_dir(temp_dir.path()));
    registry.create_wishlist_item(draft("camera-aliases", "sdk")).unwrap();
    registry
        .transition("camera-aliases", Status::Building, "steve", TransitionExtra::assigned("steve"))
        .unwrap();

    let raw = fs::read_to_string(temp_dir.path().join("wishlist.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        json!([{
            "id": "camera-aliases",
            "name": "camera aliases",
            "description": "Need camera-aliases",
            "reason": "blocks a skill",
            "category": "sdk",
            "requested_by": "skill-agent",
            "votes": 1,
            "status": "building",
            "assigned": "steve"
        }])
    );
}

#[test]
fn test_hand_written_documents_round_trip() {
    let wishlist = r#"[
  {
    "id": "gripper-api",
    "name": "Gripper API",
    "description": "Open/close the gripper",
    "reason": "pick-and-place skill",
    "category": "api",
    "requested_by": "skill-agent",
    "votes": 4,
    "status": "done",
    "assigned": "backend-agent",
    "completed_at": "2026-04-01T12:00:00Z"
  },
  {
    "id": "slam",
    "name": "SLAM",
    "description": "Mapping",
    "reason": "navigation",
    "category": "model",
    "requested_by": "nav-agent",
    "votes": 1,
    "status": "wontfix",
    "reason_declined": "hardware lacks lidar"
  }
]"#;
    let items: Vec<WishlistItem> = serde_json::from_str(wishlist).unwrap();
    let reencoded: Vec<WishlistItem> =
        serde_json::from_str(&serde_json::to_string(&items).unwrap()).unwrap();
    assert_eq!(items, reencoded);
    assert_eq!(
        serde_json::to_value(&items).unwrap(),
        serde_json::from_str::<serde_json::Value>(wishlist).unwrap()
    );

    // parse from text: key order must follow the file
    let entry = serde_json::to_string(&catalog_entry(Some(usage()))).unwrap();
    let catalog = format!(
        r#"{{"updated":"2026-04-01T12:00:00Z","capabilities":{{"zeta":{entry},"alpha":{entry}}}}}"#
    );
    let doc: CatalogDocument = serde_json::from_str(&catalog).unwrap();
    let names: Vec<&String> = doc.capabilities.keys().collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        serde_json::from_str::<serde_json::Value>(&catalog).unwrap()
    );
}

#[test]
fn test_publish_bumps_updated_timestamp() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(temp_dir.path());
    let before = store.load_catalog().unwrap().updated;

    let registry = Registry::new(store);
    registry
        .publish_catalog_entry("yolo-segmentation", catalog_entry(Some(usage())))
        .unwrap();

    let store = registry.into_store().unwrap();
    assert!(store.load_catalog().unwrap().updated >= before);
    assert!(store.catalog_path().exists());
}

#[test]
fn test_rejected_publish_leaves_file_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let registry = Registry::new(JsonFileStore::in_dir(temp_dir.path()));

    assert!(registry
        .publish_catalog_entry("yolo-segmentation", catalog_entry(None))
        .is_err());
    assert!(!temp_dir.path().join("catalog.json").exists());
}
