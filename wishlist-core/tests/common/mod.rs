//! Test helpers shared across integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Once;
use wishlist_core::registry::{CapabilityType, CatalogEntry, Usage, WishlistDraft};

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn draft(id: &str, category: &str) -> WishlistDraft {
    WishlistDraft::new(id, category)
        .name(id.replace('-', " "))
        .description(format!("Need {id}"))
        .reason("blocks a skill")
        .requested_by("skill-agent")
}

pub fn usage() -> Usage {
    Usage {
        import: "from yolo_seg_client import YoloSegClient".to_string(),
        init: "client = YoloSegClient()".to_string(),
        example: "masks = client.segment(\"frame.jpg\")".to_string(),
        returns: "list of {label, score, polygon}".to_string(),
    }
}

pub fn catalog_entry(usage: Option<Usage>) -> CatalogEntry {
    CatalogEntry {
        kind: CapabilityType::Model,
        description: "YOLO instance segmentation".to_string(),
        host: "http://10.0.0.5:8000".to_string(),
        endpoints: vec![
            "GET /health".to_string(),
            "POST /segment".to_string(),
        ],
        client_sdk: "https://git.example.org/yolo-seg/blob/main/client.py".to_string(),
        service_repo: "https://git.example.org/yolo-seg".to_string(),
        api_docs: "https://git.example.org/yolo-seg/blob/main/API.md".to_string(),
        version: "1.0.0".to_string(),
        added_by: "backend-agent".to_string(),
        added_at: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
        usage,
    }
}
