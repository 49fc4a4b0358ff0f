//! Wishlist core: capability wishlist and catalog registry, plus the client
//! SDK conformance checker.
//!
//! Frontend/skill agents file wishlist items for capabilities that do not
//! exist yet; backend/service agents claim, build and publish them to the
//! catalog. Every published capability ships a hand-written HTTP client,
//! which [`conformance`] checks against the sandbox SDK rules.

pub mod config;
pub mod conformance;
pub mod error;
pub mod registry;
pub mod store;

pub use error::{RegistryError, Result};
pub use registry::Registry;
