//! Registry error types with clear, actionable messages

use thiserror::Error;

use crate::registry::Status;

/// Errors surfaced by registry operations and record stores
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A wishlist item with this id already exists
    #[error("Wishlist item already exists: {0}\n\nUpvote the existing item instead of filing it again.")]
    DuplicateId(String),

    /// A capability with this name is already in the catalog
    #[error("Capability already published: {0}\n\nUse `catalog update` to replace the entry and bump its version.")]
    DuplicateCapability(String),

    /// No wishlist item or capability with this key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category outside {api, sdk, model, service, infra}
    #[error("Invalid category '{0}' (expected one of: api, sdk, model, service, infra)")]
    InvalidCategory(String),

    /// Status string outside {pending, building, done, wontfix}
    #[error("Invalid status '{0}' (expected one of: pending, building, done, wontfix)")]
    InvalidStatus(String),

    /// Requested status change is not a legal move from the current state
    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    /// A field required by the operation was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Catalog entry lacks the usage block, or one of its fields is blank
    #[error("Capability '{name}' is missing its usage block ({field})\n\nEvery catalog entry must document usage.import, usage.init, usage.example and usage.returns.")]
    MissingUsageBlock { name: String, field: &'static str },

    /// Catalog entry version is not a semantic version
    #[error("Invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    /// Stored version cannot be bumped further
    #[error("Cannot bump version '{0}': patch component is at its maximum")]
    VersionExhausted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Atomic replace of a document failed
    #[error("Failed to persist document: {0}")]
    Persist(#[from] tempfile::PersistError),

    /// Another caller panicked while holding the registry lock
    #[error("Registry lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    /// True for validation failures the caller can react to
    /// (as opposed to storage faults)
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            RegistryError::Io(_)
                | RegistryError::Json(_)
                | RegistryError::Persist(_)
                | RegistryError::LockPoisoned
        )
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_vs_storage_errors() {
        assert!(RegistryError::DuplicateId("lidar-api".into()).is_validation());
        assert!(RegistryError::InvalidTransition {
            from: Status::Done,
            to: Status::Pending,
        }
        .is_validation());
        assert!(!RegistryError::LockPoisoned.is_validation());

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!RegistryError::from(io).is_validation());
    }

    #[test]
    fn test_transition_message_names_both_states() {
        let err = RegistryError::InvalidTransition {
            from: Status::Pending,
            to: Status::Done,
        };
        assert_eq!(err.to_string(), "Invalid transition: pending -> done");
    }
}
