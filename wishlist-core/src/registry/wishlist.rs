//! Wishlist records and the status lifecycle
//!
//! ```text
//!            assigned              completed_at
//!   pending ─────────► building ───────────────► done
//!      ▲                  │
//!      └──── unclaim ─────┤
//!      │                  │ reason_declined
//!      └──────────────────┴─────────────────────► wontfix
//! ```
//!
//! `done` and `wontfix` are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RegistryError, Result};

/// What kind of capability is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Api,
    Sdk,
    Model,
    Service,
    Infra,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Api => "api",
            Category::Sdk => "sdk",
            Category::Model => "model",
            Category::Service => "service",
            Category::Infra => "infra",
        }
    }
}

impl FromStr for Category {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "api" => Ok(Category::Api),
            "sdk" => Ok(Category::Sdk),
            "model" => Ok(Category::Model),
            "service" => Ok(Category::Service),
            "infra" => Ok(Category::Infra),
            other => Err(RegistryError::InvalidCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a wishlist item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Building,
    Done,
    Wontfix,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Building => "building",
            Status::Done => "done",
            Status::Wontfix => "wontfix",
        }
    }

    /// No transitions leave a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Done | Status::Wontfix)
    }
}

impl FromStr for Status {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "pending" => Ok(Status::Pending),
            "building" => Ok(Status::Building),
            "done" => Ok(Status::Done),
            "wontfix" => Ok(Status::Wontfix),
            other => Err(RegistryError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked request for a capability that is not available yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Unique slug, e.g. `camera-aliases`
    pub id: String,
    pub name: String,
    pub description: String,
    pub reason: String,
    pub category: Category,
    /// Agent that filed the request
    pub requested_by: String,
    pub votes: u64,
    pub status: Status,
    /// Claiming agent, present from `building` onwards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_declined: Option<String>,
}

/// Input to `create_wishlist_item`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistDraft {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reason: String,
    /// Validated against the fixed category set on creation
    pub category: String,
    #[serde(default)]
    pub requested_by: String,
}

impl WishlistDraft {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn requested_by(mut self, agent: impl Into<String>) -> Self {
        self.requested_by = agent.into();
        self
    }
}

/// Fields supplied alongside a status transition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_declined: Option<String>,
}

impl TransitionExtra {
    pub fn assigned(agent: impl Into<String>) -> Self {
        Self {
            assigned: Some(agent.into()),
            ..Default::default()
        }
    }

    pub fn completed_at(at: DateTime<Utc>) -> Self {
        Self {
            completed_at: Some(at),
            ..Default::default()
        }
    }

    pub fn declined(reason: impl Into<String>) -> Self {
        Self {
            reason_declined: Some(reason.into()),
            ..Default::default()
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl WishlistItem {
    /// Build a fresh pending item from a draft
    pub fn from_draft(draft: WishlistDraft) -> Result<Self> {
        let id = draft.id.trim().to_string();
        if id.is_empty() {
            return Err(RegistryError::MissingField("id"));
        }
        let category = draft.category.parse::<Category>()?;

        Ok(Self {
            id,
            name: draft.name,
            description: draft.description,
            reason: draft.reason,
            category,
            requested_by: draft.requested_by,
            votes: 1,
            status: Status::Pending,
            assigned: None,
            completed_at: None,
            reason_declined: None,
        })
    }

    /// Apply a status change in place.
    ///
    /// The item is left untouched when the move is rejected.
    pub fn apply_transition(&mut self, to: Status, extra: &TransitionExtra) -> Result<()> {
        let from = self.status;
        match (from, to) {
            (Status::Pending, Status::Building) => {
                let agent = non_blank(&extra.assigned).ok_or(RegistryError::MissingField("assigned"))?;
                self.assigned = Some(agent.to_string());
            }
            (Status::Building, Status::Done) => {
                let at = extra
                    .completed_at
                    .ok_or(RegistryError::MissingField("completed_at"))?;
                self.completed_at = Some(at);
            }
            (Status::Building, Status::Pending) => {
                self.assigned = None;
            }
            (Status::Pending, Status::Wontfix) | (Status::Building, Status::Wontfix) => {
                let reason = non_blank(&extra.reason_declined)
                    .ok_or(RegistryError::MissingField("reason_declined"))?;
                self.reason_declined = Some(reason.to_string());
            }
            _ => return Err(RegistryError::InvalidTransition { from, to }),
        }

        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pending_item() -> WishlistItem {
        WishlistItem::from_draft(
            WishlistDraft::new("camera-aliases", "sdk")
                .name("Camera aliases")
                .requested_by("skill-agent"),
        )
        .unwrap()
    }

    #[test]
    fn test_from_draft_defaults() {
        let item = pending_item();
        assert_eq!(item.votes, 1);
        assert_eq!(item.status, Status::Pending);
        assert_eq!(item.category, Category::Sdk);
        assert!(item.assigned.is_none());
        assert!(item.completed_at.is_none());
    }

    #[test]
    fn test_from_draft_rejects_blank_id() {
        let err = WishlistItem::from_draft(WishlistDraft::new("  ", "api")).unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("id")));
    }

    #[test]
    fn test_from_draft_rejects_unknown_category() {
        let err = WishlistItem::from_draft(WishlistDraft::new("x", "hardware")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCategory(c) if c == "hardware"));
    }

    #[test]
    fn test_claim_requires_assignee() {
        let mut item = pending_item();
        let err = item
            .apply_transition(Status::Building, &TransitionExtra::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("assigned")));
        assert_eq!(item.status, Status::Pending);

        let err = item
            .apply_transition(Status::Building, &TransitionExtra::assigned("   "))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingField("assigned")));
    }

    #[test]
    fn test_unclaim_clears_assignee() {
        let mut item = pending_item();
        item.apply_transition(Status::Building, &TransitionExtra::assigned("steve"))
            .unwrap();
        item.apply_transition(Status::Pending, &TransitionExtra::default())
            .unwrap();
        assert_eq!(item.status, Status::Pending);
        assert_eq!(item.assigned, None);
    }

    #[test]
    fn test_done_keeps_assignee() {
        let mut item = pending_item();
        let at = Utc::now();
        item.apply_transition(Status::Building, &TransitionExtra::assigned("steve"))
            .unwrap();
        item.apply_transition(Status::Done, &TransitionExtra::completed_at(at))
            .unwrap();
        assert_eq!(item.assigned.as_deref(), Some("steve"));
        assert_eq!(item.completed_at, Some(at));
    }

    #[test]
    fn test_pending_cannot_skip_to_done() {
        let mut item = pending_item();
        let err = item
            .apply_transition(Status::Done, &TransitionExtra::completed_at(Utc::now()))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidTransition {
                from: Status::Pending,
                to: Status::Done
            }
        ));
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let all = [Status::Pending, Status::Building, Status::Done, Status::Wontfix];
        let extra = TransitionExtra {
            assigned: Some("a".into()),
            completed_at: Some(Utc::now()),
            reason_declined: Some("r".into()),
        };

        let mut declined = pending_item();
        declined
            .apply_transition(Status::Wontfix, &TransitionExtra::declined("out of scope"))
            .unwrap();
        assert!(declined.status.is_terminal());

        for to in all {
            let mut item = declined.clone();
            let err = item.apply_transition(to, &extra).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidTransition { .. }));
            assert_eq!(item, declined);
        }
    }

    #[test]
    fn test_category_and_status_wire_names() {
        assert_eq!(serde_json::to_string(&Category::Infra).unwrap(), "\"infra\"");
        assert_eq!(serde_json::to_string(&Status::Wontfix).unwrap(), "\"wontfix\"");
        assert_eq!("building".parse::<Status>().unwrap(), Status::Building);
        assert!("closed".parse::<Status>().is_err());
    }
}
