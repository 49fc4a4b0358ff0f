//! Wishlist CLI commands
//!
//! Requesters file and upvote items; fulfillers claim, complete or decline
//! them. Every command is a single registry operation.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use wishlist_core::registry::{Status, Submission, TransitionExtra, WishlistDraft, WishlistItem};
use wishlist_core::store::JsonFileStore;
use wishlist_core::Registry;

/// Wishlist subcommand
#[derive(Parser, Debug)]
pub struct WishCommand {
    #[clap(subcommand)]
    pub command: WishSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum WishSubcommand {
    /// File a new wishlist item
    Add {
        /// Unique slug, e.g. camera-aliases
        id: String,

        /// One of: api, sdk, model, service, infra
        #[clap(long)]
        category: String,

        #[clap(long, default_value = "")]
        name: String,

        #[clap(long, default_value = "")]
        description: String,

        /// Why the capability is needed
        #[clap(long, default_value = "")]
        reason: String,

        /// Requesting agent
        #[clap(long = "by")]
        requested_by: String,

        /// Count an existing id as an upvote instead of failing
        #[clap(long)]
        upvote_existing: bool,
    },

    /// Add a vote to an item
    Upvote { id: String },

    /// Claim a pending item (pending -> building)
    Claim {
        id: String,

        /// Claiming agent
        #[clap(long)]
        agent: String,
    },

    /// Release a claimed item (building -> pending)
    Unclaim {
        id: String,

        #[clap(long)]
        actor: String,
    },

    /// Mark a claimed item done (building -> done)
    Done {
        id: String,

        #[clap(long)]
        actor: String,

        /// Completion time, RFC 3339 (defaults to now)
        #[clap(long)]
        completed_at: Option<DateTime<Utc>>,
    },

    /// Decline an item (pending/building -> wontfix)
    Decline {
        id: String,

        #[clap(long)]
        actor: String,

        #[clap(long)]
        reason: String,
    },

    /// Pending items, most-voted first
    Pending {
        /// Keep submission order instead of sorting by votes
        #[clap(long)]
        submission_order: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// All items, optionally filtered by status
    List {
        /// pending, building, done or wontfix
        #[clap(long)]
        status: Option<String>,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show one item as JSON
    Show { id: String },

    /// Delete an item
    Remove { id: String },
}

impl WishCommand {
    pub fn execute(self, registry: &Registry<JsonFileStore>) -> Result<()> {
        match self.command {
            WishSubcommand::Add {
                id,
                category,
                name,
                description,
                reason,
                requested_by,
                upvote_existing,
            } => {
                let draft = WishlistDraft::new(id, category)
                    .name(name)
                    .description(description)
                    .reason(reason)
                    .requested_by(requested_by);
                if upvote_existing {
                    match registry.submit_or_upvote(draft)? {
                        Submission::Created(item) => println!("Filed '{}'", item.id),
                        Submission::Upvoted(item) => {
                            println!("'{}' already filed, upvoted to {}", item.id, item.votes)
                        }
                    }
                } else {
                    let item = registry.create_wishlist_item(draft)?;
                    println!("Filed '{}'", item.id);
                }
                Ok(())
            }
            WishSubcommand::Upvote { id } => {
                let item = registry.upvote(&id)?;
                println!("'{}' now has {} votes", item.id, item.votes);
                Ok(())
            }
            WishSubcommand::Claim { id, agent } => {
                let extra = TransitionExtra::assigned(agent.clone());
                let item = registry.transition(&id, Status::Building, &agent, extra)?;
                print_status(&item);
                Ok(())
            }
            WishSubcommand::Unclaim { id, actor } => {
                let item =
                    registry.transition(&id, Status::Pending, &actor, TransitionExtra::default())?;
                print_status(&item);
                Ok(())
            }
            WishSubcommand::Done {
                id,
                actor,
                completed_at,
            } => {
                let extra = TransitionExtra::completed_at(completed_at.unwrap_or_else(Utc::now));
                let item = registry.transition(&id, Status::Done, &actor, extra)?;
                print_status(&item);
                Ok(())
            }
            WishSubcommand::Decline { id, actor, reason } => {
                let extra = TransitionExtra::declined(reason);
                let item = registry.transition(&id, Status::Wontfix, &actor, extra)?;
                print_status(&item);
                Ok(())
            }
            WishSubcommand::Pending {
                submission_order,
                json,
            } => {
                let items = registry.list_pending(!submission_order)?;
                print_items(&items, json)
            }
            WishSubcommand::List { status, json } => {
                let status = status.map(|s| s.parse::<Status>()).transpose()?;
                let items = registry.list_wishlist(status)?;
                print_items(&items, json)
            }
            WishSubcommand::Show { id } => {
                let item = registry.get_wishlist_item(&id)?;
                println!("{}", serde_json::to_string_pretty(&item)?);
                Ok(())
            }
            WishSubcommand::Remove { id } => {
                let item = registry.remove_wishlist_item(&id)?;
                println!("Removed '{}'", item.id);
                Ok(())
            }
        }
    }
}

fn print_status(item: &WishlistItem) {
    match &item.assigned {
        Some(agent) => println!("'{}' is {} ({agent})", item.id, item.status),
        None => println!("'{}' is {}", item.id, item.status),
    }
}

/// Table row for wishlist listings
#[derive(Tabled)]
struct WishRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Votes")]
    votes: u64,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Assigned")]
    assigned: String,
    #[tabled(rename = "Requested by")]
    requested_by: String,
}

fn print_items(items: &[WishlistItem], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("No wishlist items.");
        return Ok(());
    }

    let table_rows: Vec<WishRow> = items
        .iter()
        .map(|item| WishRow {
            id: item.id.clone(),
            votes: item.votes,
            category: item.category.to_string(),
            status: item.status.to_string(),
            assigned: item.assigned.clone().unwrap_or_default(),
            requested_by: item.requested_by.clone(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    Ok(())
}
