// Postgres storage layer with sqlx
//
// This crate provides the typed database layer for Eventola:
// - Database: pooled connection handle with one method per query
// - Row/Create structs per table (internal, may differ from public DTOs)
// - change_feed: RSVP creation notifications with per-event sequence numbers
// - provision: run-once administrative schema/bucket provisioning steps
// - password: argon2 hashing for account credentials

pub mod change_feed;
pub mod models;
pub mod password;
pub mod provision;
pub mod repositories;

pub use change_feed::{ChangeFeed, RSVP_CREATED};
pub use models::*;
pub use password::{hash_password, verify_password};
pub use provision::{run_provisioning, ProvisionReport};
pub use repositories::{is_unique_violation, Database};
