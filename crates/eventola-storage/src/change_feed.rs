//! RSVP change feed
//!
//! Every persisted RSVP appends a notification row with an auto-incrementing
//! sequence number scoped to its event. The live attendee counter streams
//! these rows over SSE; the sequence number lets clients detect gaps and
//! resume from an offset instead of trusting a blind local increment.

use anyhow::Result;
use uuid::Uuid;

use crate::models::RsvpEventRow;
use crate::repositories::Database;

/// Event type recorded when an RSVP document is created
pub const RSVP_CREATED: &str = "rsvp.created";

/// Read side of the RSVP change feed
#[derive(Clone)]
pub struct ChangeFeed {
    db: Database,
}

impl ChangeFeed {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List feed entries for an event with sequence greater than `since`,
    /// oldest first
    pub async fn list_since(&self, event_id: Uuid, since: i32) -> Result<Vec<RsvpEventRow>> {
        let rows = sqlx::query_as::<_, RsvpEventRow>(
            r#"
            SELECT id, event_id, sequence, event_type, data, created_at
            FROM rsvp_events
            WHERE event_id = $1 AND sequence > $2
            ORDER BY sequence ASC
            "#,
        )
        .bind(event_id)
        .bind(since)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }
}
