// Repository layer for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::change_feed::RSVP_CREATED;
use crate::models::*;

/// Whether an error from a `Database` method is a Postgres unique-constraint
/// violation. Callers use this to turn insert races into domain conflicts
/// instead of opaque internal errors.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(&input.email)
        .bind(&input.name)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Auth sessions
    // ============================================

    pub async fn create_auth_session(&self, input: CreateAuthSession) -> Result<AuthSessionRow> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            INSERT INTO auth_sessions (user_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token, expires_at, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.token)
        .bind(input.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Resolve a session token, ignoring expired sessions
    pub async fn get_auth_session(&self, token: &str) -> Result<Option<AuthSessionRow>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT id, user_id, token, expires_at, created_at
            FROM auth_sessions
            WHERE token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_auth_session(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEvent) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (owner_user_id, title, slug, description, location,
                                start_at, end_at, cover_file_id, logo_file_id,
                                status, theme, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, owner_user_id, title, slug, description, location,
                      start_at, end_at, cover_file_id, logo_file_id,
                      status, theme, is_public, created_at, updated_at
            "#,
        )
        .bind(input.owner_user_id)
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.location)
        .bind(input.start_at)
        .bind(input.end_at)
        .bind(input.cover_file_id)
        .bind(input.logo_file_id)
        .bind(input.status.to_string())
        .bind(input.theme.to_string())
        .bind(input.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_user_id, title, slug, description, location,
                   start_at, end_at, cover_file_id, logo_file_id,
                   status, theme, is_public, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event_by_slug(&self, slug: &str) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_user_id, title, slug, description, location,
                   start_at, end_at, cover_file_id, logo_file_id,
                   status, theme, is_public, created_at, updated_at
            FROM events
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists.0)
    }

    pub async fn list_events_by_owner(&self, owner_user_id: Uuid) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_user_id, title, slug, description, location,
                   start_at, end_at, cover_file_id, logo_file_id,
                   status, theme, is_public, created_at, updated_at
            FROM events
            WHERE owner_user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Public events ascending by start time, with optional date-range and
    /// theme predicates
    pub async fn list_public_events(&self, filter: &DiscoverFilter) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, owner_user_id, title, slug, description, location,
                   start_at, end_at, cover_file_id, logo_file_id,
                   status, theme, is_public, created_at, updated_at
            FROM events
            WHERE is_public = TRUE
              AND ($1::timestamptz IS NULL OR start_at >= $1)
              AND ($2::timestamptz IS NULL OR start_at <= $2)
              AND ($3::text IS NULL OR theme = $3)
            ORDER BY start_at ASC
            "#,
        )
        .bind(filter.starts_after)
        .bind(filter.starts_before)
        .bind(filter.theme.map(|t| t.to_string()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ============================================
    // RSVPs
    // ============================================

    /// Persist an RSVP and append its creation notification to the change
    /// feed in the same transaction, so every stored RSVP has exactly one
    /// feed entry. Feed appends for one event are serialized with an
    /// advisory lock; concurrent submissions would otherwise race on
    /// MAX(sequence) + 1 and abort on the unique (event_id, sequence)
    /// constraint.
    pub async fn create_rsvp(&self, input: CreateRsvp) -> Result<(RsvpRow, RsvpEventRow)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(input.event_id.to_string())
            .execute(&mut *tx)
            .await?;

        let rsvp = sqlx::query_as::<_, RsvpRow>(
            r#"
            INSERT INTO rsvps (event_id, name, email, ticket_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, name, email, ticket_id, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.ticket_id)
        .fetch_one(&mut *tx)
        .await?;

        let data = serde_json::json!({
            "rsvp_id": rsvp.id,
            "event_id": rsvp.event_id,
            "name": rsvp.name,
        });

        let feed_entry = sqlx::query_as::<_, RsvpEventRow>(
            r#"
            INSERT INTO rsvp_events (event_id, sequence, event_type, data)
            VALUES ($1, COALESCE((SELECT MAX(sequence) + 1 FROM rsvp_events WHERE event_id = $1), 1), $2, $3)
            RETURNING id, event_id, sequence, event_type, data, created_at
            "#,
        )
        .bind(input.event_id)
        .bind(RSVP_CREATED)
        .bind(&data)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((rsvp, feed_entry))
    }

    /// RSVP count and latest change-feed sequence for an event, read in a
    /// single statement so both values come from one snapshot. Reading them
    /// separately can observe a commit in one but not the other, and a
    /// stream opened on that pair under-counts forever.
    pub async fn rsvp_counter_snapshot(&self, event_id: Uuid) -> Result<(i64, i32)> {
        let row: (i64, Option<i32>) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM rsvps WHERE event_id = $1),
                (SELECT MAX(sequence) FROM rsvp_events WHERE event_id = $1)
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.0, row.1.unwrap_or(0)))
    }

    pub async fn count_rsvps(&self, event_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rsvps WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    pub async fn get_rsvp_by_ticket(&self, ticket_id: &str) -> Result<Option<RsvpRow>> {
        let row = sqlx::query_as::<_, RsvpRow>(
            r#"
            SELECT id, event_id, name, email, ticket_id, created_at
            FROM rsvps
            WHERE ticket_id = $1
            "#,
        )
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // File storage
    // ============================================

    pub async fn create_file(&self, input: CreateFile) -> Result<FileMetaRow> {
        let size = input.data.len() as i64;
        let row = sqlx::query_as::<_, FileMetaRow>(
            r#"
            INSERT INTO files (bucket_id, filename, content_type, size_bytes, data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, bucket_id, filename, content_type, size_bytes, created_at
            "#,
        )
        .bind(&input.bucket_id)
        .bind(&input.filename)
        .bind(&input.content_type)
        .bind(size)
        .bind(&input.data)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_file(&self, bucket_id: &str, id: Uuid) -> Result<Option<FileRow>> {
        let row = sqlx::query_as::<_, FileRow>(
            r#"
            SELECT id, bucket_id, filename, content_type, size_bytes, data, created_at
            FROM files
            WHERE id = $1 AND bucket_id = $2
            "#,
        )
        .bind(id)
        .bind(bucket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Delete uploads older than `cutoff` that no event references. Returns
    /// the number of files removed.
    pub async fn delete_orphaned_files(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM files
            WHERE created_at < $1
              AND id NOT IN (
                  SELECT cover_file_id FROM events WHERE cover_file_id IS NOT NULL
                  UNION
                  SELECT logo_file_id FROM events WHERE logo_file_id IS NOT NULL
              )
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
