// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use eventola_core::{Event, EventStatus, Rsvp, Theme};

// ============================================
// Auth models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct AuthSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuthSession {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// ============================================
// Event models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub cover_file_id: Option<Uuid>,
    pub logo_file_id: Option<Uuid>,
    pub status: String,
    pub theme: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Event {
            id: row.id,
            owner_user_id: row.owner_user_id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            location: row.location,
            start_at: row.start_at,
            end_at: row.end_at,
            cover_file_id: row.cover_file_id,
            logo_file_id: row.logo_file_id,
            status: EventStatus::from(row.status.as_str()),
            theme: Theme::from(row.theme.as_str()),
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub owner_user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub cover_file_id: Option<Uuid>,
    pub logo_file_id: Option<Uuid>,
    pub status: EventStatus,
    pub theme: Theme,
    pub is_public: bool,
}

/// Server-side predicates for the discover listing. Free-text and location
/// substring filtering happen in-process, not here.
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilter {
    pub starts_after: Option<DateTime<Utc>>,
    pub starts_before: Option<DateTime<Utc>>,
    pub theme: Option<Theme>,
}

// ============================================
// RSVP models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RsvpRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub ticket_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<RsvpRow> for Rsvp {
    fn from(row: RsvpRow) -> Self {
        Rsvp {
            id: row.id,
            event_id: row.event_id,
            name: row.name,
            email: row.email,
            ticket_id: row.ticket_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateRsvp {
    pub event_id: Uuid,
    pub name: String,
    pub email: String,
    pub ticket_id: String,
}

// ============================================
// Change feed models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct RsvpEventRow {
    pub id: Uuid,
    pub event_id: Uuid,
    pub sequence: i32,
    pub event_type: String,
    pub data: sqlx::types::JsonValue,
    pub created_at: DateTime<Utc>,
}

// ============================================
// File storage models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct FileRow {
    pub id: Uuid,
    pub bucket_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// File metadata without the payload, for listings and existence checks
#[derive(Debug, Clone, FromRow)]
pub struct FileMetaRow {
    pub id: Uuid,
    pub bucket_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFile {
    pub bucket_id: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
