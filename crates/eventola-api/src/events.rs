// Event routes: creation, dashboard listing, public microsite lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use eventola_core::{
    event::{demo_theme, DEMO_SLUG},
    slugify, Event, EventForm, Theme, BUCKET_COVERS, BUCKET_LOGOS,
};
use eventola_storage::{CreateEvent, Database, EventRow};

use crate::auth::require_user;
use crate::common::{ListResponse, ValidationErrorResponse};

/// App state for event routes
#[derive(Clone)]
pub struct EventsState {
    pub db: Arc<Database>,
}

impl EventsState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Public microsite view of an event
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventPublic {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub location: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub theme: Theme,
    pub rsvp_count: i64,
}

pub fn file_url(bucket_id: &str, file_id: Uuid) -> String {
    format!("/v1/files/{}/{}", bucket_id, file_id)
}

impl EventPublic {
    pub fn from_row(row: EventRow, rsvp_count: i64) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            location: row.location,
            start_at: row.start_at,
            end_at: row.end_at,
            cover_url: row
                .cover_file_id
                .map(|id| file_url(BUCKET_COVERS.id, id)),
            logo_url: row.logo_file_id.map(|id| file_url(BUCKET_LOGOS.id, id)),
            theme: Theme::from(row.theme.as_str()),
            rsvp_count,
        }
    }
}

/// Create event routes
pub fn routes(state: EventsState) -> Router {
    Router::new()
        .route("/v1/events", post(create_event).get(list_events))
        .route("/v1/events/:slug", get(get_event_by_slug))
        .with_state(state)
}

/// POST /v1/events - Create a new event
#[utoipa::path(
    post,
    path = "/v1/events",
    request_body = EventForm,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Slug already taken"),
        (status = 422, description = "Validation errors", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<EventsState>,
    jar: CookieJar,
    Json(form): Json<EventForm>,
) -> Result<(StatusCode, Json<Event>), Response> {
    let user = require_user(&state.db, &jar)
        .await
        .map_err(IntoResponse::into_response)?;

    let errors = form.validate();
    if !errors.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationErrorResponse::new(errors)),
        )
            .into_response());
    }
    // validate() guarantees both times parse
    let (start_at, end_at) = form.timestamps().ok_or_else(|| {
        tracing::error!("Validated form failed timestamp conversion");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })?;

    // Fast-path check; the unique index still decides under concurrency
    let slug = slugify(&form.title);
    let taken = state.db.slug_exists(&slug).await.map_err(|e| {
        tracing::error!("Failed to check slug: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })?;
    if taken {
        return Err(slug_conflict(&slug));
    }

    let row = state
        .db
        .create_event(CreateEvent {
            owner_user_id: user.id,
            title: form.title.trim().to_string(),
            slug: slug.clone(),
            description: form.description.trim().to_string(),
            location: form.location.trim().to_string(),
            start_at,
            end_at,
            cover_file_id: form.cover_file_id,
            logo_file_id: form.logo_file_id,
            status: form.status,
            theme: form.theme,
            is_public: form.is_public,
        })
        .await
        .map_err(|e| {
            // Two concurrent creations of the same title can both pass the
            // pre-check; the loser lands here on the unique slug index
            if eventola_storage::is_unique_violation(&e) {
                return slug_conflict(&slug);
            }
            tracing::error!("Failed to create event: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    Ok((StatusCode::CREATED, Json(Event::from(row))))
}

fn slug_conflict(slug: &str) -> Response {
    (
        StatusCode::CONFLICT,
        format!("An event with slug '{}' already exists", slug),
    )
        .into_response()
}

/// GET /v1/events - List events owned by the caller
#[utoipa::path(
    get,
    path = "/v1/events",
    responses(
        (status = 200, description = "Events owned by the caller", body = [Event]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<EventsState>,
    jar: CookieJar,
) -> Result<Json<ListResponse<Event>>, StatusCode> {
    let user = require_user(&state.db, &jar).await?;

    let rows = state.db.list_events_by_owner(user.id).await.map_err(|e| {
        tracing::error!("Failed to list events: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let events = rows.into_iter().map(Event::from).collect();
    Ok(Json(ListResponse::new(events)))
}

/// GET /v1/events/{slug} - Public microsite payload for an event
#[utoipa::path(
    get,
    path = "/v1/events/{slug}",
    params(
        ("slug" = String, Path, description = "Event slug")
    ),
    responses(
        (status = 200, description = "Event found", body = EventPublic),
        (status = 404, description = "No event with that slug"),
        (status = 500, description = "Internal server error")
    ),
    tag = "events"
)]
pub async fn get_event_by_slug(
    State(state): State<EventsState>,
    Path(slug): Path<String>,
) -> Result<Json<EventPublic>, StatusCode> {
    if slug == DEMO_SLUG {
        return Ok(Json(demo_event(Utc::now())));
    }

    let row = state
        .db
        .get_event_by_slug(&slug)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event by slug: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let rsvp_count = state.db.count_rsvps(row.id).await.map_err(|e| {
        tracing::error!("Failed to count RSVPs: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(EventPublic::from_row(row, rsvp_count)))
}

/// Synthetic showcase event served under the reserved demo slug. Never
/// persisted; the theme rotates with the calendar day.
fn demo_event(now: DateTime<Utc>) -> EventPublic {
    let start_at = (now + chrono::Duration::days(14))
        .date_naive()
        .and_hms_opt(18, 0, 0)
        .expect("valid time of day")
        .and_utc();
    EventPublic {
        id: Uuid::nil(),
        title: "Demo Launch Party".to_string(),
        slug: DEMO_SLUG.to_string(),
        description: "A look at what your event microsite could be. Create an \
                      account to publish your own page, collect RSVPs, and \
                      watch the attendee counter climb."
            .to_string(),
        location: "The Grand Hall, 123 Main Street".to_string(),
        start_at,
        end_at: start_at + chrono::Duration::hours(4),
        cover_url: None,
        logo_url: None,
        theme: demo_theme(now),
        rsvp_count: 1337,
    }
}
