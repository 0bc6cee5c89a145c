// RSVP routes: anonymous submission, plain count, ticket lookup

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use eventola_core::{new_ticket_id, qr_image_url, RsvpForm};
use eventola_storage::{CreateRsvp, Database};

use crate::common::ValidationErrorResponse;

/// App state for RSVP routes
#[derive(Clone)]
pub struct RsvpsState {
    pub db: Arc<Database>,
}

impl RsvpsState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Response to a successful RSVP submission. The ticket id drives the
/// confirmation redirect.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RsvpCreated {
    pub id: Uuid,
    pub event_id: Uuid,
    pub ticket_id: String,
    /// Position of this reservation in the event's change feed
    pub sequence: i32,
}

/// Current reservation count for an event
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RsvpCount {
    pub event_id: Uuid,
    pub count: i64,
}

/// Ticket payload: the reservation plus enough event context to render a pass
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketResponse {
    pub ticket_id: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub event_title: String,
    pub event_slug: String,
    pub event_location: String,
    pub event_start_at: DateTime<Utc>,
    pub qr_url: String,
    pub created_at: DateTime<Utc>,
}

/// Create RSVP routes
pub fn routes(state: RsvpsState) -> Router {
    Router::new()
        .route("/v1/events/:event_id/rsvps", post(create_rsvp))
        .route("/v1/events/:event_id/rsvps/count", get(count_rsvps))
        .route("/v1/tickets/:ticket_id", get(get_ticket))
        .with_state(state)
}

/// POST /v1/events/{event_id}/rsvps - Reserve a spot (no account needed)
#[utoipa::path(
    post,
    path = "/v1/events/{event_id}/rsvps",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = RsvpForm,
    responses(
        (status = 201, description = "Reservation created", body = RsvpCreated),
        (status = 404, description = "Event not found"),
        (status = 422, description = "Validation errors", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "rsvps"
)]
pub async fn create_rsvp(
    State(state): State<RsvpsState>,
    Path(event_id): Path<Uuid>,
    Json(form): Json<RsvpForm>,
) -> Result<(StatusCode, Json<RsvpCreated>), Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ValidationErrorResponse::new(errors)),
        )
            .into_response());
    }

    let event = state
        .db
        .get_event(event_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?
        .ok_or_else(|| StatusCode::NOT_FOUND.into_response())?;

    let (rsvp, feed_entry) = state
        .db
        .create_rsvp(CreateRsvp {
            event_id: event.id,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            ticket_id: new_ticket_id(),
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create RSVP: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RsvpCreated {
            id: rsvp.id,
            event_id: rsvp.event_id,
            ticket_id: rsvp.ticket_id,
            sequence: feed_entry.sequence,
        }),
    ))
}

/// GET /v1/events/{event_id}/rsvps/count - Current reservation count
#[utoipa::path(
    get,
    path = "/v1/events/{event_id}/rsvps/count",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Current count", body = RsvpCount),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rsvps"
)]
pub async fn count_rsvps(
    State(state): State<RsvpsState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<RsvpCount>, StatusCode> {
    let event = state
        .db
        .get_event(event_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let count = state.db.count_rsvps(event.id).await.map_err(|e| {
        tracing::error!("Failed to count RSVPs: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(RsvpCount {
        event_id: event.id,
        count,
    }))
}

/// GET /v1/tickets/{ticket_id} - Look up a reservation by its ticket id
#[utoipa::path(
    get,
    path = "/v1/tickets/{ticket_id}",
    params(
        ("ticket_id" = String, Path, description = "Opaque ticket identifier")
    ),
    responses(
        (status = 200, description = "Ticket found", body = TicketResponse),
        (status = 404, description = "No reservation with that ticket"),
        (status = 500, description = "Internal server error")
    ),
    tag = "rsvps"
)]
pub async fn get_ticket(
    State(state): State<RsvpsState>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, StatusCode> {
    let rsvp = state
        .db
        .get_rsvp_by_ticket(&ticket_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up ticket: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let event = state
        .db
        .get_event(rsvp.event_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get event for ticket: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let qr_url = qr_image_url(&rsvp.ticket_id);
    Ok(Json(TicketResponse {
        ticket_id: rsvp.ticket_id,
        attendee_name: rsvp.name,
        attendee_email: rsvp.email,
        event_title: event.title,
        event_slug: event.slug,
        event_location: event.location,
        event_start_at: event.start_at,
        qr_url,
        created_at: rsvp.created_at,
    }))
}
