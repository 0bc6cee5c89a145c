// Public event discovery listing

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Duration, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use eventola_core::Theme;
use eventola_storage::{Database, DiscoverFilter, EventRow};

use crate::common::ListResponse;
use crate::events::EventPublic;

/// App state for discover routes
#[derive(Clone)]
pub struct DiscoverState {
    pub db: Arc<Database>,
}

impl DiscoverState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Date-range preset for the discover listing
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

/// Query parameters for the discover listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct DiscoverQuery {
    /// Date range preset: all, today, week, or month
    #[serde(default)]
    pub date: DateRange,
    /// Exact theme filter
    pub theme: Option<Theme>,
    /// Free-text match against title and description
    pub q: Option<String>,
    /// Substring match against location
    pub location: Option<String>,
}

impl DiscoverQuery {
    /// Server-side predicates; free-text filters stay in-process.
    fn filter(&self, now: chrono::DateTime<Utc>) -> DiscoverFilter {
        let today = Utc
            .with_ymd_and_hms(now.year(), now.month(), now.day(), 0, 0, 0)
            .single()
            .unwrap_or(now);
        let (starts_after, starts_before) = match self.date {
            DateRange::All => (None, None),
            DateRange::Today => (Some(today), Some(today + Duration::days(1))),
            DateRange::Week => (Some(today), Some(today + Duration::days(7))),
            DateRange::Month => (Some(today), Some(today + Duration::days(31))),
        };
        DiscoverFilter {
            starts_after,
            starts_before,
            theme: self.theme,
        }
    }
}

fn matches_text_filters(row: &EventRow, query: &DiscoverQuery) -> bool {
    if let Some(q) = query.q.as_deref() {
        let q = q.to_lowercase();
        if !q.is_empty()
            && !row.title.to_lowercase().contains(&q)
            && !row.description.to_lowercase().contains(&q)
        {
            return false;
        }
    }
    if let Some(loc) = query.location.as_deref() {
        let loc = loc.to_lowercase();
        if !loc.is_empty() && !row.location.to_lowercase().contains(&loc) {
            return false;
        }
    }
    true
}

/// Create discover routes
pub fn routes(state: DiscoverState) -> Router {
    Router::new()
        .route("/v1/discover", get(discover))
        .with_state(state)
}

/// GET /v1/discover - Browse public events
#[utoipa::path(
    get,
    path = "/v1/discover",
    params(DiscoverQuery),
    responses(
        (status = 200, description = "Public events, soonest first", body = [EventPublic]),
        (status = 500, description = "Internal server error")
    ),
    tag = "discover"
)]
pub async fn discover(
    State(state): State<DiscoverState>,
    Query(query): Query<DiscoverQuery>,
) -> Result<Json<ListResponse<EventPublic>>, StatusCode> {
    let filter = query.filter(Utc::now());
    let rows = state.db.list_public_events(&filter).await.map_err(|e| {
        tracing::error!("Failed to list public events: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let mut events = Vec::new();
    for row in rows {
        if !matches_text_filters(&row, &query) {
            continue;
        }
        let rsvp_count = state.db.count_rsvps(row.id).await.map_err(|e| {
            tracing::error!("Failed to count RSVPs: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        events.push(EventPublic::from_row(row, rsvp_count));
    }

    Ok(Json(ListResponse::new(events)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn sample_row() -> EventRow {
        let now: DateTime<Utc> = Utc::now();
        EventRow {
            id: Uuid::nil(),
            owner_user_id: Uuid::nil(),
            title: "Rustacean Meetup".to_string(),
            slug: "rustacean-meetup".to_string(),
            description: "Lightning talks and pizza.".to_string(),
            location: "Community Hall, Springfield".to_string(),
            start_at: now,
            end_at: now,
            cover_file_id: None,
            logo_file_id: None,
            status: "published".to_string(),
            theme: "minimal".to_string(),
            is_public: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_query_defaults() {
        let query: DiscoverQuery = serde_urlencoded::from_str("").unwrap();
        assert_eq!(query.date, DateRange::All);
        assert!(query.theme.is_none());
    }

    #[test]
    fn test_query_parses_all_params() {
        let query: DiscoverQuery =
            serde_urlencoded::from_str("date=week&theme=quantum&q=rust&location=springfield")
                .unwrap();
        assert_eq!(query.date, DateRange::Week);
        assert_eq!(query.theme, Some(Theme::Quantum));
        assert_eq!(query.q.as_deref(), Some("rust"));
    }

    #[test]
    fn test_date_presets_bound_the_window() {
        let now = Utc::now();
        let query = DiscoverQuery {
            date: DateRange::Today,
            ..Default::default()
        };
        let filter = query.filter(now);
        let after = filter.starts_after.unwrap();
        let before = filter.starts_before.unwrap();
        assert_eq!(before - after, Duration::days(1));

        let all = DiscoverQuery::default().filter(now);
        assert!(all.starts_after.is_none());
        assert!(all.starts_before.is_none());
    }

    #[test]
    fn test_text_filter_matches_title_or_description() {
        let row = sample_row();
        let mut query = DiscoverQuery::default();
        query.q = Some("PIZZA".to_string());
        assert!(matches_text_filters(&row, &query));
        query.q = Some("opera".to_string());
        assert!(!matches_text_filters(&row, &query));
    }

    #[test]
    fn test_location_filter_is_substring() {
        let row = sample_row();
        let mut query = DiscoverQuery::default();
        query.location = Some("springfield".to_string());
        assert!(matches_text_filters(&row, &query));
        query.location = Some("shelbyville".to_string());
        assert!(!matches_text_filters(&row, &query));
    }
}
