// Eventola API server
// Decision: Cookie-based sessions for the dashboard, everything public stays
// anonymous (microsites, RSVPs, tickets, discover)

mod auth;
mod common;
mod copy;
mod discover;
mod events;
mod files;
mod janitor;
mod live;
mod rsvps;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use eventola_anthropic::AnthropicCopyWriter;
use eventola_core::{CopyConfig, Event, EventForm, EventStatus, FieldError, RsvpForm, Theme};
use eventola_storage::Database;

use crate::common::{ListResponse, ValidationErrorResponse};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::routes::register,
        auth::routes::login,
        auth::routes::logout,
        auth::routes::me,
        events::create_event,
        events::list_events,
        events::get_event_by_slug,
        discover::discover,
        rsvps::create_rsvp,
        rsvps::count_rsvps,
        rsvps::get_ticket,
        live::stream_live,
        files::upload_file,
        files::download_file,
        copy::generate_tagline,
        copy::generate_description,
    ),
    components(
        schemas(
            Event, EventStatus, Theme, EventForm, RsvpForm, FieldError,
            events::EventPublic,
            rsvps::RsvpCreated,
            rsvps::RsvpCount,
            rsvps::TicketResponse,
            files::FileResponse,
            auth::routes::RegisterRequest,
            auth::routes::LoginRequest,
            auth::routes::UserResponse,
            copy::TaglineRequest,
            copy::DescriptionRequest,
            copy::CopyResponse,
            ListResponse<Event>,
            ListResponse<events::EventPublic>,
            ValidationErrorResponse,
        )
    ),
    tags(
        (name = "auth", description = "Account and session endpoints"),
        (name = "events", description = "Event creation and microsite endpoints"),
        (name = "discover", description = "Public event discovery"),
        (name = "rsvps", description = "Reservations, tickets, and the live counter"),
        (name = "files", description = "Cover and logo upload buckets"),
        (name = "copy", description = "AI marketing copy generation")
    ),
    info(
        title = "Eventola API",
        version = "0.2.0",
        description = "API for event microsites, RSVP collection, and live attendee counts",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventola_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("eventola-api starting...");

    // Initialize database
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;
    let db = Database::from_url(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    let db = Arc::new(db);

    // Load authentication configuration
    let auth_config = auth::AuthConfig::from_env();
    tracing::info!(
        session_max_age_secs = auth_config.session_max_age.as_secs(),
        disable_signup = auth_config.disable_signup,
        "Authentication configured"
    );

    // Copy generation degrades to 502s when the provider key is missing,
    // everything else keeps working
    let copy_writer: Arc<dyn eventola_core::CopyWriter> = match AnthropicCopyWriter::from_env() {
        Ok(writer) => {
            tracing::info!("Anthropic copy writer initialized");
            Arc::new(writer)
        }
        Err(e) => {
            tracing::warn!(
                "Copy writer not configured (ANTHROPIC_API_KEY not set): {}. Copy routes will return 502.",
                e
            );
            Arc::new(copy::UnconfiguredWriter)
        }
    };

    // Create module-specific states
    let auth_state = auth::AuthState::new(db.clone(), auth_config);
    let events_state = events::EventsState::new(db.clone());
    let discover_state = discover::DiscoverState::new(db.clone());
    let rsvps_state = rsvps::RsvpsState::new(db.clone());
    let live_state = live::LiveState::new(db.clone());
    let files_state = files::FilesState::new(db.clone());
    let copy_state = copy::CopyState::new(copy_writer, CopyConfig::default());

    // Background cleanup of uploads that never got attached to an event
    let janitor_config = janitor::JanitorConfig::from_env();
    tokio::spawn(janitor::run(db.clone(), janitor_config));

    // Load API prefix from environment (default: empty)
    // Example: API_PREFIX="/api" results in routes like /api/v1/events
    let api_prefix = std::env::var("API_PREFIX").unwrap_or_default();
    if !api_prefix.is_empty() {
        tracing::info!(prefix = %api_prefix, "API prefix configured");
    }

    // Load CORS allowed origins from environment (optional)
    // Only needed when UI is served from a different origin than the API
    let cors_origins: Vec<HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|s| s.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    if cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?cors_origins, "CORS origins configured");
    }

    // Build API routes
    let api_routes = Router::new()
        .merge(auth::routes(auth_state))
        .merge(events::routes(events_state))
        .merge(discover::routes(discover_state))
        .merge(rsvps::routes(rsvps_state))
        .merge(live::routes(live_state))
        .merge(files::routes(files_state))
        .merge(copy::routes(copy_state));

    // Build main router with health (not prefixed) and prefixed API routes
    let mut app = Router::new().route("/health", get(health));
    app = app.merge(build_router_with_prefix(api_routes, &api_prefix));

    // Add Swagger UI
    let app =
        app.merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                    header::CACHE_CONTROL,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    // Add tracing
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_routes() -> Router {
        Router::new().route("/v1/test", get(|| async { "ok" }))
    }

    #[tokio::test]
    async fn test_api_prefix_empty() {
        let app = build_router_with_prefix(test_routes(), "");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_api_prefix_set() {
        let app = build_router_with_prefix(test_routes(), "/api");

        // Route should work with prefix
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);

        // Route should NOT work without prefix
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = Router::new().route("/health", get(health));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"], "ok");
    }
}
