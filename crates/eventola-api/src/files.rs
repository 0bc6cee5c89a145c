// File bucket routes: authenticated upload, public read
//
// Each bucket carries its own size cap and extension allowlist. The policy is
// enforced here at upload time; reads serve the stored bytes back with the
// recorded content type.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use eventola_core::BucketPolicy;
use eventola_storage::{CreateFile, Database};

use crate::auth::require_user;

/// App state for file routes
#[derive(Clone)]
pub struct FilesState {
    pub db: Arc<Database>,
}

impl FilesState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

/// Metadata for a stored file
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: Uuid,
    pub bucket_id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Public URL serving the file's bytes
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Create file routes
pub fn routes(state: FilesState) -> Router {
    // Body limit sits above the largest bucket cap; the per-bucket policy
    // still rejects oversized payloads with 413
    Router::new()
        .route("/v1/files/:bucket_id", post(upload_file))
        .route("/v1/files/:bucket_id/:file_id", get(download_file))
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .with_state(state)
}

/// POST /v1/files/{bucket_id} - Upload a file (multipart)
#[utoipa::path(
    post,
    path = "/v1/files/{bucket_id}",
    params(
        ("bucket_id" = String, Path, description = "Bucket identifier")
    ),
    responses(
        (status = 201, description = "File stored", body = FileResponse),
        (status = 400, description = "No file part, or extension not allowed"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Unknown bucket"),
        (status = 413, description = "File exceeds the bucket's size cap"),
        (status = 500, description = "Internal server error")
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<FilesState>,
    Path(bucket_id): Path<String>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<FileResponse>), (StatusCode, String)> {
    require_user(&state.db, &jar)
        .await
        .map_err(|status| (status, "Unauthorized".to_string()))?;

    let policy = BucketPolicy::by_id(&bucket_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown bucket '{}'", bucket_id)))?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Malformed multipart body: {}", e)))?
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing file part".to_string()))?;

    let filename = field
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "File part has no filename".to_string()))?;
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if !policy.allows_filename(&filename) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Extension not allowed; accepted: {}",
                policy.allowed_extensions.join(", ")
            ),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Failed to read file part: {}", e)))?
        .to_vec();

    if !policy.allows_size(data.len() as i64) {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("File exceeds the {} byte cap", policy.max_size_bytes),
        ));
    }

    let meta = state
        .db
        .create_file(CreateFile {
            bucket_id: policy.id.to_string(),
            filename,
            content_type,
            data,
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to store file: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        })?;

    let url = crate::events::file_url(&meta.bucket_id, meta.id);
    Ok((
        StatusCode::CREATED,
        Json(FileResponse {
            id: meta.id,
            bucket_id: meta.bucket_id,
            filename: meta.filename,
            content_type: meta.content_type,
            size_bytes: meta.size_bytes,
            url,
            created_at: meta.created_at,
        }),
    ))
}

/// GET /v1/files/{bucket_id}/{file_id} - Serve a stored file
#[utoipa::path(
    get,
    path = "/v1/files/{bucket_id}/{file_id}",
    params(
        ("bucket_id" = String, Path, description = "Bucket identifier"),
        ("file_id" = Uuid, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File bytes"),
        (status = 404, description = "No such file in that bucket"),
        (status = 500, description = "Internal server error")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<FilesState>,
    Path((bucket_id, file_id)): Path<(String, Uuid)>,
) -> Result<impl IntoResponse, StatusCode> {
    let file = state
        .db
        .get_file(&bucket_id, file_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read file: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            // Uploads are immutable, safe to cache hard
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        file.data,
    ))
}
