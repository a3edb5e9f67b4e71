use std::path::PathBuf;

use anyhow::Context;
use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::cache::CacheProfile,
    models::{Foo, FooPayload, FooUpload},
    AppState,
};

// ── Path id ───────────────────────────────────────────────────────────────────

/// Path id constrained to positive integers.
///
/// Anything else (zero, negative, non-numeric, out of range) is answered
/// with 404 as if no route matched, so the service never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositiveId(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for PositiveId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::NOT_FOUND)?;

        match raw.parse::<i32>() {
            Ok(id) if id >= 1 => Ok(PositiveId(id)),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }
}

fn require_payload(payload: Option<FooPayload>) -> AppResult<FooPayload> {
    payload.ok_or_else(|| AppError::BadRequest("foo must not be null".to_string()))
}

/// 201 with the id as body and a `Location` pointing at get-by-id.
fn created(id: i32) -> Response {
    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/foo/{id}"))],
        Json(id),
    )
        .into_response()
}

// ── Create ────────────────────────────────────────────────────────────────────

/// Creates a new Foo.
#[utoipa::path(
    post,
    path = "/api/foo",
    tag = "foo",
    request_body = FooPayload,
    responses(
        (status = 201, description = "Foo created", body = i32,
            headers(("Location" = String, description = "URL of the created Foo"))),
        (status = 400, description = "Payload was null"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn create_foo(
    State(state): State<AppState>,
    Json(payload): Json<Option<FooPayload>>,
) -> AppResult<Response> {
    let payload = require_payload(payload)?;
    let id = state.foo_service.create(&payload).await?;

    info!(id, "Created foo");

    Ok(created(id))
}

/// Creates a new Foo from a multipart form and stores the attached file.
#[utoipa::path(
    post,
    path = "/api/foo/content",
    tag = "foo",
    request_body(content = FooUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Foo created", body = i32),
        (status = 400, description = "Form was malformed or had no file"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn create_foo_with_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let (payload, file) = read_upload(multipart).await?.into_parts();

    let path = store_upload(state.settings.uploads.directory(), file).await?;
    info!(path = %path.display(), "Stored uploaded file");

    let id = state.foo_service.create(&payload).await?;

    info!(id, "Created foo with file");

    Ok(created(id))
}

async fn read_upload(mut multipart: Multipart) -> AppResult<FooUpload> {
    let mut id = None;
    let mut value = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                let parsed = text
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::BadRequest("id must be an integer".to_string()))?;
                id = Some(parsed);
            }
            "value" => {
                value = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?,
                );
            }
            "file" => {
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.body_text()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("file is required".to_string()))?;

    Ok(FooUpload { id, value, file })
}

/// Writes the upload under a random 32-hex-digit name. The buffer is
/// consumed here and dropped once the write finishes or fails.
async fn store_upload(directory: PathBuf, content: Vec<u8>) -> AppResult<PathBuf> {
    let path = directory.join(Uuid::new_v4().simple().to_string());
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

// ── List ──────────────────────────────────────────────────────────────────────

/// Lists every Foo. Cached per the `default` profile.
#[utoipa::path(
    get,
    path = "/api/foo",
    tag = "foo",
    responses(
        (status = 200, description = "All available Foo objects", body = [Foo]),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn list_foos(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let foos = state.foo_service.list().await?;

    info!(
        count = foos.len(),
        cache_profile = CacheProfile::DEFAULT.name,
        "Listed foos"
    );

    Ok((CacheProfile::DEFAULT, Json(foos)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/foo/{id}",
    tag = "foo",
    params(("id" = i32, Path, description = "Unique identifier, 1 or greater")),
    responses(
        (status = 200, description = "Foo retrieved", body = Foo),
        (status = 404, description = "Foo does not exist", body = i32),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_foo(
    State(state): State<AppState>,
    PositiveId(id): PositiveId,
) -> AppResult<Json<Foo>> {
    match state.foo_service.get_by_id(id).await? {
        Some(foo) => {
            info!(id, "Fetched foo");
            Ok(Json(foo))
        }
        None => Err(AppError::NotFound(json!(id))),
    }
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Updates a Foo. Served on both PUT and PATCH.
#[utoipa::path(
    put,
    path = "/api/foo",
    tag = "foo",
    request_body = FooPayload,
    responses(
        (status = 200, description = "Foo updated"),
        (status = 400, description = "Payload was null"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn update_foo(
    State(state): State<AppState>,
    Json(payload): Json<Option<FooPayload>>,
) -> AppResult<StatusCode> {
    let payload = require_payload(payload)?;
    state.foo_service.update(&payload).await?;

    info!(id = ?payload.id, "Updated foo");

    Ok(StatusCode::OK)
}

// ── Delete ────────────────────────────────────────────────────────────────────

#[utoipa::path(
    delete,
    path = "/api/foo/{id}",
    tag = "foo",
    params(("id" = i32, Path, description = "Unique identifier, 1 or greater")),
    responses(
        (status = 200, description = "Foo deleted"),
        (status = 404, description = "Identifier is not a positive integer"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn delete_foo(
    State(state): State<AppState>,
    PositiveId(id): PositiveId,
) -> AppResult<StatusCode> {
    state.foo_service.delete(id).await?;

    info!(id, "Deleted foo");

    Ok(StatusCode::OK)
}

// ── Fault demo ────────────────────────────────────────────────────────────────

/// Always fails, to exercise the exception guard.
#[utoipa::path(
    post,
    path = "/api/foo/throw",
    tag = "foo",
    request_body = FooPayload,
    responses(
        (status = 400, description = "Payload was null"),
        (status = 500, description = "Internal server error, every time"),
    )
)]
pub async fn throw_demo(
    State(state): State<AppState>,
    Json(payload): Json<Option<FooPayload>>,
) -> AppResult<Json<FooPayload>> {
    let payload = require_payload(payload)?;
    state.foo_service.throw_demo()?;
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn extract(uri: &str) -> StatusCode {
        let app = Router::new().route(
            "/items/:id",
            get(|PositiveId(id): PositiveId| async move { id.to_string() }),
        );
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn positive_id_accepts_one_and_up() {
        assert_eq!(extract("/items/1").await, StatusCode::OK);
        assert_eq!(extract("/items/2147483647").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn positive_id_rejects_everything_else_with_404() {
        for uri in ["/items/0", "/items/-5", "/items/abc", "/items/2147483648", "/items/1.5"] {
            assert_eq!(extract(uri).await, StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[test]
    fn null_payload_is_a_bad_request() {
        assert!(matches!(require_payload(None), Err(AppError::BadRequest(_))));
        assert!(require_payload(Some(FooPayload::default())).is_ok());
    }

    #[tokio::test]
    async fn store_upload_writes_content_under_random_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_upload(dir.path().to_path_buf(), b"bytes".to_vec())
            .await
            .unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn store_upload_into_missing_directory_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let result = store_upload(dir.path().join("missing"), b"x".to_vec()).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
