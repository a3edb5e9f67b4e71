use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use tracing::{error, warn};

use crate::config::Settings;
use crate::error::{internal_error_response, Fault};

/// Outermost fault-handling stage.
///
/// Buffers the request body so it can be replayed into the log, then runs
/// the rest of the pipeline. Faults arrive either as a response carrying a
/// [`Fault`] extension or as a panic; each is logged exactly once with the
/// request body and answered with the generic 500.
pub async fn exception_guard(
    State(settings): State<Arc<Settings>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, settings.diagnostics.max_buffered_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, path = %parts.uri.path(), "Request body could not be buffered");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let method = parts.method.clone();
    let path = parts.uri.path().to_owned();
    let request = Request::from_parts(parts, Body::from(bytes.clone()));

    let (fault, response) = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(mut response) => {
            let Some(Fault(message)) = response.extensions_mut().remove::<Fault>() else {
                return response;
            };
            (message, response)
        }
        Err(panic) => (panic_message(panic.as_ref()), internal_error_response()),
    };

    error!(
        method = %method,
        path = %path,
        error = %fault,
        body = %body_excerpt(&bytes, settings.diagnostics.max_logged_body_bytes),
        "Failed request"
    );

    response
}

fn body_excerpt(bytes: &Bytes, limit: usize) -> String {
    let end = bytes.len().min(limit);
    let mut excerpt = String::from_utf8_lossy(&bytes[..end]).into_owned();
    if end < bytes.len() {
        excerpt.push('…');
    }
    excerpt
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
