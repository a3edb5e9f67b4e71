use std::time::Instant;

use axum::{
    extract::Request,
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::trace;

/// Logs method, path and elapsed time when dropped, so the line is written
/// even if the inner pipeline panics or the request is cancelled.
struct RequestTimer {
    method: Method,
    path: String,
    start: Instant,
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        trace!(
            method = %self.method,
            path = %self.path,
            elapsed_ms = self.start.elapsed().as_millis() as u64,
            "Request timed"
        );
    }
}

pub async fn log_request_timing(request: Request, next: Next) -> Response {
    let _timer = RequestTimer {
        method: request.method().clone(),
        path: request.uri().path().to_owned(),
        start: Instant::now(),
    };

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn logs_method_path_and_duration_without_touching_response() {
        let app = Router::new()
            .route("/ping", get(|| async { (StatusCode::ACCEPTED, "pong") }))
            .layer(from_fn(log_request_timing));

        let response = app
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(logs_contain("Request timed"));
        assert!(logs_contain("method=GET"));
        assert!(logs_contain("path=/ping"));
        assert!(logs_contain("elapsed_ms="));
    }

    #[tokio::test]
    #[traced_test]
    async fn logs_failed_requests_too() {
        let app = Router::new()
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .layer(from_fn(log_request_timing));

        let response = app
            .oneshot(Request::builder().uri("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(logs_contain("path=/missing"));
    }
}
