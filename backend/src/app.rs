use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::foo;
use crate::health::report as health;
use crate::middleware::{cache, cors_policy, guard, timing};
use crate::openapi::{self, ApiDoc};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))

        // ── Foo ─────────────────────────────────────────────────────────────
        .route(
            "/api/foo",
            get(foo::list_foos)
                .post(foo::create_foo)
                .put(foo::update_foo)
                .patch(foo::update_foo),
        )
        .route("/api/foo/content", post(foo::create_foo_with_file))
        .route("/api/foo/throw", post(foo::throw_demo))
        .route("/api/foo/:id", get(foo::get_foo).delete(foo::delete_foo))

        // ── Docs ────────────────────────────────────────────────────────────
        .merge(SwaggerUi::new(openapi::UI_PATH).url(openapi::DOCUMENT_PATH, ApiDoc::openapi()))

        // ── Middleware (outermost first) ────────────────────────────────────
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(timing::log_request_timing))
                .layer(cache::default_cache_control())
                .layer(cache::vary_accept_encoding())
                .layer(from_fn_with_state(settings, guard::exception_guard))
                .layer(TraceLayer::new_for_http())
                .layer(cors_policy()),
        )
        .with_state(state)
}
