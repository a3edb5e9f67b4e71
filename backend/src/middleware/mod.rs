//! Request pipeline stages, outermost first:
//!
//! ```text
//! request timing → cache headers → exception guard → TraceLayer → CORS → router
//! ```
//!
//! Responses the guard or CORS produce on their own (413, panic 500,
//! preflight) still pass back through timing and the cache headers.

pub mod cache;
pub mod guard;
pub mod timing;

use tower_http::cors::{Any, CorsLayer};

/// `AllowAllPolicy`: any origin, method and header.
///
/// Development default only; never ship this in front of anything with
/// credentials.
pub fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
