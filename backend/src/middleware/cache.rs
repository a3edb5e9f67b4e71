use std::convert::Infallible;

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponseParts, ResponseParts},
};
use tower_http::set_header::{MakeHeaderValue, SetResponseHeaderLayer};

/// Where a cached response may be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLocation {
    /// Shared caches and the client.
    Any,
    /// Nowhere; the client must revalidate.
    None,
}

/// A named set of client caching directives applied to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheProfile {
    pub name: &'static str,
    pub duration_secs: u32,
    pub location: CacheLocation,
}

impl CacheProfile {
    pub const DEFAULT: CacheProfile = CacheProfile {
        name: "default",
        duration_secs: 600,
        location: CacheLocation::None,
    };

    /// Applied to every response that does not pick a profile of its own.
    pub const SHORT: CacheProfile = CacheProfile {
        name: "short",
        duration_secs: 10,
        location: CacheLocation::Any,
    };

    pub fn cache_control(&self) -> String {
        let prefix = match self.location {
            CacheLocation::Any => "public,",
            CacheLocation::None => "no-cache,",
        };
        format!("{prefix}max-age={}", self.duration_secs)
    }

    fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.cache_control()).ok()
    }
}

impl<T> MakeHeaderValue<T> for CacheProfile {
    fn make_header_value(&mut self, _message: &T) -> Option<HeaderValue> {
        self.header_value()
    }
}

impl IntoResponseParts for CacheProfile {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Some(value) = self.header_value() {
            res.headers_mut().insert(header::CACHE_CONTROL, value);
        }
        if self.location == CacheLocation::None {
            res.headers_mut()
                .insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        }
        Ok(res)
    }
}

/// The [`CacheProfile::SHORT`] directives on any response that has not set its own.
pub fn default_cache_control() -> SetResponseHeaderLayer<CacheProfile> {
    SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, CacheProfile::SHORT)
}

pub fn vary_accept_encoding() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(header::VARY, HeaderValue::from_static("Accept-Encoding"))
}
