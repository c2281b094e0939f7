//! Middleware module.
//!
//! Provides the production HTTPS redirect and the CORS layer.

use axum::{
    body::Body,
    extract::Request,
    http::{
        header::{self, HeaderName, HeaderValue},
        uri::PathAndQuery,
        HeaderMap, Method, StatusCode, Uri,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{Any, CorsLayer};

use crate::error::{AppError, AppResult};

/// Header set by the TLS-terminating proxy with the client's original scheme.
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// HTTPS redirect middleware.
///
/// Behind a TLS-terminating proxy every request arrives as plain HTTP, so the
/// original scheme is read from `x-forwarded-proto`. `GET` and `HEAD` requests
/// whose scheme is not `https` are answered with `302 Found` pointing at the
/// same host and path under `https://`; everything else passes through.
///
/// # Error Responses
///
/// - 400 Bad Request: When the request carries no usable `Host`
pub async fn https_redirect(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let redirectable = matches!(*request.method(), Method::GET | Method::HEAD);
    if !redirectable || is_forwarded_https(request.headers()) {
        return Ok(next.run(request).await);
    }

    let location = https_location(request.headers(), request.uri())?;
    tracing::debug!(location = ?location, "Redirecting plain HTTP request to HTTPS");

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

/// Returns true when the proxy reports the original request as `https`.
fn is_forwarded_https(headers: &HeaderMap) -> bool {
    headers
        .get(X_FORWARDED_PROTO)
        .is_some_and(|proto| proto.as_bytes() == b"https")
}

/// Builds `https://{host}{path-and-query}` for the request.
///
/// The `Host` header is preferred; HTTP/2 requests carry it in the URI authority instead.
fn https_location(headers: &HeaderMap, uri: &Uri) -> AppResult<HeaderValue> {
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| uri.authority().map(axum::http::uri::Authority::as_str))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing Host header".to_string()))?;

    let path = uri.path_and_query().map_or("/", PathAndQuery::as_str);

    HeaderValue::from_str(&format!("https://{host}{path}"))
        .map_err(|e| AppError::BadRequest(format!("Invalid redirect target: {e}")))
}

/// Builds the CORS layer from a comma-separated origin list, or `*` for any origin.
pub fn build_cors_layer(cors_origins: &str) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if cors_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_methods(methods)
            .allow_origin(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = cors_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!("No valid CORS origins configured, allowing all");
        CorsLayer::new()
            .allow_methods(methods)
            .allow_origin(Any)
            .allow_headers(Any)
    } else {
        tracing::info!(origins = ?origins, "CORS configured with specific origins");
        CorsLayer::new()
            .allow_methods(methods)
            .allow_origin(origins)
            .allow_headers(Any)
    }
}
