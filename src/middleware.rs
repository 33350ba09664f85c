//! Request ID middleware for correlating logs with requests.
//!
//! Each request runs inside a tracing span keyed by a UUID v4. A caller-supplied
//! `x-request-id` is reused when it is a valid UUID so ids survive across hops;
//! the id in use is echoed back on the response.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use axum::http::HeaderValue;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::REQUEST_ID_HEADER;

/// Request id carried by the request span and the response header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RequestId(Uuid);

impl RequestId {
    /// Take the id from the request headers, or mint a new one.
    fn from_request(request: &Request) -> Self {
        let incoming = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok());
        Self(incoming.unwrap_or_else(Uuid::new_v4))
    }
}

/// Middleware that assigns a request ID and wraps the request in a span.
///
/// This should be the outermost layer so the span covers every other layer.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = RequestId::from_request(&request);

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.0,
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::debug!(status = response.status().as_u16(), duration_ms, "Request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id.0.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(header: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/terrarium/health");
        if let Some(value) = header {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_incoming_uuid_is_reused() {
        let id = "7f1c8a52-6a4e-4c56-9d57-2b1f0f3a9e11";
        let request_id = RequestId::from_request(&request_with(Some(id)));
        assert_eq!(request_id.0, Uuid::parse_str(id).unwrap());
    }

    #[test]
    fn test_malformed_header_gets_fresh_id() {
        let a = RequestId::from_request(&request_with(Some("not-a-uuid")));
        let b = RequestId::from_request(&request_with(None));
        assert_ne!(a, b);
        assert_eq!(a.0.get_version_num(), 4);
    }
}
