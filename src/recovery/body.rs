//! Best-effort request body capture.
//!
//! Bodies whose size is known up front and fits the capture limit are
//! buffered and handed back to the request, so downstream handlers still
//! see the full body. Anything else passes through untouched and the
//! report only notes why it was not captured.
//!
//! If buffering fails partway, the handler is given a body that fails with
//! the same error, so it sees the read failure it would have seen anyway.

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::Request;
use tracing::warn;

/// Default number of body bytes buffered for a report.
pub const DEFAULT_BODY_CAPTURE_LIMIT: usize = 64 * 1024;

/// Returns the request (with its body restored) and the body text for a report.
pub(crate) async fn capture(request: Request, limit: usize) -> (Request, String) {
    if limit == 0 {
        return (request, "<not captured: capture disabled>".to_string());
    }

    let upper = request.body().size_hint().upper();
    match upper {
        Some(len) if len as usize <= limit => {}
        Some(len) => {
            return (request, format!("<not captured: {len} bytes exceeds {limit} byte limit>"));
        }
        None => return (request, "<not captured: unknown length>".to_string()),
    }

    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            (Request::from_parts(parts, Body::from(bytes)), text)
        }
        Err(e) => {
            warn!(error = %e, "Failed to buffer request body");
            let text = format!("<not captured: {e}>");
            let failed = futures::stream::once(async move { Err::<Bytes, _>(e) });
            (Request::from_parts(parts, Body::from_stream(failed)), text)
        }
    }
}
