use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use common::RequestContext;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::state::AppState;

pub const TRACE_ID_HEADER: &str = "x-trace-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn header_or_new(req: &Request, name: &str) -> String {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Attach a `RequestContext` (trace id + request deadline) to every request and
/// echo the ids back as response headers.
///
/// The context is cancelled when the request future is dropped, so an aborted
/// request stops its in-flight store and cache calls.
pub async fn trace_context(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let trace_id = header_or_new(&req, TRACE_ID_HEADER);
    let request_id = header_or_new(&req, REQUEST_ID_HEADER);

    let ctx = RequestContext::new(trace_id.clone()).with_timeout(state.request_timeout);
    let _cancel_on_drop = ctx.cancellation().drop_guard();
    req.extensions_mut().insert(ctx);

    let span = info_span!("request", trace_id = %trace_id, request_id = %request_id);
    let mut resp = async move {
        info!(method = %req.method(), path = %req.uri().path(), "incoming request");
        next.run(req).await
    }
    .instrument(span)
    .await;

    let headers = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&trace_id) {
        headers.insert(TRACE_ID_HEADER, v);
    }
    if let Ok(v) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, v);
    }
    resp
}
