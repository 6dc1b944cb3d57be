//! Request-Timing und Request-ID Middleware fuer Axum
//!
//! Jede Anfrage bekommt eine Request-ID (aus `x-request-id` uebernommen oder
//! neu erzeugt). Sie steht im Tracing-Span und im Antwort-Header. Dauer und
//! Status landen im Log und in den Prometheus-Metriken.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderName, HeaderValue, Request, Response},
    middleware::Next,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::metrics::PlauderMetriken;

/// Header fuer die Request-ID
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Erstellt den Tower-Trace-Layer fuer HTTP-Spans
pub fn request_timing_layer() -> tower_http::trace::TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    tower_http::trace::TraceLayer::new_for_http()
}

/// Uebernimmt eine gueltige Request-ID vom Client oder erzeugt eine neue
pub fn request_id_ermitteln(req: &Request<Body>) -> String {
    req.headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Axum-Middleware: Request-ID, Antwortzeit und Metriken
///
/// Verwendung:
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(metriken, timing_middleware))
/// ```
pub async fn timing_middleware(
    State(metriken): State<PlauderMetriken>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let methode = req.method().to_string();
    // Routen-Muster statt konkretem Pfad, sonst waechst die Label-Menge unbegrenzt
    let pfad = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unbekannt".to_string());
    let request_id = request_id_ermitteln(&req);
    let start = Instant::now();

    let span = tracing::info_span!("http", request_id = %request_id);
    let mut response = next.run(req).instrument(span.clone()).await;

    let dauer = start.elapsed();
    let status = response.status().as_u16();
    metriken.anfrage_erfassen(&methode, &pfad, status, dauer);

    span.in_scope(|| {
        tracing::info!(
            method = %methode,
            path = %pfad,
            status = status,
            duration_ms = dauer.as_millis() as u64,
            "HTTP-Anfrage abgeschlossen"
        );
    });

    if let Ok(wert) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER.clone(), wert);
    }

    response
}
