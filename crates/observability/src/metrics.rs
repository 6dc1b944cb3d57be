//! Prometheus-kompatible Metriken fuer Plauder
//!
//! Registrierte Metriken:
//! - `plauder_auth_ablehnungen_total{grund}` – Counter: abgewiesene Anfragen je Grund
//! - `plauder_token_erneuerungen_total` – Counter: gleitend erneuerte Tokens
//! - `plauder_codec_fehler_total{richtung}` – Counter: Umschlag-Codec-Fehler
//! - `plauder_http_requests_total{method,path,status}` – Counter: HTTP-Anfragen
//! - `plauder_http_request_duration_seconds{method,path}` – Histogram: HTTP-Antwortzeit

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Alle Plauder-Prometheus-Metriken
///
/// Klonen ist billig; alle Klone zaehlen in dieselbe Registry.
#[derive(Clone)]
pub struct PlauderMetriken {
    pub registry: Arc<Registry>,

    // Auth
    pub auth_ablehnungen_total: IntCounterVec,
    pub token_erneuerungen_total: IntCounter,

    // Chat
    pub codec_fehler_total: IntCounterVec,

    // HTTP
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl PlauderMetriken {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        let auth_ablehnungen_total = IntCounterVec::new(
            Opts::new(
                "plauder_auth_ablehnungen_total",
                "Abgewiesene Anfragen nach Grund",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(auth_ablehnungen_total.clone()))?;

        let token_erneuerungen_total = IntCounter::with_opts(Opts::new(
            "plauder_token_erneuerungen_total",
            "Gleitend erneuerte Session-Tokens",
        ))?;
        registry.register(Box::new(token_erneuerungen_total.clone()))?;

        let codec_fehler_total = IntCounterVec::new(
            Opts::new(
                "plauder_codec_fehler_total",
                "Fehler beim Kodieren oder Dekodieren von Umschlaegen",
            ),
            &["richtung"],
        )?;
        registry.register(Box::new(codec_fehler_total.clone()))?;

        let http_requests_total = IntCounterVec::new(
            Opts::new("plauder_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "plauder_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            auth_ablehnungen_total,
            token_erneuerungen_total,
            codec_fehler_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    pub fn ablehnung_zaehlen(&self, grund: &str) {
        self.auth_ablehnungen_total.with_label_values(&[grund]).inc();
    }

    pub fn erneuerung_zaehlen(&self) {
        self.token_erneuerungen_total.inc();
    }

    pub fn codec_fehler_zaehlen(&self, richtung: &str) {
        self.codec_fehler_total.with_label_values(&[richtung]).inc();
    }

    /// Erfasst eine abgeschlossene HTTP-Anfrage
    pub fn anfrage_erfassen(&self, methode: &str, pfad: &str, status: u16, dauer: Duration) {
        self.http_requests_total
            .with_label_values(&[methode, pfad, &status.to_string()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[methode, pfad])
            .observe(dauer.as_secs_f64());
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: PlauderMetriken) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<PlauderMetriken>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
