//! Health-Check-Endpunkt fuer Plauder
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Dienstname, Version, Uptime und DB-Verbindungsstatus

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub dienst: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub db_connected: bool,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    dienst: Arc<str>,
    start_time: Instant,
    db_connected: Arc<AtomicBool>,
}

impl HealthState {
    pub fn neu(dienst: &str) -> Self {
        Self {
            dienst: Arc::from(dienst),
            start_time: Instant::now(),
            db_connected: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn db_verbunden(&self) -> bool {
        self.db_connected.load(Ordering::Relaxed)
    }

    pub fn db_status_setzen(&self, verbunden: bool) {
        self.db_connected.store(verbunden, Ordering::Relaxed);
    }

    /// Prueft die Datenbank periodisch im Hintergrund
    ///
    /// Muss innerhalb einer Tokio-Runtime aufgerufen werden.
    pub fn db_pruefung_starten<F, Fut>(&self, intervall: Duration, pruefen: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        let state = self.clone();
        tokio::spawn(async move {
            let mut takt = tokio::time::interval(intervall);
            loop {
                takt.tick().await;
                let verbunden = pruefen().await;
                if verbunden != state.db_verbunden() {
                    if verbunden {
                        tracing::info!("Datenbank wieder erreichbar");
                    } else {
                        tracing::warn!("Datenbank nicht erreichbar");
                    }
                }
                state.db_status_setzen(verbunden);
            }
        });
    }

    fn antwort(&self) -> HealthResponse {
        let db_connected = self.db_verbunden();
        HealthResponse {
            status: if db_connected {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            dienst: self.dienst.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            db_connected,
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – 200 auch bei `degraded`, damit die Probe nicht fehlschlaegt
async fn health_handler(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(state.antwort())
}
