//! HTTP-API (Axum)
//!
//! - `antwort`: Antwort-Umschlag und Fehlerabbildung
//! - `middleware`: Token-Pruefung pro Anfrage, `Angemeldet`-Extractor
//! - `handlers`: Konten und Nachrichten
//! - `routes`: Router und CORS

pub mod antwort;
pub mod handlers;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::http::HeaderName;
use plauder_auth::{AuthService, TokenPruefer};
use plauder_chat::{ChatError, ChatService};
use plauder_db::SqliteDb;
use plauder_observability::PlauderMetriken;

use antwort::ApiFehler;

pub use routes::{api_router, cors_layer};

/// Geteilter Zustand aller Handler
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<SqliteDb>>,
    pub chat: Arc<ChatService<SqliteDb>>,
    pub pruefer: Arc<TokenPruefer>,
    pub metriken: PlauderMetriken,
    /// Header fuer ausgestellte und erneuerte Tokens
    pub token_header: HeaderName,
}

impl AppState {
    pub fn neu(
        auth: Arc<AuthService<SqliteDb>>,
        chat: Arc<ChatService<SqliteDb>>,
        pruefer: Arc<TokenPruefer>,
        metriken: PlauderMetriken,
        token_header: HeaderName,
    ) -> Self {
        Self {
            auth,
            chat,
            pruefer,
            metriken,
            token_header,
        }
    }

    /// Zaehlt Codec-Fehler und reicht den Fehler weiter
    pub fn chat_fehler(&self, fehler: ChatError) -> ApiFehler {
        if let Some(richtung) = fehler.codec_richtung() {
            self.metriken.codec_fehler_zaehlen(richtung);
        }
        ApiFehler::Chat(fehler)
    }
}
