//! plauder-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod config;
pub mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use config::ServerConfig;
use plauder_auth::{AuthService, Signaturschluessel, TokenAussteller, TokenPruefer};
use plauder_chat::{ChatService, UmschlagCodec};
use plauder_db::{DatabaseConfig, SqliteDb};
use plauder_observability::{observability_server_starten, HealthState, PlauderMetriken};
use web::AppState;

/// Intervall der Datenbank-Pruefung fuer `/health`
const DB_PRUEFUNG_INTERVALL: Duration = Duration::from_secs(30);

/// Baut Schluessel, Token-Aussteller und Services aus der Konfiguration
///
/// Der Signaturschluessel entsteht genau hier und wird danach nur noch
/// per `Arc` geteilt.
pub fn dienste_aufbauen(
    config: &ServerConfig,
    db: Arc<SqliteDb>,
    metriken: PlauderMetriken,
) -> Result<AppState> {
    let geheimnis = config.auth.geheimnis.as_deref().with_context(|| {
        format!(
            "Kein Signaturgeheimnis: [auth] geheimnis oder {} setzen",
            config::ENV_JWT_SECRET
        )
    })?;
    let schluessel = Signaturschluessel::aus_bytes(geheimnis.as_bytes().to_vec())
        .context("Signaturgeheimnis ungueltig")?;

    let ttl = chrono::Duration::try_hours(config.auth.token_ttl_stunden)
        .context("auth.token_ttl_stunden zu gross")?;
    let schwelle = chrono::Duration::try_hours(config.auth.erneuerung_schwelle_stunden)
        .context("auth.erneuerung_schwelle_stunden zu gross")?;

    let aussteller = Arc::new(TokenAussteller::neu(Arc::new(schluessel)).mit_ttl(ttl));
    let pruefer = Arc::new(TokenPruefer::neu(Arc::clone(&aussteller)).mit_schwelle(schwelle));

    let token_header = HeaderName::from_bytes(config.auth.header_name.as_bytes())
        .with_context(|| format!("Ungueltiger Header-Name '{}'", config.auth.header_name))?;

    let auth = Arc::new(AuthService::neu(Arc::clone(&db), aussteller));
    let chat = ChatService::neu(db, UmschlagCodec::neu(config.chat.max_verschachtelung));

    Ok(AppState::neu(auth, chat, pruefer, metriken, token_header))
}

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Konfiguration pruefen
    /// 2. Datenbankverbindung herstellen (inkl. Migrationen)
    /// 3. Schluessel und Services aufbauen
    /// 4. Observability-Server starten (optional)
    /// 5. HTTP-API starten, bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        let config = self.config;
        config.validieren()?;
        let api_adresse = config.api_bind_adresse()?;

        tracing::info!(
            server_name = %config.server.name,
            api = %api_adresse,
            "Server startet"
        );

        let db = Arc::new(
            SqliteDb::oeffnen(&DatabaseConfig::from(&config.datenbank))
                .await
                .with_context(|| format!("Datenbank '{}' nicht nutzbar", config.datenbank.url))?,
        );

        let metriken = PlauderMetriken::neu()?;
        let state = dienste_aufbauen(&config, Arc::clone(&db), metriken.clone())?;

        if config.observability.aktiviert {
            let adresse = config.observability_bind_adresse()?;
            let health = HealthState::neu(&config.server.name);
            let ping_db = Arc::clone(&db);
            health.db_pruefung_starten(DB_PRUEFUNG_INTERVALL, move || {
                let db = Arc::clone(&ping_db);
                async move { db.ping().await }
            });

            tokio::spawn(async move {
                if let Err(e) = observability_server_starten(adresse, metriken, health).await {
                    tracing::error!(fehler = %e, "Observability-Server beendet");
                }
            });
        }

        let cors = web::cors_layer(&config.cors.erlaubte_origins, state.token_header.clone());
        let app = web::api_router(state, cors);

        let listener = tokio::net::TcpListener::bind(api_adresse)
            .await
            .with_context(|| format!("Bind auf {api_adresse} fehlgeschlagen"))?;
        tracing::info!(adresse = %api_adresse, "HTTP-API bereit");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server beendet");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(fehler = %e, "Ctrl-C-Handler nicht installierbar");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
}
