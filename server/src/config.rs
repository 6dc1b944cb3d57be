//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist. Nur das Signaturgeheimnis muss gesetzt werden.

use std::net::SocketAddr;

use anyhow::Context;
use plauder_auth::MAX_TTL_STUNDEN;
use plauder_db::DatabaseConfig;
use serde::{Deserialize, Serialize};

/// Ueberschreibt `[auth] geheimnis`
pub const ENV_JWT_SECRET: &str = "PLAUDER_JWT_SECRET";

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
    /// CORS fuer die HTTP-API
    pub cors: CorsEinstellungen,
    /// Session-Tokens
    pub auth: AuthEinstellungen,
    /// Nachrichten-Umschlag
    pub chat: ChatEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Dienstname in Logs und Health-Antwort
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "plauder".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    pub bind_adresse: String,
    /// Port fuer die HTTP-API
    pub api_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            api_port: 8080,
        }
    }
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    pub sqlite_wal: bool,
    /// Wartezeit bei gesperrter Datenbank in Millisekunden
    pub busy_timeout_ms: u64,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        let standard = DatabaseConfig::default();
        Self {
            url: standard.url,
            max_verbindungen: standard.max_verbindungen,
            sqlite_wal: standard.sqlite_wal,
            busy_timeout_ms: standard.busy_timeout_ms,
        }
    }
}

impl From<&DatenbankEinstellungen> for DatabaseConfig {
    fn from(e: &DatenbankEinstellungen) -> Self {
        Self {
            url: e.url.clone(),
            max_verbindungen: e.max_verbindungen,
            sqlite_wal: e.sqlite_wal,
            busy_timeout_ms: e.busy_timeout_ms,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level bzw. EnvFilter-Ausdruck
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health (Standard: 9300)
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            port: 9300,
        }
    }
}

/// CORS-Einstellungen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsEinstellungen {
    /// Erlaubte Origins. Leer = nur `http://localhost*`.
    pub erlaubte_origins: Vec<String>,
}

/// Token-Einstellungen
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEinstellungen {
    /// HMAC-Geheimnis, mindestens 32 Bytes
    pub geheimnis: Option<String>,
    pub token_ttl_stunden: i64,
    /// Unterhalb dieser Restlaufzeit wird das Token erneuert
    pub erneuerung_schwelle_stunden: i64,
    /// Antwort-Header fuer neu ausgestellte Tokens
    pub header_name: String,
}

impl Default for AuthEinstellungen {
    fn default() -> Self {
        Self {
            geheimnis: None,
            token_ttl_stunden: 72,
            erneuerung_schwelle_stunden: 24,
            header_name: "x-jwt-token".into(),
        }
    }
}

// Geheimnis nie ins Log
impl std::fmt::Debug for AuthEinstellungen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEinstellungen")
            .field("geheimnis", &self.geheimnis.as_ref().map(|_| "<verborgen>"))
            .field("token_ttl_stunden", &self.token_ttl_stunden)
            .field(
                "erneuerung_schwelle_stunden",
                &self.erneuerung_schwelle_stunden,
            )
            .field("header_name", &self.header_name)
            .finish()
    }
}

/// Einstellungen fuer den Nachrichten-Codec
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEinstellungen {
    /// Maximale Verschachtelungstiefe eines Umschlags
    pub max_verschachtelung: usize,
}

impl Default for ChatEinstellungen {
    fn default() -> Self {
        Self {
            max_verschachtelung: plauder_chat::codec::STANDARD_MAX_TIEFE,
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    /// `PLAUDER_JWT_SECRET` hat Vorrang vor `[auth] geheimnis`.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let mut config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };

        if let Ok(geheimnis) = std::env::var(ENV_JWT_SECRET) {
            config.auth.geheimnis = Some(geheimnis);
        }

        Ok(config)
    }

    pub fn aus_toml(inhalt: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(inhalt)?)
    }

    /// Prueft Werte, die serde allein nicht abdeckt
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !(1..=MAX_TTL_STUNDEN).contains(&self.auth.token_ttl_stunden) {
            anyhow::bail!("auth.token_ttl_stunden muss zwischen 1 und {MAX_TTL_STUNDEN} liegen");
        }
        if self.auth.erneuerung_schwelle_stunden < 0
            || self.auth.erneuerung_schwelle_stunden >= self.auth.token_ttl_stunden
        {
            anyhow::bail!(
                "auth.erneuerung_schwelle_stunden muss zwischen 0 und token_ttl_stunden liegen"
            );
        }
        if self.datenbank.max_verbindungen == 0 {
            anyhow::bail!("datenbank.max_verbindungen muss mindestens 1 sein");
        }
        if self.chat.max_verschachtelung == 0 {
            anyhow::bail!("chat.max_verschachtelung muss mindestens 1 sein");
        }
        Ok(())
    }

    /// Gibt die Bind-Adresse fuer die HTTP-API zurueck
    pub fn api_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        bind_adresse(&self.netzwerk.bind_adresse, self.netzwerk.api_port)
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        bind_adresse(&self.netzwerk.bind_adresse, self.observability.port)
    }
}

fn bind_adresse(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Ungueltige Bind-Adresse '{host}:{port}'"))
}
