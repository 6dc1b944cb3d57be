//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `PLAUDER_LOG_LEVEL`: Filter-Ausdruck (z.B. `info` oder `plauder_auth=debug`), Standard: info
//! - `PLAUDER_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LOG_LEVEL: &str = "PLAUDER_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "PLAUDER_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Gibt `false` zurueck, wenn bereits ein globaler Subscriber gesetzt war.
pub fn logging_initialisieren(level: &str, format: &str) -> bool {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let ergebnis = match log_format_aus_env(format).as_str() {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    ergebnis.is_ok()
}

/// Log-Format aus der Umgebung, sonst der uebergebene Wert
pub fn log_format_aus_env(standard: &str) -> String {
    std::env::var(ENV_LOG_FORMAT).unwrap_or_else(|_| standard.to_string())
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
