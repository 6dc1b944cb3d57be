//! Zeit-Helfer
//!
//! Zeilen speichern Zeitstempel als Millisekunden seit der Unix-Epoche,
//! Tokens als ganze Sekunden.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, Result};

/// Aktuelle Zeit in Millisekunden seit der Unix-Epoche
pub fn jetzt_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Wandelt Millisekunden seit der Epoche in einen UTC-Zeitpunkt
pub fn aus_ms(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(CoreError::UngueltigerZeitstempel(ms))
}

/// Wandelt Sekunden seit der Epoche in einen UTC-Zeitpunkt
pub fn aus_sekunden(sek: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(sek, 0).ok_or(CoreError::UngueltigerZeitstempel(sek))
}

/// Schneidet einen Zeitpunkt auf ganze Sekunden ab
pub fn auf_sekunden(zeitpunkt: DateTime<Utc>) -> DateTime<Utc> {
    // Sekunden eines gueltigen DateTime sind immer wieder darstellbar
    DateTime::from_timestamp(zeitpunkt.timestamp(), 0).unwrap_or(zeitpunkt)
}
