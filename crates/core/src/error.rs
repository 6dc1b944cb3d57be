//! Fehlertypen fuer Plauder
//!
//! Zentraler Fehler-Enum fuer crate-uebergreifende Fehlerzustaende.
//! Untermodule definieren eigene Fehler und konvertieren via `#[from]`.

use thiserror::Error;

/// Globaler Result-Alias fuer Plauder
pub type Result<T> = std::result::Result<T, CoreError>;

/// Crate-uebergreifende Fehler
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Ungueltige ID ({art}): {wert}")]
    UngueltigeId { art: &'static str, wert: String },

    #[error("Ungueltiger Zeitstempel: {0}")]
    UngueltigerZeitstempel(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CoreError::UngueltigeId {
            art: "user",
            wert: "abc".into(),
        };
        assert_eq!(e.to_string(), "Ungueltige ID (user): abc");
    }

    #[test]
    fn zeitstempel_fehler() {
        let e = CoreError::UngueltigerZeitstempel(-1);
        assert_eq!(e.to_string(), "Ungueltiger Zeitstempel: -1");
    }
}
