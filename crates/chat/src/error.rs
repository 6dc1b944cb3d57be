//! Fehlertypen fuer das Chat-Crate

use plauder_core::MessageId;
use thiserror::Error;

/// Fehler beim Dekodieren eines gespeicherten oder empfangenen Umschlags
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DekodierFehler {
    #[error("Umschlag ist kein gueltiges JSON: {0}")]
    Fehlerhaft(String),

    #[error("Nutzlast fehlt oder passt nicht zur Art (type = {art})")]
    FehlendeNutzlast { art: i64 },

    #[error("Mehr als eine Nutzlast belegt (type = {art}, {anzahl} Nutzlasten)")]
    UngueltigeVariante { art: i64, anzahl: usize },

    #[error("Verschachtelung tiefer als {max} Ebenen")]
    ZuTief { max: usize },
}

/// Fehler beim Kodieren eines Umschlags
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KodierFehler {
    #[error("Nutzlast passt nicht zur Art: {0}")]
    UngueltigeVariante(String),

    #[error("Verschachtelung tiefer als {max} Ebenen")]
    ZuTief { max: usize },

    #[error("Verschachtelter Umschlag ungueltig: {0}")]
    Verschachtelt(#[source] DekodierFehler),

    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(String),
}

/// Chat-Fehlertypen
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Nachricht nicht gefunden: {0}")]
    NachrichtNichtGefunden(MessageId),

    #[error("Empfaenger unbekannt: {0}")]
    EmpfaengerUnbekannt(String),

    #[error("Nachricht {id}: Art-Spalte {spalte} passt nicht zum Umschlag ({umschlag})")]
    Inkonsistent { id: MessageId, spalte: i8, umschlag: i8 },

    #[error("Kodieren fehlgeschlagen: {0}")]
    Kodieren(#[from] KodierFehler),

    #[error("Dekodieren fehlgeschlagen: {0}")]
    Dekodieren(#[from] DekodierFehler),

    #[error("Datenbank-Fehler: {0}")]
    DatenbankFehler(#[from] plauder_db::DbError),

    #[error("Core-Fehler: {0}")]
    Core(#[from] plauder_core::CoreError),
}

impl ChatError {
    /// Richtung eines Codec-Fehlers (Metrik-Label), sonst `None`
    pub fn codec_richtung(&self) -> Option<&'static str> {
        match self {
            Self::Kodieren(_) => Some("kodieren"),
            Self::Dekodieren(_) | Self::Inkonsistent { .. } => Some("dekodieren"),
            _ => None,
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
