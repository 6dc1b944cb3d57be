//! Oeffentliche Typen fuer den Chat-Service

use chrono::{DateTime, Utc};
use plauder_core::{GroupId, MessageId, UserId};
use serde::Serialize;

use crate::art::NachrichtenArt;
use crate::envelope::Umschlag;

/// Eine 1:1-Nachricht (Domain-Typ, nicht DB-Record)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatNachricht {
    pub id: MessageId,
    pub sender_id: UserId,
    pub empfaenger_id: UserId,
    pub art: NachrichtenArt,
    pub art_code: i8,
    pub vorschau: String,
    pub umschlag: Umschlag,
    pub erstellt_am: DateTime<Utc>,
    pub geaendert_am: DateTime<Utc>,
}

/// Eine Gruppen-Nachricht
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GruppenNachricht {
    pub id: MessageId,
    pub sender_id: UserId,
    pub group_id: GroupId,
    pub art: NachrichtenArt,
    pub art_code: i8,
    pub vorschau: String,
    pub umschlag: Umschlag,
    pub erstellt_am: DateTime<Utc>,
    pub geaendert_am: DateTime<Utc>,
}

/// Cursor-basierte Paginierung fuer den Verlauf
#[derive(Debug, Clone, Default)]
pub struct HistoryAnfrage {
    /// Nur Nachrichten aelter als diese ID laden
    pub vor_id: Option<MessageId>,
    /// Maximale Anzahl (Default: 50, Maximum: 200)
    pub limit: Option<i64>,
}

impl From<HistoryAnfrage> for plauder_db::models::VerlaufFilter {
    fn from(anfrage: HistoryAnfrage) -> Self {
        Self {
            vor_id: anfrage.vor_id,
            limit: anfrage.limit,
        }
    }
}
