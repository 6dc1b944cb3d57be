//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Geschaeftslogik von der konkreten
//! Datenbank-Implementierung. Die Futures sind `Send`, damit Services direkt
//! aus Axum-Handlern aufgerufen werden koennen.

use std::future::Future;

use plauder_core::{GroupId, MessageId, UserId};

use crate::error::DbError;
use crate::models::{
    BenutzerRecord, BenutzerUpdate, ChatNachrichtRecord, GruppenNachrichtRecord, NeueNachricht,
    NeuerBenutzer, VerlaufFilter,
};

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://plauder.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
    /// Wartezeit auf eine gesperrte Datenbank, bevor `SQLITE_BUSY` zurueckkommt
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://plauder.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
            busy_timeout_ms: 5_000,
        }
    }
}

impl DatabaseConfig {
    /// Fluechtige Datenbank fuer Tests, nur eine Verbindung
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_verbindungen: 1,
            sqlite_wal: false,
            ..Self::default()
        }
    }

    pub fn ist_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Repository fuer Benutzer-Datenzugriffe
pub trait UserRepository: Send + Sync {
    /// Legt einen neuen Benutzer an; doppelte E-Mail ergibt `DbError::Eindeutigkeit`
    fn create(
        &self,
        data: NeuerBenutzer<'_>,
    ) -> impl Future<Output = DbResult<BenutzerRecord>> + Send;

    fn get_by_id(&self, id: UserId) -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    fn get_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = DbResult<Option<BenutzerRecord>>> + Send;

    /// Aendert die gesetzten Profilfelder und gibt den neuen Stand zurueck
    fn update_profil(
        &self,
        id: UserId,
        data: BenutzerUpdate,
    ) -> impl Future<Output = DbResult<BenutzerRecord>> + Send;
}

/// Repository fuer 1:1-Nachrichten
pub trait ChatMessageRepository: Send + Sync {
    fn create_chat(
        &self,
        empfaenger_id: UserId,
        data: NeueNachricht<'_>,
    ) -> impl Future<Output = DbResult<ChatNachrichtRecord>> + Send;

    fn get_chat_by_id(
        &self,
        id: MessageId,
    ) -> impl Future<Output = DbResult<Option<ChatNachrichtRecord>>> + Send;

    /// Verlauf zwischen zwei Benutzern (beide Richtungen), neueste zuerst
    fn get_unterhaltung(
        &self,
        a: UserId,
        b: UserId,
        filter: VerlaufFilter,
    ) -> impl Future<Output = DbResult<Vec<ChatNachrichtRecord>>> + Send;
}

/// Repository fuer Gruppen-Nachrichten
pub trait GroupMessageRepository: Send + Sync {
    fn create_gruppe(
        &self,
        group_id: GroupId,
        data: NeueNachricht<'_>,
    ) -> impl Future<Output = DbResult<GruppenNachrichtRecord>> + Send;

    fn get_gruppe_by_id(
        &self,
        id: MessageId,
    ) -> impl Future<Output = DbResult<Option<GruppenNachrichtRecord>>> + Send;

    /// Verlauf einer Gruppe, neueste zuerst
    fn get_gruppenverlauf(
        &self,
        group_id: GroupId,
        filter: VerlaufFilter,
    ) -> impl Future<Output = DbResult<Vec<GruppenNachrichtRecord>>> + Send;
}
