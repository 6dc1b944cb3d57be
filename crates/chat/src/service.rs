//! ChatService – Nachrichten speichern und laden
//!
//! Der Service ist die Grenze zwischen Umschlag und Zeilenspeicher: beim
//! Schreiben wird kodiert, beim Lesen dekodiert. Die Datenbank sieht nur
//! opaken Text.

use std::sync::Arc;

use plauder_core::{zeit, GroupId, MessageId, UserId};
use plauder_db::{
    models::{ChatNachrichtRecord, GruppenNachrichtRecord, NachrichtenZeile, NeueNachricht},
    ChatMessageRepository, GroupMessageRepository, UserRepository,
};
use tracing::{debug, warn};

use crate::{
    art::NachrichtenArt,
    codec::{RohUmschlag, UmschlagCodec},
    envelope::Umschlag,
    error::{ChatError, ChatResult},
    types::{ChatNachricht, GruppenNachricht, HistoryAnfrage},
};

/// Dekodierte Zeile, gemeinsam fuer beide Tabellen
struct Gelesen {
    art: NachrichtenArt,
    umschlag: Umschlag,
}

/// ChatService verwaltet 1:1- und Gruppen-Nachrichten
pub struct ChatService<R>
where
    R: ChatMessageRepository + GroupMessageRepository + UserRepository,
{
    repo: Arc<R>,
    codec: UmschlagCodec,
}

impl<R> ChatService<R>
where
    R: ChatMessageRepository + GroupMessageRepository + UserRepository,
{
    /// Erstellt einen neuen ChatService
    pub fn neu(repo: Arc<R>, codec: UmschlagCodec) -> Arc<Self> {
        Arc::new(Self { repo, codec })
    }

    pub fn codec(&self) -> UmschlagCodec {
        self.codec
    }

    // -----------------------------------------------------------------------
    // 1:1-Nachrichten
    // -----------------------------------------------------------------------

    /// Nimmt einen Umschlag in loser Form an (z.B. aus einer HTTP-Anfrage)
    pub async fn chat_senden(
        &self,
        sender_id: UserId,
        empfaenger_id: UserId,
        roh: &RohUmschlag,
    ) -> ChatResult<ChatNachricht> {
        let umschlag = self.codec.pruefen_roh(roh)?;
        self.chat_umschlag_senden(sender_id, empfaenger_id, umschlag)
            .await
    }

    pub async fn chat_umschlag_senden(
        &self,
        sender_id: UserId,
        empfaenger_id: UserId,
        umschlag: Umschlag,
    ) -> ChatResult<ChatNachricht> {
        if UserRepository::get_by_id(self.repo.as_ref(), empfaenger_id)
            .await?
            .is_none()
        {
            return Err(ChatError::EmpfaengerUnbekannt(empfaenger_id.to_string()));
        }

        let nutzlast = self.codec.kodieren(&umschlag)?;
        let vorschau = umschlag.vorschau();
        let art = umschlag.art();

        let record = self
            .repo
            .create_chat(
                empfaenger_id,
                NeueNachricht {
                    sender_id,
                    art: art.code(),
                    vorschau: &vorschau,
                    nutzlast: &nutzlast,
                },
            )
            .await?;

        debug!(
            id = %record.zeile.id,
            sender = %sender_id,
            empfaenger = %empfaenger_id,
            art = %art,
            "Chat-Nachricht gespeichert"
        );

        chat_aus(record, Gelesen { art, umschlag })
    }

    /// Einzelne 1:1-Nachricht laden
    pub async fn chat_laden(&self, id: MessageId) -> ChatResult<ChatNachricht> {
        let record = self
            .repo
            .get_chat_by_id(id)
            .await?
            .ok_or(ChatError::NachrichtNichtGefunden(id))?;
        let gelesen = self.zeile_lesen(&record.zeile)?;
        chat_aus(record, gelesen)
    }

    /// Unterhaltung zwischen zwei Benutzern, neueste zuerst
    pub async fn unterhaltung_laden(
        &self,
        a: UserId,
        b: UserId,
        anfrage: HistoryAnfrage,
    ) -> ChatResult<Vec<ChatNachricht>> {
        let records = self.repo.get_unterhaltung(a, b, anfrage.into()).await?;

        records
            .into_iter()
            .map(|record| {
                let gelesen = self.zeile_lesen(&record.zeile)?;
                chat_aus(record, gelesen)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Gruppen-Nachrichten
    // -----------------------------------------------------------------------

    pub async fn gruppe_senden(
        &self,
        sender_id: UserId,
        group_id: GroupId,
        roh: &RohUmschlag,
    ) -> ChatResult<GruppenNachricht> {
        let umschlag = self.codec.pruefen_roh(roh)?;
        self.gruppe_umschlag_senden(sender_id, group_id, umschlag)
            .await
    }

    /// Mitgliedschaften werden nicht geprueft
    pub async fn gruppe_umschlag_senden(
        &self,
        sender_id: UserId,
        group_id: GroupId,
        umschlag: Umschlag,
    ) -> ChatResult<GruppenNachricht> {
        let nutzlast = self.codec.kodieren(&umschlag)?;
        let vorschau = umschlag.vorschau();
        let art = umschlag.art();

        let record = self
            .repo
            .create_gruppe(
                group_id,
                NeueNachricht {
                    sender_id,
                    art: art.code(),
                    vorschau: &vorschau,
                    nutzlast: &nutzlast,
                },
            )
            .await?;

        debug!(
            id = %record.zeile.id,
            sender = %sender_id,
            gruppe = %group_id,
            art = %art,
            "Gruppen-Nachricht gespeichert"
        );

        gruppe_aus(record, Gelesen { art, umschlag })
    }

    pub async fn gruppe_laden(&self, id: MessageId) -> ChatResult<GruppenNachricht> {
        let record = self
            .repo
            .get_gruppe_by_id(id)
            .await?
            .ok_or(ChatError::NachrichtNichtGefunden(id))?;
        let gelesen = self.zeile_lesen(&record.zeile)?;
        gruppe_aus(record, gelesen)
    }

    /// Verlauf einer Gruppe, neueste zuerst
    pub async fn gruppenverlauf_laden(
        &self,
        group_id: GroupId,
        anfrage: HistoryAnfrage,
    ) -> ChatResult<Vec<GruppenNachricht>> {
        let records = self
            .repo
            .get_gruppenverlauf(group_id, anfrage.into())
            .await?;

        records
            .into_iter()
            .map(|record| {
                let gelesen = self.zeile_lesen(&record.zeile)?;
                gruppe_aus(record, gelesen)
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Hilfsfunktionen
    // -----------------------------------------------------------------------

    /// Dekodiert die Nutzlast und prueft sie gegen die Art-Spalte
    fn zeile_lesen(&self, zeile: &NachrichtenZeile) -> ChatResult<Gelesen> {
        let umschlag = self
            .codec
            .dekodieren(zeile.nutzlast.as_bytes())
            .map_err(|e| {
                warn!(id = %zeile.id, fehler = %e, "Gespeicherter Umschlag nicht lesbar");
                e
            })?;

        let art = umschlag.art();
        if art.code() != zeile.art {
            warn!(
                id = %zeile.id,
                spalte = zeile.art,
                umschlag = art.code(),
                "Art-Spalte passt nicht zum Umschlag"
            );
            return Err(ChatError::Inkonsistent {
                id: zeile.id,
                spalte: zeile.art,
                umschlag: art.code(),
            });
        }

        Ok(Gelesen { art, umschlag })
    }
}

fn chat_aus(record: ChatNachrichtRecord, gelesen: Gelesen) -> ChatResult<ChatNachricht> {
    Ok(ChatNachricht {
        id: record.zeile.id,
        sender_id: record.zeile.sender_id,
        empfaenger_id: record.empfaenger_id,
        art: gelesen.art,
        art_code: gelesen.art.code(),
        vorschau: record.zeile.vorschau,
        umschlag: gelesen.umschlag,
        erstellt_am: zeit::aus_ms(record.zeile.create_time_ms)?,
        geaendert_am: zeit::aus_ms(record.zeile.update_time_ms)?,
    })
}

fn gruppe_aus(record: GruppenNachrichtRecord, gelesen: Gelesen) -> ChatResult<GruppenNachricht> {
    Ok(GruppenNachricht {
        id: record.zeile.id,
        sender_id: record.zeile.sender_id,
        group_id: record.group_id,
        art: gelesen.art,
        art_code: gelesen.art.code(),
        vorschau: record.zeile.vorschau,
        umschlag: gelesen.umschlag,
        erstellt_am: zeit::aus_ms(record.zeile.create_time_ms)?,
        geaendert_am: zeit::aus_ms(record.zeile.update_time_ms)?,
    })
}
