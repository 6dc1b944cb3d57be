//! SQLite-Implementierung des ChatMessageRepository

use plauder_core::{zeit, MessageId, UserId};

use crate::error::DbError;
use crate::models::{ChatNachrichtRecord, NachrichtenZeile, NeueNachricht, VerlaufFilter};
use crate::repository::{ChatMessageRepository, DbResult};
use crate::sqlite::pool::SqliteDb;

const CHAT_SPALTEN: &str = "id, create_time, update_time, msg_type, msg_preview, msg, \
                            send_user_id, rev_user_id";

impl ChatMessageRepository for SqliteDb {
    async fn create_chat(
        &self,
        empfaenger_id: UserId,
        data: NeueNachricht<'_>,
    ) -> DbResult<ChatNachrichtRecord> {
        let jetzt = zeit::jetzt_ms();

        let ergebnis = sqlx::query(
            "INSERT INTO chat_messages
             (create_time, update_time, msg_type, msg_preview, msg, send_user_id, rev_user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(jetzt)
        .bind(jetzt)
        .bind(i64::from(data.art))
        .bind(data.vorschau)
        .bind(data.nutzlast)
        .bind(data.sender_id.inner())
        .bind(empfaenger_id.inner())
        .execute(&self.pool)
        .await?;

        Ok(ChatNachrichtRecord {
            zeile: NachrichtenZeile {
                id: MessageId(ergebnis.last_insert_rowid()),
                create_time_ms: jetzt,
                update_time_ms: jetzt,
                art: data.art,
                vorschau: data.vorschau.to_string(),
                nutzlast: data.nutzlast.to_string(),
                sender_id: data.sender_id,
            },
            empfaenger_id,
        })
    }

    async fn get_chat_by_id(&self, id: MessageId) -> DbResult<Option<ChatNachrichtRecord>> {
        let row = sqlx::query(&format!("SELECT {CHAT_SPALTEN} FROM chat_messages WHERE id = ?"))
            .bind(id.inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_chat(&r)).transpose()
    }

    async fn get_unterhaltung(
        &self,
        a: UserId,
        b: UserId,
        filter: VerlaufFilter,
    ) -> DbResult<Vec<ChatNachrichtRecord>> {
        let limit = filter.effektives_limit();
        let vor_id = filter.vor_id.map(|id| id.inner()).unwrap_or(i64::MAX);

        let rows = sqlx::query(&format!(
            "SELECT {CHAT_SPALTEN} FROM chat_messages
             WHERE ((send_user_id = ? AND rev_user_id = ?)
                 OR (send_user_id = ? AND rev_user_id = ?))
               AND id < ?
             ORDER BY id DESC
             LIMIT ?"
        ))
        .bind(a.inner())
        .bind(b.inner())
        .bind(b.inner())
        .bind(a.inner())
        .bind(vor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_chat).collect()
    }
}

/// Liest die gemeinsamen Nachrichten-Spalten
pub(crate) fn row_to_zeile(row: &sqlx::sqlite::SqliteRow) -> DbResult<NachrichtenZeile> {
    use sqlx::Row as _;

    let art_roh: i64 = row.try_get("msg_type")?;
    let art = i8::try_from(art_roh)
        .map_err(|_| DbError::UngueltigeDaten(format!("msg_type ausserhalb von int8: {art_roh}")))?;

    Ok(NachrichtenZeile {
        id: MessageId(row.try_get("id")?),
        create_time_ms: row.try_get("create_time")?,
        update_time_ms: row.try_get("update_time")?,
        art,
        vorschau: row.try_get("msg_preview")?,
        nutzlast: row.try_get("msg")?,
        sender_id: UserId(row.try_get("send_user_id")?),
    })
}

fn row_to_chat(row: &sqlx::sqlite::SqliteRow) -> DbResult<ChatNachrichtRecord> {
    use sqlx::Row as _;

    Ok(ChatNachrichtRecord {
        zeile: row_to_zeile(row)?,
        empfaenger_id: UserId(row.try_get("rev_user_id")?),
    })
}
