//! SQLite-Implementierung des GroupMessageRepository
//!
//! Gruppen und Mitgliedschaften werden nicht verwaltet; `group_id` ist eine
//! reine Fremd-ID ohne Pruefung.

use plauder_core::{zeit, GroupId, MessageId};

use crate::models::{GruppenNachrichtRecord, NachrichtenZeile, NeueNachricht, VerlaufFilter};
use crate::repository::{DbResult, GroupMessageRepository};
use crate::sqlite::chat::row_to_zeile;
use crate::sqlite::pool::SqliteDb;

const GRUPPEN_SPALTEN: &str = "id, create_time, update_time, msg_type, msg_preview, msg, \
                               group_id, send_user_id";

impl GroupMessageRepository for SqliteDb {
    async fn create_gruppe(
        &self,
        group_id: GroupId,
        data: NeueNachricht<'_>,
    ) -> DbResult<GruppenNachrichtRecord> {
        let jetzt = zeit::jetzt_ms();

        let ergebnis = sqlx::query(
            "INSERT INTO group_messages
             (create_time, update_time, msg_type, msg_preview, msg, group_id, send_user_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(jetzt)
        .bind(jetzt)
        .bind(i64::from(data.art))
        .bind(data.vorschau)
        .bind(data.nutzlast)
        .bind(group_id.inner())
        .bind(data.sender_id.inner())
        .execute(&self.pool)
        .await?;

        Ok(GruppenNachrichtRecord {
            zeile: NachrichtenZeile {
                id: MessageId(ergebnis.last_insert_rowid()),
                create_time_ms: jetzt,
                update_time_ms: jetzt,
                art: data.art,
                vorschau: data.vorschau.to_string(),
                nutzlast: data.nutzlast.to_string(),
                sender_id: data.sender_id,
            },
            group_id,
        })
    }

    async fn get_gruppe_by_id(&self, id: MessageId) -> DbResult<Option<GruppenNachrichtRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {GRUPPEN_SPALTEN} FROM group_messages WHERE id = ?"
        ))
        .bind(id.inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_gruppe(&r)).transpose()
    }

    async fn get_gruppenverlauf(
        &self,
        group_id: GroupId,
        filter: VerlaufFilter,
    ) -> DbResult<Vec<GruppenNachrichtRecord>> {
        let limit = filter.effektives_limit();
        let vor_id = filter.vor_id.map(|id| id.inner()).unwrap_or(i64::MAX);

        let rows = sqlx::query(&format!(
            "SELECT {GRUPPEN_SPALTEN} FROM group_messages
             WHERE group_id = ? AND id < ?
             ORDER BY id DESC
             LIMIT ?"
        ))
        .bind(group_id.inner())
        .bind(vor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_gruppe).collect()
    }
}

fn row_to_gruppe(row: &sqlx::sqlite::SqliteRow) -> DbResult<GruppenNachrichtRecord> {
    use sqlx::Row as _;

    Ok(GruppenNachrichtRecord {
        zeile: row_to_zeile(row)?,
        group_id: GroupId(row.try_get("group_id")?),
    })
}
