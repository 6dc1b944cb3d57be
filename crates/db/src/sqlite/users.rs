//! SQLite-Implementierung des UserRepository
//!
//! Ein Benutzer besteht aus einer Zeile in `users` und genau einer Zeile in
//! `user_conf`. Beide werden gemeinsam angelegt und gemeinsam geaendert.

use plauder_core::{zeit, UserId};
use sqlx::{QueryBuilder, Sqlite};

use crate::error::DbError;
use crate::models::{
    BenutzerEinstellungen, BenutzerRecord, BenutzerUpdate, EinstellungenUpdate, Geschlecht,
    NeuerBenutzer, Suchbarkeit, Verifizierung, Verifizierungsfragen,
};
use crate::repository::{DbResult, UserRepository};
use crate::sqlite::pool::SqliteDb;

const BENUTZER_SELECT: &str = "SELECT u.id, u.email, u.phone, u.password_hash, u.nickname,
            u.signature, u.avatar, u.address, u.birthday, u.sex,
            u.create_time, u.update_time,
            c.recall_message, c.friend_online, c.sound, c.secure_link, c.save_pwd,
            c.search_user, c.verification, c.verification_question
     FROM users u JOIN user_conf c ON c.user_id = u.id";

/// Uebersetzt Eindeutigkeitsverletzungen in `DbError::Eindeutigkeit`
fn eindeutigkeit(e: sqlx::Error, was: impl FnOnce() -> String) -> DbError {
    let msg = e.to_string();
    if msg.contains("UNIQUE") || msg.contains("unique") {
        DbError::Eindeutigkeit(was())
    } else {
        DbError::Sqlx(e)
    }
}

impl UserRepository for SqliteDb {
    async fn create(&self, data: NeuerBenutzer<'_>) -> DbResult<BenutzerRecord> {
        let jetzt = zeit::jetzt_ms();
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            "INSERT INTO users (email, password_hash, create_time, update_time)
             VALUES (?, ?, ?, ?)",
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(jetzt)
        .bind(jetzt)
        .execute(&mut *tx)
        .await
        .map_err(|e| eindeutigkeit(e, || format!("E-Mail '{}' bereits registriert", data.email)))?
        .last_insert_rowid();

        sqlx::query("INSERT INTO user_conf (user_id, create_time, update_time) VALUES (?, ?, ?)")
            .bind(id)
            .bind(jetzt)
            .bind(jetzt)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(BenutzerRecord {
            id: UserId(id),
            email: data.email.to_string(),
            telefon: None,
            password_hash: data.password_hash.to_string(),
            nickname: String::new(),
            signatur: String::new(),
            avatar: String::new(),
            adresse: String::new(),
            geburtstag: 0,
            geschlecht: Geschlecht::default(),
            einstellungen: BenutzerEinstellungen::default(),
            create_time_ms: jetzt,
            update_time_ms: jetzt,
        })
    }

    async fn get_by_id(&self, id: UserId) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("{BENUTZER_SELECT} WHERE u.id = ?"))
            .bind(id.inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<BenutzerRecord>> {
        let row = sqlx::query(&format!("{BENUTZER_SELECT} WHERE u.email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_benutzer(&r)).transpose()
    }

    async fn update_profil(&self, id: UserId, data: BenutzerUpdate) -> DbResult<BenutzerRecord> {
        let jetzt = zeit::jetzt_ms();
        let mut tx = self.pool.begin().await?;

        // update_time wird immer gesetzt, damit rows_affected die Existenz zeigt
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET update_time = ");
        query.push_bind(jetzt);
        if let Some(telefon) = &data.telefon {
            let telefon = (!telefon.is_empty()).then(|| telefon.clone());
            query.push(", phone = ").push_bind(telefon);
        }
        if let Some(nickname) = &data.nickname {
            query.push(", nickname = ").push_bind(nickname.clone());
        }
        if let Some(signatur) = &data.signatur {
            query.push(", signature = ").push_bind(signatur.clone());
        }
        if let Some(avatar) = &data.avatar {
            query.push(", avatar = ").push_bind(avatar.clone());
        }
        if let Some(adresse) = &data.adresse {
            query.push(", address = ").push_bind(adresse.clone());
        }
        if let Some(geburtstag) = data.geburtstag {
            query.push(", birthday = ").push_bind(geburtstag);
        }
        if let Some(geschlecht) = data.geschlecht {
            query.push(", sex = ").push_bind(i8::from(geschlecht));
        }
        query.push(" WHERE id = ").push_bind(id.inner());

        let affected = query
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| eindeutigkeit(e, || "Telefonnummer bereits vergeben".to_string()))?
            .rows_affected();

        if affected == 0 {
            return Err(DbError::nicht_gefunden(id.to_string()));
        }

        if !data.einstellungen.ist_leer() {
            einstellungen_query(&data.einstellungen, id, jetzt)?
                .build()
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::intern("Benutzer nach Update nicht gefunden"))
    }
}

fn einstellungen_query(
    data: &EinstellungenUpdate,
    id: UserId,
    jetzt: i64,
) -> DbResult<QueryBuilder<'static, Sqlite>> {
    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE user_conf SET update_time = ");
    query.push_bind(jetzt);
    if let Some(hinweis) = &data.rueckruf_hinweis {
        let hinweis = (!hinweis.is_empty()).then(|| hinweis.clone());
        query.push(", recall_message = ").push_bind(hinweis);
    }
    for (spalte, wert) in [
        ("friend_online", data.freund_online),
        ("sound", data.ton),
        ("secure_link", data.sichere_links),
        ("save_pwd", data.passwort_merken),
    ] {
        if let Some(wert) = wert {
            query.push(format!(", {spalte} = ")).push_bind(wert);
        }
    }
    if let Some(suchbarkeit) = data.suchbarkeit {
        query.push(", search_user = ").push_bind(i8::from(suchbarkeit));
    }
    if let Some(verifizierung) = data.verifizierung {
        query.push(", verification = ").push_bind(i8::from(verifizierung));
    }
    if let Some(fragen) = &data.verifizierungsfragen {
        let json = serde_json::to_string(fragen)
            .map_err(|e| DbError::UngueltigeDaten(format!("Verifizierungsfragen: {e}")))?;
        query.push(", verification_question = ").push_bind(json);
    }
    query.push(" WHERE user_id = ").push_bind(id.inner());
    Ok(query)
}

fn row_to_benutzer(row: &sqlx::sqlite::SqliteRow) -> DbResult<BenutzerRecord> {
    use sqlx::Row as _;

    let fragen: Option<String> = row.try_get("verification_question")?;
    let verifizierungsfragen = fragen
        .map(|json| serde_json::from_str::<Verifizierungsfragen>(&json))
        .transpose()
        .map_err(|e| DbError::UngueltigeDaten(format!("Verifizierungsfragen: {e}")))?;

    Ok(BenutzerRecord {
        id: UserId(row.try_get("id")?),
        email: row.try_get("email")?,
        telefon: row.try_get("phone")?,
        password_hash: row.try_get("password_hash")?,
        nickname: row.try_get("nickname")?,
        signatur: row.try_get("signature")?,
        avatar: row.try_get("avatar")?,
        adresse: row.try_get("address")?,
        geburtstag: row.try_get("birthday")?,
        geschlecht: Geschlecht::try_from(row.try_get::<i8, _>("sex")?)?,
        einstellungen: BenutzerEinstellungen {
            rueckruf_hinweis: row.try_get("recall_message")?,
            freund_online: row.try_get("friend_online")?,
            ton: row.try_get("sound")?,
            sichere_links: row.try_get("secure_link")?,
            passwort_merken: row.try_get("save_pwd")?,
            suchbarkeit: Suchbarkeit::try_from(row.try_get::<i8, _>("search_user")?)?,
            verifizierung: Verifizierung::try_from(row.try_get::<i8, _>("verification")?)?,
            verifizierungsfragen,
        },
        create_time_ms: row.try_get("create_time")?,
        update_time_ms: row.try_get("update_time")?,
    })
}
