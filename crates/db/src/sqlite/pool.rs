//! SQLite-Zeilenspeicher: Pool, Pragmas und Migrationen
//!
//! Alle Pragmas kommen aus `[datenbank]`. Fremdschluessel sind immer an,
//! weil `user_conf` und die Nachrichten-Tabellen per CASCADE an `users`
//! haengen.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use tracing::{debug, info};

use crate::error::DbError;
use crate::repository::DatabaseConfig;

/// Zeilenspeicher fuer Benutzer und Nachrichten
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pub(crate) pool: SqlitePool,
}

/// Verbindungsoptionen aus der Konfiguration
///
/// Mit WAL reicht `synchronous = NORMAL`; ohne WAL bleibt es bei `FULL`.
fn verbindungsoptionen(config: &DatabaseConfig) -> Result<SqliteConnectOptions, DbError> {
    let (journal, synchronous) = if config.sqlite_wal && !config.ist_in_memory() {
        (SqliteJournalMode::Wal, SqliteSynchronous::Normal)
    } else {
        (SqliteJournalMode::Delete, SqliteSynchronous::Full)
    };

    Ok(SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .journal_mode(journal)
        .synchronous(synchronous)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .foreign_keys(true))
}

impl SqliteDb {
    /// Oeffnet den Pool und bringt das Schema auf den neuesten Stand
    pub async fn oeffnen(config: &DatabaseConfig) -> Result<Self, DbError> {
        if config.max_verbindungen == 0 {
            return Err(DbError::UngueltigeDaten(
                "max_verbindungen muss mindestens 1 sein".into(),
            ));
        }

        let mut pool_optionen = SqlitePoolOptions::new().max_connections(config.max_verbindungen);
        if config.ist_in_memory() {
            // Jede Verbindung saehe sonst ihre eigene, leere Datenbank
            pool_optionen = pool_optionen
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_optionen
            .connect_with(verbindungsoptionen(config)?)
            .await?;

        info!(
            url = %config.url,
            wal = config.sqlite_wal,
            max_verbindungen = config.max_verbindungen,
            "Zeilenspeicher geoeffnet"
        );

        let db = Self { pool };
        db.migrationen_ausfuehren().await?;
        Ok(db)
    }

    /// Fluechtige Datenbank mit vollem Schema (Tests)
    pub async fn in_memory() -> Result<Self, DbError> {
        Self::oeffnen(&DatabaseConfig::in_memory()).await
    }

    /// Fuehrt alle ausstehenden Migrationen aus
    pub async fn migrationen_ausfuehren(&self) -> Result<(), DbError> {
        let migrator = sqlx::migrate!("./migrations");
        migrator.run(&self.pool).await?;
        debug!(anzahl = migrator.iter().count(), "Schema aktuell");
        Ok(())
    }

    /// Prueft ob die Verbindung nutzbar ist (fuer den Health-Check)
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
