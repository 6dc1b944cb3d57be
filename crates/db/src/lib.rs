//! plauder-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern fuer den Zeilenspeicher bereit.
//! Nachrichten-Nutzlasten werden als opaker Text abgelegt; das Kodieren und
//! Dekodieren des Umschlags passiert ausserhalb dieses Crates.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    ChatMessageRepository, DatabaseConfig, DbResult, GroupMessageRepository, UserRepository,
};
pub use sqlite::SqliteDb;
