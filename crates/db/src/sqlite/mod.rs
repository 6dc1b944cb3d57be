//! SQLite-Backend-Implementierungen fuer alle Repository-Traits

pub mod chat;
pub mod groups;
pub mod pool;
pub mod users;

pub use pool::SqliteDb;
