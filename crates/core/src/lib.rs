//! plauder-core – Gemeinsame Typen, Zeit-Helfer und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Plauder-Crates gemeinsam genutzt werden.

pub mod error;
pub mod types;
pub mod zeit;

// Re-Exporte fuer bequemen Zugriff
pub use error::{CoreError, Result};
pub use types::{GroupId, MessageId, UserId};
