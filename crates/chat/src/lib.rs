//! plauder-chat – Nachrichten-Umschlag, Codec und ChatService
//!
//! Dieses Crate implementiert:
//! - NachrichtenArt: Zahlencodes und Bezeichnungen der Nachrichtenarten
//! - Umschlag: rekursiver Nachrichteninhalt mit genau einer Nutzlast
//! - Codec: JSON-Kodierung mit Tiefenbudget
//! - ChatService: Speichern und Laden ueber den Zeilenspeicher
//!
//! # Beispiel
//!
//! ```no_run
//! use std::sync::Arc;
//! use plauder_chat::{ChatService, Umschlag, UmschlagCodec};
//! use plauder_core::UserId;
//! use plauder_db::SqliteDb;
//!
//! #[tokio::main]
//! async fn main() {
//!     let db = Arc::new(SqliteDb::in_memory().await.unwrap());
//!     let chat = ChatService::neu(db, UmschlagCodec::default());
//!
//!     let umschlag = Umschlag::zurueckgezogen("message recalled", Umschlag::text("hi"));
//!     let _ = chat.chat_umschlag_senden(UserId(1), UserId(2), umschlag).await;
//! }
//! ```

pub mod art;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod service;
pub mod types;


// Bequeme Re-Exporte
pub use art::NachrichtenArt;
pub use codec::{dekodieren, kodieren, kodieren_roh, RohUmschlag, UmschlagCodec};
pub use envelope::{
    AnrufNachricht, AntwortNachricht, BildNachricht, DateiNachricht, ErwaehnungNachricht,
    RueckrufNachricht, SprachNachricht, Umschlag, VideoNachricht, ZitatNachricht,
};
pub use error::{ChatError, ChatResult, DekodierFehler, KodierFehler};
pub use service::ChatService;
pub use types::{ChatNachricht, GruppenNachricht, HistoryAnfrage};
