//! plauder-auth – Tokens, Passwoerter und Konten
//!
//! Dieses Crate implementiert:
//! - Signaturschluessel (HMAC-SHA256), einmal beim Start erzeugt
//! - TokenAussteller: signierte, zeitlich begrenzte Session-Tokens
//! - TokenPruefer: Pruefung pro Anfrage mit gleitender Erneuerung
//! - Passwort-Hashing mit Argon2id
//! - AuthService (Registrierung, Login, Profil)

pub mod error;
pub mod gate;
pub mod password;
pub mod schluessel;
pub mod service;
pub mod token;

// Bequeme Re-Exporte
pub use error::{AuthError, AuthResult};
pub use gate::{Ablehnung, Pruefergebnis, TokenPruefer};
pub use password::{passwort_hashen, passwort_verifizieren, HashKosten};
pub use schluessel::{Signaturschluessel, Signierer};
pub use service::{AuthService, Profil, Registrierung};
pub use token::{SessionToken, TokenAussteller, TokenClaims, MAX_TTL_STUNDEN};
