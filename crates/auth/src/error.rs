//! Fehlertypen fuer den Auth-Service

use thiserror::Error;

/// Alle moeglichen Fehler im Auth-Service
#[derive(Debug, Error)]
pub enum AuthError {
    // --- Passwort ---
    #[error("Passwort-Hashing fehlgeschlagen: {0}")]
    PasswortHashing(String),

    #[error("Passwoerter stimmen nicht ueberein")]
    PasswoerterUngleich,

    // --- Authentifizierung ---
    #[error("E-Mail oder Passwort falsch")]
    UngueltigeAnmeldedaten,

    // --- Token ---
    #[error("Signaturschluessel ungueltig: {0}")]
    SchluesselUngueltig(String),

    #[error("Signieren fehlgeschlagen: {0}")]
    Signatur(String),

    #[error("Token ungueltig")]
    TokenUngueltig,

    // --- Benutzerverwaltung ---
    #[error("E-Mail bereits registriert: {0}")]
    EmailVergeben(String),

    #[error("Telefonnummer bereits vergeben")]
    TelefonVergeben,

    #[error("Profil ungueltig: {0}")]
    UngueltigesProfil(String),

    #[error("Benutzer nicht gefunden: {0}")]
    BenutzerNichtGefunden(String),

    // --- Datenbank ---
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] plauder_db::DbError),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl AuthError {
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Ob der Fehler durch die Eingabe des Benutzers entstand
    pub fn ist_benutzerfehler(&self) -> bool {
        matches!(
            self,
            Self::PasswoerterUngleich
                | Self::UngueltigeAnmeldedaten
                | Self::EmailVergeben(_)
                | Self::TelefonVergeben
                | Self::UngueltigesProfil(_)
                | Self::BenutzerNichtGefunden(_)
        )
    }
}

/// Result-Alias fuer den Auth-Service
pub type AuthResult<T> = Result<T, AuthError>;
