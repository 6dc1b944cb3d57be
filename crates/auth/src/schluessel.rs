//! Signaturschluessel fuer Session-Tokens
//!
//! Der Schluessel wird einmal beim Start aus der Konfiguration erzeugt und per
//! `Arc` an Aussteller und Pruefer weitergereicht. Es gibt keinen globalen
//! Zustand.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Mindestlaenge des Geheimnisses in Bytes
pub const MIN_SCHLUESSEL_BYTES: usize = 32;

/// Signiert und prueft Token-Daten
///
/// Die Trennung erlaubt Tests mit einem Signierer, der beim Signieren
/// fehlschlaegt.
pub trait Signierer: Send + Sync {
    fn signieren(&self, daten: &[u8]) -> AuthResult<Vec<u8>>;

    /// Prueft eine Signatur in konstanter Zeit
    fn pruefen(&self, daten: &[u8], signatur: &[u8]) -> bool;
}

/// HMAC-SHA256-Schluessel
pub struct Signaturschluessel {
    geheimnis: Vec<u8>,
}

impl Signaturschluessel {
    /// Erstellt den Schluessel; kuerzer als 32 Bytes ist ein Fehler
    pub fn aus_bytes(geheimnis: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let geheimnis = geheimnis.into();
        if geheimnis.len() < MIN_SCHLUESSEL_BYTES {
            return Err(AuthError::SchluesselUngueltig(format!(
                "Geheimnis hat {} Bytes, mindestens {MIN_SCHLUESSEL_BYTES} erforderlich",
                geheimnis.len()
            )));
        }
        Ok(Self { geheimnis })
    }

    fn mac(&self) -> AuthResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.geheimnis)
            .map_err(|e| AuthError::Signatur(e.to_string()))
    }
}

impl Signierer for Signaturschluessel {
    fn signieren(&self, daten: &[u8]) -> AuthResult<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(daten);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn pruefen(&self, daten: &[u8], signatur: &[u8]) -> bool {
        let Ok(mut mac) = self.mac() else {
            return false;
        };
        mac.update(daten);
        mac.verify_slice(signatur).is_ok()
    }
}

impl std::fmt::Debug for Signaturschluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signaturschluessel")
            .field("geheimnis", &"<verborgen>")
            .finish()
    }
}
