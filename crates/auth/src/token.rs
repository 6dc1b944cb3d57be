//! Session-Tokens (HS256, kompaktes JWT-Format)
//!
//! Ein Token besteht aus `base64url(header).base64url(claims).base64url(signatur)`.
//! Es bindet Benutzer-ID und Client-Fingerabdruck (User-Agent) an eine
//! Ablaufzeit. Serverseitig wird nichts gespeichert.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use plauder_core::{zeit, UserId};

use crate::error::{AuthError, AuthResult};
use crate::schluessel::Signierer;

/// Standard-Gueltigkeit eines Tokens
pub const STANDARD_TTL_STUNDEN: i64 = 72;

/// Obergrenze fuer konfigurierte Lebensdauern (ein Jahr)
pub const MAX_TTL_STUNDEN: i64 = 24 * 365;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Header {
    alg: String,
    typ: String,
}

fn header_kodiert() -> AuthResult<String> {
    let header = Header {
        alg: "HS256".into(),
        typ: "JWT".into(),
    };
    let json = serde_json::to_vec(&header).map_err(|e| AuthError::Signatur(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Nutzdaten eines Tokens, Zeiten in Sekunden seit der Epoche
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Benutzer-ID
    pub sub: UserId,
    /// Client-Fingerabdruck (User-Agent)
    pub ua: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn ausgestellt_am(&self) -> AuthResult<DateTime<Utc>> {
        zeit::aus_sekunden(self.iat).map_err(|_| AuthError::TokenUngueltig)
    }

    pub fn laeuft_ab_am(&self) -> AuthResult<DateTime<Utc>> {
        zeit::aus_sekunden(self.exp).map_err(|_| AuthError::TokenUngueltig)
    }
}

/// Ein ausgestelltes Token samt Nutzdaten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Stellt signierte Tokens aus und prueft deren Signatur
pub struct TokenAussteller {
    signierer: Arc<dyn Signierer>,
    ttl: Duration,
}

impl TokenAussteller {
    pub fn neu(signierer: Arc<dyn Signierer>) -> Self {
        Self {
            signierer,
            ttl: Duration::hours(STANDARD_TTL_STUNDEN),
        }
    }

    pub fn mit_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Stellt ein Token aus; `jetzt` wird auf ganze Sekunden abgeschnitten
    ///
    /// Gleiche Eingaben und gleicher Schluessel ergeben dasselbe Token.
    pub fn ausstellen(
        &self,
        subjekt: UserId,
        fingerabdruck: &str,
        jetzt: DateTime<Utc>,
    ) -> AuthResult<SessionToken> {
        let iat = zeit::auf_sekunden(jetzt);
        let exp = iat
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Signatur("Ablaufzeit ausserhalb des Zeitbereichs".into()))?;
        let claims = TokenClaims {
            sub: subjekt,
            ua: fingerabdruck.to_string(),
            iat: iat.timestamp(),
            exp: exp.timestamp(),
        };

        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| AuthError::Signatur(e.to_string()))?;
        let inhalt = format!("{}.{}", header_kodiert()?, URL_SAFE_NO_PAD.encode(claims_json));
        let signatur = self.signierer.signieren(inhalt.as_bytes())?;

        Ok(SessionToken {
            token: format!("{inhalt}.{}", URL_SAFE_NO_PAD.encode(signatur)),
            claims,
        })
    }

    /// Prueft Format und Signatur; Ablauf und Fingerabdruck prueft der `TokenPruefer`
    pub fn verifizieren(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut teile = token.split('.');
        let (Some(header), Some(claims), Some(signatur), None) =
            (teile.next(), teile.next(), teile.next(), teile.next())
        else {
            return Err(AuthError::TokenUngueltig);
        };

        let signatur = URL_SAFE_NO_PAD
            .decode(signatur)
            .map_err(|_| AuthError::TokenUngueltig)?;
        let inhalt_len = header.len() + 1 + claims.len();
        if !self
            .signierer
            .pruefen(&token.as_bytes()[..inhalt_len], &signatur)
        {
            return Err(AuthError::TokenUngueltig);
        }

        let header: Header = URL_SAFE_NO_PAD
            .decode(header)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(AuthError::TokenUngueltig)?;
        if header.alg != "HS256" {
            return Err(AuthError::TokenUngueltig);
        }

        URL_SAFE_NO_PAD
            .decode(claims)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(AuthError::TokenUngueltig)
    }
}
