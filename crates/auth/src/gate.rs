//! Token-Pruefung pro Anfrage mit gleitender Erneuerung
//!
//! Ablauf je Anfrage:
//! 1. Token aus `Authorization: Bearer <token>` lesen
//! 2. Signatur pruefen
//! 3. `jetzt < exp`
//! 4. Fingerabdruck der Anfrage gleich dem im Token
//! 5. Restlaufzeit unter der Schwelle: neues Token ausstellen
//!
//! Schlaegt das Erneuern fehl, bleibt das alte, noch gueltige Token massgeblich.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::token::{SessionToken, TokenAussteller, TokenClaims};

/// Standard-Schwelle fuer die Erneuerung
pub const STANDARD_SCHWELLE_STUNDEN: i64 = 24;

/// Grund fuer die Ablehnung einer Anfrage
///
/// Intern unterschieden, nach aussen einheitlich 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Ablehnung {
    #[error("Kein Token uebermittelt")]
    KeinNachweis,

    #[error("Token-Signatur ungueltig")]
    UngueltigeSignatur,

    #[error("Token abgelaufen")]
    Abgelaufen,

    #[error("Fingerabdruck passt nicht zum Token")]
    FingerabdruckAbweichung,
}

impl Ablehnung {
    /// Label fuer Metriken
    pub fn metrik_label(self) -> &'static str {
        match self {
            Self::KeinNachweis => "kein_nachweis",
            Self::UngueltigeSignatur => "ungueltige_signatur",
            Self::Abgelaufen => "abgelaufen",
            Self::FingerabdruckAbweichung => "fingerabdruck",
        }
    }
}

/// Ergebnis einer erfolgreichen Pruefung
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pruefergebnis {
    Authentifiziert { claims: TokenClaims },
    /// Gueltig, zusaetzlich wurde ein neues Token ausgestellt
    Erneuert {
        claims: TokenClaims,
        neues_token: SessionToken,
    },
}

impl Pruefergebnis {
    pub fn claims(&self) -> &TokenClaims {
        match self {
            Self::Authentifiziert { claims } | Self::Erneuert { claims, .. } => claims,
        }
    }

    pub fn neues_token(&self) -> Option<&SessionToken> {
        match self {
            Self::Authentifiziert { .. } => None,
            Self::Erneuert { neues_token, .. } => Some(neues_token),
        }
    }
}

/// Prueft und erneuert Session-Tokens
pub struct TokenPruefer {
    aussteller: Arc<TokenAussteller>,
    schwelle: Duration,
}

impl TokenPruefer {
    pub fn neu(aussteller: Arc<TokenAussteller>) -> Self {
        Self {
            aussteller,
            schwelle: Duration::hours(STANDARD_SCHWELLE_STUNDEN),
        }
    }

    pub fn mit_schwelle(mut self, schwelle: Duration) -> Self {
        self.schwelle = schwelle;
        self
    }

    pub fn schwelle(&self) -> Duration {
        self.schwelle
    }

    /// Prueft den Inhalt des Authorization-Headers
    pub fn pruefen(
        &self,
        authorization: Option<&str>,
        fingerabdruck: &str,
        jetzt: DateTime<Utc>,
    ) -> Result<Pruefergebnis, Ablehnung> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(Ablehnung::KeinNachweis)?;

        let claims = self
            .aussteller
            .verifizieren(token)
            .map_err(|_| Ablehnung::UngueltigeSignatur)?;

        let ablauf = claims
            .laeuft_ab_am()
            .map_err(|_| Ablehnung::UngueltigeSignatur)?;
        if jetzt >= ablauf {
            debug!(user_id = %claims.sub, "Token abgelaufen");
            return Err(Ablehnung::Abgelaufen);
        }

        if claims.ua != fingerabdruck {
            warn!(
                user_id = %claims.sub,
                erwartet = %claims.ua,
                erhalten = %fingerabdruck,
                "Fingerabdruck weicht ab, moeglicher Token-Diebstahl"
            );
            return Err(Ablehnung::FingerabdruckAbweichung);
        }

        if ablauf - jetzt >= self.schwelle {
            return Ok(Pruefergebnis::Authentifiziert { claims });
        }

        match self.aussteller.ausstellen(claims.sub, &claims.ua, jetzt) {
            Ok(neues_token) => {
                debug!(user_id = %claims.sub, exp = neues_token.claims.exp, "Token erneuert");
                Ok(Pruefergebnis::Erneuert {
                    claims,
                    neues_token,
                })
            }
            Err(e) => {
                warn!(user_id = %claims.sub, fehler = %e, "Token-Erneuerung fehlgeschlagen");
                Ok(Pruefergebnis::Authentifiziert { claims })
            }
        }
    }
}

/// `Bearer <token>`, Schema ohne Beachtung der Gross-/Kleinschreibung
fn bearer_token(header: &str) -> Option<&str> {
    let (schema, token) = header.split_once(' ')?;
    if !schema.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}
