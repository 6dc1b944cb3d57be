//! Einheitliche JSON-Antworten der HTTP-API
//!
//! Geschaeftliche Ergebnisse kommen immer mit HTTP 200 und dem Umschlag
//! `{ "code", "msg", "data" }`. Nur Auth-Ablehnungen liefern 401.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use plauder_auth::AuthError;
use plauder_chat::ChatError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

pub const CODE_OK: i32 = 0;
pub const CODE_BENUTZERFEHLER: i32 = 1;
pub const CODE_SYSTEMFEHLER: i32 = 2;

const SYSTEMFEHLER_MELDUNG: &str = "Systemfehler";

/// Antwort-Umschlag
#[derive(Debug, Serialize)]
pub struct Antwort<T: Serialize> {
    pub code: i32,
    pub msg: String,
    pub data: Option<T>,
}

impl<T: Serialize> Antwort<T> {
    pub fn ok(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: CODE_OK,
            msg: msg.into(),
            data: Some(data),
        }
    }
}

impl Antwort<()> {
    pub fn ok_leer(msg: impl Into<String>) -> Self {
        Self {
            code: CODE_OK,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn fehler(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Antwort<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// 401 mit immer gleichem Inhalt, unabhaengig vom Ablehnungsgrund
pub fn nicht_autorisiert() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({}))).into_response()
}

/// Fehler eines Handlers
#[derive(Debug, Error)]
pub enum ApiFehler {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Ungueltige Anfrage: {0}")]
    Eingabe(String),
}

impl ApiFehler {
    pub fn code(&self) -> i32 {
        let benutzerfehler = match self {
            Self::Auth(e) => e.ist_benutzerfehler(),
            Self::Eingabe(_) => true,
            Self::Chat(e) => matches!(
                e,
                ChatError::Kodieren(_)
                    | ChatError::EmpfaengerUnbekannt(_)
                    | ChatError::NachrichtNichtGefunden(_)
            ),
        };
        if benutzerfehler {
            CODE_BENUTZERFEHLER
        } else {
            CODE_SYSTEMFEHLER
        }
    }
}

impl IntoResponse for ApiFehler {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == CODE_BENUTZERFEHLER {
            tracing::debug!(fehler = %self, "Anfrage abgelehnt");
            Antwort::fehler(code, self.to_string()).into_response()
        } else {
            tracing::error!(fehler = %self, "Systemfehler bei Anfrage");
            Antwort::fehler(code, SYSTEMFEHLER_MELDUNG).into_response()
        }
    }
}

pub type ApiResult<T> = Result<Antwort<T>, ApiFehler>;

#[cfg(test)]
mod tests {
    use super::*;
    use plauder_chat::{DekodierFehler, KodierFehler};

    #[test]
    fn antwort_serialisierung() {
        let json = serde_json::to_value(Antwort::ok("fertig", 7)).unwrap();
        assert_eq!(json, json!({ "code": 0, "msg": "fertig", "data": 7 }));

        let json = serde_json::to_value(Antwort::fehler(CODE_BENUTZERFEHLER, "nein")).unwrap();
        assert_eq!(json, json!({ "code": 1, "msg": "nein", "data": null }));
    }

    #[test]
    fn fehler_codes() {
        assert_eq!(
            ApiFehler::from(AuthError::PasswoerterUngleich).code(),
            CODE_BENUTZERFEHLER
        );
        assert_eq!(
            ApiFehler::from(AuthError::intern("kaputt")).code(),
            CODE_SYSTEMFEHLER
        );
        assert_eq!(
            ApiFehler::from(ChatError::from(KodierFehler::ZuTief { max: 5 })).code(),
            CODE_BENUTZERFEHLER
        );
        // Kaputte gespeicherte Daten sind nicht Schuld des Aufrufers
        assert_eq!(
            ApiFehler::from(ChatError::from(DekodierFehler::Fehlerhaft("x".into()))).code(),
            CODE_SYSTEMFEHLER
        );
    }

    #[test]
    fn systemfehler_verraet_keine_details() {
        let resp = ApiFehler::from(AuthError::intern("geheime Details")).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
