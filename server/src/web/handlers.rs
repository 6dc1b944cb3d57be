//! Axum-Handler fuer Konten und Nachrichten

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use plauder_auth::{Profil, Registrierung};
use plauder_chat::{ChatNachricht, GruppenNachricht, HistoryAnfrage, RohUmschlag};
use plauder_core::{GroupId, MessageId, UserId};
use plauder_db::models::{
    BenutzerUpdate, EinstellungenUpdate, Geschlecht, Suchbarkeit, Verifizierung,
    Verifizierungsfragen,
};
use serde::{de::DeserializeOwned, Deserialize};

use super::antwort::{Antwort, ApiFehler, ApiResult};
use super::middleware::{fingerabdruck, token_header_setzen, Angemeldet};
use super::AppState;

// ---------------------------------------------------------------------------
// Anfrage-Typen
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrierungAnfrage {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginAnfrage {
    pub email: String,
    pub password: String,
}

/// Fehlende Felder bleiben unveraendert
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilAnfrage {
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub signature: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<i64>,
    pub sex: Option<Geschlecht>,
    #[serde(default)]
    pub user_conf: EinstellungenAnfrage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EinstellungenAnfrage {
    pub recall_message: Option<String>,
    pub friend_online: Option<bool>,
    pub sound: Option<bool>,
    pub secure_link: Option<bool>,
    pub save_pwd: Option<bool>,
    pub search_user: Option<Suchbarkeit>,
    pub verification: Option<Verifizierung>,
    pub verification_question: Option<Verifizierungsfragen>,
}

impl From<ProfilAnfrage> for BenutzerUpdate {
    fn from(a: ProfilAnfrage) -> Self {
        let c = a.user_conf;
        Self {
            telefon: a.phone,
            nickname: a.nickname,
            signatur: a.signature,
            avatar: a.avatar,
            adresse: a.address,
            geburtstag: a.birthday,
            geschlecht: a.sex,
            einstellungen: EinstellungenUpdate {
                rueckruf_hinweis: c.recall_message,
                freund_online: c.friend_online,
                ton: c.sound,
                sichere_links: c.secure_link,
                passwort_merken: c.save_pwd,
                suchbarkeit: c.search_user,
                verifizierung: c.verification,
                verifizierungsfragen: c.verification_question,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatSendenAnfrage {
    #[serde(rename = "receiverID")]
    pub empfaenger_id: UserId,
    pub msg: RohUmschlag,
}

#[derive(Debug, Deserialize)]
pub struct GruppeSendenAnfrage {
    #[serde(rename = "groupID")]
    pub group_id: GroupId,
    pub msg: RohUmschlag,
}

/// `?beforeID=..&limit=..`
#[derive(Debug, Default, Deserialize)]
pub struct VerlaufQuery {
    #[serde(rename = "beforeID")]
    pub vor_id: Option<i64>,
    pub limit: Option<i64>,
}

impl From<VerlaufQuery> for HistoryAnfrage {
    fn from(q: VerlaufQuery) -> Self {
        Self {
            vor_id: q.vor_id.map(MessageId),
            limit: q.limit,
        }
    }
}

/// Liest einen JSON-Body
///
/// Direkt ueber serde_json: rohe Unter-Umschlaege bleiben erhalten und
/// kaputte Bodies enden in der ueblichen `{code, msg, data}`-Antwort.
fn json_lesen<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiFehler> {
    serde_json::from_slice(body).map_err(|e| ApiFehler::Eingabe(e.to_string()))
}

// ---------------------------------------------------------------------------
// Konten
// ---------------------------------------------------------------------------

/// POST /users/signup
pub async fn registrieren(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Profil> {
    let req: RegistrierungAnfrage = json_lesen(&body)?;
    let profil = state
        .auth
        .registrieren(Registrierung {
            email: &req.email,
            passwort: &req.password,
            passwort_bestaetigung: &req.confirm_password,
        })
        .await?;
    Ok(Antwort::ok("Registrierung erfolgreich", profil))
}

/// POST /users/login – Token im Antwort-Header
pub async fn anmelden(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiFehler> {
    let req: LoginAnfrage = json_lesen(&body)?;
    let (profil, token) = state
        .auth
        .anmelden(&req.email, &req.password, &fingerabdruck(&headers), Utc::now())
        .await?;

    let mut response = Antwort::ok("Login erfolgreich", profil).into_response();
    token_header_setzen(&mut response, &state.token_header, &token.token);
    Ok(response)
}

/// GET /users/info
pub async fn info(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
) -> ApiResult<Profil> {
    let profil = state.auth.profil(claims.sub).await?;
    Ok(Antwort::ok("Profil geladen", profil))
}

/// POST /users/edit
pub async fn bearbeiten(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    body: Bytes,
) -> ApiResult<Profil> {
    let req: ProfilAnfrage = json_lesen(&body)?;
    let profil = state
        .auth
        .profil_bearbeiten(claims.sub, req.into())
        .await?;
    Ok(Antwort::ok("Profil aktualisiert", profil))
}

/// GET /users/logout
///
/// Tokens sind zustandslos und laufen nur ab, es gibt nichts zu widerrufen.
pub async fn abmelden(Angemeldet(claims): Angemeldet) -> Antwort<()> {
    tracing::debug!(user_id = %claims.sub, "Abmeldung");
    Antwort::ok_leer("Abgemeldet")
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// POST /messages/chat
pub async fn chat_senden(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    body: Bytes,
) -> ApiResult<ChatNachricht> {
    let req: ChatSendenAnfrage = json_lesen(&body)?;
    let nachricht = state
        .chat
        .chat_senden(claims.sub, req.empfaenger_id, &req.msg)
        .await
        .map_err(|e| state.chat_fehler(e))?;
    Ok(Antwort::ok("Nachricht gesendet", nachricht))
}

/// GET /messages/chat/:peer
pub async fn chat_verlauf(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    Path(peer): Path<i64>,
    Query(query): Query<VerlaufQuery>,
) -> ApiResult<Vec<ChatNachricht>> {
    let verlauf = state
        .chat
        .unterhaltung_laden(claims.sub, UserId(peer), query.into())
        .await
        .map_err(|e| state.chat_fehler(e))?;
    Ok(Antwort::ok("Verlauf geladen", verlauf))
}

/// POST /messages/group
pub async fn gruppe_senden(
    State(state): State<AppState>,
    Angemeldet(claims): Angemeldet,
    body: Bytes,
) -> ApiResult<GruppenNachricht> {
    let req: GruppeSendenAnfrage = json_lesen(&body)?;
    let nachricht = state
        .chat
        .gruppe_senden(claims.sub, req.group_id, &req.msg)
        .await
        .map_err(|e| state.chat_fehler(e))?;
    Ok(Antwort::ok("Nachricht gesendet", nachricht))
}

/// GET /messages/group/:group
pub async fn gruppen_verlauf(
    State(state): State<AppState>,
    Angemeldet(_claims): Angemeldet,
    Path(group): Path<i64>,
    Query(query): Query<VerlaufQuery>,
) -> ApiResult<Vec<GruppenNachricht>> {
    let verlauf = state
        .chat
        .gruppenverlauf_laden(GroupId(group), query.into())
        .await
        .map_err(|e| state.chat_fehler(e))?;
    Ok(Antwort::ok("Verlauf geladen", verlauf))
}
