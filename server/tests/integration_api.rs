//! Integrationstests fuer die HTTP-API
//!
//! Der Router laeuft komplett (Token-Pruefung, CORS, Metriken) gegen eine
//! In-Memory-Datenbank und wird per `oneshot` angesprochen.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use plauder_auth::{AuthService, HashKosten, Signaturschluessel, TokenAussteller, TokenPruefer};
use plauder_chat::{ChatService, UmschlagCodec};
use plauder_core::UserId;
use plauder_db::SqliteDb;
use plauder_observability::PlauderMetriken;
use plauder_server::web::{api_router, cors_layer, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const UA: &str = "plauder-test/1.0";
const TOKEN_HEADER: &str = "x-jwt-token";

struct TestApp {
    router: Router,
    aussteller: Arc<TokenAussteller>,
    metriken: PlauderMetriken,
}

async fn test_app() -> TestApp {
    let db = Arc::new(SqliteDb::in_memory().await.expect("In-Memory DB"));
    let schluessel =
        Signaturschluessel::aus_bytes(b"integration-test-geheimnis-0123456789abcdef".to_vec())
            .unwrap();
    let aussteller = Arc::new(TokenAussteller::neu(Arc::new(schluessel)));
    let pruefer = Arc::new(TokenPruefer::neu(Arc::clone(&aussteller)));
    let auth = Arc::new(
        AuthService::neu(Arc::clone(&db), Arc::clone(&aussteller))
            .mit_hash_kosten(HashKosten::minimal()),
    );
    let chat = ChatService::neu(db, UmschlagCodec::default());
    let metriken = PlauderMetriken::neu().unwrap();

    let state = AppState::neu(
        auth,
        chat,
        pruefer,
        metriken.clone(),
        HeaderName::from_static(TOKEN_HEADER),
    );
    let cors = cors_layer(&[], HeaderName::from_static(TOKEN_HEADER));

    TestApp {
        router: api_router(state, cors),
        aussteller,
        metriken,
    }
}

async fn senden(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
}

fn post(pfad: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(pfad)
        .header(header::USER_AGENT, UA)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(pfad: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri(pfad)
        .header(header::USER_AGENT, UA);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

/// Registriert und meldet an; gibt (user_id, token) zurueck
async fn konto(app: &Router, email: &str) -> (i64, String) {
    let (_, _, json) = senden(
        app,
        post(
            "/users/signup",
            json!({ "email": email, "password": "geheim.123", "confirmPassword": "geheim.123" }),
            None,
        ),
    )
    .await;
    assert_eq!(json["code"], 0, "Registrierung: {json}");
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, headers, json) = senden(
        app,
        post(
            "/users/login",
            json!({ "email": email, "password": "geheim.123" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 0, "Login: {json}");
    let token = headers
        .get(TOKEN_HEADER)
        .expect("Token-Header nach Login")
        .to_str()
        .unwrap()
        .to_string();

    (id, token)
}

fn ablehnungen(app: &TestApp, grund: &str) -> u64 {
    app.metriken
        .auth_ablehnungen_total
        .with_label_values(&[grund])
        .get()
}

// ---------------------------------------------------------------------------
// Konten
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registrieren_anmelden_profil() {
    let app = test_app().await;
    let (id, token) = konto(&app.router, "anna@example.org").await;

    let (status, headers, json) = senden(&app.router, get("/users/info", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["email"], "anna@example.org");
    assert!(json["data"].get("password_hash").is_none());
    // Frisches Token wird nicht erneuert
    assert!(headers.get(TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn falsches_passwort() {
    let app = test_app().await;
    konto(&app.router, "bernd@example.org").await;

    let (status, headers, json) = senden(
        &app.router,
        post(
            "/users/login",
            json!({ "email": "bernd@example.org", "password": "falsch" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 1);
    assert!(headers.get(TOKEN_HEADER).is_none());
}

#[tokio::test]
async fn registrierung_fehlerfaelle() {
    let app = test_app().await;

    let (_, _, json) = senden(
        &app.router,
        post(
            "/users/signup",
            json!({ "email": "c@example.org", "password": "eins.111", "confirmPassword": "zwei.222" }),
            None,
        ),
    )
    .await;
    assert_eq!(json["code"], 1);

    konto(&app.router, "c@example.org").await;
    let (_, _, json) = senden(
        &app.router,
        post(
            "/users/signup",
            json!({ "email": "c@example.org", "password": "geheim.123", "confirmPassword": "geheim.123" }),
            None,
        ),
    )
    .await;
    assert_eq!(json["code"], 1);
}

#[tokio::test]
async fn profil_bearbeiten_und_abmelden() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "dora@example.org").await;

    let (_, _, json) = senden(
        &app.router,
        post("/users/edit", json!({ "nickname": "Dora" }), Some(&token)),
    )
    .await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["nickname"], "Dora");

    let (status, _, json) = senden(&app.router, get("/users/logout", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 0);

    // Ohne Widerruf bleibt das Token bis zum Ablauf gueltig
    let (_, _, json) = senden(&app.router, get("/users/info", Some(&token))).await;
    assert_eq!(json["code"], 0);
}

#[tokio::test]
async fn erweitertes_profil_bearbeiten() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "frida@example.org").await;

    let (_, _, json) = senden(&app.router, get("/users/info", Some(&token))).await;
    assert_eq!(json["data"]["phone"], Value::Null);
    assert_eq!(json["data"]["sex"], 0);
    assert_eq!(json["data"]["userConf"]["searchUser"], 1);
    assert_eq!(json["data"]["userConf"]["verification"], 1);

    let (_, _, json) = senden(
        &app.router,
        post(
            "/users/edit",
            json!({
                "phone": "0171 5555",
                "address": "Lindenweg 7",
                "birthday": 788_918_400_000i64,
                "sex": 2,
                "userConf": {
                    "recallMessage": "hab mich vertippt",
                    "friendOnline": true,
                    "savePwd": true,
                    "searchUser": 2,
                    "verification": 3,
                    "verificationQuestion": { "problem1": "Wo wohnst du?" }
                }
            }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(json["code"], 0, "{json}");
    let data = &json["data"];
    assert_eq!(data["phone"], "0171 5555");
    assert_eq!(data["address"], "Lindenweg 7");
    assert_eq!(data["birthday"], 788_918_400_000i64);
    assert_eq!(data["sex"], 2);
    assert_eq!(data["userConf"]["recallMessage"], "hab mich vertippt");
    assert_eq!(data["userConf"]["friendOnline"], true);
    assert_eq!(data["userConf"]["sound"], false);
    assert_eq!(data["userConf"]["savePwd"], true);
    assert_eq!(data["userConf"]["searchUser"], 2);
    assert_eq!(data["userConf"]["verification"], 3);
    assert_eq!(
        data["userConf"]["verificationQuestion"]["problem1"],
        "Wo wohnst du?"
    );

    // Gespeichert, nicht nur zurueckgegeben
    let (_, _, info) = senden(&app.router, get("/users/info", Some(&token))).await;
    assert_eq!(info["data"], json["data"]);

    // Ungueltiger Code, zu langer Hinweis, vergebene Nummer
    let (_, token_b) = konto(&app.router, "gerd@example.org").await;
    for body in [
        json!({ "sex": 7 }),
        json!({ "userConf": { "recallMessage": "x".repeat(33) } }),
        json!({ "userConf": { "verification": 4 } }),
        json!({ "phone": "0171 5555" }),
    ] {
        let (status, _, json) =
            senden(&app.router, post("/users/edit", body.clone(), Some(&token_b))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["code"], 1, "{body}: {json}");
    }
}

#[tokio::test]
async fn kaputte_konto_bodies_ergeben_antwort() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "erik@example.org").await;

    for (pfad, token) in [
        ("/users/signup", None),
        ("/users/login", None),
        ("/users/edit", Some(token.as_str())),
    ] {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(pfad)
            .header(header::USER_AGENT, UA);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let (status, _, json) =
            senden(&app.router, builder.body(Body::from("{kein json")).unwrap()).await;
        assert_eq!(status, StatusCode::OK, "{pfad}");
        assert_eq!(json["code"], 1, "{pfad}: {json}");
        assert!(json["msg"].is_string(), "{pfad}");
    }

    // Fehlende Pflichtfelder ebenso
    let (status, _, json) = senden(
        &app.router,
        post("/users/login", json!({ "email": "erik@example.org" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 1);
}

// ---------------------------------------------------------------------------
// Token-Pruefung
// ---------------------------------------------------------------------------

#[tokio::test]
async fn ohne_token_401() {
    let app = test_app().await;

    let (status, _, json) = senden(&app.router, get("/users/info", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({}));
    assert_eq!(ablehnungen(&app, "kein_nachweis"), 1);
}

#[tokio::test]
async fn manipuliertes_token_401() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "emil@example.org").await;

    // Ein Zeichen mitten in der Signatur kippen
    let pos = token.rfind('.').unwrap() + 5;
    let mut manipuliert = token.into_bytes();
    manipuliert[pos] = if manipuliert[pos] == b'A' { b'B' } else { b'A' };
    let manipuliert = String::from_utf8(manipuliert).unwrap();

    let (status, _, json) = senden(&app.router, get("/users/info", Some(&manipuliert))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({}));
    assert_eq!(ablehnungen(&app, "ungueltige_signatur"), 1);
}

#[tokio::test]
async fn anderer_user_agent_401() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "frida@example.org").await;

    let req = Request::builder()
        .uri("/users/info")
        .header(header::USER_AGENT, "anderer-client/2.0")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, json) = senden(&app.router, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Gleicher Inhalt wie bei jeder anderen Ablehnung
    assert_eq!(json, json!({}));
    assert_eq!(ablehnungen(&app, "fingerabdruck"), 1);
}

#[tokio::test]
async fn abgelaufenes_token_401() {
    let app = test_app().await;
    let (id, _) = konto(&app.router, "gustav@example.org").await;

    let alt = app
        .aussteller
        .ausstellen(UserId(id), UA, Utc::now() - Duration::hours(73))
        .unwrap();

    let (status, _, _) = senden(&app.router, get("/users/info", Some(&alt.token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ablehnungen(&app, "abgelaufen"), 1);
}

#[tokio::test]
async fn kleinschreibung_im_schema() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "hanna@example.org").await;

    let req = Request::builder()
        .uri("/users/info")
        .header(header::USER_AGENT, UA)
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, json) = senden(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 0);
}

#[tokio::test]
async fn gleitende_erneuerung_setzt_header() {
    let app = test_app().await;
    let (id, _) = konto(&app.router, "ida@example.org").await;

    // 22 Stunden Restlaufzeit, unter der Schwelle von 24
    let bald = app
        .aussteller
        .ausstellen(UserId(id), UA, Utc::now() - Duration::hours(50))
        .unwrap();

    let (status, headers, json) = senden(&app.router, get("/users/info", Some(&bald.token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 0);

    let neu = headers
        .get(TOKEN_HEADER)
        .expect("erneuertes Token")
        .to_str()
        .unwrap()
        .to_string();
    assert_ne!(neu, bald.token);
    assert_eq!(app.metriken.token_erneuerungen_total.get(), 1);

    let claims = app.aussteller.verifizieren(&neu).unwrap();
    assert!(claims.exp > bald.claims.exp);
    assert_eq!(claims.sub, UserId(id));
    assert_eq!(claims.ua, UA);

    // Das neue Token ist sofort nutzbar und wird nicht erneut erneuert
    let (status, headers, _) = senden(&app.router, get("/users/info", Some(&neu))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get(TOKEN_HEADER).is_none());
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_senden_und_verlauf() {
    let app = test_app().await;
    let (a, token_a) = konto(&app.router, "jonas@example.org").await;
    let (b, token_b) = konto(&app.router, "klara@example.org").await;

    let umschlag = json!({
        "type": 8,
        "withdrawMsg": {
            "content": "message recalled",
            "originMsg": { "type": 1, "content": "hi" }
        }
    });

    let (_, _, json) = senden(
        &app.router,
        post(
            "/messages/chat",
            json!({ "receiverID": b, "msg": umschlag }),
            Some(&token_a),
        ),
    )
    .await;
    assert_eq!(json["code"], 0, "{json}");
    assert_eq!(json["data"]["art"], "withdraw");
    assert_eq!(json["data"]["art_code"], 8);
    assert_eq!(json["data"]["vorschau"], "message recalled");

    let (_, _, json) = senden(
        &app.router,
        get(&format!("/messages/chat/{a}"), Some(&token_b)),
    )
    .await;
    assert_eq!(json["code"], 0);
    let verlauf = json["data"].as_array().unwrap();
    assert_eq!(verlauf.len(), 1);
    assert_eq!(verlauf[0]["sender_id"], a);
    assert_eq!(verlauf[0]["empfaenger_id"], b);
    assert_eq!(verlauf[0]["umschlag"], umschlag);
}

#[tokio::test]
async fn chat_verlauf_mit_cursor() {
    let app = test_app().await;
    let (_, token_a) = konto(&app.router, "lena@example.org").await;
    let (b, _) = konto(&app.router, "max@example.org").await;

    let mut ids = Vec::new();
    for text in ["eins", "zwei", "drei"] {
        let (_, _, json) = senden(
            &app.router,
            post(
                "/messages/chat",
                json!({ "receiverID": b, "msg": { "type": 1, "content": text } }),
                Some(&token_a),
            ),
        )
        .await;
        ids.push(json["data"]["id"].as_i64().unwrap());
    }

    let (_, _, json) = senden(
        &app.router,
        get(
            &format!("/messages/chat/{b}?beforeID={}&limit=1", ids[2]),
            Some(&token_a),
        ),
    )
    .await;
    let verlauf = json["data"].as_array().unwrap();
    assert_eq!(verlauf.len(), 1);
    assert_eq!(verlauf[0]["vorschau"], "zwei");
}

#[tokio::test]
async fn ungueltiger_umschlag_wird_abgelehnt() {
    let app = test_app().await;
    let (_, token_a) = konto(&app.router, "nina@example.org").await;
    let (b, _) = konto(&app.router, "otto@example.org").await;

    // Art Text, aber Bild-Nutzlast
    let (status, _, json) = senden(
        &app.router,
        post(
            "/messages/chat",
            json!({
                "receiverID": b,
                "msg": { "type": 1, "imageMsg": { "title": "x", "src": "/x.png" } }
            }),
            Some(&token_a),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 1);
    assert_eq!(
        app.metriken
            .codec_fehler_total
            .with_label_values(&["kodieren"])
            .get(),
        1
    );
}

#[tokio::test]
async fn zu_tiefer_umschlag_wird_abgelehnt() {
    let app = test_app().await;
    let (_, token_a) = konto(&app.router, "paul@example.org").await;
    let (b, _) = konto(&app.router, "rosa@example.org").await;

    let mut umschlag = json!({ "type": 1, "content": "innen" });
    for _ in 0..6 {
        umschlag = json!({
            "type": 8,
            "withdrawMsg": { "content": "zurueck", "originMsg": umschlag }
        });
    }

    let (_, _, json) = senden(
        &app.router,
        post(
            "/messages/chat",
            json!({ "receiverID": b, "msg": umschlag }),
            Some(&token_a),
        ),
    )
    .await;
    assert_eq!(json["code"], 1);
}

#[tokio::test]
async fn unbekannter_empfaenger_und_kaputter_body() {
    let app = test_app().await;
    let (_, token) = konto(&app.router, "sara@example.org").await;

    let (_, _, json) = senden(
        &app.router,
        post(
            "/messages/chat",
            json!({ "receiverID": 999, "msg": { "type": 1, "content": "hallo?" } }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(json["code"], 1);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/messages/chat")
        .header(header::USER_AGENT, UA)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("{kein json"))
        .unwrap();
    let (status, _, json) = senden(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], 1);
}

#[tokio::test]
async fn gruppe_senden_und_verlauf() {
    let app = test_app().await;
    let (a, token_a) = konto(&app.router, "tom@example.org").await;

    let erwaehnung = json!({
        "type": 11,
        "atMsg": {
            "userID": a,
            "content": "@tom schau mal",
            "msg": { "type": 2, "imageMsg": { "title": "Foto", "src": "/f.png" } }
        }
    });

    let (_, _, json) = senden(
        &app.router,
        post(
            "/messages/group",
            json!({ "groupID": 7, "msg": erwaehnung }),
            Some(&token_a),
        ),
    )
    .await;
    assert_eq!(json["code"], 0, "{json}");
    assert_eq!(json["data"]["group_id"], 7);

    let (_, _, json) = senden(&app.router, get("/messages/group/7", Some(&token_a))).await;
    let verlauf = json["data"].as_array().unwrap();
    assert_eq!(verlauf.len(), 1);
    assert_eq!(verlauf[0]["art"], "at");
    assert_eq!(verlauf[0]["umschlag"], erwaehnung);

    let (_, _, json) = senden(&app.router, get("/messages/group/8", Some(&token_a))).await;
    assert!(json["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_fuer_localhost() {
    let app = test_app().await;

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/users/login")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn cors_legt_token_header_offen() {
    let app = test_app().await;
    konto(&app.router, "uwe@example.org").await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/users/login")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::USER_AGENT, UA)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "uwe@example.org", "password": "geheim.123" }).to_string(),
        ))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();

    let offen = resp
        .headers()
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(offen.contains(TOKEN_HEADER));
}

#[tokio::test]
async fn fremde_origin_bekommt_keine_freigabe() {
    let app = test_app().await;

    for origin in [
        "https://evil.example",
        "http://localhost.evil.example",
        "http://localhostattacker.com",
    ] {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/users/login")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app.router.clone().oneshot(req).await.unwrap();
        assert!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none(),
            "{origin} wurde freigegeben"
        );
    }
}
