//! Router-Aufbau und CORS

use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use plauder_observability::{request_timing_layer, timing_middleware};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::handlers;
use super::middleware::auth_middleware;
use super::AppState;

const LOCALHOST_PRAEFIX: &str = "http://localhost";

/// Vollstaendiger API-Router
///
/// `/users/signup` und `/users/login` sind oeffentlich, alles andere
/// laeuft durch die Token-Pruefung.
pub fn api_router(state: AppState, cors: CorsLayer) -> Router {
    let oeffentlich = Router::new()
        .route("/users/signup", post(handlers::registrieren))
        .route("/users/login", post(handlers::anmelden));

    let geschuetzt = Router::new()
        .route("/users/info", get(handlers::info))
        .route("/users/edit", post(handlers::bearbeiten))
        .route("/users/logout", get(handlers::abmelden))
        .route("/messages/chat", post(handlers::chat_senden))
        .route("/messages/chat/:peer", get(handlers::chat_verlauf))
        .route("/messages/group", post(handlers::gruppe_senden))
        .route("/messages/group/:group", get(handlers::gruppen_verlauf))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    oeffentlich
        .merge(geschuetzt)
        .layer(middleware::from_fn_with_state(
            state.metriken.clone(),
            timing_middleware,
        ))
        .layer(request_timing_layer())
        .layer(cors)
        .with_state(state)
}

/// CORS: `http://localhost[:port]` immer, dazu die konfigurierten Origins
pub fn cors_layer(erlaubte_origins: &[String], token_header: HeaderName) -> CorsLayer {
    let erlaubte = erlaubte_origins.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| {
                origin
                    .to_str()
                    .map(|o| origin_erlaubt(o, &erlaubte))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([token_header])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60))
}

fn origin_erlaubt(origin: &str, erlaubte: &[String]) -> bool {
    ist_localhost(origin) || erlaubte.iter().any(|o| o == origin)
}

/// Genau `http://localhost` oder `http://localhost:<port>`
fn ist_localhost(origin: &str) -> bool {
    let Some(rest) = origin.strip_prefix(LOCALHOST_PRAEFIX) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    rest.strip_prefix(':').is_some_and(|port| {
        !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) && port.parse::<u16>().is_ok()
    })
}
