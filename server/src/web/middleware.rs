//! Token-Pruefung fuer geschuetzte Routen

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use plauder_auth::{Pruefergebnis, TokenClaims};

use super::antwort::nicht_autorisiert;
use super::AppState;

/// Claims des angemeldeten Benutzers (als Extension gespeichert)
#[derive(Debug, Clone)]
pub struct Angemeldet(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for Angemeldet
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Angemeldet>()
            .cloned()
            .ok_or_else(nicht_autorisiert)
    }
}

/// Fingerabdruck des Clients: der User-Agent, fehlend = leer
pub fn fingerabdruck(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn token_header_setzen(response: &mut Response, name: &HeaderName, token: &str) {
    match HeaderValue::from_str(token) {
        Ok(wert) => {
            response.headers_mut().insert(name.clone(), wert);
        }
        Err(e) => tracing::warn!(fehler = %e, "Token nicht als Header darstellbar"),
    }
}

/// Axum-Middleware: prueft das Bearer-Token und haengt erneuerte Tokens an
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let fingerabdruck = fingerabdruck(req.headers());
    let ergebnis = state.pruefer.pruefen(
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
        &fingerabdruck,
        Utc::now(),
    );

    let (claims, neues_token) = match ergebnis {
        Ok(Pruefergebnis::Authentifiziert { claims }) => (claims, None),
        Ok(Pruefergebnis::Erneuert {
            claims,
            neues_token,
        }) => (claims, Some(neues_token)),
        Err(ablehnung) => {
            state.metriken.ablehnung_zaehlen(ablehnung.metrik_label());
            tracing::debug!(
                grund = ablehnung.metrik_label(),
                pfad = %req.uri().path(),
                "Anfrage nicht autorisiert"
            );
            return nicht_autorisiert();
        }
    };

    req.extensions_mut().insert(Angemeldet(claims));
    let mut response = next.run(req).await;

    if let Some(token) = neues_token {
        state.metriken.erneuerung_zaehlen();
        token_header_setzen(&mut response, &state.token_header, &token.token);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerabdruck_aus_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        assert_eq!(fingerabdruck(&headers), "curl/8.0");
    }

    #[test]
    fn fingerabdruck_ohne_header() {
        assert_eq!(fingerabdruck(&HeaderMap::new()), "");
    }

    #[test]
    fn token_header_wird_gesetzt() {
        let mut resp = Response::new(Body::empty());
        let name = HeaderName::from_static("x-jwt-token");
        token_header_setzen(&mut resp, &name, "abc.def.ghi");
        assert_eq!(resp.headers().get(&name).unwrap(), "abc.def.ghi");
    }
}
