//! Auth-Service fuer Plauder
//!
//! Registrierung, Login und Profilverwaltung. Sessions werden nicht
//! gespeichert; der Login liefert ein signiertes Token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use plauder_core::{zeit, UserId};
use plauder_db::{
    models::{BenutzerEinstellungen, BenutzerRecord, BenutzerUpdate, Geschlecht, NeuerBenutzer},
    UserRepository,
};

use crate::{
    error::{AuthError, AuthResult},
    password::{passwort_hashen, passwort_verifizieren, HashKosten},
    token::{SessionToken, TokenAussteller},
};

/// Oeffentliches Profil (ohne Passwort-Hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profil {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "phone")]
    pub telefon: Option<String>,
    pub nickname: String,
    #[serde(rename = "signature")]
    pub signatur: String,
    pub avatar: String,
    #[serde(rename = "address")]
    pub adresse: String,
    #[serde(rename = "birthday")]
    pub geburtstag: i64,
    #[serde(rename = "sex")]
    pub geschlecht: Geschlecht,
    #[serde(rename = "userConf")]
    pub einstellungen: BenutzerEinstellungen,
    #[serde(rename = "createTime")]
    pub erstellt_am: DateTime<Utc>,
}

impl Profil {
    fn aus_record(record: BenutzerRecord) -> AuthResult<Self> {
        Ok(Self {
            id: record.id,
            email: record.email,
            telefon: record.telefon,
            nickname: record.nickname,
            signatur: record.signatur,
            avatar: record.avatar,
            adresse: record.adresse,
            geburtstag: record.geburtstag,
            geschlecht: record.geschlecht,
            einstellungen: record.einstellungen,
            erstellt_am: zeit::aus_ms(record.create_time_ms)
                .map_err(|e| AuthError::intern(e.to_string()))?,
        })
    }
}

// Spaltenbreiten der Tabellen `users` und `user_conf`
const NICKNAME_MAX: usize = 32;
const SIGNATUR_MAX: usize = 128;
const AVATAR_MAX: usize = 255;
const ADRESSE_MAX: usize = 255;
const RUECKRUF_HINWEIS_MAX: usize = 32;

fn laenge_pruefen(feld: &str, wert: Option<&String>, max: usize) -> AuthResult<()> {
    match wert {
        Some(w) if w.chars().count() > max => Err(AuthError::UngueltigesProfil(format!(
            "{feld} ist laenger als {max} Zeichen"
        ))),
        _ => Ok(()),
    }
}

/// Prueft alle Felder, die ohne den gespeicherten Stand pruefbar sind
fn update_pruefen(update: &BenutzerUpdate) -> AuthResult<()> {
    laenge_pruefen("nickname", update.nickname.as_ref(), NICKNAME_MAX)?;
    laenge_pruefen("signature", update.signatur.as_ref(), SIGNATUR_MAX)?;
    laenge_pruefen("avatar", update.avatar.as_ref(), AVATAR_MAX)?;
    laenge_pruefen("address", update.adresse.as_ref(), ADRESSE_MAX)?;
    laenge_pruefen(
        "recallMessage",
        update.einstellungen.rueckruf_hinweis.as_ref(),
        RUECKRUF_HINWEIS_MAX,
    )
}

/// Eingabe fuer die Registrierung
#[derive(Debug, Clone)]
pub struct Registrierung<'a> {
    pub email: &'a str,
    pub passwort: &'a str,
    pub passwort_bestaetigung: &'a str,
}

/// Auth-Service – zentraler Einstiegspunkt fuer alle Authentifizierungsvorgaenge
pub struct AuthService<U: UserRepository> {
    user_repo: Arc<U>,
    aussteller: Arc<TokenAussteller>,
    kosten: HashKosten,
}

impl<U: UserRepository> AuthService<U> {
    pub fn neu(user_repo: Arc<U>, aussteller: Arc<TokenAussteller>) -> Self {
        Self {
            user_repo,
            aussteller,
            kosten: HashKosten::default(),
        }
    }

    pub fn mit_hash_kosten(mut self, kosten: HashKosten) -> Self {
        self.kosten = kosten;
        self
    }

    /// Registriert einen neuen Benutzer
    pub async fn registrieren(&self, eingabe: Registrierung<'_>) -> AuthResult<Profil> {
        if eingabe.passwort != eingabe.passwort_bestaetigung {
            return Err(AuthError::PasswoerterUngleich);
        }

        if self.user_repo.get_by_email(eingabe.email).await?.is_some() {
            return Err(AuthError::EmailVergeben(eingabe.email.to_string()));
        }

        let passwort_hash = passwort_hashen(eingabe.passwort, self.kosten)?;

        let benutzer = self
            .user_repo
            .create(NeuerBenutzer {
                email: eingabe.email,
                password_hash: &passwort_hash,
            })
            .await
            .map_err(|e| {
                // Gleichzeitige Registrierung mit derselben E-Mail
                if e.ist_eindeutigkeit() {
                    AuthError::EmailVergeben(eingabe.email.to_string())
                } else {
                    AuthError::Datenbank(e)
                }
            })?;

        tracing::info!(user_id = %benutzer.id, "Neuer Benutzer registriert");

        Profil::aus_record(benutzer)
    }

    /// Meldet einen Benutzer an und stellt ein Token fuer den Fingerabdruck aus
    pub async fn anmelden(
        &self,
        email: &str,
        passwort: &str,
        fingerabdruck: &str,
        jetzt: DateTime<Utc>,
    ) -> AuthResult<(Profil, SessionToken)> {
        let Some(benutzer) = self.user_repo.get_by_email(email).await? else {
            tracing::warn!("Login mit unbekannter E-Mail");
            return Err(AuthError::UngueltigeAnmeldedaten);
        };

        if !passwort_verifizieren(passwort, &benutzer.password_hash)? {
            tracing::warn!(user_id = %benutzer.id, "Fehlgeschlagener Login-Versuch");
            return Err(AuthError::UngueltigeAnmeldedaten);
        }

        let token = self
            .aussteller
            .ausstellen(benutzer.id, fingerabdruck, jetzt)?;

        tracing::info!(user_id = %benutzer.id, "Benutzer angemeldet");

        Ok((Profil::aus_record(benutzer)?, token))
    }

    /// Profil eines Benutzers laden
    pub async fn profil(&self, user_id: UserId) -> AuthResult<Profil> {
        let benutzer = self
            .user_repo
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::BenutzerNichtGefunden(user_id.to_string()))?;
        Profil::aus_record(benutzer)
    }

    /// Profilfelder und Einstellungen aendern
    ///
    /// Nur gesetzte Felder werden geschrieben. Verlangt die Verifizierung eine
    /// Frage, muss nach dem Update mindestens eine hinterlegt sein.
    pub async fn profil_bearbeiten(
        &self,
        user_id: UserId,
        update: BenutzerUpdate,
    ) -> AuthResult<Profil> {
        if update.ist_leer() {
            return self.profil(user_id).await;
        }
        update_pruefen(&update)?;

        let e = &update.einstellungen;
        if e.verifizierung.is_some() || e.verifizierungsfragen.is_some() {
            let aktuell = self
                .user_repo
                .get_by_id(user_id)
                .await?
                .ok_or_else(|| AuthError::BenutzerNichtGefunden(user_id.to_string()))?
                .einstellungen;
            let verifizierung = e.verifizierung.unwrap_or(aktuell.verifizierung);
            let fragen = e
                .verifizierungsfragen
                .as_ref()
                .or(aktuell.verifizierungsfragen.as_ref());
            if verifizierung.braucht_fragen() && !fragen.is_some_and(|f| f.hat_frage()) {
                return Err(AuthError::UngueltigesProfil(
                    "verification verlangt mindestens eine Frage".into(),
                ));
            }
        }

        let benutzer = self
            .user_repo
            .update_profil(user_id, update)
            .await
            .map_err(|e| match e {
                plauder_db::DbError::NichtGefunden(_) => {
                    AuthError::BenutzerNichtGefunden(user_id.to_string())
                }
                e if e.ist_eindeutigkeit() => AuthError::TelefonVergeben,
                andere => AuthError::Datenbank(andere),
            })?;

        tracing::debug!(user_id = %user_id, "Profil aktualisiert");

        Profil::aus_record(benutzer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schluessel::Signaturschluessel;
    use chrono::TimeZone;
    use plauder_db::models::{EinstellungenUpdate, Suchbarkeit, Verifizierung, Verifizierungsfragen};
    use plauder_db::SqliteDb;

    async fn service() -> AuthService<SqliteDb> {
        let db = Arc::new(SqliteDb::in_memory().await.expect("In-Memory DB"));
        let schluessel =
            Signaturschluessel::aus_bytes(b"service-test-geheimnis-0123456789ab".to_vec()).unwrap();
        let aussteller = Arc::new(TokenAussteller::neu(Arc::new(schluessel)));
        AuthService::neu(db, aussteller).mit_hash_kosten(HashKosten::minimal())
    }

    fn registrierung<'a>(email: &'a str, passwort: &'a str) -> Registrierung<'a> {
        Registrierung {
            email,
            passwort,
            passwort_bestaetigung: passwort,
        }
    }

    fn jetzt() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn registrieren_und_anmelden() {
        let service = service().await;
        let profil = service
            .registrieren(registrierung("ink@example.com", "geheim123"))
            .await
            .unwrap();
        assert_eq!(profil.email, "ink@example.com");

        let (angemeldet, token) = service
            .anmelden("ink@example.com", "geheim123", "Firefox", jetzt())
            .await
            .unwrap();
        assert_eq!(angemeldet.id, profil.id);
        assert_eq!(token.claims.sub, profil.id);
        assert_eq!(token.claims.ua, "Firefox");
    }

    #[tokio::test]
    async fn passwoerter_muessen_gleich_sein() {
        let service = service().await;
        let ergebnis = service
            .registrieren(Registrierung {
                email: "a@example.com",
                passwort: "eins",
                passwort_bestaetigung: "zwei",
            })
            .await;
        assert!(matches!(ergebnis, Err(AuthError::PasswoerterUngleich)));
    }

    #[tokio::test]
    async fn email_doppelt() {
        let service = service().await;
        service
            .registrieren(registrierung("a@example.com", "pw"))
            .await
            .unwrap();
        let ergebnis = service
            .registrieren(registrierung("a@example.com", "pw2"))
            .await;
        assert!(matches!(ergebnis, Err(AuthError::EmailVergeben(_))));
    }

    #[tokio::test]
    async fn falsche_anmeldedaten_gleicher_fehler() {
        let service = service().await;
        service
            .registrieren(registrierung("a@example.com", "richtig"))
            .await
            .unwrap();

        let falsches_pw = service
            .anmelden("a@example.com", "falsch", "ua", jetzt())
            .await;
        let unbekannt = service
            .anmelden("b@example.com", "richtig", "ua", jetzt())
            .await;

        assert!(matches!(falsches_pw, Err(AuthError::UngueltigeAnmeldedaten)));
        assert!(matches!(unbekannt, Err(AuthError::UngueltigeAnmeldedaten)));
    }

    #[tokio::test]
    async fn profil_bearbeiten() {
        let service = service().await;
        let profil = service
            .registrieren(registrierung("a@example.com", "pw"))
            .await
            .unwrap();

        let neu = service
            .profil_bearbeiten(
                profil.id,
                BenutzerUpdate {
                    nickname: Some("ink".into()),
                    avatar: Some("/avatars/1.png".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(neu.nickname, "ink");
        assert_eq!(neu.avatar, "/avatars/1.png");
        assert_eq!(neu.signatur, "");

        // Leeres Update liefert den aktuellen Stand
        let gleich = service
            .profil_bearbeiten(profil.id, BenutzerUpdate::default())
            .await
            .unwrap();
        assert_eq!(gleich, neu);
    }

    #[tokio::test]
    async fn unbekanntes_profil() {
        let service = service().await;
        assert!(matches!(
            service.profil(UserId(77)).await,
            Err(AuthError::BenutzerNichtGefunden(_))
        ));
        assert!(matches!(
            service
                .profil_bearbeiten(
                    UserId(77),
                    BenutzerUpdate {
                        nickname: Some("x".into()),
                        ..Default::default()
                    }
                )
                .await,
            Err(AuthError::BenutzerNichtGefunden(_))
        ));
    }

    #[tokio::test]
    async fn erweitertes_profil_und_einstellungen() {
        let service = service().await;
        let profil = service
            .registrieren(registrierung("e@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(profil.telefon, None);
        assert_eq!(profil.einstellungen, BenutzerEinstellungen::default());

        let neu = service
            .profil_bearbeiten(
                profil.id,
                BenutzerUpdate {
                    telefon: Some("+49 151 0000".into()),
                    adresse: Some("Hauptstr. 1".into()),
                    geburtstag: Some(946_684_800_000),
                    geschlecht: Some(Geschlecht::Weiblich),
                    einstellungen: EinstellungenUpdate {
                        rueckruf_hinweis: Some("weg damit".into()),
                        ton: Some(true),
                        suchbarkeit: Some(Suchbarkeit::UeberTelefon),
                        verifizierung: Some(Verifizierung::Frage),
                        verifizierungsfragen: Some(Verifizierungsfragen {
                            problem1: Some("Lieblingsfarbe?".into()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(neu.telefon.as_deref(), Some("+49 151 0000"));
        assert_eq!(neu.adresse, "Hauptstr. 1");
        assert_eq!(neu.geschlecht, Geschlecht::Weiblich);
        assert_eq!(neu.einstellungen.rueckruf_hinweis.as_deref(), Some("weg damit"));
        assert!(neu.einstellungen.ton);
        assert!(!neu.einstellungen.freund_online);
        assert_eq!(neu.einstellungen.verifizierung, Verifizierung::Frage);

        // Gespeicherte Frage reicht fuer einen spaeteren Wechsel auf 4
        let strenger = service
            .profil_bearbeiten(
                profil.id,
                BenutzerUpdate {
                    einstellungen: EinstellungenUpdate {
                        verifizierung: Some(Verifizierung::RichtigeAntwort),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            strenger.einstellungen.verifizierung,
            Verifizierung::RichtigeAntwort
        );
        assert_eq!(service.profil(profil.id).await.unwrap(), strenger);
    }

    #[tokio::test]
    async fn ungueltige_profile() {
        let service = service().await;
        let profil = service
            .registrieren(registrierung("f@example.com", "pw"))
            .await
            .unwrap();

        let zu_lang = service
            .profil_bearbeiten(
                profil.id,
                BenutzerUpdate {
                    nickname: Some("x".repeat(33)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(zu_lang, Err(AuthError::UngueltigesProfil(_))));

        let ohne_frage = service
            .profil_bearbeiten(
                profil.id,
                BenutzerUpdate {
                    einstellungen: EinstellungenUpdate {
                        verifizierung: Some(Verifizierung::Frage),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(ohne_frage, Err(AuthError::UngueltigesProfil(_))));
        assert!(ohne_frage.unwrap_err().ist_benutzerfehler());

        // Nichts davon wurde geschrieben
        let stand = service.profil(profil.id).await.unwrap();
        assert_eq!(stand.nickname, "");
        assert_eq!(stand.einstellungen.verifizierung, Verifizierung::Jeder);
    }

    #[tokio::test]
    async fn telefon_ist_eindeutig() {
        let service = service().await;
        let a = service
            .registrieren(registrierung("g@example.com", "pw"))
            .await
            .unwrap();
        let b = service
            .registrieren(registrierung("h@example.com", "pw"))
            .await
            .unwrap();
        let mit_telefon = |nr: &str| BenutzerUpdate {
            telefon: Some(nr.into()),
            ..Default::default()
        };

        service
            .profil_bearbeiten(a.id, mit_telefon("0151 42"))
            .await
            .unwrap();
        assert!(matches!(
            service.profil_bearbeiten(b.id, mit_telefon("0151 42")).await,
            Err(AuthError::TelefonVergeben)
        ));

        // Leerer String gibt die Nummer frei
        let a = service.profil_bearbeiten(a.id, mit_telefon("")).await.unwrap();
        assert_eq!(a.telefon, None);
        let b = service
            .profil_bearbeiten(b.id, mit_telefon("0151 42"))
            .await
            .unwrap();
        assert_eq!(b.telefon.as_deref(), Some("0151 42"));
    }
}
