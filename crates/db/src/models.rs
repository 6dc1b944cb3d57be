//! Datenbankmodelle fuer Plauder
//!
//! Diese Typen repraesentieren Datensaetze aus der Datenbank.
//! Sie sind von den Domain-Typen getrennt und dienen als reine Datenuebertragungsobjekte.

use plauder_core::{GroupId, MessageId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DbError;

// ---------------------------------------------------------------------------
// Benutzer
// ---------------------------------------------------------------------------

/// Benutzer-Datensatz aus der Datenbank
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenutzerRecord {
    pub id: UserId,
    pub email: String,
    /// Eindeutig, sofern gesetzt
    pub telefon: Option<String>,
    pub password_hash: String,
    pub nickname: String,
    pub signatur: String,
    pub avatar: String,
    pub adresse: String,
    /// Vom Client geliefert, ohne feste Einheit
    pub geburtstag: i64,
    pub geschlecht: Geschlecht,
    pub einstellungen: BenutzerEinstellungen,
    pub create_time_ms: i64,
    pub update_time_ms: i64,
}

/// Daten zum Erstellen eines neuen Benutzers
#[derive(Debug, Clone)]
pub struct NeuerBenutzer<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Aenderbare Profilfelder; `None` laesst den Wert unveraendert
///
/// Ein leerer String bei `telefon` entfernt die Nummer.
#[derive(Debug, Clone, Default)]
pub struct BenutzerUpdate {
    pub telefon: Option<String>,
    pub nickname: Option<String>,
    pub signatur: Option<String>,
    pub avatar: Option<String>,
    pub adresse: Option<String>,
    pub geburtstag: Option<i64>,
    pub geschlecht: Option<Geschlecht>,
    pub einstellungen: EinstellungenUpdate,
}

impl BenutzerUpdate {
    pub fn ist_leer(&self) -> bool {
        !self.aendert_benutzer() && self.einstellungen.ist_leer()
    }

    /// Ob Spalten der Tabelle `users` betroffen sind
    pub fn aendert_benutzer(&self) -> bool {
        self.telefon.is_some()
            || self.nickname.is_some()
            || self.signatur.is_some()
            || self.avatar.is_some()
            || self.adresse.is_some()
            || self.geburtstag.is_some()
            || self.geschlecht.is_some()
    }
}

// ---------------------------------------------------------------------------
// Einstellungen
// ---------------------------------------------------------------------------

/// Kodiert einen Enum als `i8` in Datenbank und JSON
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident (standard = $standard:ident) {
            $($(#[$vmeta:meta])* $variante:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "i8", into = "i8")]
        pub enum $name {
            $($(#[$vmeta])* $variante = $code),+
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$standard
            }
        }

        impl From<$name> for i8 {
            fn from(wert: $name) -> i8 {
                wert as i8
            }
        }

        impl TryFrom<i8> for $name {
            type Error = DbError;

            fn try_from(code: i8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variante),)+
                    andere => Err(DbError::UngueltigeDaten(format!(
                        "{} kennt den Code {andere} nicht",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

code_enum! {
    Geschlecht (standard = KeineAngabe) {
        KeineAngabe = 0,
        Maennlich = 1,
        Weiblich = 2,
    }
}

code_enum! {
    /// Wie andere den Benutzer finden koennen
    Suchbarkeit (standard = UeberId) {
        Niemand = 0,
        UeberId = 1,
        UeberTelefon = 2,
    }
}

code_enum! {
    /// Bedingung fuer Freundschaftsanfragen
    Verifizierung (standard = Jeder) {
        Niemand = 0,
        Jeder = 1,
        Nachricht = 2,
        /// Frage beantworten, jede Antwort zaehlt
        Frage = 3,
        /// Frage richtig beantworten
        RichtigeAntwort = 4,
    }
}

impl Verifizierung {
    /// Ob Verifizierungsfragen hinterlegt sein muessen
    pub fn braucht_fragen(self) -> bool {
        matches!(self, Self::Frage | Self::RichtigeAntwort)
    }
}

/// Bis zu drei Fragen mit Antworten; als JSON-Text gespeichert
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verifizierungsfragen {
    pub problem1: Option<String>,
    pub problem2: Option<String>,
    pub problem3: Option<String>,
    pub answer1: Option<String>,
    pub answer2: Option<String>,
    pub answer3: Option<String>,
}

impl Verifizierungsfragen {
    /// Ob mindestens eine Frage gestellt ist
    pub fn hat_frage(&self) -> bool {
        [&self.problem1, &self.problem2, &self.problem3]
            .into_iter()
            .any(|p| p.as_deref().is_some_and(|p| !p.trim().is_empty()))
    }
}

/// Einstellungen eines Benutzers (Tabelle `user_conf`)
///
/// Serialisiert mit den Feldnamen der HTTP-API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenutzerEinstellungen {
    /// Hinweistext fuer zurueckgezogene Nachrichten
    #[serde(rename = "recallMessage")]
    pub rueckruf_hinweis: Option<String>,
    #[serde(rename = "friendOnline")]
    pub freund_online: bool,
    #[serde(rename = "sound")]
    pub ton: bool,
    #[serde(rename = "secureLink")]
    pub sichere_links: bool,
    #[serde(rename = "savePwd")]
    pub passwort_merken: bool,
    #[serde(rename = "searchUser")]
    pub suchbarkeit: Suchbarkeit,
    #[serde(rename = "verification")]
    pub verifizierung: Verifizierung,
    #[serde(rename = "verificationQuestion")]
    pub verifizierungsfragen: Option<Verifizierungsfragen>,
}

impl Default for BenutzerEinstellungen {
    fn default() -> Self {
        Self {
            rueckruf_hinweis: None,
            freund_online: false,
            ton: false,
            sichere_links: false,
            passwort_merken: false,
            suchbarkeit: Suchbarkeit::default(),
            verifizierung: Verifizierung::default(),
            verifizierungsfragen: None,
        }
    }
}

/// Aenderbare Einstellungen; ein leerer `rueckruf_hinweis` entfernt den Text
#[derive(Debug, Clone, Default)]
pub struct EinstellungenUpdate {
    pub rueckruf_hinweis: Option<String>,
    pub freund_online: Option<bool>,
    pub ton: Option<bool>,
    pub sichere_links: Option<bool>,
    pub passwort_merken: Option<bool>,
    pub suchbarkeit: Option<Suchbarkeit>,
    pub verifizierung: Option<Verifizierung>,
    pub verifizierungsfragen: Option<Verifizierungsfragen>,
}

impl EinstellungenUpdate {
    pub fn ist_leer(&self) -> bool {
        self.rueckruf_hinweis.is_none()
            && self.freund_online.is_none()
            && self.ton.is_none()
            && self.sichere_links.is_none()
            && self.passwort_merken.is_none()
            && self.suchbarkeit.is_none()
            && self.verifizierung.is_none()
            && self.verifizierungsfragen.is_none()
    }
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Gemeinsame Spalten beider Nachrichten-Tabellen
///
/// `nutzlast` ist der kodierte Umschlag, fuer die Datenbank ein opaker Text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NachrichtenZeile {
    pub id: MessageId,
    pub create_time_ms: i64,
    pub update_time_ms: i64,
    /// Nachrichtenart-Code (1–11, 99 = unbekannt)
    pub art: i8,
    /// Vorschau, hoechstens 64 Zeichen
    pub vorschau: String,
    pub nutzlast: String,
    pub sender_id: UserId,
}

/// 1:1-Chat-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatNachrichtRecord {
    pub zeile: NachrichtenZeile,
    pub empfaenger_id: UserId,
}

/// Gruppen-Nachricht
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GruppenNachrichtRecord {
    pub zeile: NachrichtenZeile,
    pub group_id: GroupId,
}

/// Eingabe zum Speichern einer Nachricht (beide Tabellen)
#[derive(Debug, Clone)]
pub struct NeueNachricht<'a> {
    pub sender_id: UserId,
    pub art: i8,
    pub vorschau: &'a str,
    pub nutzlast: &'a str,
}

/// Cursor-basierte Paginierung fuer den Nachrichtenverlauf
#[derive(Debug, Clone, Default)]
pub struct VerlaufFilter {
    /// Nur Nachrichten mit kleinerer ID (aeltere) laden
    pub vor_id: Option<MessageId>,
    /// Maximale Anzahl (Standard: 50, Maximum: 200)
    pub limit: Option<i64>,
}

impl VerlaufFilter {
    pub const STANDARD_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;

    /// Effektives Limit, auf 1..=200 begrenzt
    pub fn effektives_limit(&self) -> i64 {
        self.limit
            .unwrap_or(Self::STANDARD_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}
