//! Der Nachrichten-Umschlag
//!
//! Ein `Umschlag` ist genau eine Nachrichtenart mit genau einer Nutzlast.
//! Rueckruf, Antwort, Zitat und Erwaehnung tragen einen eigenen, verschachtelten
//! Umschlag (Baum, keine Rueckverweise).
//!
//! Das Textformat entspricht dem gespeicherten JSON:
//! `{"type": 8, "withdrawMsg": {"content": "...", "originMsg": {"type": 1, "content": "hi"}}}`.
//! Serialisiert wird nur der Schluessel der belegten Nutzlast.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::art::NachrichtenArt;

/// Maximale Laenge der Vorschau in Zeichen
pub const VORSCHAU_MAX_ZEICHEN: usize = 64;

// ---------------------------------------------------------------------------
// Nutzlasten ohne Verschachtelung
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BildNachricht {
    pub title: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoNachricht {
    pub title: String,
    pub src: String,
    /// Dauer in Sekunden
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateiNachricht {
    pub title: String,
    pub src: String,
    /// Groesse in Bytes
    pub size: i64,
    #[serde(rename = "type")]
    pub typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprachNachricht {
    pub src: String,
    /// Dauer in Sekunden
    pub time: i64,
}

/// Sprach- oder Videoanruf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnrufNachricht {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub end_reason: i8,
}

// ---------------------------------------------------------------------------
// Nutzlasten mit verschachteltem Umschlag
// ---------------------------------------------------------------------------

/// Zurueckgezogene Nachricht: Ersatztext plus Original
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RueckrufNachricht {
    pub content: String,
    #[serde(rename = "originMsg")]
    pub original: Box<Umschlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AntwortNachricht {
    #[serde(rename = "msgID")]
    pub msg_id: i64,
    pub content: String,
    #[serde(rename = "msg")]
    pub bezug: Box<Umschlag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZitatNachricht {
    #[serde(rename = "msgID")]
    pub msg_id: i64,
    pub content: String,
    #[serde(rename = "msg")]
    pub bezug: Box<Umschlag>,
}

/// Erwaehnung eines Benutzers (@)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErwaehnungNachricht {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub content: String,
    #[serde(rename = "msg")]
    pub bezug: Box<Umschlag>,
}

// ---------------------------------------------------------------------------
// Umschlag
// ---------------------------------------------------------------------------

/// Inhalt einer Nachricht
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Umschlag {
    Text(String),
    Image(BildNachricht),
    Video(VideoNachricht),
    File(DateiNachricht),
    Voice(SprachNachricht),
    VoiceCall(AnrufNachricht),
    VideoCall(AnrufNachricht),
    Withdraw(RueckrufNachricht),
    Reply(AntwortNachricht),
    Quote(ZitatNachricht),
    At(ErwaehnungNachricht),
}

impl Umschlag {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn zurueckgezogen(content: impl Into<String>, original: Umschlag) -> Self {
        Self::Withdraw(RueckrufNachricht {
            content: content.into(),
            original: Box::new(original),
        })
    }

    pub fn art(&self) -> NachrichtenArt {
        match self {
            Self::Text(_) => NachrichtenArt::Text,
            Self::Image(_) => NachrichtenArt::Image,
            Self::Video(_) => NachrichtenArt::Video,
            Self::File(_) => NachrichtenArt::File,
            Self::Voice(_) => NachrichtenArt::Voice,
            Self::VoiceCall(_) => NachrichtenArt::VoiceCall,
            Self::VideoCall(_) => NachrichtenArt::VideoCall,
            Self::Withdraw(_) => NachrichtenArt::Withdraw,
            Self::Reply(_) => NachrichtenArt::Reply,
            Self::Quote(_) => NachrichtenArt::Quote,
            Self::At(_) => NachrichtenArt::At,
        }
    }

    /// Direkt verschachtelter Umschlag, falls vorhanden
    pub fn verschachtelt(&self) -> Option<&Umschlag> {
        match self {
            Self::Withdraw(r) => Some(&r.original),
            Self::Reply(a) => Some(&a.bezug),
            Self::Quote(z) => Some(&z.bezug),
            Self::At(e) => Some(&e.bezug),
            _ => None,
        }
    }

    /// Anzahl der Umschlag-Ebenen; ein einfacher Text hat Tiefe 1
    pub fn tiefe(&self) -> usize {
        let mut tiefe = 1;
        let mut aktuell = self;
        while let Some(innen) = aktuell.verschachtelt() {
            tiefe += 1;
            aktuell = innen;
        }
        tiefe
    }

    /// Kurzvorschau fuer Listen, hoechstens 64 Zeichen
    pub fn vorschau(&self) -> String {
        let voll = match self {
            Self::Text(content) => content.clone(),
            Self::Image(b) => format!("[Bild] {}", b.title),
            Self::Video(v) => format!("[Video] {}", v.title),
            Self::File(d) => format!("[Datei] {}", d.title),
            Self::Voice(_) => "[Sprachnachricht]".to_string(),
            Self::VoiceCall(_) => "[Sprachanruf]".to_string(),
            Self::VideoCall(_) => "[Videoanruf]".to_string(),
            Self::Withdraw(r) => r.content.clone(),
            Self::Reply(a) => a.content.clone(),
            Self::Quote(z) => z.content.clone(),
            Self::At(e) => e.content.clone(),
        };
        kuerzen(voll, VORSCHAU_MAX_ZEICHEN)
    }
}

fn kuerzen(text: String, max_zeichen: usize) -> String {
    match text.char_indices().nth(max_zeichen) {
        Some((grenze, _)) => text[..grenze].to_string(),
        None => text,
    }
}

impl Serialize for Umschlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", &self.art().code())?;
        match self {
            Self::Text(content) => map.serialize_entry("content", content)?,
            Self::Image(b) => map.serialize_entry("imageMsg", b)?,
            Self::Video(v) => map.serialize_entry("videoMsg", v)?,
            Self::File(d) => map.serialize_entry("fileMsg", d)?,
            Self::Voice(s) => map.serialize_entry("voiceMsg", s)?,
            Self::VoiceCall(a) => map.serialize_entry("voiceCallMsg", a)?,
            Self::VideoCall(a) => map.serialize_entry("videoCallMsg", a)?,
            Self::Withdraw(r) => map.serialize_entry("withdrawMsg", r)?,
            Self::Reply(a) => map.serialize_entry("replyMsg", a)?,
            Self::Quote(z) => map.serialize_entry("quoteMsg", z)?,
            Self::At(e) => map.serialize_entry("atMsg", e)?,
        }
        map.end()
    }
}
