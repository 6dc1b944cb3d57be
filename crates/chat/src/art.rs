//! Nachrichtenarten und ihre Zahlencodes
//!
//! Die Codes 1–10 sind in der Datenbank festgeschrieben und duerfen sich nicht
//! aendern. Erwaehnungen (`At`) haben den Code 11. Alles Unbekannte landet bei
//! `Unbekannt` (Code 99); 99 bedeutet "nicht klassifiziert", nicht eine
//! bestimmte Art.

use serde::{Deserialize, Serialize};

/// Art einer Nachricht (Diskriminante des Umschlags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NachrichtenArt {
    Text,
    Image,
    Video,
    File,
    Voice,
    VoiceCall,
    VideoCall,
    Withdraw,
    Reply,
    Quote,
    At,
    Unknown,
}

impl NachrichtenArt {
    /// Code fuer nicht klassifizierte Nachrichten
    pub const UNBEKANNT_CODE: i8 = 99;

    /// Alle Arten inklusive `Unknown`
    pub const ALLE: [NachrichtenArt; 12] = [
        Self::Text,
        Self::Image,
        Self::Video,
        Self::File,
        Self::Voice,
        Self::VoiceCall,
        Self::VideoCall,
        Self::Withdraw,
        Self::Reply,
        Self::Quote,
        Self::At,
        Self::Unknown,
    ];

    /// Zahlencode -> Art; nie fehlschlagend
    pub fn aus_code(code: i64) -> Self {
        match code {
            1 => Self::Text,
            2 => Self::Image,
            3 => Self::Video,
            4 => Self::File,
            5 => Self::Voice,
            6 => Self::VoiceCall,
            7 => Self::VideoCall,
            8 => Self::Withdraw,
            9 => Self::Reply,
            10 => Self::Quote,
            11 => Self::At,
            _ => Self::Unknown,
        }
    }

    /// Art -> Zahlencode
    pub fn code(self) -> i8 {
        match self {
            Self::Text => 1,
            Self::Image => 2,
            Self::Video => 3,
            Self::File => 4,
            Self::Voice => 5,
            Self::VoiceCall => 6,
            Self::VideoCall => 7,
            Self::Withdraw => 8,
            Self::Reply => 9,
            Self::Quote => 10,
            Self::At => 11,
            Self::Unknown => Self::UNBEKANNT_CODE,
        }
    }

    /// Stabile Bezeichnung, wie sie in API-Antworten erscheint
    pub fn bezeichnung(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
            Self::Voice => "voice",
            Self::VoiceCall => "voice_call",
            Self::VideoCall => "video_call",
            Self::Withdraw => "withdraw",
            Self::Reply => "reply",
            Self::Quote => "quote",
            Self::At => "at",
            Self::Unknown => "unknown",
        }
    }

    /// Bezeichnung -> Art; Unbekanntes wird zu `Unknown`
    pub fn aus_bezeichnung(bezeichnung: &str) -> Self {
        Self::ALLE
            .into_iter()
            .find(|art| art.bezeichnung() == bezeichnung)
            .unwrap_or(Self::Unknown)
    }
}

/// Code -> Bezeichnung
pub fn bezeichnung_von(code: i64) -> &'static str {
    NachrichtenArt::aus_code(code).bezeichnung()
}

/// Bezeichnung -> Code; unbekannte Bezeichnungen ergeben 99
pub fn code_von(bezeichnung: &str) -> i8 {
    NachrichtenArt::aus_bezeichnung(bezeichnung).code()
}

impl std::fmt::Display for NachrichtenArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.bezeichnung())
    }
}
