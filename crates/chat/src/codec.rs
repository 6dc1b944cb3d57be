//! Kodieren und Dekodieren von Umschlaegen
//!
//! Dekodiert wird ebenenweise: jede Ebene wird als `RohUmschlag` gelesen, der
//! verschachtelte Umschlag bleibt dabei unverarbeiteter JSON-Text. Erst wenn
//! das Tiefenbudget eine weitere Ebene erlaubt, wird er geparst. Eingaben mit
//! beliebig tiefer Verschachtelung werden so abgewiesen, ohne sie komplett zu
//! verarbeiten.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::art::NachrichtenArt;
use crate::envelope::{
    AnrufNachricht, AntwortNachricht, BildNachricht, DateiNachricht, ErwaehnungNachricht,
    RueckrufNachricht, SprachNachricht, Umschlag, VideoNachricht, ZitatNachricht,
};
use crate::error::{DekodierFehler, KodierFehler};

/// Standard-Tiefenbudget
pub const STANDARD_MAX_TIEFE: usize = 5;

// ---------------------------------------------------------------------------
// Lose Form
// ---------------------------------------------------------------------------

/// Eine Ebene des gespeicherten JSON, ohne Pruefung der Invarianten
///
/// Jede Nutzlast ist optional; `null` und fehlende Schluessel sind gleichwertig.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RohUmschlag {
    #[serde(rename = "type")]
    pub typ: i64,
    pub content: Option<String>,
    #[serde(rename = "imageMsg")]
    pub image_msg: Option<BildNachricht>,
    #[serde(rename = "videoMsg")]
    pub video_msg: Option<VideoNachricht>,
    #[serde(rename = "fileMsg")]
    pub file_msg: Option<DateiNachricht>,
    #[serde(rename = "voiceMsg")]
    pub voice_msg: Option<SprachNachricht>,
    #[serde(rename = "voiceCallMsg")]
    pub voice_call_msg: Option<AnrufNachricht>,
    #[serde(rename = "videoCallMsg")]
    pub video_call_msg: Option<AnrufNachricht>,
    #[serde(rename = "withdrawMsg")]
    pub withdraw_msg: Option<RohRueckruf>,
    #[serde(rename = "replyMsg")]
    pub reply_msg: Option<RohAntwort>,
    #[serde(rename = "quoteMsg")]
    pub quote_msg: Option<RohZitat>,
    #[serde(rename = "atMsg")]
    pub at_msg: Option<RohErwaehnung>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RohRueckruf {
    pub content: String,
    #[serde(rename = "originMsg", default)]
    pub origin_msg: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RohAntwort {
    #[serde(rename = "msgID")]
    pub msg_id: i64,
    pub content: String,
    #[serde(default)]
    pub msg: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RohZitat {
    #[serde(rename = "msgID")]
    pub msg_id: i64,
    pub content: String,
    #[serde(default)]
    pub msg: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RohErwaehnung {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub content: String,
    #[serde(default)]
    pub msg: Option<Box<RawValue>>,
}

impl RohUmschlag {
    /// Anzahl der belegten Nutzlasten
    pub fn belegte_nutzlasten(&self) -> usize {
        [
            self.content.is_some(),
            self.image_msg.is_some(),
            self.video_msg.is_some(),
            self.file_msg.is_some(),
            self.voice_msg.is_some(),
            self.voice_call_msg.is_some(),
            self.video_call_msg.is_some(),
            self.withdraw_msg.is_some(),
            self.reply_msg.is_some(),
            self.quote_msg.is_some(),
            self.at_msg.is_some(),
        ]
        .into_iter()
        .filter(|belegt| *belegt)
        .count()
    }

    /// Der rohe Unter-Umschlag, falls eine verschachtelnde Nutzlast einen traegt
    fn innerer_umschlag(&self) -> Option<&RawValue> {
        self.withdraw_msg
            .as_ref()
            .and_then(|r| r.origin_msg.as_deref())
            .or_else(|| self.reply_msg.as_ref().and_then(|a| a.msg.as_deref()))
            .or_else(|| self.quote_msg.as_ref().and_then(|z| z.msg.as_deref()))
            .or_else(|| self.at_msg.as_ref().and_then(|e| e.msg.as_deref()))
    }

    /// Ob die zur Art passende Nutzlast belegt ist
    pub fn passende_nutzlast(&self) -> bool {
        match NachrichtenArt::aus_code(self.typ) {
            NachrichtenArt::Text => self.content.is_some(),
            NachrichtenArt::Image => self.image_msg.is_some(),
            NachrichtenArt::Video => self.video_msg.is_some(),
            NachrichtenArt::File => self.file_msg.is_some(),
            NachrichtenArt::Voice => self.voice_msg.is_some(),
            NachrichtenArt::VoiceCall => self.voice_call_msg.is_some(),
            NachrichtenArt::VideoCall => self.video_call_msg.is_some(),
            NachrichtenArt::Withdraw => self.withdraw_msg.is_some(),
            NachrichtenArt::Reply => self.reply_msg.is_some(),
            NachrichtenArt::Quote => self.quote_msg.is_some(),
            NachrichtenArt::At => self.at_msg.is_some(),
            NachrichtenArt::Unknown => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Dekodieren
// ---------------------------------------------------------------------------

/// Dekodiert einen Umschlag mit hoechstens `budget` Ebenen
pub fn dekodieren(eingabe: &[u8], budget: usize) -> Result<Umschlag, DekodierFehler> {
    let roh: RohUmschlag =
        serde_json::from_slice(eingabe).map_err(|e| DekodierFehler::Fehlerhaft(e.to_string()))?;
    umschlag_aus_roh(roh, budget, budget)
}

fn roh_parsen(text: &RawValue) -> Result<RohUmschlag, DekodierFehler> {
    serde_json::from_str(text.get()).map_err(|e| DekodierFehler::Fehlerhaft(e.to_string()))
}

/// Verschachtelten Umschlag lesen; `rest` ist das Budget der aktuellen Ebene
fn innen(
    text: Option<Box<RawValue>>,
    art: i64,
    rest: usize,
    max: usize,
) -> Result<Box<Umschlag>, DekodierFehler> {
    let text = text.ok_or(DekodierFehler::FehlendeNutzlast { art })?;
    if rest <= 1 {
        return Err(DekodierFehler::ZuTief { max });
    }
    let roh = roh_parsen(&text)?;
    umschlag_aus_roh(roh, rest - 1, max).map(Box::new)
}

fn umschlag_aus_roh(roh: RohUmschlag, rest: usize, max: usize) -> Result<Umschlag, DekodierFehler> {
    if rest == 0 {
        return Err(DekodierFehler::ZuTief { max });
    }

    let art = roh.typ;
    let anzahl = roh.belegte_nutzlasten();
    if anzahl > 1 {
        return Err(DekodierFehler::UngueltigeVariante { art, anzahl });
    }

    let fehlt = DekodierFehler::FehlendeNutzlast { art };
    let umschlag = match NachrichtenArt::aus_code(art) {
        NachrichtenArt::Text => Umschlag::Text(roh.content.ok_or(fehlt)?),
        NachrichtenArt::Image => Umschlag::Image(roh.image_msg.ok_or(fehlt)?),
        NachrichtenArt::Video => Umschlag::Video(roh.video_msg.ok_or(fehlt)?),
        NachrichtenArt::File => Umschlag::File(roh.file_msg.ok_or(fehlt)?),
        NachrichtenArt::Voice => Umschlag::Voice(roh.voice_msg.ok_or(fehlt)?),
        NachrichtenArt::VoiceCall => Umschlag::VoiceCall(roh.voice_call_msg.ok_or(fehlt)?),
        NachrichtenArt::VideoCall => Umschlag::VideoCall(roh.video_call_msg.ok_or(fehlt)?),
        NachrichtenArt::Withdraw => {
            let r = roh.withdraw_msg.ok_or(fehlt)?;
            Umschlag::Withdraw(RueckrufNachricht {
                content: r.content,
                original: innen(r.origin_msg, art, rest, max)?,
            })
        }
        NachrichtenArt::Reply => {
            let a = roh.reply_msg.ok_or(fehlt)?;
            Umschlag::Reply(AntwortNachricht {
                msg_id: a.msg_id,
                content: a.content,
                bezug: innen(a.msg, art, rest, max)?,
            })
        }
        NachrichtenArt::Quote => {
            let z = roh.quote_msg.ok_or(fehlt)?;
            Umschlag::Quote(ZitatNachricht {
                msg_id: z.msg_id,
                content: z.content,
                bezug: innen(z.msg, art, rest, max)?,
            })
        }
        NachrichtenArt::At => {
            let e = roh.at_msg.ok_or(fehlt)?;
            Umschlag::At(ErwaehnungNachricht {
                user_id: e.user_id,
                content: e.content,
                bezug: innen(e.msg, art, rest, max)?,
            })
        }
        NachrichtenArt::Unknown => return Err(fehlt),
    };

    Ok(umschlag)
}

// ---------------------------------------------------------------------------
// Kodieren
// ---------------------------------------------------------------------------

/// Kodiert einen Umschlag; mehr als `budget` Ebenen ergeben `ZuTief`
pub fn kodieren(umschlag: &Umschlag, budget: usize) -> Result<String, KodierFehler> {
    if umschlag.tiefe() > budget {
        return Err(KodierFehler::ZuTief { max: budget });
    }
    serde_json::to_string(umschlag).map_err(|e| KodierFehler::Serialisierung(e.to_string()))
}

/// Prueft einen losen Umschlag und wandelt ihn in die strenge Form
///
/// Jede Ebene muss genau eine Nutzlast tragen, und zwar die zur Art passende.
pub fn pruefen_roh(roh: &RohUmschlag, budget: usize) -> Result<Umschlag, KodierFehler> {
    ebene_pruefen(roh, budget, budget)?;

    umschlag_aus_roh(roh.clone(), budget, budget).map_err(|e| match e {
        DekodierFehler::ZuTief { max } => KodierFehler::ZuTief { max },
        andere => KodierFehler::Verschachtelt(andere),
    })
}

fn ebene_pruefen(roh: &RohUmschlag, rest: usize, max: usize) -> Result<(), KodierFehler> {
    let anzahl = roh.belegte_nutzlasten();
    if anzahl != 1 {
        return Err(KodierFehler::UngueltigeVariante(format!(
            "type {} mit {anzahl} Nutzlasten",
            roh.typ
        )));
    }
    if !roh.passende_nutzlast() {
        return Err(KodierFehler::UngueltigeVariante(format!(
            "belegte Nutzlast passt nicht zu type {}",
            roh.typ
        )));
    }
    if rest == 0 {
        return Err(KodierFehler::ZuTief { max });
    }

    let Some(text) = roh.innerer_umschlag() else {
        return Ok(());
    };
    if rest <= 1 {
        return Err(KodierFehler::ZuTief { max });
    }
    let innerer = roh_parsen(text).map_err(KodierFehler::Verschachtelt)?;
    ebene_pruefen(&innerer, rest - 1, max)
}

/// Kodiert einen losen Umschlag nach Pruefung aller Invarianten
pub fn kodieren_roh(roh: &RohUmschlag, budget: usize) -> Result<String, KodierFehler> {
    let umschlag = pruefen_roh(roh, budget)?;
    kodieren(&umschlag, budget)
}

// ---------------------------------------------------------------------------
// Codec mit festem Budget
// ---------------------------------------------------------------------------

/// Codec mit konfiguriertem Tiefenbudget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UmschlagCodec {
    max_tiefe: usize,
}

impl Default for UmschlagCodec {
    fn default() -> Self {
        Self {
            max_tiefe: STANDARD_MAX_TIEFE,
        }
    }
}

impl UmschlagCodec {
    pub fn neu(max_tiefe: usize) -> Self {
        Self { max_tiefe }
    }

    pub fn max_tiefe(&self) -> usize {
        self.max_tiefe
    }

    pub fn kodieren(&self, umschlag: &Umschlag) -> Result<String, KodierFehler> {
        kodieren(umschlag, self.max_tiefe)
    }

    pub fn dekodieren(&self, eingabe: &[u8]) -> Result<Umschlag, DekodierFehler> {
        dekodieren(eingabe, self.max_tiefe)
    }

    pub fn pruefen_roh(&self, roh: &RohUmschlag) -> Result<Umschlag, KodierFehler> {
        pruefen_roh(roh, self.max_tiefe)
    }

    pub fn kodieren_roh(&self, roh: &RohUmschlag) -> Result<String, KodierFehler> {
        kodieren_roh(roh, self.max_tiefe)
    }
}
