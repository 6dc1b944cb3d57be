//! Gemeinsame Identifikationstypen fuer Plauder
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Die Werte sind
//! die Auto-Increment-Schluessel der Datenbank (int64).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! id_typ {
    ($(#[$meta:meta])* $name:ident, $praefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Gibt den inneren Datenbank-Schluessel zurueck
            pub fn inner(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(wert: i64) -> Self {
                Self(wert)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($praefix, ":{}"), self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(wert) if wert > 0 => Ok(Self(wert)),
                    _ => Err(CoreError::UngueltigeId {
                        art: $praefix,
                        wert: s.to_string(),
                    }),
                }
            }
        }
    };
}

id_typ!(
    /// Eindeutige Benutzer-ID
    UserId,
    "user"
);

id_typ!(
    /// Eindeutige Gruppen-ID
    GroupId,
    "group"
);

id_typ!(
    /// Eindeutige Nachrichten-ID (Zeile in `chat_messages` bzw. `group_messages`)
    MessageId,
    "msg"
);
