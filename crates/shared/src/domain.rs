use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SessionId);
id_newtype!(CharacterId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    Human,
    Ai,
}

/// Simulated emotional state of the AI character on a 0..=10 scale.
///
/// The backend produces mood values from model output, so any JSON number is
/// accepted and rounded/clamped into range rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MoodScore(u8);

impl MoodScore {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.round().clamp(Self::MIN as f64, Self::MAX as f64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for MoodScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for MoodScore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        f64::deserialize(deserializer).map(Self::from_f64)
    }
}

/// `deserialize_with` helper for optional mood fields filled from model output.
///
/// Numbers and numeric strings become a score; anything else decodes to `None`
/// so the surrounding message still goes through.
pub mod lenient_mood {
    use serde::{de::IgnoredAny, Deserialize, Deserializer};

    use super::MoodScore;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMood {
        Number(f64),
        Text(String),
        Other(IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<MoodScore>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<RawMood>::deserialize(deserializer)? {
            Some(RawMood::Number(value)) => Some(value),
            Some(RawMood::Text(text)) => text.trim().parse::<f64>().ok(),
            Some(RawMood::Other(_)) | None => None,
        };
        Ok(value.filter(|v| v.is_finite()).map(MoodScore::from_f64))
    }
}
