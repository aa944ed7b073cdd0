//! Mood scale presentation: band classification, badge classes and colours.

use shared::domain::MoodScore;

/// Shown in the mood panel until the backend sends a reflection.
pub const REFLECTION_PLACEHOLDER: &str = "Analyzing emotional state...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodBand {
    Critical,
    Low,
    Neutral,
    Good,
    Thriving,
}

impl MoodBand {
    /// Boundaries sit at 2, 4, 6 and 8 (inclusive upper bounds).
    pub fn classify(score: MoodScore) -> Self {
        match score.value() {
            0..=2 => Self::Critical,
            3..=4 => Self::Low,
            5..=6 => Self::Neutral,
            7..=8 => Self::Good,
            _ => Self::Thriving,
        }
    }

    pub fn badge_class(self) -> &'static str {
        match self {
            Self::Critical => "bg-danger",
            Self::Low => "bg-warning",
            Self::Neutral => "bg-secondary",
            Self::Good | Self::Thriving => "bg-success",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Critical => [0xef, 0x44, 0x44],
            Self::Low => [0xf9, 0x73, 0x16],
            Self::Neutral => [0xea, 0xb3, 0x08],
            Self::Good => [0x22, 0xc5, 0x5e],
            Self::Thriving => [0x10, 0xb9, 0x81],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Neutral => "neutral",
            Self::Good => "good",
            Self::Thriving => "thriving",
        }
    }
}

/// Width of the mood bar, in percent of its track.
pub fn bar_percentage(score: MoodScore) -> u8 {
    score.value() * 10
}

pub fn score_text(score: MoodScore) -> String {
    format!("{}/{}", score.value(), MoodScore::MAX)
}
