use crate::core::score::RiskLevel;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use std::fmt;

/// Presentation token handed to renderers. `Gray` is the neutral fallback
/// for values outside the known bands.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    Green,
    Yellow,
    Orange,
    Red,
    Gray,
}

impl ColorToken {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }

    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::Green => text.green().bold(),
            Self::Yellow => text.yellow().bold(),
            Self::Orange => text.truecolor(255, 140, 0).bold(),
            Self::Red => text.red().bold(),
            Self::Gray => text.dimmed(),
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_risk_color(level: &str) -> ColorToken {
    RiskLevel::parse(level).map_or(ColorToken::Gray, RiskLevel::color)
}

pub fn classify_score_color(score: f64) -> ColorToken {
    if !(0.0..=100.0).contains(&score) {
        return ColorToken::Gray;
    }

    if score >= 90.0 {
        ColorToken::Green
    } else if score >= 75.0 {
        ColorToken::Yellow
    } else if score >= 60.0 {
        ColorToken::Orange
    } else {
        ColorToken::Red
    }
}
