//! Theme tokens, presets and seasonal overrides.
//!
//! # Responsibility
//! - Define the persisted theme record consumed by presentation.
//! - Hold the fixed preset table and the seasonal partial overrides.
//!
//! # Invariants
//! - `ThemeMode::Stardew` is the only seasonal-capable preset.
//! - Seasonal overrides only touch background, panel, accent and border colors.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Theme preset tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Minimal,
    Pixel,
    Stardew,
    Custom,
}

impl ThemeMode {
    pub fn is_seasonal(self) -> bool {
        self == Self::Stardew
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Pixel => "pixel",
            Self::Stardew => "stardew",
            Self::Custom => "custom",
        }
    }
}

/// Season tag driving the seasonal overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    /// Next season in Spring → Summer → Autumn → Winter → Spring order.
    pub fn next(self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Autumn,
            Self::Autumn => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSeason(pub String);

impl Display for UnknownSeason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown season `{}`", self.0)
    }
}

impl Error for UnknownSeason {}

impl FromStr for Season {
    type Err = UnknownSeason;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownSeason(value.to_string()))
    }
}

/// Complete set of style tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub mode: ThemeMode,
    pub font_family: String,
    pub bg_color: String,
    pub panel_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub border_color: String,
    pub border_radius: String,
    pub border_width: String,
    pub shadow: String,
}

/// Partial token set. `None` fields leave the base value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOverride {
    pub font_family: Option<String>,
    pub bg_color: Option<String>,
    pub panel_color: Option<String>,
    pub text_color: Option<String>,
    pub accent_color: Option<String>,
    pub border_color: Option<String>,
    pub border_radius: Option<String>,
    pub border_width: Option<String>,
    pub shadow: Option<String>,
}

impl ThemeOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl ThemeConfig {
    /// Returns the built-in token set for `mode`.
    pub fn preset(mode: ThemeMode) -> Self {
        let (font, bg, panel, text, accent, border, radius, width, shadow) = match mode {
            ThemeMode::Minimal => (
                "'Noto Sans SC', sans-serif",
                "#F7F7F7",
                "#ffffff",
                "#191919",
                "#07C160",
                "#EEEEEE",
                "12px",
                "0px",
                "0 2px 10px rgba(0,0,0,0.05)",
            ),
            ThemeMode::Pixel => (
                "'ZCOOL KuaiLe', cursive",
                "#5c94fc",
                "#ffffff",
                "#000000",
                "#f8d800",
                "#000000",
                "0px",
                "3px",
                "4px 4px 0px 0px rgba(0,0,0,1)",
            ),
            ThemeMode::Stardew => (
                "'ZCOOL XiaoWei', serif",
                "#3d2817",
                "#F4E4BC",
                "#3d2817",
                "#5B9B42",
                "#724E31",
                "24px",
                "4px",
                "6px 6px 0px 0px rgba(0,0,0,0.15)",
            ),
            ThemeMode::Custom => (
                "'Noto Sans SC', sans-serif",
                "#ffffff",
                "#f3f4f6",
                "#000000",
                "#000000",
                "#000000",
                "8px",
                "1px",
                "none",
            ),
        };

        Self {
            mode,
            font_family: font.to_string(),
            bg_color: bg.to_string(),
            panel_color: panel.to_string(),
            text_color: text.to_string(),
            accent_color: accent.to_string(),
            border_color: border.to_string(),
            border_radius: radius.to_string(),
            border_width: width.to_string(),
            shadow: shadow.to_string(),
        }
    }

    /// Returns a copy with every `Some` field of `overlay` taking precedence.
    ///
    /// The mode is left unchanged.
    pub fn overlaid(&self, overlay: &ThemeOverride) -> Self {
        let pick = |base: &String, value: &Option<String>| {
            value.clone().unwrap_or_else(|| base.clone())
        };
        Self {
            mode: self.mode,
            font_family: pick(&self.font_family, &overlay.font_family),
            bg_color: pick(&self.bg_color, &overlay.bg_color),
            panel_color: pick(&self.panel_color, &overlay.panel_color),
            text_color: pick(&self.text_color, &overlay.text_color),
            accent_color: pick(&self.accent_color, &overlay.accent_color),
            border_color: pick(&self.border_color, &overlay.border_color),
            border_radius: pick(&self.border_radius, &overlay.border_radius),
            border_width: pick(&self.border_width, &overlay.border_width),
            shadow: pick(&self.shadow, &overlay.shadow),
        }
    }

    /// User token edit: applies `edit` and switches to `ThemeMode::Custom`.
    pub fn apply(&mut self, edit: &ThemeOverride) {
        *self = self.overlaid(edit);
        self.mode = ThemeMode::Custom;
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self::preset(ThemeMode::Stardew)
    }
}

/// Partial token set applied over the seasonal preset for `season`.
pub fn seasonal_override(season: Season) -> ThemeOverride {
    let (bg, panel, accent, border) = match season {
        Season::Spring => ("#3d2817", "#F4E4BC", "#5B9B42", "#724E31"),
        Season::Summer => ("#2d5a27", "#fefce8", "#EAB308", "#854d0e"),
        Season::Autumn => ("#9a3412", "#fff7ed", "#f97316", "#7c2d12"),
        Season::Winter => ("#1e293b", "#f1f5f9", "#0ea5e9", "#334155"),
    };
    ThemeOverride {
        bg_color: Some(bg.to_string()),
        panel_color: Some(panel.to_string()),
        accent_color: Some(accent.to_string()),
        border_color: Some(border.to_string()),
        ..ThemeOverride::default()
    }
}

/// Decorative glyph shown for `season` in the seasonal theme.
pub fn season_decoration(season: Season) -> &'static str {
    match season {
        Season::Spring => "🌸",
        Season::Summer => "🌻",
        Season::Autumn => "🍁",
        Season::Winter => "❄️",
    }
}
