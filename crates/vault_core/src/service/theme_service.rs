//! Theme resolver.
//!
//! Pure: the effective theme depends only on the stored config and the
//! current season.

use crate::model::theme::{seasonal_override, Season, ThemeConfig};

/// Resolves the tokens presentation should use.
///
/// When the stored mode is the seasonal preset, the season's partial
/// override is laid over it; otherwise the stored config is returned as is.
pub fn resolve(theme: &ThemeConfig, season: Season) -> ThemeConfig {
    if theme.mode.is_seasonal() {
        theme.overlaid(&seasonal_override(season))
    } else {
        theme.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::model::theme::{Season, ThemeConfig, ThemeMode};

    #[test]
    fn non_seasonal_mode_ignores_season() {
        let theme = ThemeConfig::preset(ThemeMode::Pixel);
        for season in Season::ALL {
            assert_eq!(resolve(&theme, season), theme);
        }
    }

    #[test]
    fn seasonal_override_keeps_untouched_tokens() {
        let theme = ThemeConfig::preset(ThemeMode::Stardew);
        let resolved = resolve(&theme, Season::Winter);
        assert_eq!(resolved.bg_color, "#1e293b");
        assert_eq!(resolved.font_family, theme.font_family);
        assert_eq!(resolved.border_radius, theme.border_radius);
        assert_eq!(resolved.mode, ThemeMode::Stardew);
    }
}
