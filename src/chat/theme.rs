//! Dark and light colour schemes for the chat view.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

/// Which colour scheme is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Glyph shown on the theme toggle.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Dark => "🌙",
            Self::Light => "☀️",
        }
    }

    /// Styles for every themed element of the view.
    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette {
                background: Style::default().bg(GRAY_900),
                container: Style::default().bg(GRAY_800).fg(Color::White),
                border: Style::default().fg(GRAY_700),
                title: Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
                user_bubble: Style::default().bg(BLUE_600).fg(Color::White),
                ai_bubble: Style::default().bg(GRAY_700).fg(Color::White),
                input: Style::default().bg(GRAY_800).fg(Color::White),
                input_border: Style::default().fg(GRAY_600),
                button: Style::default()
                    .bg(BLUE_600)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
                toggle: Style::default().bg(GRAY_700),
            },
            Self::Light => Palette {
                background: Style::default().bg(GRAY_100),
                container: Style::default().bg(Color::White).fg(GRAY_900),
                border: Style::default().fg(GRAY_200),
                title: Style::default().fg(GRAY_900).add_modifier(Modifier::BOLD),
                user_bubble: Style::default().bg(BLUE_500).fg(Color::White),
                ai_bubble: Style::default().bg(GRAY_200).fg(GRAY_900),
                input: Style::default().bg(Color::White).fg(GRAY_900),
                input_border: Style::default().fg(GRAY_300),
                button: Style::default()
                    .bg(BLUE_500)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
                toggle: Style::default().bg(GRAY_200),
            },
        }
    }
}

/// Resolved styles for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Area outside the chat card.
    pub background: Style,
    /// The chat card itself.
    pub container: Style,
    /// Message list border.
    pub border: Style,
    pub title: Style,
    pub user_bubble: Style,
    pub ai_bubble: Style,
    pub input: Style,
    pub input_border: Style,
    /// The `Send` button.
    pub button: Style,
    /// Background behind the theme glyph.
    pub toggle: Style,
}

const GRAY_100: Color = Color::Rgb(243, 244, 246);
const GRAY_200: Color = Color::Rgb(229, 231, 235);
const GRAY_300: Color = Color::Rgb(209, 213, 219);
const GRAY_600: Color = Color::Rgb(75, 85, 99);
const GRAY_700: Color = Color::Rgb(55, 65, 81);
const GRAY_800: Color = Color::Rgb(31, 41, 55);
const GRAY_900: Color = Color::Rgb(17, 24, 39);
const BLUE_500: Color = Color::Rgb(59, 130, 246);
const BLUE_600: Color = Color::Rgb(37, 99, 235);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involutive() {
        for theme in [Theme::Dark, Theme::Light] {
            assert_ne!(theme.toggled(), theme);
            assert_eq!(theme.toggled().toggled(), theme);
        }
    }

    #[test]
    fn test_palettes_differ() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_deserialize_lowercase() {
        let theme: Theme = serde_json::from_str("\"light\"").unwrap();
        assert_eq!(theme, Theme::Light);
    }
}
