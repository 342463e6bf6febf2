//! Midnight sakura theme for anitui
//!
//! Color palette and style helpers for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Dark violet palette with sakura pink accents
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #12101a (deep violet-black)
    pub const BACKGROUND: Color = Color::Rgb(0x12, 0x10, 0x1a);

    /// Primary: #c8a2ff (soft violet)
    pub const PRIMARY: Color = Color::Rgb(0xc8, 0xa2, 0xff);

    /// Accent: #ff9ecb (sakura pink)
    pub const ACCENT: Color = Color::Rgb(0xff, 0x9e, 0xcb);

    /// Text: #e6e2f0 (soft white)
    pub const TEXT: Color = Color::Rgb(0xe6, 0xe2, 0xf0);

    /// Dim: #4a4458 (muted violet-grey)
    pub const DIM: Color = Color::Rgb(0x4a, 0x44, 0x58);

    /// Success: #8fe8a8 (mint green)
    pub const SUCCESS: Color = Color::Rgb(0x8f, 0xe8, 0xa8);

    /// Warning: #ffcc66 (amber)
    pub const WARNING: Color = Color::Rgb(0xff, 0xcc, 0x66);

    /// Error: #ff5c7a (rose red)
    pub const ERROR: Color = Color::Rgb(0xff, 0x5c, 0x7a);

    // ═══════════════════════════════════════════════════════════════════════
    // DERIVED COLORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Slightly lighter background for panels/cards
    pub const BACKGROUND_LIGHT: Color = Color::Rgb(0x1c, 0x19, 0x28);

    /// Border color (dim violet)
    pub const BORDER: Color = Color::Rgb(0x6a, 0x5a, 0x8c);

    /// Border color when focused
    pub const BORDER_FOCUSED: Color = Self::PRIMARY;

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND)
    }

    /// Dimmed/muted text
    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Error style
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }

    /// Success style
    pub fn success() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    /// Title/header style
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Accent text style (sakura)
    pub fn accent() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Normal/unfocused border
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    /// Focused border
    pub fn border_focused() -> Style {
        Style::default()
            .fg(Self::BORDER_FOCUSED)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for list items (normal state)
    pub fn list_item() -> Style {
        Style::default().fg(Self::TEXT)
    }

    /// Style for list items (selected/highlighted)
    pub fn list_item_selected() -> Style {
        Style::default()
            .fg(Self::BACKGROUND)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for input fields
    pub fn input() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    /// Style for input cursor
    pub fn input_cursor() -> Style {
        Style::default().fg(Self::BACKGROUND).bg(Self::PRIMARY)
    }

    /// Keybinding hint style
    pub fn keybind() -> Style {
        Style::default().fg(Self::ACCENT)
    }

    /// Keybinding description style
    pub fn keybind_desc() -> Style {
        Style::default().fg(Self::DIM)
    }

    /// Status bar style
    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::BACKGROUND_LIGHT)
    }

    /// Loading/spinner indicator
    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Community score, color-graded
    pub fn score(score: f32) -> Style {
        if score >= 8.0 {
            Style::default().fg(Self::SUCCESS)
        } else if score >= 6.5 {
            Style::default().fg(Self::WARNING)
        } else {
            Style::default().fg(Self::DIM)
        }
    }

    /// Dub availability badge
    pub fn dub_badge() -> Style {
        Style::default()
            .fg(Self::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Adaptive (HLS) source indicator
    pub fn adaptive_badge() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    /// Year/season metadata
    pub fn year() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Genre tags
    pub fn genre() -> Style {
        Style::default().fg(Self::DIM)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COLOR UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Calculate relative luminance for a color (used in contrast ratio)
/// Formula: https://www.w3.org/TR/WCAG20/#relativeluminancedef
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel_luminance(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel_luminance(r) + 0.7152 * channel_luminance(g) + 0.0722 * channel_luminance(b)
}

/// Calculate contrast ratio between two colors
/// Returns a value between 1 (same color) and 21 (black/white)
/// WCAG AA requires >= 4.5:1 for normal text, >= 3:1 for large text
pub fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
    let l1 = relative_luminance(fg.0, fg.1, fg.2);
    let l2 = relative_luminance(bg.0, bg.1, bg.2);

    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };

    (lighter + 0.05) / (darker + 0.05)
}

/// Check if a foreground/background pair meets WCAG AA for normal text
pub fn meets_wcag_aa(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
    contrast_ratio(fg, bg) >= 4.5
}

/// Check if a foreground/background pair meets WCAG AA for large text
pub fn meets_wcag_aa_large(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
    contrast_ratio(fg, bg) >= 3.0
}

/// Extract RGB tuple from ratatui Color (only works for Rgb variant)
pub fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(color: Color) -> (u8, u8, u8) {
        color_to_rgb(color).expect("Theme colors should all be RGB")
    }

    #[test]
    fn test_all_theme_colors_are_rgb() {
        assert!(color_to_rgb(Theme::BACKGROUND).is_some());
        assert!(color_to_rgb(Theme::PRIMARY).is_some());
        assert!(color_to_rgb(Theme::ACCENT).is_some());
        assert!(color_to_rgb(Theme::TEXT).is_some());
        assert!(color_to_rgb(Theme::DIM).is_some());
        assert!(color_to_rgb(Theme::SUCCESS).is_some());
        assert!(color_to_rgb(Theme::WARNING).is_some());
        assert!(color_to_rgb(Theme::ERROR).is_some());
    }

    #[test]
    fn test_text_contrast_against_background() {
        let bg = rgb(Theme::BACKGROUND);
        let text = rgb(Theme::TEXT);

        let ratio = contrast_ratio(text, bg);

        // WCAG AA requires >= 4.5:1 for normal text
        assert!(
            meets_wcag_aa(text, bg),
            "Text on background should meet WCAG AA (got {:.2}:1)",
            ratio
        );
    }

    #[test]
    fn test_primary_contrast_against_background() {
        let bg = rgb(Theme::BACKGROUND);
        let primary = rgb(Theme::PRIMARY);

        let ratio = contrast_ratio(primary, bg);

        assert!(
            meets_wcag_aa_large(primary, bg),
            "Primary on background should meet WCAG AA for large text (got {:.2}:1)",
            ratio
        );
    }

    #[test]
    fn test_error_contrast() {
        let bg = rgb(Theme::BACKGROUND);
        let error = rgb(Theme::ERROR);

        let ratio = contrast_ratio(error, bg);

        assert!(
            meets_wcag_aa_large(error, bg),
            "Error on background should meet WCAG AA for large text (got {:.2}:1)",
            ratio
        );
    }

    #[test]
    fn test_score_grading() {
        // High scores get the success color
        assert_eq!(
            Theme::score(8.7).fg,
            Some(Theme::SUCCESS)
        );
        assert_eq!(Theme::score(7.0).fg, Some(Theme::WARNING));
        assert_eq!(Theme::score(5.0).fg, Some(Theme::DIM));
    }

    #[test]
    fn test_relative_luminance_bounds() {
        assert!((relative_luminance(0, 0, 0) - 0.0).abs() < 0.001);
        assert!((relative_luminance(255, 255, 255) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_contrast_ratio_black_white() {
        let ratio = contrast_ratio((0, 0, 0), (255, 255, 255));
        assert!((ratio - 21.0).abs() < 0.1);
    }
}
