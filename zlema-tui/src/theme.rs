//! Parrot/neon theme tokens for the ZLEMA dashboard.
//!
//! Neon accents on a near-black background:
//! - **Accent**: electric cyan (focus, highlights)
//! - **Positive**: neon green (profit, bullish, BUY)
//! - **Negative**: hot pink (loss, bearish, SELL, errors)
//! - **Warning**: neon orange (banner, stale data)
//! - **Neutral**: cool purple (secondary info)
//! - **Muted**: steel blue (labels, disabled)

use ratatui::style::{Color, Modifier, Style};

use zlema_core::chart::Rgba;

pub const BACKGROUND: Color = Color::Rgb(18, 18, 20);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const TEXT_SECONDARY: Color = Color::Rgb(170, 170, 170);

/// Parrot/neon theme
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: BACKGROUND,
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            neutral: NEUTRAL,
            muted: MUTED,
            text_primary: Color::White,
            text_secondary: TEXT_SECONDARY,
        }
    }

    /// Profit in pips: zero counts as positive.
    pub fn pnl_color(&self, value: f64) -> Color {
        if value >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    /// Win rate as a fraction in `[0, 1]`.
    pub fn win_rate_color(&self, win_rate: f64) -> Color {
        match win_rate {
            w if w >= 0.6 => self.positive,
            w if w >= 0.5 => self.accent,
            w if w >= 0.4 => self.neutral,
            _ => self.warning,
        }
    }

    /// News impact tag from the AI analysis.
    pub fn impact_color(&self, impact: &str) -> Color {
        match impact.to_ascii_lowercase().as_str() {
            "bullish" | "positive" => self.positive,
            "bearish" | "negative" => self.negative,
            "neutral" => self.neutral,
            _ => self.text_secondary,
        }
    }

    pub fn direction_color(&self, direction: &str) -> Color {
        match direction {
            "BUY" => self.positive,
            "SELL" => self.negative,
            _ => self.text_secondary,
        }
    }

    /// Map a chart colour onto the terminal, blending translucent colours
    /// into the background.
    pub fn trace_color(&self, rgba: Rgba) -> Color {
        let (br, bg, bb) = match self.background {
            Color::Rgb(r, g, b) => (r, g, b),
            _ => (0, 0, 0),
        };
        let a = rgba.a.clamp(0.0, 1.0);
        let mix = |fg: u8, back: u8| -> u8 {
            (fg as f32 * a + back as f32 * (1.0 - a)).round() as u8
        };
        Color::Rgb(mix(rgba.r, br), mix(rgba.g, bg), mix(rgba.b, bb))
    }
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn pnl(value: f64) -> Style {
    Style::default().fg(Theme::default().pnl_color(value))
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}
