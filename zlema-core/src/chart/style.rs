//! Colours and line styles for chart traces.

use crate::domain::LevelKind;

/// An sRGB colour with straight alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(r,g,b,a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dash {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceStyle {
    pub color: Rgba,
    /// Second colour for two-tone traces (candle bodies on bearish bars).
    pub down_color: Option<Rgba>,
    pub width: f64,
    pub dash: Dash,
}

impl TraceStyle {
    pub const fn line(color: Rgba, width: f64) -> Self {
        Self {
            color,
            down_color: None,
            width,
            dash: Dash::Solid,
        }
    }

    pub const fn dashed(self) -> Self {
        Self {
            dash: Dash::Dashed,
            ..self
        }
    }

    pub const fn dotted(self) -> Self {
        Self {
            dash: Dash::Dotted,
            ..self
        }
    }

    pub const fn two_tone(self, down: Rgba) -> Self {
        Self {
            down_color: Some(down),
            ..self
        }
    }
}

pub mod palette {
    use super::Rgba;

    /// Cycled across per-window indicator series.
    pub const SERIES: [Rgba; 6] = [
        Rgba::rgb(0xFF, 0x6B, 0x6B),
        Rgba::rgb(0x4E, 0xCD, 0xC4),
        Rgba::rgb(0x45, 0xB7, 0xD1),
        Rgba::rgb(0xFF, 0xA0, 0x7A),
        Rgba::rgb(0x98, 0xD8, 0xC8),
        Rgba::rgb(0xF7, 0xDC, 0x6F),
    ];

    pub const SUPPORT: Rgba = Rgba::rgba(0, 255, 0, 0.6);
    pub const RESISTANCE: Rgba = Rgba::rgba(255, 0, 0, 0.6);
    pub const VOLUME: Rgba = Rgba::rgb(255, 255, 0);
    pub const FIBONACCI: Rgba = Rgba::rgb(0, 255, 255);
    pub const PIVOTS: Rgba = Rgba::rgb(255, 0, 255);

    pub const WICK: Rgba = Rgba::rgba(150, 150, 150, 0.6);
    pub const BULL_BODY: Rgba = Rgba::rgba(100, 255, 100, 0.5);
    pub const BEAR_BODY: Rgba = Rgba::rgba(255, 100, 100, 0.5);

    pub const RIBBON_OPACITY: f32 = 0.2;
    pub const BULL: Rgba = Rgba::rgb(0, 255, 0);
    pub const BEAR: Rgba = Rgba::rgb(255, 0, 0);
    pub const AVERAGE_UP: Rgba = Rgba::rgb(0, 128, 0);
    pub const AVERAGE_DOWN: Rgba = Rgba::rgb(255, 0, 0);

    pub const CLOSE: Rgba = Rgba::rgb(255, 255, 255);
    pub const MEDIAN: Rgba = Rgba::rgb(255, 255, 0);
    pub const STD_DEV: Rgba = Rgba::rgb(255, 255, 255);
    pub const REFERENCE: Rgba = Rgba::rgba(128, 128, 128, 0.3);

    pub const ZLEMA: Rgba = Rgba::rgb(0xFF, 0xA5, 0x00);
    pub const BAND: Rgba = Rgba::rgba(200, 200, 200, 0.5);
    pub const POLYNOMIAL: Rgba = Rgba::rgb(0xBB, 0x86, 0xFC);

    /// Candle body width in bar units.
    pub const BODY_WIDTH: f64 = 0.4;
}

/// Colour for the `i`th per-window series.
pub fn series_color(i: usize) -> Rgba {
    palette::SERIES[i % palette::SERIES.len()]
}

pub fn level_color(kind: LevelKind) -> Rgba {
    match kind {
        LevelKind::Support => palette::SUPPORT,
        LevelKind::Resistance => palette::RESISTANCE,
        LevelKind::Volume => palette::VOLUME,
        LevelKind::Fibonacci => palette::FIBONACCI,
        LevelKind::Pivots => palette::PIVOTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_forms() {
        assert_eq!(Rgba::rgb(0xFF, 0x6B, 0x6B).to_css(), "#ff6b6b");
        assert_eq!(palette::SUPPORT.to_css(), "rgba(0,255,0,0.6)");
        assert_eq!(palette::BULL.with_alpha(0.2).to_css(), "rgba(0,255,0,0.2)");
    }

    #[test]
    fn series_colors_cycle() {
        assert_eq!(series_color(0), series_color(6));
        assert_ne!(series_color(0), series_color(1));
    }
}
