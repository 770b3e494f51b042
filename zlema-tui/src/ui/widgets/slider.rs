//! Labeled horizontal slider.
//!
//! Used by the strategy panel and the units picker in the sidebar.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme;

/// `[=====     ]` with `width` cells between the brackets.
pub fn slider(value: f64, min: f64, max: f64, width: usize) -> String {
    let range = max - min;
    if range <= 0.0 {
        return format!("[{}]", "=".repeat(width));
    }
    let frac = ((value - min) / range).clamp(0.0, 1.0);
    let filled = (frac * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

/// One slider row: right-aligned label, bar, value.
pub fn slider_line<'a>(
    label: &str,
    value: f64,
    range: (f64, f64),
    width: usize,
    value_text: String,
    active: bool,
) -> Line<'a> {
    let (label_style, bar_style): (Style, Style) = if active {
        (
            theme::accent().add_modifier(ratatui::style::Modifier::REVERSED),
            theme::accent(),
        )
    } else {
        (theme::muted(), theme::muted())
    };
    Line::from(vec![
        Span::styled(format!("{label:>11}: "), label_style),
        Span::styled(slider(value, range.0, range.1, width), bar_style),
        Span::styled(format!(" {value_text}"), label_style),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_fills_proportionally() {
        assert_eq!(slider(0.0, 0.0, 10.0, 4), "[    ]");
        assert_eq!(slider(5.0, 0.0, 10.0, 4), "[==  ]");
        assert_eq!(slider(10.0, 0.0, 10.0, 4), "[====]");
    }

    #[test]
    fn slider_clamps_out_of_range() {
        assert_eq!(slider(-3.0, 0.0, 10.0, 4), "[    ]");
        assert_eq!(slider(30.0, 0.0, 10.0, 4), "[====]");
    }

    #[test]
    fn degenerate_range_is_full() {
        assert_eq!(slider(1.0, 1.0, 1.0, 3), "[===]");
    }
}
