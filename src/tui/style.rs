//! Color constants and scaling helpers for the dashboard.

use ratatui::style::Color;

/// Header bar foreground.
pub const HEADER_FG: Color = Color::White;
/// Header bar background.
pub const HEADER_BG: Color = Color::DarkGray;
/// Selected tab.
pub const TAB_ACTIVE: Color = Color::Cyan;
/// Footer help text color.
pub const FOOTER_FG: Color = Color::DarkGray;
/// Error status line.
pub const ERROR_FG: Color = Color::Red;
/// Congestion alert.
pub const ALERT_FG: Color = Color::Yellow;
/// Everything below threshold.
pub const OK_FG: Color = Color::Green;
/// Primary series line.
pub const PRIMARY: Color = Color::Cyan;
/// Secondary series line.
pub const SECONDARY: Color = Color::Magenta;
/// Tertiary series line (interval bounds).
pub const MUTED: Color = Color::DarkGray;

/// Bar color by spread sign: DA premium blue, RT premium red.
pub fn spread_color(spread: f64) -> Color {
    if spread > 0.0 {
        Color::Blue
    } else if spread < 0.0 {
        Color::Red
    } else {
        Color::Gray
    }
}

/// Severity label color.
pub fn severity_color(severity: &str) -> Color {
    match severity {
        "High" => Color::Red,
        "Medium" => Color::Yellow,
        _ => Color::Green,
    }
}

/// Y-axis bounds over every series with 10% padding.
pub fn auto_bounds_y(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let all = series.iter().flat_map(|s| s.iter()).map(|&(_, y)| y);
    let min = all.clone().fold(f64::INFINITY, f64::min);
    let max = all.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

/// Scales a signed value to a bar height; bars cannot go negative, so the
/// caller shows the sign in the label.
pub fn bar_height(value: f64) -> u64 {
    (value.abs() * 100.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_pad_and_handle_empty() {
        assert_eq!(auto_bounds_y(&[]), [-1.0, 1.0]);
        let a = [(0.0, 10.0), (1.0, 20.0)];
        let b = [(0.0, 15.0)];
        let [lo, hi] = auto_bounds_y(&[&a, &b]);
        assert!((lo - 9.0).abs() < 1e-9);
        assert!((hi - 21.0).abs() < 1e-9);
    }

    #[test]
    fn bar_heights_keep_cents() {
        assert_eq!(bar_height(12.34), 1234);
        assert_eq!(bar_height(-3.5), 350);
    }
}
