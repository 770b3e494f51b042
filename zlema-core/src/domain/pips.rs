//! Pip conventions for display.

/// Scale factor the backend applies when it rescales prices to pips.
pub const PIP_MULTIPLIER: f64 = 10_000.0;

/// Price increment of one pip: 0.01 for yen crosses, 0.0001 otherwise.
pub fn pip_size(pair: &str) -> f64 {
    if pair.to_ascii_uppercase().contains("JPY") {
        0.01
    } else {
        0.0001
    }
}

/// Decimal places that show a full pip for `pair`.
pub fn price_decimals(pair: &str) -> usize {
    if pip_size(pair) >= 0.01 {
        3
    } else {
        5
    }
}

/// Convert a raw price move to pips for `pair`.
pub fn to_pips(pair: &str, price_delta: f64) -> f64 {
    price_delta / pip_size(pair)
}

/// `GBP_USD` -> `GBP/USD`.
pub fn display_pair(pair: &str) -> String {
    pair.replace('_', "/")
}

/// Signed pip figure, e.g. `+3.50 pips`.
pub fn format_pips(pips: f64) -> String {
    format!("{pips:+.2} pips")
}
