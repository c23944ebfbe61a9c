//! Display formatting for prices, changes, and volumes.

/// Price with two decimals, e.g. `170.34`.
pub fn price(value: f64) -> String {
    format!("{value:.2}")
}

/// Change with an explicit sign and the percentage, e.g. `+1.12 (0.66%)`.
pub fn change(change: f64, change_percent: f64) -> String {
    let sign = if change >= 0.0 { "+" } else { "" };
    format!("{sign}{change:.2} ({change_percent:.2}%)")
}

/// Arrow showing the direction of a move.
pub fn arrow(change: f64) -> &'static str {
    if change >= 0.0 { "▲" } else { "▼" }
}

/// Abbreviated count, e.g. `1.2K`, `75.0M`, `2.6T`.
pub fn compact(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    UNITS
        .iter()
        .find(|(scale, _)| value.abs() >= *scale)
        .map(|(scale, unit)| format!("{:.1}{unit}", value / scale))
        .unwrap_or_else(|| format!("{value:.0}"))
}
