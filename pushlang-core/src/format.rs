//! Formatting helpers for the report.

/// SI suffixes, largest first.
const UNITS: [(&str, f64); 6] = [
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
];

/// Format a count with an SI suffix (e.g., "1.5k", "2.5M").
///
/// Uses the largest unit the value reaches, with one decimal place.
/// Values below 1000 are printed as-is.
pub fn format_number(num: u64) -> String {
    let value = num as f64;
    for (symbol, unit) in UNITS {
        let quotient = value / unit;
        if quotient >= 1.0 {
            return format!("{:.1}{}", quotient, symbol);
        }
    }
    num.to_string()
}

/// Cut `name` to `max_chars` characters, ending in an ellipsis when shortened.
pub fn truncate(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let kept: String = name.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
