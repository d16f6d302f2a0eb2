//! Fixed-width text report with a block-character bar chart.
//!
//! One line per language:
//!
//! ```text
//! Rust         +1.5k /   -200 ███████████▎░░░░░░ 62.50%
//! ```

use crate::format::{format_number, truncate};
use crate::stats::LanguageStat;

/// Characters reserved for the language name.
pub const NAME_WIDTH: usize = 10;

/// Cells in the bar chart.
pub const BAR_WIDTH: usize = 18;

/// Empty cell, seven partial cells in eighths, full cell.
const BAR_GLYPHS: [char; 9] = ['░', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render statistics as newline-separated report lines.
pub fn render(stats: &[LanguageStat]) -> String {
    stats.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

fn render_line(stat: &LanguageStat) -> String {
    let name = truncate(&stat.name, NAME_WIDTH);
    let additions = format!("+{}", format_number(stat.additions));
    let deletions = format!("-{}", format_number(stat.deletions));

    format!(
        "{:<name_width$} {:>7} /{:>7} {} {:>5.2}%",
        name,
        additions,
        deletions,
        bar_chart(stat.percent, BAR_WIDTH),
        stat.percent,
        name_width = NAME_WIDTH,
    )
}

/// A bar of exactly `size` cells filled in proportion to `percent`.
///
/// Resolution is one eighth of a cell; out-of-range percentages are clamped.
pub fn bar_chart(percent: f64, size: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let eighths = ((size * 8) as f64 * percent / 100.0).floor() as usize;
    let full = eighths / 8;

    if full >= size {
        return BAR_GLYPHS[8].to_string().repeat(size);
    }

    let partial = eighths % 8;
    let mut bar = String::with_capacity(size * 3);
    bar.extend(std::iter::repeat(BAR_GLYPHS[8]).take(full));
    if partial > 0 {
        bar.push(BAR_GLYPHS[partial]);
    }
    let used = full + usize::from(partial > 0);
    bar.extend(std::iter::repeat(BAR_GLYPHS[0]).take(size - used));
    bar
}
