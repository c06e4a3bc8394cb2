//! Human-readable formatting helpers for reports

use std::time::Duration;

const SIZE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Formats a byte count in decimal units, floored to two decimals
///
/// # Examples
///
/// ```
/// use site_mirror::output::format_size;
///
/// assert_eq!(format_size(999), "999 B");
/// assert_eq!(format_size(1_999), "1.99 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{} {}", bytes, SIZE_UNITS[0]);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    let floored = (value * 100.0).floor() / 100.0;
    format!("{:.2} {}", floored, SIZE_UNITS[unit])
}

/// Formats a duration as `Hh Mm Ss`
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Fits `text` into a column of `width` characters
///
/// Short values are padded; long values keep their tail and are prefixed
/// with `...`, since the end of a URL is usually the informative part.
pub fn cell(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return format!("{:<width$}", text, width = width);
    }
    if width <= 3 {
        return ".".repeat(width);
    }

    let tail: String = text.chars().skip(len - (width - 3)).collect();
    format!("...{}", tail)
}
