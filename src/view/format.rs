//! Formatting utilities for human-readable output.
//!
//! Consistent display formatting for amounts, percentages, categories and
//! sizes across every fragment.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format an amount as whole US dollars, e.g. `$1,235`.
///
/// Rounds half away from zero. Non-finite input renders as `$0`.
///
/// # Examples
///
/// ```
/// use audit_agent_client::view::format::format_currency;
///
/// assert_eq!(format_currency(1234.5), "$1,235");
/// assert_eq!(format_currency(0.0), "$0");
/// assert_eq!(format_currency(-2500.0), "-$2,500");
/// ```
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Confidence in `[0, 1]` as a rounded whole percentage.
pub fn confidence_percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

/// `duplicate_payment` -> `Duplicate Payment`.
///
/// Underscores and whitespace both separate words, and runs of separators
/// collapse: `__odd__name_` -> `Odd Name`.
pub fn format_category(raw: &str) -> String {
    raw.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{} B", bytes)
    } else if size < MB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.2} MB", size / MB)
    }
}

/// Resolve an asset path returned by the service against `base_url`.
///
/// Backslashes become forward slashes. Absolute http(s) URLs pass through.
pub fn asset_url(base_url: &str, path: &str) -> String {
    let normalized = path.trim().replace('\\', "/");
    if normalized.starts_with("http://") || normalized.starts_with("https://") {
        return normalized;
    }
    let relative = normalized.trim_start_matches("./").trim_start_matches('/');
    format!("{}/{}", base_url.trim_end_matches('/'), relative)
}

/// Render the service timestamp (RFC 3339 or naive UTC) for display.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
        })
        .ok()?;
    Some(parsed.format("%Y-%m-%d %H:%M UTC").to_string())
}
