//! Human-readable formatting for sizes, timestamps and quota usage.
//!
//! Table views and status messages go through these helpers so every number is
//! shown the same way:
//!
//! ```rust
//! use toolshed::libs::formatter::{format_bytes, format_percent};
//!
//! assert_eq!(format_bytes(1536), "1.5 KiB");
//! assert_eq!(format_percent(0.125), "12.5%");
//! ```

use chrono::{DateTime, Local, Utc};

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Binary-prefixed size with one decimal; plain bytes below 1 KiB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

/// Local time, `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Like [`format_timestamp`], with a dash for "never".
pub fn format_optional_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

/// A ratio as a percentage with one decimal. Values above 100% are shown as is.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Short preview of a payload: UTF-8 text when possible, otherwise its size.
pub fn format_payload(payload: &[u8], max_chars: usize) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if text.chars().count() > max_chars => {
            let cut: String = text.chars().take(max_chars).collect();
            format!("{}…", cut)
        }
        Ok(text) => text.to_string(),
        Err(_) => format!("<{} binary>", format_bytes(payload.len() as u64)),
    }
}
