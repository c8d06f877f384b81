//! Display formatting for durations and file sizes

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format seconds as `m:ss`
///
/// Negative and non-finite values render as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format a track's nominal duration, `--:--` when unknown
pub fn format_track_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) if secs.is_finite() && secs > 0.0 => format_duration(secs),
        _ => "--:--".to_string(),
    }
}

/// Format seconds as `h:mm:ss`, or `m:ss` below one hour
pub fn format_duration_long(seconds: f64) -> String {
    let total = whole_seconds(seconds);
    let hours = total / 3600;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, (total % 3600) / 60, total % 60)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Format a byte count with 1024-based units and one decimal
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, SIZE_UNITS[unit])
}

fn whole_seconds(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    }
}
