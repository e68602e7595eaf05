//! Utility helpers for Musico

/// Formats a playback position in seconds as `m:ss`.
/// Negative and non-finite inputs render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Formats a track length in milliseconds as `(m:ss)`, or an empty string
/// when the length is unknown or zero.
pub fn format_track_length(length_ms: Option<u64>) -> String {
    match length_ms {
        Some(ms) if ms > 0 => {
            let minutes = ms / 60_000;
            let seconds = (ms % 60_000) / 1000;
            format!("({minutes}:{seconds:02})")
        }
        _ => String::new(),
    }
}
