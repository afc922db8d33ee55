//! Time and progress formatting.

/// Format seconds as `m:ss`. Unknown or invalid values render as `0:00`.
///
/// ```
/// use core_playback::format_time;
///
/// assert_eq!(format_time(0.0), "0:00");
/// assert_eq!(format_time(65.9), "1:05");
/// assert_eq!(format_time(f64::NAN), "0:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Playback progress as a percentage in `0.0..=100.0`.
///
/// Returns `0.0` when the duration is unknown or not positive.
pub fn progress_percent(position_seconds: f64, duration_seconds: Option<f64>) -> f64 {
    match duration_seconds {
        Some(duration) if duration.is_finite() && duration > 0.0 && position_seconds.is_finite() => {
            (position_seconds / duration * 100.0).clamp(0.0, 100.0)
        }
        _ => 0.0,
    }
}
