//! Race time formatting.

/// Formats elapsed seconds as `H:MM:SS`, or `MM:SS` under an hour.
///
/// Negative inputs are clamped to zero.
#[must_use]
pub fn format_race_time(seconds: i32) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
