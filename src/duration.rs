const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Formats a non-negative number of seconds as e.g. "1d 2h 30m 5s".
///
/// The input is rounded to the nearest whole second before it is split. Zero-valued
/// components are left out, so zero seconds yields an empty string.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;

    let parts = [
        (total / SECONDS_PER_DAY, "d"),
        (total % SECONDS_PER_DAY / SECONDS_PER_HOUR, "h"),
        (total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE, "m"),
        (total % SECONDS_PER_MINUTE, "s"),
    ];

    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Like [`format_duration`], but keeps the sign of negative values and renders zero as "0s".
pub fn format_signed(seconds: f64) -> String {
    let text = format_duration(seconds.abs());
    if text.is_empty() {
        "0s".to_string()
    } else if seconds.round() < 0.0 {
        format!("-{text}")
    } else {
        text
    }
}
