//! Alert message formatting.

use crate::reading::Reading;

/// Format a value as an integer when it has no fractional part, otherwise
/// with two decimals. Covers both mg/dl (whole numbers) and mmol/l readings.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// `"<value> <unit>"`
pub fn single_message(reading: &Reading) -> String {
    format!("{} {}", format_value(reading.value()), reading.unit())
}

/// `"<value> <unit>\n<sign><|delta|>/<minutes>m"`, comparing `next` against
/// the previously alerted reading.
pub fn change_message(previous: &Reading, next: &Reading) -> String {
    let elapsed = next.timestamp_millis() - previous.timestamp_millis();
    // Halves round up, also for negative spans.
    let minutes = (elapsed as f64 / 60_000.0 + 0.5).floor() as i64;

    let delta = next.value() - previous.value();
    let sign = if delta > 0.0 {
        '+'
    } else if delta < 0.0 {
        '-'
    } else {
        ' '
    };

    format!(
        "{} {}\n{}{}/{}m",
        format_value(next.value()),
        next.unit(),
        sign,
        format_value(delta.abs()),
        minutes
    )
}
