/*!
 * Argument value parsers
 */

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

/// Byte size such as `1024`, `-1`, `5kb`, `1Kib` or `10mib`
///
/// Decimal units (`kb`, `mb`, ...) are powers of 1000, binary units
/// (`kib`, `mib`, ...) powers of 1024. Units are case insensitive.
pub fn size(text: &str) -> Result<i64, String> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }

    let lower = text.to_ascii_lowercase();
    let split = lower
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("invalid size {:?}", text))?;
    let (digits, unit) = lower.split_at(split);
    let value: i64 = digits
        .parse()
        .map_err(|_| format!("invalid size {:?}", text))?;

    let multiplier: i64 = match unit {
        "b" => 1,
        "k" | "kb" => 1_000,
        "m" | "mb" => 1_000_000,
        "g" | "gb" => 1_000_000_000,
        "t" | "tb" => 1_000_000_000_000,
        "ki" | "kib" => 1 << 10,
        "mi" | "mib" => 1 << 20,
        "gi" | "gib" => 1 << 30,
        "ti" | "tib" => 1 << 40,
        _ => return Err(format!("unknown size unit {:?} in {:?}", unit, text)),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size {:?} is too large", text))
}

/// Duration such as `1s`, `500ms` or `2h 30m`
pub fn duration(text: &str) -> Result<Duration, String> {
    humantime::parse_duration(text.trim()).map_err(|e| e.to_string())
}

/// Time expression as Unix seconds
///
/// Accepts `0` (unset), `YYYY-MM-DD`, RFC 3339 timestamps and durations
/// relative to now such as `30d` or `12h`.
pub fn time(text: &str) -> Result<i64, String> {
    time_at(text, Utc::now())
}

fn time_at(text: &str, now: DateTime<Utc>) -> Result<i64, String> {
    let text = text.trim();
    if text == "0" {
        return Ok(0);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| format!("invalid date {:?}", text));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.timestamp());
    }

    let offset = humantime::parse_duration(text)
        .map_err(|_| format!("expected 0, a date, an RFC 3339 time or a duration: {:?}", text))?;
    let offset = i64::try_from(offset.as_secs()).map_err(|_| format!("{:?} is too far out", text))?;
    now.timestamp()
        .checked_add(offset)
        .ok_or_else(|| format!("{:?} is too far out", text))
}

/// Boolean flag value: `true`/`false`, `yes`/`no`, `1`/`0`
pub fn boolean(text: &str) -> Result<bool, String> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected true or false, got {:?}", other)),
    }
}
