use chrono::{Datelike, Local, TimeZone, Timelike, Utc};
use serde_json::Value;

/// Largest value still interpreted as a millisecond epoch. Anything above is
/// assumed to already be in `YYYYMMDDHHMMSS` form.
pub const MAX_EPOCH_MS: i64 = 9_999_999_999_999;

/// Normalizes an `updateTs` payload value (JSON number or numeric string) to
/// the 14-digit `YYYYMMDDHHMMSS` form. Returns `None` when the value is not
/// integer-parseable or falls outside chrono's representable range.
pub fn normalize(value: &Value) -> Option<String> {
    let ts = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if ts > MAX_EPOCH_MS {
        return Some(ts.to_string());
    }
    from_epoch_ms(ts)
}

fn from_epoch_ms(ms: i64) -> Option<String> {
    let utc = Utc.timestamp_millis_opt(ms).single()?;
    // Seconds deliberately come from local time while every other field is
    // UTC. Embedders compare these strings against previously captured
    // values, so the mismatch stays.
    let local = Local.timestamp_millis_opt(ms).single()?;
    Some(format!(
        "{}{:02}{:02}{:02}{:02}{:02}",
        utc.year(),
        utc.month(),
        utc.day(),
        utc.hour(),
        utc.minute(),
        local.second()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Seconds are excluded from the UTC assertions below: that field reads
    // local time on purpose.
    fn utc_prefix(ms: i64) -> String {
        let utc = Utc.timestamp_millis_opt(ms).single().expect("in range");
        format!(
            "{}{:02}{:02}{:02}{:02}",
            utc.year(),
            utc.month(),
            utc.day(),
            utc.hour(),
            utc.minute()
        )
    }

    #[test]
    fn epoch_millis_becomes_fourteen_digits() {
        let out = normalize(&json!(1_700_000_000_000_i64)).expect("normalized");
        assert_eq!(out.len(), 14);
        assert!(out.starts_with(&utc_prefix(1_700_000_000_000)));
        assert!(out.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn epoch_zero_decomposes_to_1970() {
        let out = normalize(&json!(0)).expect("normalized");
        assert!(out.starts_with("197001010000"));
        assert_eq!(out.len(), 14);
    }

    #[test]
    fn string_epoch_is_accepted() {
        let out = normalize(&json!("1700000000000")).expect("normalized");
        assert!(out.starts_with(&utc_prefix(1_700_000_000_000)));
    }

    #[test]
    fn threshold_boundary_is_still_epoch() {
        let out = normalize(&json!(MAX_EPOCH_MS)).expect("normalized");
        assert!(out.starts_with(&utc_prefix(MAX_EPOCH_MS)));
    }

    #[test]
    fn fourteen_digit_input_passes_through() {
        let out = normalize(&json!(20240131235959_i64)).expect("normalized");
        assert_eq!(out, "20240131235959");
        let out = normalize(&json!("20240131235959")).expect("normalized");
        assert_eq!(out, "20240131235959");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize(&json!("yesterday")).is_none());
        assert!(normalize(&json!(null)).is_none());
        assert!(normalize(&json!({ "ts": 5 })).is_none());
    }
}
