//! Generalized time: the store's native timestamp encoding.
//!
//! Instants are written as `YYYYMMDDHHMMSS.mmmZ` in UTC. The form is fixed
//! width, so lexicographic order equals chronological order.

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

const FORMAT: &str = "%Y%m%d%H%M%S%.3f";

/// Encode an instant, truncating to milliseconds.
///
/// Fails for years that do not fit four digits.
pub fn encode_generalized_time(instant: DateTime<Utc>) -> StoreResult<String> {
    let year = instant.year();
    if !(0..=9999).contains(&year) {
        return Err(StoreError::InvalidTimestamp(format!(
            "year {} out of range",
            year
        )));
    }
    Ok(format!("{}Z", instant.format(FORMAT)))
}

/// Decode a value written by [`encode_generalized_time`].
pub fn decode_generalized_time(raw: &str) -> StoreResult<DateTime<Utc>> {
    let body = raw
        .strip_suffix('Z')
        .ok_or_else(|| StoreError::InvalidTimestamp(format!("missing UTC marker: {}", raw)))?;
    NaiveDateTime::parse_from_str(body, FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::InvalidTimestamp(format!("{}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};

    #[test]
    fn test_encode_known_instant() {
        let instant = Utc.with_ymd_and_hms(2017, 5, 31, 8, 4, 5).unwrap()
            + Duration::milliseconds(42);
        assert_eq!(
            encode_generalized_time(instant).unwrap(),
            "20170531080405.042Z"
        );
    }

    #[test]
    fn test_decode_inverts_encode_at_millisecond_precision() {
        let instant = Utc.with_ymd_and_hms(2030, 12, 1, 23, 59, 59).unwrap()
            + Duration::milliseconds(999);
        let raw = encode_generalized_time(instant).unwrap();
        assert_eq!(decode_generalized_time(&raw).unwrap(), instant);
    }

    #[test]
    fn test_lexicographic_order_is_chronological() {
        let a = Utc.with_ymd_and_hms(2026, 1, 9, 0, 0, 0).unwrap();
        let b = a + Duration::seconds(1);
        assert!(encode_generalized_time(a).unwrap() < encode_generalized_time(b).unwrap());
    }

    #[test]
    fn test_out_of_range_year_fails() {
        let far = NaiveDate::from_ymd_opt(10000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        assert!(matches!(
            encode_generalized_time(far),
            Err(StoreError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_generalized_time("20260101").is_err());
        assert!(decode_generalized_time("yesterdayZ").is_err());
    }
}
