//! 日期时间序列化/反序列化工具
//!
//! - 序列化: `DateTime<Utc>` -> RFC3339 字符串
//! - 反序列化: RFC3339 字符串 或 Unix 时间戳 -> `DateTime<Utc>`
//! - [`parse_panel_timestamp`]: 各面板返回的时间格式（RFC3339、`YYYY-MM-DD HH:MM:SS`、Unix 时间戳字符串）

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// 序列化 Option<`DateTime`<Utc>> 为 Option<RFC3339 字符串>
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// 反序列化：支持 RFC3339 字符串或 Unix 时间戳
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OptionalTimestamp {
        String(String),
        I64(i64),
    }

    match Option::<OptionalTimestamp>::deserialize(deserializer)? {
        Some(OptionalTimestamp::String(s)) => parse_panel_timestamp(&s)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("Invalid timestamp: {s}"))),
        Some(OptionalTimestamp::I64(ts)) => parse_unix_timestamp(ts)
            .map(Some)
            .ok_or_else(|| Error::custom("Invalid Unix timestamp")),
        None => Ok(None),
    }
}

/// Parse the timestamp formats hosting panels emit.
///
/// Accepts RFC3339, `YYYY-MM-DD HH:MM:SS` (assumed UTC), `YYYY-MM-DD`, and
/// Unix timestamps in seconds or milliseconds. Returns `None` for anything
/// else, including empty strings and `0`.
pub fn parse_panel_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ts) = raw.parse::<i64>() {
        return parse_unix_timestamp(ts);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 解析 Unix 时间戳（自动判断秒/毫秒），`0` 视为未设置
fn parse_unix_timestamp(ts: i64) -> Option<DateTime<Utc>> {
    if ts <= 0 {
        None
    } else if ts > 100_000_000_000 {
        DateTime::from_timestamp_millis(ts)
    } else {
        DateTime::from_timestamp(ts, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339() {
        let dt = parse_panel_timestamp("2024-03-01T10:20:30Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:20:30+00:00");
    }

    #[test]
    fn parses_mysql_style() {
        let dt = parse_panel_timestamp("2024-03-01 10:20:30").unwrap();
        assert_eq!(dt.timestamp(), 1_709_288_430);
    }

    #[test]
    fn parses_date_only() {
        assert!(parse_panel_timestamp("2024-03-01").is_some());
    }

    #[test]
    fn parses_unix_seconds_and_millis() {
        let secs = parse_panel_timestamp("1709288430").unwrap();
        let millis = parse_panel_timestamp("1709288430000").unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn rejects_garbage_and_zero() {
        assert!(parse_panel_timestamp("").is_none());
        assert!(parse_panel_timestamp("0").is_none());
        assert!(parse_panel_timestamp("24 Jan 01 12:00").is_none());
    }
}
