//! Test helper utilities

use chrono::{DateTime, TimeZone, Utc};

/// 构造UTC时间，参数非法时直接panic
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .unwrap_or_else(|| panic!("invalid test timestamp {year}-{month}-{day} {hour}:{minute}:{second}"))
}

/// 解析RFC3339时间字符串
pub fn rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|e| panic!("invalid RFC3339 timestamp {value}: {e}"))
        .with_timezone(&Utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_and_rfc3339_agree() {
        assert_eq!(utc(2024, 1, 2, 9, 5, 0), rfc3339("2024-01-02T09:05:00Z"));
        assert_eq!(utc(2024, 1, 2, 9, 5, 0), rfc3339("2024-01-02T11:05:00+02:00"));
    }
}
