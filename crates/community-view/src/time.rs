use chrono::{DateTime, Datelike, Timelike, Utc};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Relative age of `ts` as seen at `now`, in the board's Korean phrasing.
///
/// Under a minute (or in the future) is "방금 전". A week or older falls back
/// to the absolute date.
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - ts).num_milliseconds();

    let minutes = diff / MINUTE_MS;
    let hours = diff / HOUR_MS;
    let days = diff / DAY_MS;

    if minutes < 1 {
        "방금 전".to_string()
    } else if minutes < 60 {
        format!("{minutes}분 전")
    } else if hours < 24 {
        format!("{hours}시간 전")
    } else if days < 7 {
        format!("{days}일 전")
    } else {
        format_date(ts)
    }
}

/// ko-KR short date: `2024. 3. 1.`
pub fn format_date(ts: DateTime<Utc>) -> String {
    format!("{}. {}. {}.", ts.year(), ts.month(), ts.day())
}

/// ko-KR clock time: `오후 3:04:05`
pub fn format_clock(ts: DateTime<Utc>) -> String {
    let (pm, hour) = ts.hour12();
    let meridiem = if pm { "오후" } else { "오전" };
    format!("{meridiem} {hour}:{:02}:{:02}", ts.minute(), ts.second())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn relative_boundaries() {
        let now = now();
        assert_eq!(format_relative(now - Duration::seconds(59), now), "방금 전");
        assert_eq!(format_relative(now - Duration::seconds(61), now), "1분 전");
        assert_eq!(format_relative(now - Duration::seconds(3700), now), "1시간 전");
        assert_eq!(format_relative(now - Duration::hours(23), now), "23시간 전");
        assert_eq!(format_relative(now - Duration::days(6), now), "6일 전");
        assert_eq!(format_relative(now - Duration::days(8), now), "2024. 6. 7.");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = now();
        assert_eq!(format_relative(now + Duration::minutes(5), now), "방금 전");
    }

    #[test]
    fn clock_uses_twelve_hour_with_meridiem() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 15, 4, 5).unwrap();
        assert_eq!(format_clock(ts), "오후 3:04:05");

        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 0, 30, 0).unwrap();
        assert_eq!(format_clock(ts), "오전 12:30:00");
    }
}
