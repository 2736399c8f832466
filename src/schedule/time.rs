//! Minute-of-day arithmetic on a 24-hour circle, plus "HH:MM" parsing and formatting

use chrono::{NaiveTime, Timelike};

/// Minutes since midnight. Valid values are `0..MINUTES_PER_DAY`.
pub type Minute = i32;

pub const MINUTES_PER_DAY: Minute = 24 * 60;

/// Wrap any minute offset into `[0, 1440)`.
pub fn normalize(minute: Minute) -> Minute {
    minute.rem_euclid(MINUTES_PER_DAY)
}

/// Length of the interval, wrapping through midnight when `end < start`.
/// A same-instant interval has duration 0.
pub fn duration(start: Minute, end: Minute) -> Minute {
    if end >= start {
        end - start
    } else {
        end - start + MINUTES_PER_DAY
    }
}

pub fn crosses_midnight(start: Minute, end: Minute) -> bool {
    end < start
}

/// Whether `instant` falls inside `[start, end]`, both ends inclusive.
pub fn contains(start: Minute, end: Minute, instant: Minute) -> bool {
    if start == end {
        instant == start
    } else if crosses_midnight(start, end) {
        instant >= start || instant <= end
    } else {
        start <= instant && instant <= end
    }
}

pub fn from_naive_time(time: NaiveTime) -> Minute {
    (time.hour() * 60 + time.minute()) as Minute
}

/// Format a minute-of-day as "HH:MM"
pub fn format_clock(minute: Minute) -> String {
    let minute = normalize(minute);
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Format a minute-of-day as "2:30pm"
pub fn format_clock_12h(minute: Minute) -> String {
    let minute = normalize(minute);
    let (hour, min) = (minute / 60, minute % 60);
    let (h12, ampm) = match hour {
        0 => (12, "am"),
        1..=11 => (hour, "am"),
        12 => (12, "pm"),
        _ => (hour - 12, "pm"),
    };
    format!("{}:{:02}{}", h12, min, ampm)
}

/// Parse a user-entered time ("9:00am", "14:30", "2pm", "0730") into a minute-of-day
pub fn parse_clock(input: &str) -> Option<Minute> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let (time_part, meridiem) = if let Some(rest) = input.strip_suffix("pm") {
        (rest, Some(true))
    } else if let Some(rest) = input.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = input.strip_suffix('p') {
        (rest, Some(true))
    } else if let Some(rest) = input.strip_suffix('a') {
        (rest, Some(false))
    } else {
        (input.as_str(), None) // 24-hour format assumed
    };

    let time_part = time_part.trim();

    let (hour, minute) = if let Some((h, m)) = time_part.split_once(':') {
        (h.trim().parse::<i32>().ok()?, m.trim().parse::<i32>().ok()?)
    } else if time_part.len() == 4
        && meridiem.is_none()
        && time_part.bytes().all(|b| b.is_ascii_digit())
    {
        // "0730"
        (time_part[..2].parse::<i32>().ok()?, time_part[2..].parse::<i32>().ok()?)
    } else {
        (time_part.parse::<i32>().ok()?, 0)
    };

    let hour_24 = match meridiem {
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0, // 12am = midnight
        _ => hour,
    };

    if !(0..24).contains(&hour_24) || !(0..60).contains(&minute) {
        return None;
    }

    Some(hour_24 * 60 + minute)
}

/// Move `minute` by `steps` increments of `step` minutes, snapping to the step grid
/// and wrapping around midnight.
pub fn step_by(minute: Minute, steps: i32, step: Minute) -> Minute {
    let snapped = normalize(minute) / step * step;
    normalize(snapped + steps * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_wraps_into_day_and_is_idempotent() {
        for m in [-3000, -1441, -1440, -1, 0, 1, 719, 1439, 1440, 1441, 2880, 100_000] {
            let n = normalize(m);
            assert!((0..MINUTES_PER_DAY).contains(&n), "{m} -> {n}");
            assert_eq!(normalize(n), n);
        }
        assert_eq!(normalize(-1), 1439);
        assert_eq!(normalize(1500), 60);
    }

    #[test]
    fn duration_stays_within_a_day() {
        for s in (0..MINUTES_PER_DAY).step_by(37) {
            for e in (0..MINUTES_PER_DAY).step_by(41) {
                let d = duration(s, e);
                assert!((0..MINUTES_PER_DAY).contains(&d));
            }
            assert_eq!(duration(s, s), 0);
        }
        assert_eq!(duration(480, 600), 120);
        assert_eq!(duration(1380, 60), 120);
    }

    #[test]
    fn contains_handles_crossing_and_point_entries() {
        assert!(crosses_midnight(1380, 60));
        assert!(!crosses_midnight(60, 1380));

        assert!(contains(480, 600, 480));
        assert!(contains(480, 600, 600));
        assert!(!contains(480, 600, 601));

        assert!(contains(1380, 60, 1410));
        assert!(contains(1380, 60, 30));
        assert!(!contains(1380, 60, 61));
        assert!(!contains(1380, 60, 1379));

        assert!(contains(300, 300, 300));
        assert!(!contains(300, 300, 301));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1439), "23:59");
        assert_eq!(format_clock(1440 + 65), "01:05");
        assert_eq!(format_clock_12h(0), "12:00am");
        assert_eq!(format_clock_12h(12 * 60 + 5), "12:05pm");
        assert_eq!(format_clock_12h(14 * 60 + 30), "2:30pm");
    }

    #[test]
    fn parses_common_time_inputs() {
        assert_eq!(parse_clock("08:00"), Some(480));
        assert_eq!(parse_clock(" 14:30 "), Some(870));
        assert_eq!(parse_clock("2pm"), Some(840));
        assert_eq!(parse_clock("9:15am"), Some(555));
        assert_eq!(parse_clock("12am"), Some(0));
        assert_eq!(parse_clock("12:30p"), Some(750));
        assert_eq!(parse_clock("0730"), Some(450));
        assert_eq!(parse_clock("23"), Some(1380));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("10:60"), None);
        assert_eq!(parse_clock("13pm"), None);
        assert_eq!(parse_clock(""), None);
        assert_eq!(parse_clock("noon"), None);
    }

    #[test]
    fn stepping_snaps_to_half_hours_and_wraps() {
        assert_eq!(step_by(480, 1, 30), 510);
        assert_eq!(step_by(495, 0, 30), 480);
        assert_eq!(step_by(1410, 1, 30), 0);
        assert_eq!(step_by(0, -1, 30), 1410);
    }

    #[test]
    fn naive_time_conversion() {
        let t = NaiveTime::from_hms_opt(23, 30, 59).unwrap();
        assert_eq!(from_naive_time(t), 1410);
    }
}
