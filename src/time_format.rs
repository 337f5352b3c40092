use crate::Timer;

/// What an absent timer displays
pub const ZERO_DISPLAY: &str = "00:00:00";

/// Clock-face display of a timer as of `now_ms`.
///
/// Running timers include the time since their last start. Hours are not
/// wrapped at 24.
pub fn format_timer(timer: Option<&Timer>, now_ms: i64) -> String {
    match timer {
        Some(timer) => format_duration_ms(timer.total_elapsed(now_ms)),
        None => ZERO_DISPLAY.to_string(),
    }
}

/// Formats a millisecond count as zero-padded `HH:MM:SS`
pub fn format_duration_ms(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer(is_running: bool, elapsed: i64, start_time: i64) -> Timer {
        Timer {
            id: 1,
            name: "t".to_string(),
            is_running,
            start_time,
            elapsed,
        }
    }

    #[test]
    fn absent_timer_is_zero() {
        assert_eq!(format_timer(None, 123_456), "00:00:00");
    }

    #[test]
    fn stopped_timer_shows_elapsed() {
        let now = 1_700_000_000_000;
        assert_eq!(format_timer(Some(&timer(false, 3_661_000, 0)), now), "01:01:01");
    }

    #[test]
    fn running_timer_adds_active_time() {
        let now = 1_700_000_000_000;
        assert_eq!(
            format_timer(Some(&timer(true, 0, now - 5_000)), now),
            "00:00:05"
        );
    }

    #[test]
    fn future_start_is_clamped() {
        let now = 1_000_000;
        assert_eq!(
            format_timer(Some(&timer(true, 2_000, now + 60_000)), now),
            "00:00:02"
        );
    }

    #[test]
    fn hours_are_not_capped() {
        let ms = (27 * 3600 + 15 * 60 + 3) * 1000;
        assert_eq!(format_duration_ms(ms), "27:15:03");
    }

    #[test]
    fn partial_seconds_are_truncated() {
        assert_eq!(format_duration_ms(59_999), "00:00:59");
        assert_eq!(format_duration_ms(-10), "00:00:00");
    }
}
