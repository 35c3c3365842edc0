//! Local-time timestamp rendering.
//!
//! Patterns use `strftime` syntax as understood by `chrono`. A pattern that
//! `chrono` cannot parse never panics: the standard pattern is used instead.

use crate::constants::STANDARD_TIME_FORMAT;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

/// Check whether `pattern` is a well-formed strftime pattern
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Render `time` with `pattern`, falling back to the standard pattern
pub fn format(time: &DateTime<Local>, pattern: &str) -> String {
    let pattern = if is_valid_pattern(pattern) {
        pattern
    } else {
        tracing::warn!(
            target: crate::constants::DIAGNOSTICS_TARGET,
            "Invalid time format {:?}, using {:?}",
            pattern,
            STANDARD_TIME_FORMAT
        );
        STANDARD_TIME_FORMAT
    };
    time.format_with_items(StrftimeItems::new(pattern)).to_string()
}

/// Current local time rendered with `pattern`
pub fn now(pattern: &str) -> String {
    format(&Local::now(), pattern)
}

/// Current local time as `YYYY-MM-DD HH:MM:SS`
pub fn standard_now() -> String {
    now(STANDARD_TIME_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_standard_format() {
        let time = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(format(&time, STANDARD_TIME_FORMAT), "2025-03-07 09:05:02");
    }

    #[test]
    fn test_file_pattern() {
        let time = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(format(&time, "%Y%m%d"), "20250307");
    }

    #[test]
    fn test_invalid_pattern_falls_back() {
        assert!(!is_valid_pattern("%Q%"));
        let time = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 2).unwrap();
        assert_eq!(format(&time, "%Q%"), "2025-03-07 09:05:02");
    }

    #[test]
    fn test_standard_now_shape() {
        let stamp = standard_now();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }
}
