//! `[%clk ...]` clock annotations embedded in PGN comments.

const CLOCK_TAG: &str = "[%clk";

/// Extracts the remaining clock time, in seconds, from a PGN comment.
///
/// Accepts `H:MM:SS`, `H:MM:SS.f` and `MM:SS` values, e.g.
/// `{ [%clk 0:02:59.9] }` yields `179.9`. Returns `None` if the comment has
/// no clock command or its value cannot be read.
pub fn parse_clock_comment(comment: &str) -> Option<f64> {
    let start = comment.find(CLOCK_TAG)? + CLOCK_TAG.len();
    let rest = &comment[start..];
    let end = rest.find(']')?;
    parse_clock_value(rest[..end].trim())
}

/// Parses a clock value such as `1:30:43` or `0:00:07.5` into seconds.
pub fn parse_clock_value(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?, *s),
        [m, s] => (0, m.parse::<u32>().ok()?, *s),
        _ => return None,
    };

    let seconds: f64 = seconds.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }

    Some(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lichess_comment() {
        assert_eq!(
            parse_clock_comment(" [%eval 0.25] [%clk 1:30:43] "),
            Some(5443.0)
        );
    }

    #[test]
    fn test_parse_chess_com_comment_with_tenths() {
        let seconds = parse_clock_comment("[%clk 0:02:59.9]").unwrap();
        assert!((seconds - 179.9).abs() < 1e-9);
    }

    #[test]
    fn test_parse_minutes_seconds_form() {
        assert_eq!(parse_clock_value("04:05"), Some(245.0));
    }

    #[test]
    fn test_comment_without_clock() {
        assert_eq!(parse_clock_comment("best by test"), None);
        assert_eq!(parse_clock_comment("[%eval 0.3]"), None);
    }

    #[test]
    fn test_unterminated_clock_command() {
        assert_eq!(parse_clock_comment("[%clk 0:01:00"), None);
    }

    #[test]
    fn test_malformed_clock_value() {
        assert_eq!(parse_clock_value("abc"), None);
        assert_eq!(parse_clock_value("1:2:3:4"), None);
        assert_eq!(parse_clock_value("0:00:-1"), None);
    }
}
