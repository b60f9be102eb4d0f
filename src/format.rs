/// Render a second count as `M:SS`. Minutes are neither padded nor capped.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Inverse of [`format_time`]. Accepts only `M:SS` with seconds below 60.
pub fn parse_time(text: &str) -> Option<u32> {
    let (min, sec) = text.split_once(':')?;

    if min.is_empty()
        || sec.len() != 2
        || !min.bytes().all(|b| b.is_ascii_digit())
        || !sec.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let min: u32 = min.parse().ok()?;
    let sec: u32 = sec.parse().ok()?;

    match sec {
        valid if valid < 60 => min.checked_mul(60)?.checked_add(valid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(90), "1:30");
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(3600), "60:00");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(59), "0:59");
    }

    #[test]
    fn test_format_time_no_minute_cap() {
        assert_eq!(format_time(100 * 60 + 5), "100:05");
    }

    #[test]
    fn test_format_time_shape() {
        for s in (0..=7200).step_by(7) {
            let text = format_time(s);
            let (min, sec) = text.split_once(':').unwrap();
            assert!(!min.is_empty() && min.bytes().all(|b| b.is_ascii_digit()));
            assert_eq!(sec.len(), 2);
            assert!(sec.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse_inverts_format() {
        for s in 0..=3 * 3600 {
            assert_eq!(parse_time(&format_time(s)), Some(s));
        }
    }

    #[test]
    fn test_parse_time_rejects_malformed() {
        assert_eq!(parse_time(""), None);
        assert_eq!(parse_time("1:3"), None);
        assert_eq!(parse_time(":30"), None);
        assert_eq!(parse_time("1:60"), None);
        assert_eq!(parse_time("1:30:00"), None);
        assert_eq!(parse_time("-1:30"), None);
        assert_eq!(parse_time("a:bc"), None);
    }
}
