/// Render milliseconds as `m:ss`, or `h:mm:ss` from one hour up.
pub fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;

    if seconds >= 3600 {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        return format!("{}:{:02}:{:02}", hours, minutes, seconds % 60);
    }

    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(999), "0:00");
        assert_eq!(format_time(61_000), "1:01");
        assert_eq!(format_time(599_999), "9:59");
        assert_eq!(format_time(3_600_000), "1:00:00");
        assert_eq!(format_time(3_725_000), "1:02:05");
    }
}
