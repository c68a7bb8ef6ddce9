/// `mm:ss`, minutes not capped at 59 (`75:00`).
#[must_use]
pub fn format_clock(total_secs: u32) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

/// Playback position for the audio scrubber label.
#[must_use]
pub fn format_millis(millis: u64) -> String {
    let secs = u32::try_from(millis / 1_000).unwrap_or(u32::MAX);
    format_clock(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_minutes_and_seconds() {
        assert_eq!(format_clock(1200), "20:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_millis(3_999), "00:03");
    }
}
