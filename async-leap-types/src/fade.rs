// LEAP for Rust
// SPDX-License-Identifier: MPL-2.0

//! Fade time encoding.

use std::time::Duration;

/// Encode a fade duration as the `HH:MM:SS` string the command processor
/// expects. Sub-second precision is truncated.
pub fn fade_time_string(fade_time: Duration) -> String {
    let total = fade_time.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_zero_padded_fields() {
        assert_eq!(fade_time_string(Duration::from_secs(4)), "00:00:04");
        assert_eq!(fade_time_string(Duration::from_secs(3661)), "01:01:01");
        assert_eq!(fade_time_string(Duration::from_secs(0)), "00:00:00");
        assert_eq!(fade_time_string(Duration::from_secs(7325)), "02:02:05");
    }

    #[test]
    fn truncates_to_whole_seconds() {
        assert_eq!(fade_time_string(Duration::from_millis(2900)), "00:00:02");
    }

    #[test]
    fn hours_can_exceed_two_digits() {
        assert_eq!(fade_time_string(Duration::from_secs(360_000)), "100:00:00");
    }
}
