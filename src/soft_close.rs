//! Soft-close extension: pushes the end time out when a bid lands near it.

use chrono::{DateTime, Duration, Utc};

/// End time after applying the soft-close rule to a bid accepted at `now`.
///
/// If the bid lands within `window_secs` of `end_at`, the auction runs until
/// `now + extension_secs`; otherwise `end_at` is returned unchanged. The
/// result is clamped to never precede the current `end_at`, so the end time
/// is monotonic, and reapplying with the same `now` yields the same instant.
///
/// A zero window never triggers: an auction that is still active has
/// `end_at - now > 0`. There is no cap on how often an auction extends.
pub fn extended_end_at(
    end_at: DateTime<Utc>,
    now: DateTime<Utc>,
    window_secs: u64,
    extension_secs: u64,
) -> DateTime<Utc> {
    let window = Duration::seconds(window_secs as i64);
    if end_at - now > window {
        return end_at;
    }
    let pushed = now + Duration::seconds(extension_secs as i64);
    pushed.max(end_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn inside_window_extends_from_now() {
        let end = t0();
        let now = end - Duration::seconds(60);
        // 60s remaining, 120s window: new end is now + 120s = end + 60s.
        assert_eq!(extended_end_at(end, now, 120, 120), end + Duration::seconds(60));
    }

    #[test]
    fn outside_window_leaves_end_unchanged() {
        let end = t0();
        let now = end - Duration::seconds(300);
        assert_eq!(extended_end_at(end, now, 120, 120), end);
    }

    #[test]
    fn idempotent_for_a_fixed_now() {
        let end = t0();
        let now = end - Duration::seconds(30);
        let once = extended_end_at(end, now, 120, 120);
        let twice = extended_end_at(once, now, 120, 120);
        assert_eq!(once, twice);
    }

    #[test]
    fn never_shortens_the_auction() {
        let end = t0();
        // 100s remaining is inside the window, but a 60s extension would land
        // before the current end. The end time must not move backward.
        let now = end - Duration::seconds(100);
        assert_eq!(extended_end_at(end, now, 120, 60), end);
    }

    #[test]
    fn zero_window_disables_soft_close() {
        let end = t0();
        let now = end - Duration::seconds(1);
        assert_eq!(extended_end_at(end, now, 0, 120), end);
    }

    #[test]
    fn boundary_remaining_equal_to_window_triggers() {
        let end = t0();
        let now = end - Duration::seconds(120);
        assert_eq!(
            extended_end_at(end, now, 120, 180),
            end + Duration::seconds(60)
        );
        // One second more remaining and the window no longer applies.
        let now = end - Duration::seconds(121);
        assert_eq!(extended_end_at(end, now, 120, 180), end);
    }
}
