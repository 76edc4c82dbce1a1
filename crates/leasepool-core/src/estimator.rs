//! Wait estimation — how long until `k` more resources come back.
//!
//! The answer is the k-th soonest deadline among all active leases.
//! Selection runs over a scratch copy of every deadline, so the result
//! does not depend on how the pool happens to store its leases.

use std::time::Duration;

use tokio::time::Instant;

/// Whole seconds until the `k`-th soonest deadline (1-based), rounded up.
///
/// Returns 0 when `k` is zero, there are no deadlines, or the deadline
/// has already passed. If `k` exceeds the number of deadlines the latest
/// one is used.
pub fn estimate_wait_secs(deadlines: &[Instant], k: usize, now: Instant) -> u64 {
    if k == 0 || deadlines.is_empty() {
        return 0;
    }

    let mut scratch = deadlines.to_vec();
    let idx = k.min(scratch.len()) - 1;
    let (_, kth, _) = scratch.select_nth_unstable(idx);

    ceil_secs(kth.saturating_duration_since(now))
}

/// Round a duration up to whole seconds.
pub fn ceil_secs(d: Duration) -> u64 {
    if d.subsec_nanos() > 0 {
        d.as_secs() + 1
    } else {
        d.as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(now: Instant, secs: u64) -> Instant {
        now + Duration::from_secs(secs)
    }

    #[test]
    fn picks_order_statistic_not_storage_order() {
        let now = Instant::now();
        // Storage order deliberately differs from deadline order.
        let deadlines = vec![at(now, 9), at(now, 3), at(now, 7), at(now, 5)];

        assert_eq!(estimate_wait_secs(&deadlines, 1, now), 3);
        assert_eq!(estimate_wait_secs(&deadlines, 2, now), 5);
        assert_eq!(estimate_wait_secs(&deadlines, 3, now), 7);
        assert_eq!(estimate_wait_secs(&deadlines, 4, now), 9);
    }

    #[test]
    fn three_and_seven() {
        let now = Instant::now();
        let deadlines = vec![at(now, 7), at(now, 3)];
        assert_eq!(estimate_wait_secs(&deadlines, 1, now), 3);
        assert_eq!(estimate_wait_secs(&deadlines, 2, now), 7);
    }

    #[test]
    fn past_deadline_clamps_to_zero() {
        let now = Instant::now();
        let later = now + Duration::from_secs(10);
        let deadlines = vec![at(now, 2)];
        assert_eq!(estimate_wait_secs(&deadlines, 1, later), 0);
    }

    #[test]
    fn partial_seconds_round_up() {
        let now = Instant::now();
        let deadlines = vec![now + Duration::from_millis(4_200)];
        assert_eq!(estimate_wait_secs(&deadlines, 1, now), 5);
    }

    #[test]
    fn k_beyond_len_uses_latest() {
        let now = Instant::now();
        let deadlines = vec![at(now, 1), at(now, 6)];
        assert_eq!(estimate_wait_secs(&deadlines, 5, now), 6);
    }

    #[test]
    fn empty_or_zero_k_is_zero() {
        let now = Instant::now();
        assert_eq!(estimate_wait_secs(&[], 1, now), 0);
        assert_eq!(estimate_wait_secs(&[at(now, 3)], 0, now), 0);
    }

    #[test]
    fn ceil_secs_exact_and_fractional() {
        assert_eq!(ceil_secs(Duration::from_secs(5)), 5);
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }
}
