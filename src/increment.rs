//! Increment policy: computes the minimum acceptable next bid.

use crate::auction::MinIncrementStrategy;

/// Minimum amount the next bid must meet or exceed.
///
/// With no current high bid the floor is the starting price; the increment
/// strategy only applies from the second bid onward. The percent step rounds
/// up to the next minor unit so the floor is never understated: the result is
/// the smallest integer `m` with `m >= high * (1 + bps/10_000)`. The math is
/// widened through `u128`, so amounts near `u64::MAX` do not overflow.
///
/// Total over validated inputs; a zero step is rejected at auction creation
/// and never reaches this function.
pub fn minimum_next_bid(
    current_high: Option<u64>,
    starting_price: u64,
    strategy: MinIncrementStrategy,
) -> u64 {
    let Some(high) = current_high else {
        return starting_price;
    };
    match strategy {
        MinIncrementStrategy::Percent(bps) => high.saturating_add(percent_step(high, bps)),
        MinIncrementStrategy::Fixed(step) => high.saturating_add(step),
    }
}

/// `ceil(amount * bps / 10_000)`.
fn percent_step(amount: u64, bps: u32) -> u64 {
    let raw = u128::from(amount) * u128::from(bps);
    let step = (raw + 9_999) / 10_000;
    u64::try_from(step).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bid_floor_is_starting_price() {
        let strategy = MinIncrementStrategy::Percent(500);
        assert_eq!(minimum_next_bid(None, 1000, strategy), 1000);
    }

    #[test]
    fn percent_floor_matches_ceiling_formula() {
        // 5% of 1000 is exactly 50.
        let strategy = MinIncrementStrategy::Percent(500);
        assert_eq!(minimum_next_bid(Some(1000), 1000, strategy), 1050);

        // 5% of 1001 is 50.05; the floor rounds up, never down.
        assert_eq!(minimum_next_bid(Some(1001), 1000, strategy), 1052);
    }

    #[test]
    fn percent_floor_is_smallest_satisfying_integer() {
        // For every (high, bps) pair: floor satisfies the inequality
        // (floor - high) * 10_000 >= high * bps, and floor - 1 does not.
        for high in [1u64, 3, 999, 1000, 1001, 123_456, 9_999_999] {
            for bps in [1u32, 7, 50, 500, 2_500, 10_000] {
                let floor = minimum_next_bid(Some(high), 1, MinIncrementStrategy::Percent(bps));
                let step = u128::from(floor - high) * 10_000;
                let target = u128::from(high) * u128::from(bps);
                assert!(step >= target, "floor understated for {high}@{bps}bps");
                assert!(
                    step - 10_000 < target,
                    "floor overstated for {high}@{bps}bps"
                );
            }
        }
    }

    #[test]
    fn fixed_floor_is_exact_sum() {
        let strategy = MinIncrementStrategy::Fixed(2500);
        assert_eq!(minimum_next_bid(Some(10_000), 1000, strategy), 12_500);
        assert_eq!(minimum_next_bid(Some(1), 1000, strategy), 2501);
    }

    #[test]
    fn wide_amounts_do_not_overflow() {
        let high = u64::MAX - 10;
        let floor = minimum_next_bid(Some(high), 1, MinIncrementStrategy::Percent(10_000));
        assert_eq!(floor, u64::MAX);

        let floor = minimum_next_bid(Some(high), 1, MinIncrementStrategy::Fixed(100));
        assert_eq!(floor, u64::MAX);
    }
}
