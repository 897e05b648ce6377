// src/math.rs
use ethers_core::types::{U256, U512};

use crate::shared::errors::MathError;

/// Divisor for the acceptable relative price move (1% of the last price)
pub const PRICE_DEVIATION_DIVISOR: u64 = 100;

/// A reserve dropping below this percentage of its pre-trade value is skewed
pub const RESERVE_FLOOR_PCT: u64 = 95;

/// Divisor for the share of pool liquidity moved per correction
pub const REBALANCE_FRACTION_DIVISOR: u128 = 10;

/// Convert a pool's sqrtPriceX96 to a spot price: price = sqrt_price^2 / 2^192.
///
/// The squaring is done in 512 bits so no intermediate precision is lost;
/// inputs in the uint160 range used by concentrated-liquidity pools always
/// fit the result back into 256 bits.
pub fn price_from_sqrt_price_x96(sqrt_price_x96: U256) -> Result<U256, MathError> {
    let squared: U512 = sqrt_price_x96.full_mul(sqrt_price_x96);
    U256::try_from(squared >> 192).map_err(|_| MathError::PriceOverflow)
}

/// True if `pool_price` moved away from `last_price` by more than 1%
/// of `last_price` (integer floor division, exact)
pub fn price_deviation_exceeded(last_price: U256, pool_price: U256) -> bool {
    let tolerance = last_price / U256::from(PRICE_DEVIATION_DIVISOR);
    let diff = if pool_price > last_price {
        pool_price - last_price
    } else {
        last_price - pool_price
    };
    diff > tolerance
}

/// True if `post * 100 / pre < RESERVE_FLOOR_PCT`, computed without
/// overflow or rounding drift via a widening multiply
pub fn reserve_dropped_below_floor(post: u128, pre: u128) -> bool {
    U256::from(post) * U256::from(100u64) < U256::from(pre) * U256::from(RESERVE_FLOOR_PCT)
}

/// Liquidity to move when correcting a skewed pool (integer floor)
pub fn rebalance_amount(liquidity: u128) -> u128 {
    liquidity / REBALANCE_FRACTION_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x96(mantissa: u64) -> U256 {
        U256::from(mantissa) << 96
    }

    #[test]
    fn test_price_from_sqrt_price_x96() {
        // sqrt price of exactly 1.0 squares to a price of 1
        assert_eq!(price_from_sqrt_price_x96(x96(1)).unwrap(), U256::from(1u64));
        // sqrt price of 2.0 squares to 4
        assert_eq!(price_from_sqrt_price_x96(x96(2)).unwrap(), U256::from(4u64));
        assert_eq!(price_from_sqrt_price_x96(U256::zero()).unwrap(), U256::zero());
    }

    #[test]
    fn test_price_from_sqrt_price_keeps_full_precision() {
        // (3 * 2^96 / 2)^2 / 2^192 = 9/4, floored to 2
        let one_and_a_half = x96(3) / U256::from(2u64);
        assert_eq!(
            price_from_sqrt_price_x96(one_and_a_half).unwrap(),
            U256::from(2u64)
        );
    }

    #[test]
    fn test_price_overflow_is_reported() {
        assert_eq!(
            price_from_sqrt_price_x96(U256::MAX),
            Err(MathError::PriceOverflow)
        );
    }

    #[test]
    fn test_price_deviation_boundary() {
        let last = U256::from(1_000u64);
        // 1% of 1000 is 10: a move of exactly 10 is tolerated
        assert!(!price_deviation_exceeded(last, U256::from(1_010u64)));
        assert!(!price_deviation_exceeded(last, U256::from(990u64)));
        // one past the tolerance in either direction trips the check
        assert!(price_deviation_exceeded(last, U256::from(1_011u64)));
        assert!(price_deviation_exceeded(last, U256::from(989u64)));
    }

    #[test]
    fn test_reserve_floor_boundary() {
        // 940/1000 = 94% -> skewed
        assert!(reserve_dropped_below_floor(940, 1_000));
        // 950/1000 = 95% -> still acceptable
        assert!(!reserve_dropped_below_floor(950, 1_000));
        assert!(!reserve_dropped_below_floor(960, 1_000));
    }

    #[test]
    fn test_reserve_floor_huge_reserves_do_not_overflow() {
        assert!(reserve_dropped_below_floor(u128::MAX / 2, u128::MAX));
        assert!(!reserve_dropped_below_floor(u128::MAX, u128::MAX));
    }

    #[test]
    fn test_rebalance_amount() {
        assert_eq!(rebalance_amount(1_000), 100);
        assert_eq!(rebalance_amount(9), 0);
    }
}
