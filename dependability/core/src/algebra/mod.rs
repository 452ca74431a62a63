//! Closed-form algebra for time-dependent probability functions
//!
//! - **expsum**: exponential sums `c0 + Σ ci·exp(-ri·t)` with ring operations
//!   and closed-form integration
//! - [`binomial`]: binomial coefficients as `f64` for k-of-n expansions

mod expsum;

pub use expsum::{ExpSum, ExpTerm, CONSTANT_TOLERANCE, RATE_TOLERANCE};

/// `C(n, k)` as a float, zero when `k > n`
pub fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    num_integer::binomial(u64::from(n), u64::from(k)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(3, 0), 1.0);
        assert_eq!(binomial(3, 2), 3.0);
        assert_eq!(binomial(10, 5), 252.0);
        assert_eq!(binomial(2, 3), 0.0);
    }
}
