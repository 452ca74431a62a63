//! Exponential sums
//!
//! Every reliability, availability and maintainability function produced by
//! constant-rate components is a finite sum `c0 + Σ ci·exp(-ri·t)`. This
//! module provides that representation together with the ring operations,
//! numeric evaluation and the closed-form integral over [0, ∞).
//!
//! Arithmetic is carried out in `f64`. Rates that agree to a relative
//! `1e-12` are merged into a single term, and zero-rate terms are folded
//! into the constant, so the constant of a formula built from integer
//! combinations (inclusion-exclusion, binomial expansions) stays exact.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, Mul, Neg, Sub};

/// Relative tolerance under which two decay rates are considered equal
pub const RATE_TOLERANCE: f64 = 1e-12;

/// Constants smaller than this are treated as zero when integrating
pub const CONSTANT_TOLERANCE: f64 = 1e-12;

/// A single `coefficient · exp(-rate · t)` term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpTerm {
    pub coefficient: f64,
    pub rate: f64,
}

impl ExpTerm {
    pub fn new(coefficient: f64, rate: f64) -> Self {
        Self { coefficient, rate }
    }

    /// Value of the term at time `t`
    #[inline]
    pub fn eval(&self, t: f64) -> f64 {
        self.coefficient * (-self.rate * t).exp()
    }
}

/// Closed-form function of time `c0 + Σ ci·exp(-ri·t)`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpSum {
    constant: f64,
    terms: Vec<ExpTerm>,
}

impl ExpSum {
    /// The zero function
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant function 1
    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// A constant function
    pub fn constant(value: f64) -> Self {
        Self {
            constant: value,
            terms: Vec::new(),
        }
    }

    /// `coefficient · exp(-rate · t)`
    pub fn exp_decay(coefficient: f64, rate: f64) -> Self {
        Self::from_parts(0.0, vec![ExpTerm::new(coefficient, rate)])
    }

    /// Build from a constant and an arbitrary list of terms, merging equal rates
    pub fn from_parts(constant: f64, terms: Vec<ExpTerm>) -> Self {
        let mut sum = Self { constant, terms };
        sum.normalize();
        sum
    }

    /// The constant term `c0`
    pub fn constant_term(&self) -> f64 {
        self.constant
    }

    /// The exponential terms, ordered by increasing rate
    pub fn terms(&self) -> &[ExpTerm] {
        &self.terms
    }

    /// Number of exponential terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True when the function has no exponential term
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// True for the zero function
    pub fn is_zero(&self) -> bool {
        self.constant == 0.0 && self.terms.is_empty()
    }

    /// Evaluate at time `t`
    pub fn eval(&self, t: f64) -> f64 {
        self.constant + self.terms.iter().map(|term| term.eval(t)).sum::<f64>()
    }

    /// `∫₀^∞ f(t) dt`, or `None` when the integral diverges
    ///
    /// The integral exists only when the constant vanishes and every
    /// remaining term decays with a strictly positive rate.
    pub fn integral(&self) -> Option<f64> {
        if self.constant.abs() > CONSTANT_TOLERANCE {
            return None;
        }
        let mut total = 0.0;
        for term in &self.terms {
            if term.rate <= 0.0 {
                return None;
            }
            total += term.coefficient / term.rate;
        }
        Some(total)
    }

    /// `1 - f(t)`
    pub fn complement(&self) -> Self {
        Self::one() - self
    }

    /// Scale every coefficient (constant included)
    pub fn scale(&self, factor: f64) -> Self {
        let mut scaled = Self {
            constant: self.constant * factor,
            terms: self
                .terms
                .iter()
                .map(|term| ExpTerm::new(term.coefficient * factor, term.rate))
                .collect(),
        };
        scaled.normalize();
        scaled
    }

    /// `f(t)^exponent` by repeated squaring
    pub fn powi(&self, exponent: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut e = exponent;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Sort by rate, merge near-equal rates, fold zero rates into the
    /// constant and drop cancelled terms.
    fn normalize(&mut self) {
        self.terms
            .sort_by(|a, b| a.rate.partial_cmp(&b.rate).unwrap_or(Ordering::Equal));

        let mut merged: Vec<ExpTerm> = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            if term.rate == 0.0 {
                self.constant += term.coefficient;
                continue;
            }
            match merged.last_mut() {
                Some(last) if rates_match(last.rate, term.rate) => {
                    last.coefficient += term.coefficient;
                }
                _ => merged.push(term),
            }
        }
        merged.retain(|term| term.coefficient != 0.0);
        self.terms = merged;
    }
}

fn rates_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= RATE_TOLERANCE * a.abs().max(b.abs())
}

impl From<f64> for ExpSum {
    fn from(value: f64) -> Self {
        ExpSum::constant(value)
    }
}

impl Add<&ExpSum> for &ExpSum {
    type Output = ExpSum;

    fn add(self, rhs: &ExpSum) -> ExpSum {
        let mut terms = Vec::with_capacity(self.terms.len() + rhs.terms.len());
        terms.extend_from_slice(&self.terms);
        terms.extend_from_slice(&rhs.terms);
        ExpSum::from_parts(self.constant + rhs.constant, terms)
    }
}

impl Add for ExpSum {
    type Output = ExpSum;

    fn add(self, rhs: ExpSum) -> ExpSum {
        &self + &rhs
    }
}

impl Sub<&ExpSum> for &ExpSum {
    type Output = ExpSum;

    fn sub(self, rhs: &ExpSum) -> ExpSum {
        self + &(-rhs)
    }
}

impl Sub<&ExpSum> for ExpSum {
    type Output = ExpSum;

    fn sub(self, rhs: &ExpSum) -> ExpSum {
        &self - rhs
    }
}

impl Sub for ExpSum {
    type Output = ExpSum;

    fn sub(self, rhs: ExpSum) -> ExpSum {
        &self - &rhs
    }
}

impl Neg for &ExpSum {
    type Output = ExpSum;

    fn neg(self) -> ExpSum {
        self.scale(-1.0)
    }
}

impl Neg for ExpSum {
    type Output = ExpSum;

    fn neg(self) -> ExpSum {
        -&self
    }
}

impl Mul<&ExpSum> for &ExpSum {
    type Output = ExpSum;

    /// Distribute: `(a0 + Σ ai·e^-ri t)(b0 + Σ bj·e^-sj t)`
    fn mul(self, rhs: &ExpSum) -> ExpSum {
        let mut terms =
            Vec::with_capacity((self.terms.len() + 1) * (rhs.terms.len() + 1));

        if rhs.constant != 0.0 {
            for a in &self.terms {
                terms.push(ExpTerm::new(a.coefficient * rhs.constant, a.rate));
            }
        }
        if self.constant != 0.0 {
            for b in &rhs.terms {
                terms.push(ExpTerm::new(b.coefficient * self.constant, b.rate));
            }
        }
        for a in &self.terms {
            for b in &rhs.terms {
                terms.push(ExpTerm::new(a.coefficient * b.coefficient, a.rate + b.rate));
            }
        }

        ExpSum::from_parts(self.constant * rhs.constant, terms)
    }
}

impl Mul for ExpSum {
    type Output = ExpSum;

    fn mul(self, rhs: ExpSum) -> ExpSum {
        &self * &rhs
    }
}

impl Mul<f64> for &ExpSum {
    type Output = ExpSum;

    fn mul(self, rhs: f64) -> ExpSum {
        self.scale(rhs)
    }
}

impl Mul<f64> for ExpSum {
    type Output = ExpSum;

    fn mul(self, rhs: f64) -> ExpSum {
        self.scale(rhs)
    }
}

impl Sum for ExpSum {
    fn sum<I: Iterator<Item = ExpSum>>(iter: I) -> Self {
        let mut constant = 0.0;
        let mut terms = Vec::new();
        for item in iter {
            constant += item.constant;
            terms.extend(item.terms);
        }
        ExpSum::from_parts(constant, terms)
    }
}

impl<'a> Product<&'a ExpSum> for ExpSum {
    fn product<I: Iterator<Item = &'a ExpSum>>(iter: I) -> Self {
        iter.fold(ExpSum::one(), |acc, factor| &acc * factor)
    }
}

impl fmt::Display for ExpSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }

        let mut first = true;
        if self.constant != 0.0 {
            write!(f, "{}", self.constant)?;
            first = false;
        }
        for term in &self.terms {
            let magnitude = term.coefficient.abs();
            match (first, term.coefficient < 0.0) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            write!(f, "{}*exp(-{}*t)", magnitude, term.rate)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_eval_single_decay() {
        let r = ExpSum::exp_decay(1.0, 1e-3);
        assert!((r.eval(0.0) - 1.0).abs() < EPS);
        assert!((r.eval(1000.0) - (-1.0f64).exp()).abs() < EPS);
    }

    #[test]
    fn test_zero_rate_folds_into_constant() {
        let r = ExpSum::exp_decay(1.0, 0.0);
        assert!(r.is_constant());
        assert_eq!(r.constant_term(), 1.0);
        assert_eq!(r.integral(), None);
    }

    #[test]
    fn test_addition_merges_equal_rates() {
        let a = ExpSum::exp_decay(2.0, 0.5);
        let b = ExpSum::exp_decay(3.0, 0.5) + ExpSum::constant(1.0);
        let sum = &a + &b;

        assert_eq!(sum.len(), 1);
        assert_eq!(sum.terms()[0].coefficient, 5.0);
        assert_eq!(sum.constant_term(), 1.0);
    }

    #[test]
    fn test_cancellation_removes_term() {
        let a = ExpSum::exp_decay(1.0, 0.25);
        let diff = &a - &a;
        assert!(diff.is_zero());
    }

    #[test]
    fn test_multiplication_adds_rates() {
        let a = ExpSum::exp_decay(1.0, 1e-4);
        let b = ExpSum::exp_decay(1.0, 2e-5);
        let product = &a * &b;

        assert_eq!(product.len(), 1);
        assert!((product.terms()[0].rate - 1.2e-4).abs() < EPS);
        assert_eq!(product.constant_term(), 0.0);
    }

    #[test]
    fn test_multiplication_distributes_constants() {
        // (1 - e^-t)(1 - e^-2t) = 1 - e^-t - e^-2t + e^-3t
        let a = ExpSum::exp_decay(1.0, 1.0).complement();
        let b = ExpSum::exp_decay(1.0, 2.0).complement();
        let product = &a * &b;

        assert_eq!(product.constant_term(), 1.0);
        let coefficients: Vec<(f64, f64)> = product
            .terms()
            .iter()
            .map(|t| (t.rate, t.coefficient))
            .collect();
        assert_eq!(coefficients, vec![(1.0, -1.0), (2.0, -1.0), (3.0, 1.0)]);
    }

    #[test]
    fn test_integral_closed_form() {
        // ∫ 2e^{-2at} - e^{-3at} = 1/a - 1/(3a)
        let a = 1e-3;
        let f = ExpSum::exp_decay(2.0, 2.0 * a) - ExpSum::exp_decay(1.0, 3.0 * a);
        let integral = f.integral().unwrap();
        assert!((integral - 2000.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_integral_of_constant_diverges() {
        let f = ExpSum::constant(0.5) + ExpSum::exp_decay(0.5, 1.0);
        assert_eq!(f.integral(), None);
    }

    #[test]
    fn test_powi_matches_repeated_product() {
        let f = ExpSum::exp_decay(0.25, 0.1) + ExpSum::constant(0.75);
        let cubed = f.powi(3);
        let manual = &(&f * &f) * &f;

        for t in [0.0, 1.0, 10.0, 100.0] {
            assert!((cubed.eval(t) - manual.eval(t)).abs() < EPS);
        }
        assert_eq!(f.powi(0), ExpSum::one());
    }

    #[test]
    fn test_sum_and_product_iterators() {
        let parts = vec![ExpSum::exp_decay(1.0, 1.0), ExpSum::exp_decay(1.0, 2.0)];
        let total: ExpSum = parts.iter().cloned().sum();
        assert_eq!(total.len(), 2);

        let product: ExpSum = parts.iter().product();
        assert_eq!(product.len(), 1);
        assert_eq!(product.terms()[0].rate, 3.0);
    }

    #[test]
    fn test_display() {
        let f = ExpSum::constant(0.5) - ExpSum::exp_decay(0.5, 2.0);
        assert_eq!(f.to_string(), "0.5 - 0.5*exp(-2*t)");
        assert_eq!(ExpSum::zero().to_string(), "0");
    }

    #[test]
    fn test_serde_round_trip_preserves_terms() {
        let f = ExpSum::constant(0.25) + ExpSum::exp_decay(0.75, 0.01);
        let json = serde_json::to_string(&f).unwrap();
        let back: ExpSum = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
