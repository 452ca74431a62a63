//! k-out-of-n voters over identical replicas
//!
//! A voter M-out-of-N works when at least M of its N replicas work. Its own
//! component (rates default to zero) multiplies the quorum probability, so a
//! voter can also model a voting unit that fails on its own.

use super::{Component, Dependability, Element};
use crate::algebra::{binomial, ExpSum};
use crate::error::{DependabilityError, DependabilityResult};

/// An M-out-of-N redundancy element
#[derive(Debug, Clone)]
pub struct Voter {
    own: Component,
    inner: Box<Element>,
    m: u32,
    n: u32,
}

impl Voter {
    /// Create a voter with no failure mode of its own
    ///
    /// The voter is named `"{m}-out-of-{n} {replica}"`.
    pub fn new(replica: impl Into<Element>, m: u32, n: u32) -> DependabilityResult<Self> {
        let replica = replica.into();
        let own = Component::new(format!("{}-out-of-{} {}", m, n, replica.name()), 0.0, 0.0)?;
        Self::with_own(own, replica, m, n)
    }

    /// Create a voter whose own name and rates come from `own`
    pub fn with_own(
        own: Component,
        replica: impl Into<Element>,
        m: u32,
        n: u32,
    ) -> DependabilityResult<Self> {
        if m == 0 || m > n {
            return Err(DependabilityError::InvalidArgument(format!(
                "voter {} requires 1 <= M <= N, got M = {}, N = {}",
                own.name(),
                m,
                n
            )));
        }

        Ok(Self {
            own,
            inner: Box::new(replica.into()),
            m,
            n,
        })
    }

    /// The voter's own component; mutate its rates through this handle
    pub fn own(&self) -> &Component {
        &self.own
    }

    /// The replicated element
    pub fn replica(&self) -> &Element {
        &self.inner
    }

    /// Minimal number of working replicas
    pub fn m(&self) -> u32 {
        self.m
    }

    /// Number of replicas
    pub fn n(&self) -> u32 {
        self.n
    }

    /// `Σ_{k=M}^{N} C(N,k)·f^k·(1-f)^(N-k)`
    fn quorum(&self, f: &ExpSum) -> ExpSum {
        let g = f.complement();

        let mut f_pow = Vec::with_capacity(self.n as usize + 1);
        let mut g_pow = Vec::with_capacity(self.n as usize + 1);
        f_pow.push(ExpSum::one());
        g_pow.push(ExpSum::one());
        for i in 1..=self.n as usize {
            f_pow.push(&f_pow[i - 1] * f);
            g_pow.push(&g_pow[i - 1] * &g);
        }

        (self.m..=self.n)
            .map(|k| {
                let product = &f_pow[k as usize] * &g_pow[(self.n - k) as usize];
                product.scale(binomial(self.n, k))
            })
            .sum()
    }
}

impl Dependability for Voter {
    fn name(&self) -> &str {
        self.own.name()
    }

    fn reliability(&self) -> ExpSum {
        &self.own.reliability() * &self.quorum(&self.inner.reliability())
    }

    fn availability(&self) -> ExpSum {
        &self.own.availability() * &self.quorum(&self.inner.availability())
    }

    /// Without a repair rate of its own the voter adds no repair delay
    fn maintainability(&self) -> ExpSum {
        let own = if self.own.mu() == 0.0 {
            ExpSum::one()
        } else {
            self.own.maintainability()
        };
        &own * &self.quorum(&self.inner.maintainability())
    }
}
