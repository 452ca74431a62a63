//! Leaf components with constant failure and repair rates
//!
//! A [`Component`] is a cheap, cloneable handle: every clone refers to the
//! same rates. Graphs that use a component register themselves as
//! [`Observer`]s so that any rate mutation clears their cached formulas.

use super::Dependability;
use crate::algebra::ExpSum;
use crate::error::{check_rate, DependabilityError, DependabilityResult};
use log::debug;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Something that caches values derived from component rates
pub trait Observer: Send + Sync {
    /// Drop every cached value
    fn invalidate(&self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rates {
    lambda: f64,
    mu: f64,
    initially_available: bool,
}

struct ComponentInner {
    name: String,
    rates: RwLock<Rates>,
    observers: RwLock<Vec<Weak<dyn Observer>>>,
}

/// A component with constant failure rate λ and repair rate μ
#[derive(Clone)]
pub struct Component {
    inner: Arc<ComponentInner>,
}

impl Component {
    /// Create a component, initially available
    ///
    /// Fails with `InvalidRate` if either rate is negative or not finite.
    pub fn new(name: impl Into<String>, lambda: f64, mu: f64) -> DependabilityResult<Self> {
        let name = name.into();
        check_rate(&name, lambda)?;
        check_rate(&name, mu)?;

        Ok(Self {
            inner: Arc::new(ComponentInner {
                name,
                rates: RwLock::new(Rates {
                    lambda,
                    mu,
                    initially_available: true,
                }),
                observers: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Create a non-repairable component (μ = 0)
    pub fn non_repairable(name: impl Into<String>, lambda: f64) -> DependabilityResult<Self> {
        Self::new(name, lambda, 0.0)
    }

    /// Builder: mark the component as down at t = 0
    pub fn initially_unavailable(self) -> Self {
        self.set_initially_available(false);
        self
    }

    /// Unique name of the component
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Failure rate λ
    pub fn lambda(&self) -> f64 {
        self.read_rates().lambda
    }

    /// Repair rate μ
    pub fn mu(&self) -> f64 {
        self.read_rates().mu
    }

    /// Whether the component is up at t = 0
    pub fn initially_available(&self) -> bool {
        self.read_rates().initially_available
    }

    /// Change λ and invalidate every observing graph
    pub fn set_lambda(&self, lambda: f64) -> DependabilityResult<()> {
        check_rate(self.name(), lambda)?;
        self.write_rates(|rates| rates.lambda = lambda);
        self.notify();
        Ok(())
    }

    /// Change μ and invalidate every observing graph
    pub fn set_mu(&self, mu: f64) -> DependabilityResult<()> {
        check_rate(self.name(), mu)?;
        self.write_rates(|rates| rates.mu = mu);
        self.notify();
        Ok(())
    }

    /// Change the initial state and invalidate every observing graph
    pub fn set_initially_available(&self, available: bool) {
        self.write_rates(|rates| rates.initially_available = available);
        self.notify();
    }

    /// Whether two handles refer to the same component
    pub fn same(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.inner
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub(crate) fn attach(&self, observer: &Weak<dyn Observer>) {
        let mut observers = self
            .inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|weak| weak.strong_count() > 0);
        if !observers.iter().any(|weak| Weak::ptr_eq(weak, observer)) {
            observers.push(observer.clone());
        }
    }

    pub(crate) fn detach(&self, observer: &Weak<dyn Observer>) {
        self.inner
            .observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|weak| weak.strong_count() > 0 && !Weak::ptr_eq(weak, observer));
    }

    fn notify(&self) {
        // Upgrade under the lock, invalidate outside it.
        let live: Vec<Arc<dyn Observer>> = {
            let mut observers = self
                .inner
                .observers
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            observers.retain(|weak| weak.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        debug!(
            "component {} changed, invalidating {} observer(s)",
            self.name(),
            live.len()
        );
        for observer in live {
            observer.invalidate();
        }
    }

    fn read_rates(&self) -> Rates {
        *self.inner.rates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rates(&self, update: impl FnOnce(&mut Rates)) {
        let mut rates = self.inner.rates.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut rates);
    }
}

impl Dependability for Component {
    fn name(&self) -> &str {
        Component::name(self)
    }

    /// `exp(-λt)`
    fn reliability(&self) -> ExpSum {
        ExpSum::exp_decay(1.0, self.lambda())
    }

    /// `μ/(λ+μ) + b·exp(-(λ+μ)t)` with `b = λ/(λ+μ)` when the component
    /// starts up and `b = -μ/(λ+μ)` when it starts down
    fn availability(&self) -> ExpSum {
        let Rates {
            lambda,
            mu,
            initially_available,
        } = self.read_rates();

        // Never fails: permanently available.
        if lambda == 0.0 && mu == 0.0 {
            return ExpSum::one();
        }

        let total = lambda + mu;
        let steady = mu / total;
        let transient = if initially_available {
            lambda / total
        } else {
            -mu / total
        };
        ExpSum::constant(steady) + ExpSum::exp_decay(transient, total)
    }

    /// `1 - exp(-μt)`
    fn maintainability(&self) -> ExpSum {
        ExpSum::exp_decay(1.0, self.mu()).complement()
    }

    /// `1/λ`
    fn mttf(&self) -> DependabilityResult<f64> {
        let lambda = self.lambda();
        if lambda == 0.0 {
            return Err(DependabilityError::divergent("mttf"));
        }
        Ok(1.0 / lambda)
    }

    /// `1/μ`
    fn mttr(&self) -> DependabilityResult<f64> {
        let mu = self.mu();
        if mu == 0.0 {
            return Err(DependabilityError::divergent("mttr"));
        }
        Ok(1.0 / mu)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rates = self.read_rates();
        f.debug_struct("Component")
            .field("name", &self.inner.name)
            .field("lambda", &rates.lambda)
            .field("mu", &rates.mu)
            .field("initially_available", &rates.initially_available)
            .finish()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
