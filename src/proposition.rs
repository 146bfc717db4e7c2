//! Atomic observation of a single named signal.
//!
//! A [`Proposition`] is the simplest expression of the monitoring algebra: it projects one named
//! variable out of each sample and returns its value unchanged as the metric. All higher-level
//! behavior — thresholds, windows, combinations — is layered on top by [`operators`]. The
//! convenience function [`atom`] is the usual entry point:
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fleance::{atom, Formula, Monitor};
//!
//! let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&atom("speed"));
//! let state = HashMap::from([("speed", 44.3)]);
//!
//! let rho = monitor.advance(0.0, &state);  // Ok(44.3)
//! ```
//!
//! Any type that implements the [`VariableSet`] trait can be observed, including `HashMap` and
//! `BTreeMap` keyed by string-like names. The value type of the set determines the metric type
//! of the whole formula, so a map of `bool` values produces a boolean monitor and a map of `f64`
//! values produces a real-valued one.
//!
//! [`operators`]: crate::operators

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use thiserror::Error;

use crate::{Formula, Monitor, NonMonotonicTime};

/// Trait representing a set of named variables.
pub trait VariableSet {
    /// The type of the values stored in the set.
    type Value: Clone;

    /// Return the value for a name in the set if it exists.
    fn value_for(&self, name: &str) -> Option<Self::Value>;
}

impl<K, V> VariableSet for HashMap<K, V>
where
    K: Borrow<str> + Eq + Hash,
    V: Clone,
{
    type Value = V;

    fn value_for(&self, name: &str) -> Option<Self::Value> {
        self.get(name).cloned()
    }
}

impl<K, V> VariableSet for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Clone,
{
    type Value = V;

    fn value_for(&self, name: &str) -> Option<Self::Value> {
        self.get(name).cloned()
    }
}

/// Expression that observes a single named variable in each sample.
///
/// See the [`proposition`](self) module documentation for more information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposition {
    name: String,
}

impl Proposition {
    /// Create a proposition observing the variable `name`.
    pub fn new<N>(name: N) -> Self
    where
        N: Into<String>,
    {
        Self { name: name.into() }
    }

    /// Return the name of the observed variable.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Create a [`Proposition`] observing the variable `name`.
///
/// This is the main entry point for formula construction.
///
/// # Example
///
/// ```rust
/// use fleance::operators::And;
/// use fleance::atom;
///
/// let phi = And::new(atom("x"), atom("y"));
/// ```
pub fn atom<N>(name: N) -> Proposition
where
    N: Into<String>,
{
    Proposition::new(name)
}

/// The error type produced when a [`PropositionMonitor`] rejects a sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropositionError {
    /// The observed variable is absent from the sample's variable set.
    #[error("variable \"{name}\" missing from sample at time {time}")]
    MissingVariable { name: String, time: f64 },

    /// The sample's time does not strictly advance past the previous sample's time.
    #[error(transparent)]
    Time(#[from] NonMonotonicTime),
}

/// Monitor instantiated from a [`Proposition`].
///
/// Remembers the time of the last accepted sample in order to reject non-monotonic streams.
#[derive(Debug, Clone)]
pub struct PropositionMonitor {
    name: String,
    last_time: Option<f64>,
}

impl<State> Formula<State> for Proposition
where
    State: VariableSet,
{
    type Metric = State::Value;
    type Error = PropositionError;
    type Monitor = PropositionMonitor;

    fn monitor(&self) -> Self::Monitor {
        PropositionMonitor {
            name: self.name.clone(),
            last_time: None,
        }
    }
}

impl<State> Monitor<State> for PropositionMonitor
where
    State: VariableSet,
{
    type Metric = State::Value;
    type Error = PropositionError;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        if let Some(previous) = self.last_time {
            if time <= previous {
                return Err(NonMonotonicTime { previous, current: time }.into());
            }
        }

        let value = state.value_for(&self.name).ok_or_else(|| PropositionError::MissingVariable {
            name: self.name.clone(),
            time,
        })?;

        self.last_time = Some(time);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{atom, PropositionError};
    use crate::{Formula, Monitor, NonMonotonicTime};

    #[test]
    fn observes_variable() -> Result<(), PropositionError> {
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&atom("x"));

        let rho = monitor.advance(0.0, &HashMap::from([("x", 1.5), ("y", 2.5)]))?;
        assert_eq!(rho, 1.5);

        let rho = monitor.advance(1.0, &HashMap::from([("x", -0.5), ("y", 0.0)]))?;
        assert_eq!(rho, -0.5);

        Ok(())
    }

    #[test]
    fn missing_variable() {
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&atom("z"));
        let result = monitor.advance(0.0, &HashMap::from([("x", 1.0)]));

        assert_eq!(
            result,
            Err(PropositionError::MissingVariable {
                name: "z".to_string(),
                time: 0.0,
            })
        );
    }

    #[test]
    fn rejects_non_monotonic_time() {
        let state = HashMap::from([("x", true)]);
        let mut monitor = Formula::<HashMap<&str, bool>>::monitor(&atom("x"));

        assert_eq!(monitor.advance(1.0, &state), Ok(true));
        assert_eq!(
            monitor.advance(1.0, &state),
            Err(PropositionError::Time(NonMonotonicTime {
                previous: 1.0,
                current: 1.0,
            }))
        );
        assert_eq!(
            monitor.advance(0.5, &state),
            Err(PropositionError::Time(NonMonotonicTime {
                previous: 1.0,
                current: 0.5,
            }))
        );
    }

    #[test]
    fn first_sample_accepts_any_time() {
        let state = HashMap::from([("x", 0.0)]);
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&atom("x"));

        assert_eq!(monitor.advance(-10.0, &state), Ok(0.0));
    }

    #[test]
    fn rejected_sample_does_not_update_time() {
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&atom("x"));

        assert_eq!(monitor.advance(0.0, &HashMap::from([("x", 1.0)])), Ok(1.0));
        assert!(monitor.advance(1.0, &HashMap::<&str, f64>::new()).is_err());

        // The failed sample at time 1.0 must not count as the previous time.
        assert_eq!(monitor.advance(1.0, &HashMap::from([("x", 2.0)])), Ok(2.0));
    }
}
