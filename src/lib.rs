//! Incremental evaluation of past-time [temporal logic] formulas over live streams of timed
//! samples.
//!
//! A requirement like _the motor current has stayed below its limit for the last five seconds_
//! cannot wait for a complete execution trace: it has to be answered while the system is running.
//! This crate evaluates such requirements online. A formula is assembled once as an immutable
//! blueprint, instantiated into a stateful monitor, and then driven one sample at a time. Every
//! call returns the current [robustness] of the formula, a metric value that not only indicates
//! whether the requirement holds but also how far the system is from violating it. Boolean
//! metrics are supported as well, in which case the same operators collapse to ordinary
//! propositional logic.
//!
//! [robustness]: https://link.springer.com/chapter/10.1007/11940197_12
//! [temporal logic]: https://en.wikipedia.org/wiki/Temporal_logic
//!
//! # Formulas and monitors
//!
//! The two core abstractions are [`Formula`] and [`Monitor`]. A `Formula` is a reusable,
//! side-effect-free description of a property, built by composing expressions such as
//! [`Proposition`](crate::proposition::Proposition) or [`Predicate`](crate::predicate::Predicate)
//! with the combinators in [`operators`]. Formulas may share subformulas freely (through
//! references, [`Rc`], or [`Arc`]) because they hold no evaluation state.
//!
//! Calling [`Formula::monitor`] recursively instantiates a fresh tree of monitors, one for each
//! operator and expression in the formula. A `Monitor` owns its children and its private state
//! exclusively, so two monitors created from the same formula never interfere, even when the
//! formula shares subformulas internally.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fleance::operators::{And, Or};
//! use fleance::{atom, Formula, Monitor};
//!
//! let x = atom("x");
//! let y = atom("y");
//!
//! let phi = Or::new(And::new(&x, &y), &x);
//! let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&phi);
//!
//! let state = HashMap::from([("x", 1.0), ("y", -2.0)]);
//! let rho = monitor.advance(0.0, &state);  // Ok(1.0)
//! ```
//!
//! Samples must be delivered in strictly increasing time order. Times are logical values supplied
//! by the caller; the crate attaches no wall-clock meaning to them.
//!
//! # Driving a monitor from a trace
//!
//! When a recorded [`Trace`] is available, the [`evaluate`] function feeds every sample of the
//! trace through a fresh monitor and collects the robustness outputs into a new trace.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fleance::operators::Historically;
//! use fleance::{atom, evaluate, Trace};
//!
//! fn state(value: f64) -> HashMap<&'static str, f64> {
//!     HashMap::from([("x", value)])
//! }
//!
//! let trace = Trace::from([
//!     (0.0, state(4.0)),
//!     (1.0, state(2.0)),
//!     (2.0, state(3.0)),
//! ]);
//!
//! let phi = Historically::unbounded(atom("x"));
//! let rho: Trace<f64> = evaluate(&trace, phi).unwrap();  // [4.0, 2.0, 2.0]
//! ```

use std::borrow::Borrow;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

pub mod metrics;
pub mod operators;
pub mod predicate;
pub mod proposition;
pub mod trace;
pub mod window;

pub use crate::metrics::{Bottom, Join, Meet, Negation, Top};
pub use crate::predicate::Predicate;
pub use crate::proposition::{atom, Proposition, VariableSet};
pub use crate::trace::Trace;
pub use crate::window::{Lookback, MinWindow, WindowError};

/// A stateful evaluator that consumes one timed sample per call and produces a metric value.
///
/// Monitors are created from a [`Formula`] and advance synchronously: each call to
/// [`advance`](Monitor::advance) fully resolves the output for that sample before returning.
/// Child monitors are driven strictly inside their parent's call. A monitor is not safe for use
/// by more than one caller, but distinct monitors share no state.
///
/// Implementations must reject samples whose time is not strictly greater than the previous
/// accepted sample's time wherever they track time, and must treat every error as terminal for
/// the affected call: no retry, no partial result.
pub trait Monitor<State> {
    /// The type of the metric values produced per sample.
    type Metric;

    /// The type of the error produced if evaluation of a sample fails.
    type Error;

    /// Consume the sample `(time, state)` and return the formula's metric at `time`.
    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error>;
}

impl<State, T> Monitor<State> for Box<T>
where
    T: Monitor<State> + ?Sized,
{
    type Metric = T::Metric;
    type Error = T::Error;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        (**self).advance(time, state)
    }
}

/// An immutable blueprint of a property that can be instantiated into a [`Monitor`].
///
/// Formulas are built once and never mutated; combining formulas with operators produces new
/// formulas without touching the operands. Because a formula holds no runtime state, the same
/// value may appear under several parents, forming a directed acyclic graph. Instantiation with
/// [`monitor`](Formula::monitor) is always a recursive, deep construction of fresh monitors, so
/// shared subformulas never imply shared monitor state.
pub trait Formula<State> {
    /// The type of the metric values produced by this formula's monitors.
    type Metric;

    /// The type of the error produced if a monitor fails to evaluate a sample.
    type Error;

    /// The type of the monitor instantiated by this formula.
    type Monitor: Monitor<State, Metric = Self::Metric, Error = Self::Error>;

    /// Instantiate a fresh, independent monitor for this formula.
    fn monitor(&self) -> Self::Monitor;
}

impl<State, T> Formula<State> for &T
where
    T: Formula<State> + ?Sized,
{
    type Metric = T::Metric;
    type Error = T::Error;
    type Monitor = T::Monitor;

    fn monitor(&self) -> Self::Monitor {
        (**self).monitor()
    }
}

impl<State, T> Formula<State> for Box<T>
where
    T: Formula<State> + ?Sized,
{
    type Metric = T::Metric;
    type Error = T::Error;
    type Monitor = T::Monitor;

    fn monitor(&self) -> Self::Monitor {
        (**self).monitor()
    }
}

impl<State, T> Formula<State> for Rc<T>
where
    T: Formula<State> + ?Sized,
{
    type Metric = T::Metric;
    type Error = T::Error;
    type Monitor = T::Monitor;

    fn monitor(&self) -> Self::Monitor {
        (**self).monitor()
    }
}

impl<State, T> Formula<State> for Arc<T>
where
    T: Formula<State> + ?Sized,
{
    type Metric = T::Metric;
    type Error = T::Error;
    type Monitor = T::Monitor;

    fn monitor(&self) -> Self::Monitor {
        (**self).monitor()
    }
}

/// Error produced when a sample's time does not strictly advance past the previous one.
///
/// Samples delivered to a single monitor or window tracker must have strictly increasing times.
/// No reordering or buffering is attempted; the offending sample is rejected and the error
/// propagates to whoever drove the sample into the root monitor.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("time {current} does not strictly advance past previous time {previous}")]
pub struct NonMonotonicTime {
    /// The last time accepted before the offending sample.
    pub previous: f64,

    /// The time of the rejected sample.
    pub current: f64,
}

/// The error type for evaluating a trace of samples with [`evaluate`].
///
/// Wraps the monitor's error together with the time of the sample that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("error at time {time}: {error}")]
pub struct EvaluationError<E> {
    time: f64,
    error: E,
}

impl<E> EvaluationError<E> {
    fn at(time: f64, error: E) -> Self {
        Self { time, error }
    }

    /// Returns the time of the sample that produced the error.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns a reference to the monitor error.
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Consume the wrapper and return the monitor error.
    pub fn into_error(self) -> E {
        self.error
    }
}

/// Evaluate every sample of a trace with a fresh monitor instantiated from `formula`.
///
/// Samples are delivered in chronological order, which a [`Trace`] guarantees by construction.
/// The output trace associates each sample time with the formula's metric at that time. The
/// first failing sample aborts evaluation and is reported together with its time.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// use fleance::operators::Not;
/// use fleance::{atom, evaluate, Trace};
///
/// let trace = Trace::from([
///     (0.0, HashMap::from([("x", true)])),
///     (1.0, HashMap::from([("x", false)])),
/// ]);
///
/// let rho: Trace<bool> = evaluate(&trace, Not::new(atom("x"))).unwrap();
///
/// assert_eq!(rho.at_time(0.0), Some(&false));
/// assert_eq!(rho.at_time(1.0), Some(&true));
/// ```
pub fn evaluate<T, F, State>(trace: T, formula: F) -> Result<Trace<F::Metric>, EvaluationError<F::Error>>
where
    T: Borrow<Trace<State>>,
    F: Formula<State>,
{
    let mut monitor = formula.monitor();

    trace
        .borrow()
        .iter()
        .map(|(time, state)| {
            monitor
                .advance(time, state)
                .map(|metric| (time, metric))
                .map_err(|error| EvaluationError::at(time, error))
        })
        .collect()
}
