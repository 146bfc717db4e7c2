//! Combinatorial operators for constructing formulas.
//!
//! In temporal logic formulas, much like arithmetic formulas, operators modify the metric values
//! of their inputs to produce a new metric value. None of the operators defined in this module
//! observe system states themselves. They delegate that observation to their operands and work
//! on the metric values produced as output. As a result, a formula cannot consist of only
//! operators but must also contain an expression such as a
//! [`Proposition`](crate::proposition::Proposition) or a
//! [`Predicate`](crate::predicate::Predicate).
//!
//! In the following sections, we will briefly cover the different types of operators. More
//! information about each operator can be found on its individual documentation page.
//!
//! # First Order Operators
//!
//! Since temporal logics extend first-order logics, temporal logic formulas inherit all the
//! first-order operators, which are:
//!
//!   - [`Not`]
//!   - [`And`]
//!   - [`Or`]
//!   - [`Implies`]
//!
//! Each of these operators is time-invariant, meaning that it does not depend on any other
//! samples than the current one. Operators can be _unary_, meaning they take **one** operand, or
//! _binary_, meaning they take **two** operands.
//!
//! # Temporal Operators
//!
//! Temporal operators are not time-invariant: their output at a given time depends on samples
//! observed at other times. Because monitors process a live stream, only _past_ samples are
//! available, so all temporal operators in this module look backwards. For a visual
//! representation of this, consider the following stream:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! M1 M2 M3 M4 M5 M6
//! ```
//!
//! When the sample at time `T5` arrives, a past-time operator considers the interval containing
//! all the times already observed, like so:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! M1 M2 M3 M4 M5 M6
//! |-----------|
//! ```
//!
//! Past-time operators also support an optional lookback window, which limits the interval of
//! past times that the operator considers. For the same operator with a [`Lookback`] of
//! `(0, 2)`, the evaluation at `T5` considers only the samples whose times fall in
//! `[T5 - 2, T5]`:
//!
//! ```text
//! T1 T2 T3 T4 T5 T6
//! M1 M2 M3 M4 M5 M6
//!       |-----|
//! ```
//!
//! [`Historically`] requires that its subformula has held at every past time in the interval,
//! and [`Once`] requires that its subformula held at some past time in the interval. The two are
//! duals: `Once(phi)` is exactly `Not(Historically(Not(phi)))`. [`Since`] names the binary
//! past-time operator relating two subformulas, but its evaluation is not provided by this
//! crate.
//!
//! # Examples
//!
//! Creating a first-order logic operator is straight-forward:
//!
//! ```rust
//! use fleance::atom;
//! use fleance::operators::{And, Not};
//!
//! let f1 = And::new(atom("x"), atom("y"));
//! let f2 = Not::new(atom("z"));
//! ```
//!
//! We indicate if a past-time operator is windowed by selecting the appropriate constructor:
//!
//! ```rust
//! use fleance::atom;
//! use fleance::operators::Historically;
//! use fleance::Lookback;
//!
//! let f1 = Historically::unbounded(atom("x"));
//! let f2 = Historically::bounded(Lookback::new(0.0, 3.0).unwrap(), atom("y"));
//! ```
//!
//! Operators can be combined, instantiated into monitors, and driven one sample at a time:
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fleance::operators::{And, Historically, Not};
//! use fleance::{atom, Formula, Monitor};
//!
//! let f = Historically::unbounded(And::new(Not::new(atom("x")), atom("y")));
//! let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&f);
//!
//! let rho = monitor.advance(0.0, &HashMap::from([("x", 1.0), ("y", 2.0)]));
//! ```
//!
//! # Custom Operators
//!
//! Users can define their own operators by implementing the [`Formula`](crate::Formula) and
//! [`Monitor`](crate::Monitor) traits for their own types.
//!
//! [`Lookback`]: crate::window::Lookback

mod first_order;
mod past;

pub use first_order::{
    And, AndMonitor, Apply, ApplyError, ApplyMonitor, BinaryOperatorError, Implies, ImpliesMonitor,
    Not, NotMonitor, Or, OrMonitor,
};
pub use past::{Historically, HistoricallyMonitor, Once, OnceMonitor, PastOperatorError, Since};
