//! System requirements expressed as the inequality **`ax`**`≤ b`.
//!
//! A [`Predicate`] turns a numeric system state into a real-valued robustness metric. As an
//! example, consider a requirement on an automotive system such as "the RPM of the transmission
//! should stay below 10,000". The `rpm <= 10_000` part of the requirement is represented as a
//! `Predicate`, and its distance from violation is the metric fed into the temporal operators.
//!
//! In this inequality, both **a** and **x** are maps of names to [`f64`] values, while b is a
//! constant. The **a** vector contains the variable coefficients and is created while
//! constructing the predicate. Conversely, the **x** vector contains the variable values and is
//! provided by each sample. The [robustness] value of the inequality is computed using the
//! equation `b - `**`a`**`·`**`x`**: positive when the inequality holds, negative when it is
//! violated, with magnitude measuring the margin.
//!
//! [robustness]: https://link.springer.com/chapter/10.1007/11940197_12
//!
//! # Examples
//!
//! You can explicitly create a new empty `Predicate` using the [`Predicate::new`] function, and
//! add terms with the [`AddAssign`](std::ops::AddAssign) and [`SubAssign`](std::ops::SubAssign)
//! operators:
//!
//! ```rust
//! use fleance::Predicate;
//!
//! let mut p = Predicate::new();
//!
//! p += ("x", 1.5);  // Add a term x to the _a_ vector with coefficient 1.5
//! p += (2.0, "y");  // Add a term y to the _a_ vector with coefficient 2.0
//! p += "z";         // Add a term z to the _a_ vector with coefficient 1.0
//! p += 1.3;         // Add constant to _b_ value
//!
//! p -= ("x", 0.6);  // Subtract from the x coefficient
//! p -= (2.0, "y");  // Subtract from the y coefficient
//! p -= 0.6;         // Subtract constant from _b_ value
//! ```
//!
//! Any value that can be converted into a [`Term`] is supported as an `AddAssign` operand. If a
//! variable already has a coefficient then the two values are added together, so the final result
//! of the example above is the predicate `0.9 * x + 1.0 * z ≤ 0.7`.
//!
//! For a predicate of known length, you can create a `Predicate` from an array:
//!
//! ```rust
//! use fleance::predicate::{Predicate, Term};
//!
//! let p = Predicate::from([
//!     Term::from(("x", 1.0)),
//!     Term::from((1.0, "y")),
//!     Term::from("z"),
//!     Term::from(1.0),
//! ]);
//! ```
//!
//! A single state can be evaluated directly with [`Predicate::evaluate_state`]; as a
//! [`Formula`], a predicate instantiates monitors whose metric is the robustness of each sample.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fleance::{Formula, Monitor, Predicate};
//!
//! let p = Predicate::from([("x", 1.0), ("y", 2.0)]) + 10.0;
//! let state = HashMap::from([("x", 2.0), ("y", 1.0)]);
//!
//! assert_eq!(p.evaluate_state(&state), Ok(6.0));
//!
//! let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&p);
//! assert_eq!(monitor.advance(0.0, &state), Ok(6.0));
//! ```

use std::collections::HashMap;
use std::ops::{Add, AddAssign, Index, Neg, SubAssign};

use thiserror::Error;

use crate::proposition::VariableSet;
use crate::{Formula, Monitor, NonMonotonicTime};

/// System requirements expressed as the inequality **`ax`**`≤ b`.
///
/// See the [`predicate`](self) module for more information on the semantics of this data type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    coefficients: HashMap<String, f64>,
    constant: f64,
}

impl Predicate {
    /// Create a new empty predicate equivalent to `0 ≤ 0`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fleance::Predicate;
    /// let mut p = Predicate::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a variable coefficient from the left-hand side of the inequality if it has been set,
    /// otherwise return [`None`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fleance::Predicate;
    ///
    /// let p = Predicate::from([
    ///     ("x", 1.0), ("y", 3.0), ("z", 2.0),
    /// ]);
    ///
    /// p.get("x");  // Some(1.0)
    /// p.get("a");  // None
    /// ```
    pub fn get(&self, name: &str) -> Option<f64> {
        self.coefficients.get(name).copied()
    }

    /// Return the constant from the right-hand side of the inequality.
    pub fn constant(&self) -> f64 {
        self.constant
    }
}

/// Iterator over the coefficient terms of a predicate.
///
/// The coefficient terms are the terms with a variable name associated with them. This iterator
/// does not guarantee any order of the terms.
#[derive(Debug)]
pub struct Coefficients<'a>(std::collections::hash_map::Iter<'a, String, f64>);

impl<'a> Iterator for Coefficients<'a> {
    type Item = (&'a str, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(name, value)| (name.as_str(), *value))
    }
}

impl Predicate {
    /// Create an iterator over the coefficient terms of the `Predicate`.
    ///
    /// A coefficient term is a term that has a variable. This function does not make any
    /// guarantees about the order of iteration of the terms.
    pub fn coefficients(&self) -> Coefficients<'_> {
        Coefficients(self.coefficients.iter())
    }
}

impl<T> FromIterator<T> for Predicate
where
    T: Into<Term>,
{
    fn from_iter<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut p = Predicate::new();

        for term in terms {
            p += term.into();
        }

        p
    }
}

impl<T, const N: usize> From<[T; N]> for Predicate
where
    T: Into<Term>,
{
    fn from(terms: [T; N]) -> Self {
        Predicate::from_iter(terms)
    }
}

impl Index<&str> for Predicate {
    type Output = f64;

    /// Returns a reference to a coefficient in the predicate
    ///
    /// # Panics
    ///
    /// Panics if the variable does not have a coefficient set
    fn index(&self, index: &str) -> &Self::Output {
        &self.coefficients[index]
    }
}

impl Neg for Predicate {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            constant: -self.constant,
            coefficients: self
                .coefficients
                .into_iter()
                .map(|(name, coeff)| (name, -coeff))
                .collect(),
        }
    }
}

/// A variable or constant term in a predicate.
///
/// A `Variable` term contains a variable name and the associated coefficient, while a `Constant`
/// term contains only a constant value. The purpose of this type is to provide a conversion
/// target that supports multiple different types as [`AddAssign`] operands for a [`Predicate`].
///
/// # Examples
///
/// ```rust
/// use fleance::predicate::Term;
///
/// let terms = [
///     Term::from(1.0),
///     Term::from("x"),
///     Term::from(("x", 1.0)),
///     Term::from((1.0, "x")),
/// ];
/// ```
pub enum Term {
    Variable(String, f64),
    Constant(f64),
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Self::Output {
        match self {
            Self::Variable(name, value) => Self::Variable(name, -value),
            Self::Constant(value) => Self::Constant(-value),
        }
    }
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::Variable(name.into(), 1.0)
    }
}

impl From<String> for Term {
    fn from(name: String) -> Self {
        Term::Variable(name, 1.0)
    }
}

impl From<(&str, f64)> for Term {
    fn from((name, value): (&str, f64)) -> Self {
        Term::Variable(name.into(), value)
    }
}

impl From<(String, f64)> for Term {
    fn from((name, value): (String, f64)) -> Self {
        Term::Variable(name, value)
    }
}

impl From<(f64, &str)> for Term {
    fn from((value, name): (f64, &str)) -> Self {
        Term::Variable(name.into(), value)
    }
}

impl From<(f64, String)> for Term {
    fn from((value, name): (f64, String)) -> Self {
        Term::Variable(name, value)
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Constant(value)
    }
}

impl<T> AddAssign<T> for Predicate
where
    T: Into<Term>,
{
    fn add_assign(&mut self, rhs: T) {
        match rhs.into() {
            Term::Variable(name, value) => {
                let coeff = self.coefficients.entry(name).or_insert(0.0);
                *coeff += value;
            }
            Term::Constant(value) => {
                self.constant += value;
            }
        }
    }
}

impl<T> SubAssign<T> for Predicate
where
    T: Into<Term>,
{
    fn sub_assign(&mut self, rhs: T) {
        *self += -rhs.into();
    }
}

impl<T> Add<T> for Predicate
where
    T: Into<Term>,
{
    type Output = Self;

    fn add(mut self, rhs: T) -> Self::Output {
        self += rhs;
        self
    }
}

/// Error categories that can be produced from [`Predicate::evaluate_state`]
///
/// This enum is marked as `non_exhaustive` so it is best practice to match against the
/// `ErrorKind` variants you are expecting, and use `_` for all the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    #[error("Missing variable")]
    Missing,

    #[error("NaN value for variable")]
    NanValue,

    #[error("NaN coefficient for variable")]
    NanCoefficient,
}

/// The error type for evaluating a state using a predicate.
///
/// The primary source of this error is the [`Predicate::evaluate_state`] method. This error can
/// represent one of the three following occurences:
///   1. A variable has a coefficient but not a value in the variable set
///   2. A variable has a value in the variable set that is NaN
///   3. A variable has a coefficient that is NaN
///
/// NaN inputs are rejected rather than propagated so that a NaN metric can never enter a window
/// tracker or lattice operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error evaluating predicate: {kind} \"{name}\"")]
pub struct EvaluationError {
    kind: ErrorKind,
    name: String,
}

impl EvaluationError {
    /// Create an error for a missing variable
    ///
    /// This method creates a clone of the name argument.
    pub fn missing(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ErrorKind::Missing,
        }
    }

    /// Create an error for a variable with a NaN value
    ///
    /// This method creates a clone of the name argument.
    pub fn nan_value(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ErrorKind::NanValue,
        }
    }

    /// Create an error for a variable with a NaN coefficient
    ///
    /// This method creates a clone of the name argument.
    pub fn nan_coefficient(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            kind: ErrorKind::NanCoefficient,
        }
    }

    /// Return the name of the variable that produced the error
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the [`ErrorKind`] for this error
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl Predicate {
    /// Evaluate a system state into a robustness value.
    ///
    /// The successful output of this function is a `f64` value representing the distance of the
    /// state from making the inequality represented by the `Predicate` false. A positive output
    /// value indicates that the inequality was not violated, while a negative value indicates
    /// the inequality was violated. The unsuccessful output of this function is an
    /// [`EvaluationError`] which indicates the nature of the evaluation error.
    ///
    /// Any value that implements the [`VariableSet`] trait with `f64` values can be evaluated
    /// with this method.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    ///
    /// use fleance::predicate::{Predicate, Term};
    ///
    /// let state = HashMap::from([
    ///      ("x", 1.0), ("y", 3.0), ("z", f64::NAN),
    /// ]);
    ///
    /// let p = Predicate::from([
    ///     Term::from(("x", 1.0)), Term::from(("y", 2.0)), Term::from(10.0)
    /// ]);
    ///
    /// p.evaluate_state(&state);  // Ok -> 3.0
    ///
    /// let p = Predicate::from([
    ///     Term::from(("x", 1.0)), Term::from(("a", 2.0)), Term::from(10.0)
    /// ]);
    ///
    /// p.evaluate_state(&state);  // Error -> Missing variable "a"
    ///
    /// let p = Predicate::from([
    ///     Term::from(("x", 1.0)), Term::from(("z", 2.0)), Term::from(10.0)
    /// ]);
    ///
    /// p.evaluate_state(&state);  // Error -> Variable "z" has NaN value
    /// ```
    pub fn evaluate_state<State>(&self, state: &State) -> Result<f64, EvaluationError>
    where
        State: VariableSet<Value = f64>,
    {
        let mut sum = 0.0;

        for (name, coeff) in &self.coefficients {
            if coeff.is_nan() {
                return Err(EvaluationError::nan_coefficient(name));
            }

            let value = state
                .value_for(name.as_str())
                .ok_or_else(|| EvaluationError::missing(name))?;

            if value.is_nan() {
                return Err(EvaluationError::nan_value(name));
            }

            sum += coeff * value;
        }

        Ok(self.constant - sum)
    }
}

/// The error type produced when a [`PredicateMonitor`] rejects a sample.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredicateError {
    /// The state at the given time could not be evaluated.
    #[error("At time {time} encountered error: {error}")]
    Evaluation { time: f64, error: EvaluationError },

    /// The sample's time does not strictly advance past the previous sample's time.
    #[error(transparent)]
    Time(#[from] NonMonotonicTime),
}

/// Monitor instantiated from a [`Predicate`].
///
/// Holds its own copy of the inequality so that the originating formula remains free to be
/// instantiated again.
#[derive(Debug, Clone)]
pub struct PredicateMonitor {
    predicate: Predicate,
    last_time: Option<f64>,
}

impl<State> Formula<State> for Predicate
where
    State: VariableSet<Value = f64>,
{
    type Metric = f64;
    type Error = PredicateError;
    type Monitor = PredicateMonitor;

    fn monitor(&self) -> Self::Monitor {
        PredicateMonitor {
            predicate: self.clone(),
            last_time: None,
        }
    }
}

impl<State> Monitor<State> for PredicateMonitor
where
    State: VariableSet<Value = f64>,
{
    type Metric = f64;
    type Error = PredicateError;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        if let Some(previous) = self.last_time {
            if time <= previous {
                return Err(NonMonotonicTime { previous, current: time }.into());
            }
        }

        let rho = self
            .predicate
            .evaluate_state(state)
            .map_err(|error| PredicateError::Evaluation { time, error })?;

        self.last_time = Some(time);
        Ok(rho)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::{EvaluationError, Predicate, PredicateError};
    use crate::{Formula, Monitor};

    #[test]
    fn robustness() {
        // 1.0 * x + 2.0 * y <= 10
        let mut p = Predicate::new();
        p += ("x", 1.0);
        p += ("y", 2.0);
        p += 10.0;

        let hash_map = HashMap::from([("x", 2.0), ("y", 1.0)]);
        let btree = BTreeMap::from([("x", 5.0), ("y", 5.0)]);
        let missing = HashMap::from([("y", 2.0)]);
        let nan_value = HashMap::from([("x", 2.0), ("y", f64::NAN)]);

        assert_eq!(p.evaluate_state(&hash_map), Ok(6.0));
        assert_eq!(p.evaluate_state(&btree), Ok(-5.0));
        assert_eq!(p.evaluate_state(&missing), Err(EvaluationError::missing("x")));
        assert_eq!(p.evaluate_state(&nan_value), Err(EvaluationError::nan_value("y")));

        p += ("z", f64::NAN);

        assert_eq!(p.evaluate_state(&hash_map), Err(EvaluationError::nan_coefficient("z")));
    }

    #[test]
    fn coefficient_accumulation() {
        let mut p = Predicate::new();

        p += ("x", 1.5);
        p += "x";
        p -= ("x", 0.5);
        p += 1.3;
        p -= 0.3;

        assert_eq!(p.get("x"), Some(2.0));
        assert_eq!(p.constant(), 1.0);
    }

    #[test]
    fn monitor_evaluates_samples() {
        let p = Predicate::from([("x", 1.0)]) + 5.0;
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&p);

        assert_eq!(monitor.advance(0.0, &HashMap::from([("x", 2.0)])), Ok(3.0));
        assert_eq!(monitor.advance(1.0, &HashMap::from([("x", 7.0)])), Ok(-2.0));
    }

    #[test]
    fn monitor_reports_failing_time() {
        let p = Predicate::from([("x", 1.0)]) + 5.0;
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&p);

        assert_eq!(monitor.advance(0.0, &HashMap::from([("x", 2.0)])), Ok(3.0));

        let result = monitor.advance(1.0, &HashMap::<&str, f64>::new());

        assert_eq!(
            result,
            Err(PredicateError::Evaluation {
                time: 1.0,
                error: EvaluationError::missing("x"),
            })
        );
    }

    #[test]
    fn monitor_rejects_non_monotonic_time() {
        let p = Predicate::from([("x", 1.0)]);
        let state = HashMap::from([("x", 0.0)]);
        let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&p);

        assert_eq!(monitor.advance(1.0, &state), Ok(0.0));
        assert!(monitor.advance(0.5, &state).is_err());
    }
}
