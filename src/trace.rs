//! A set of values where each value is associated with a time.
//!
//! A [`Trace`] is an associative map representing a sequence of values keyed by the time each
//! value was generated. Monitors themselves never require a trace — they consume one sample per
//! call — but a trace is the natural shape for recorded inputs and for the metric outputs
//! collected by [`evaluate`](crate::evaluate). Iteration is always chronological, which matches
//! the strictly-increasing-time requirement of [`Monitor::advance`](crate::Monitor::advance).
//!
//! # Safety
//!
//! `f64` values are used to represent times, which do not inherently support `Ord` due to the
//! presence of NaN values. To work around this issue the trace requires that no time is NaN;
//! using a NaN time in any method will result in a panic.
//!
//! # Examples
//!
//! A trace can be built incrementally or from a known set of elements.
//!
//! ```rust
//! use fleance::Trace;
//!
//! let mut trace: Trace<f64> = Trace::new();
//! trace.insert(0.0, 100.0);
//! trace.insert(1.0, 105.3);
//!
//! let trace = Trace::from([
//!     (0.0, 100.0),
//!     (1.0, 105.3),
//!     (2.0, 107.1),
//! ]);
//!
//! trace.at_time(0.0);  // Some(&100.0)
//! trace.at_time(3.0);  // None
//! ```
//!
//! Traces can be iterated over with for loops, or through the [`Trace::times`] and
//! [`Trace::states`] adapters, and collected from iterators of `(time, state)` pairs.
//!
//! ```rust
//! use fleance::Trace;
//!
//! let trace = Trace::from([(0.0, 1.0), (1.0, 2.0)]);
//!
//! for (time, state) in &trace {  // (f64, &f64)
//!     // ...
//! }
//!
//! let halved: Trace<f64> = trace
//!     .into_iter()
//!     .map(|(time, state)| (time, state / 2.0))
//!     .collect();
//! ```

use std::collections::BTreeMap;
use std::ops::Index;

use ordered_float::NotNan;

/// A set of values where each value is associated with a time.
///
/// See the [`trace`](self) module documentation for more information.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Trace<T>(BTreeMap<NotNan<f64>, T>);

impl<T> Default for Trace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T> FromIterator<(A, T)> for Trace<T>
where
    A: Into<f64>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (A, T)>,
    {
        let elements = iter
            .into_iter()
            .map(|(time, state)| (NotNan::new(time.into()).unwrap(), state))
            .collect();

        Self(elements)
    }
}

impl<A, T, const N: usize> From<[(A, T); N]> for Trace<T>
where
    A: Into<f64>,
{
    #[inline]
    fn from(values: [(A, T); N]) -> Self {
        Self::from_iter(values)
    }
}

impl<A, T> From<Vec<(A, T)>> for Trace<T>
where
    A: Into<f64>,
{
    #[inline]
    fn from(values: Vec<(A, T)>) -> Self {
        Self::from_iter(values)
    }
}

impl<T> Index<f64> for Trace<T> {
    type Output = T;

    /// Returns the state for a given time.
    ///
    /// # Panics
    ///
    /// Panics if the time is NaN or not present in the trace.
    fn index(&self, index: f64) -> &Self::Output {
        let index = NotNan::new(index).unwrap();
        self.0.index(&index)
    }
}

impl<T> Trace<T> {
    /// Create a new empty trace. Equivalent to [`Trace::default()`]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of elements in the trace
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Determine if the trace contains any elements
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the state for a given time. Returns None if the time is not present in the trace.
    ///
    /// # Safety
    ///
    /// This method will panic if the provided time is NaN
    pub fn at_time(&self, time: f64) -> Option<&T> {
        let key = NotNan::new(time).unwrap();
        self.0.get(&key)
    }

    /// Insert a state for a given time into the trace. Returns the prior state if it exists.
    ///
    /// # Safety
    ///
    /// This method will panic if the provided time is NaN
    pub fn insert(&mut self, time: f64, state: T) -> Option<T> {
        let key = NotNan::new(time).unwrap();
        self.0.insert(key, state)
    }

    /// Create an iterator yielding (time, &state) values from the trace in chronological order.
    pub fn iter(&self) -> Iter<T> {
        self.into_iter()
    }

    /// Create an iterator yielding time values from the trace in chronological order.
    pub fn times(&self) -> Times<Iter<T>> {
        Times(self.iter())
    }

    /// Create an iterator yielding &state values from the trace in chronological order.
    pub fn states(&self) -> States<Iter<T>> {
        States(self.iter())
    }
}

/// Iterator over the times in a trace, yielded in chronological order.
///
/// This iterator can be constructed by calling the [`times`](Trace::times) method on a trace.
pub struct Times<I>(I);

impl<I, T> Iterator for Times<I>
where
    I: Iterator<Item = (f64, T)>,
{
    type Item = f64;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|p| p.0)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I, T> ExactSizeIterator for Times<I>
where
    I: ExactSizeIterator<Item = (f64, T)>,
{
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Iterator over the states in a trace, yielded in chronological order.
///
/// This iterator can be constructed by calling the [`states`](Trace::states) method on a trace,
/// or on a trace iterator.
pub struct States<I>(I);

impl<I, T> Iterator for States<I>
where
    I: Iterator<Item = (f64, T)>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|p| p.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<I, T> ExactSizeIterator for States<I>
where
    I: ExactSizeIterator<Item = (f64, T)>,
{
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Borrowing iterator over the (time, &state) pairs in a trace, yielded in chronological order.
pub struct Iter<'a, T>(std::collections::btree_map::Iter<'a, NotNan<f64>, T>);

impl<'a, T> Iter<'a, T> {
    fn map_element((&time, state): (&'a NotNan<f64>, &'a T)) -> (f64, &'a T) {
        (time.into_inner(), state)
    }

    /// Create an iterator over the states of the trace, ignoring the times.
    pub fn states(self) -> States<Self> {
        States(self)
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (f64, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Self::map_element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Owning iterator over the (time, state) pairs in a trace, yielded in chronological order.
pub struct IntoIter<T>(std::collections::btree_map::IntoIter<NotNan<f64>, T>);

impl<T> IntoIter<T> {
    fn map_element((time, state): (NotNan<f64>, T)) -> (f64, T) {
        (time.into_inner(), state)
    }

    /// Create an iterator over the states of the trace, ignoring the times.
    pub fn states(self) -> States<Self> {
        States(self)
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = (f64, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Self::map_element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl<T> IntoIterator for Trace<T> {
    type Item = (f64, T);
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.0.into_iter())
    }
}

impl<'a, T> IntoIterator for &'a Trace<T> {
    type Item = (f64, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter(self.0.iter())
    }
}
