use thiserror::Error;

use crate::metrics::{Meet, Negation, Top};
use crate::operators::first_order::{Not, NotMonitor};
use crate::window::{Lookback, MinWindow};
use crate::{Formula, Monitor, NonMonotonicTime};

/// The error type for evaluating a past-time operator.
///
/// An error can occur when evaluating a past-time operator in the following circumstances:
///
///   1. An error occurs during the evaluation of the subformula
///   2. A windowed operator receives a sample whose time does not strictly advance
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PastOperatorError<E> {
    /// An error produced by the subformula of the operator
    #[error("Subformula error: {0}")]
    SubformulaError(E),

    /// The sample's time does not strictly advance past the previous sample's time.
    #[error(transparent)]
    Time(#[from] NonMonotonicTime),
}

/// Past-time operator that requires its subformula to have held at every past time, written
/// `hist` or `historically`.
///
/// For each sample, this operator evaluates its subformula and returns the minimum of every
/// metric observed so far. In the windowed form constructed with
/// [`bounded`](Historically::bounded), only the metrics whose sample times fall inside the
/// lookback window contribute: at time `t` with lookback `(start, end)`, the operator considers
/// the samples with times in `[t - end, t - start]`. When no sample falls inside the window the
/// operator returns [`Top`], the identity of conjunction.
///
/// Here is an example evaluation of the unbounded operator:
///
/// | time | subformula | hist |
/// | ---- | ---------- | ---- |
/// |  0.0 |        4.0 |  4.0 |
/// |  1.0 |        2.0 |  2.0 |
/// |  2.0 |        3.0 |  2.0 |
/// |  3.0 |        1.0 |  1.0 |
///
/// The following is an example of creating formulas using the Historically operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::Historically;
/// use fleance::Lookback;
///
/// let f1 = Historically::unbounded(atom("x"));
/// let f2 = Historically::bounded(Lookback::new(0.0, 3.0).unwrap(), atom("x"));
/// ```
#[derive(Debug, Clone)]
pub struct Historically<F> {
    subformula: F,
    lookback: Option<Lookback>,
}

impl<F> Historically<F> {
    /// Create an operator considering every sample since the beginning of the stream.
    pub fn unbounded(subformula: F) -> Self {
        Self {
            subformula,
            lookback: None,
        }
    }

    /// Create an operator considering only the samples inside the lookback window.
    pub fn bounded(lookback: Lookback, subformula: F) -> Self {
        Self {
            subformula,
            lookback: Some(lookback),
        }
    }

    /// Return the lookback window of the operator, or [`None`] if it is unbounded.
    pub fn lookback(&self) -> Option<Lookback> {
        self.lookback
    }
}

/// Evaluation state of a [`HistoricallyMonitor`].
///
/// The unbounded form only needs the worst metric observed so far; the windowed form delegates
/// retention and expiry to a [`MinWindow`].
#[derive(Debug, Clone)]
enum PastState<Metric> {
    Running(Metric),
    Windowed(MinWindow<Metric>),
}

/// Monitor instantiated from a [`Historically`] formula.
#[derive(Debug, Clone)]
pub struct HistoricallyMonitor<M, Metric> {
    subformula: M,
    state: PastState<Metric>,
}

impl<F, State, Metric> Formula<State> for Historically<F>
where
    F: Formula<State, Metric = Metric>,
    Metric: Top + Meet + Clone,
{
    type Metric = Metric;
    type Error = PastOperatorError<F::Error>;
    type Monitor = HistoricallyMonitor<F::Monitor, Metric>;

    fn monitor(&self) -> Self::Monitor {
        HistoricallyMonitor {
            subformula: self.subformula.monitor(),
            state: match self.lookback {
                Some(lookback) => PastState::Windowed(MinWindow::new(lookback)),
                None => PastState::Running(Metric::top()),
            },
        }
    }
}

impl<M, State, Metric> Monitor<State> for HistoricallyMonitor<M, Metric>
where
    M: Monitor<State, Metric = Metric>,
    Metric: Top + Meet + Clone,
{
    type Metric = Metric;
    type Error = PastOperatorError<M::Error>;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        let rho = self
            .subformula
            .advance(time, state)
            .map_err(PastOperatorError::SubformulaError)?;

        match &mut self.state {
            PastState::Running(worst) => {
                let next = Meet::min(worst, &rho);
                *worst = next.clone();

                Ok(next)
            }
            PastState::Windowed(window) => window.update(time, rho).map_err(PastOperatorError::from),
        }
    }
}

/// Past-time operator that requires its subformula to have held at some past time, written
/// `once`.
///
/// For each sample, this operator evaluates its subformula and returns the maximum of every
/// metric observed so far, restricted to the lookback window in the form constructed with
/// [`bounded`](Once::bounded). When no sample falls inside the window the operator returns
/// [`Bottom`](crate::metrics::Bottom), the identity of disjunction.
///
/// `Once` is the dual of [`Historically`] and is evaluated through that duality:
/// `Once(phi) = Not(Historically(Not(phi)))`. The negations are exact inverses for both real
/// and boolean metrics, so no precision is lost in the round trip.
///
/// Here is an example evaluation of the unbounded operator:
///
/// | time | subformula | once |
/// | ---- | ---------- | ---- |
/// |  0.0 |       -1.0 | -1.0 |
/// |  1.0 |        2.0 |  2.0 |
/// |  2.0 |       -3.0 |  2.0 |
///
/// The following is an example of creating formulas using the Once operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::Once;
/// use fleance::Lookback;
///
/// let f1 = Once::unbounded(atom("x"));
/// let f2 = Once::bounded(Lookback::new(0.0, 3.0).unwrap(), atom("x"));
/// ```
#[derive(Debug, Clone)]
pub struct Once<F> {
    inner: Historically<Not<F>>,
}

impl<F> Once<F> {
    /// Create an operator considering every sample since the beginning of the stream.
    pub fn unbounded(subformula: F) -> Self {
        Self {
            inner: Historically::unbounded(Not::new(subformula)),
        }
    }

    /// Create an operator considering only the samples inside the lookback window.
    pub fn bounded(lookback: Lookback, subformula: F) -> Self {
        Self {
            inner: Historically::bounded(lookback, Not::new(subformula)),
        }
    }

    /// Return the lookback window of the operator, or [`None`] if it is unbounded.
    pub fn lookback(&self) -> Option<Lookback> {
        self.inner.lookback()
    }
}

/// Monitor instantiated from a [`Once`] formula.
///
/// Wraps the monitor of the dual [`Historically`] formula and negates its output.
#[derive(Debug, Clone)]
pub struct OnceMonitor<M>(M);

impl<F, State, Metric> Formula<State> for Once<F>
where
    F: Formula<State, Metric = Metric>,
    Metric: Top + Meet + Negation + Clone,
{
    type Metric = Metric;
    type Error = PastOperatorError<F::Error>;
    type Monitor = OnceMonitor<HistoricallyMonitor<NotMonitor<F::Monitor>, Metric>>;

    fn monitor(&self) -> Self::Monitor {
        OnceMonitor(self.inner.monitor())
    }
}

impl<M, State, Metric> Monitor<State> for OnceMonitor<M>
where
    M: Monitor<State, Metric = Metric>,
    Metric: Negation,
{
    type Metric = Metric;
    type Error = M::Error;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        self.0.advance(time, state).map(|rho| rho.negation())
    }
}

/// Binary past-time operator requiring the left subformula to have held at every time after the
/// right subformula last held, written `since`.
///
/// This type reserves the name and operand shape of the operator, but its evaluation is **not
/// provided**: `Since` does not implement [`Formula`], so placing it inside a formula is a
/// compile-time error. Users who need `since` semantics can implement [`Formula`] and
/// [`Monitor`] for their own wrapper around the operands exposed here.
#[derive(Debug, Clone)]
pub struct Since<Left, Right> {
    left: Left,
    right: Right,
    lookback: Option<Lookback>,
}

impl<Left, Right> Since<Left, Right> {
    /// Create an operator considering every sample since the beginning of the stream.
    pub fn unbounded(left: Left, right: Right) -> Self {
        Self {
            left,
            right,
            lookback: None,
        }
    }

    /// Create an operator considering only the samples inside the lookback window.
    pub fn bounded(lookback: Lookback, left: Left, right: Right) -> Self {
        Self {
            left,
            right,
            lookback: Some(lookback),
        }
    }

    /// Return the subformula on the left of the operator.
    pub fn left(&self) -> &Left {
        &self.left
    }

    /// Return the subformula on the right of the operator.
    pub fn right(&self) -> &Right {
        &self.right
    }

    /// Return the lookback window of the operator, or [`None`] if it is unbounded.
    pub fn lookback(&self) -> Option<Lookback> {
        self.lookback
    }
}

#[cfg(test)]
mod tests {
    use super::{Historically, Once, PastOperatorError};
    use crate::operators::test::*;
    use crate::trace::Trace;
    use crate::window::Lookback;
    use crate::{evaluate, EvaluationError, Formula, Monitor, NonMonotonicTime};

    type PastResult = Result<(), EvaluationError<PastOperatorError<ConstError>>>;

    #[test]
    fn unbounded_historically() -> PastResult {
        let input = Trace::from_iter([
            (0, 4.0),
            (1, 2.0),
            (2, 3.0),
            (3, 1.0),
            (4, 5.0),
        ]);

        let robustness = evaluate(&input, Historically::unbounded(Const))?;
        let expected = Trace::from_iter([
            (0, 4.0),
            (1, 2.0),
            (2, 2.0),
            (3, 1.0),
            (4, 1.0),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn bounded_historically() -> PastResult {
        let input = Trace::from_iter([
            (0, 3.0),
            (1, 1.0),
            (2, 4.0),
            (3, 5.0),
            (4, 2.0),
        ]);

        let lookback = Lookback::new(0.0, 2.0).unwrap();
        let robustness = evaluate(&input, Historically::bounded(lookback, Const))?;

        // The sample at 1.0 ages out of the window after time 3.0.
        let expected = Trace::from_iter([
            (0, 3.0),
            (1, 1.0),
            (2, 1.0),
            (3, 1.0),
            (4, 2.0),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn delayed_window_yields_identity() -> PastResult {
        let input = Trace::from_iter([(0.0, 2.0), (2.0, 1.0)]);

        let lookback = Lookback::new(1.0, 4.0).unwrap();
        let robustness = evaluate(&input, Historically::bounded(lookback, Const))?;

        // At time 0.0 the window covers [-4.0, -1.0], which holds no sample.
        let expected = Trace::from_iter([(0.0, f64::INFINITY), (2.0, 2.0)]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn unbounded_once() -> PastResult {
        let input = Trace::from_iter([
            (0, false),
            (1, true),
            (2, false),
        ]);

        let robustness = evaluate(&input, Once::unbounded(Const))?;
        let expected = Trace::from_iter([(0, false), (1, true), (2, true)]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn bounded_once() -> PastResult {
        let input = Trace::from_iter([
            (0, true),
            (1, false),
            (2, false),
            (3, true),
            (4, false),
        ]);

        let lookback = Lookback::new(0.0, 1.0).unwrap();
        let robustness = evaluate(&input, Once::bounded(lookback, Const))?;
        let expected = Trace::from_iter([
            (0, true),
            (1, true),
            (2, false),
            (3, true),
            (4, true),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn windowed_monitor_rejects_non_monotonic_time() {
        let lookback = Lookback::new(0.0, 2.0).unwrap();
        let formula = Historically::bounded(lookback, Const);
        let mut monitor = formula.monitor();

        assert_eq!(monitor.advance(1.0, &3.0), Ok(3.0));
        assert_eq!(
            monitor.advance(1.0, &4.0),
            Err(PastOperatorError::Time(NonMonotonicTime {
                previous: 1.0,
                current: 1.0,
            }))
        );
    }
}
