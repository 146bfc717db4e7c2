use thiserror::Error;

use crate::metrics::{Join, Meet, Negation};
use crate::{Formula, Monitor};

/// First-order operator that inverts its subformula, written `!`, or `not`.
///
/// The `Not` operator is a unary operator, which means that it operates on a single subformula.
/// For each sample, this operator evaluates its subformula and negates the resulting metric. For
/// floating point numbers, this would look as follows:
///
/// | time | subformula | not  |
/// | ---- | ---------- | ---- |
/// | 0.0  |        1.0 | -1.0 |
/// | 1.0  |        3.0 | -3.0 |
/// | 2.0  |       -2.0 |  2.0 |
///
/// The following is an example of creating a formula using the not operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::Not;
///
/// let formula = Not::new(atom("x"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Not<F> {
    subformula: F,
}

impl<F> Not<F> {
    pub fn new(subformula: F) -> Self {
        Self { subformula }
    }
}

/// Monitor instantiated from a [`Not`] formula.
#[derive(Debug, Clone)]
pub struct NotMonitor<M> {
    subformula: M,
}

impl<State, F, Metric> Formula<State> for Not<F>
where
    F: Formula<State, Metric = Metric>,
    Metric: Negation,
{
    type Metric = Metric;
    type Error = F::Error;
    type Monitor = NotMonitor<F::Monitor>;

    fn monitor(&self) -> Self::Monitor {
        NotMonitor {
            subformula: self.subformula.monitor(),
        }
    }
}

impl<State, M, Metric> Monitor<State> for NotMonitor<M>
where
    M: Monitor<State, Metric = Metric>,
    Metric: Negation,
{
    type Metric = Metric;
    type Error = M::Error;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        self.subformula.advance(time, state).map(|rho| rho.negation())
    }
}

/// Error produced during the evaluation of a binary operator.
///
/// An error can occur when evaluating a binary operator in the following circumstances:
///
///   1. An error occurs during the evaluation of the left subformula
///   2. An error occurs during the evaluation of the right subformula
///
/// Both operands receive every sample, but the left operand is evaluated first, so if both
/// operands reject a sample the left error is the one reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BinaryOperatorError<L, R> {
    /// An error produced by the subformula on the left of the operator
    #[error("Left subformula error: {0}")]
    LeftError(L),

    /// An error produced by the subformula on the right of the operator
    #[error("Right subformula error: {0}")]
    RightError(R),
}

#[derive(Debug, Clone)]
struct Binop<Left, Right> {
    left: Left,
    right: Right,
}

impl<Left, Right> Binop<Left, Right> {
    fn monitor<State>(&self) -> Binop<Left::Monitor, Right::Monitor>
    where
        Left: Formula<State>,
        Right: Formula<State>,
    {
        Binop {
            left: self.left.monitor(),
            right: self.right.monitor(),
        }
    }

    fn advance_left<State, Metric>(
        &mut self,
        time: f64,
        state: &State,
    ) -> Result<Metric, BinaryOperatorError<Left::Error, Right::Error>>
    where
        Left: Monitor<State, Metric = Metric>,
        Right: Monitor<State>,
    {
        self.left.advance(time, state).map_err(BinaryOperatorError::LeftError)
    }

    fn advance_right<State, Metric>(
        &mut self,
        time: f64,
        state: &State,
    ) -> Result<Metric, BinaryOperatorError<Left::Error, Right::Error>>
    where
        Left: Monitor<State>,
        Right: Monitor<State, Metric = Metric>,
    {
        self.right.advance(time, state).map_err(BinaryOperatorError::RightError)
    }
}

/// First-order operator that requires either of its subformulas to hold, written `\/`, `||`, or
/// `or`.
///
/// This operator evaluates each sample using both subformulas and takes the maximum of the two
/// metrics. The intuition behind this operator is that given two metrics where negative values
/// represent failure the operator should only return a negative value if both of its operands
/// are negative, mirroring the first-order logic behavior.
///
/// Here is an example evaluation of the disjunction operator:
///
/// | time | left | right | or   |
/// | ---- | ---- | ----- | ---- |
/// |  0.0 |  1.0 |   2.0 |  2.0 |
/// |  1.0 | -1.0 |   5.0 |  5.0 |
/// |  2.0 | -3.0 |  -1.0 | -1.0 |
///
/// The following is an example of creating a formula using the Or operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::Or;
///
/// let formula = Or::new(atom("x"), atom("y"));
/// ```
#[derive(Debug, Clone)]
pub struct Or<Left, Right>(Binop<Left, Right>);

impl<Left, Right> Or<Left, Right> {
    pub fn new(left: Left, right: Right) -> Self {
        Self(Binop { left, right })
    }
}

/// Monitor instantiated from an [`Or`] formula.
#[derive(Debug, Clone)]
pub struct OrMonitor<Left, Right>(Binop<Left, Right>);

impl<Left, Right, State, Metric> Formula<State> for Or<Left, Right>
where
    Left: Formula<State, Metric = Metric>,
    Right: Formula<State, Metric = Metric>,
    Metric: Join,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Left::Error, Right::Error>;
    type Monitor = OrMonitor<Left::Monitor, Right::Monitor>;

    fn monitor(&self) -> Self::Monitor {
        OrMonitor(self.0.monitor::<State>())
    }
}

impl<Left, Right, State, Metric> Monitor<State> for OrMonitor<Left, Right>
where
    Left: Monitor<State, Metric = Metric>,
    Right: Monitor<State, Metric = Metric>,
    Metric: Join,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Left::Error, Right::Error>;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        let left = self.0.advance_left(time, state)?;
        let right = self.0.advance_right(time, state)?;

        Ok(Metric::max(&left, &right))
    }
}

/// First-order operator that requires both of its subformulas to hold, written `/\`, `&&`, or
/// `and`.
///
/// This operator evaluates each sample with both subformulas and takes the minimum of the two
/// metrics. The intuition behind this operator is that given two metrics where negative values
/// represent failure the operator should only return a positive value if both of its operands
/// are positive, mirroring the first-order logic behavior.
///
/// Here is an example evaluation of the conjunction operator:
///
/// | time | left | right | and  |
/// | ---- | ---- | ----- | ---- |
/// |  0.0 |  1.0 |   2.0 |  1.0 |
/// |  1.0 | -1.0 |   5.0 | -1.0 |
/// |  2.0 | -3.0 |  -1.0 | -3.0 |
///
/// The following is an example of creating a formula using the And operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::And;
///
/// let formula = And::new(atom("x"), atom("y"));
/// ```
#[derive(Debug, Clone)]
pub struct And<Left, Right>(Binop<Left, Right>);

impl<Left, Right> And<Left, Right> {
    pub fn new(left: Left, right: Right) -> Self {
        Self(Binop { left, right })
    }
}

/// Monitor instantiated from an [`And`] formula.
#[derive(Debug, Clone)]
pub struct AndMonitor<Left, Right>(Binop<Left, Right>);

impl<Left, Right, State, Metric> Formula<State> for And<Left, Right>
where
    Left: Formula<State, Metric = Metric>,
    Right: Formula<State, Metric = Metric>,
    Metric: Meet,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Left::Error, Right::Error>;
    type Monitor = AndMonitor<Left::Monitor, Right::Monitor>;

    fn monitor(&self) -> Self::Monitor {
        AndMonitor(self.0.monitor::<State>())
    }
}

impl<Left, Right, State, Metric> Monitor<State> for AndMonitor<Left, Right>
where
    Left: Monitor<State, Metric = Metric>,
    Right: Monitor<State, Metric = Metric>,
    Metric: Meet,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Left::Error, Right::Error>;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        let left = self.0.advance_left(time, state)?;
        let right = self.0.advance_right(time, state)?;

        Ok(Metric::min(&left, &right))
    }
}

/// First-order operator that requires the right subformula to hold if the left subformula holds,
/// written `->` or `implies`.
///
/// The implication operator is a binary operator, which means that it operates over two
/// subformulas. This operator evaluates each sample with both subformulas and takes the maximum
/// of the negation of the left metric and the right metric. The implication operator can be
/// represented as Or(Not(L), R), resulting in the behavior described above.
///
/// Here is an example evaluation of the implication operator:
///
/// | time | left | right | implies |
/// | ---- | ---- | ----- | ------- |
/// |  0.0 |  1.0 |   2.0 |     2.0 |
/// |  1.0 | -1.0 |   0.0 |     1.0 |
/// |  2.0 | -3.0 |  -1.0 |     3.0 |
///
/// The following is an example of creating a formula using the Implies operator:
///
/// ```rust
/// use fleance::atom;
/// use fleance::operators::Implies;
///
/// let formula = Implies::new(atom("x"), atom("y"));
/// ```
#[derive(Debug, Clone)]
pub struct Implies<Ante, Cons>(Binop<Ante, Cons>);

impl<Ante, Cons> Implies<Ante, Cons> {
    pub fn new(ante: Ante, cons: Cons) -> Self {
        Self(Binop { left: ante, right: cons })
    }
}

/// Monitor instantiated from an [`Implies`] formula.
#[derive(Debug, Clone)]
pub struct ImpliesMonitor<Ante, Cons>(Binop<Ante, Cons>);

impl<Ante, Cons, State, Metric> Formula<State> for Implies<Ante, Cons>
where
    Ante: Formula<State, Metric = Metric>,
    Cons: Formula<State, Metric = Metric>,
    Metric: Negation + Join,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Ante::Error, Cons::Error>;
    type Monitor = ImpliesMonitor<Ante::Monitor, Cons::Monitor>;

    fn monitor(&self) -> Self::Monitor {
        ImpliesMonitor(self.0.monitor::<State>())
    }
}

impl<Ante, Cons, State, Metric> Monitor<State> for ImpliesMonitor<Ante, Cons>
where
    Ante: Monitor<State, Metric = Metric>,
    Cons: Monitor<State, Metric = Metric>,
    Metric: Negation + Join,
{
    type Metric = Metric;
    type Error = BinaryOperatorError<Ante::Error, Cons::Error>;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        let ante = self.0.advance_left(time, state)?;
        let cons = self.0.advance_right(time, state)?;

        Ok(Metric::max(&ante.negation(), &cons))
    }
}

/// The error type for evaluating an [`Apply`] operator.
///
/// Wraps the error of the failing subformula together with its position in the operand list.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("subformula {index}: {error}")]
pub struct ApplyError<E> {
    /// The position of the failing subformula in the operand list.
    pub index: usize,

    /// The error produced by the failing subformula.
    pub error: E,
}

/// N-ary operator that combines the metrics of its subformulas with a caller-provided function.
///
/// `Apply` generalizes the fixed-arity operators: all subformulas observe every sample, and the
/// combining function receives the sample time together with the metrics in operand order. The
/// combining function must be pure; it is called exactly once per sample, after every subformula
/// has produced a metric.
///
/// Because the subformulas are stored in a `Vec`, they must all have the same type. Heterogenous
/// operand lists can be expressed with `Box<dyn Formula<...>>` operands or by nesting the binary
/// operators instead.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// use fleance::operators::Apply;
/// use fleance::{atom, Formula, Monitor};
///
/// // Robustness of the best two out of three signals.
/// let formula = Apply::new(vec![atom("x"), atom("y"), atom("z")], |_time, rhos: &[f64]| {
///     let mut sorted = rhos.to_vec();
///     sorted.sort_by(|a, b| b.total_cmp(a));
///     sorted[1]
/// });
///
/// let mut monitor = Formula::<HashMap<&str, f64>>::monitor(&formula);
/// let state = HashMap::from([("x", 1.0), ("y", 3.0), ("z", 2.0)]);
///
/// assert_eq!(monitor.advance(0.0, &state), Ok(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct Apply<F, C> {
    subformulas: Vec<F>,
    combine: C,
}

impl<F, C> Apply<F, C> {
    pub fn new(subformulas: Vec<F>, combine: C) -> Self {
        Self { subformulas, combine }
    }

    /// Return the number of subformulas the operator combines.
    pub fn len(&self) -> usize {
        self.subformulas.len()
    }

    /// Determine if the operator has any subformulas.
    pub fn is_empty(&self) -> bool {
        self.subformulas.is_empty()
    }
}

/// Monitor instantiated from an [`Apply`] formula.
#[derive(Debug, Clone)]
pub struct ApplyMonitor<M, C> {
    subformulas: Vec<M>,
    combine: C,
}

impl<F, C, State, Metric> Formula<State> for Apply<F, C>
where
    F: Formula<State, Metric = Metric>,
    C: Fn(f64, &[Metric]) -> Metric + Clone,
{
    type Metric = Metric;
    type Error = ApplyError<F::Error>;
    type Monitor = ApplyMonitor<F::Monitor, C>;

    fn monitor(&self) -> Self::Monitor {
        ApplyMonitor {
            subformulas: self.subformulas.iter().map(Formula::monitor).collect(),
            combine: self.combine.clone(),
        }
    }
}

impl<M, C, State, Metric> Monitor<State> for ApplyMonitor<M, C>
where
    M: Monitor<State, Metric = Metric>,
    C: Fn(f64, &[Metric]) -> Metric + Clone,
{
    type Metric = Metric;
    type Error = ApplyError<M::Error>;

    fn advance(&mut self, time: f64, state: &State) -> Result<Self::Metric, Self::Error> {
        let rhos = self
            .subformulas
            .iter_mut()
            .enumerate()
            .map(|(index, subformula)| {
                subformula
                    .advance(time, state)
                    .map_err(|error| ApplyError { index, error })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((self.combine)(time, &rhos))
    }
}

#[cfg(test)]
mod tests {
    use super::{And, Apply, ApplyError, BinaryOperatorError, Implies, Not, Or};
    use crate::operators::test::*;
    use crate::trace::Trace;
    use crate::{evaluate, EvaluationError};

    type BinopError = EvaluationError<BinaryOperatorError<ConstError, ConstError>>;

    #[test]
    fn not() -> Result<(), EvaluationError<ConstError>> {
        let input = Trace::from_iter([
            (0, 0.0),
            (1, 1.0),
            (2, 2.0),
            (3, 3.0),
        ]);

        let robustness = evaluate(&input, Not::new(Const))?;
        let expected = Trace::from_iter([
            (0, 0.0),
            (1, -1.0),
            (2, -2.0),
            (3, -3.0),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn or() -> Result<(), BinopError> {
        let input = Trace::from_iter([
            (0, (0.0, 1.0)),
            (1, (1.0, 0.0)),
            (2, (2.0, 4.0)),
            (3, (3.0, 6.0)),
        ]);

        let robustness = evaluate(&input, Or::new(ConstLeft, ConstRight))?;
        let expected = Trace::from_iter([
            (0, 1.0),
            (1, 1.0),
            (2, 4.0),
            (3, 6.0),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn and() -> Result<(), BinopError> {
        let input = Trace::from_iter([
            (0, (0.0, 1.0)),
            (1, (1.0, 0.0)),
            (2, (2.0, 4.0)),
            (3, (3.0, 6.0)),
        ]);

        let robustness = evaluate(&input, And::new(ConstLeft, ConstRight))?;
        let expected = Trace::from_iter([(0, 0.0), (1, 0.0), (2, 2.0), (3, 3.0)]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn implies() -> Result<(), BinopError> {
        let input = Trace::from_iter([
            (0, (0.0, 1.0)),
            (1, (1.0, 0.0)),
            (2, (-4.0, 2.0)),
            (3, (3.0, 6.0)),
        ]);

        let robustness = evaluate(&input, Implies::new(ConstLeft, ConstRight))?;
        let expected = Trace::from_iter([
            (0, 1.0),
            (1, 0.0),
            (2, 4.0),
            (3, 6.0),
        ]);

        assert_eq!(robustness, expected);
        Ok(())
    }

    #[test]
    fn boolean_collapse() -> Result<(), BinopError> {
        let input = Trace::from_iter([
            (0, (true, false)),
            (1, (true, true)),
            (2, (false, false)),
        ]);

        let conjunction = evaluate(&input, And::new(ConstLeft, ConstRight))?;
        let disjunction = evaluate(&input, Or::new(ConstLeft, ConstRight))?;

        assert_eq!(conjunction, Trace::from_iter([(0, false), (1, true), (2, false)]));
        assert_eq!(disjunction, Trace::from_iter([(0, true), (1, true), (2, false)]));
        Ok(())
    }

    #[test]
    fn apply() -> Result<(), EvaluationError<ApplyError<ConstError>>> {
        let input = Trace::from_iter([
            (0, 2.0),
            (1, -1.0),
            (2, 0.5),
        ]);

        let formula = Apply::new(vec![Const, Const, Const], |_, rhos: &[f64]| {
            rhos.iter().sum::<f64>() / rhos.len() as f64
        });

        let robustness = evaluate(&input, formula)?;
        let expected = Trace::from_iter([(0, 2.0), (1, -1.0), (2, 0.5)]);

        assert_eq!(robustness, expected);
        Ok(())
    }
}
