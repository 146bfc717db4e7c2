//! Lattice traits for the metric values produced by monitors.
//!
//! A monitor tree produces values of a single metric type. The operators place only the trait
//! bounds they actually need on that type: conjunction requires [`Meet`], disjunction requires
//! [`Join`], negation requires [`Negation`], and the temporal operators additionally need the
//! identity element [`Top`]. Implementations are provided for `f64` (real-valued robustness,
//! larger meaning more satisfied) and `bool` (the boolean collapse, where the same operators
//! become AND, OR, and NOT).
//!
//! Because every operator in a formula shares one metric type parameter, a formula mixing real
//! and boolean metrics is rejected at compile time.

/// Trait representing a type with a global maximum.
///
/// The value returned by the `top` method should be greater than all other values in the type:
/// there should be no other value `v` such that `v > top`. For a monitor, `top` is the identity
/// of conjunction, meaning "no constraint observed yet".
pub trait Top {
    /// Compute the global maximum for the type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleance::Top;
    /// let top = f64::top();  // f64::INFINITY
    /// ```
    fn top() -> Self;
}

/// Trait representing a type with a global minimum.
///
/// The value returned by the `bottom` method should be less than all other values in the type:
/// there should be no other value `v` such that `v < bottom`. `bottom` is the identity of
/// disjunction.
pub trait Bottom {
    /// Compute the global minimum value for the type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleance::Bottom;
    /// let bottom = f64::bottom();  // f64::NEG_INFINITY
    /// ```
    fn bottom() -> Self;
}

/// Trait representing a type that can compute the [infimum] of two values.
///
/// For a [`PartialOrd`] type the output of [`Meet::min`] for values `a` and `b` should be a value
/// `v*` such that `v* <= a`, `v* <= b`, and `v*` is greater than or equal to every other member
/// of the type that is also less than or equal to `a` and `b`. Types implementing this trait form
/// a [meet] semi-lattice, hence the name. For `bool`, the infimum coincides with logical AND.
///
/// [`Meet::min`] takes its parameters by reference to avoid copying for a function that is not
/// required to return one of its arguments.
///
/// [infimum]: https://en.wikipedia.org/wiki/Infimum_and_supremum
/// [meet]: https://en.wikipedia.org/wiki/Join_and_meet
pub trait Meet: PartialOrd {
    /// This method returns the infimum of two values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleance::Meet;
    /// let inf = Meet::min(&1.0, &2.0);  // 1.0
    /// ```
    fn min(&self, other: &Self) -> Self;
}

/// Trait representing a type that can compute the [supremum] of two values.
///
/// For a [`PartialOrd`] type the output of [`Join::max`] for values `a` and `b` should be a value
/// `v*` such that `v* >= a`, `v* >= b`, and `v*` is less than or equal to every other member of
/// the type that is also greater than or equal to `a` and `b`. Types implementing this trait form
/// a [join] semi-lattice. For `bool`, the supremum coincides with logical OR.
///
/// [supremum]: https://en.wikipedia.org/wiki/Infimum_and_supremum
/// [join]: https://en.wikipedia.org/wiki/Join_and_meet
pub trait Join: PartialOrd {
    /// This method returns the supremum of two values.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleance::Join;
    /// let sup = Join::max(&1.0, &2.0);  // 2.0
    /// ```
    fn max(&self, other: &Self) -> Self;
}

/// Trait representing a type whose values can be inverted.
///
/// Negation must mirror the representation of the metric: arithmetic negation for real-valued
/// robustness and logical complement for booleans. This trait exists instead of a bound on
/// [`std::ops::Neg`] because `bool` does not implement `Neg`.
///
/// Negation must be an involution (`m.negation().negation() == m`) and must exchange [`Meet`]
/// and [`Join`]: `Meet::min(&a, &b).negation() == Join::max(&a.negation(), &b.negation())`. The
/// past-time operators rely on this duality.
pub trait Negation {
    /// Return the inverse of the value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fleance::Negation;
    /// let neg = 1.0.negation();   // -1.0
    /// let inv = true.negation();  // false
    /// ```
    fn negation(&self) -> Self;
}

impl Top for f64 {
    fn top() -> Self {
        f64::INFINITY
    }
}

impl Bottom for f64 {
    fn bottom() -> Self {
        f64::NEG_INFINITY
    }
}

impl Meet for f64 {
    fn min(&self, other: &Self) -> Self {
        f64::min(*self, *other)
    }
}

impl Join for f64 {
    fn max(&self, other: &Self) -> Self {
        f64::max(*self, *other)
    }
}

impl Negation for f64 {
    fn negation(&self) -> Self {
        -self
    }
}

impl Top for bool {
    fn top() -> Self {
        true
    }
}

impl Bottom for bool {
    fn bottom() -> Self {
        false
    }
}

impl Meet for bool {
    fn min(&self, other: &Self) -> Self {
        *self && *other
    }
}

impl Join for bool {
    fn max(&self, other: &Self) -> Self {
        *self || *other
    }
}

impl Negation for bool {
    fn negation(&self) -> Self {
        !self
    }
}

#[cfg(test)]
mod tests {
    use super::{Bottom, Join, Meet, Negation, Top};

    #[test]
    fn boolean_lattice() {
        assert!(bool::top());
        assert!(!bool::bottom());

        assert!(!Meet::min(&true, &false));
        assert!(Meet::min(&true, &true));
        assert!(Join::max(&true, &false));
        assert!(!Join::max(&false, &false));
    }

    #[test]
    fn negation_exchanges_meet_and_join() {
        let values = [-2.5, 0.0, 1.0, f64::INFINITY];

        for a in values {
            for b in values {
                assert_eq!(Meet::min(&a, &b).negation(), Join::max(&a.negation(), &b.negation()));
            }
        }

        for a in [false, true] {
            for b in [false, true] {
                assert_eq!(Meet::min(&a, &b).negation(), Join::max(&a.negation(), &b.negation()));
            }
        }
    }
}
