//! Sliding-window minimum tracking for bounded past-time operators.
//!
//! A bounded [`Historically`](crate::operators::Historically) operator must answer, at every
//! sample, the question "what is the smallest operand value whose sample time still lies inside
//! the lookback window?". Recomputing that minimum from the raw samples would cost time and
//! memory proportional to the window length. [`MinWindow`] instead retains only the samples that
//! can still become the answer of some future query, which bounds both memory and amortized time
//! by the number of *distinct relevant* pushes.
//!
//! # Retention discipline
//!
//! A [`Lookback`] with offsets `(start, end)` declares that a query at time `t` covers the
//! pushes whose times lie in `[t - end, t - start]`. Equivalently, a push at time `p` is
//! *observable* during the query interval `[p + start, p + end]`. The tracker therefore keeps
//! each push together with the interval of query times it can answer for; the intervals of
//! successive pushes partition the observable timeline, and every query time outside of them
//! answers with the identity sentinel [`Top`].
//!
//! Two rules keep the retained set small:
//!
//!   1. When a push becomes observable, every earlier retained push with a greater or equal
//!      value is discarded. The newer, smaller push is observable for strictly longer, so the
//!      discarded pushes can never again be the window minimum.
//!   2. When time advances, pushes whose observation interval has fully aged out are discarded
//!      from the old end.
//!
//! After rule 1 the retained values are strictly increasing from oldest to newest — scanned
//! backward from the most recent push, each older interval holds a strictly smaller value — so
//! the window minimum is always the oldest retained push that is observable now. Each push is
//! inserted once and removed at most once, so any sequence of N operations performs O(N)
//! interval mutations in total.
//!
//! Pushes that are not yet observable (`start > 0` delays a push's effect by `start` time units)
//! wait in arrival order and enter the retained set once time reaches them.
//!
//! # Example
//!
//! ```rust
//! use fleance::{Lookback, MinWindow};
//!
//! let mut window: MinWindow<f64> = MinWindow::new(Lookback::new(1.0, 4.0).unwrap());
//!
//! // A push is not observable at its own time when start > 0.
//! window.push(0.0, 2.0);
//! assert_eq!(window.query(0.0), f64::INFINITY);
//!
//! // At time 2.0 the window covers push times [-2.0, 1.0].
//! window.push(2.0, 1.0);
//! window.step(2.0);
//! assert_eq!(window.query(2.0), 2.0);
//! ```
//!
//! # Safety
//!
//! Metric values are compared with [`PartialOrd`]; pushing a NaN metric leaves the retained
//! ordering undefined. Expressions that can produce NaN (see
//! [`Predicate`](crate::predicate::Predicate)) reject it before it reaches a window.

use std::collections::VecDeque;

use thiserror::Error;

use crate::metrics::Top;
use crate::NonMonotonicTime;

/// The error type for a lookback window whose offsets do not describe a valid time range.
///
/// Produced by [`Lookback::new`] at construction time, before any sample is processed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("misconfigured lookback window [{start}, {end}]: offsets must satisfy 0 <= start < end")]
pub struct WindowError {
    /// The offset of the near (most recent) edge of the window.
    pub start: f64,

    /// The offset of the far (oldest) edge of the window.
    pub end: f64,
}

/// Time offsets delimiting a past-time window.
///
/// A lookback `(start, end)` observed at time `t` covers the closed time range
/// `[t - end, t - start]`. The far offset `end` may be infinite, in which case the window
/// stretches back to the beginning of the stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lookback {
    start: f64,
    end: Option<f64>,
}

impl Lookback {
    /// Create a lookback window from its near and far offsets.
    ///
    /// The offsets must satisfy `0 <= start < end`; `end` may be [`f64::INFINITY`] for a window
    /// without a far edge. Invalid offsets fail with [`WindowError`] immediately, before any
    /// sample is processed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fleance::Lookback;
    ///
    /// let bounded = Lookback::new(0.0, 3.0).unwrap();
    /// let open = Lookback::new(1.0, f64::INFINITY).unwrap();
    ///
    /// assert!(Lookback::new(3.0, 3.0).is_err());
    /// assert!(Lookback::new(-1.0, 3.0).is_err());
    /// ```
    pub fn new(start: f64, end: f64) -> Result<Self, WindowError> {
        if start.is_finite() && start >= 0.0 && start < end {
            Ok(Self {
                start,
                end: end.is_finite().then_some(end),
            })
        } else {
            Err(WindowError { start, end })
        }
    }

    /// Create a lookback window with no far edge, equivalent to `Lookback::new(start, f64::INFINITY)`.
    pub fn unbounded(start: f64) -> Result<Self, WindowError> {
        Self::new(start, f64::INFINITY)
    }

    /// Return the offset of the near edge of the window.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Return the offset of the far edge of the window, or [`None`] if the window has no far
    /// edge.
    pub fn end(&self) -> Option<f64> {
        self.end
    }
}

impl TryFrom<(f64, f64)> for Lookback {
    type Error = WindowError;

    fn try_from((start, end): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

/// A push together with the interval of query times it can answer for.
#[derive(Debug, Clone)]
struct Entry<M> {
    observable_from: f64,
    expires_at: f64,
    value: M,
}

/// Tracker answering sliding-window minimum queries over a stream of timed pushes.
///
/// See the [`window`](self) module documentation for the retention discipline and complexity
/// guarantees.
#[derive(Debug, Clone)]
pub struct MinWindow<M> {
    lookback: Lookback,
    pending: VecDeque<Entry<M>>,
    retained: VecDeque<Entry<M>>,
    last_time: Option<f64>,
}

impl<M> MinWindow<M>
where
    M: Top + PartialOrd + Clone,
{
    /// Create an empty tracker for the given lookback window.
    pub fn new(lookback: Lookback) -> Self {
        Self {
            lookback,
            pending: VecDeque::new(),
            retained: VecDeque::new(),
            last_time: None,
        }
    }

    /// Return the lookback window this tracker was configured with.
    pub fn lookback(&self) -> Lookback {
        self.lookback
    }

    /// Number of pushes currently held by the tracker, observable or pending.
    pub fn len(&self) -> usize {
        self.pending.len() + self.retained.len()
    }

    /// Determine if the tracker holds any pushes.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.retained.is_empty()
    }

    /// Record the value `value` pushed at time `time`.
    ///
    /// The push becomes observable to queries at `time + start` and ages out after
    /// `time + end`. Pushes must arrive in increasing time order; [`update`](MinWindow::update)
    /// enforces this, `push` itself does not.
    pub fn push(&mut self, time: f64, value: M) {
        let entry = Entry {
            observable_from: time + self.lookback.start,
            expires_at: match self.lookback.end {
                Some(end) => time + end,
                None => f64::INFINITY,
            },
            value,
        };

        self.pending.push_back(entry);
        self.admit(time);
    }

    /// Move pending pushes that have become observable at `time` into the retained set,
    /// discarding every earlier retained push they dominate.
    fn admit(&mut self, time: f64) {
        while self.pending.front().map_or(false, |entry| entry.observable_from <= time) {
            if let Some(entry) = self.pending.pop_front() {
                while self.retained.back().map_or(false, |back| back.value >= entry.value) {
                    self.retained.pop_back();
                }

                self.retained.push_back(entry);
            }
        }
    }

    /// Advance the current time to `time`, discarding pushes that have fully aged out of the
    /// window.
    pub fn step(&mut self, time: f64) {
        self.admit(time);

        while self.retained.front().map_or(false, |entry| entry.expires_at < time) {
            self.retained.pop_front();
        }
    }

    /// Return the minimum over the pushes observable at `time`, or the identity sentinel
    /// [`Top`] if no push is observable.
    ///
    /// The oldest retained observable push is the answer: retained values are strictly
    /// increasing from oldest to newest, so everything behind it is larger.
    pub fn query(&self, time: f64) -> M {
        self.retained
            .iter()
            .find(|entry| entry.observable_from <= time && entry.expires_at >= time)
            .map(|entry| entry.value.clone())
            .unwrap_or_else(M::top)
    }

    /// Push `value` at `time`, advance the window to `time`, and return the minimum over the
    /// retained window.
    ///
    /// Fails with [`NonMonotonicTime`] if `time` is not strictly greater than the time of the
    /// previous `update` call.
    pub fn update(&mut self, time: f64, value: M) -> Result<M, NonMonotonicTime> {
        if let Some(previous) = self.last_time {
            if time <= previous {
                return Err(NonMonotonicTime { previous, current: time });
            }
        }

        self.last_time = Some(time);
        self.push(time, value);
        self.step(time);

        Ok(self.query(time))
    }
}
