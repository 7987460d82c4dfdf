//! Error types surfaced synchronously at every fallible boundary (§7).
//!
//! Each fallible subsystem gets its own `thiserror`-derived enum,
//! composed upward with `#[from]` so a caller can match on the
//! subsystem that actually failed.

use thiserror::Error;

use crate::time::Time;

/// Errors raised by DBM/federation construction and operations.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum DbmError {
    /// An operation combined two DBMs/federations of different dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A clock index was out of range for the DBM's dimension.
    #[error("clock index {index} out of range for dimension {dimension}")]
    ClockOutOfRange { index: usize, dimension: usize },
}

/// Errors raised by timed-automaton construction (product, divergence
/// synthesis, inactive-clock analysis).
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AutomatonError {
    /// Propagated from the underlying DBM/federation layer.
    #[error(transparent)]
    Dbm(#[from] DbmError),

    /// An edge or invariant referenced a location id absent from the
    /// automaton's location map.
    #[error("unknown location id {0}")]
    UnknownLocation(u32),

    /// The automaton's initial location id was not one of its locations.
    #[error("initial location {0} is not a declared location")]
    UnknownInitialLocation(u32),
}

/// Errors raised by [crate::monitor] construction and observation.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum MonitorError {
    /// Propagated from automaton/product construction.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),

    /// A malformed or non-monotonic observation (§7 BadInput).
    #[error("observation at time {given} precedes the current global clock ({current})")]
    NonMonotonicTime { given: Time, current: Time },

    /// An observation named a label outside the monitored alphabet,
    /// while the monitor is configured in strict mode.
    #[error("label {0:?} is not in the monitored alphabet")]
    UnknownLabel(String),

    /// Both sides of a dual monitor became empty after the same
    /// observation (§7 BothOut). Fatal: the monitor must not process
    /// further observations.
    #[error("both the property and its negation became empty after the same observation; the two automata are not complementary for this trace")]
    BothOut,

    /// One side's accept-reachable set was already empty at
    /// construction time (§7 EmptyFixedPoint).
    #[error("the accept-reachable state space of the {side} automaton is empty")]
    EmptyFixedPoint { side: &'static str },

    /// A `MULTI`-typed observation was presented (§4.6, §9 Open Questions).
    #[error("the MULTI input kind is not supported: its semantics for concurrent same-instant transitions are undefined")]
    UnsupportedInputKind,

    /// A configuration option was set for a flavor of monitor that
    /// cannot use it (e.g. `jitter_i` without the `testing` flavor).
    #[error("invalid monitor configuration: {0}")]
    InvalidConfig(String),
}
