/*! Symbolic states: a location paired with a federation over the
automaton's clocks plus flavor-specific bookkeeping dimensions (§3, §4.4).

Four flavors share the [SymbolicState] interface but disagree on what
"now" means relative to an observation:

- [symbolic::Symbolic]: the plain flavor. One extra dimension pins the
  elapsed global time exactly, as in an ordinary timed-automaton run.
- [delay::Delay]: two extra dimensions model a single observation
  channel whose reported event time lags the true time by a bounded,
  jittered latency.
- [testing::Testing]: three extra dimensions split that latency into
  independent input and output channels.
- [concrete::Concrete]: a single clock valuation rather than a
  federation, with emptiness tracked explicitly rather than inferred
  from the valuation's shape.

[StateMap] collects the reachable states of one flavor across all
locations, merging federations at insertion.
*/

pub mod concrete;
pub mod delay;
pub mod map;
pub mod symbolic;
pub mod testing;

pub use concrete::Concrete;
pub use delay::Delay;
pub use map::StateMap;
pub use symbolic::Symbolic;
pub use testing::Testing;

use crate::automaton::{Edge, LocationId};
use crate::dbm::Constraint;
use crate::error::DbmError;
use crate::federation::{Federation, Relation};
use crate::time::{ClockIndex, Time, TimeInterval};

/// Common interface over the symbolic flavors (§4.4). Each flavor owns a
/// [Federation] over `automaton clocks + flavor-specific extra
/// dimensions`; the trait's default methods delegate straight to the
/// federation and only `delay`, `do_transition`, and
/// `do_transition_backward` need flavor-specific bodies.
pub trait SymbolicState: Clone + std::fmt::Debug {
    fn location(&self) -> LocationId;

    fn set_location(&mut self, location: LocationId);

    fn federation(&self) -> &Federation;

    fn federation_mut(&mut self) -> &mut Federation;

    /// Build an unconstrained state at `location` over `automaton_dim`
    /// automaton clocks (the flavor adds its own extra dimensions).
    fn unconstrained(location: LocationId, automaton_dim: usize) -> Self;

    fn is_empty(&self) -> bool {
        self.federation().is_empty()
    }

    fn restrict_all(&mut self, cs: &[Constraint]) -> Result<(), DbmError> {
        self.federation_mut().restrict_all(cs)
    }

    fn assign_zero_all(&mut self, clocks: &[ClockIndex]) -> Result<(), DbmError> {
        self.federation_mut().assign_zero_all(clocks)
    }

    /// Let time pass by exactly `value` since the last observation.
    fn delay(&mut self, value: Time);

    /// Let time pass by an interval rather than a point (§4.6 interval
    /// inputs).
    fn delay_interval(&mut self, interval: TimeInterval);

    fn intersection(&mut self, other: &Self) -> Result<(), DbmError> {
        self.federation_mut().intersection_federation(other.federation(), Federation::DEFAULT_CAPACITY)
    }

    fn relation(&self, other: &Self) -> Relation {
        if self.location() != other.location() {
            return Relation::Different;
        }
        self.federation().relation(other.federation())
    }

    fn is_included_in(&self, other: &Self) -> bool {
        matches!(self.relation(other), Relation::Equal | Relation::Subset)
    }

    /// Forward step along `edge`: restrict by its guard, zero its reset
    /// clocks, move to `edge.to()`. Returns the successor, or `None` if
    /// the guard leaves nothing satisfiable.
    fn do_transition(&self, edge: &Edge) -> Result<Option<Self>, DbmError>;

    /// Backward step along `edge`, used by the accept-reachability fixed
    /// point (§4.5): from a state already at `edge.to()`, recover the
    /// predecessor at `edge.from()` by freeing the reset clocks (their
    /// pre-reset value is unconstrained) and then restricting by the
    /// guard.
    fn do_transition_backward(&self, edge: &Edge) -> Result<Option<Self>, DbmError>;
}
