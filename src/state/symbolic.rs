//! The plain symbolic flavor (§3, §4.4): one extra dimension pins the
//! elapsed global time exactly, matching an ordinary timed-automaton run
//! with no observation latency.

use super::SymbolicState;
use crate::automaton::{Edge, LocationId};
use crate::dbm::Constraint;
use crate::error::DbmError;
use crate::federation::Federation;
use crate::time::{Time, TimeInterval};

#[derive(Debug, Clone)]
pub struct Symbolic {
    location: LocationId,
    federation: Federation,
    /// Index of the extra "elapsed time" dimension.
    gtime: usize,
}

impl Symbolic {
    pub fn new(location: LocationId, automaton_dim: usize) -> Symbolic {
        Symbolic {
            location,
            federation: Federation::singleton(crate::dbm::Dbm::zero(automaton_dim + 1)),
            gtime: automaton_dim,
        }
    }
}

impl SymbolicState for Symbolic {
    fn location(&self) -> LocationId {
        self.location
    }

    fn set_location(&mut self, location: LocationId) {
        self.location = location;
    }

    fn federation(&self) -> &Federation {
        &self.federation
    }

    fn federation_mut(&mut self) -> &mut Federation {
        &mut self.federation
    }

    fn unconstrained(location: LocationId, automaton_dim: usize) -> Symbolic {
        let dim = automaton_dim + 1;
        Symbolic {
            location,
            federation: Federation::singleton(crate::dbm::Dbm::unconstrained(dim)),
            gtime: automaton_dim,
        }
    }

    fn delay(&mut self, value: Time) {
        self.federation.future();
        let _ = self.federation.restrict(Constraint::lower_non_strict(self.gtime, value));
        let _ = self.federation.restrict(Constraint::upper_non_strict(self.gtime, value));
    }

    fn delay_interval(&mut self, interval: TimeInterval) {
        self.federation.future();
        let _ = self.federation.restrict(Constraint::lower_non_strict(self.gtime, interval.lo));
        let _ = self.federation.restrict(Constraint::upper_non_strict(self.gtime, interval.hi));
    }

    fn do_transition(&self, edge: &Edge) -> Result<Option<Symbolic>, DbmError> {
        let mut next = self.clone();
        next.federation.restrict_all(edge.guard())?;
        if next.federation.is_empty() {
            return Ok(None);
        }
        next.federation.assign_zero_all(edge.reset())?;
        next.location = edge.to();
        Ok(Some(next))
    }

    fn do_transition_backward(&self, edge: &Edge) -> Result<Option<Symbolic>, DbmError> {
        let mut pred = self.clone();
        pred.federation.past();
        for &x in edge.reset() {
            pred.federation.restrict(Constraint::upper_non_strict(x, 0))?;
        }
        pred.federation.free_all(edge.reset())?;
        pred.federation.restrict_all(edge.guard())?;
        pred.federation.past();
        if pred.federation.is_empty() {
            return Ok(None);
        }
        pred.location = edge.from();
        Ok(Some(pred))
    }
}
