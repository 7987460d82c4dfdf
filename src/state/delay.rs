//! The delay flavor (§4.4): models a single observation channel whose
//! reported event time lags the true global time by a bounded, jittered
//! latency. Two extra dimensions track this: `event_time` (the channel's
//! own clock, left free at construction and pinned on every `delay`) and
//! `global_time` (bound to `event_time` only by the initial latency
//! window).

use super::SymbolicState;
use crate::automaton::{Edge, LocationId};
use crate::dbm::{Constraint, Dbm};
use crate::error::DbmError;
use crate::federation::Federation;
use crate::time::{Time, TimeInterval};

#[derive(Debug, Clone)]
pub struct Delay {
    location: LocationId,
    federation: Federation,
    event_time: usize,
    global_time: usize,
    jitter: Time,
}

impl Delay {
    /// `latency` bounds `global_time - event_time` at construction;
    /// `jitter` widens the lower bound of every subsequent `delay`.
    pub fn new(location: LocationId, automaton_dim: usize, latency: TimeInterval, jitter: Time) -> Delay {
        let event_time = automaton_dim;
        let global_time = automaton_dim + 1;
        let mut federation = Federation::singleton(Dbm::zero(automaton_dim + 2));
        federation.free(event_time).expect("event_time is within the new dimension");
        federation
            .restrict(Constraint::new(global_time, event_time, crate::bound::Bound::non_strict(latency.lo as i64)))
            .expect("initial latency window is satisfiable on an unconstrained zero state");
        federation
            .restrict(Constraint::new(event_time, global_time, crate::bound::Bound::non_strict(latency.hi as i64)))
            .expect("initial latency window is satisfiable on an unconstrained zero state");
        Delay {
            location,
            federation,
            event_time,
            global_time,
            jitter,
        }
    }
}

impl SymbolicState for Delay {
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

    fn unconstrained(location: LocationId, automaton_dim: usize) -> Delay {
        Delay {
            location,
            federation: Federation::singleton(Dbm::unconstrained(automaton_dim + 2)),
            event_time: automaton_dim,
            global_time: automaton_dim + 1,
            jitter: 0,
        }
    }

    /// Pin `event_time` to `[value - jitter, value]`: the observed event
    /// happened at `value`, but the channel's own clock may lag by up to
    /// `jitter` on top of the static latency window already in force.
    fn delay(&mut self, value: Time) {
        self.federation.future();
        let lo = value.saturating_sub(self.jitter);
        let _ = self.federation.restrict(Constraint::lower_non_strict(self.event_time, lo as i64));
        let _ = self.federation.restrict(Constraint::upper_non_strict(self.event_time, value as i64));
    }

    fn delay_interval(&mut self, interval: TimeInterval) {
        self.federation.future();
        let lo = interval.lo.saturating_sub(self.jitter);
        let _ = self.federation.restrict(Constraint::lower_non_strict(self.event_time, lo as i64));
        let _ = self.federation.restrict(Constraint::upper_non_strict(self.event_time, interval.hi as i64));
    }

    fn do_transition(&self, edge: &Edge) -> Result<Option<Delay>, DbmError> {
        let mut next = self.clone();
        next.federation.restrict_all(edge.guard())?;
        if next.federation.is_empty() {
            return Ok(None);
        }
        next.federation.assign_zero_all(edge.reset())?;
        next.location = edge.to();
        Ok(Some(next))
    }

    fn do_transition_backward(&self, edge: &Edge) -> Result<Option<Delay>, DbmError> {
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
