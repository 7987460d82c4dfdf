//! The testing flavor (§4.4): like [super::delay::Delay] but with
//! separate input and output observation channels, each with its own
//! latency window and jitter, and an explicit mode bit recording which
//! channel the next observation is expected on.

use super::SymbolicState;
use crate::automaton::{Edge, LocationId};
use crate::dbm::{Constraint, Dbm};
use crate::error::DbmError;
use crate::federation::Federation;
use crate::time::{Time, TimeInterval};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Input,
    Output,
}

#[derive(Debug, Clone)]
pub struct Testing {
    location: LocationId,
    federation: Federation,
    /// Index of the input channel's event-time dimension.
    etime_i: usize,
    /// Index of the output channel's event-time dimension.
    etime_o: usize,
    /// Index of the shared global-time dimension.
    gtime: usize,
    jitter_i: Time,
    jitter_o: Time,
    mode: Channel,
}

impl Testing {
    pub fn new(
        location: LocationId,
        automaton_dim: usize,
        latency_i: TimeInterval,
        latency_o: TimeInterval,
        jitter_i: Time,
        jitter_o: Time,
    ) -> Testing {
        let etime_i = automaton_dim;
        let etime_o = automaton_dim + 1;
        let gtime = automaton_dim + 2;
        let mut federation = Federation::singleton(Dbm::zero(automaton_dim + 3));
        federation.free(etime_i).expect("etime_i is within the new dimension");
        federation.free(etime_o).expect("etime_o is within the new dimension");
        for (etime, latency) in [(etime_i, latency_i), (etime_o, latency_o)] {
            federation
                .restrict(Constraint::new(gtime, etime, crate::bound::Bound::non_strict(latency.lo as i64)))
                .expect("initial latency window is satisfiable on an unconstrained zero state");
            federation
                .restrict(Constraint::new(etime, gtime, crate::bound::Bound::non_strict(latency.hi as i64)))
                .expect("initial latency window is satisfiable on an unconstrained zero state");
        }
        Testing {
            location,
            federation,
            etime_i,
            etime_o,
            gtime,
            jitter_i,
            jitter_o,
            mode: Channel::Input,
        }
    }

    pub fn mode(&self) -> Channel {
        self.mode
    }

    pub fn expect_input(&mut self) {
        self.mode = Channel::Input;
    }

    pub fn expect_output(&mut self) {
        self.mode = Channel::Output;
    }

    pub fn switch_input_mode(&mut self) {
        self.mode = match self.mode {
            Channel::Input => Channel::Output,
            Channel::Output => Channel::Input,
        };
    }

    fn active_channel(&self) -> (usize, Time) {
        match self.mode {
            Channel::Input => (self.etime_i, self.jitter_i),
            Channel::Output => (self.etime_o, self.jitter_o),
        }
    }
}

impl SymbolicState for Testing {
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

    fn unconstrained(location: LocationId, automaton_dim: usize) -> Testing {
        Testing {
            location,
            federation: Federation::singleton(Dbm::unconstrained(automaton_dim + 3)),
            etime_i: automaton_dim,
            etime_o: automaton_dim + 1,
            gtime: automaton_dim + 2,
            jitter_i: 0,
            jitter_o: 0,
            mode: Channel::Input,
        }
    }

    /// Pin the active channel's event-time dimension to `[value -
    /// jitter, value]`, leaving the other channel's dimension
    /// unconstrained by this observation.
    fn delay(&mut self, value: Time) {
        self.federation.future();
        let (etime, jitter) = self.active_channel();
        let lo = value.saturating_sub(jitter);
        let _ = self.federation.restrict(Constraint::lower_non_strict(etime, lo as i64));
        let _ = self.federation.restrict(Constraint::upper_non_strict(etime, value as i64));
    }

    fn delay_interval(&mut self, interval: TimeInterval) {
        self.federation.future();
        let (etime, jitter) = self.active_channel();
        let lo = interval.lo.saturating_sub(jitter);
        let _ = self.federation.restrict(Constraint::lower_non_strict(etime, lo as i64));
        let _ = self.federation.restrict(Constraint::upper_non_strict(etime, interval.hi as i64));
    }

    fn do_transition(&self, edge: &Edge) -> Result<Option<Testing>, DbmError> {
        let mut next = self.clone();
        next.federation.restrict_all(edge.guard())?;
        if next.federation.is_empty() {
            return Ok(None);
        }
        next.federation.assign_zero_all(edge.reset())?;
        next.location = edge.to();
        Ok(Some(next))
    }

    fn do_transition_backward(&self, edge: &Edge) -> Result<Option<Testing>, DbmError> {
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
