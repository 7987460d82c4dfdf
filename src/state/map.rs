//! A map from location to the symbolic state reached there, merging
//! federations at insertion (§4.4).

use std::collections::BTreeMap;

use super::SymbolicState;
use crate::automaton::LocationId;
use crate::error::DbmError;
use crate::federation::Federation;

#[derive(Debug, Clone)]
pub struct StateMap<S: SymbolicState> {
    states: BTreeMap<LocationId, S>,
}

impl<S: SymbolicState> StateMap<S> {
    pub fn new() -> StateMap<S> {
        StateMap { states: BTreeMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn has_state(&self, location: LocationId) -> bool {
        self.states.contains_key(&location)
    }

    pub fn at(&self, location: LocationId) -> Option<&S> {
        self.states.get(&location)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LocationId, &S)> {
        self.states.iter()
    }

    pub fn locations(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.states.keys().copied()
    }

    /// Insert `state`, unioning its federation into any state already
    /// held at that location. Returns whether the map actually grew
    /// (a fresh location, or a union that was not already subsumed).
    /// The fixed point in [crate::fixed_point] uses this to detect
    /// convergence.
    pub fn insert(&mut self, state: S) -> bool {
        match self.states.get_mut(&state.location()) {
            None => {
                self.states.insert(state.location(), state);
                true
            }
            Some(existing) => {
                if state.is_included_in(existing) {
                    return false;
                }
                existing.federation_mut().union_federation(state.federation(), Federation::DEFAULT_CAPACITY);
                true
            }
        }
    }

    pub fn remove(&mut self, location: LocationId) -> Option<S> {
        self.states.remove(&location)
    }

    /// Remove and return an arbitrary entry (used by the fixed-point
    /// worklist, which doesn't care about iteration order).
    pub fn pop(&mut self) -> Option<S> {
        let location = *self.states.keys().next()?;
        self.states.remove(&location)
    }

    /// Restrict every state in `self` to the corresponding state in
    /// `other`, dropping locations `other` does not hold.
    pub fn intersection(&mut self, other: &StateMap<S>) -> Result<(), DbmError> {
        let mut out = BTreeMap::new();
        for (location, state) in self.states.iter() {
            if let Some(other_state) = other.at(*location) {
                let mut merged = state.clone();
                merged.intersection(other_state)?;
                if !merged.is_empty() {
                    out.insert(*location, merged);
                }
            }
        }
        self.states = out;
        Ok(())
    }

    /// Approximate equality: same set of locations, pairwise
    /// approximately-equal federations.
    pub fn equals(&self, other: &StateMap<S>) -> bool {
        if self.states.len() != other.states.len() {
            return false;
        }
        self.states.iter().all(|(loc, s)| match other.at(*loc) {
            Some(o) => s.federation().is_approx_equal(o.federation()),
            None => false,
        })
    }
}

impl<S: SymbolicState> Default for StateMap<S> {
    fn default() -> StateMap<S> {
        StateMap::new()
    }
}
