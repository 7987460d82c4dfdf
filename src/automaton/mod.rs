/*! Timed automata: locations, edges, and the product/divergence
constructions used to conjoin a property with an assumption or a
time-divergence enforcer (§3, §4.3).

A [TimedAutomaton] is immutable after construction: all derived indices
(`edges_to`, `edges_from`, inactive-clock sets) are computed once in
[TimedAutomaton::new] and never recomputed. */

use std::collections::{BTreeMap, BTreeSet};

use crate::dbm::Constraint;
use crate::error::AutomatonError;
use crate::time::ClockIndex;

mod divergence;
mod inactive;
mod product;

pub use divergence::time_divergence_automaton;
pub use product::product;

/// A dense location identifier.
pub type LocationId = u32;

/// `(id, name, accept, invariant)` (§3).
#[derive(Debug, Clone)]
pub struct Location {
    id: LocationId,
    name: String,
    accept: bool,
    invariant: Vec<Constraint>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, accept: bool, invariant: Vec<Constraint>) -> Location {
        Location {
            id,
            name: name.into(),
            accept,
            invariant,
        }
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accept(&self) -> bool {
        self.accept
    }

    pub fn invariant(&self) -> &[Constraint] {
        &self.invariant
    }
}

/// `(from, to, guard, reset, label)` (§3).
#[derive(Debug, Clone)]
pub struct Edge {
    from: LocationId,
    to: LocationId,
    guard: Vec<Constraint>,
    reset: Vec<ClockIndex>,
    label: String,
}

impl Edge {
    pub fn new(
        from: LocationId,
        to: LocationId,
        guard: Vec<Constraint>,
        reset: Vec<ClockIndex>,
        label: impl Into<String>,
    ) -> Edge {
        Edge {
            from,
            to,
            guard,
            reset,
            label: label.into(),
        }
    }

    pub fn from(&self) -> LocationId {
        self.from
    }

    pub fn to(&self) -> LocationId {
        self.to
    }

    pub fn guard(&self) -> &[Constraint] {
        &self.guard
    }

    pub fn reset(&self) -> &[ClockIndex] {
        &self.reset
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A timed Büchi automaton: `(name, clock_names, locations, initial, edges,
/// label_set)` plus the derived indices used by the fixed-point engine
/// and the monitor.
#[derive(Debug, Clone)]
pub struct TimedAutomaton {
    name: String,
    clock_names: BTreeMap<ClockIndex, String>,
    locations: BTreeMap<LocationId, Location>,
    initial: LocationId,
    edges_from: BTreeMap<LocationId, Vec<Edge>>,
    edges_to: BTreeMap<LocationId, Vec<Edge>>,
    labels: BTreeSet<String>,
    inactive_clocks: BTreeMap<LocationId, BTreeSet<ClockIndex>>,
    dimension: usize,
}

impl TimedAutomaton {
    /// Build a TBA from the plain-data automaton-builder contract of
    /// §6. Validates that `initial` and every edge endpoint names a
    /// declared location.
    pub fn new(
        name: impl Into<String>,
        clock_names: BTreeMap<ClockIndex, String>,
        locations: Vec<Location>,
        edges: Vec<Edge>,
        initial: LocationId,
    ) -> Result<TimedAutomaton, AutomatonError> {
        let dimension = clock_names.len();
        let mut location_map = BTreeMap::new();
        for loc in locations {
            location_map.insert(loc.id(), loc);
        }
        if !location_map.contains_key(&initial) {
            return Err(AutomatonError::UnknownInitialLocation(initial));
        }

        let mut edges_from: BTreeMap<LocationId, Vec<Edge>> = BTreeMap::new();
        let mut edges_to: BTreeMap<LocationId, Vec<Edge>> = BTreeMap::new();
        let mut labels = BTreeSet::new();
        for e in edges {
            if !location_map.contains_key(&e.from()) {
                return Err(AutomatonError::UnknownLocation(e.from()));
            }
            if !location_map.contains_key(&e.to()) {
                return Err(AutomatonError::UnknownLocation(e.to()));
            }
            labels.insert(e.label().to_string());
            edges_from.entry(e.from()).or_default().push(e.clone());
            edges_to.entry(e.to()).or_default().push(e);
        }

        let inactive_clocks = inactive::compute_inactive_clocks(&location_map, &edges_from, dimension);

        Ok(TimedAutomaton {
            name: name.into(),
            clock_names,
            locations: location_map,
            initial,
            edges_from,
            edges_to,
            labels,
            inactive_clocks,
            dimension,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn initial_location(&self) -> LocationId {
        self.initial
    }

    pub fn locations(&self) -> &BTreeMap<LocationId, Location> {
        &self.locations
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn clock_name(&self, index: ClockIndex) -> Option<&str> {
        self.clock_names.get(&index).map(String::as_str)
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    fn empty_edges() -> &'static Vec<Edge> {
        static EMPTY: Vec<Edge> = Vec::new();
        &EMPTY
    }

    pub fn edges_to(&self, id: LocationId) -> &[Edge] {
        self.edges_to.get(&id).unwrap_or_else(Self::empty_edges)
    }

    pub fn edges_from(&self, id: LocationId) -> &[Edge] {
        self.edges_from.get(&id).unwrap_or_else(Self::empty_edges)
    }

    /// Clocks whose value at `id` cannot influence any future verdict
    /// (§4.3): every path out of `id` either resets the clock before
    /// any guard mentions it, or never uses it.
    pub fn inactive_clocks(&self, id: LocationId) -> &BTreeSet<ClockIndex> {
        static EMPTY: BTreeSet<ClockIndex> = BTreeSet::new();
        self.inactive_clocks.get(&id).unwrap_or(&EMPTY)
    }
}
