//! Backward data-flow computation of inactive clocks (§4.3).
//!
//! A clock is *active* at a location if some invariant or reachable
//! guard can still observe its value; everything else is inactive. The
//! analysis is the complement, computed once per [super::TimedAutomaton]
//! at construction time.

use std::collections::{BTreeMap, BTreeSet};

use super::{Edge, Location, LocationId};
use crate::dbm::Constraint;
use crate::time::{ClockIndex, ZERO_CLOCK};

fn clocks_in(cs: &[Constraint]) -> BTreeSet<ClockIndex> {
    let mut s = BTreeSet::new();
    for c in cs {
        if c.i != ZERO_CLOCK {
            s.insert(c.i);
        }
        if c.j != ZERO_CLOCK {
            s.insert(c.j);
        }
    }
    s
}

pub(super) fn compute_inactive_clocks(
    locations: &BTreeMap<LocationId, Location>,
    edges_from: &BTreeMap<LocationId, Vec<Edge>>,
    dimension: usize,
) -> BTreeMap<LocationId, BTreeSet<ClockIndex>> {
    let mut active: BTreeMap<LocationId, BTreeSet<ClockIndex>> = locations
        .iter()
        .map(|(&id, loc)| (id, clocks_in(loc.invariant())))
        .collect();

    let no_edges = Vec::new();
    let mut changed = true;
    while changed {
        changed = false;
        for &id in locations.keys() {
            let edges = edges_from.get(&id).unwrap_or(&no_edges);
            let mut new_active = active.get(&id).unwrap().clone();
            for e in edges {
                new_active.extend(clocks_in(e.guard()));
                if let Some(target_active) = active.get(&e.to()) {
                    for &c in target_active {
                        if !e.reset().contains(&c) {
                            new_active.insert(c);
                        }
                    }
                }
            }
            if new_active != *active.get(&id).unwrap() {
                active.insert(id, new_active);
                changed = true;
            }
        }
    }

    let all_clocks: BTreeSet<ClockIndex> = (1..dimension).collect();
    locations
        .keys()
        .map(|&id| {
            let inactive = all_clocks.difference(&active[&id]).cloned().collect();
            (id, inactive)
        })
        .collect()
}
