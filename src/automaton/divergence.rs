//! Time-divergence automaton synthesis (§4.3).
//!
//! Intersecting a property with this gadget forces at least one time
//! unit between successive visits to an accepting location, ruling out
//! Zeno runs of the combined automaton.

use std::collections::BTreeMap;

use super::{Edge, Location, LocationId, TimedAutomaton};
use crate::dbm::Constraint;
use crate::error::AutomatonError;
use crate::time::ClockIndex;

const L0: LocationId = 0;
const L1: LocationId = 1;
const CLOCK_T: ClockIndex = 1;

/// Two locations (`l0` accept, `l1` non-accept) and one clock `t`. On
/// every letter in `alphabet`: `l0 --[t:=0]--> l1`, `l1 --t>=1--> l0`,
/// and `l1 --[-]--> l1`. In the `deterministic` variant the `l1 -> l1`
/// self-loop is additionally guarded `t < 1`.
pub fn time_divergence_automaton(
    alphabet: &[String],
    deterministic: bool,
) -> Result<TimedAutomaton, AutomatonError> {
    let clocks = BTreeMap::from([(0, "0".to_string()), (CLOCK_T, "t".to_string())]);
    let locations = vec![
        Location::new(L0, "l0", true, vec![]),
        Location::new(L1, "l1", false, vec![]),
    ];

    let mut edges = Vec::new();
    for label in alphabet {
        edges.push(Edge::new(L0, L1, vec![], vec![CLOCK_T], label.clone()));
        edges.push(Edge::new(
            L1,
            L0,
            vec![Constraint::lower_non_strict(CLOCK_T, 1)],
            vec![],
            label.clone(),
        ));
        let self_loop_guard = if deterministic {
            vec![Constraint::upper_strict(CLOCK_T, 1)]
        } else {
            vec![]
        };
        edges.push(Edge::new(L1, L1, self_loop_guard, vec![], label.clone()));
    }

    TimedAutomaton::new("divergence", clocks, locations, edges, L0)
}
