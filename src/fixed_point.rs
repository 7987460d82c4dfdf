/*! The accept-reachability fixed point (§4.5): the backward analysis
that, run once at monitor construction, tells the incremental monitor
which symbolic states can still possibly reach an accepting run.

`buchi_accept_fixpoint` computes the largest set of states from which an
accept location is reachable infinitely often: the standard nested
fixed point for co-Büchi emptiness, here run backward over the whole
automaton once instead of per-trace. */

use tracing::debug;

use crate::automaton::TimedAutomaton;
use crate::error::DbmError;
use crate::state::{StateMap, SymbolicState};

/// Backward-saturate `states`: the set of states from which some state
/// in `states` is reachable in zero or more steps (§4.5). Always takes
/// at least one backward step, since the fixed point this feeds is
/// defined over *predecessors* of the seed set.
pub fn reach<S: SymbolicState>(states: &StateMap<S>, automaton: &TimedAutomaton) -> Result<StateMap<S>, DbmError> {
    let mut waiting: StateMap<S> = StateMap::new();
    let mut passed: StateMap<S> = StateMap::new();

    let step_back = |s: &S, waiting: &mut StateMap<S>| -> Result<(), DbmError> {
        for edge in automaton.edges_to(s.location()) {
            if let Some(mut pred) = s.do_transition_backward(edge)? {
                if let Some(loc) = automaton.location(edge.from()) {
                    pred.restrict_all(loc.invariant())?;
                }
                if !pred.is_empty() {
                    waiting.insert(pred);
                }
            }
        }
        Ok(())
    };

    for (_, s) in states.iter() {
        step_back(s, &mut waiting)?;
    }

    while let Some(s) = waiting.pop() {
        if let Some(already) = passed.at(s.location()) {
            if s.is_included_in(already) {
                continue;
            }
        }
        passed.insert(s.clone());
        step_back(&s, &mut waiting)?;
    }

    Ok(passed)
}

/// The unconstrained state at every accepting location (§4.5's seed for
/// the outer fixed point).
pub fn accept_states<S: SymbolicState>(automaton: &TimedAutomaton) -> StateMap<S> {
    let mut states = StateMap::new();
    for (&id, loc) in automaton.locations() {
        if loc.is_accept() {
            states.insert(S::unconstrained(id, automaton.dimension()));
        }
    }
    states
}

fn keep_only_accepting<S: SymbolicState>(states: &mut StateMap<S>, automaton: &TimedAutomaton) {
    let drop: Vec<_> = states
        .locations()
        .filter(|&id| !automaton.location(id).map(|l| l.is_accept()).unwrap_or(false))
        .collect();
    for id in drop {
        states.remove(id);
    }
}

/// The states from which an accepting location is visited infinitely
/// often (§4.5): the nested fixed point
/// `nu Z. accept ∩ reach(mu Y. Z ∩ accept -> ... )`, computed here as
/// the standard outer-greatest/inner-least iteration over `reach`.
pub fn buchi_accept_fixpoint<S: SymbolicState>(automaton: &TimedAutomaton) -> Result<StateMap<S>, DbmError> {
    let mut reach_a: StateMap<S> = reach(&accept_states(automaton), automaton)?;
    keep_only_accepting(&mut reach_a, automaton);

    let mut reach_b: StateMap<S> = reach(&reach_a, automaton)?;

    let mut iterations = 0;
    while !reach_a.equals(&reach_b) {
        reach_a = reach_b.clone();
        keep_only_accepting(&mut reach_b, automaton);
        reach_b = reach(&reach_b, automaton)?;
        iterations += 1;
    }
    debug!(iterations, locations = reach_a.len(), "accept-reachability fixed point converged");

    Ok(reach_a)
}
