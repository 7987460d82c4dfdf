//! The two-track generalized-Büchi product (intersection) of two TBAs
//! (§4.3).
//!
//! The track bit records which component's accept condition is
//! currently awaited: track 1 awaits an accept location of `a`, track 2
//! awaits one of `b`. The flip happens **on exit** from the relevant
//! accept location, a choice fixed once here rather than revisited per
//! call site; see `DESIGN.md`.

use std::collections::{BTreeMap, HashMap};

use super::{Edge, Location, LocationId, TimedAutomaton};
use crate::dbm::Constraint;
use crate::error::AutomatonError;
use crate::time::ClockIndex;

fn shift_constraint(c: Constraint, offset: ClockIndex) -> Constraint {
    let shift = |idx: ClockIndex| if idx == 0 { 0 } else { idx + offset };
    Constraint::new(shift(c.i), shift(c.j), c.bound)
}

fn shift_constraints(cs: &[Constraint], offset: ClockIndex) -> Vec<Constraint> {
    cs.iter().map(|c| shift_constraint(*c, offset)).collect()
}

fn shift_clocks(cs: &[ClockIndex], offset: ClockIndex) -> Vec<ClockIndex> {
    cs.iter().map(|&x| if x == 0 { 0 } else { x + offset }).collect()
}

/// Track 1 awaits an accept location of `a`; track 2 awaits one of `b`.
/// Flips on exit from the location currently being awaited.
fn next_track(track: u8, a_accept: bool, b_accept: bool) -> u8 {
    match track {
        1 if a_accept => 2,
        2 if b_accept => 1,
        t => t,
    }
}

/// Build the product automaton `a x b`: shared labels synchronize,
/// labels unique to one side become self-loops on the other (the
/// "divergence-style" behavior of §4.3).
pub fn product(a: &TimedAutomaton, b: &TimedAutomaton) -> Result<TimedAutomaton, AutomatonError> {
    // `b`'s zero clock is shared with `a`'s (index 0); `b`'s real clocks
    // (index >= 1) are appended directly after `a`'s `dimension() - 1`
    // real clocks, so the combined index space stays contiguous.
    let offset = a.dimension() - 1;

    let mut clocks = BTreeMap::new();
    clocks.insert(0, "0".to_string());
    for i in 1..a.dimension() {
        if let Some(name) = a.clock_name(i) {
            clocks.insert(i, name.to_string());
        }
    }
    for i in 1..b.dimension() {
        if let Some(name) = b.clock_name(i) {
            clocks.insert(i + offset, name.to_string());
        }
    }

    let mut id_of: HashMap<(LocationId, LocationId, u8), LocationId> = HashMap::new();
    let mut next_id: LocationId = 0;
    let mut locations = Vec::new();

    for (&la_id, la) in a.locations() {
        for (&lb_id, lb) in b.locations() {
            for track in [1u8, 2u8] {
                let id = next_id;
                next_id += 1;
                id_of.insert((la_id, lb_id, track), id);
                let accept = track == 2 && lb.is_accept();
                let mut invariant = la.invariant().to_vec();
                invariant.extend(shift_constraints(lb.invariant(), offset));
                let name = format!("{}__{}__t{}", la.name(), lb.name(), track);
                locations.push(Location::new(id, name, accept, invariant));
            }
        }
    }

    let shared: Vec<String> = a.labels().intersection(b.labels()).cloned().collect();
    let a_only: Vec<String> = a.labels().difference(b.labels()).cloned().collect();
    let b_only: Vec<String> = b.labels().difference(a.labels()).cloned().collect();

    let mut edges = Vec::new();
    for (&la_id, la) in a.locations() {
        for (&lb_id, lb) in b.locations() {
            for track in [1u8, 2u8] {
                let from = id_of[&(la_id, lb_id, track)];
                let nt = next_track(track, la.is_accept(), lb.is_accept());

                for label in &shared {
                    for ea in a.edges_from(la_id).iter().filter(|e| e.label() == label) {
                        for eb in b.edges_from(lb_id).iter().filter(|e| e.label() == label) {
                            let to = id_of[&(ea.to(), eb.to(), nt)];
                            let mut guard = ea.guard().to_vec();
                            guard.extend(shift_constraints(eb.guard(), offset));
                            let mut reset = ea.reset().to_vec();
                            reset.extend(shift_clocks(eb.reset(), offset));
                            edges.push(Edge::new(from, to, guard, reset, label.clone()));
                        }
                    }
                }

                for label in &a_only {
                    for ea in a.edges_from(la_id).iter().filter(|e| e.label() == label) {
                        let to = id_of[&(ea.to(), lb_id, nt)];
                        edges.push(Edge::new(from, to, ea.guard().to_vec(), ea.reset().to_vec(), label.clone()));
                    }
                }

                for label in &b_only {
                    for eb in b.edges_from(lb_id).iter().filter(|e| e.label() == label) {
                        let to = id_of[&(la_id, eb.to(), nt)];
                        let guard = shift_constraints(eb.guard(), offset);
                        let reset = shift_clocks(eb.reset(), offset);
                        edges.push(Edge::new(from, to, guard, reset, label.clone()));
                    }
                }
            }
        }
    }

    let initial = id_of[&(a.initial_location(), b.initial_location(), 1)];
    let name = format!("{}_x_{}", a.name(), b.name());
    TimedAutomaton::new(name, clocks, locations, edges, initial)
}
