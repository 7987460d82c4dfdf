//! End-to-end monitor scenarios (§8): build a property and its negation
//! directly (no text-format trace parser is in scope) and feed them a
//! sequence of timed observations, checking the verdict transitions a
//! caller would see.

use std::collections::BTreeMap;

use monitaal_core::automaton::{product, time_divergence_automaton, Edge, Location, TimedAutomaton};
use monitaal_core::config::MonitorConfig;
use monitaal_core::dbm::Constraint;
use monitaal_core::monitor::{InputKind, TimedInput, Verdict};
use monitaal_core::state::{Concrete, Symbolic, SymbolicState};

const Z: usize = 1;

/// "Every `a` is followed within `bound` time units by a `b`," over
/// `{a, b, c}`. `l0` (accept) has no pending obligation; `l1` enforces
/// the bound as an invariant, so a delay that pushes `z` past `bound`
/// while still waiting empties the state outright.
fn leads_to_within(bound: i64) -> TimedAutomaton {
    let clocks = BTreeMap::from([(0, "0".to_string()), (Z, "z".to_string())]);
    let l0 = Location::new(0, "l0", true, vec![]);
    let l1 = Location::new(1, "l1", false, vec![Constraint::upper_non_strict(Z, bound)]);
    let edges = vec![
        Edge::new(0, 1, vec![], vec![Z], "a"),
        Edge::new(0, 0, vec![], vec![], "b"),
        Edge::new(0, 0, vec![], vec![], "c"),
        Edge::new(1, 1, vec![], vec![Z], "a"),
        Edge::new(1, 0, vec![Constraint::upper_non_strict(Z, bound)], vec![], "b"),
        Edge::new(1, 1, vec![], vec![], "c"),
    ];
    TimedAutomaton::new("leads_to", clocks, vec![l0, l1], edges, 0).unwrap()
}

/// The negation: "some `a` is not followed within `bound` by a `b`."
/// `n1`'s outgoing edges are split by the same bound, so whichever
/// side of it the pending obligation's age falls on, some edge stays
/// enabled; once `z > bound` is confirmed, every further label proves
/// the violation and is absorbed by the permanently accepting `bad`
/// sink.
fn not_leads_to_within(bound: i64) -> TimedAutomaton {
    let clocks = BTreeMap::from([(0, "0".to_string()), (Z, "z".to_string())]);
    let n0 = Location::new(0, "n0", false, vec![]);
    let n1 = Location::new(1, "n1", false, vec![]);
    let bad = Location::new(2, "bad", true, vec![]);
    let within = Constraint::upper_non_strict(Z, bound);
    let beyond = Constraint::lower_strict(Z, bound);
    let edges = vec![
        Edge::new(0, 1, vec![], vec![Z], "a"),
        Edge::new(0, 0, vec![], vec![], "b"),
        Edge::new(0, 0, vec![], vec![], "c"),
        Edge::new(1, 1, vec![within], vec![Z], "a"),
        Edge::new(1, 2, vec![beyond], vec![], "a"),
        Edge::new(1, 0, vec![within], vec![], "b"),
        Edge::new(1, 2, vec![beyond], vec![], "b"),
        Edge::new(1, 1, vec![within], vec![], "c"),
        Edge::new(1, 2, vec![beyond], vec![], "c"),
        Edge::new(2, 2, vec![], vec![], "a"),
        Edge::new(2, 2, vec![], vec![], "b"),
        Edge::new(2, 2, vec![], vec![], "c"),
    ];
    TimedAutomaton::new("not_leads_to", clocks, vec![n0, n1, bad], edges, 0).unwrap()
}

#[test]
fn inconclusive_then_negative_on_point_observations() {
    let config = MonitorConfig::default();
    let mut m = config.build_symbolic(leads_to_within(100), not_leads_to_within(100)).unwrap();

    // deltas 0, 2, 100, 2, 0, 5, 10, 0, 0 against labels c,b,b,a,c,a,b,c,c,
    // expressed as the cumulative absolute timestamps the monitor expects.
    let prefix = [
        (0, "c"), (2, "b"), (102, "b"), (104, "a"), (104, "c"),
        (109, "a"), (119, "b"), (119, "c"), (119, "c"),
    ];
    for (t, label) in prefix {
        m.input(&TimedInput::point(t, label)).unwrap();
    }
    assert_eq!(m.status(), Verdict::Inconclusive);

    m.input(&TimedInput::point(119, "a")).unwrap();
    let verdict = m.input(&TimedInput::point(220, "c")).unwrap();
    assert_eq!(verdict, Verdict::Negative);
    // latched: a further call doesn't need a fresh observation to agree
    assert_eq!(m.input(&TimedInput::point(500, "c")).unwrap(), Verdict::Negative);
}

#[test]
fn inconclusive_then_negative_on_interval_observations() {
    let config = MonitorConfig::default();
    let mut m = config.build_symbolic(leads_to_within(30), not_leads_to_within(30)).unwrap();

    let prefix = [
        (0, 1, "c"), (3, 6, "b"), (50, 100, "b"), (102, 103, "a"),
        (103, 103, "c"), (105, 110, "a"), (115, 150, "b"), (140, 150, "c"),
    ];
    for (lo, hi, label) in prefix {
        m.input(&TimedInput::interval(monitaal_core::time::TimeInterval::new(lo, hi), label)).unwrap();
    }
    assert_eq!(m.status(), Verdict::Inconclusive);

    m.input(&TimedInput::interval(monitaal_core::time::TimeInterval::new(160, 170), "a")).unwrap();
    let verdict = m
        .input(&TimedInput::interval(monitaal_core::time::TimeInterval::new(201, 210), "c"))
        .unwrap();
    assert_eq!(verdict, Verdict::Negative);
}

#[test]
fn delay_flavor_tolerates_its_configured_latency_and_jitter() {
    // "a leads-to b" with no timing bound: the only thing under test is
    // that the delay flavor's extra latency/jitter dimensions don't
    // themselves collapse the frontier on an ordinary trace.
    let clocks = BTreeMap::from([(0, "0".to_string())]);
    let l0 = Location::new(0, "l0", true, vec![]);
    let l1 = Location::new(1, "l1", false, vec![]);
    let property = TimedAutomaton::new(
        "leads_to_b",
        clocks.clone(),
        vec![l0, l1],
        vec![
            Edge::new(0, 1, vec![], vec![], "a"),
            Edge::new(1, 0, vec![], vec![], "b"),
            Edge::new(0, 0, vec![], vec![], "b"),
            Edge::new(0, 0, vec![], vec![], "c"),
            Edge::new(1, 1, vec![], vec![], "c"),
        ],
        0,
    )
    .unwrap();
    let n0 = Location::new(0, "n0", true, vec![]);
    let negation = TimedAutomaton::new(
        "never_b_after_a",
        clocks,
        vec![n0],
        vec![Edge::new(0, 0, vec![], vec![], "c")],
        0,
    )
    .unwrap();

    let config = MonitorConfig {
        latency: monitaal_core::time::TimeInterval::new(0, 100),
        jitter: 2,
        ..MonitorConfig::default()
    };
    let mut m = config.build_delay(property, negation).unwrap();
    assert_eq!(m.status(), Verdict::Inconclusive);
    m.input(&TimedInput::point(173, "a")).unwrap();
    assert_eq!(m.status(), Verdict::Inconclusive);
}

#[test]
fn inactive_clock_abstraction_keeps_the_verdict_but_not_a_larger_frontier() {
    // `y` is only ever constrained right after a fresh visit to `l2`;
    // once the run is back at `l0` it can no longer affect anything.
    let clocks = BTreeMap::from([(0, "0".to_string()), (1, "x".to_string()), (2, "y".to_string())]);
    let l0 = Location::new(0, "l0", true, vec![]);
    let l1 = Location::new(1, "l1", false, vec![]);
    let l2 = Location::new(2, "l2", false, vec![]);
    let edges = vec![
        Edge::new(0, 1, vec![], vec![1], "a"),
        Edge::new(1, 2, vec![], vec![2], "a"),
        Edge::new(2, 0, vec![Constraint::lower_non_strict(2, 1)], vec![], "a"),
        Edge::new(0, 0, vec![], vec![], "b"),
    ];
    let automaton = TimedAutomaton::new("uses_y_locally", clocks, vec![l0, l1, l2], edges, 0).unwrap();
    assert!(automaton.inactive_clocks(0).contains(&2));

    let with_abstraction = MonitorConfig { clock_abstraction: true, ..MonitorConfig::default() };
    let without_abstraction = MonitorConfig { clock_abstraction: false, ..MonitorConfig::default() };

    let trivial_negation = {
        let clocks = BTreeMap::from([(0, "0".to_string())]);
        let n0 = Location::new(0, "n0", true, vec![]);
        TimedAutomaton::new("never", clocks, vec![n0], vec![Edge::new(0, 0, vec![], vec![], "z")], 0).unwrap()
    };

    let mut with = with_abstraction.build_symbolic(automaton.clone(), trivial_negation.clone()).unwrap();
    let mut without = without_abstraction.build_symbolic(automaton, trivial_negation).unwrap();

    for t in [0u64, 1, 2] {
        with.input(&TimedInput::point(t, "a")).unwrap();
        without.input(&TimedInput::point(t, "a")).unwrap();
    }
    assert_eq!(with.status(), without.status());
    assert!(with.positive_state_estimate().len() <= without.positive_state_estimate().len());
}

#[test]
fn concrete_trajectory_matches_the_point_interval_monitor() {
    // Feeding identical point intervals into the symbolic monitor and
    // replaying the same trace by hand through `Concrete` must reach
    // the same locations.
    let automaton = leads_to_within(100);
    let edge_a = automaton.edges_from(0).iter().find(|e| e.label() == "a").unwrap().clone();
    let edge_b = automaton.edges_from(1).iter().find(|e| e.label() == "b").unwrap().clone();

    let mut concrete = Concrete::zero(0, automaton.dimension());
    concrete.delay(5);
    let mut concrete = concrete.do_transition(&edge_a);
    assert_eq!(concrete.location(), 1);
    concrete.delay(10);
    let concrete = concrete.do_transition(&edge_b);
    assert_eq!(concrete.location(), 0);
    assert!(!concrete.is_empty());

    let mut symbolic = Symbolic::new(0, automaton.dimension());
    symbolic.delay(5);
    let symbolic = symbolic.do_transition(&edge_a).unwrap().unwrap();
    let mut symbolic = symbolic;
    symbolic.delay(10);
    let symbolic = symbolic.do_transition(&edge_b).unwrap().unwrap();
    assert_eq!(symbolic.location(), concrete.location());
}

#[test]
fn property_intersected_with_divergence_keeps_its_own_accept_locations() {
    // Divergence intersection (§4.3) is meant to be layered onto a
    // property automaton before monitoring; this checks the combination
    // itself, not a specific monitor trace.
    let alphabet = vec!["a".to_string()];
    let divergence = time_divergence_automaton(&alphabet, false).unwrap();
    let property = leads_to_within(5);
    let combined = product(&property, &divergence).unwrap();

    // one combined clock dimension for each side's real clocks, plus the shared zero clock
    assert_eq!(combined.dimension(), property.dimension() + divergence.dimension() - 1);
    assert!(combined.locations().values().any(|l| l.is_accept()));
    assert!(combined.labels().contains("a"));
    assert!(combined.labels().contains("b"));
}

#[test]
fn divergence_alphabet_preserves_the_verdict_of_a_non_zeno_trace() {
    // Same property, same negation, same trace as
    // `inconclusive_then_negative_on_point_observations`, but routed
    // through `MonitorConfig::divergence_alphabet` so both sides are
    // actually `product()`-ed with `time_divergence_automaton` before
    // `build_symbolic` constructs the pair. No timestamp in this trace
    // repeats an "a" at the same instant, so ruling out Zeno runs must
    // not change the outcome: the verdict stays exactly what it was
    // without the intersection.
    let config = MonitorConfig {
        divergence_alphabet: Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]),
        ..MonitorConfig::default()
    };
    let mut m = config.build_symbolic(leads_to_within(100), not_leads_to_within(100)).unwrap();

    let prefix = [
        (0, "c"), (2, "b"), (102, "b"), (104, "a"), (104, "c"),
        (109, "a"), (119, "b"), (119, "c"), (119, "c"),
    ];
    for (t, label) in prefix {
        m.input(&TimedInput::point(t, label)).unwrap();
    }
    assert_eq!(m.status(), Verdict::Inconclusive);

    m.input(&TimedInput::point(119, "a")).unwrap();
    let verdict = m.input(&TimedInput::point(220, "c")).unwrap();
    assert_eq!(verdict, Verdict::Negative);
}

#[test]
fn multi_input_kind_is_rejected() {
    let config = MonitorConfig::default();
    let mut m = config.build_symbolic(leads_to_within(100), not_leads_to_within(100)).unwrap();
    let err = m
        .input(&TimedInput::point(0, "a").with_kind(InputKind::Multi))
        .unwrap_err();
    assert!(matches!(err, monitaal_core::error::MonitorError::UnsupportedInputKind));
}
