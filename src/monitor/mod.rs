/*! The incremental runtime monitor (§4.6): a pair of single-automaton
observers, one tracking the property and one tracking its negation, fed
the same timed word one character at a time.

Each [SingleMonitor] keeps a small set of symbolic states consistent
with everything observed so far, restricted at every step to the
accept-reachable space computed once by [crate::fixed_point]. A side
goes [Activity::Out] when that set becomes empty: it can no longer
possibly satisfy its automaton's language. [DualMonitor] turns the pair
of per-side activity bits into a [Verdict]: a side going out proves the
*other* side's property (§4.6).

Observation timestamps are absolute and must be non-decreasing; each
[SingleMonitor] rejects a regressing one with
[MonitorError::NonMonotonicTime] rather than mutating its state. Once a
[DualMonitor] settles on [Verdict::Positive] or [Verdict::Negative] it
latches: further observations are accepted but not recomputed. */

use tracing::trace;

use crate::automaton::TimedAutomaton;
use crate::dbm::Constraint;
use crate::error::{DbmError, MonitorError};
use crate::federation::Relation;
use crate::state::{StateMap, SymbolicState};
use crate::time::{ClockIndex, Time, TimeInterval};
use crate::{error::AutomatonError, fixed_point};

/// How an observation's label relates to the transitions it may trigger
/// (§4.6, §9 Open Questions: `Multi` is accepted syntactically but
/// always rejected at observation time; see [MonitorError::UnsupportedInputKind]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Exactly one matching edge must be taken; states with no matching
    /// edge are dropped.
    Once,
    /// Matching edges may be taken, but a state that takes none is also
    /// kept (the label was possible but not observed to have occurred).
    Optional,
    /// Unsupported: see [MonitorError::UnsupportedInputKind].
    Multi,
}

/// A timed character: a label observed at (or across) a time, relative
/// to the previous observation (§4.6).
#[derive(Debug, Clone)]
pub struct TimedInput {
    time: TimeInterval,
    label: Option<String>,
    kind: InputKind,
}

impl TimedInput {
    /// A labeled observation at an exact point in time.
    pub fn point(time: Time, label: impl Into<String>) -> TimedInput {
        TimedInput {
            time: TimeInterval::point(time),
            label: Some(label.into()),
            kind: InputKind::Once,
        }
    }

    /// A labeled observation across an interval of time (§4.6 interval
    /// inputs).
    pub fn interval(interval: TimeInterval, label: impl Into<String>) -> TimedInput {
        TimedInput {
            time: interval,
            label: Some(label.into()),
            kind: InputKind::Once,
        }
    }

    /// A pure delay: time passes but no label is observed.
    pub fn delay(time: Time) -> TimedInput {
        TimedInput {
            time: TimeInterval::point(time),
            label: None,
            kind: InputKind::Once,
        }
    }

    pub fn with_kind(mut self, kind: InputKind) -> TimedInput {
        self.kind = kind;
        self
    }

    pub fn time(&self) -> TimeInterval {
        self.time
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

/// Whether a [SingleMonitor] still has a consistent symbolic state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Active,
    Out,
}

/// The dual monitor's three-valued answer (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Positive,
    Negative,
    Inconclusive,
}

/// Tuning knobs for [SingleMonitor::input] (§6 configuration): whether
/// to prune subsumed states from the frontier, and whether to first
/// forget clocks that can no longer affect any future verdict.
#[derive(Debug, Clone, Copy)]
pub struct ObservationPolicy {
    pub inclusion: bool,
    pub clock_abstraction: bool,
    /// Reject an observation naming a label outside the monitored
    /// automaton's alphabet with [MonitorError::UnknownLabel] instead of
    /// silently treating it as a pure delay (§7 BadInput).
    pub strict: bool,
}

impl Default for ObservationPolicy {
    fn default() -> ObservationPolicy {
        ObservationPolicy {
            inclusion: true,
            clock_abstraction: true,
            strict: false,
        }
    }
}

/// Tracks one automaton's consistency with the observed word (§4.6).
#[derive(Debug, Clone)]
pub struct SingleMonitor<S: SymbolicState> {
    automaton: TimedAutomaton,
    accepting_space: StateMap<S>,
    current_states: Vec<S>,
    status: Activity,
    policy: ObservationPolicy,
    /// The most recently accepted observation's absolute timestamp
    /// window (§5 Ordering). Observations are required to be
    /// non-decreasing against both bounds.
    current_time: TimeInterval,
}

impl<S: SymbolicState> SingleMonitor<S> {
    /// Run the accept-reachability fixed point once and seed the
    /// frontier with `initial`. `side` names this monitor in
    /// diagnostics and in [MonitorError::EmptyFixedPoint].
    pub fn new(automaton: TimedAutomaton, initial: S, policy: ObservationPolicy, side: &'static str) -> Result<SingleMonitor<S>, MonitorError> {
        let accepting_space: StateMap<S> =
            fixed_point::buchi_accept_fixpoint(&automaton).map_err(AutomatonError::from)?;
        if accepting_space.is_empty() {
            return Err(MonitorError::EmptyFixedPoint { side });
        }

        let mut init = initial;
        let survives = restrict_to_accepting(&accepting_space, &mut init).map_err(AutomatonError::from)?;
        let status = if survives { Activity::Active } else { Activity::Out };
        let current_states = if survives { vec![init] } else { Vec::new() };

        Ok(SingleMonitor {
            automaton,
            accepting_space,
            current_states,
            status,
            policy,
            current_time: TimeInterval::point(0),
        })
    }

    pub fn status(&self) -> Activity {
        self.status
    }

    pub fn current_states(&self) -> &[S] {
        &self.current_states
    }

    /// Advance by one observation: delay every tracked state, take
    /// every edge matching `input`'s label, restrict survivors to the
    /// accept-reachable space, and prune the frontier per `self.policy`
    /// (§4.6, grounded on the single-automaton observer's transition
    /// rule). `input.time()` is an absolute timestamp (or timestamp
    /// window); rejected with [MonitorError::NonMonotonicTime] without
    /// altering any state if it precedes the last accepted observation.
    pub fn input(&mut self, input: &TimedInput) -> Result<Activity, MonitorError> {
        let given = input.time();
        if given.lo < self.current_time.lo || given.hi < self.current_time.hi {
            return Err(MonitorError::NonMonotonicTime {
                given: given.lo,
                current: self.current_time.lo,
            });
        }

        if self.policy.strict {
            if let Some(label) = input.label() {
                if !self.automaton.labels().contains(label) {
                    return Err(MonitorError::UnknownLabel(label.to_string()));
                }
            }
        }

        let mut next_states: Vec<S> = Vec::new();
        let labels_match = input.label().map(|l| self.automaton.labels().contains(l)).unwrap_or(false);

        for s in &self.current_states {
            let mut delayed = s.clone();
            delayed.delay_interval(input.time());
            if let Some(loc) = self.automaton.location(delayed.location()) {
                delayed.restrict_all(loc.invariant()).map_err(AutomatonError::from)?;
            }
            if delayed.is_empty() {
                continue;
            }

            if !labels_match {
                // Delay-only observation: stay in place.
                if restrict_to_accepting(&self.accepting_space, &mut delayed).map_err(AutomatonError::from)? {
                    self.push_candidate(&mut next_states, delayed)?;
                }
                continue;
            }

            if input.kind() == InputKind::Multi {
                return Err(MonitorError::UnsupportedInputKind);
            }

            if input.kind() == InputKind::Optional {
                let mut stay = delayed.clone();
                if restrict_to_accepting(&self.accepting_space, &mut stay).map_err(AutomatonError::from)? {
                    self.push_candidate(&mut next_states, stay)?;
                }
            }

            let label = input.label().unwrap();
            for edge in self.automaton.edges_from(delayed.location()).iter().filter(|e| e.label() == label) {
                if let Some(mut moved) = delayed.do_transition(edge).map_err(AutomatonError::from)? {
                    if let Some(loc) = self.automaton.location(moved.location()) {
                        moved.restrict_all(loc.invariant()).map_err(AutomatonError::from)?;
                    }
                    if moved.is_empty() {
                        continue;
                    }
                    if restrict_to_accepting(&self.accepting_space, &mut moved).map_err(AutomatonError::from)? {
                        self.push_candidate(&mut next_states, moved)?;
                    }
                }
            }
        }

        self.status = if next_states.is_empty() { Activity::Out } else { Activity::Active };
        trace!(states = next_states.len(), status = ?self.status, "single monitor advanced");
        self.current_states = next_states;
        self.current_time = given;
        Ok(self.status)
    }

    /// Insert `state` into the frontier being built, applying the
    /// subsumption pruning of §4.6 when `self.policy.inclusion` is set:
    /// drop it if some existing candidate already covers it; otherwise
    /// drop any existing candidate at the same location that it covers.
    fn push_candidate(&self, next_states: &mut Vec<S>, mut state: S) -> Result<(), MonitorError> {
        if !self.policy.inclusion {
            next_states.push(state);
            return Ok(());
        }

        if self.policy.clock_abstraction {
            let inactive: Vec<ClockIndex> = self.automaton.inactive_clocks(state.location()).iter().copied().collect();
            state.federation_mut().free_all(&inactive).map_err(AutomatonError::from)?;
        }

        let mut add = true;
        let mut replace = true;
        for existing in next_states.iter() {
            let relation = state.relation(existing);
            if matches!(relation, Relation::Subset | Relation::Equal) {
                add = false;
            }
            if existing.location() == state.location() && matches!(relation, Relation::Different | Relation::Subset) {
                replace = false;
            }
        }

        if add || replace {
            if replace {
                next_states.retain(|existing| existing.location() != state.location());
            }
            next_states.push(state);
        }
        Ok(())
    }
}

/// Restrict `state` to the accept-reachable zone at its location,
/// forcing it empty if that location has none at all. Returns whether
/// `state` remains non-empty.
fn restrict_to_accepting<S: SymbolicState>(accepting: &StateMap<S>, state: &mut S) -> Result<bool, DbmError> {
    match accepting.at(state.location()) {
        Some(acc) => state.intersection(acc)?,
        None => state.federation_mut().restrict(Constraint::new(0, 0, crate::bound::Bound::strict(-1)))?,
    }
    Ok(!state.is_empty())
}

/// Watches a property and its negation side by side (§4.6).
#[derive(Debug, Clone)]
pub struct DualMonitor<S: SymbolicState> {
    positive: SingleMonitor<S>,
    negative: SingleMonitor<S>,
    status: Verdict,
    /// Set once both sides go [Activity::Out] after the same
    /// observation (§7 BothOut). Latches: every subsequent `input` call
    /// refuses immediately instead of recomputing either side.
    failed: bool,
}

impl<S: SymbolicState> DualMonitor<S> {
    pub fn new(
        property_automaton: TimedAutomaton,
        negation_automaton: TimedAutomaton,
        initial_positive: S,
        initial_negative: S,
        policy: ObservationPolicy,
    ) -> Result<DualMonitor<S>, MonitorError> {
        let positive = SingleMonitor::new(property_automaton, initial_positive, policy, "positive")?;
        let negative = SingleMonitor::new(negation_automaton, initial_negative, policy, "negative")?;

        if positive.status() == Activity::Out && negative.status() == Activity::Out {
            return Err(MonitorError::BothOut);
        }
        let status = verdict_of(positive.status(), negative.status());

        Ok(DualMonitor { positive, negative, status, failed: false })
    }

    pub fn status(&self) -> Verdict {
        self.status
    }

    /// Whether this monitor has latched into the fatal [MonitorError::BothOut]
    /// state (§7). Once set, `input` refuses every further observation.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn positive_state_estimate(&self) -> &[S] {
        self.positive.current_states()
    }

    pub fn negative_state_estimate(&self) -> &[S] {
        self.negative.current_states()
    }

    /// Feed one observation to both sides (§4.6). Once a terminal
    /// verdict (`Positive`/`Negative`) has been emitted it is latched:
    /// further calls return it without recomputing either side. Once
    /// `BothOut` has occurred, every further call refuses with the same
    /// error.
    pub fn input(&mut self, input: &TimedInput) -> Result<Verdict, MonitorError> {
        if self.failed {
            return Err(MonitorError::BothOut);
        }
        if self.status != Verdict::Inconclusive {
            return Ok(self.status);
        }
        if input.kind() == InputKind::Multi {
            return Err(MonitorError::UnsupportedInputKind);
        }

        let pos_status = self.positive.input(input)?;
        let neg_status = self.negative.input(input)?;

        if pos_status == Activity::Out && neg_status == Activity::Out {
            self.failed = true;
            return Err(MonitorError::BothOut);
        }

        self.status = verdict_of(pos_status, neg_status);
        Ok(self.status)
    }

    /// Feed a whole word, stopping early once the verdict settles
    /// (§4.6).
    pub fn input_word(&mut self, word: &[TimedInput]) -> Result<Verdict, MonitorError> {
        for input in word {
            let verdict = self.input(input)?;
            if verdict != Verdict::Inconclusive {
                return Ok(verdict);
            }
        }
        Ok(self.status)
    }
}

fn verdict_of(positive: Activity, negative: Activity) -> Verdict {
    match (positive, negative) {
        (Activity::Out, _) => Verdict::Negative,
        (_, Activity::Out) => Verdict::Positive,
        _ => Verdict::Inconclusive,
    }
}
