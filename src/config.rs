/*! Top-level monitor configuration (§6): the options a caller sets once
before building a [DualMonitor](crate::monitor::DualMonitor), and the
per-flavor constructors that turn a property automaton and its negation
into one.

All validation happens once, here, rather than being re-checked on
every observation the monitor processes. */

use crate::automaton::{product, time_divergence_automaton, TimedAutomaton};
use crate::error::MonitorError;
use crate::monitor::{DualMonitor, ObservationPolicy};
use crate::state::{Delay, Symbolic, Testing};
use crate::time::{Time, TimeInterval};

/// Options shared by every flavor of monitor (§6).
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Prune frontier states subsumed by another (§4.6). Sound to
    /// disable for debugging; disabling it only ever grows the
    /// frontier, never changes the verdict.
    pub inclusion: bool,
    /// Forget clocks that can no longer affect any future verdict
    /// before comparing states for subsumption (§4.3 inactive clocks).
    /// Has no effect unless `inclusion` is set.
    pub clock_abstraction: bool,
    /// Reject an observation naming a label outside the monitored
    /// automata's combined alphabet, rather than treating it as a pure
    /// delay (§7 BadInput).
    pub strict: bool,
    /// Observation latency window for the [Delay](crate::state::Delay)
    /// flavor, or the output-channel window for
    /// [Testing](crate::state::Testing).
    pub latency: TimeInterval,
    /// Jitter bound layered on top of `latency` at every observation.
    pub jitter: Time,
    /// Input-channel latency window, used only by the testing flavor.
    pub latency_input: TimeInterval,
    /// Input-channel jitter bound, used only by the testing flavor.
    pub jitter_input: Time,
    /// When set, intersect both the property and its negation with the
    /// time-divergence automaton over this alphabet before monitoring
    /// (§4.3), ruling out Zeno runs of the combined automaton.
    pub divergence_alphabet: Option<Vec<String>>,
    /// A third TBA to intersect into both sides before fixed-point
    /// computation (§6): an environment assumption the property is only
    /// required to hold under.
    pub assumption: Option<TimedAutomaton>,
}

impl Default for MonitorConfig {
    fn default() -> MonitorConfig {
        MonitorConfig {
            inclusion: true,
            clock_abstraction: true,
            strict: false,
            latency: TimeInterval::point(0),
            jitter: 0,
            latency_input: TimeInterval::point(0),
            jitter_input: 0,
            divergence_alphabet: None,
            assumption: None,
        }
    }
}

impl MonitorConfig {
    fn policy(&self) -> ObservationPolicy {
        ObservationPolicy {
            inclusion: self.inclusion,
            clock_abstraction: self.clock_abstraction,
            strict: self.strict,
        }
    }

    /// Reject `latency_input`/`jitter_input` set for a flavor other than
    /// `testing`, where they have no effect (§6: a construction error,
    /// not a silently-ignored option).
    fn check_single_channel(&self) -> Result<(), MonitorError> {
        if self.latency_input != TimeInterval::point(0) || self.jitter_input != 0 {
            return Err(MonitorError::InvalidConfig(
                "latency_input/jitter_input are only meaningful for the testing flavor".to_string(),
            ));
        }
        Ok(())
    }

    /// Intersect `automaton` with the configured divergence alphabet
    /// and/or assumption, in that order, if either is set (§4.3, §6).
    fn augment(&self, automaton: TimedAutomaton) -> Result<TimedAutomaton, MonitorError> {
        let mut automaton = automaton;
        if let Some(alphabet) = &self.divergence_alphabet {
            let divergence = time_divergence_automaton(alphabet, false)?;
            automaton = product(&automaton, &divergence)?;
        }
        if let Some(assumption) = &self.assumption {
            automaton = product(&automaton, assumption)?;
        }
        Ok(automaton)
    }

    /// Build a monitor over the plain symbolic flavor: no observation
    /// latency, the elapsed time dimension pinned exactly (§3, §4.4).
    pub fn build_symbolic(
        &self,
        property: TimedAutomaton,
        negation: TimedAutomaton,
    ) -> Result<DualMonitor<Symbolic>, MonitorError> {
        self.check_single_channel()?;
        let property = self.augment(property)?;
        let negation = self.augment(negation)?;
        let init_pos = Symbolic::new(property.initial_location(), property.dimension());
        let init_neg = Symbolic::new(negation.initial_location(), negation.dimension());
        DualMonitor::new(property, negation, init_pos, init_neg, self.policy())
    }

    /// Build a monitor over the delay flavor: a single observation
    /// channel lagging the true time by `self.latency` plus up to
    /// `self.jitter` (§4.4).
    pub fn build_delay(
        &self,
        property: TimedAutomaton,
        negation: TimedAutomaton,
    ) -> Result<DualMonitor<Delay>, MonitorError> {
        self.check_single_channel()?;
        let property = self.augment(property)?;
        let negation = self.augment(negation)?;
        let init_pos = Delay::new(property.initial_location(), property.dimension(), self.latency, self.jitter);
        let init_neg = Delay::new(negation.initial_location(), negation.dimension(), self.latency, self.jitter);
        DualMonitor::new(property, negation, init_pos, init_neg, self.policy())
    }

    /// Build a monitor over the testing flavor: independent input and
    /// output observation channels, each with its own latency window
    /// and jitter bound (§4.4).
    pub fn build_testing(
        &self,
        property: TimedAutomaton,
        negation: TimedAutomaton,
    ) -> Result<DualMonitor<Testing>, MonitorError> {
        let property = self.augment(property)?;
        let negation = self.augment(negation)?;
        let init_pos = Testing::new(
            property.initial_location(),
            property.dimension(),
            self.latency_input,
            self.latency,
            self.jitter_input,
            self.jitter,
        );
        let init_neg = Testing::new(
            negation.initial_location(),
            negation.dimension(),
            self.latency_input,
            self.latency,
            self.jitter_input,
            self.jitter,
        );
        DualMonitor::new(property, negation, init_pos, init_neg, self.policy())
    }
}
