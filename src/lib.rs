/*!
# monitaal-core

This crate collects interfaces, definitions, and algorithms for online
runtime verification of real-time properties expressed as timed Büchi
automata (TBAs).

## Scope

The crate does *not* provide a ready-made tool itself, is not specific
to any particular input format or event source, and does not offer or
require a canonical word representation. Rather, it is intended as a
low-level library of reusable definitions and algorithms, held together
by a bunch of traits: a difference-bound-matrix federation layer, a
timed-automaton representation with product and divergence
constructions, an accept-reachability fixed point, and an incremental
dual-automaton monitor built on top of all three. Based on this
foundation, higher-level facilities (parsers, CLIs, language bindings)
may be built.

## Layout

- [bound] / [dbm] / [federation]: the zone representation (§4.1).
- [automaton]: timed Büchi automata, product, and time-divergence
  synthesis (§3, §4.3).
- [state]: the four symbolic-state flavors (§4.4).
- [fixed_point]: the accept-reachability fixed point (§4.5).
- [monitor]: the incremental dual-automaton monitor (§4.6).
- [config]: top-level options and per-flavor monitor construction (§6).
- [error]: the error types surfaced at every fallible boundary (§7).
*/

pub mod automaton;
pub mod bound;
pub mod config;
pub mod dbm;
pub mod error;
pub mod federation;
pub mod fixed_point;
pub mod monitor;
pub mod state;
pub mod time;
