//! Federations: finite unions of DBMs with subsumption pruning (§3, §4.2).

use itertools::iproduct;

use crate::dbm::{Constraint, Dbm};
use crate::error::DbmError;
use crate::time::ClockIndex;

/// The four-valued relation lattice returned by [Federation::relation].
///
/// The check is deliberately an *approximation*: it compares DBMs
/// pairwise rather than computing an exact convex-union containment
/// test. Soundness is preserved (`Equal` implies denotational equality,
/// `Subset`/`Superset` imply denotational subset/superset) at the cost
/// of sometimes reporting `Different` where an exact check would find
/// `Subset` or `Superset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equal,
    Subset,
    Superset,
    Different,
}

/// A finite union of DBMs of equal dimension. The federation's
/// denotation is the union of its members' denotations; no member is
/// ever subsumed by another (best-effort; see [Federation::union]).
#[derive(Debug, Clone)]
pub struct Federation {
    dim: usize,
    members: Vec<Dbm>,
}

impl Federation {
    /// Members are widened into a single convex overapproximation once
    /// this many DBMs have accumulated (§5 Memory).
    pub const DEFAULT_CAPACITY: usize = 64;

    /// The empty federation (denotes the empty set of valuations).
    pub fn empty(dim: usize) -> Federation {
        Federation {
            dim,
            members: Vec::new(),
        }
    }

    pub fn singleton(d: Dbm) -> Federation {
        let dim = d.dim();
        let mut f = Federation {
            dim,
            members: Vec::new(),
        };
        f.union(d, Federation::DEFAULT_CAPACITY);
        f
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.members.iter().all(|d| d.is_empty())
    }

    pub fn members(&self) -> &[Dbm] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Add `d` to the federation, dropping it if it is already
    /// subsumed by a current member, and dropping any current members
    /// `d` now subsumes. Forces a convex overapproximation if the
    /// member count would exceed `capacity`.
    pub fn union(&mut self, d: Dbm, capacity: usize) {
        if d.is_empty() {
            return;
        }
        if self.members.iter().any(|m| d.subset(m).unwrap_or(false)) {
            return;
        }
        self.members.retain(|m| !m.subset(&d).unwrap_or(false));
        self.members.push(d);
        if self.members.len() > capacity {
            tracing::debug!(
                dim = self.dim,
                count = self.members.len(),
                capacity,
                "federation exceeded capacity; widening to a convex overapproximation"
            );
            let hull = self.convex_hull();
            self.members = vec![hull];
        }
    }

    pub fn union_federation(&mut self, other: &Federation, capacity: usize) {
        for m in other.members.clone() {
            self.union(m, capacity);
        }
    }

    /// A single DBM no tighter than the union of all members: the
    /// componentwise loosest (maximum) bound at every matrix entry.
    /// Used only when the member count must be forced back down.
    fn convex_hull(&self) -> Dbm {
        let mut iter = self.members.iter().cloned();
        let mut hull = iter.next().expect("convex_hull called on empty federation");
        for d in iter {
            // Widen by relaxing every bound to whichever DBM admits more.
            // Implemented as repeated union-style relaxation: intersect
            // with `unconstrained` is wrong; instead we grow bound by
            // bound using the public, mutation-free `subset` check is
            // not enough, so we fall back to a direct field merge via
            // the crate-private constructor below.
            hull = Dbm::hull_of(&hull, &d);
        }
        hull
    }

    pub fn intersection(&mut self, d: &Dbm) -> Result<(), DbmError> {
        if self.dim != d.dim() {
            return Err(DbmError::DimensionMismatch {
                expected: self.dim,
                actual: d.dim(),
            });
        }
        for m in self.members.iter_mut() {
            m.intersection(d)?;
        }
        self.members.retain(|m| !m.is_empty());
        Ok(())
    }

    pub fn intersection_federation(&mut self, other: &Federation, capacity: usize) -> Result<(), DbmError> {
        if self.dim != other.dim {
            return Err(DbmError::DimensionMismatch {
                expected: self.dim,
                actual: other.dim,
            });
        }
        let mut result = Federation::empty(self.dim);
        for (a, b) in iproduct!(&self.members, &other.members) {
            let mut combined = a.clone();
            combined.intersection(b)?;
            if !combined.is_empty() {
                result.union(combined, capacity);
            }
        }
        *self = result;
        Ok(())
    }

    pub fn is_satisfying(&self, c: Constraint) -> Result<bool, DbmError> {
        for m in &self.members {
            if m.is_satisfying(c)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn restrict(&mut self, c: Constraint) -> Result<(), DbmError> {
        for m in self.members.iter_mut() {
            m.restrict(c)?;
        }
        self.members.retain(|m| !m.is_empty());
        Ok(())
    }

    pub fn restrict_all(&mut self, cs: &[Constraint]) -> Result<(), DbmError> {
        for c in cs {
            self.restrict(*c)?;
        }
        Ok(())
    }

    pub fn assign_zero(&mut self, x: ClockIndex) -> Result<(), DbmError> {
        for m in self.members.iter_mut() {
            m.assign_zero(x)?;
        }
        Ok(())
    }

    pub fn assign_zero_all(&mut self, xs: &[ClockIndex]) -> Result<(), DbmError> {
        for m in self.members.iter_mut() {
            m.assign_zero_all(xs)?;
        }
        Ok(())
    }

    pub fn free(&mut self, x: ClockIndex) -> Result<(), DbmError> {
        for m in self.members.iter_mut() {
            m.free(x)?;
        }
        Ok(())
    }

    pub fn free_all(&mut self, xs: &[ClockIndex]) -> Result<(), DbmError> {
        for m in self.members.iter_mut() {
            m.free_all(xs)?;
        }
        Ok(())
    }

    pub fn future(&mut self) {
        for m in self.members.iter_mut() {
            m.future();
        }
    }

    pub fn past(&mut self) {
        for m in self.members.iter_mut() {
            m.past();
        }
    }

    /// Approximate four-valued relation to `other` (§4.2).
    pub fn relation(&self, other: &Federation) -> Relation {
        let subset = self
            .members
            .iter()
            .all(|m| other.members.iter().any(|n| m.subset(n).unwrap_or(false)));
        let superset = other
            .members
            .iter()
            .all(|n| self.members.iter().any(|m| n.subset(m).unwrap_or(false)));
        match (subset, superset) {
            (true, true) => Relation::Equal,
            (true, false) => Relation::Subset,
            (false, true) => Relation::Superset,
            (false, false) => Relation::Different,
        }
    }

    pub fn is_approx_equal(&self, other: &Federation) -> bool {
        self.relation(other) == Relation::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbm::Constraint;

    #[test]
    fn union_drops_subsumed_members() {
        let mut f = Federation::empty(2);
        let mut loose = Dbm::unconstrained(2);
        loose.restrict(Constraint::upper_non_strict(1, 10)).unwrap();
        let mut tight = Dbm::unconstrained(2);
        tight.restrict(Constraint::upper_non_strict(1, 3)).unwrap();

        f.union(loose.clone(), Federation::DEFAULT_CAPACITY);
        f.union(tight, Federation::DEFAULT_CAPACITY);
        assert_eq!(f.len(), 1);
        assert!(f.members()[0].equals(&loose).unwrap());
    }

    #[test]
    fn union_ignores_a_subsumed_newcomer() {
        let mut f = Federation::empty(2);
        let mut loose = Dbm::unconstrained(2);
        loose.restrict(Constraint::upper_non_strict(1, 10)).unwrap();
        let mut tight = Dbm::unconstrained(2);
        tight.restrict(Constraint::upper_non_strict(1, 3)).unwrap();

        f.union(loose, Federation::DEFAULT_CAPACITY);
        f.union(tight, Federation::DEFAULT_CAPACITY);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn is_empty_after_contradictory_restrict() {
        let mut f = Federation::singleton(Dbm::unconstrained(2));
        f.restrict(Constraint::upper_strict(1, 0)).unwrap();
        f.restrict(Constraint::lower_non_strict(1, 0)).unwrap();
        assert!(f.is_empty());
    }

    #[test]
    fn relation_equal_for_identical_federations() {
        let f = Federation::singleton(Dbm::zero(2));
        let g = Federation::singleton(Dbm::zero(2));
        assert_eq!(f.relation(&g), Relation::Equal);
        assert!(f.is_approx_equal(&g));
    }

    #[test]
    fn relation_subset_when_tighter() {
        let mut tight = Dbm::unconstrained(2);
        tight.restrict(Constraint::upper_non_strict(1, 3)).unwrap();
        let f = Federation::singleton(tight);
        let g = Federation::singleton(Dbm::unconstrained(2));
        assert_eq!(f.relation(&g), Relation::Subset);
        assert_eq!(g.relation(&f), Relation::Superset);
    }

    #[test]
    fn intersection_federation_prunes_empty_products() {
        let mut lo = Dbm::unconstrained(2);
        lo.restrict(Constraint::lower_non_strict(1, 5)).unwrap();
        let mut hi = Dbm::unconstrained(2);
        hi.restrict(Constraint::upper_non_strict(1, 3)).unwrap();

        let mut f = Federation::singleton(lo);
        f.intersection_federation(&Federation::singleton(hi), Federation::DEFAULT_CAPACITY)
            .unwrap();
        assert!(f.is_empty());
    }

    #[test]
    fn capacity_forces_convex_overapproximation() {
        let mut f = Federation::empty(2);
        for c in 0..10 {
            let mut d = Dbm::unconstrained(2);
            d.restrict(Constraint::lower_non_strict(1, c)).unwrap();
            d.restrict(Constraint::upper_non_strict(1, c)).unwrap();
            f.union(d, 4);
        }
        assert!(f.len() <= 4);
        assert!(!f.is_empty());
    }
}
