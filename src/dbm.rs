//! Canonical difference-bound matrices (DBMs): the representation of a
//! single convex clock zone (§3, §4.1).

use crate::bound::{Bound, ClockValue};
use crate::error::DbmError;
use crate::time::{ClockIndex, ZERO_CLOCK};

/// A single difference-bound constraint `x_i - x_j ⋈ bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub i: ClockIndex,
    pub j: ClockIndex,
    pub bound: Bound,
}

impl Constraint {
    pub fn new(i: ClockIndex, j: ClockIndex, bound: Bound) -> Constraint {
        Constraint { i, j, bound }
    }

    /// `x > c`, i.e. `x_0 - x ⋈ (-c, <)`.
    pub fn lower_strict(x: ClockIndex, c: ClockValue) -> Constraint {
        Constraint::new(ZERO_CLOCK, x, Bound::strict(-c))
    }

    /// `x >= c`, i.e. `x_0 - x ⋈ (-c, ≤)`.
    pub fn lower_non_strict(x: ClockIndex, c: ClockValue) -> Constraint {
        Constraint::new(ZERO_CLOCK, x, Bound::non_strict(-c))
    }

    /// `x < c`, i.e. `x - x_0 ⋈ (c, <)`.
    pub fn upper_strict(x: ClockIndex, c: ClockValue) -> Constraint {
        Constraint::new(x, ZERO_CLOCK, Bound::strict(c))
    }

    /// `x <= c`, i.e. `x - x_0 ⋈ (c, ≤)`.
    pub fn upper_non_strict(x: ClockIndex, c: ClockValue) -> Constraint {
        Constraint::new(x, ZERO_CLOCK, Bound::non_strict(c))
    }
}

/// A canonical difference-bound matrix over `dim` clocks (including the
/// zero clock at index 0).
///
/// Every operation that can change the constraint set re-closes the
/// matrix by Floyd–Warshall (§4.1) and tracks emptiness as a derived
/// flag rather than re-scanning the diagonal on every query.
#[derive(Debug, Clone)]
pub struct Dbm {
    dim: usize,
    matrix: Vec<Bound>,
    empty: bool,
}

impl Dbm {
    fn index(&self, i: ClockIndex, j: ClockIndex) -> usize {
        i * self.dim + j
    }

    fn get(&self, i: ClockIndex, j: ClockIndex) -> Bound {
        self.matrix[self.index(i, j)]
    }

    fn set(&mut self, i: ClockIndex, j: ClockIndex, b: Bound) {
        let idx = self.index(i, j);
        self.matrix[idx] = b;
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The all-zero valuation (every clock equals 0): the origin.
    pub fn zero(dim: usize) -> Dbm {
        let mut m = Dbm {
            dim,
            matrix: vec![Bound::ZERO_NON_STRICT; dim * dim],
            empty: false,
        };
        m.close();
        m
    }

    /// Every clock constrained only by `x >= 0`; no upper bounds.
    pub fn unconstrained(dim: usize) -> Dbm {
        let mut matrix = vec![Bound::INFINITY; dim * dim];
        for i in 0..dim {
            matrix[i * dim + i] = Bound::ZERO_NON_STRICT;
        }
        for j in 0..dim {
            // x_0 - x_j <= 0, i.e. x_j >= 0.
            matrix[ZERO_CLOCK * dim + j] = Bound::ZERO_NON_STRICT;
        }
        let mut m = Dbm {
            dim,
            matrix,
            empty: false,
        };
        m.close();
        m
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    fn check_constraint_dim(&self, c: &Constraint) -> Result<(), DbmError> {
        if c.i >= self.dim || c.j >= self.dim {
            return Err(DbmError::ClockOutOfRange {
                index: c.i.max(c.j),
                dimension: self.dim,
            });
        }
        Ok(())
    }

    /// Floyd–Warshall closure. Marks the matrix empty iff any diagonal
    /// entry becomes negative, i.e. tighter than `(0, ≤)`.
    fn close(&mut self) {
        if self.empty {
            return;
        }
        let n = self.dim;
        for k in 0..n {
            for i in 0..n {
                let via_ik = self.get(i, k);
                if via_ik.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = via_ik + self.get(k, j);
                    if candidate < self.get(i, j) {
                        self.set(i, j, candidate);
                    }
                }
            }
        }
        for i in 0..n {
            if self.get(i, i) < Bound::ZERO_NON_STRICT {
                self.empty = true;
                return;
            }
        }
    }

    /// Intersect with a single constraint, re-closing afterward.
    pub fn restrict(&mut self, c: Constraint) -> Result<(), DbmError> {
        self.check_constraint_dim(&c)?;
        if self.empty {
            return Ok(());
        }
        if c.bound < self.get(c.i, c.j) {
            self.set(c.i, c.j, c.bound);
        }
        self.close();
        Ok(())
    }

    /// Intersect with a batch of constraints (an invariant or a guard).
    pub fn restrict_all(&mut self, cs: &[Constraint]) -> Result<(), DbmError> {
        for c in cs {
            self.restrict(*c)?;
        }
        Ok(())
    }

    /// Hypothetically restrict by `c` without mutating `self`; report
    /// whether the result would be non-empty.
    pub fn is_satisfying(&self, c: Constraint) -> Result<bool, DbmError> {
        let mut clone = self.clone();
        clone.restrict(c)?;
        Ok(!clone.is_empty())
    }

    pub fn is_satisfying_all(&self, cs: &[Constraint]) -> Result<bool, DbmError> {
        let mut clone = self.clone();
        clone.restrict_all(cs)?;
        Ok(!clone.is_empty())
    }

    /// Reset clock `x` to 0: `assign(x, 0)`.
    pub fn assign_zero(&mut self, x: ClockIndex) -> Result<(), DbmError> {
        if x >= self.dim {
            return Err(DbmError::ClockOutOfRange {
                index: x,
                dimension: self.dim,
            });
        }
        if self.empty {
            return Ok(());
        }
        for j in 0..self.dim {
            if j == x {
                continue;
            }
            let via_zero_row = self.get(ZERO_CLOCK, j);
            let via_zero_col = self.get(j, ZERO_CLOCK);
            self.set(x, j, via_zero_row);
            self.set(j, x, via_zero_col);
        }
        self.set(x, x, Bound::ZERO_NON_STRICT);
        self.close();
        Ok(())
    }

    /// Reset every clock in `xs` to 0.
    pub fn assign_zero_all(&mut self, xs: &[ClockIndex]) -> Result<(), DbmError> {
        for x in xs {
            self.assign_zero(*x)?;
        }
        Ok(())
    }

    /// Forget `x`'s value entirely (projection): every bound involving
    /// `x` becomes unconstrained except the implicit `x >= 0`.
    pub fn free(&mut self, x: ClockIndex) -> Result<(), DbmError> {
        if x >= self.dim {
            return Err(DbmError::ClockOutOfRange {
                index: x,
                dimension: self.dim,
            });
        }
        if self.empty {
            return Ok(());
        }
        for j in 0..self.dim {
            if j == x {
                continue;
            }
            self.set(x, j, Bound::INFINITY);
            self.set(j, x, Bound::INFINITY);
        }
        self.set(ZERO_CLOCK, x, Bound::ZERO_NON_STRICT);
        self.close();
        Ok(())
    }

    pub fn free_all(&mut self, xs: &[ClockIndex]) -> Result<(), DbmError> {
        for x in xs {
            self.free(*x)?;
        }
        Ok(())
    }

    /// Let time pass unboundedly (delay/"future"): drop every clock's
    /// upper bound relative to the zero clock.
    pub fn future(&mut self) {
        if self.empty {
            return;
        }
        for i in 0..self.dim {
            if i == ZERO_CLOCK {
                continue;
            }
            self.set(i, ZERO_CLOCK, Bound::INFINITY);
        }
        self.close();
    }

    /// The inverse of [Dbm::future]: relax every clock's lower bound to
    /// `0` ("past"), i.e. allow any non-negative amount of time to have
    /// elapsed since the valuations in this DBM were reached.
    pub fn past(&mut self) {
        if self.empty {
            return;
        }
        for j in 0..self.dim {
            if j == ZERO_CLOCK {
                continue;
            }
            self.set(ZERO_CLOCK, j, Bound::ZERO_NON_STRICT);
        }
        self.close();
    }

    /// The componentwise loosest (maximum) bound of two DBMs of equal
    /// dimension: a convex overapproximation of their union, used by
    /// [crate::federation::Federation] when it must widen rather than
    /// grow its member count further (§5 Memory). Not re-closed: the
    /// max of two closed matrices is already closed.
    pub(crate) fn hull_of(a: &Dbm, b: &Dbm) -> Dbm {
        debug_assert_eq!(a.dim, b.dim);
        if a.empty {
            return b.clone();
        }
        if b.empty {
            return a.clone();
        }
        let dim = a.dim;
        let matrix = a
            .matrix
            .iter()
            .zip(b.matrix.iter())
            .map(|(x, y)| if *x > *y { *x } else { *y })
            .collect();
        Dbm {
            dim,
            matrix,
            empty: false,
        }
    }

    /// Intersect with another DBM of the same dimension.
    pub fn intersection(&mut self, other: &Dbm) -> Result<(), DbmError> {
        if self.dim != other.dim {
            return Err(DbmError::DimensionMismatch {
                expected: self.dim,
                actual: other.dim,
            });
        }
        if self.empty {
            return Ok(());
        }
        if other.empty {
            self.empty = true;
            return Ok(());
        }
        for i in 0..self.dim {
            for j in 0..self.dim {
                let b = other.get(i, j);
                if b < self.get(i, j) {
                    self.set(i, j, b);
                }
            }
        }
        self.close();
        Ok(())
    }

    /// `self ⊆ other`, i.e. every bound of `self` is at least as tight
    /// as the corresponding bound of `other`.
    pub fn subset(&self, other: &Dbm) -> Result<bool, DbmError> {
        if self.dim != other.dim {
            return Err(DbmError::DimensionMismatch {
                expected: self.dim,
                actual: other.dim,
            });
        }
        if self.empty {
            return Ok(true);
        }
        if other.empty {
            return Ok(false);
        }
        for i in 0..self.dim {
            for j in 0..self.dim {
                if self.get(i, j) > other.get(i, j) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub fn equals(&self, other: &Dbm) -> Result<bool, DbmError> {
        if self.dim != other.dim {
            return Err(DbmError::DimensionMismatch {
                expected: self.dim,
                actual: other.dim,
            });
        }
        if self.empty || other.empty {
            return Ok(self.empty == other.empty);
        }
        Ok(self.matrix == other.matrix)
    }
}

impl PartialEq for Dbm {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_the_origin() {
        let z = Dbm::zero(2);
        assert!(!z.is_empty());
        assert!(z.is_satisfying(Constraint::upper_non_strict(1, 0)).unwrap());
        assert!(!z.is_satisfying(Constraint::lower_strict(1, 0)).unwrap());
    }

    #[test]
    fn unconstrained_allows_any_non_negative_value() {
        let u = Dbm::unconstrained(2);
        assert!(!u.is_empty());
        assert!(u.is_satisfying(Constraint::lower_non_strict(1, 1_000_000)).unwrap());
        assert!(!u.is_satisfying(Constraint::upper_strict(1, 0)).unwrap());
    }

    #[test]
    fn restrict_to_contradiction_is_empty() {
        let mut d = Dbm::unconstrained(2);
        d.restrict(Constraint::upper_strict(1, 5)).unwrap();
        d.restrict(Constraint::lower_non_strict(1, 5)).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn restrict_is_commutative_denotationally() {
        let c1 = Constraint::upper_non_strict(1, 10);
        let c2 = Constraint::lower_non_strict(1, 2);

        let mut a = Dbm::unconstrained(2);
        a.restrict(c1).unwrap();
        a.restrict(c2).unwrap();

        let mut b = Dbm::unconstrained(2);
        b.restrict(c2).unwrap();
        b.restrict(c1).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn close_is_idempotent() {
        let mut d = Dbm::unconstrained(3);
        d.restrict(Constraint::upper_non_strict(1, 10)).unwrap();
        d.restrict(Constraint::new(1, 2, Bound::non_strict(3))).unwrap();
        let once = d.clone();
        d.close();
        assert_eq!(once, d);
    }

    #[test]
    fn assign_zero_resets_clock() {
        let mut d = Dbm::unconstrained(2);
        d.restrict(Constraint::lower_non_strict(1, 5)).unwrap();
        d.assign_zero(1).unwrap();
        assert!(d.is_satisfying(Constraint::upper_non_strict(1, 0)).unwrap());
        assert!(!d.is_satisfying(Constraint::lower_strict(1, 0)).unwrap());
    }

    #[test]
    fn free_drops_all_bounds_but_non_negativity() {
        let mut d = Dbm::unconstrained(2);
        d.restrict(Constraint::upper_non_strict(1, 3)).unwrap();
        d.free(1).unwrap();
        assert!(d.is_satisfying(Constraint::lower_non_strict(1, 1_000_000)).unwrap());
        assert!(!d.is_satisfying(Constraint::upper_strict(1, 0)).unwrap());
    }

    #[test]
    fn future_drops_upper_bounds_only() {
        let mut d = Dbm::unconstrained(2);
        d.restrict(Constraint::upper_non_strict(1, 3)).unwrap();
        d.restrict(Constraint::lower_non_strict(1, 1)).unwrap();
        d.future();
        assert!(d.is_satisfying(Constraint::lower_non_strict(1, 1_000_000)).unwrap());
        // the lower bound established before the delay still holds
        assert!(!d.is_satisfying(Constraint::upper_strict(1, 1)).unwrap());
    }

    #[test]
    fn past_relaxes_lower_bounds_to_zero() {
        let mut d = Dbm::unconstrained(2);
        d.restrict(Constraint::lower_non_strict(1, 5)).unwrap();
        d.past();
        assert!(d.is_satisfying(Constraint::upper_non_strict(1, 0)).unwrap());
    }

    #[test]
    fn intersection_is_commutative_and_associative_up_to_equality() {
        let mut a = Dbm::unconstrained(2);
        a.restrict(Constraint::upper_non_strict(1, 10)).unwrap();
        let mut b = Dbm::unconstrained(2);
        b.restrict(Constraint::lower_non_strict(1, 2)).unwrap();
        let mut c = Dbm::unconstrained(2);
        c.restrict(Constraint::upper_non_strict(1, 8)).unwrap();

        let mut ab = a.clone();
        ab.intersection(&b).unwrap();
        let mut ba = b.clone();
        ba.intersection(&a).unwrap();
        assert_eq!(ab, ba);

        let mut ab_c = ab.clone();
        ab_c.intersection(&c).unwrap();
        let mut bc = b.clone();
        bc.intersection(&c).unwrap();
        let mut a_bc = a.clone();
        a_bc.intersection(&bc).unwrap();
        assert_eq!(ab_c, a_bc);
    }

    #[test]
    fn subset_implies_tighter_or_equal_bounds() {
        let mut tight = Dbm::unconstrained(2);
        tight.restrict(Constraint::upper_non_strict(1, 3)).unwrap();
        let loose = Dbm::unconstrained(2);
        assert!(tight.subset(&loose).unwrap());
        assert!(!loose.subset(&tight).unwrap());
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let a = Dbm::unconstrained(2);
        let b = Dbm::unconstrained(3);
        assert!(matches!(
            a.intersection(&b),
            Err(DbmError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn zero_dim_single_clock_dbm_is_universal_or_empty() {
        let d = Dbm::unconstrained(1);
        assert!(!d.is_empty());
        let mut e = d.clone();
        e.restrict(Constraint::upper_strict(ZERO_CLOCK, 0)).unwrap();
        assert!(e.is_empty());
    }
}
