//! The difference-bound algebra underlying a single DBM entry.
//!
//! A [Bound] pairs an integer (or `+∞`) with a strictness flag and models
//! the right-hand side of a constraint `x_i - x_j ⋈ v`, where `⋈` is `<`
//! when `strict` and `≤` otherwise.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// An integer clock value. Differences between clock valuations are
/// always representable in this range; the domain itself is discrete.
pub type ClockValue = i64;

/// `(v, strict)`: either a finite integer bound or `+∞`, paired with
/// whether the bound is strict (`<`) or non-strict (`≤`).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Bound {
    value: BoundValue,
    strict: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum BoundValue {
    Finite(ClockValue),
    Infinite,
}

impl Bound {
    /// The bound `(0, ≤)`, i.e. `x_i - x_j ≤ 0`.
    pub const ZERO_NON_STRICT: Bound = Bound {
        value: BoundValue::Finite(0),
        strict: false,
    };

    /// `+∞`, non-strict by convention (it never constrains anything).
    pub const INFINITY: Bound = Bound {
        value: BoundValue::Infinite,
        strict: false,
    };

    /// A finite, non-strict bound `(v, ≤)`.
    pub fn non_strict(v: ClockValue) -> Bound {
        Bound {
            value: BoundValue::Finite(v),
            strict: false,
        }
    }

    /// A finite, strict bound `(v, <)`.
    pub fn strict(v: ClockValue) -> Bound {
        Bound {
            value: BoundValue::Finite(v),
            strict: true,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.value, BoundValue::Infinite)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// The finite value of this bound, if any.
    pub fn value(&self) -> Option<ClockValue> {
        match self.value {
            BoundValue::Finite(v) => Some(v),
            BoundValue::Infinite => None,
        }
    }

    /// Negate a finite bound's value, keeping strictness. Used when
    /// flipping a constraint `x_i - x_j ⋈ v` to `x_j - x_i ⋈ -v` for the
    /// opposite strict direction (`≤` becomes `<` and vice versa is the
    /// caller's responsibility; this only negates the value).
    pub fn negated_value(&self) -> Bound {
        match self.value {
            BoundValue::Finite(v) => Bound {
                value: BoundValue::Finite(-v),
                strict: self.strict,
            },
            BoundValue::Infinite => *self,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            BoundValue::Infinite => write!(f, "<inf"),
            BoundValue::Finite(v) if self.strict => write!(f, "<{v}"),
            BoundValue::Finite(v) => write!(f, "<={v}"),
        }
    }
}

/// Lexicographic on `(value, strict)`, with `strict` ordered *before*
/// non-strict at equal value: `(v, <)` is a tighter (smaller) bound than
/// `(v, ≤)`, since it rules out the boundary valuation that the
/// non-strict bound admits.
impl Ord for Bound {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.value, &other.value) {
            (BoundValue::Infinite, BoundValue::Infinite) => Ordering::Equal,
            (BoundValue::Infinite, _) => Ordering::Greater,
            (_, BoundValue::Infinite) => Ordering::Less,
            (BoundValue::Finite(a), BoundValue::Finite(b)) => {
                a.cmp(b).then_with(|| match (self.strict, other.strict) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
            }
        }
    }
}

impl PartialOrd for Bound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `+∞` absorbs; otherwise values add and the result is strict if
/// either operand was.
impl Add for Bound {
    type Output = Bound;

    fn add(self, rhs: Bound) -> Bound {
        match (self.value, rhs.value) {
            (BoundValue::Infinite, _) | (_, BoundValue::Infinite) => Bound::INFINITY,
            (BoundValue::Finite(a), BoundValue::Finite(b)) => Bound {
                value: BoundValue::Finite(a + b),
                strict: self.strict || rhs.strict,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_is_tighter_at_equal_value() {
        assert!(Bound::strict(3) < Bound::non_strict(3));
        assert!(Bound::non_strict(2) < Bound::strict(3));
    }

    #[test]
    fn infinity_is_greatest() {
        assert!(Bound::non_strict(1_000_000) < Bound::INFINITY);
        assert!(Bound::INFINITY == Bound::INFINITY);
    }

    #[test]
    fn addition_absorbs_infinity() {
        assert_eq!(Bound::INFINITY + Bound::non_strict(5), Bound::INFINITY);
        assert_eq!(Bound::non_strict(5) + Bound::INFINITY, Bound::INFINITY);
    }

    #[test]
    fn addition_propagates_strictness() {
        let sum = Bound::strict(2) + Bound::non_strict(3);
        assert_eq!(sum.value(), Some(5));
        assert!(sum.is_strict());

        let sum = Bound::non_strict(2) + Bound::non_strict(3);
        assert!(!sum.is_strict());
    }
}
