//! The optimization sense and the minimize-transformed world selection
//! always operates in (§4.10, §6 "maximize").

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether the engine is minimizing or maximizing the raw fitness vector.
/// Applies uniformly across every objective — Geneva has one process-wide
/// sense, not a per-objective list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Optimize {
    Minimize,
    Maximize,
}

impl Optimize {
    /// Produces the minimize-transformed mirror of a raw fitness vector:
    /// identity for minimization, negated for maximization (§4.10).
    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        match self {
            Optimize::Minimize => raw.to_vec(),
            Optimize::Maximize => raw.iter().map(|v| -v).collect(),
        }
    }

    /// Compares two *raw* scalars in this objective's preference order.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        match self {
            Optimize::Minimize => a < b,
            Optimize::Maximize => a > b,
        }
    }
}

/// Pareto dominance over two already minimize-transformed fitness vectors:
/// `a` dominates `b` iff no entry of `a` is worse (larger) and at least one
/// is strictly better (§4.8).
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).all(|(x, y)| x <= y) && a.iter().zip(b).any(|(x, y)| x < y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximize_transform_negates() {
        assert_eq!(Optimize::Maximize.transform(&[1.0, -2.0]), vec![-1.0, 2.0]);
        assert_eq!(Optimize::Minimize.transform(&[1.0, -2.0]), vec![1.0, -2.0]);
    }

    #[test]
    fn dominance_requires_no_worse_and_one_strictly_better() {
        assert!(dominates(&[1.0, 1.0], &[1.0, 2.0]));
        assert!(!dominates(&[1.0, 1.0], &[1.0, 1.0]));
        assert!(!dominates(&[2.0, 0.0], &[1.0, 1.0]));
    }
}
