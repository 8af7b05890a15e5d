//! An ordered sequence of parameter leaves, with the streamline/assign/
//! boundaries/amalgamate view operations a whole parameter set offers over
//! its leaves (§4.3).

use super::leaf::ParameterLeaf;
use geneva_error::{GenevaResult, ensure, geneva_err};
use rand::Rng;
use std::collections::HashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered parameter set — what the objective function is evaluated
/// against. Optionally, leaves carry a name for the name-indexed streamline
/// view; unnamed leaves are simply omitted from that view.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParameterSet {
    leaves: Vec<ParameterLeaf>,
    names: Vec<Option<String>>,
}

impl ParameterSet {
    pub fn new(leaves: Vec<ParameterLeaf>) -> Self {
        let names = vec![None; leaves.len()];
        Self { leaves, names }
    }

    pub fn with_names(leaves: Vec<ParameterLeaf>, names: Vec<Option<String>>) -> GenevaResult<Self> {
        ensure!(
            leaves.len() == names.len(),
            InvalidConfig: "leaves and names must have the same length"
        );
        Ok(Self { leaves, names })
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterLeaf> {
        self.leaves.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ParameterLeaf> {
        self.leaves.iter_mut()
    }

    pub fn leaves(&self) -> &[ParameterLeaf] {
        &self.leaves
    }

    /// Re-draws every leaf's value uniformly within its bounds. Geneva has
    /// no per-leaf activity gating beyond "every leaf is active" — nothing
    /// downstream distinguishes active from inactive leaves.
    pub fn random_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for leaf in &mut self.leaves {
            leaf.random_init(rng);
        }
    }

    pub fn streamline_doubles(&self) -> Vec<f64> {
        self.leaves
            .iter()
            .filter_map(|l| match l {
                ParameterLeaf::Double(p) => Some(p.value()),
                _ => None,
            })
            .collect()
    }

    pub fn streamline_ints(&self) -> Vec<i32> {
        self.leaves
            .iter()
            .filter_map(|l| match l {
                ParameterLeaf::Int(p) => Some(p.value()),
                _ => None,
            })
            .collect()
    }

    pub fn streamline_bools(&self) -> Vec<bool> {
        self.leaves
            .iter()
            .filter_map(|l| match l {
                ParameterLeaf::Bool(p) => Some(p.value()),
                _ => None,
            })
            .collect()
    }

    pub fn streamline_doubles_named(&self) -> HashMap<String, Vec<f64>> {
        self.streamline_named(|l| match l {
            ParameterLeaf::Double(p) => Some(p.value()),
            _ => None,
        })
    }

    pub fn streamline_ints_named(&self) -> HashMap<String, Vec<i32>> {
        self.streamline_named(|l| match l {
            ParameterLeaf::Int(p) => Some(p.value()),
            _ => None,
        })
    }

    pub fn streamline_bools_named(&self) -> HashMap<String, Vec<bool>> {
        self.streamline_named(|l| match l {
            ParameterLeaf::Bool(p) => Some(p.value()),
            _ => None,
        })
    }

    fn streamline_named<T>(&self, extract: impl Fn(&ParameterLeaf) -> Option<T>) -> HashMap<String, Vec<T>> {
        let mut map: HashMap<String, Vec<T>> = HashMap::new();
        for (leaf, name) in self.leaves.iter().zip(self.names.iter()) {
            if let (Some(value), Some(name)) = (extract(leaf), name) {
                map.entry(name.clone()).or_default().push(value);
            }
        }
        map
    }

    /// Inverse of [`ParameterSet::streamline_doubles`]: fails if `values`
    /// does not have exactly one entry per double leaf.
    pub fn assign_doubles(&mut self, values: &[f64]) -> GenevaResult<()> {
        let mut it = values.iter();
        for leaf in &mut self.leaves {
            if let ParameterLeaf::Double(p) = leaf {
                let v = it
                    .next()
                    .ok_or_else(|| geneva_err!(InvalidParameter: "not enough double values to assign"))?;
                p.set_internal(*v);
            }
        }
        ensure!(it.next().is_none(), InvalidParameter: "too many double values to assign");
        Ok(())
    }

    pub fn assign_ints(&mut self, values: &[i32]) -> GenevaResult<()> {
        let mut it = values.iter();
        for leaf in &mut self.leaves {
            if let ParameterLeaf::Int(p) = leaf {
                let v = it
                    .next()
                    .ok_or_else(|| geneva_err!(InvalidParameter: "not enough int values to assign"))?;
                p.set_internal(*v);
            }
        }
        ensure!(it.next().is_none(), InvalidParameter: "too many int values to assign");
        Ok(())
    }

    pub fn assign_bools(&mut self, values: &[bool]) -> GenevaResult<()> {
        let mut it = values.iter();
        for leaf in &mut self.leaves {
            if let ParameterLeaf::Bool(p) = leaf {
                let v = it
                    .next()
                    .ok_or_else(|| geneva_err!(InvalidParameter: "not enough bool values to assign"))?;
                p.set_value(*v);
            }
        }
        ensure!(it.next().is_none(), InvalidParameter: "too many bool values to assign");
        Ok(())
    }

    pub fn double_boundaries(&self) -> (Vec<f64>, Vec<f64>) {
        self.leaves
            .iter()
            .filter_map(|l| match l {
                ParameterLeaf::Double(p) => Some((p.lo(), p.hi())),
                _ => None,
            })
            .unzip()
    }

    pub fn int_boundaries(&self) -> (Vec<i32>, Vec<i32>) {
        self.leaves
            .iter()
            .filter_map(|l| match l {
                ParameterLeaf::Int(p) => Some((p.lo(), p.hi())),
                _ => None,
            })
            .unzip()
    }

    /// Fusion recombination: for each leaf, pick `self`'s or `other`'s leaf
    /// with probability 0.5 (uniform crossover). `self` and `other` must
    /// have the same length and leaf-type sequence.
    pub fn amalgamate<R: Rng + ?Sized>(&self, other: &ParameterSet, rng: &mut R) -> GenevaResult<ParameterSet> {
        ensure!(
            self.leaves.len() == other.leaves.len(),
            InvalidParameter: "amalgamate requires parameter sets of equal length"
        );

        let mut leaves = Vec::with_capacity(self.leaves.len());
        for (a, b) in self.leaves.iter().zip(other.leaves.iter()) {
            ensure!(
                std::mem::discriminant(a) == std::mem::discriminant(b),
                InvalidParameter: "amalgamate requires matching leaf types at every position"
            );
            leaves.push(if rng.random_bool(0.5) { a.clone() } else { b.clone() });
        }

        Ok(ParameterSet {
            leaves,
            names: self.names.clone(),
        })
    }

    /// With probability `p` per leaf, swaps the two sets' values (not their
    /// adaptor state) at that position.
    pub fn per_item_crossover<R: Rng + ?Sized>(
        &mut self,
        other: &mut ParameterSet,
        p: f64,
        rng: &mut R,
    ) -> GenevaResult<()> {
        ensure!(
            self.leaves.len() == other.leaves.len(),
            InvalidParameter: "per_item_crossover requires parameter sets of equal length"
        );

        for (a, b) in self.leaves.iter_mut().zip(other.leaves.iter_mut()) {
            if !rng.random_bool(p.clamp(0.0, 1.0)) {
                continue;
            }
            match (a, b) {
                (ParameterLeaf::Double(da), ParameterLeaf::Double(db)) => {
                    let tmp = da.internal();
                    da.set_internal(db.internal());
                    db.set_internal(tmp);
                }
                (ParameterLeaf::Int(ia), ParameterLeaf::Int(ib)) => {
                    let tmp = ia.internal();
                    ia.set_internal(ib.internal());
                    ib.set_internal(tmp);
                }
                (ParameterLeaf::Bool(ba), ParameterLeaf::Bool(bb)) => {
                    let tmp = ba.value();
                    ba.set_value(bb.value());
                    bb.set_value(tmp);
                }
                _ => {
                    return Err(geneva_err!(
                        InvalidParameter: "per_item_crossover requires matching leaf types at every position"
                    ));
                }
            }
        }
        Ok(())
    }
}
