//! Typed, bounded parameter leaves and the folding transfer function (§4.1,
//! §9's `ParameterLeaf` sum type).

use super::adaptor::Adaptor;
use geneva_error::{GenevaResult, ensure, geneva_err};
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Folds `v` into `[lo, hi)` (doubles) as if the number line were folded
/// accordion-style at every multiple of `hi - lo`, so a distribution
/// centred inside the domain stays unbiased after transfer (§4.1).
pub fn fold_double(v: f64, lo: f64, hi: f64) -> f64 {
    if v >= lo && v < hi {
        return v;
    }
    let width = hi - lo;
    let r = ((v - lo) / width).floor();
    if (r.rem_euclid(2.0)) == 0.0 {
        v - r * width
    } else {
        -v + (r - 1.0) * width + 2.0 * hi
    }
}

/// Integer analogue of [`fold_double`]; range size is `hi - lo + 1`
/// (upper-inclusive) and the odd-fold branch reverses as well as shifts.
pub fn fold_int(v: i64, lo: i64, hi: i64) -> i64 {
    if v >= lo && v <= hi {
        return v;
    }
    let width = hi - lo + 1;
    let r = (v - lo).div_euclid(width);
    let shifted = v - r * width;
    if r.rem_euclid(2) == 0 {
        shifted
    } else {
        hi - (shifted - lo)
    }
}

/// A continuous bounded parameter: external value lives in `[lo, hi)`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DoubleParam {
    internal: f64,
    lo: f64,
    hi: f64,
    adaptor: Adaptor,
}

impl DoubleParam {
    pub fn new(val: f64, lo: f64, hi: f64, adaptor: Adaptor) -> GenevaResult<Self> {
        ensure!(lo < hi, InvalidConfig: "double parameter requires lo ({}) < hi ({})", lo, hi);
        ensure!(
            val >= lo && val < hi,
            InvalidConfig: "initial value {} must lie in [{}, {})", val, lo, hi
        );
        Ok(Self {
            internal: val,
            lo,
            hi,
            adaptor,
        })
    }

    /// The bounded, externally-visible value.
    pub fn value(&self) -> f64 {
        fold_double(self.internal, self.lo, self.hi)
    }

    /// Raw, possibly out-of-range internal value the adaptor perturbs.
    pub fn internal(&self) -> f64 {
        self.internal
    }

    pub fn set_internal(&mut self, v: f64) {
        self.internal = v;
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn typical_range(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn adaptor(&self) -> &Adaptor {
        &self.adaptor
    }

    pub fn adaptor_mut(&mut self) -> &mut Adaptor {
        &mut self.adaptor
    }

    /// Atomically sets value and bounds; fails on inconsistency rather than
    /// applying a partial update.
    pub fn set_value(&mut self, v: f64, lo: f64, hi: f64) -> GenevaResult<()> {
        ensure!(lo < hi, InvalidConfig: "lo ({}) must be < hi ({})", lo, hi);
        ensure!(v >= lo && v < hi, InvalidConfig: "value {} must lie in [{}, {})", v, lo, hi);
        self.internal = v;
        self.lo = lo;
        self.hi = hi;
        Ok(())
    }

    /// Fails if the *current* external value would fall outside the new
    /// bounds.
    pub fn set_boundaries(&mut self, lo: f64, hi: f64) -> GenevaResult<()> {
        ensure!(lo < hi, InvalidConfig: "lo ({}) must be < hi ({})", lo, hi);
        let current = self.value();
        ensure!(
            current >= lo && current < hi,
            InvalidConfig: "current value {} would fall outside new bounds [{}, {})", current, lo, hi
        );
        self.lo = lo;
        self.hi = hi;
        Ok(())
    }

    pub fn random_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.internal = crate::random::uniform_real(rng, self.lo, self.hi);
    }
}

/// A 32-bit signed integer parameter: external value lives in `[lo, hi]`
/// (upper inclusive — the key semantic difference from [`DoubleParam`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Int32Param {
    internal: i32,
    lo: i32,
    hi: i32,
    adaptor: Adaptor,
}

impl Int32Param {
    pub fn new(val: i32, lo: i32, hi: i32, adaptor: Adaptor) -> GenevaResult<Self> {
        ensure!(lo <= hi, InvalidConfig: "int parameter requires lo ({}) <= hi ({})", lo, hi);
        ensure!(
            val >= lo && val <= hi,
            InvalidConfig: "initial value {} must lie in [{}, {}]", val, lo, hi
        );
        Ok(Self {
            internal: val,
            lo,
            hi,
            adaptor,
        })
    }

    pub fn value(&self) -> i32 {
        fold_int(self.internal as i64, self.lo as i64, self.hi as i64) as i32
    }

    pub fn internal(&self) -> i32 {
        self.internal
    }

    pub fn set_internal(&mut self, v: i32) {
        self.internal = v;
    }

    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn typical_range(&self) -> f64 {
        (self.hi - self.lo) as f64
    }

    pub fn adaptor(&self) -> &Adaptor {
        &self.adaptor
    }

    pub fn adaptor_mut(&mut self) -> &mut Adaptor {
        &mut self.adaptor
    }

    pub fn set_value(&mut self, v: i32, lo: i32, hi: i32) -> GenevaResult<()> {
        ensure!(lo <= hi, InvalidConfig: "lo ({}) must be <= hi ({})", lo, hi);
        ensure!(v >= lo && v <= hi, InvalidConfig: "value {} must lie in [{}, {}]", v, lo, hi);
        self.internal = v;
        self.lo = lo;
        self.hi = hi;
        Ok(())
    }

    pub fn set_boundaries(&mut self, lo: i32, hi: i32) -> GenevaResult<()> {
        ensure!(lo <= hi, InvalidConfig: "lo ({}) must be <= hi ({})", lo, hi);
        let current = self.value();
        ensure!(
            current >= lo && current <= hi,
            InvalidConfig: "current value {} would fall outside new bounds [{}, {}]", current, lo, hi
        );
        self.lo = lo;
        self.hi = hi;
        Ok(())
    }

    pub fn random_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.internal = crate::random::uniform_int_inclusive(rng, self.lo, self.hi);
    }
}

/// An unconstrained boolean parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoolParam {
    value: bool,
    adaptor: Adaptor,
}

impl BoolParam {
    pub fn new(value: bool, adaptor: Adaptor) -> Self {
        Self { value, adaptor }
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn set_value(&mut self, value: bool) {
        self.value = value;
    }

    pub fn adaptor(&self) -> &Adaptor {
        &self.adaptor
    }

    pub fn adaptor_mut(&mut self) -> &mut Adaptor {
        &mut self.adaptor
    }

    pub fn random_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.value = rng.random_bool(0.5);
    }
}

/// The closed set of parameter kinds (§3, §9's sum-type redesign note).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterLeaf {
    Double(DoubleParam),
    Int(Int32Param),
    Bool(BoolParam),
}

impl ParameterLeaf {
    pub fn adaptor(&self) -> &Adaptor {
        match self {
            ParameterLeaf::Double(p) => p.adaptor(),
            ParameterLeaf::Int(p) => p.adaptor(),
            ParameterLeaf::Bool(p) => p.adaptor(),
        }
    }

    pub fn adaptor_mut(&mut self) -> &mut Adaptor {
        match self {
            ParameterLeaf::Double(p) => p.adaptor_mut(),
            ParameterLeaf::Int(p) => p.adaptor_mut(),
            ParameterLeaf::Bool(p) => p.adaptor_mut(),
        }
    }

    pub fn random_init<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self {
            ParameterLeaf::Double(p) => p.random_init(rng),
            ParameterLeaf::Int(p) => p.random_init(rng),
            ParameterLeaf::Bool(p) => p.random_init(rng),
        }
    }

    pub fn as_double(&self) -> GenevaResult<f64> {
        match self {
            ParameterLeaf::Double(p) => Ok(p.value()),
            _ => Err(geneva_err!(InvalidParameter: "leaf is not a double parameter")),
        }
    }

    pub fn as_int(&self) -> GenevaResult<i32> {
        match self {
            ParameterLeaf::Int(p) => Ok(p.value()),
            _ => Err(geneva_err!(InvalidParameter: "leaf is not an int parameter")),
        }
    }

    pub fn as_bool(&self) -> GenevaResult<bool> {
        match self {
            ParameterLeaf::Bool(p) => Ok(p.value()),
            _ => Err(geneva_err!(InvalidParameter: "leaf is not a bool parameter")),
        }
    }
}
