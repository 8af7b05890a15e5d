//! The stochastic `adapt` / `customAdaptions` / `customAdaptAdaption`
//! algorithm (§4.2), layered over the adaptor *data* shapes that live in
//! `geneva_core::param::adaptor` (kept there so a `ParameterLeaf` can own an
//! adaptor inline without `geneva-core` depending on this crate — see
//! `DESIGN.md`).

use geneva_core::param::{Adaptor, AdaptionMode, BoolParam, DoubleParam, Int32Param, ParameterLeaf, ParameterSet};
use geneva_core::random::{bernoulli, gaussian, random_sign, standard_normal};
use rand::Rng;

/// Drifts `ad_prob` by the bi-Gaussian-sign pattern, then clamps it (§4.2
/// step 1). Runs unconditionally on every call, regardless of `adaption_mode`.
fn drift_ad_prob<R: Rng + ?Sized>(adaptor: &mut Adaptor, rng: &mut R) {
    let state = adaptor.state_mut();
    if state.adapt_ad_prob > 0.0 {
        let factor = (gaussian(rng, 0.0, state.adapt_ad_prob) * random_sign(rng)).exp();
        state.ad_prob *= factor;
        let drifted = state.ad_prob;
        state.clamp_ad_prob();
        if state.ad_prob != drifted {
            tracing::warn!(drifted, clamped = state.ad_prob, "ad_prob drifted out of range, clamped");
        }
    }
}

/// Whether this call fires a mutation, per `adaption_mode` (§4.2 step 2).
fn should_fire<R: Rng + ?Sized>(adaptor: &Adaptor, rng: &mut R) -> bool {
    match adaptor.state().adaption_mode {
        AdaptionMode::Never => false,
        AdaptionMode::Always => true,
        AdaptionMode::Probabilistic => bernoulli(rng, adaptor.state().ad_prob),
    }
}

/// `adaptAdaption`: the adaptor's self-update. Gaussian perturbs its own
/// `sigma`; flip and identity adaptors carry no further self-adapting state
/// (§4.2 step 3).
fn adapt_adaption<R: Rng + ?Sized>(adaptor: &mut Adaptor, rng: &mut R) {
    let fires = {
        let state = adaptor.state_mut();
        if state.adaption_threshold > 0 {
            state.adaption_counter += 1;
            if state.adaption_counter >= state.adaption_threshold {
                state.adaption_counter = 0;
                true
            } else {
                false
            }
        } else {
            bernoulli(rng, state.adapt_adaption_probability)
        }
    };
    if !fires {
        return;
    }
    if let Adaptor::Gaussian { gaussian: g, .. } = adaptor {
        let factor = (gaussian(rng, 0.0, g.sigma_sigma) * random_sign(rng)).exp();
        g.sigma *= factor;
        let drifted = g.sigma;
        g.clamp_sigma();
        if g.sigma != drifted {
            tracing::warn!(drifted, clamped = g.sigma, "sigma drifted out of range, clamped");
        }
    }
}

/// Applies the self-adapting mutation algorithm to one typed parameter,
/// mutating its internal value in place. Returns whether a mutation actually
/// fired.
pub trait Adapt {
    fn adapt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool;
}

impl Adapt for DoubleParam {
    /// Gaussian `customAdaptions`: `value += sigma * typical_range * N(0,1)`.
    /// Any other adaptor variant leaves the value untouched (a Double leaf
    /// is expected to carry a Gaussian or Identity adaptor).
    fn adapt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let typical_range = self.typical_range();
        let internal = self.internal();
        let adaptor = self.adaptor_mut();
        drift_ad_prob(adaptor, rng);
        if !should_fire(adaptor, rng) {
            return false;
        }
        adapt_adaption(adaptor, rng);
        let delta = match adaptor {
            Adaptor::Gaussian { gaussian: g, .. } => g.sigma * typical_range * standard_normal(rng),
            _ => 0.0,
        };
        self.set_internal(internal + delta);
        true
    }
}

impl Adapt for Int32Param {
    /// Flip `customAdaptions`: `value +/- 1` with equal probability, folded
    /// back into bounds by the transfer function at read time.
    fn adapt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let internal = self.internal();
        let adaptor = self.adaptor_mut();
        drift_ad_prob(adaptor, rng);
        if !should_fire(adaptor, rng) {
            return false;
        }
        adapt_adaption(adaptor, rng);
        let step = match adaptor {
            Adaptor::FlipInt { .. } => {
                if random_sign(rng) > 0.0 { 1 } else { -1 }
            }
            _ => 0,
        };
        self.set_internal(internal + step);
        true
    }
}

impl Adapt for BoolParam {
    /// Flip `customAdaptions`: toggles the value.
    fn adapt<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let current = self.value();
        let adaptor = self.adaptor_mut();
        drift_ad_prob(adaptor, rng);
        if !should_fire(adaptor, rng) {
            return false;
        }
        adapt_adaption(adaptor, rng);
        if matches!(adaptor, Adaptor::FlipBool { .. }) {
            self.set_value(!current);
        }
        true
    }
}

/// Dispatches [`Adapt::adapt`] to whichever typed parameter a leaf holds.
pub fn adapt_leaf<R: Rng + ?Sized>(leaf: &mut ParameterLeaf, rng: &mut R) -> bool {
    match leaf {
        ParameterLeaf::Double(p) => p.adapt(rng),
        ParameterLeaf::Int(p) => p.adapt(rng),
        ParameterLeaf::Bool(p) => p.adapt(rng),
    }
}

/// Runs `adapt_leaf` over every leaf in a parameter set, in sequence order.
/// Each leaf's adaptor self-updates independently per call — the
/// vector-overload semantics of §4.2 ("`adaptAdaption` invoked once per call
/// position, not once per vector") applied to a sum-type parameter set where
/// every leaf already carries its own adaptor rather than sharing one across
/// a vector-valued parameter. Returns the number of leaves actually mutated.
pub fn adapt_set<R: Rng + ?Sized>(set: &mut ParameterSet, rng: &mut R) -> usize {
    let mut count = 0;
    for leaf in set.iter_mut() {
        if adapt_leaf(leaf, rng) {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use geneva_core::param::{AdaptorState, GaussianExtra};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn always_state() -> AdaptorState {
        AdaptorState::new(1.0, 0.0, 1.0, 0.0, AdaptionMode::Always, 0, 0.0).unwrap()
    }

    fn never_state() -> AdaptorState {
        AdaptorState::new(0.0, 0.0, 1.0, 0.0, AdaptionMode::Never, 0, 0.0).unwrap()
    }

    #[test]
    fn gaussian_mutates_value_when_mode_always() {
        let gaussian = GaussianExtra::new(0.3, 0.0, 0.0, 1.0).unwrap();
        let mut param = DoubleParam::new(0.0, -10.0, 10.0, Adaptor::gaussian(always_state(), gaussian)).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let before = param.internal();
        assert!(param.adapt(&mut rng));
        assert_ne!(param.internal(), before);
    }

    #[test]
    fn identity_never_mutates_even_under_always_mode_attempt() {
        // An identity adaptor only accepts AdaptionMode::Never, so it never fires.
        let adaptor = Adaptor::identity(never_state()).unwrap();
        let mut param = DoubleParam::new(1.0, -10.0, 10.0, adaptor).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(!param.adapt(&mut rng));
        assert_eq!(param.internal(), 1.0);
    }

    #[test]
    fn flip_int_changes_by_exactly_one() {
        let mut param = Int32Param::new(0, -10, 10, Adaptor::flip_int(always_state())).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(param.adapt(&mut rng));
        assert!((param.internal() - 0).abs() == 1);
    }

    #[test]
    fn flip_bool_toggles() {
        let mut param = BoolParam::new(false, Adaptor::flip_bool(always_state()));
        let mut rng = SmallRng::seed_from_u64(4);
        assert!(param.adapt(&mut rng));
        assert!(param.value());
        assert!(param.adapt(&mut rng));
        assert!(!param.value());
    }

    #[test]
    fn never_mode_returns_false_and_leaves_value_unchanged() {
        let mut param = Int32Param::new(5, -10, 10, Adaptor::flip_int(never_state())).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..20 {
            assert!(!param.adapt(&mut rng));
        }
        assert_eq!(param.internal(), 5);
    }

    #[test]
    fn adapt_set_counts_mutated_leaves() {
        let leaves = vec![
            ParameterLeaf::Bool(BoolParam::new(false, Adaptor::flip_bool(always_state()))),
            ParameterLeaf::Bool(BoolParam::new(true, Adaptor::identity(never_state()).unwrap())),
        ];
        let mut set = ParameterSet::new(leaves);
        let mut rng = SmallRng::seed_from_u64(6);
        assert_eq!(adapt_set(&mut set, &mut rng), 1);
    }
}
