//! Adaptor state shapes (§3, §4.2).
//!
//! This module defines the *data* every adaptor variant carries — its
//! self-adapting `ad_prob` bookkeeping, plus the Gaussian-specific `sigma`
//! state — so a [`super::leaf::ParameterLeaf`] can own an adaptor inline
//! without this crate depending on `geneva-alters`, which implements the
//! actual stochastic `adapt`/`customAdaptions` algorithm over these shapes
//! (see `DESIGN.md`).

use geneva_error::{GenevaResult, ensure};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When an adaptor's self-update (`adaptAdaption`) actually fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AdaptionMode {
    Always,
    Never,
    Probabilistic,
}

/// Fields shared by every adaptor kind (§3 "Adaptor state").
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdaptorState {
    pub ad_prob: f64,
    pub ad_prob_reset: f64,
    pub min_ad_prob: f64,
    pub max_ad_prob: f64,
    pub adapt_ad_prob: f64,
    pub adaption_mode: AdaptionMode,
    pub adaption_threshold: u32,
    pub adaption_counter: u32,
    pub adapt_adaption_probability: f64,
}

impl AdaptorState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ad_prob: f64,
        min_ad_prob: f64,
        max_ad_prob: f64,
        adapt_ad_prob: f64,
        adaption_mode: AdaptionMode,
        adaption_threshold: u32,
        adapt_adaption_probability: f64,
    ) -> GenevaResult<Self> {
        ensure!(
            min_ad_prob <= max_ad_prob,
            InvalidConfig: "min_ad_prob ({}) must be <= max_ad_prob ({})", min_ad_prob, max_ad_prob
        );
        ensure!(
            (min_ad_prob..=max_ad_prob).contains(&ad_prob),
            InvalidConfig: "ad_prob ({}) must lie within [min_ad_prob, max_ad_prob]", ad_prob
        );
        ensure!(
            (0.0..=1.0).contains(&adapt_adaption_probability),
            InvalidConfig: "adapt_adaption_probability ({}) must be a probability", adapt_adaption_probability
        );
        ensure!(
            adapt_ad_prob >= 0.0,
            InvalidConfig: "adapt_ad_prob ({}) must be non-negative", adapt_ad_prob
        );

        Ok(Self {
            ad_prob,
            ad_prob_reset: ad_prob,
            min_ad_prob,
            max_ad_prob,
            adapt_ad_prob,
            adaption_mode,
            adaption_threshold,
            adaption_counter: 0,
            adapt_adaption_probability,
        })
    }

    /// Resets `ad_prob` to its construction-time (or last explicitly set)
    /// reset value. Returns whether this changed anything — the public
    /// contract of `updateOnStall` (§4.2).
    pub fn update_on_stall(&mut self) -> bool {
        if self.ad_prob != self.ad_prob_reset {
            self.ad_prob = self.ad_prob_reset;
            true
        } else {
            false
        }
    }

    pub fn clamp_ad_prob(&mut self) {
        self.ad_prob = self.ad_prob.clamp(self.min_ad_prob, self.max_ad_prob);
    }
}

/// Gaussian-only step-size state (§3).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GaussianExtra {
    pub sigma: f64,
    pub sigma_sigma: f64,
    pub min_sigma: f64,
    pub max_sigma: f64,
}

impl GaussianExtra {
    pub fn new(sigma: f64, sigma_sigma: f64, min_sigma: f64, max_sigma: f64) -> GenevaResult<Self> {
        ensure!(
            min_sigma <= max_sigma,
            InvalidConfig: "min_sigma ({}) must be <= max_sigma ({})", min_sigma, max_sigma
        );
        ensure!(
            (min_sigma..=max_sigma).contains(&sigma),
            InvalidConfig: "sigma ({}) must lie within [min_sigma, max_sigma]", sigma
        );
        ensure!(sigma_sigma >= 0.0, InvalidConfig: "sigma_sigma must be non-negative");
        Ok(Self {
            sigma,
            sigma_sigma,
            min_sigma,
            max_sigma,
        })
    }

    pub fn clamp_sigma(&mut self) {
        self.sigma = self.sigma.clamp(self.min_sigma, self.max_sigma);
    }
}

/// The closed set of self-adapting mutation operators (§9 "dispatched enum").
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Adaptor {
    Gaussian {
        state: AdaptorState,
        gaussian: GaussianExtra,
    },
    FlipInt {
        state: AdaptorState,
    },
    FlipBool {
        state: AdaptorState,
    },
    /// Never mutates. Construction fails unless `state.adaption_mode ==
    /// AdaptionMode::Never` (§4.2).
    Identity {
        state: AdaptorState,
    },
}

impl Adaptor {
    pub fn gaussian(state: AdaptorState, gaussian: GaussianExtra) -> Self {
        Adaptor::Gaussian { state, gaussian }
    }

    pub fn flip_int(state: AdaptorState) -> Self {
        Adaptor::FlipInt { state }
    }

    pub fn flip_bool(state: AdaptorState) -> Self {
        Adaptor::FlipBool { state }
    }

    pub fn identity(state: AdaptorState) -> GenevaResult<Self> {
        ensure!(
            state.adaption_mode == AdaptionMode::Never,
            InvalidConfig: "an identity adaptor may only use AdaptionMode::Never"
        );
        Ok(Adaptor::Identity { state })
    }

    pub fn state(&self) -> &AdaptorState {
        match self {
            Adaptor::Gaussian { state, .. }
            | Adaptor::FlipInt { state }
            | Adaptor::FlipBool { state }
            | Adaptor::Identity { state } => state,
        }
    }

    pub fn state_mut(&mut self) -> &mut AdaptorState {
        match self {
            Adaptor::Gaussian { state, .. }
            | Adaptor::FlipInt { state }
            | Adaptor::FlipBool { state }
            | Adaptor::Identity { state } => state,
        }
    }

    /// `updateOnStall`: resets `ad_prob`, leaving Gaussian's `sigma` alone
    /// (the source does not reset step size on stall, only adaption
    /// probability).
    pub fn update_on_stall(&mut self) -> bool {
        self.state_mut().update_on_stall()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_rejects_non_never_mode() {
        let state =
            AdaptorState::new(0.5, 0.0, 1.0, 0.0, AdaptionMode::Always, 0, 0.0).unwrap();
        assert!(Adaptor::identity(state).is_err());
    }

    #[test]
    fn identity_accepts_never_mode() {
        let state =
            AdaptorState::new(0.5, 0.0, 1.0, 0.0, AdaptionMode::Never, 0, 0.0).unwrap();
        assert!(Adaptor::identity(state).is_ok());
    }

    #[test]
    fn update_on_stall_restores_reset_value() {
        let mut state =
            AdaptorState::new(0.5, 0.0, 1.0, 0.0, AdaptionMode::Always, 0, 0.0).unwrap();
        state.ad_prob = 0.9;
        assert!(state.update_on_stall());
        assert_eq!(state.ad_prob, 0.5);
        assert!(!state.update_on_stall());
    }

    #[test]
    fn construction_rejects_out_of_range_ad_prob() {
        assert!(AdaptorState::new(1.5, 0.0, 1.0, 0.0, AdaptionMode::Always, 0, 0.0).is_err());
    }
}
