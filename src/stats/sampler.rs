//! Sampler bank: rejection, random-walk Metropolis-Hastings and importance
//! sampling against a tabulated [`TargetDensity`].
//!
//! Each routine runs a bounded loop to completion and returns whatever it
//! collected. A short rejection run is not an error.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use error_stack::Report;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::density::normal_pdf;
use super::target::{TARGET_MAX, TARGET_MIN, TargetDensity};
use crate::ProbVizError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    #[default]
    Rejection,
    MetropolisHastings,
    Importance,
}

impl SamplingMethod {
    pub const ALL: [SamplingMethod; 3] = [
        SamplingMethod::Rejection,
        SamplingMethod::MetropolisHastings,
        SamplingMethod::Importance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SamplingMethod::Rejection => "rejection",
            SamplingMethod::MetropolisHastings => "mcmc",
            SamplingMethod::Importance => "importance",
        }
    }

    /// Next method in display order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            SamplingMethod::Rejection => SamplingMethod::MetropolisHastings,
            SamplingMethod::MetropolisHastings => SamplingMethod::Importance,
            SamplingMethod::Importance => SamplingMethod::Rejection,
        }
    }

    /// Whether the sample weights carry information worth plotting.
    pub fn is_weighted(self) -> bool {
        matches!(self, SamplingMethod::Importance)
    }
}

impl fmt::Display for SamplingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SamplingMethod {
    type Err = Report<ProbVizError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rejection" => Ok(SamplingMethod::Rejection),
            "mcmc" | "metropolis" | "metropolis-hastings" => Ok(SamplingMethod::MetropolisHastings),
            "importance" => Ok(SamplingMethod::Importance),
            _ => Err(Report::new(ProbVizError::Config).attach(format!("unknown sampling method `{s}`"))),
        }
    }
}

/// Upper bound on `samples` and `burn_in`.
pub const MAX_SAMPLES: usize = 100_000;

/// Tuning knobs for the sampler bank.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Samples each method tries to return.
    pub samples: usize,
    /// Hard cap on rejection proposals.
    pub max_proposals: usize,
    /// Chain steps discarded before recording.
    pub burn_in: usize,
    /// Width of the uniform random-walk step, centred on the current state.
    pub step_width: f64,
    /// Standard deviation of the zero-mean normal importance proposal.
    pub proposal_std: f64,
    /// Divisor applied to the proposal density when forming weights.
    pub weight_scale: f64,
    pub weight_cap: f64,
    /// Vertical spread of plotted MCMC and importance samples.
    pub jitter: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            samples: 300,
            max_proposals: 5000,
            burn_in: 500,
            step_width: 0.5,
            proposal_std: 1.5,
            weight_scale: 4.0,
            weight_cap: 5.0,
            jitter: 0.1,
        }
    }
}

impl SamplerConfig {
    pub fn validate(&self) -> crate::Result<()> {
        let checks = [
            (self.samples > 0, "samples must be positive"),
            (self.samples <= MAX_SAMPLES, "samples must not exceed MAX_SAMPLES"),
            (self.burn_in <= MAX_SAMPLES, "burn_in must not exceed MAX_SAMPLES"),
            (self.max_proposals > 0, "max_proposals must be positive"),
            (self.step_width > 0.0, "step_width must be positive"),
            (self.proposal_std > 0.0, "proposal_std must be positive"),
            (self.weight_scale > 0.0, "weight_scale must be positive"),
            (self.weight_cap >= 0.0, "weight_cap must not be negative"),
            (self.jitter >= 0.0, "jitter must not be negative"),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(Report::new(ProbVizError::InvalidParameter).attach(*msg)),
            None => Ok(()),
        }
    }
}

/// One drawn point. `y` is plot height only; `weight` is 1 unless the point
/// came from importance sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

impl Sample {
    pub const fn unweighted(x: f64, y: f64) -> Self {
        Self { x, y, weight: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub method: SamplingMethod,
    pub samples: Vec<Sample>,
    /// Loop iterations performed.
    pub proposals: usize,
    /// Accepted proposals (rejection), accepted moves (MCMC) or in-bounds
    /// draws (importance).
    pub accepted: usize,
}

impl SampleSet {
    pub fn acceptance_rate(&self) -> f64 {
        if self.proposals == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposals as f64
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.samples.iter().map(|s| s.weight).sum()
    }
}

/// Run `method` against `target`.
pub fn draw<R: Rng + ?Sized>(
    method: SamplingMethod,
    target: &TargetDensity,
    config: &SamplerConfig,
    rng: &mut R,
) -> SampleSet {
    match method {
        SamplingMethod::Rejection => rejection(target, config, rng),
        SamplingMethod::MetropolisHastings => metropolis_hastings(target, config, rng),
        SamplingMethod::Importance => importance(target, config, rng),
    }
}

/// Two independent standard normal deviates from two uniforms.
pub fn box_muller<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    // u in (0, 1] so the logarithm stays finite
    let u = 1.0 - rng.random::<f64>();
    let v = rng.random::<f64>();
    let r = (-2.0 * u.ln()).sqrt();
    let theta = 2.0 * PI * v;
    (r * theta.cos(), r * theta.sin())
}

/// Uniform proposals under a unit-height box, kept when they fall beneath the
/// target curve.
pub fn rejection<R: Rng + ?Sized>(
    target: &TargetDensity,
    config: &SamplerConfig,
    rng: &mut R,
) -> SampleSet {
    let mut samples = Vec::with_capacity(config.samples.min(MAX_SAMPLES));
    let mut proposals = 0;

    while samples.len() < config.samples && proposals < config.max_proposals {
        proposals += 1;
        let x = rng.random_range(TARGET_MIN..TARGET_MAX);
        let y = rng.random::<f64>();

        if y < target.lookup(x) {
            samples.push(Sample::unweighted(x, y));
        }
    }

    if samples.len() < config.samples {
        warn!(
            accepted = samples.len(),
            wanted = config.samples,
            proposals,
            "rejection sampling hit its proposal cap"
        );
    }
    debug!(accepted = samples.len(), proposals, "rejection sampling done");

    SampleSet {
        method: SamplingMethod::Rejection,
        accepted: samples.len(),
        proposals,
        samples,
    }
}

/// Random-walk Metropolis-Hastings started from a uniform point.
///
/// Proposals leaving `[TARGET_MIN, TARGET_MAX)` are rejected outright. The
/// first `burn_in` states are dropped and the next `samples` are kept, each
/// with a random plot height in `[0, jitter)`.
pub fn metropolis_hastings<R: Rng + ?Sized>(
    target: &TargetDensity,
    config: &SamplerConfig,
    rng: &mut R,
) -> SampleSet {
    let mut samples = Vec::with_capacity(config.samples.min(MAX_SAMPLES));
    let mut accepted = 0;
    let steps = config.burn_in.saturating_add(config.samples);

    let mut current = rng.random_range(TARGET_MIN..TARGET_MAX);

    for i in 0..steps {
        let proposed = current + (rng.random::<f64>() - 0.5) * config.step_width;

        if (TARGET_MIN..TARGET_MAX).contains(&proposed) {
            let current_density = target.lookup(current);
            let proposed_density = target.lookup(proposed);
            let ratio = if current_density > 0.0 {
                proposed_density / current_density
            } else {
                1.0
            };

            if rng.random::<f64>() < ratio.min(1.0) {
                current = proposed;
                accepted += 1;
            }
        }

        if i >= config.burn_in {
            samples.push(Sample::unweighted(current, rng.random::<f64>() * config.jitter));
        }
    }

    debug!(accepted, steps, "metropolis-hastings chain done");

    SampleSet {
        method: SamplingMethod::MetropolisHastings,
        samples,
        proposals: steps,
        accepted,
    }
}

/// Normal proposals reweighted by `target / (proposal * weight_scale)`,
/// capped at `weight_cap`.
///
/// Draws outside `[TARGET_MIN, TARGET_MAX]` are dropped without renormalising
/// the rest.
pub fn importance<R: Rng + ?Sized>(
    target: &TargetDensity,
    config: &SamplerConfig,
    rng: &mut R,
) -> SampleSet {
    let mut samples = Vec::with_capacity(config.samples.min(MAX_SAMPLES));

    for _ in 0..config.samples {
        let (z, _) = box_muller(rng);
        let x = z * config.proposal_std;

        if !(TARGET_MIN..=TARGET_MAX).contains(&x) {
            continue;
        }

        let y = rng.random::<f64>() * config.jitter;
        let weight = importance_weight(target, config, x);
        samples.push(Sample { x, y, weight });
    }

    debug!(kept = samples.len(), drawn = config.samples, "importance sampling done");

    SampleSet {
        method: SamplingMethod::Importance,
        accepted: samples.len(),
        proposals: config.samples,
        samples,
    }
}

/// Capped importance weight of a draw at `x`. A draw on the closed upper
/// edge has no table entry, so its weight is 0.
pub fn importance_weight(target: &TargetDensity, config: &SamplerConfig, x: f64) -> f64 {
    let proposal_density = normal_pdf(x, 0.0, config.proposal_std);
    (target.lookup(x) / (proposal_density * config.weight_scale)).min(config.weight_cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::density::GridPoint;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (TargetDensity, SamplerConfig) {
        (TargetDensity::bimodal(), SamplerConfig::default())
    }

    #[test]
    fn rejection_samples_lie_under_the_curve() {
        let (target, config) = setup();
        let mut rng = StdRng::seed_from_u64(7);
        let set = rejection(&target, &config, &mut rng);

        assert_eq!(set.samples.len(), 300);
        assert!(set.proposals <= config.max_proposals);
        for s in &set.samples {
            assert!(s.y < target.lookup(s.x), "{s:?} is above the target");
            assert_eq!(s.weight, 1.0);
        }
    }

    #[test]
    fn rejection_stops_at_the_proposal_cap() {
        let (target, mut config) = setup();
        config.max_proposals = 40;
        let mut rng = StdRng::seed_from_u64(11);
        let set = rejection(&target, &config, &mut rng);

        assert_eq!(set.proposals, 40);
        assert!(set.samples.len() < config.samples);
    }

    #[test]
    fn rejection_against_empty_target_returns_nothing() {
        let flat = TargetDensity::normalized(
            (0..60).map(|i| GridPoint::new(-3.0 + i as f64 * 0.1, 0.0)).collect(),
        );
        let config = SamplerConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let set = rejection(&flat, &config, &mut rng);

        assert!(set.samples.is_empty());
        assert_eq!(set.proposals, config.max_proposals);
        assert_eq!(set.acceptance_rate(), 0.0);
    }

    #[test]
    fn metropolis_hastings_is_reproducible() {
        let (target, config) = setup();
        let a = metropolis_hastings(&target, &config, &mut StdRng::seed_from_u64(42));
        let b = metropolis_hastings(&target, &config, &mut StdRng::seed_from_u64(42));
        let c = metropolis_hastings(&target, &config, &mut StdRng::seed_from_u64(43));

        assert_eq!(a, b);
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn metropolis_hastings_keeps_post_burn_in_states() {
        let (target, config) = setup();
        let set = metropolis_hastings(&target, &config, &mut StdRng::seed_from_u64(5));

        assert_eq!(set.samples.len(), config.samples);
        assert_eq!(set.proposals, config.samples + config.burn_in);
        assert!(set.accepted > 0 && set.accepted <= set.proposals);
        for s in &set.samples {
            assert!((TARGET_MIN..TARGET_MAX).contains(&s.x));
            assert!((0.0..config.jitter).contains(&s.y));
        }
    }

    #[test]
    fn importance_weights_are_capped() {
        let (target, config) = setup();
        let set = importance(&target, &config, &mut StdRng::seed_from_u64(9));

        assert!(set.samples.len() <= config.samples);
        assert!(set.samples.len() > 250);
        assert_eq!(set.accepted, set.samples.len());
        for s in &set.samples {
            assert!((0.0..=config.weight_cap).contains(&s.weight), "{s:?}");
            assert!((TARGET_MIN..=TARGET_MAX).contains(&s.x));
        }
    }

    #[test]
    fn wide_proposals_drop_out_of_range_draws() {
        let (target, mut config) = setup();
        config.proposal_std = 5.0;
        let set = importance(&target, &config, &mut StdRng::seed_from_u64(9));

        // P(|N(0, 5)| > 3) is about 0.55
        assert_eq!(set.proposals, config.samples);
        assert!(set.accepted < set.proposals);
        assert!(set.accepted < 200, "kept {}", set.accepted);
        assert_eq!(set.samples.len(), set.accepted);
        assert!(set.samples.iter().all(|s| (TARGET_MIN..=TARGET_MAX).contains(&s.x)));
    }

    #[test]
    fn upper_edge_draw_weighs_nothing() {
        let (target, config) = setup();
        assert_eq!(importance_weight(&target, &config, TARGET_MAX), 0.0);
        assert!(importance_weight(&target, &config, TARGET_MAX - 0.05) > 0.0);
        assert!(importance_weight(&target, &config, TARGET_MIN) > 0.0);
    }

    #[test]
    fn draw_dispatches_on_method() {
        let (target, config) = setup();
        for method in SamplingMethod::ALL {
            let set = draw(method, &target, &config, &mut StdRng::seed_from_u64(1));
            assert_eq!(set.method, method);
        }
    }

    #[test]
    fn box_muller_is_standard_normal() {
        let mut rng = StdRng::seed_from_u64(123);
        let n = 20_000;
        let draws: Vec<f64> = (0..n / 2)
            .flat_map(|_| {
                let (a, b) = box_muller(&mut rng);
                [a, b]
            })
            .collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(draws.iter().all(|z| z.is_finite()));
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(var, 1.0, epsilon = 0.05);
    }

    #[test]
    fn method_cycle_and_parse() {
        assert_eq!(SamplingMethod::Importance.next(), SamplingMethod::Rejection);
        assert_eq!("MCMC".parse::<SamplingMethod>().unwrap(), SamplingMethod::MetropolisHastings);
        assert!("gibbs".parse::<SamplingMethod>().is_err());
    }

    #[test]
    fn config_validation() {
        assert!(SamplerConfig::default().validate().is_ok());
        let bad = SamplerConfig { proposal_std: 0.0, ..SamplerConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn oversized_runs_fail_validation() {
        let at_cap = SamplerConfig { samples: MAX_SAMPLES, ..SamplerConfig::default() };
        assert!(at_cap.validate().is_ok());
        let huge = SamplerConfig { samples: usize::MAX, ..SamplerConfig::default() };
        assert!(huge.validate().is_err());
        let long_burn = SamplerConfig { burn_in: usize::MAX, ..SamplerConfig::default() };
        assert!(long_burn.validate().is_err());
    }

    #[test]
    fn huge_request_is_bounded_by_the_proposal_cap() {
        let (target, mut config) = setup();
        config.samples = usize::MAX;
        config.max_proposals = 10;
        let set = rejection(&target, &config, &mut StdRng::seed_from_u64(2));
        assert_eq!(set.proposals, 10);
    }
}
