//! Closed-form densities and mass functions evaluated over a support grid.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use error_stack::Report;
use serde::{Deserialize, Serialize};

use crate::ProbVizError;

/// Number of intervals used for continuous supports unless told otherwise.
pub const DEFAULT_POINTS: usize = 100;

/// Poisson supports never extend past this many events.
pub const POISSON_MAX_K: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    Normal,
    Uniform,
    Exponential,
    Binomial,
    Poisson,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 5] = [
        DistributionKind::Normal,
        DistributionKind::Uniform,
        DistributionKind::Exponential,
        DistributionKind::Binomial,
        DistributionKind::Poisson,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DistributionKind::Normal => "normal",
            DistributionKind::Uniform => "uniform",
            DistributionKind::Exponential => "exponential",
            DistributionKind::Binomial => "binomial",
            DistributionKind::Poisson => "poisson",
        }
    }

    pub fn is_discrete(self) -> bool {
        matches!(self, DistributionKind::Binomial | DistributionKind::Poisson)
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistributionKind {
    type Err = Report<ProbVizError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DistributionKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Report::new(ProbVizError::Config).attach(format!("unknown distribution `{s}`"))
            })
    }
}

/// One distribution together with its parameters.
///
/// A spec is replaced wholesale when a parameter changes; it is never
/// patched in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    Normal { mean: f64, std: f64 },
    Uniform { min: f64, max: f64 },
    Exponential { lambda: f64 },
    Binomial { n: u32, p: f64 },
    Poisson { lambda: f64 },
}

/// A single `(x, density)` sample of a curve or bar chart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Evenly spaced evaluation points `start + i * step` for `i in 0..count`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Support {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl Support {
    pub fn points(self) -> impl Iterator<Item = f64> {
        (0..self.count).map(move |i| self.start + i as f64 * self.step)
    }

    pub fn end(&self) -> f64 {
        self.start + self.count.saturating_sub(1) as f64 * self.step
    }
}

impl DistributionSpec {
    pub fn kind(&self) -> DistributionKind {
        match self {
            DistributionSpec::Normal { .. } => DistributionKind::Normal,
            DistributionSpec::Uniform { .. } => DistributionKind::Uniform,
            DistributionSpec::Exponential { .. } => DistributionKind::Exponential,
            DistributionSpec::Binomial { .. } => DistributionKind::Binomial,
            DistributionSpec::Poisson { .. } => DistributionKind::Poisson,
        }
    }

    pub fn is_discrete(&self) -> bool {
        self.kind().is_discrete()
    }

    /// Check the domain invariants of the parameters.
    pub fn validate(&self) -> crate::Result<()> {
        let invalid = |msg: String| Err(Report::new(ProbVizError::InvalidParameter).attach(msg));

        match *self {
            DistributionSpec::Normal { mean, std } => {
                if !mean.is_finite() || !(std > 0.0) || !std.is_finite() {
                    return invalid(format!("normal requires finite mean and std > 0, got mean={mean}, std={std}"));
                }
            }
            DistributionSpec::Uniform { min, max } => {
                if !min.is_finite() || !max.is_finite() || !(max > min) {
                    return invalid(format!("uniform requires min < max, got min={min}, max={max}"));
                }
            }
            DistributionSpec::Exponential { lambda } | DistributionSpec::Poisson { lambda } => {
                if !(lambda > 0.0) || !lambda.is_finite() {
                    return invalid(format!("{} requires lambda > 0, got {lambda}", self.kind()));
                }
            }
            DistributionSpec::Binomial { p, .. } => {
                if !(p > 0.0 && p < 1.0) {
                    return invalid(format!("binomial requires 0 < p < 1, got {p}"));
                }
            }
        }
        Ok(())
    }

    /// Evaluation grid for this distribution with `points` intervals on
    /// continuous supports. Discrete supports always step by one.
    pub fn support(&self, points: usize) -> Support {
        let points = points.max(1);
        match *self {
            DistributionSpec::Normal { mean, std } => Support {
                start: mean - 4.0 * std,
                step: 8.0 * std / points as f64,
                count: points + 1,
            },
            DistributionSpec::Uniform { min, max } => {
                // The plateau width sets the step; one unit of padding either side.
                let step = (max - min) / points as f64;
                let span = (max + 1.0) - (min - 1.0);
                Support {
                    start: min - 1.0,
                    step,
                    count: (span / step + 1e-9).floor() as usize + 1,
                }
            }
            DistributionSpec::Exponential { lambda } => Support {
                start: 0.0,
                step: 5.0 / lambda / points as f64,
                count: points + 1,
            },
            DistributionSpec::Binomial { n, .. } => Support {
                start: 0.0,
                step: 1.0,
                count: n as usize + 1,
            },
            DistributionSpec::Poisson { lambda } => {
                let max_k = ((3.0 * lambda).ceil() as u64).min(POISSON_MAX_K);
                Support {
                    start: 0.0,
                    step: 1.0,
                    count: max_k as usize + 1,
                }
            }
        }
    }

    /// Density (continuous) or mass (discrete) at `x`.
    ///
    /// Mass functions are zero away from the non-negative integers.
    pub fn density(&self, x: f64) -> f64 {
        match *self {
            DistributionSpec::Normal { mean, std } => normal_pdf(x, mean, std),
            DistributionSpec::Uniform { min, max } => {
                if x >= min && x <= max {
                    1.0 / (max - min)
                } else {
                    0.0
                }
            }
            DistributionSpec::Exponential { lambda } => {
                if x >= 0.0 {
                    lambda * (-lambda * x).exp()
                } else {
                    0.0
                }
            }
            DistributionSpec::Binomial { n, p } => {
                as_count(x).map_or(0.0, |k| binomial_pmf(k, n as u64, p))
            }
            DistributionSpec::Poisson { lambda } => {
                as_count(x).map_or(0.0, |k| poisson_pmf(k, lambda))
            }
        }
    }

    /// Lazily evaluate the default grid.
    pub fn grid(&self) -> impl Iterator<Item = GridPoint> + use<> {
        self.grid_with(DEFAULT_POINTS)
    }

    pub fn grid_with(&self, points: usize) -> impl Iterator<Item = GridPoint> + use<> {
        let spec = *self;
        spec.support(points)
            .points()
            .map(move |x| GridPoint::new(x, spec.density(x)))
    }
}

fn as_count(x: f64) -> Option<u64> {
    let k = x.round();
    (k >= 0.0 && (x - k).abs() < 1e-9).then_some(k as u64)
}

pub fn normal_pdf(x: f64, mean: f64, std: f64) -> f64 {
    let z = (x - mean) / std;
    (1.0 / (std * (2.0 * PI).sqrt())) * (-0.5 * z * z).exp()
}

pub fn binomial_pmf(k: u64, n: u64, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    binomial_coefficient(n, k) * p.powi(k as i32) * (1.0 - p).powi((n - k) as i32)
}

pub fn poisson_pmf(k: u64, lambda: f64) -> f64 {
    lambda.powi(k as i32) * (-lambda).exp() / factorial(k)
}

/// `n choose k` as a running product, exact for the small `n` used here.
pub fn binomial_coefficient(n: u64, k: u64) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
}

pub fn factorial(k: u64) -> f64 {
    (2..=k).fold(1.0, |acc, i| acc * i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn normal_peaks_at_mean() {
        let spec = DistributionSpec::Normal { mean: 1.5, std: 0.7 };
        let peak = spec.density(1.5);
        assert_relative_eq!(peak, 1.0 / (0.7 * (2.0 * PI).sqrt()), epsilon = 1e-12);

        let max = spec.grid().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        assert!(max <= peak + 1e-12);
    }

    #[test]
    fn normal_is_symmetric() {
        let spec = DistributionSpec::Normal { mean: -2.0, std: 1.3 };
        for d in [0.1, 0.5, 1.0, 2.5, 4.0] {
            assert_relative_eq!(spec.density(-2.0 - d), spec.density(-2.0 + d), epsilon = 1e-12);
        }
    }

    #[test]
    fn uniform_plateau() {
        let spec = DistributionSpec::Uniform { min: -3.0, max: 3.0 };
        assert_relative_eq!(spec.density(-3.0), 1.0 / 6.0);
        assert_relative_eq!(spec.density(0.25), 1.0 / 6.0);
        assert_relative_eq!(spec.density(3.0), 1.0 / 6.0);
        assert_eq!(spec.density(-3.01), 0.0);
        assert_eq!(spec.density(3.5), 0.0);
    }

    #[test]
    fn uniform_grid_is_padded() {
        let spec = DistributionSpec::Uniform { min: -3.0, max: 3.0 };
        let pts: Vec<_> = spec.grid().collect();
        assert_relative_eq!(pts[0].x, -4.0);
        assert_relative_eq!(pts.last().unwrap().x, 3.98, epsilon = 1e-9);
        assert_eq!(pts.len(), 134);
        assert_eq!(pts[0].y, 0.0);
    }

    #[test]
    fn exponential_support() {
        let spec = DistributionSpec::Exponential { lambda: 2.0 };
        let support = spec.support(DEFAULT_POINTS);
        assert_eq!(support.count, 101);
        assert_relative_eq!(support.end(), 2.5, epsilon = 1e-12);
        assert_relative_eq!(spec.density(0.0), 2.0);
        assert_eq!(spec.density(-0.1), 0.0);
    }

    #[test]
    fn poisson_support_is_capped() {
        let small = DistributionSpec::Poisson { lambda: 2.5 };
        assert_eq!(small.support(DEFAULT_POINTS).count, 9);
        let large = DistributionSpec::Poisson { lambda: 15.0 };
        assert_eq!(large.support(DEFAULT_POINTS).count, 21);
    }

    #[test]
    fn mass_is_zero_off_integers() {
        let spec = DistributionSpec::Binomial { n: 10, p: 0.5 };
        assert_eq!(spec.density(2.5), 0.0);
        assert_eq!(spec.density(-1.0), 0.0);
        assert_eq!(spec.density(11.0), 0.0);
        assert!(spec.density(5.0) > 0.0);
    }

    #[test]
    fn counting_helpers() {
        assert_eq!(binomial_coefficient(10, 3), 120.0);
        assert_eq!(binomial_coefficient(20, 10), 184_756.0);
        assert_eq!(binomial_coefficient(4, 0), 1.0);
        assert_eq!(binomial_coefficient(3, 4), 0.0);
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(6), 720.0);
    }

    #[test]
    fn validate_rejects_out_of_domain() {
        assert!(DistributionSpec::Normal { mean: 0.0, std: 0.0 }.validate().is_err());
        assert!(DistributionSpec::Uniform { min: 1.0, max: 1.0 }.validate().is_err());
        assert!(DistributionSpec::Exponential { lambda: -1.0 }.validate().is_err());
        assert!(DistributionSpec::Binomial { n: 5, p: 1.0 }.validate().is_err());
        assert!(DistributionSpec::Poisson { lambda: 0.0 }.validate().is_err());
        assert!(DistributionSpec::Binomial { n: 0, p: 0.3 }.validate().is_ok());
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Poisson".parse::<DistributionKind>().unwrap(), DistributionKind::Poisson);
        assert!("cauchy".parse::<DistributionKind>().is_err());
    }

    proptest! {
        #[test]
        fn binomial_mass_sums_to_one(n in 0u32..=20, p in 0.1f64..0.9) {
            let spec = DistributionSpec::Binomial { n, p };
            let total: f64 = spec.grid().map(|pt| pt.y).sum();
            prop_assert!((total - 1.0).abs() < 1e-6, "n={n} p={p} total={total}");
        }

        #[test]
        fn poisson_mass_approaches_one(lambda in 0.5f64..=15.0) {
            let spec = DistributionSpec::Poisson { lambda };
            let total: f64 = spec.grid().map(|pt| pt.y).sum();
            prop_assert!(total <= 1.0 + 1e-9);
            prop_assert!(total > 0.9, "lambda={lambda} total={total}");
        }

        #[test]
        fn normal_grid_spans_four_sigma(mean in -5.0f64..5.0, std in 0.1f64..3.0) {
            let spec = DistributionSpec::Normal { mean, std };
            let pts: Vec<_> = spec.grid().collect();
            prop_assert_eq!(pts.len(), 101);
            prop_assert!((pts[0].x - (mean - 4.0 * std)).abs() < 1e-9);
            prop_assert!((pts[100].x - (mean + 4.0 * std)).abs() < 1e-9);
        }
    }
}
