//! Command line configuration

use clap::Parser;
use probviz::explorer::{Explorer, View};
use probviz::runtime::WindowOptions;
use probviz::stats::{DistributionKind, SamplingMethod};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown view `{0}` (expected distributions, sampling or multivariate)")]
    UnknownView(String),

    #[error("Unknown distribution `{0}` (expected normal, uniform, exponential, binomial or poisson)")]
    UnknownDistribution(String),

    #[error("Unknown sampling method `{0}` (expected rejection, mcmc or importance)")]
    UnknownMethod(String),

    #[error("Window size must be non-zero, got {0}x{1}")]
    WindowSize(u32, u32),

    #[error("Invalid explorer state: {0}")]
    Invalid(String),
}

/// Probability distribution and sampling explorer
#[derive(Parser, Clone, Debug)]
#[command(name = "probviz")]
#[command(about = "Explore probability distributions, sampling methods and the bivariate normal")]
pub struct Config {
    /// Seed for the sampling and multivariate views
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// View shown first: distributions, sampling or multivariate
    #[arg(long, default_value = "distributions")]
    pub view: String,

    /// Selected distribution
    #[arg(long, default_value = "normal")]
    pub distribution: String,

    /// Sampling method: rejection, mcmc or importance
    #[arg(long, default_value = "rejection")]
    pub method: String,

    /// Number of samples to draw
    #[arg(long, default_value = "300")]
    pub samples: usize,

    /// Log filter directives, `RUST_LOG` takes precedence
    #[arg(long, default_value = probviz::runtime::DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    /// Window width in logical pixels
    #[arg(long, default_value = "1600")]
    pub width: u32,

    /// Window height in logical pixels
    #[arg(long, default_value = "900")]
    pub height: u32,

    /// Print the selected view's data as JSON instead of opening a window
    #[arg(long)]
    pub dump: bool,
}

impl Config {
    /// Validated explorer state described by the flags.
    pub fn explorer(&self) -> Result<Explorer, ConfigError> {
        let view: View = self
            .view
            .parse()
            .map_err(|_| ConfigError::UnknownView(self.view.clone()))?;
        let kind: DistributionKind = self
            .distribution
            .parse()
            .map_err(|_| ConfigError::UnknownDistribution(self.distribution.clone()))?;
        let method: SamplingMethod = self
            .method
            .parse()
            .map_err(|_| ConfigError::UnknownMethod(self.method.clone()))?;

        let mut explorer = Explorer::default()
            .select(kind)
            .with_method(method)
            .with_seed(self.seed)
            .with_view(view);
        explorer.sampler.samples = self.samples;

        explorer
            .validate()
            .map_err(|report| ConfigError::Invalid(format!("{report:?}")))?;
        Ok(explorer)
    }

    pub fn window(&self) -> Result<WindowOptions, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::WindowSize(self.width, self.height));
        }
        Ok(WindowOptions {
            width: self.width,
            height: self.height,
            log_filter: self.log_filter.clone(),
            ..WindowOptions::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::parse_from(std::iter::once("probviz").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_open_the_normal_distribution() {
        let config = parse(&[]);
        let explorer = config.explorer().unwrap();
        assert_eq!(explorer.view, View::Distributions);
        assert_eq!(explorer.selected, DistributionKind::Normal);
        assert_eq!(explorer.method, SamplingMethod::Rejection);
        assert_eq!(explorer.seed, 0);
        assert!(!config.dump);

        let window = config.window().unwrap();
        assert_eq!((window.width, window.height), (1600, 900));
    }

    #[test]
    fn flags_reach_the_explorer() {
        let config = parse(&[
            "--view",
            "sampling",
            "--distribution",
            "Poisson",
            "--method",
            "mcmc",
            "--seed",
            "7",
            "--samples",
            "50",
            "--dump",
        ]);
        let explorer = config.explorer().unwrap();
        assert_eq!(explorer.view, View::Sampling);
        assert_eq!(explorer.selected, DistributionKind::Poisson);
        assert_eq!(explorer.method, SamplingMethod::MetropolisHastings);
        assert_eq!(explorer.seed, 7);
        assert_eq!(explorer.sampler.samples, 50);
        assert!(config.dump);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = parse(&["--view", "3d"]).explorer().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownView(v) if v == "3d"));

        let err = parse(&["--distribution", "gamma"]).explorer().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDistribution(_)));

        let err = parse(&["--method", "gibbs"]).explorer().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMethod(_)));
    }

    #[test]
    fn zero_samples_fail_validation() {
        let err = parse(&["--samples", "0"]).explorer().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn oversized_sample_counts_fail_validation() {
        let max = probviz::stats::sampler::MAX_SAMPLES.to_string();
        assert!(parse(&["--samples", &max]).explorer().is_ok());

        let huge = usize::MAX.to_string();
        let err = parse(&["--samples", &huge]).explorer().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_sized_window_is_rejected() {
        let err = parse(&["--width", "0"]).window().unwrap_err();
        assert_eq!(err.to_string(), "Window size must be non-zero, got 0x900");
    }
}
