//! Human-readable text shown next to each chart.

use serde::{Deserialize, Serialize};

use super::bivariate::BivariateNormal;
use super::density::DistributionSpec;
use super::sampler::{SampleSet, SamplingMethod};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    pub title: String,
    pub formula: Option<String>,
    /// Current parameter values, e.g. `μ = 0, σ = 1`.
    pub parameters: Option<String>,
    pub summary: String,
    pub notes: Vec<String>,
}

impl Description {
    /// Flatten everything below the title into display lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(formula) = &self.formula {
            lines.push(formula.clone());
        }
        if let Some(params) = &self.parameters {
            lines.push(format!("Parameters: {params}"));
        }
        lines.push(self.summary.clone());
        lines.extend(self.notes.iter().cloned());
        lines
    }
}

pub fn distribution(spec: &DistributionSpec) -> Description {
    let (title, formula, parameters, summary) = match *spec {
        DistributionSpec::Normal { mean, std } => (
            "Normal Distribution",
            "f(x) = (1 / (σ√2π)) * e^(-(x-μ)²/2σ²)",
            format!("μ = {mean}, σ = {std}"),
            "The normal distribution is fundamental in statistics and ML. It's symmetric around its mean μ and its spread is determined by standard deviation σ. Many natural phenomena follow this distribution due to the Central Limit Theorem.",
        ),
        DistributionSpec::Uniform { min, max } => (
            "Uniform Distribution",
            "f(x) = 1/(b-a) for a ≤ x ≤ b",
            format!("a = {min}, b = {max}"),
            "The uniform distribution represents equal probability across a range. It's often used for initialization in ML algorithms and for generating random numbers for simulations.",
        ),
        DistributionSpec::Exponential { lambda } => (
            "Exponential Distribution",
            "f(x) = λe^(-λx) for x ≥ 0",
            format!("λ = {lambda}"),
            "The exponential distribution models the time between events in a Poisson process. It's commonly used in survival analysis, reliability engineering, and modeling waiting times.",
        ),
        DistributionSpec::Binomial { n, p } => (
            "Binomial Distribution",
            "P(X = k) = (n choose k) * p^k * (1-p)^(n-k)",
            format!("n = {n}, p = {p}"),
            "The binomial distribution models the number of successes in n independent trials with probability p. It's used in classification problems and hypothesis testing.",
        ),
        DistributionSpec::Poisson { lambda } => (
            "Poisson Distribution",
            "P(X = k) = (λ^k * e^(-λ)) / k!",
            format!("λ = {lambda}"),
            "The Poisson distribution models the number of events occurring in a fixed time interval. It's used in rare event analysis, queueing theory, and modeling count data.",
        ),
    };

    Description {
        title: title.into(),
        formula: Some(formula.into()),
        parameters: Some(parameters),
        summary: summary.into(),
        notes: vec![],
    }
}

pub fn sampling(method: SamplingMethod) -> Description {
    let (title, summary, applications) = match method {
        SamplingMethod::Rejection => (
            "Rejection Sampling",
            "Samples uniformly from a bounding region and keeps only points under the target density curve.",
            "Simple to implement but inefficient in high dimensions.",
        ),
        SamplingMethod::MetropolisHastings => (
            "Markov Chain Monte Carlo (MCMC)",
            "Creates a Markov chain that has the target distribution as its equilibrium distribution.",
            "Bayesian inference, sampling from complex posteriors, variational inference.",
        ),
        SamplingMethod::Importance => (
            "Importance Sampling",
            "Samples from a proposal distribution and reweights samples to match the target distribution.",
            "Variational inference, reinforcement learning, rare event simulation.",
        ),
    };

    let mut notes = vec![format!("Applications: {applications}")];
    if method.is_weighted() {
        notes.push("Point size represents importance weight.".into());
    }

    Description {
        title: title.into(),
        formula: None,
        parameters: None,
        summary: summary.into(),
        notes,
    }
}

/// Sampling description with the outcome of an actual run appended.
pub fn sampling_run(set: &SampleSet) -> Description {
    let mut desc = sampling(set.method);
    let stat = match set.method {
        SamplingMethod::Rejection => format!(
            "{} of {} proposals accepted ({:.1}%)",
            set.accepted,
            set.proposals,
            100.0 * set.acceptance_rate()
        ),
        SamplingMethod::MetropolisHastings => format!(
            "{} of {} moves accepted ({:.1}%)",
            set.accepted,
            set.proposals,
            100.0 * set.acceptance_rate()
        ),
        SamplingMethod::Importance => format!(
            "{} of {} draws in range, total weight {:.1}",
            set.accepted,
            set.proposals,
            set.total_weight()
        ),
    };
    desc.parameters = Some(stat);
    desc
}

pub fn bivariate(dist: &BivariateNormal) -> Description {
    Description {
        title: format!("Bivariate Normal Distribution (ρ = {})", dist.rho),
        formula: None,
        parameters: Some(format!(
            "μ = ({}, {}), σ = ({}, {}), ρ = {}",
            dist.mean[0], dist.mean[1], dist.std[0], dist.std[1], dist.rho
        )),
        summary: format!(
            "Multivariate Normal Distribution generalizes the normal distribution to higher dimensions. The visualization shows a bivariate normal with correlation ρ = {}.",
            dist.rho
        ),
        notes: vec![
            "Completely described by mean vector and covariance matrix".into(),
            "Elliptical contours of equal density".into(),
            "Marginal and conditional distributions are also normal".into(),
            "Fundamental in many ML algorithms".into(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_render_without_trailing_zeros() {
        let desc = distribution(&DistributionSpec::Normal { mean: 0.0, std: 1.0 });
        assert_eq!(desc.parameters.as_deref(), Some("μ = 0, σ = 1"));

        let desc = distribution(&DistributionSpec::Binomial { n: 10, p: 0.5 });
        assert_eq!(desc.parameters.as_deref(), Some("n = 10, p = 0.5"));
    }

    #[test]
    fn importance_mentions_weights() {
        assert!(sampling(SamplingMethod::Importance).notes.iter().any(|n| n.contains("weight")));
        assert_eq!(sampling(SamplingMethod::Rejection).notes.len(), 1);
    }

    #[test]
    fn run_summary_reports_acceptance() {
        let set = SampleSet {
            method: SamplingMethod::Rejection,
            samples: vec![],
            proposals: 200,
            accepted: 50,
        };
        let desc = sampling_run(&set);
        assert_eq!(desc.parameters.as_deref(), Some("50 of 200 proposals accepted (25.0%)"));
    }

    #[test]
    fn lines_skip_missing_parts() {
        let desc = sampling(SamplingMethod::MetropolisHastings);
        let lines = desc.lines();
        assert_eq!(lines[0], desc.summary);
        assert_eq!(lines.len(), 2);
    }
}
