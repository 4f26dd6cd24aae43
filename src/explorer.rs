//! Explorer state: every user-adjustable setting as one value, and its
//! projection into chart data.
//!
//! Transitions never mutate an [`Explorer`] in place. Each returns a fresh
//! value and the caller swaps it in, so a render always sees one consistent
//! configuration.

use std::fmt;
use std::str::FromStr;

use bevy_math::Vec2;
use error_stack::{Report, ResultExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Color, Dashboard, Origin, Style};
use crate::dash::dash;
use crate::stats::bivariate::{DEFAULT_RANGE, DEFAULT_SAMPLES, DensityField};
use crate::stats::{
    BivariateNormal, Description, DistributionKind, DistributionSpec, GridPoint, SampleSet,
    SamplerConfig, SamplingMethod, TargetDensity, describe, sampler,
};
use crate::ProbVizError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Distributions,
    Sampling,
    Multivariate,
}

impl View {
    pub const ALL: [View; 3] = [View::Distributions, View::Sampling, View::Multivariate];

    pub fn name(self) -> &'static str {
        match self {
            View::Distributions => "distributions",
            View::Sampling => "sampling",
            View::Multivariate => "multivariate",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Distributions => "Distributions",
            View::Sampling => "Sampling Methods",
            View::Multivariate => "Multivariate Normal",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Distributions => 0,
            View::Sampling => 1,
            View::Multivariate => 2,
        }
    }

    pub fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = Report<ProbVizError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Report::new(ProbVizError::Config).attach(format!("unknown view `{s}`")))
    }
}

/// Bounds and granularity of one adjustable parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSlider {
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Decimal places the value is rounded to after each adjustment
    pub decimals: i32,
}

const fn slider(label: &'static str, min: f64, max: f64, step: f64, decimals: i32) -> ParamSlider {
    ParamSlider { label, min, max, step, decimals }
}

const NORMAL_SLIDERS: [ParamSlider; 2] = [
    slider("Mean (μ)", -5.0, 5.0, 0.5, 1),
    slider("Standard Deviation (σ)", 0.1, 3.0, 0.1, 1),
];
const UNIFORM_SLIDERS: [ParamSlider; 2] = [
    slider("Minimum", -10.0, 0.0, 0.5, 1),
    slider("Maximum", 0.0, 10.0, 0.5, 1),
];
const EXPONENTIAL_SLIDERS: [ParamSlider; 1] = [slider("Rate (λ)", 0.1, 3.0, 0.1, 1)];
const BINOMIAL_SLIDERS: [ParamSlider; 2] = [
    slider("Trials (n)", 1.0, 20.0, 1.0, 0),
    slider("Success Probability (p)", 0.1, 0.9, 0.1, 1),
];
const POISSON_SLIDERS: [ParamSlider; 1] = [slider("Rate (λ)", 0.5, 15.0, 0.5, 1)];

impl ParamSlider {
    pub fn for_kind(kind: DistributionKind) -> &'static [ParamSlider] {
        match kind {
            DistributionKind::Normal => &NORMAL_SLIDERS,
            DistributionKind::Uniform => &UNIFORM_SLIDERS,
            DistributionKind::Exponential => &EXPONENTIAL_SLIDERS,
            DistributionKind::Binomial => &BINOMIAL_SLIDERS,
            DistributionKind::Poisson => &POISSON_SLIDERS,
        }
    }

    /// Move `value` by `steps` increments, clamped to the slider range.
    pub fn nudge(&self, value: f64, steps: i32) -> f64 {
        let scale = 10f64.powi(self.decimals);
        let moved = (value + steps as f64 * self.step).clamp(self.min, self.max);
        (moved * scale).round() / scale
    }
}

/// Parameter accessors used by the sliders; index order matches
/// [`ParamSlider::for_kind`].
trait Parameterized: Sized {
    fn param(&self, index: usize) -> Option<f64>;
    fn with_param(&self, index: usize, value: f64) -> Option<Self>;
}

impl Parameterized for DistributionSpec {
    fn param(&self, index: usize) -> Option<f64> {
        match (*self, index) {
            (DistributionSpec::Normal { mean, .. }, 0) => Some(mean),
            (DistributionSpec::Normal { std, .. }, 1) => Some(std),
            (DistributionSpec::Uniform { min, .. }, 0) => Some(min),
            (DistributionSpec::Uniform { max, .. }, 1) => Some(max),
            (DistributionSpec::Exponential { lambda }, 0) => Some(lambda),
            (DistributionSpec::Binomial { n, .. }, 0) => Some(n as f64),
            (DistributionSpec::Binomial { p, .. }, 1) => Some(p),
            (DistributionSpec::Poisson { lambda }, 0) => Some(lambda),
            _ => None,
        }
    }

    fn with_param(&self, index: usize, value: f64) -> Option<Self> {
        let spec = match (*self, index) {
            (DistributionSpec::Normal { std, .. }, 0) => DistributionSpec::Normal { mean: value, std },
            (DistributionSpec::Normal { mean, .. }, 1) => DistributionSpec::Normal { mean, std: value },
            (DistributionSpec::Uniform { max, .. }, 0) => DistributionSpec::Uniform { min: value, max },
            (DistributionSpec::Uniform { min, .. }, 1) => DistributionSpec::Uniform { min, max: value },
            (DistributionSpec::Exponential { .. }, 0) => DistributionSpec::Exponential { lambda: value },
            (DistributionSpec::Binomial { p, .. }, 0) => DistributionSpec::Binomial {
                n: value.round().max(0.0) as u32,
                p,
            },
            (DistributionSpec::Binomial { n, .. }, 1) => DistributionSpec::Binomial { n, p: value },
            (DistributionSpec::Poisson { .. }, 0) => DistributionSpec::Poisson { lambda: value },
            _ => return None,
        };
        Some(spec)
    }
}

/// The last-used parameters of every distribution, so switching back and
/// forth keeps each one's settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    specs: [DistributionSpec; 5],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            specs: [
                DistributionSpec::Normal { mean: 0.0, std: 1.0 },
                DistributionSpec::Uniform { min: -3.0, max: 3.0 },
                DistributionSpec::Exponential { lambda: 1.0 },
                DistributionSpec::Binomial { n: 10, p: 0.5 },
                DistributionSpec::Poisson { lambda: 5.0 },
            ],
        }
    }
}

impl ParameterSet {
    fn slot(kind: DistributionKind) -> usize {
        match kind {
            DistributionKind::Normal => 0,
            DistributionKind::Uniform => 1,
            DistributionKind::Exponential => 2,
            DistributionKind::Binomial => 3,
            DistributionKind::Poisson => 4,
        }
    }

    pub fn get(&self, kind: DistributionKind) -> DistributionSpec {
        self.specs[Self::slot(kind)]
    }

    pub fn with(mut self, spec: DistributionSpec) -> Self {
        self.specs[Self::slot(spec.kind())] = spec;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &DistributionSpec> {
        self.specs.iter()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Explorer {
    pub view: View,
    pub selected: DistributionKind,
    pub params: ParameterSet,
    pub method: SamplingMethod,
    pub seed: u64,
    pub sampler: SamplerConfig,
    pub bivariate: BivariateNormal,
}

impl Default for Explorer {
    fn default() -> Self {
        Self {
            view: View::default(),
            selected: DistributionKind::Normal,
            params: ParameterSet::default(),
            method: SamplingMethod::default(),
            seed: 0,
            sampler: SamplerConfig::default(),
            bivariate: BivariateNormal::default(),
        }
    }
}

/// Everything one view plots, ready to serialise or chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Snapshot {
    Distributions {
        spec: DistributionSpec,
        description: Description,
        points: Vec<GridPoint>,
    },
    Sampling {
        description: Description,
        target: Vec<GridPoint>,
        run: SampleSet,
    },
    Multivariate {
        distribution: BivariateNormal,
        description: Description,
        field: DensityField,
        samples: Vec<[f64; 2]>,
    },
}

impl Snapshot {
    pub fn description(&self) -> &Description {
        match self {
            Snapshot::Distributions { description, .. }
            | Snapshot::Sampling { description, .. }
            | Snapshot::Multivariate { description, .. } => description,
        }
    }
}

impl Explorer {
    pub fn validate(&self) -> crate::Result<()> {
        for spec in self.params.iter() {
            spec.validate()
                .change_context(ProbVizError::Config)
                .attach(format!("while validating {} parameters", spec.kind()))?;
        }
        self.sampler.validate().change_context(ProbVizError::Config)?;
        self.bivariate.validate().change_context(ProbVizError::Config)?;
        Ok(())
    }

    pub fn spec(&self) -> DistributionSpec {
        self.params.get(self.selected)
    }

    pub fn sliders(&self) -> &'static [ParamSlider] {
        ParamSlider::for_kind(self.selected)
    }

    pub fn with_view(&self, view: View) -> Self {
        Self { view, ..self.clone() }
    }

    pub fn next_view(&self) -> Self {
        self.with_view(self.view.next())
    }

    pub fn select(&self, kind: DistributionKind) -> Self {
        Self {
            selected: kind,
            ..self.clone()
        }
    }

    pub fn with_method(&self, method: SamplingMethod) -> Self {
        Self {
            method,
            ..self.clone()
        }
    }

    pub fn cycle_method(&self) -> Self {
        self.with_method(self.method.next())
    }

    pub fn with_seed(&self, seed: u64) -> Self {
        Self { seed, ..self.clone() }
    }

    pub fn reseed(&self) -> Self {
        self.with_seed(self.seed.wrapping_add(1))
    }

    /// Move parameter `index` of the selected distribution by `steps` slider
    /// increments. Adjustments that would leave the domain are ignored.
    pub fn adjust(&self, index: usize, steps: i32) -> Self {
        let spec = self.spec();
        let (Some(slider), Some(value)) = (self.sliders().get(index), spec.param(index)) else {
            return self.clone();
        };
        let Some(next) = spec.with_param(index, slider.nudge(value, steps)) else {
            return self.clone();
        };
        if next.validate().is_err() {
            debug!(?next, "ignoring out-of-domain adjustment");
            return self.clone();
        }
        Self {
            params: self.params.with(next),
            ..self.clone()
        }
    }

    /// Generator for one view: stream 1 feeds sampling, stream 2 the
    /// bivariate samples.
    fn rng(&self, stream: u64) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_mul(3).wrapping_add(stream))
    }

    pub fn snapshot(&self, view: View) -> Snapshot {
        match view {
            View::Distributions => {
                let spec = self.spec();
                Snapshot::Distributions {
                    spec,
                    description: describe::distribution(&spec),
                    points: spec.grid().collect(),
                }
            }
            View::Sampling => {
                let target = TargetDensity::bimodal();
                let run = sampler::draw(self.method, &target, &self.sampler, &mut self.rng(1));
                Snapshot::Sampling {
                    description: describe::sampling_run(&run),
                    target: target.points().to_vec(),
                    run,
                }
            }
            View::Multivariate => {
                let samples = self
                    .bivariate
                    .correlated_samples(DEFAULT_SAMPLES, &mut self.rng(2));
                Snapshot::Multivariate {
                    distribution: self.bivariate,
                    description: describe::bivariate(&self.bivariate),
                    field: self.bivariate.default_field(),
                    samples,
                }
            }
        }
    }

    /// Build one tab per view, with the current view active.
    pub fn dashboard(&self) -> Dashboard {
        debug!(view = %self.view, selected = %self.selected, method = %self.method, seed = self.seed, "rebuilding dashboard");

        let mut builder = dash();
        for view in View::ALL {
            let snapshot = self.snapshot(view);
            builder = builder.add_tab(view.title(), |tab| {
                let tab = tab.notes(self.notes(&snapshot));
                chart_snapshot(tab, &snapshot)
            });
        }
        let mut dashboard = builder.build();
        dashboard.active_tab = self.view.index();
        dashboard
    }

    fn notes(&self, snapshot: &Snapshot) -> Vec<String> {
        let desc = snapshot.description();
        let mut notes = vec![desc.title.clone()];
        notes.extend(desc.lines());
        if let Snapshot::Distributions { .. } = snapshot {
            let spec = self.spec();
            let sliders: Vec<String> = self
                .sliders()
                .iter()
                .enumerate()
                .filter_map(|(i, s)| spec.param(i).map(|v| format!("{}: {v}", s.label)))
                .collect();
            notes.push(sliders.join("   "));
        }
        notes
    }
}

fn to_vec2(points: &[GridPoint]) -> Vec<Vec2> {
    points
        .iter()
        .map(|p| Vec2::new(p.x as f32, p.y as f32))
        .collect()
}

fn chart_snapshot(tab: crate::dash::TabBuilder, snapshot: &Snapshot) -> crate::dash::TabBuilder {
    match snapshot {
        Snapshot::Distributions {
            spec,
            description,
            points,
        } => {
            let xy = to_vec2(points);
            tab.columns(1).add_2d(|p| {
                let p = if spec.is_discrete() {
                    p.bars(xy, Style::new(Color::LAVENDER, 0.8, 0.9))
                        .y_label("Probability")
                } else {
                    p.area(xy.clone(), Style::new(Color::LAVENDER, 1.0, 0.25))
                        .line(xy, Style::new(Color::LAVENDER, 2.0, 1.0))
                        .y_label("Probability Density")
                };
                p.title(description.title.clone())
                    .description(description.formula.clone().unwrap_or_default())
                    .x_label("x")
            })
        }
        Snapshot::Sampling {
            description,
            target,
            run,
        } => {
            let samples: Vec<Vec2> = run
                .samples
                .iter()
                .map(|s| Vec2::new(s.x as f32, s.y as f32))
                .collect();
            let sample_style = Style::new(Color::SAMPLE_RED, 4.0, 0.5);
            tab.columns(1).add_2d(|p| {
                let p = p.line(to_vec2(target), Style::new(Color::STEEL_BLUE, 2.0, 1.0));
                let p = if run.method.is_weighted() {
                    let sizes = run
                        .samples
                        .iter()
                        .map(|s| (s.weight.sqrt() * 4.0) as f32)
                        .collect();
                    p.bubble(samples, sizes, sample_style)
                } else {
                    p.scatter(samples, sample_style)
                };
                p.title(description.title.clone())
                    .description(description.parameters.clone().unwrap_or_default())
                    .x_label("x")
                    .y_label("Target density")
            })
        }
        Snapshot::Multivariate {
            description,
            field,
            samples,
            ..
        } => {
            let n = field.n;
            let values: Vec<f32> = field.values.iter().map(|&v| v as f32).collect();
            let (lo, hi) = (DEFAULT_RANGE.0 as f32, DEFAULT_RANGE.1 as f32);
            let pairs: Vec<Vec2> = samples
                .iter()
                .map(|p| Vec2::new(p[0] as f32, p[1] as f32))
                .collect();

            tab.columns(2)
                .add_heatmap(|h| {
                    h.data(n, n, values)
                        .vmin(0.0)
                        .extent([lo, hi, lo, hi])
                        .origin(Origin::Lower)
                        .title(description.title.clone())
                        .description("Density on a 50×50 grid")
                })
                .add_2d(|p| {
                    p.scatter(pairs, Style::new(Color::STEEL_BLUE, 3.0, 0.35))
                        .title("Correlated samples")
                        .description(format!("{} Box-Muller pairs", samples.len()))
                        .x_label("X₁")
                        .y_label("X₂")
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Geometry2D, Plot};

    #[test]
    fn defaults_are_valid() {
        let explorer = Explorer::default();
        assert!(explorer.validate().is_ok());
        assert_eq!(explorer.spec(), DistributionSpec::Normal { mean: 0.0, std: 1.0 });
    }

    #[test]
    fn adjust_snaps_to_slider_steps() {
        let explorer = Explorer::default().select(DistributionKind::Binomial);
        let moved = explorer.adjust(1, -2);
        assert_eq!(moved.spec(), DistributionSpec::Binomial { n: 10, p: 0.3 });

        // the receiver is left as it was
        assert_eq!(explorer.spec(), DistributionSpec::Binomial { n: 10, p: 0.5 });
    }

    #[test]
    fn adjust_clamps_to_slider_bounds() {
        let explorer = Explorer::default().select(DistributionKind::Binomial);
        let moved = explorer.adjust(0, 100);
        assert_eq!(moved.spec(), DistributionSpec::Binomial { n: 20, p: 0.5 });

        let moved = explorer.select(DistributionKind::Normal).adjust(1, -100);
        assert_eq!(moved.spec(), DistributionSpec::Normal { mean: 0.0, std: 0.1 });
    }

    #[test]
    fn uniform_never_collapses() {
        let explorer = Explorer::default()
            .select(DistributionKind::Uniform)
            .adjust(0, 100)
            .adjust(1, -100);
        assert_eq!(explorer.spec(), DistributionSpec::Uniform { min: 0.0, max: 0.5 });
    }

    #[test]
    fn adjust_ignores_unknown_parameters() {
        let explorer = Explorer::default().select(DistributionKind::Poisson);
        assert_eq!(explorer.adjust(1, 1), explorer);
    }

    #[test]
    fn parameters_survive_switching() {
        let explorer = Explorer::default()
            .select(DistributionKind::Exponential)
            .adjust(0, 5)
            .select(DistributionKind::Normal)
            .select(DistributionKind::Exponential);
        assert_eq!(explorer.spec(), DistributionSpec::Exponential { lambda: 1.5 });
    }

    #[test]
    fn views_cycle() {
        let explorer = Explorer::default();
        assert_eq!(explorer.next_view().view, View::Sampling);
        assert_eq!(explorer.next_view().next_view().next_view().view, View::Distributions);
        assert_eq!("Multivariate".parse::<View>().unwrap(), View::Multivariate);
    }

    #[test]
    fn views_draw_from_their_own_stream() {
        let explorer = Explorer::default().with_seed(4);
        let Snapshot::Sampling { run, .. } = explorer.snapshot(View::Sampling) else {
            panic!("expected a sampling snapshot");
        };
        let mut rng = StdRng::seed_from_u64(4 * 3 + 1);
        let expected = sampler::draw(explorer.method, &TargetDensity::bimodal(), &explorer.sampler, &mut rng);
        assert_eq!(run, expected);

        let Snapshot::Multivariate { samples, .. } = explorer.snapshot(View::Multivariate) else {
            panic!("expected a multivariate snapshot");
        };
        let mut rng = StdRng::seed_from_u64(4 * 3 + 2);
        assert_eq!(samples, explorer.bivariate.correlated_samples(samples.len(), &mut rng));
    }

    #[test]
    fn snapshots_are_seeded() {
        let explorer = Explorer::default().with_method(SamplingMethod::MetropolisHastings);
        assert_eq!(explorer.snapshot(View::Sampling), explorer.snapshot(View::Sampling));
        assert_ne!(
            explorer.snapshot(View::Sampling),
            explorer.reseed().snapshot(View::Sampling)
        );
    }

    #[test]
    fn dashboard_has_a_tab_per_view() {
        let explorer = Explorer::default().with_view(View::Multivariate);
        let dashboard = explorer.dashboard();

        assert_eq!(dashboard.tabs.len(), 3);
        assert_eq!(dashboard.active_tab, 2);
        assert_eq!(dashboard.active_plots().len(), 2);
        assert!(matches!(dashboard.active_plots()[0], Plot::Heatmap(_)));
        assert!(!dashboard.active_notes().is_empty());
    }

    #[test]
    fn discrete_distributions_chart_as_bars() {
        let dashboard = Explorer::default().select(DistributionKind::Poisson).dashboard();
        let Plot::Graph2D(graph) = &dashboard.tabs[0].plots[0] else {
            panic!("expected a 2D graph");
        };
        assert_eq!(graph.layers.len(), 1);
        assert_eq!(graph.layers[0].geometry, Geometry2D::Bars);
        assert_eq!(graph.layers[0].xy.len(), 16);
    }

    #[test]
    fn importance_points_are_sized_by_weight() {
        let dashboard = Explorer::default()
            .with_method(SamplingMethod::Importance)
            .dashboard();
        let Plot::Graph2D(graph) = &dashboard.tabs[1].plots[0] else {
            panic!("expected a 2D graph");
        };
        let points = &graph.layers[1];
        assert_eq!(points.geometry, Geometry2D::Points);
        assert_eq!(points.sizes.as_ref().map(Vec::len), Some(points.xy.len()));
    }
}
