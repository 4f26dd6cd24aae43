use approx::assert_relative_eq;
use probviz::core::{Geometry2D, Plot};
use probviz::explorer::{Explorer, Snapshot, View};
use probviz::stats::{DistributionKind, DistributionSpec, SamplingMethod, TargetDensity};

#[test]
fn standard_normal_grid() {
    let spec = DistributionSpec::Normal { mean: 0.0, std: 1.0 };
    let points: Vec<_> = spec.grid().collect();

    assert_eq!(points.len(), 101);
    assert_relative_eq!(points[0].x, -4.0, epsilon = 1e-9);
    assert_relative_eq!(points[100].x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(points[50].x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(points[50].y, 0.398_942_280_4, epsilon = 1e-9);
}

#[test]
fn every_sampler_stays_on_the_target_range() {
    let target = TargetDensity::bimodal();
    for method in SamplingMethod::ALL {
        let explorer = Explorer::default().with_method(method).with_seed(11);
        let Snapshot::Sampling { target: plotted, run, .. } = explorer.snapshot(View::Sampling) else {
            panic!("sampling view produced another snapshot");
        };

        assert_eq!(plotted.len(), target.len());
        assert_eq!(run.method, method);
        assert!(!run.samples.is_empty(), "{method} drew nothing");
        assert!(run.samples.len() <= explorer.sampler.samples);
        assert!((0.0..=1.0).contains(&run.acceptance_rate()));
        for sample in &run.samples {
            assert!(sample.weight >= 0.0);
            if method == SamplingMethod::Rejection {
                assert!((-3.0..3.0).contains(&sample.x), "{} out of range", sample.x);
            }
        }
    }
}

#[test]
fn explorer_session_walkthrough() {
    let explorer = Explorer::default();
    let dashboard = explorer.dashboard();
    assert_eq!(dashboard.tabs.len(), 3);
    assert_eq!(dashboard.active_tab, 0);
    assert_eq!(dashboard.tabs[0].notes[0], "Normal Distribution");

    // binomial is drawn as bars with one bar per k in 0..=n
    let explorer = explorer.select(DistributionKind::Binomial).adjust(0, 2);
    assert_eq!(explorer.spec(), DistributionSpec::Binomial { n: 12, p: 0.5 });
    let dashboard = explorer.dashboard();
    let Plot::Graph2D(graph) = &dashboard.tabs[0].plots[0] else {
        panic!("distribution tab should hold a 2D graph");
    };
    assert_eq!(graph.layers.len(), 1);
    assert_eq!(graph.layers[0].geometry, Geometry2D::Bars);
    assert_eq!(graph.layers[0].xy.len(), 13);

    let explorer = explorer.next_view().next_view();
    assert_eq!(explorer.view, View::Multivariate);
    let dashboard = explorer.dashboard();
    assert_eq!(dashboard.active_tab, 2);
    let Plot::Heatmap(heatmap) = &dashboard.tabs[2].plots[0] else {
        panic!("multivariate tab should start with a heatmap");
    };
    assert_eq!(heatmap.values.len(), 50 * 50);
}

#[test]
fn same_seed_same_dashboard() {
    let a = Explorer::default().with_seed(5).with_method(SamplingMethod::Importance);
    let b = a.clone();
    assert_eq!(a.snapshot(View::Sampling), b.snapshot(View::Sampling));
    assert_eq!(a.snapshot(View::Multivariate), b.snapshot(View::Multivariate));
    assert_ne!(
        a.snapshot(View::Multivariate),
        a.with_seed(6).snapshot(View::Multivariate)
    );
}

#[test]
fn snapshots_serialise_with_a_view_tag() {
    let explorer = Explorer::default().select(DistributionKind::Poisson);
    let json = serde_json::to_value(explorer.snapshot(View::Distributions)).unwrap();

    assert_eq!(json["view"], "distributions");
    assert_eq!(json["description"]["title"], "Poisson Distribution");
    assert_eq!(json["points"].as_array().map(Vec::len), Some(16));

    let back: Snapshot = serde_json::from_value(json).unwrap();
    assert_eq!(back.description().title, "Poisson Distribution");
}
