use crate::core::{
    Dashboard, Geometry2D, Graph2D, Heatmap, Interaction, Layer2D, Origin, Plot, Style, Tab,
};
use bevy_math::{UVec2, Vec2};

pub fn dash() -> DashBuilder {
    DashBuilder {
        dash: Dashboard::default(),
    }
}

pub struct DashBuilder {
    dash: Dashboard,
}

impl DashBuilder {
    /// Set the number of columns per row (default: auto based on plot count)
    pub fn columns(mut self, cols: usize) -> Self {
        self.dash.columns = Some(cols.max(1));
        self
    }

    pub fn add_2d<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Plot2DBuilder) -> Plot2DBuilder,
    {
        let b = f(Plot2DBuilder::new());
        self.dash.plots.push(Plot::Graph2D(b.graph));
        self
    }

    pub fn add_heatmap<F>(mut self, f: F) -> Self
    where
        F: FnOnce(HeatmapBuilder) -> HeatmapBuilder,
    {
        let b = f(HeatmapBuilder::new());
        self.dash.plots.push(Plot::Heatmap(b.heatmap));
        self
    }

    /// Add a tab to the dashboard
    pub fn add_tab<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(TabBuilder) -> TabBuilder,
    {
        let b = f(TabBuilder::new(name));
        self.dash.tabs.push(b.tab);
        self
    }

    /// Get the built Dashboard without running it
    pub fn build(self) -> Dashboard {
        self.dash
    }

    /// Open a window showing this dashboard (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_local(self) {
        crate::runtime::run_dashboard(self.dash);
    }
}

/* -------------------- TAB BUILDER -------------------- */

pub struct TabBuilder {
    tab: Tab,
}

impl TabBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            tab: Tab::new(name),
        }
    }

    /// Set the number of columns per row for this tab
    pub fn columns(mut self, cols: usize) -> Self {
        self.tab.columns = Some(cols.max(1));
        self
    }

    /// Lines shown in the info panel while the tab is active
    pub fn notes(mut self, notes: Vec<String>) -> Self {
        self.tab.notes = notes;
        self
    }

    pub fn add_2d<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Plot2DBuilder) -> Plot2DBuilder,
    {
        let b = f(Plot2DBuilder::new());
        self.tab.plots.push(Plot::Graph2D(b.graph));
        self
    }

    pub fn add_heatmap<F>(mut self, f: F) -> Self
    where
        F: FnOnce(HeatmapBuilder) -> HeatmapBuilder,
    {
        let b = f(HeatmapBuilder::new());
        self.tab.plots.push(Plot::Heatmap(b.heatmap));
        self
    }
}

/* -------------------- PLOT 2D BUILDER -------------------- */

pub struct Plot2DBuilder {
    graph: Graph2D,
}

impl Plot2DBuilder {
    fn new() -> Self {
        Self {
            graph: Graph2D::new(),
        }
    }

    fn push_layer(mut self, geometry: Geometry2D, xy: Vec<Vec2>, style: Option<Style>) -> Self {
        let mut layer = Layer2D::new(geometry, xy);
        if let Some(st) = style {
            layer.style = st;
        }
        self.graph.layers.push(layer);
        self
    }

    pub fn line(self, xy: Vec<Vec2>, style: impl Into<Option<Style>>) -> Self {
        self.push_layer(Geometry2D::Line, xy, style.into())
    }

    pub fn scatter(self, xy: Vec<Vec2>, style: impl Into<Option<Style>>) -> Self {
        self.push_layer(Geometry2D::Points, xy, style.into())
    }

    /// Curve filled down to the x axis
    pub fn area(self, xy: Vec<Vec2>, style: impl Into<Option<Style>>) -> Self {
        self.push_layer(Geometry2D::Area, xy, style.into())
    }

    /// One bar per point; `style.size` is the bar width in data units
    pub fn bars(self, xy: Vec<Vec2>, style: impl Into<Option<Style>>) -> Self {
        self.push_layer(Geometry2D::Bars, xy, style.into())
    }

    pub fn stems(self, xy: Vec<Vec2>, style: impl Into<Option<Style>>) -> Self {
        self.push_layer(Geometry2D::Stems, xy, style.into())
    }

    /// Scatter with per-point diameters
    pub fn bubble(self, xy: Vec<Vec2>, sizes: Vec<f32>, style: impl Into<Option<Style>>) -> Self {
        let mut b = self.push_layer(Geometry2D::Points, xy, style.into());
        if let Some(layer) = b.graph.layers.last_mut() {
            layer.sizes = Some(sizes);
        }
        b
    }

    pub fn interaction(mut self, pan: bool, zoom: bool) -> Self {
        self.graph.interaction = Interaction { pan, zoom };
        self
    }

    /// Set the X-axis label
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.graph.x_label = Some(label.into());
        self
    }

    /// Set the Y-axis label
    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.graph.y_label = Some(label.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.graph.meta.title = Some(title.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        let desc = desc.into();
        self.graph.meta.description = (!desc.is_empty()).then_some(desc);
        self
    }
}

// Allow passing &Style into the `impl Into<Option<Style>>` slot.
impl From<&Style> for Option<Style> {
    #[inline]
    fn from(s: &Style) -> Self {
        Some(*s)
    }
}

/* -------------------- HEATMAP BUILDER -------------------- */

pub struct HeatmapBuilder {
    heatmap: Heatmap,
}

impl HeatmapBuilder {
    fn new() -> Self {
        Self {
            heatmap: Heatmap::new(),
        }
    }

    /// Set data as row-major 2D array with dimensions
    pub fn data(mut self, rows: usize, cols: usize, values: Vec<f32>) -> Self {
        self.heatmap.dims = UVec2::new(cols as u32, rows as u32);
        self.heatmap.values = values;
        self
    }

    pub fn vmin(mut self, v: f32) -> Self {
        self.heatmap.vmin = Some(v);
        self
    }

    /// Map the cell grid onto `[x_min, x_max, y_min, y_max]` in data space.
    /// Axes get numeric ticks only when this is set.
    pub fn extent(mut self, extent: [f32; 4]) -> Self {
        self.heatmap.extent = Some(extent);
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.heatmap.origin = origin;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.heatmap.meta.title = Some(title.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.heatmap.meta.description = Some(desc.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_collect_plots_and_notes() {
        let dashboard = dash()
            .add_tab("first", |t| {
                t.columns(0)
                    .notes(vec!["hello".into()])
                    .add_2d(|p| p.line(vec![Vec2::ZERO, Vec2::ONE], None).title("curve"))
            })
            .add_tab("second", |t| t.add_heatmap(|h| h.data(2, 3, vec![0.0; 6])))
            .build();

        assert_eq!(dashboard.tab_names(), vec!["first", "second"]);
        assert_eq!(dashboard.active_columns(), Some(1));
        assert_eq!(dashboard.active_notes(), ["hello".to_string()]);
        assert_eq!(dashboard.active_plots()[0].meta().title.as_deref(), Some("curve"));

        let Plot::Heatmap(h) = &dashboard.tabs[1].plots[0] else {
            panic!("expected a heatmap");
        };
        assert_eq!(h.dims, UVec2::new(3, 2));
    }

    #[test]
    fn bubble_keeps_sizes_on_its_layer() {
        let dashboard = dash()
            .add_2d(|p| {
                p.line(vec![Vec2::ZERO], None)
                    .bubble(vec![Vec2::ONE, Vec2::ZERO], vec![2.0, 8.0], &Style::default())
                    .stems(vec![Vec2::ONE], None)
                    .interaction(false, true)
            })
            .build();

        let Plot::Graph2D(g) = &dashboard.plots[0] else {
            panic!("expected a 2D graph");
        };
        assert!(g.layers[0].sizes.is_none());
        assert_eq!(g.layers[1].sizes.as_deref(), Some(&[2.0, 8.0][..]));
        assert_eq!(g.layers[2].geometry, Geometry2D::Stems);
        assert!(g.layers[2].sizes.is_none());
        assert!(!g.interaction.pan && g.interaction.zoom);
    }

    #[test]
    fn empty_description_is_dropped() {
        let dashboard = dash().add_2d(|p| p.description("")).build();
        assert!(dashboard.plots[0].meta().description.is_none());
    }
}
