use crate::render::components::PlotId;
use bevy_math::{UVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Common metadata for all plot types
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlotMeta {
    /// Title displayed at the top of the plot
    pub title: Option<String>,
    /// Optional description displayed below the title
    pub description: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    // Palette used by the explorer charts
    pub const STEEL_BLUE: Self = Self::rgb(0.27, 0.51, 0.71);
    pub const LAVENDER: Self = Self::rgb(0.53, 0.52, 0.85);
    pub const SAMPLE_RED: Self = Self::rgb(0.95, 0.3, 0.3);
}

impl From<Color> for bevy::prelude::Color {
    #[inline]
    fn from(c: Color) -> Self {
        bevy::prelude::Color::srgba(c.r, c.g, c.b, c.a)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub size: f32,    // line width / point diameter / bar width in data units
    pub opacity: f32, // multiplied into alpha
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 2.0,
            opacity: 1.0,
        }
    }
}

impl Style {
    pub const fn new(color: Color, size: f32, opacity: f32) -> Self {
        Self { color, size, opacity }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub pan: bool,
    pub zoom: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            pan: true,
            zoom: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Plot {
    Graph2D(Graph2D),
    Heatmap(Heatmap),
}

impl Plot {
    pub fn meta(&self) -> &PlotMeta {
        match self {
            Plot::Graph2D(g) => &g.meta,
            Plot::Heatmap(h) => &h.meta,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Graph2D {
    pub id: PlotId,
    pub meta: PlotMeta,
    pub layers: Vec<Layer2D>,
    pub interaction: Interaction,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl Default for Graph2D {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph2D {
    pub fn new() -> Self {
        Self {
            id: PlotId::new(),
            meta: PlotMeta::default(),
            layers: vec![],
            interaction: Interaction::default(),
            x_label: None,
            y_label: None,
        }
    }

    pub fn with_layer(mut self, layer: Layer2D) -> Self {
        self.layers.push(layer);
        self
    }

    /// Data bounds over all layers. Bars, stems and areas include their
    /// baseline at y = 0.
    pub fn bounds(&self) -> Option<([f32; 2], [f32; 2])> {
        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        let mut any = false;
        for l in &self.layers {
            let half_width = match l.geometry {
                Geometry2D::Bars => l.style.size * 0.5,
                _ => 0.0,
            };
            for p in &l.xy {
                if !p.x.is_finite() || !p.y.is_finite() {
                    continue;
                }
                min[0] = min[0].min(p.x - half_width);
                min[1] = min[1].min(p.y);
                max[0] = max[0].max(p.x + half_width);
                max[1] = max[1].max(p.y);
                any = true;
            }
            if any && l.geometry.has_baseline() {
                min[1] = min[1].min(0.0);
                max[1] = max[1].max(0.0);
            }
        }
        any.then_some((min, max))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Geometry2D {
    Line,
    Points,
    Area,  // filled from the curve down to y = 0
    Bars,  // interpret xy as (x, y) heights, style.size is the bar width
    Stems, // vertical from baseline to y
}

impl Geometry2D {
    pub fn has_baseline(self) -> bool {
        matches!(self, Geometry2D::Area | Geometry2D::Bars | Geometry2D::Stems)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer2D {
    pub geometry: Geometry2D,
    pub xy: Vec<Vec2>,
    pub style: Style,
    /// Per-point diameters for points layers (uses style.size if None)
    pub sizes: Option<Vec<f32>>,
}

impl Layer2D {
    pub fn new(geometry: Geometry2D, xy: Vec<Vec2>) -> Self {
        Self {
            geometry,
            xy,
            style: Style::default(),
            sizes: None,
        }
    }
}

/// Where row 0 of a heatmap is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    #[default]
    Upper,
    Lower,
}

/// Colour-mapped grid of cell values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Heatmap {
    pub meta: PlotMeta,
    pub dims: UVec2,       // (cols, rows)
    pub values: Vec<f32>,  // row-major: values[row * cols + col]
    pub vmin: Option<f32>, // data minimum if None
    /// Data-space rectangle covered by the cells: [x_min, x_max, y_min, y_max]
    pub extent: Option<[f32; 4]>,
    pub origin: Origin,
}

impl Heatmap {
    pub fn new() -> Self {
        Self {
            meta: PlotMeta::default(),
            dims: UVec2::ZERO,
            values: vec![],
            vmin: None,
            extent: None,
            origin: Origin::default(),
        }
    }

    /// Value range used for color mapping. The top is always the data maximum.
    pub fn value_range(&self) -> (f32, f32) {
        let vmin = self
            .vmin
            .unwrap_or_else(|| self.values.iter().cloned().fold(f32::INFINITY, f32::min));
        let vmax = self.values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        (vmin, vmax)
    }

    /// One color per value on a white-to-blue ramp over the value range.
    pub fn cell_colors(&self) -> Vec<Color> {
        let (vmin, vmax) = self.value_range();
        let span = (vmax - vmin).max(f32::EPSILON);
        self.values
            .iter()
            .map(|v| {
                let t = ((v - vmin) / span).clamp(0.0, 1.0);
                Color::rgb(0.97 - t * 0.94, 0.98 - t * 0.79, 1.0 - t * 0.58)
            })
            .collect()
    }
}

impl Default for Heatmap {
    fn default() -> Self {
        Self::new()
    }
}

/// A tab containing a set of plots
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tab {
    pub name: String,
    pub plots: Vec<Plot>,
    pub columns: Option<usize>,
    /// Free text shown in the info panel while this tab is active
    pub notes: Vec<String>,
}

impl Tab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plots: vec![],
            columns: None,
            notes: vec![],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dashboard {
    pub background: Color,
    /// Direct plots (when not using tabs)
    pub plots: Vec<Plot>,
    /// Number of columns per row (default: auto based on plot count)
    pub columns: Option<usize>,
    /// Tabs (alternative to direct plots)
    pub tabs: Vec<Tab>,
    /// Currently active tab index
    pub active_tab: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            background: Color::rgba(0.05, 0.05, 0.09, 1.0),
            plots: vec![],
            columns: None,
            tabs: vec![],
            active_tab: 0,
        }
    }
}

impl Dashboard {
    /// Returns true if this dashboard uses tabs
    pub fn has_tabs(&self) -> bool {
        !self.tabs.is_empty()
    }

    /// Get the active plots (from active tab if using tabs, otherwise direct plots)
    pub fn active_plots(&self) -> &[Plot] {
        if self.has_tabs() {
            self.tabs
                .get(self.active_tab)
                .map(|t| t.plots.as_slice())
                .unwrap_or(&[])
        } else {
            &self.plots
        }
    }

    /// Get the columns setting for the active view
    pub fn active_columns(&self) -> Option<usize> {
        if self.has_tabs() {
            self.tabs
                .get(self.active_tab)
                .and_then(|t| t.columns)
                .or(self.columns)
        } else {
            self.columns
        }
    }

    /// Info panel text for the active view
    pub fn active_notes(&self) -> &[String] {
        self.tabs
            .get(self.active_tab)
            .map(|t| t.notes.as_slice())
            .unwrap_or(&[])
    }

    /// Get tab names for UI
    pub fn tab_names(&self) -> Vec<&str> {
        self.tabs.iter().map(|t| t.name.as_str()).collect()
    }
}
