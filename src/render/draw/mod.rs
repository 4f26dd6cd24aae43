//! Drawing functions for the chart kinds.
//!
//! - `common`: borders, titles, coordinate transforms, axis ticks
//! - `charts_2d`: lines, points, areas, bars and stems
//! - `heatmap`: colour-mapped grids

mod charts_2d;
mod common;
mod heatmap;

pub use charts_2d::draw_2d_plot;
pub use common::{
    data_to_world, draw_axis_ticks, draw_plot_title, draw_tile_border, format_tick, nice_step,
    tile_layer, title_height, world_to_data,
};
pub use heatmap::{HeatmapLayout, draw_heatmap};
