//! Heatmap cells and extent ticks.

#![allow(clippy::too_many_arguments)]

use super::common::{BORDER_COLOR, draw_plot_title, draw_tile_border, format_tick, nice_step, spawn_tick};
use crate::core::{Heatmap, Origin};
use crate::render::{TileRect, UnitMeshes};
use bevy::prelude::*;
use bevy_camera::visibility::RenderLayers;

/// Where the cells of a heatmap sit inside its tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapLayout {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    pub rows: usize,
    pub cols: usize,
    pub origin: Origin,
}

impl HeatmapLayout {
    pub fn new(heatmap: &Heatmap, rect: &TileRect, title_height: f32) -> Self {
        // room for tick labels
        let pad = if heatmap.extent.is_some() { 0.12 } else { 0.06 };

        let pad_left = pad;
        let pad_right = 0.06;
        let pad_bottom = pad;
        let pad_top = 0.04;

        let size = rect.world_size;
        let height = (size.y * (1.0 - pad_bottom - pad_top) - title_height).max(1.0);
        Self {
            left: rect.world_center.x - size.x * 0.5 + size.x * pad_left,
            bottom: rect.world_center.y - size.y * 0.5 + size.y * pad_bottom,
            width: size.x * (1.0 - pad_left - pad_right),
            height,
            rows: heatmap.dims.y as usize,
            cols: heatmap.dims.x as usize,
            origin: heatmap.origin,
        }
    }

    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.width / self.cols.max(1) as f32,
            self.height / self.rows.max(1) as f32,
        )
    }

    /// Visual row, counted from the bottom, of data row `row`.
    fn visual_row(&self, row: usize) -> usize {
        match self.origin {
            Origin::Lower => row,
            Origin::Upper => self.rows - 1 - row,
        }
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        let cell = self.cell_size();
        Vec2::new(
            self.left + (col as f32 + 0.5) * cell.x,
            self.bottom + (self.visual_row(row) as f32 + 0.5) * cell.y,
        )
    }

    /// `(row, col)` under a world position.
    pub fn cell_at(&self, world: Vec2) -> Option<(usize, usize)> {
        let local = world - Vec2::new(self.left, self.bottom);
        if local.x < 0.0 || local.y < 0.0 || local.x >= self.width || local.y >= self.height {
            return None;
        }
        let cell = self.cell_size();
        let col = ((local.x / cell.x) as usize).min(self.cols.checked_sub(1)?);
        let visual = ((local.y / cell.y) as usize).min(self.rows.checked_sub(1)?);
        Some((self.visual_row(visual), col))
    }

    /// Map a data-space value along x or y of the extent to world space.
    fn extent_to_world(&self, extent: [f32; 4], data: Vec2) -> Vec2 {
        let tx = (data.x - extent[0]) / (extent[1] - extent[0]);
        let ty = (data.y - extent[2]) / (extent[3] - extent[2]);
        let ty = match self.origin {
            Origin::Lower => ty,
            Origin::Upper => 1.0 - ty,
        };
        Vec2::new(self.left + tx * self.width, self.bottom + ty * self.height)
    }

    /// Data coordinates of a world position, when the heatmap has an extent.
    pub fn world_to_extent(&self, extent: [f32; 4], world: Vec2) -> Vec2 {
        let tx = (world.x - self.left) / self.width;
        let ty = (world.y - self.bottom) / self.height;
        let ty = match self.origin {
            Origin::Lower => ty,
            Origin::Upper => 1.0 - ty,
        };
        Vec2::new(
            extent[0] + tx * (extent[1] - extent[0]),
            extent[2] + ty * (extent[3] - extent[2]),
        )
    }
}

pub fn draw_heatmap(
    commands: &mut Commands,
    root: Entity,
    heatmap: &Heatmap,
    rect: &TileRect,
    unit: &UnitMeshes,
    materials: &mut Assets<ColorMaterial>,
    layers: RenderLayers,
) {
    let rows = heatmap.dims.y as usize;
    let cols = heatmap.dims.x as usize;

    draw_tile_border(commands, root, rect, unit, materials, layers.clone(), BORDER_COLOR, 1.0);
    let title_height = draw_plot_title(commands, root, &heatmap.meta, rect, layers.clone());

    if rows == 0 || cols == 0 || heatmap.values.is_empty() {
        return;
    }

    let layout = HeatmapLayout::new(heatmap, rect, title_height);
    let cell = layout.cell_size();
    // Dense grids would show seams with a 1px gutter
    let gutter = if cell.x > 8.0 && cell.y > 8.0 { 1.0 } else { 0.0 };

    for (idx, color) in heatmap.cell_colors().into_iter().enumerate().take(rows * cols) {
        let (row, col) = (idx / cols, idx % cols);
        let center = layout.cell_center(row, col);
        let cell_mat = materials.add(ColorMaterial::from(Color::from(color)));

        commands.entity(root).with_children(|parent| {
            parent.spawn((
                Mesh2d(unit.quad.clone()),
                MeshMaterial2d(cell_mat),
                Transform {
                    translation: center.extend(0.0),
                    // slight overdraw hides hairline gaps between cells
                    scale: Vec3::new(cell.x - gutter + 0.5, cell.y - gutter + 0.5, 1.0),
                    ..default()
                },
                layers.clone(),
            ));
        });
    }

    if let Some(extent) = heatmap.extent {
        draw_extent_ticks(commands, root, &layout, extent, unit, materials, &layers);
    }
}

fn draw_extent_ticks(
    commands: &mut Commands,
    root: Entity,
    layout: &HeatmapLayout,
    extent: [f32; 4],
    unit: &UnitMeshes,
    materials: &mut Assets<ColorMaterial>,
    layers: &RenderLayers,
) {
    let tick_mat = materials.add(ColorMaterial::from(Color::srgba(0.5, 0.5, 0.55, 0.6)));

    for axis in 0..2 {
        let (lo, hi) = (extent[axis * 2], extent[axis * 2 + 1]);
        let step = nice_step(hi - lo, 6);
        let first = (lo / step).ceil() as i32;
        let last = (hi / step).floor() as i32;
        for i in first..=last {
            let v = i as f32 * step;
            if axis == 0 {
                let x = layout.extent_to_world(extent, Vec2::new(v, extent[2])).x;
                spawn_tick(
                    commands,
                    root,
                    unit,
                    &tick_mat,
                    layers,
                    Vec2::new(x, layout.bottom - 3.0),
                    Vec2::new(1.0, 6.0),
                    format_tick(v),
                    Vec2::new(x, layout.bottom - 16.0),
                );
            } else {
                let y = layout.extent_to_world(extent, Vec2::new(extent[0], v)).y;
                spawn_tick(
                    commands,
                    root,
                    unit,
                    &tick_mat,
                    layers,
                    Vec2::new(layout.left - 3.0, y),
                    Vec2::new(6.0, 1.0),
                    format_tick(v),
                    Vec2::new(layout.left - 20.0, y),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::UVec2;

    fn layout(origin: Origin) -> HeatmapLayout {
        let heatmap = Heatmap {
            dims: UVec2::new(4, 2),
            values: vec![0.0; 8],
            origin,
            ..Heatmap::new()
        };
        let rect = TileRect::new(Vec2::ZERO, Vec2::new(200.0, 100.0));
        HeatmapLayout::new(&heatmap, &rect, 0.0)
    }

    #[test]
    fn lower_origin_puts_row_zero_at_the_bottom() {
        let lower = layout(Origin::Lower);
        let upper = layout(Origin::Upper);
        assert!(lower.cell_center(0, 0).y < lower.cell_center(1, 0).y);
        assert!(upper.cell_center(0, 0).y > upper.cell_center(1, 0).y);
    }

    #[test]
    fn cell_lookup_inverts_cell_centres() {
        for origin in [Origin::Lower, Origin::Upper] {
            let l = layout(origin);
            for row in 0..2 {
                for col in 0..4 {
                    assert_eq!(l.cell_at(l.cell_center(row, col)), Some((row, col)));
                }
            }
            assert_eq!(l.cell_at(Vec2::new(l.left - 1.0, l.bottom + 1.0)), None);
        }
    }

    #[test]
    fn extent_widens_the_tick_margins() {
        let plain = layout(Origin::Lower);
        let heatmap = Heatmap {
            dims: UVec2::new(4, 2),
            values: vec![0.0; 8],
            extent: Some([-3.0, 3.0, -3.0, 3.0]),
            ..Heatmap::new()
        };
        let rect = TileRect::new(Vec2::ZERO, Vec2::new(200.0, 100.0));
        let ticked = HeatmapLayout::new(&heatmap, &rect, 0.0);
        assert!(ticked.left > plain.left);
        assert!(ticked.bottom > plain.bottom);
        assert!(ticked.width < plain.width);
    }

    #[test]
    fn extent_maps_corners() {
        let l = layout(Origin::Lower);
        let extent = [-3.0, 3.0, -3.0, 3.0];
        let corner = l.world_to_extent(extent, Vec2::new(l.left, l.bottom));
        assert!((corner - Vec2::new(-3.0, -3.0)).length() < 1e-4);
        let mid = l.extent_to_world(extent, Vec2::ZERO);
        assert!((l.world_to_extent(extent, mid)).length() < 1e-4);
    }
}
