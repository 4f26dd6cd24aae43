use bevy::prelude::*;
use bevy_camera::Viewport;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Component, Clone, Copy, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct PlotId(pub u64);

impl Default for PlotId {
    fn default() -> Self {
        static CTR: AtomicU64 = AtomicU64::new(1);
        Self(CTR.fetch_add(1, Ordering::Relaxed))
    }
}

impl PlotId {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Component)]
pub struct PlotTile {
    pub id: PlotId,
    pub index: usize,
    pub kind: PlotKind,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotKind {
    Graph,
    Heatmap,
}

impl PlotKind {
    pub fn of(plot: &crate::core::Plot) -> Self {
        match plot {
            crate::core::Plot::Graph2D(_) => PlotKind::Graph,
            crate::core::Plot::Heatmap(_) => PlotKind::Heatmap,
        }
    }
}

/// Pan and zoom state of a tile. Scale is per axis so a density curve
/// with a tiny y range still fills the tile.
#[derive(Component, Clone, Copy, Debug)]
pub struct TileView {
    pub offset: Vec2,
    pub scale: Vec2,
    pub min_scale: Vec2,
    pub max_scale: Vec2,
}

impl Default for TileView {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            min_scale: Vec2::splat(0.1),
            max_scale: Vec2::splat(100.0),
        }
    }
}

impl TileView {
    pub fn zoom(&mut self, factor: f32) {
        self.scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
    }
}

#[derive(Component)]
pub struct TileRect {
    pub world_center: Vec2,
    pub world_size: Vec2,
    pub content: Rect,
    pub viewport: Viewport,
}

impl TileRect {
    pub fn new(world_center: Vec2, world_size: Vec2) -> Self {
        Self {
            world_center,
            world_size,
            content: Rect::from_center_size(world_center, (world_size - 30.0).max(Vec2::ONE)),
            viewport: Viewport {
                physical_position: UVec2::ZERO,
                physical_size: world_size.max(Vec2::ONE).as_uvec2(),
                depth: 0.0..1.0,
            },
        }
    }

    pub fn contains(&self, world: Vec2) -> bool {
        Rect::from_center_size(self.world_center, self.world_size).contains(world)
    }
}

#[derive(Component)]
pub struct TileRenderRoot;

#[derive(Component)]
pub struct TileCamera;

/// Marker for crosshair parent entity
#[derive(Component)]
pub struct Crosshair {
    pub tile_index: usize,
}

#[derive(Component)]
pub struct CrosshairHLine;

#[derive(Component)]
pub struct CrosshairVLine;

#[derive(Component)]
pub struct CrosshairCoordText;

/// Marker to track if a tile has been auto-fitted to its data
#[derive(Component)]
pub struct AutoFitted;

/// Root of everything drawn outside the tiles: tab bar and info panel
#[derive(Component)]
pub struct Chrome;

/// Clickable tab header, in world coordinates of the main camera
#[derive(Component)]
pub struct TabButton {
    pub index: usize,
    pub rect: Rect,
}
