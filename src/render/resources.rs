use super::components::PlotId;
use bevy::prelude::*;
use bevy_camera::visibility::RenderLayers;
use std::collections::{HashMap, VecDeque};

#[derive(Resource, Clone)]
pub struct DashboardRes(pub crate::core::Dashboard);

impl DashboardRes {
    pub fn new(dashboard: crate::core::Dashboard) -> Self {
        Self(dashboard)
    }
}

#[derive(Resource, Default)]
pub struct TileRegistry {
    pub by_plot: HashMap<PlotId, Entity>,
    pub camera_of: HashMap<PlotId, Entity>,
    pub dirty: VecDeque<PlotId>,
}

#[derive(Resource, Default)]
pub struct HoveredTile(pub Option<usize>);

#[derive(Resource, Default)]
pub struct CursorWorldPos {
    /// World position of cursor (if over a tile)
    pub position: Option<Vec2>,
    /// Data coordinates (converted from world coords)
    pub data_coords: Option<Vec2>,
    /// Which tile the cursor is over
    pub tile_index: Option<usize>,
}

/// Extra lines appended under the active tab's notes in the info panel
#[derive(Resource, Default, Clone)]
pub struct PanelFooter(pub Vec<String>);

#[derive(Resource)]
pub struct UnitMeshes {
    pub quad: Handle<Mesh>,
    pub disc: Handle<Mesh>,
}

/// Main camera: clears the whole window and draws the tab bar and info
/// panel on layer 0. Tile cameras render on top of it.
pub fn setup_global_scene(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 0,
            ..default()
        },
        RenderLayers::layer(0),
    ));
}

pub fn setup_unit_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let quad = meshes.add(Mesh::from(Rectangle::new(1.0, 1.0)));
    let disc = meshes.add(Mesh::from(Circle::new(0.5)));
    commands.insert_resource(UnitMeshes { quad, disc });
}
