pub mod chrome;
pub mod components;
pub mod controls;
pub mod draw;
pub mod resources;
pub mod systems;

pub use components::*;
pub use controls::{ExplorerPlugin, ExplorerRes};
use draw::*;
pub use resources::*;
use systems::*;

use bevy::prelude::*;
use chrome::{draw_chrome, handle_tab_clicks};

/// Renders [`DashboardRes`] as a grid of tiles, each with its own camera,
/// plus a tab bar and info panel.
#[derive(Default)]
pub struct DashRenderPlugin;

impl Plugin for DashRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileRegistry>()
            .init_resource::<HoveredTile>()
            .init_resource::<CursorWorldPos>()
            .init_resource::<PanelFooter>()
            .add_systems(Startup, (setup_global_scene, setup_unit_meshes))
            .add_systems(
                Update,
                (
                    handle_tab_clicks,
                    (
                        sync_plots_to_tiles,
                        update_tile_layout,
                        auto_fit_tiles,
                        sync_tile_cameras,
                        update_hovered_tile,
                        handle_input,
                        draw_dirty_tiles,
                        update_crosshair,
                    )
                        .chain(),
                    draw_chrome,
                )
                    .chain(),
            );
    }
}
