use bevy::log::LogPlugin;
use bevy::prelude::*;

use crate::core::Dashboard;
use crate::explorer::Explorer;
use crate::render::{DashRenderPlugin, DashboardRes, ExplorerPlugin};

pub const DEFAULT_LOG_FILTER: &str = "info,wgpu=error,naga=warn,probviz=debug";

/// Window and logging settings for an interactive session.
#[derive(Clone, Debug)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// `EnvFilter` directives handed to Bevy's log plugin
    pub log_filter: String,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Probability Distributions & Sampling".into(),
            width: 1600,
            height: 900,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

fn default_plugins(options: &WindowOptions, canvas: Option<String>) -> impl PluginGroup {
    DefaultPlugins
        .set(WindowPlugin {
            primary_window: Some(Window {
                title: options.title.clone(),
                resolution: (options.width, options.height).into(),
                fit_canvas_to_parent: canvas.is_some(),
                canvas,
                ..default()
            }),
            ..default()
        })
        .set(LogPlugin {
            filter: options.log_filter.clone(),
            ..default()
        })
        .set(ImagePlugin::default_nearest())
}

fn clear_color(dashboard: &Dashboard) -> ClearColor {
    let bg = dashboard.background;
    ClearColor(Color::srgb(bg.r, bg.g, bg.b))
}

/// Show a static dashboard.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_dashboard(dashboard: Dashboard) {
    let options = WindowOptions::default();
    App::new()
        .insert_resource(clear_color(&dashboard))
        .insert_resource(DashboardRes::new(dashboard))
        .add_plugins((default_plugins(&options, None), DashRenderPlugin))
        .run();
}

/// Open the interactive explorer.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_explorer(explorer: Explorer, options: WindowOptions) -> AppExit {
    App::new()
        .insert_resource(clear_color(&Dashboard::default()))
        .add_plugins((
            default_plugins(&options, None),
            ExplorerPlugin { explorer },
            DashRenderPlugin,
        ))
        .run()
}

/// Run the explorer inside the canvas with id `canvas_id`.
#[cfg(target_arch = "wasm32")]
pub fn run_explorer(explorer: Explorer, options: WindowOptions, canvas_id: &str) -> AppExit {
    App::new()
        .insert_resource(clear_color(&Dashboard::default()))
        .add_plugins((
            default_plugins(&options, Some(format!("#{canvas_id}"))),
            ExplorerPlugin { explorer },
            DashRenderPlugin,
        ))
        .run()
}
