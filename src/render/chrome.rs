//! Tab bar and info panel, drawn by the main camera around the tile grid.

use super::components::{Chrome, TabButton};
use super::resources::{DashboardRes, PanelFooter, UnitMeshes};
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::text::TextBounds;
use bevy::window::PrimaryWindow;
use bevy_camera::visibility::RenderLayers;

pub const TAB_BAR_HEIGHT: f32 = 36.0;
pub const PANEL_WIDTH: f32 = 360.0;
const TAB_WIDTH: f32 = 190.0;
const PADDING: f32 = 14.0;

/// World-space rectangle left for the tiles once the tab bar and info
/// panel have taken their share of the window.
pub fn plot_area(window: Vec2, has_tabs: bool, has_panel: bool) -> Rect {
    let half = window * 0.5;
    let top = if has_tabs { half.y - TAB_BAR_HEIGHT } else { half.y };
    // keep at least half the window for the plots
    let right = if has_panel {
        half.x - PANEL_WIDTH.min(window.x * 0.5)
    } else {
        half.x
    };
    Rect::new(-half.x, -half.y, right, top)
}

/// Whether the active view shows the info panel.
pub fn has_panel(dash: &DashboardRes, footer: &PanelFooter) -> bool {
    !dash.0.active_notes().is_empty() || !footer.0.is_empty()
}

/// Redraw tab bar and info panel when the dashboard, footer or window size
/// changes.
pub fn draw_chrome(
    mut commands: Commands,
    dash: Res<DashboardRes>,
    footer: Res<PanelFooter>,
    windows: Query<&Window, With<PrimaryWindow>>,
    existing: Query<Entity, With<Chrome>>,
    unit: Option<Res<UnitMeshes>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut last_size: Local<Vec2>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(unit) = unit else {
        return;
    };
    let size = window.size();
    if !dash.is_changed() && !footer.is_changed() && *last_size == size {
        return;
    }
    *last_size = size;

    for entity in existing.iter() {
        commands.entity(entity).try_despawn();
    }

    let layers = RenderLayers::layer(0);
    let half = size * 0.5;
    let root = commands
        .spawn((Chrome, Transform::default(), Visibility::default()))
        .id();

    if dash.0.has_tabs() {
        let bar_mat = materials.add(ColorMaterial::from(Color::srgb(0.09, 0.09, 0.14)));
        let tab_mat = materials.add(ColorMaterial::from(Color::srgb(0.16, 0.16, 0.24)));
        let active_mat = materials.add(ColorMaterial::from(Color::srgb(0.33, 0.33, 0.55)));
        let bar_y = half.y - TAB_BAR_HEIGHT * 0.5;

        commands.entity(root).with_children(|parent| {
            parent.spawn((
                Mesh2d(unit.quad.clone()),
                MeshMaterial2d(bar_mat),
                Transform {
                    translation: Vec3::new(0.0, bar_y, 0.0),
                    scale: Vec3::new(size.x, TAB_BAR_HEIGHT, 1.0),
                    ..default()
                },
                layers.clone(),
            ));

            for (index, name) in dash.0.tab_names().into_iter().enumerate() {
                let x = -half.x + PADDING + (index as f32 + 0.5) * (TAB_WIDTH + 6.0);
                let rect =
                    Rect::from_center_size(Vec2::new(x, bar_y), Vec2::new(TAB_WIDTH, TAB_BAR_HEIGHT - 8.0));
                let mat = if index == dash.0.active_tab {
                    active_mat.clone()
                } else {
                    tab_mat.clone()
                };
                parent.spawn((
                    Mesh2d(unit.quad.clone()),
                    MeshMaterial2d(mat),
                    Transform {
                        translation: rect.center().extend(0.1),
                        scale: rect.size().extend(1.0),
                        ..default()
                    },
                    TabButton { index, rect },
                    layers.clone(),
                ));
                parent.spawn((
                    Text2d::new(format!("{}  {}", index + 1, name)),
                    TextFont {
                        font_size: 13.0,
                        ..default()
                    },
                    TextColor(Color::srgba(1.0, 1.0, 1.0, 0.9)),
                    Transform::from_translation(rect.center().extend(0.2)),
                    layers.clone(),
                ));
            }
        });
    }

    if !has_panel(&dash, &footer) {
        return;
    }

    let area = plot_area(size, dash.0.has_tabs(), true);
    let panel = Rect::new(area.max.x, -half.y, half.x, area.max.y);
    let panel_mat = materials.add(ColorMaterial::from(Color::srgb(0.08, 0.08, 0.12)));
    let text_width = (panel.width() - 2.0 * PADDING).max(10.0);

    let notes = dash.0.active_notes();
    let (heading, body) = match notes.split_first() {
        Some((heading, rest)) => (heading.clone(), rest.join("\n\n")),
        None => (String::new(), String::new()),
    };
    let footer_text = footer.0.join("\n");

    commands.entity(root).with_children(|parent| {
        parent.spawn((
            Mesh2d(unit.quad.clone()),
            MeshMaterial2d(panel_mat),
            Transform {
                translation: panel.center().extend(0.0),
                scale: panel.size().extend(1.0),
                ..default()
            },
            layers.clone(),
        ));

        let left = panel.min.x + PADDING;
        parent.spawn((
            Text2d::new(heading),
            TextFont {
                font_size: 17.0,
                ..default()
            },
            TextColor(Color::srgba(1.0, 1.0, 1.0, 0.95)),
            TextBounds::new_horizontal(text_width),
            Anchor::TOP_LEFT,
            Transform::from_translation(Vec3::new(left, panel.max.y - PADDING, 0.2)),
            layers.clone(),
        ));
        parent.spawn((
            Text2d::new(body),
            TextFont {
                font_size: 12.0,
                ..default()
            },
            TextColor(Color::srgba(0.82, 0.82, 0.86, 0.92)),
            TextBounds::new_horizontal(text_width),
            Anchor::TOP_LEFT,
            Transform::from_translation(Vec3::new(left, panel.max.y - PADDING - 34.0, 0.2)),
            layers.clone(),
        ));
        parent.spawn((
            Text2d::new(footer_text),
            TextFont {
                font_size: 11.0,
                ..default()
            },
            TextColor(Color::srgba(0.6, 0.6, 0.7, 0.9)),
            TextBounds::new_horizontal(text_width),
            Anchor::BOTTOM_LEFT,
            Transform::from_translation(Vec3::new(left, panel.min.y + PADDING, 0.2)),
            layers,
        ));
    });
}

/// Switch tabs on click.
pub fn handle_tab_clicks(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Query<&TabButton>,
    mut dash: ResMut<DashboardRes>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let world = Vec2::new(cursor.x - window.width() * 0.5, window.height() * 0.5 - cursor.y);

    let Some(button) = buttons.iter().find(|b| b.rect.contains(world)) else {
        return;
    };
    if button.index != dash.0.active_tab {
        debug!(tab = button.index, "tab selected");
        dash.0.active_tab = button.index;
    }
}
