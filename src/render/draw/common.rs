//! Drawing helpers shared by the chart kinds.

#![allow(clippy::too_many_arguments)]

use crate::render::{TileRect, TileView, UnitMeshes};
use bevy::prelude::*;
use bevy_camera::visibility::RenderLayers;

pub const BORDER_COLOR: Color = Color::srgb(0.3, 0.3, 0.4);
const TICK_LABEL_COLOR: Color = Color::srgba(0.7, 0.7, 0.7, 0.9);

/// Render layer of a tile. Layer 0 belongs to the main camera.
pub fn tile_layer(index: usize) -> RenderLayers {
    RenderLayers::layer(1 + index % 31)
}

/// Layer color with its opacity folded into alpha.
pub fn style_color(style: &crate::core::Style) -> Color {
    let c = style.color;
    Color::srgba(c.r, c.g, c.b, c.a * style.opacity)
}

pub fn draw_tile_border(
    commands: &mut Commands,
    root: Entity,
    rect: &TileRect,
    unit: &UnitMeshes,
    materials: &mut Assets<ColorMaterial>,
    layers: RenderLayers,
    color: Color,
    z: f32,
) {
    let border_mat = materials.add(ColorMaterial::from(color));
    let border_thickness = 2.0;

    commands.entity(root).with_children(|parent| {
        for (dx, dy) in [(0.0, 0.5), (0.0, -0.5), (-0.5, 0.0), (0.5, 0.0)] {
            parent.spawn((
                Mesh2d(unit.quad.clone()),
                MeshMaterial2d(border_mat.clone()),
                Transform {
                    translation: Vec3::new(
                        rect.world_center.x + dx * rect.world_size.x,
                        rect.world_center.y + dy * rect.world_size.y,
                        z,
                    ),
                    scale: if dx == 0.0 {
                        Vec3::new(rect.world_size.x, border_thickness, 1.0)
                    } else {
                        Vec3::new(border_thickness, rect.world_size.y, 1.0)
                    },
                    ..default()
                },
                layers.clone(),
            ));
        }
    });
}

/// Vertical space the title block of `meta` takes.
pub fn title_height(meta: &crate::core::PlotMeta) -> f32 {
    let title = if meta.title.is_some() { 22.0 } else { 0.0 };
    let desc = if meta.description.is_some() { 16.0 } else { 0.0 };
    title + desc
}

/// Draw title and description along the top edge of a tile.
/// Returns the height taken.
pub fn draw_plot_title(
    commands: &mut Commands,
    root: Entity,
    meta: &crate::core::PlotMeta,
    rect: &TileRect,
    layers: RenderLayers,
) -> f32 {
    if meta.title.is_none() && meta.description.is_none() {
        return 0.0;
    }

    let title_y = rect.world_center.y + rect.world_size.y * 0.5 - 18.0;

    commands.entity(root).with_children(|parent| {
        if let Some(title) = &meta.title {
            parent.spawn((
                Text2d::new(title.clone()),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.95)),
                Transform::from_translation(Vec3::new(rect.world_center.x, title_y, 3.0)),
                layers.clone(),
            ));
        }

        if let Some(desc) = &meta.description {
            let desc_y = title_y - if meta.title.is_some() { 18.0 } else { 0.0 };
            parent.spawn((
                Text2d::new(desc.clone()),
                TextFont {
                    font_size: 11.0,
                    ..default()
                },
                TextColor(Color::srgba(0.7, 0.7, 0.7, 0.85)),
                Transform::from_translation(Vec3::new(rect.world_center.x, desc_y, 3.0)),
                layers,
            ));
        }
    });

    title_height(meta)
}

pub fn data_to_world(data: Vec2, rect: &TileRect, view: &TileView) -> Vec2 {
    rect.world_center + view.offset + data * view.scale
}

pub fn world_to_data(world: Vec2, rect: &TileRect, view: &TileView) -> Vec2 {
    (world - rect.world_center - view.offset) / view.scale
}

/// Round step giving roughly `target_ticks` ticks over `range`.
pub fn nice_step(range: f32, target_ticks: usize) -> f32 {
    if range <= 0.0 || !range.is_finite() {
        return 1.0;
    }
    let rough = range / target_ticks as f32;
    let exp = rough.log10().floor();
    let base = 10f32.powf(exp);

    let normalized = rough / base;
    let nice = if normalized <= 1.5 {
        1.0
    } else if normalized <= 3.0 {
        2.0
    } else if normalized <= 7.0 {
        5.0
    } else {
        10.0
    };

    (nice * base).max(0.001)
}

pub fn format_tick(val: f32) -> String {
    if val.abs() < 0.001 && val != 0.0 {
        format!("{:.1e}", val)
    } else if val.abs() >= 1000.0 {
        format!("{:.1e}", val)
    } else if val.fract().abs() < 0.001 {
        format!("{:.0}", val)
    } else if val.abs() < 1.0 {
        format!("{:.2}", val)
    } else {
        format!("{:.1}", val)
    }
}

/// Spawn one tick mark with its label.
pub fn spawn_tick(
    commands: &mut Commands,
    root: Entity,
    unit: &UnitMeshes,
    mat: &Handle<ColorMaterial>,
    layers: &RenderLayers,
    mark: Vec2,
    mark_size: Vec2,
    label: String,
    label_pos: Vec2,
) {
    commands.entity(root).with_children(|parent| {
        parent.spawn((
            Mesh2d(unit.quad.clone()),
            MeshMaterial2d(mat.clone()),
            Transform {
                translation: mark.extend(0.6),
                scale: mark_size.extend(1.0),
                ..default()
            },
            layers.clone(),
        ));
        parent.spawn((
            Text2d::new(label),
            TextFont {
                font_size: 10.0,
                ..default()
            },
            TextColor(TICK_LABEL_COLOR),
            Transform::from_translation(label_pos.extend(2.0)),
            layers.clone(),
        ));
    });
}

/// Tick marks and value labels along the data axes, which stay pinned to
/// the tile edge once the origin scrolls out of view.
pub fn draw_axis_ticks(
    commands: &mut Commands,
    root: Entity,
    rect: &TileRect,
    view: &TileView,
    unit: &UnitMeshes,
    materials: &mut Assets<ColorMaterial>,
    layers: RenderLayers,
) {
    let tick_mat = materials.add(ColorMaterial::from(Color::srgba(0.5, 0.5, 0.55, 0.6)));
    let tick_length = 6.0;
    let tick_width = 1.0;

    let half_size = rect.world_size * 0.5;
    let data_min = world_to_data(rect.world_center - half_size, rect, view);
    let data_max = world_to_data(rect.world_center + half_size, rect, view);

    let x_step = nice_step(data_max.x - data_min.x, 8);
    let y_step = nice_step(data_max.y - data_min.y, 6);

    let origin_world = data_to_world(Vec2::ZERO, rect, view);
    // max/min rather than clamp: a collapsed tile must not panic
    let axis_y = origin_world
        .y
        .max(rect.world_center.y - half_size.y + 20.0)
        .min(rect.world_center.y + half_size.y - 20.0);
    let axis_x = origin_world
        .x
        .max(rect.world_center.x - half_size.x + 30.0)
        .min(rect.world_center.x + half_size.x - 30.0);

    let start_x = (data_min.x / x_step).floor() as i32;
    let end_x = (data_max.x / x_step).ceil() as i32;
    for i in start_x..=end_x {
        let x_data = i as f32 * x_step;
        let x_world = data_to_world(Vec2::new(x_data, 0.0), rect, view).x;
        if (x_world - rect.world_center.x).abs() > half_size.x - 10.0 {
            continue;
        }
        spawn_tick(
            commands,
            root,
            unit,
            &tick_mat,
            &layers,
            Vec2::new(x_world, axis_y),
            Vec2::new(tick_width, tick_length),
            format_tick(x_data),
            Vec2::new(x_world, axis_y - 14.0),
        );
    }

    let start_y = (data_min.y / y_step).floor() as i32;
    let end_y = (data_max.y / y_step).ceil() as i32;
    for i in start_y..=end_y {
        let y_data = i as f32 * y_step;
        let y_world = data_to_world(Vec2::new(0.0, y_data), rect, view).y;
        if (y_world - rect.world_center.y).abs() > half_size.y - 10.0 {
            continue;
        }
        spawn_tick(
            commands,
            root,
            unit,
            &tick_mat,
            &layers,
            Vec2::new(axis_x, y_world),
            Vec2::new(tick_length, tick_width),
            format_tick(y_data),
            Vec2::new(axis_x - 20.0, y_world),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_and_data_round_trip_with_anisotropic_scale() {
        let rect = TileRect::new(Vec2::new(100.0, -50.0), Vec2::new(400.0, 300.0));
        let view = TileView {
            offset: Vec2::new(10.0, -20.0),
            scale: Vec2::new(40.0, 600.0),
            ..default()
        };
        let data = Vec2::new(1.5, 0.25);
        let world = data_to_world(data, &rect, &view);
        assert_eq!(world, Vec2::new(170.0, 80.0));
        assert!((world_to_data(world, &rect, &view) - data).length() < 1e-5);
    }

    #[test]
    fn steps_are_round() {
        assert_eq!(nice_step(8.0, 8), 1.0);
        assert!((nice_step(0.4, 6) - 0.05).abs() < 1e-6);
        assert_eq!(nice_step(0.0, 6), 1.0);
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(-1.5), "-1.5");
        assert_eq!(format_tick(12000.0), "1.2e4");
    }
}
