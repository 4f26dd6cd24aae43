//! 2D charts: lines, points, filled areas, bars and stems.

#![allow(clippy::too_many_arguments)]

use super::common::{BORDER_COLOR, data_to_world, draw_plot_title, draw_tile_border, style_color};
use crate::core::{Geometry2D, Graph2D, Layer2D};
use crate::render::{TileRect, TileView, UnitMeshes};
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_camera::visibility::RenderLayers;
use bevy_mesh::{Indices, PrimitiveTopology};

/// Everything a layer painter needs besides the layer itself.
struct Painter<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    root: Entity,
    rect: &'a TileRect,
    view: &'a TileView,
    unit: &'a UnitMeshes,
    layers: &'a RenderLayers,
}

impl Painter<'_, '_, '_> {
    fn world(&self, data: Vec2) -> Vec2 {
        data_to_world(data, self.rect, self.view)
    }

    fn visible(&self, min: Vec2, max: Vec2) -> bool {
        let half = self.rect.world_size * 0.5;
        let lo = self.rect.world_center - half;
        let hi = self.rect.world_center + half;
        max.x >= lo.x && min.x <= hi.x && max.y >= lo.y && min.y <= hi.y
    }

    fn quad(&mut self, mat: &Handle<ColorMaterial>, transform: Transform) {
        let (mesh, layers) = (self.unit.quad.clone(), self.layers.clone());
        self.commands.entity(self.root).with_children(|parent| {
            parent.spawn((Mesh2d(mesh), MeshMaterial2d(mat.clone()), transform, layers));
        });
    }

    fn disc(&mut self, mat: &Handle<ColorMaterial>, center: Vec2, diameter: f32, z: f32) {
        let (mesh, layers) = (self.unit.disc.clone(), self.layers.clone());
        self.commands.entity(self.root).with_children(|parent| {
            parent.spawn((
                Mesh2d(mesh),
                MeshMaterial2d(mat.clone()),
                Transform {
                    translation: center.extend(z),
                    scale: Vec3::splat(diameter),
                    ..default()
                },
                layers,
            ));
        });
    }
}

pub fn draw_2d_plot(
    commands: &mut Commands,
    root: Entity,
    graph: &Graph2D,
    rect: &TileRect,
    view: &TileView,
    unit: &UnitMeshes,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<ColorMaterial>,
    layers: RenderLayers,
) {
    draw_tile_border(commands, root, rect, unit, materials, layers.clone(), BORDER_COLOR, 1.0);
    draw_plot_title(commands, root, &graph.meta, rect, layers.clone());

    // Axes through the data origin, moving with pan/zoom
    let axis_mat = materials.add(ColorMaterial::from(Color::srgb(0.5, 0.5, 0.5)));
    let axis_origin = data_to_world(Vec2::ZERO, rect, view);

    commands.entity(root).with_children(|parent| {
        if (axis_origin.y - rect.world_center.y).abs() <= rect.world_size.y * 0.5 {
            parent.spawn((
                Mesh2d(unit.quad.clone()),
                MeshMaterial2d(axis_mat.clone()),
                Transform {
                    translation: Vec3::new(rect.world_center.x, axis_origin.y, 0.5),
                    scale: Vec3::new(rect.world_size.x, 1.0, 1.0),
                    ..default()
                },
                layers.clone(),
            ));
        }
        if (axis_origin.x - rect.world_center.x).abs() <= rect.world_size.x * 0.5 {
            parent.spawn((
                Mesh2d(unit.quad.clone()),
                MeshMaterial2d(axis_mat),
                Transform {
                    translation: Vec3::new(axis_origin.x, rect.world_center.y, 0.5),
                    scale: Vec3::new(1.0, rect.world_size.y, 1.0),
                    ..default()
                },
                layers.clone(),
            ));
        }
    });

    draw_axis_labels(commands, root, graph, rect, &layers);

    let mut painter = Painter {
        commands,
        root,
        rect,
        view,
        unit,
        layers: &layers,
    };

    for layer in &graph.layers {
        let mat = materials.add(ColorMaterial::from(style_color(&layer.style)));
        match layer.geometry {
            Geometry2D::Line => draw_line_layer(&mut painter, layer, &mat),
            Geometry2D::Points => draw_points_layer(&mut painter, layer, &mat),
            Geometry2D::Area => draw_area_layer(&mut painter, layer, meshes, mat),
            Geometry2D::Bars => draw_bars_layer(&mut painter, layer, &mat),
            Geometry2D::Stems => draw_stems_layer(&mut painter, layer, &mat),
        }
    }
}

fn draw_axis_labels(
    commands: &mut Commands,
    root: Entity,
    graph: &Graph2D,
    rect: &TileRect,
    layers: &RenderLayers,
) {
    let font = TextFont {
        font_size: 13.0,
        ..default()
    };
    let color = TextColor(Color::srgb(0.8, 0.8, 0.8));

    commands.entity(root).with_children(|parent| {
        if let Some(x_label) = &graph.x_label {
            parent.spawn((
                Text2d::new(x_label.clone()),
                font.clone(),
                color,
                Transform::from_translation(Vec3::new(
                    rect.world_center.x,
                    rect.world_center.y - rect.world_size.y * 0.5 + 12.0,
                    2.0,
                )),
                layers.clone(),
            ));
        }
        if let Some(y_label) = &graph.y_label {
            parent.spawn((
                Text2d::new(y_label.clone()),
                font.clone(),
                color,
                Transform {
                    translation: Vec3::new(
                        rect.world_center.x - rect.world_size.x * 0.5 + 12.0,
                        rect.world_center.y,
                        2.0,
                    ),
                    rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                    ..default()
                },
                layers.clone(),
            ));
        }
    });
}

/// Segments are rotated quads; `style.size` is the stroke width in pixels.
fn draw_line_layer(p: &mut Painter, layer: &Layer2D, mat: &Handle<ColorMaterial>) {
    for pair in layer.xy.windows(2) {
        let a = p.world(pair[0]);
        let b = p.world(pair[1]);
        if !p.visible(a.min(b), a.max(b)) {
            continue;
        }

        let angle = (b.y - a.y).atan2(b.x - a.x);
        p.quad(
            mat,
            Transform {
                translation: ((a + b) * 0.5).extend(0.2),
                rotation: Quat::from_rotation_z(angle),
                scale: Vec3::new(a.distance(b), layer.style.size, 1.0),
            },
        );
    }
}

/// Discs sized in pixels, per point when `sizes` is set.
fn draw_points_layer(p: &mut Painter, layer: &Layer2D, mat: &Handle<ColorMaterial>) {
    for (i, &pt) in layer.xy.iter().enumerate() {
        let size = layer
            .sizes
            .as_ref()
            .and_then(|sizes| sizes.get(i).copied())
            .unwrap_or(layer.style.size);
        let center = p.world(pt);
        let radius = Vec2::splat(size * 0.5);
        if !p.visible(center - radius, center + radius) {
            continue;
        }
        p.disc(mat, center, size, 0.3);
    }
}

/// One quad per point, centred on x and spanning the baseline to y.
/// Bar width is in data units.
fn draw_bars_layer(p: &mut Painter, layer: &Layer2D, mat: &Handle<ColorMaterial>) {
    let half_width = layer.style.size * 0.5;
    for &pt in &layer.xy {
        let lo = p.world(Vec2::new(pt.x - half_width, pt.y.min(0.0)));
        let hi = p.world(Vec2::new(pt.x + half_width, pt.y.max(0.0)));
        if !p.visible(lo, hi) {
            continue;
        }
        p.quad(
            mat,
            Transform {
                translation: ((lo + hi) * 0.5).extend(0.1),
                scale: (hi - lo).abs().max(Vec2::splat(1.0)).extend(1.0),
                ..default()
            },
        );
    }
}

/// Vertical rule from the baseline with a dot on top.
fn draw_stems_layer(p: &mut Painter, layer: &Layer2D, mat: &Handle<ColorMaterial>) {
    for &pt in &layer.xy {
        let base = p.world(Vec2::new(pt.x, 0.0));
        let top = p.world(pt);
        if !p.visible(base.min(top), base.max(top)) {
            continue;
        }
        p.quad(
            mat,
            Transform {
                translation: ((base + top) * 0.5).extend(0.1),
                scale: Vec3::new(1.5, (top.y - base.y).abs().max(1.0), 1.0),
                ..default()
            },
        );
        p.disc(mat, top, layer.style.size * 3.0, 0.3);
    }
}

/// Triangle strip between the curve and y = 0.
fn draw_area_layer(
    p: &mut Painter,
    layer: &Layer2D,
    meshes: &mut Assets<Mesh>,
    mat: Handle<ColorMaterial>,
) {
    let Some(mesh) = area_mesh(&layer.xy, |d| p.world(d)) else {
        return;
    };
    let (mesh, layers) = (meshes.add(mesh), p.layers.clone());
    p.commands.entity(p.root).with_children(|parent| {
        parent.spawn((Mesh2d(mesh), MeshMaterial2d(mat), Transform::default(), layers));
    });
}

pub(crate) fn area_mesh(curve: &[Vec2], to_world: impl Fn(Vec2) -> Vec2) -> Option<Mesh> {
    let n = curve.len();
    if n < 2 {
        return None;
    }

    // Curve vertices first, then their feet on the baseline
    let positions: Vec<[f32; 3]> = curve
        .iter()
        .map(|&pt| to_world(pt))
        .chain(curve.iter().map(|&pt| to_world(Vec2::new(pt.x, 0.0))))
        .map(|w| [w.x, w.y, 0.0])
        .collect();

    let mut indices: Vec<u32> = Vec::with_capacity((n - 1) * 6);
    for i in 0..(n - 1) as u32 {
        let (u0, u1) = (i, i + 1);
        let (l0, l1) = (n as u32 + i, n as u32 + i + 1);
        indices.extend_from_slice(&[u0, l1, l0, u0, u1, l1]);
    }

    let vertex_count = positions.len();
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, vec![[0.0, 0.0, 1.0]; vertex_count]);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, vec![[0.0, 0.0]; vertex_count]);
    mesh.insert_indices(Indices::U32(indices));
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_mesh_drops_to_the_baseline() {
        let curve = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0), Vec2::new(2.0, 0.5)];
        let mesh = area_mesh(&curve, |d| d * 10.0).unwrap();

        assert_eq!(mesh.count_vertices(), 6);
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("expected u32 indices");
        };
        assert_eq!(indices.len(), 12);
        assert!(area_mesh(&curve[..1], |d| d).is_none());
    }
}
