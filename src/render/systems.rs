use super::chrome::{has_panel, plot_area};
use super::*;
use crate::core::{Geometry2D, Graph2D, Plot};
use crate::render::PlotId;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_camera::{OrthographicProjection, Projection, ScalingMode, Viewport};
use std::collections::HashSet;

const MARGIN: f32 = 16.0;
const GAP: f32 = 10.0;

/// Pixels kept free around the data when fitting: left, right, bottom, top.
const FIT_INSETS: [f32; 4] = [55.0, 20.0, 40.0, 28.0];

/// Keep one tile per active plot. A changed dashboard rebuilds every tile,
/// since a new explorer state can swap plot kinds under the same index.
pub fn sync_plots_to_tiles(
    mut commands: Commands,
    dash: Res<DashboardRes>,
    mut registry: ResMut<TileRegistry>,
    existing: Query<(Entity, &PlotTile)>,
) {
    if dash.is_changed() && !dash.is_added() {
        for (entity, tile) in existing.iter() {
            cleanup_tile(&mut commands, &mut registry, entity, tile.id);
        }
    }

    let plots = dash.0.active_plots();
    let plot_ids: Vec<PlotId> = (0..plots.len()).map(|i| PlotId(i as u64)).collect();

    for (entity, tile) in existing.iter() {
        if !plot_ids.contains(&tile.id) && registry.by_plot.contains_key(&tile.id) {
            cleanup_tile(&mut commands, &mut registry, entity, tile.id);
        }
    }

    for (i, plot) in plots.iter().enumerate() {
        let id = plot_ids[i];
        if !registry.by_plot.contains_key(&id) {
            let tile = spawn_tile(&mut commands, id, i, plot);
            registry.by_plot.insert(id, tile);
            registry.dirty.push_back(id);
        }
    }
}

fn spawn_tile(commands: &mut Commands, id: PlotId, index: usize, plot: &Plot) -> Entity {
    let kind = PlotKind::of(plot);

    let tile = commands
        .spawn((
            PlotTile { id, index, kind },
            kind,
            TileView::default(),
            TileRect::new(Vec2::ZERO, Vec2::new(100.0, 100.0)),
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    let root = commands
        .spawn((TileRenderRoot, Transform::default(), Visibility::default()))
        .id();
    commands.entity(tile).add_child(root);

    tile
}

/// Lay tiles out in a grid inside the plot area. Resizing a tile refits it.
pub fn update_tile_layout(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut registry: ResMut<TileRegistry>,
    mut tiles: Query<(Entity, &PlotTile, &mut TileRect)>,
    dash: Res<DashboardRes>,
    footer: Res<PanelFooter>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let n = dash.0.active_plots().len();
    if n == 0 {
        return;
    }

    let area = plot_area(window.size(), dash.0.has_tabs(), has_panel(&dash, &footer));
    let avail = (area.size() - 2.0 * MARGIN).max(Vec2::splat(1.0));
    let (cols, rows) = match dash.0.active_columns() {
        Some(cols) => {
            let cols = cols.clamp(1, n);
            (cols, n.div_ceil(cols))
        }
        None => grid_dims(n, avail.x / avail.y),
    };

    let tile_w = ((avail.x - (cols - 1) as f32 * GAP) / cols as f32).max(1.0);
    let tile_h = ((avail.y - (rows - 1) as f32 * GAP) / rows as f32).max(1.0);
    let scale = window.resolution.scale_factor();

    for (entity, tile, mut rect) in tiles.iter_mut() {
        let col = tile.index % cols;
        let row = tile.index / cols;

        let world_center = Vec2::new(
            area.min.x + MARGIN + col as f32 * (tile_w + GAP) + tile_w * 0.5,
            area.max.y - MARGIN - row as f32 * (tile_h + GAP) - tile_h * 0.5,
        );
        let new_size = Vec2::new(tile_w, tile_h);

        // Viewport in physical pixels, measured from the window's top-left
        let top_left = Vec2::new(
            world_center.x - tile_w * 0.5 + window.width() * 0.5,
            window.height() * 0.5 - world_center.y - tile_h * 0.5,
        );
        let phys_pos = (top_left * scale).round().max(Vec2::ZERO).as_uvec2();
        let phys_size = (new_size * scale).round().max(Vec2::ONE).as_uvec2();

        let changed = rect.world_center != world_center
            || rect.world_size != new_size
            || rect.viewport.physical_position != phys_pos
            || rect.viewport.physical_size != phys_size;

        if changed {
            let size_changed = rect.world_size != new_size;
            *rect = TileRect::new(world_center, new_size);
            rect.viewport = Viewport {
                physical_position: phys_pos,
                physical_size: phys_size,
                depth: 0.0..1.0,
            };
            if size_changed {
                commands.entity(entity).remove::<AutoFitted>();
            }
            registry.dirty.push_back(tile.id);
        }
    }
}

/// One orthographic camera per tile, clipped to the tile's viewport and
/// looking only at the tile's render layer.
pub fn sync_tile_cameras(
    mut commands: Commands,
    mut registry: ResMut<TileRegistry>,
    tiles: Query<(&PlotTile, &TileRect)>,
    existing: Query<Entity, With<TileCamera>>,
) {
    let mut used = HashSet::new();

    for (tile, rect) in tiles.iter() {
        let cam_entity = match registry.camera_of.get(&tile.id) {
            Some(&cam) => cam,
            None => {
                let cam = commands.spawn((TileCamera, Transform::default())).id();
                registry.camera_of.insert(tile.id, cam);
                cam
            }
        };
        used.insert(cam_entity);

        let mut ortho = OrthographicProjection::default_2d();
        ortho.scaling_mode = ScalingMode::FixedVertical {
            viewport_height: rect.world_size.y,
        };

        commands.entity(cam_entity).insert((
            Camera2d,
            Camera {
                viewport: Some(rect.viewport.clone()),
                order: 10 + tile.index as isize,
                ..default()
            },
            Projection::from(ortho),
            Transform::from_translation(rect.world_center.extend(1000.0)),
            tile_layer(tile.index),
        ));
    }

    for cam_entity in existing.iter() {
        if !used.contains(&cam_entity) {
            commands.entity(cam_entity).despawn();
        }
    }
}

pub fn update_hovered_tile(
    windows: Query<&Window, With<PrimaryWindow>>,
    tiles: Query<(&PlotTile, &TileRect)>,
    mut hovered: ResMut<HoveredTile>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        hovered.0 = None;
        return;
    };
    let world = cursor_to_world(cursor, window);

    hovered.0 = tiles
        .iter()
        .find(|(_, rect)| rect.contains(world))
        .map(|(tile, _)| tile.index);
}

/// Wheel zooms about the cursor, left-drag pans. Graphs can switch either
/// off through their `Interaction` flags; heatmaps are static.
pub fn handle_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut tiles: Query<(&PlotTile, &TileRect, &mut TileView)>,
    mut registry: ResMut<TileRegistry>,
    hovered: Res<HoveredTile>,
    dash: Res<DashboardRes>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut wheel: MessageReader<MouseWheel>,
    mut motion: MessageReader<MouseMotion>,
) {
    // Drain both readers every frame so stale input never piles up
    let zoom_delta: f32 = wheel.read().map(|e| e.y).sum();
    let drag: Vec2 = motion.read().map(|e| e.delta).sum();

    let Some(hovered_index) = hovered.0 else { return };
    let Some(Plot::Graph2D(graph)) = dash.0.active_plots().get(hovered_index) else {
        return;
    };
    let pan_delta = if mouse.pressed(MouseButton::Left) && graph.interaction.pan {
        drag
    } else {
        Vec2::ZERO
    };
    let zoom_delta = if graph.interaction.zoom { zoom_delta } else { 0.0 };

    let cursor = windows
        .single()
        .ok()
        .and_then(|w| w.cursor_position().map(|c| cursor_to_world(c, w)));

    for (tile, rect, mut view) in tiles.iter_mut() {
        if tile.index != hovered_index || tile.kind != PlotKind::Graph {
            continue;
        }

        let mut changed = false;

        if zoom_delta != 0.0 {
            let anchor = cursor.unwrap_or(rect.world_center) - rect.world_center;
            let data = (anchor - view.offset) / view.scale;
            view.zoom(1.0 + zoom_delta * 0.05);
            view.offset = anchor - data * view.scale;
            changed = true;
        }

        if pan_delta != Vec2::ZERO {
            view.offset.x += pan_delta.x;
            view.offset.y -= pan_delta.y;
            changed = true;
        }

        if changed {
            registry.dirty.push_back(tile.id);
        }
    }
}

/// Fit a tile's view to its data: per-axis scale, room for ticks and title.
pub fn fit_view(graph: &Graph2D, size: Vec2) -> Option<TileView> {
    let (min, max) = graph.bounds()?;
    let (min, max) = (Vec2::from(min), Vec2::from(max));

    let [left, right, bottom, top] = FIT_INSETS;
    let top = top + title_height(&graph.meta);
    let available = (size - Vec2::new(left + right, bottom + top)).max(Vec2::splat(10.0));
    let span = (max - min).max(Vec2::splat(1e-3));
    let scale = available / span;

    let content_shift = Vec2::new((left - right) * 0.5, (bottom - top) * 0.5);
    let center = (min + max) * 0.5;

    Some(TileView {
        offset: content_shift - center * scale,
        scale,
        min_scale: scale * 0.25,
        max_scale: scale * 20.0,
    })
}

pub fn auto_fit_tiles(
    mut commands: Commands,
    mut registry: ResMut<TileRegistry>,
    mut tiles: Query<(Entity, &PlotTile, &TileRect, &mut TileView), Without<AutoFitted>>,
    dash: Res<DashboardRes>,
) {
    for (entity, tile, rect, mut view) in tiles.iter_mut() {
        let Some(plot) = dash.0.active_plots().get(tile.index) else {
            continue;
        };

        let fitted = match plot {
            Plot::Graph2D(graph) => fit_view(graph, rect.world_size),
            Plot::Heatmap(_) => None,
        };
        if let Some(fitted) = fitted {
            *view = fitted;
            registry.dirty.push_back(tile.id);
        }
        commands.entity(entity).insert(AutoFitted);
    }
}

pub fn draw_dirty_tiles(
    mut commands: Commands,
    mut registry: ResMut<TileRegistry>,
    tiles: Query<(&PlotTile, &TileRect, &TileView)>,
    children_q: Query<&Children>,
    is_root_q: Query<(), With<TileRenderRoot>>,
    dash: Res<DashboardRes>,
    unit: Res<UnitMeshes>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let mut drawn = HashSet::new();

    while let Some(id) = registry.dirty.pop_front() {
        // several triggers in one frame collapse into one redraw
        if !drawn.insert(id) {
            continue;
        }
        let Some(&tile_entity) = registry.by_plot.get(&id) else {
            continue;
        };
        let Ok((tile, rect, view)) = tiles.get(tile_entity) else {
            continue;
        };

        if let Ok(children) = children_q.get(tile_entity) {
            for child in children.iter() {
                if is_root_q.get(child).is_ok() {
                    commands.entity(child).try_despawn();
                }
            }
        }

        let root = commands
            .spawn((TileRenderRoot, Transform::default(), Visibility::default()))
            .id();
        commands.entity(tile_entity).add_child(root);

        let Some(plot) = dash.0.active_plots().get(tile.index) else {
            continue;
        };
        let layer = tile_layer(tile.index);
        match plot {
            Plot::Graph2D(graph) => {
                draw_2d_plot(
                    &mut commands,
                    root,
                    graph,
                    rect,
                    view,
                    &unit,
                    &mut meshes,
                    &mut materials,
                    layer.clone(),
                );
                draw_axis_ticks(&mut commands, root, rect, view, &unit, &mut materials, layer);
            }
            Plot::Heatmap(heatmap) => {
                draw_heatmap(&mut commands, root, heatmap, rect, &unit, &mut materials, layer);
            }
        }
    }
}

fn grid_dims(n: usize, aspect: f32) -> (usize, usize) {
    match n {
        0 => (0, 0),
        1 => (1, 1),
        2 => {
            if aspect > 1.35 {
                (2, 1)
            } else {
                (1, 2)
            }
        }
        3 => {
            if aspect > 1.35 {
                (3, 1)
            } else {
                (2, 2)
            }
        }
        _ => {
            let cols = (n as f32).sqrt().ceil() as usize;
            (cols, n.div_ceil(cols))
        }
    }
}

fn cleanup_tile(commands: &mut Commands, registry: &mut TileRegistry, entity: Entity, id: PlotId) {
    commands.entity(entity).try_despawn();
    registry.by_plot.remove(&id);
    registry.camera_of.remove(&id);
}

fn cursor_to_world(cursor: Vec2, window: &Window) -> Vec2 {
    Vec2::new(cursor.x - window.width() * 0.5, window.height() * 0.5 - cursor.y)
}

/// Closest drawn point to `cursor`, measured on screen so that the
/// per-axis scale does not skew the choice. Area fills are skipped.
fn find_nearest_point(cursor: Vec2, graph: &Graph2D, rect: &TileRect, view: &TileView) -> Option<Vec2> {
    graph
        .layers
        .iter()
        .filter(|l| l.geometry != Geometry2D::Area)
        .flat_map(|l| l.xy.iter().copied())
        .map(|pt| (pt, data_to_world(pt, rect, view).distance_squared(cursor)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pt, _)| pt)
}

/// Crosshair snapped to the nearest data point on graphs, and a value
/// readout on heatmap cells.
pub fn update_crosshair(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    tiles: Query<(&PlotTile, &TileRect, &TileView)>,
    hovered: Res<HoveredTile>,
    dash: Res<DashboardRes>,
    mut cursor_pos: ResMut<CursorWorldPos>,
    crosshairs: Query<Entity, With<Crosshair>>,
    unit: Res<UnitMeshes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    for entity in crosshairs.iter() {
        commands.entity(entity).try_despawn();
    }

    let Some(cursor_screen) = window.cursor_position() else {
        *cursor_pos = CursorWorldPos::default();
        return;
    };
    let cursor_world = cursor_to_world(cursor_screen, window);

    cursor_pos.position = Some(cursor_world);
    cursor_pos.tile_index = hovered.0;
    cursor_pos.data_coords = None;

    let Some(hovered_index) = hovered.0 else {
        return;
    };
    let Some((tile, rect, view)) = tiles.iter().find(|(t, _, _)| t.index == hovered_index) else {
        return;
    };
    let layers = tile_layer(tile.index);

    match dash.0.active_plots().get(tile.index) {
        Some(Plot::Graph2D(graph)) => {
            let Some(snap_data) = find_nearest_point(cursor_world, graph, rect, view) else {
                return;
            };
            let snap_world = data_to_world(snap_data, rect, view);
            cursor_pos.data_coords = Some(snap_data);

            spawn_dashed_crosshair(
                &mut commands,
                tile.index,
                rect,
                snap_world,
                format!("({:.2}, {:.3})", snap_data.x, snap_data.y),
                &unit,
                &mut materials,
                layers,
            );
        }
        Some(Plot::Heatmap(heatmap)) => {
            let layout = HeatmapLayout::new(heatmap, rect, title_height(&heatmap.meta));
            let Some((row, col)) = layout.cell_at(cursor_world) else {
                return;
            };
            let cols = heatmap.dims.x as usize;
            let Some(value) = heatmap.values.get(row * cols + col) else {
                return;
            };
            let label = match heatmap.extent {
                Some(extent) => {
                    let data = layout.world_to_extent(extent, cursor_world);
                    cursor_pos.data_coords = Some(data);
                    format!("({:.2}, {:.2}) = {:.4}", data.x, data.y, value)
                }
                None => format!("[{row}, {col}] = {value:.4}"),
            };
            spawn_dashed_crosshair(
                &mut commands,
                tile.index,
                rect,
                layout.cell_center(row, col),
                label,
                &unit,
                &mut materials,
                layers,
            );
        }
        None => {}
    }
}

fn spawn_dashed_crosshair(
    commands: &mut Commands,
    tile_index: usize,
    rect: &TileRect,
    snap_world: Vec2,
    label: String,
    unit: &UnitMeshes,
    materials: &mut Assets<ColorMaterial>,
    layers: bevy_camera::visibility::RenderLayers,
) {
    let crosshair_mat = materials.add(ColorMaterial::from(Color::srgba(1.0, 1.0, 1.0, 0.5)));
    let point_mat = materials.add(ColorMaterial::from(Color::srgba(1.0, 1.0, 1.0, 0.95)));
    let line_thickness = 1.0;
    let dash_length = 4.0;
    let gap_length = 3.0;

    let half = rect.world_size * 0.5;
    let lo = rect.world_center - half;
    let hi = rect.world_center + half;

    commands
        .spawn((
            Crosshair { tile_index },
            Transform::default(),
            Visibility::Visible,
        ))
        .with_children(|parent| {
            let mut y = lo.y;
            while y < hi.y {
                let dash_end = (y + dash_length).min(hi.y);
                parent.spawn((
                    Mesh2d(unit.quad.clone()),
                    MeshMaterial2d(crosshair_mat.clone()),
                    Transform {
                        translation: Vec3::new(snap_world.x, (y + dash_end) * 0.5, 5.0),
                        scale: Vec3::new(line_thickness, dash_end - y, 1.0),
                        ..default()
                    },
                    CrosshairVLine,
                    layers.clone(),
                ));
                y += dash_length + gap_length;
            }

            let mut x = lo.x;
            while x < hi.x {
                let dash_end = (x + dash_length).min(hi.x);
                parent.spawn((
                    Mesh2d(unit.quad.clone()),
                    MeshMaterial2d(crosshair_mat.clone()),
                    Transform {
                        translation: Vec3::new((x + dash_end) * 0.5, snap_world.y, 5.0),
                        scale: Vec3::new(dash_end - x, line_thickness, 1.0),
                        ..default()
                    },
                    CrosshairHLine,
                    layers.clone(),
                ));
                x += dash_length + gap_length;
            }

            parent.spawn((
                Mesh2d(unit.disc.clone()),
                MeshMaterial2d(point_mat),
                Transform {
                    translation: snap_world.extend(5.5),
                    scale: Vec3::splat(6.0),
                    ..default()
                },
                layers.clone(),
            ));

            // Flip the label inward near the right edge
            let dx = if snap_world.x > hi.x - 120.0 { -60.0 } else { 60.0 };
            parent.spawn((
                Text2d::new(label),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.9)),
                Transform::from_translation(Vec3::new(snap_world.x + dx, snap_world.y + 12.0, 6.0)),
                CrosshairCoordText,
                layers,
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Layer2D;

    #[test]
    fn grid_prefers_wide_rows_on_wide_windows() {
        assert_eq!(grid_dims(2, 1.8), (2, 1));
        assert_eq!(grid_dims(2, 1.0), (1, 2));
        assert_eq!(grid_dims(5, 1.0), (3, 2));
    }

    #[test]
    fn fitted_view_maps_bounds_inside_the_tile() {
        let graph = Graph2D::new().with_layer(Layer2D::new(
            Geometry2D::Line,
            vec![Vec2::new(-4.0, 0.0), Vec2::new(0.0, 0.4), Vec2::new(4.0, 0.0)],
        ));
        let size = Vec2::new(600.0, 400.0);
        let view = fit_view(&graph, size).unwrap();
        let rect = TileRect::new(Vec2::ZERO, size);

        // y range is 0.4 against 8 on x, yet the curve still spans most of the height
        assert!(0.4 * view.scale.y > 300.0);
        for corner in [Vec2::new(-4.0, 0.0), Vec2::new(4.0, 0.4)] {
            assert!(rect.contains(data_to_world(corner, &rect, &view)));
        }
        let left = data_to_world(Vec2::new(-4.0, 0.0), &rect, &view);
        assert!((left.x - (-300.0 + FIT_INSETS[0])).abs() < 1e-3);
    }

    #[test]
    fn empty_graphs_are_not_fitted() {
        assert!(fit_view(&Graph2D::new(), Vec2::splat(300.0)).is_none());
    }

    #[test]
    fn nearest_point_uses_screen_distance() {
        let graph = Graph2D::new().with_layer(Layer2D::new(
            Geometry2D::Points,
            vec![Vec2::new(0.0, 1.0), Vec2::new(0.5, 0.0)],
        ));
        let rect = TileRect::new(Vec2::ZERO, Vec2::splat(400.0));
        let view = TileView {
            scale: Vec2::new(100.0, 10.0),
            ..default()
        };
        // (0.5, 0) is closer in data units, but (0, 1) is 8px away on
        // screen against 50px
        let cursor = data_to_world(Vec2::new(0.0, 0.2), &rect, &view);
        assert_eq!(find_nearest_point(cursor, &graph, &rect, &view), Some(Vec2::new(0.0, 1.0)));
    }
}
