//! Keyboard control of an [`Explorer`] and keeping the dashboard in step
//! with it.

use super::chrome::handle_tab_clicks;
use super::resources::{DashboardRes, PanelFooter};
use super::systems::sync_plots_to_tiles;
use crate::explorer::{Explorer, View};
use crate::stats::DistributionKind;
use bevy::prelude::*;
use tracing::info;

pub const KEY_HINTS: [&str; 6] = [
    "Tab: next view    click a tab to jump",
    "1-5: normal, uniform, exponential, binomial, poisson",
    "Left/Right: first parameter    Down/Up: second parameter",
    "M: next sampling method    R: new random seed",
    "Wheel: zoom    drag: pan",
    "Hover a chart to read values",
];

#[derive(Resource, Clone, Debug, PartialEq)]
pub struct ExplorerRes(pub Explorer);

/// Drives the dashboard from an explorer state.
pub struct ExplorerPlugin {
    pub explorer: Explorer,
}

impl Plugin for ExplorerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(DashboardRes::new(self.explorer.dashboard()))
            .insert_resource(ExplorerRes(self.explorer.clone()))
            .insert_resource(PanelFooter(KEY_HINTS.iter().map(|s| s.to_string()).collect()))
            .add_systems(
                Update,
                (follow_tab_clicks, handle_keys, rebuild_dashboard)
                    .chain()
                    .after(handle_tab_clicks)
                    .before(sync_plots_to_tiles),
            );
    }
}

/// New state after pressing `key`, or `None` for keys without a binding.
pub fn apply_key(explorer: &Explorer, key: KeyCode) -> Option<Explorer> {
    let digit = match key {
        KeyCode::Digit1 => Some(0),
        KeyCode::Digit2 => Some(1),
        KeyCode::Digit3 => Some(2),
        KeyCode::Digit4 => Some(3),
        KeyCode::Digit5 => Some(4),
        _ => None,
    };
    if let Some(i) = digit {
        let kind = DistributionKind::ALL[i];
        return Some(explorer.select(kind).with_view(View::Distributions));
    }

    let next = match key {
        KeyCode::Tab => explorer.next_view(),
        KeyCode::ArrowLeft => explorer.adjust(0, -1).with_view(View::Distributions),
        KeyCode::ArrowRight => explorer.adjust(0, 1).with_view(View::Distributions),
        KeyCode::ArrowDown => explorer.adjust(1, -1).with_view(View::Distributions),
        KeyCode::ArrowUp => explorer.adjust(1, 1).with_view(View::Distributions),
        KeyCode::KeyM => explorer.cycle_method().with_view(View::Sampling),
        KeyCode::KeyR => explorer.reseed(),
        _ => return None,
    };
    Some(next)
}

fn handle_keys(keys: Res<ButtonInput<KeyCode>>, mut explorer: ResMut<ExplorerRes>) {
    let mut state = explorer.0.clone();
    for &key in keys.get_just_pressed() {
        if let Some(next) = apply_key(&state, key) {
            state = next;
        }
    }
    explorer.set_if_neq(ExplorerRes(state));
}

fn follow_tab_clicks(dash: Res<DashboardRes>, mut explorer: ResMut<ExplorerRes>) {
    if !dash.is_changed() {
        return;
    }
    let Some(&view) = View::ALL.get(dash.0.active_tab) else {
        return;
    };
    if explorer.0.view != view {
        explorer.0.view = view;
    }
}

/// Rebuild charts when anything but the view changed; a view change alone
/// only flips the active tab.
fn rebuild_dashboard(
    explorer: Res<ExplorerRes>,
    mut dash: ResMut<DashboardRes>,
    mut built: Local<Option<Explorer>>,
) {
    if !explorer.is_changed() {
        return;
    }
    let state = &explorer.0;
    let same_data = built
        .as_ref()
        .is_some_and(|b| b.with_view(state.view) == *state);

    if same_data {
        if dash.0.active_tab != state.view.index() {
            dash.0.active_tab = state.view.index();
        }
    } else {
        info!(
            view = %state.view,
            distribution = %state.spec().kind(),
            method = %state.method,
            seed = state.seed,
            "explorer state changed"
        );
        dash.0 = state.dashboard();
    }
    *built = Some(state.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{DistributionSpec, SamplingMethod};

    #[test]
    fn digits_pick_distributions() {
        let explorer = Explorer::default().with_view(View::Sampling);
        let next = apply_key(&explorer, KeyCode::Digit4).unwrap();
        assert_eq!(next.selected, DistributionKind::Binomial);
        assert_eq!(next.view, View::Distributions);
    }

    #[test]
    fn arrows_move_parameters() {
        let explorer = Explorer::default();
        let next = apply_key(&explorer, KeyCode::ArrowRight).unwrap();
        assert_eq!(next.spec(), DistributionSpec::Normal { mean: 0.5, std: 1.0 });
        let next = apply_key(&next, KeyCode::ArrowDown).unwrap();
        assert_eq!(next.spec(), DistributionSpec::Normal { mean: 0.5, std: 0.9 });
    }

    #[test]
    fn method_key_shows_the_sampling_view() {
        let next = apply_key(&Explorer::default(), KeyCode::KeyM).unwrap();
        assert_eq!(next.method, SamplingMethod::MetropolisHastings);
        assert_eq!(next.view, View::Sampling);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        assert!(apply_key(&Explorer::default(), KeyCode::KeyQ).is_none());
    }

    #[test]
    fn view_change_only_switches_tabs() {
        let mut app = App::new();
        let explorer = Explorer::default();
        app.insert_resource(DashboardRes::new(explorer.dashboard()))
            .insert_resource(ExplorerRes(explorer.clone()))
            .add_systems(Update, rebuild_dashboard);
        app.update();

        let before = app.world().resource::<DashboardRes>().0.tabs[0].plots.len();
        app.world_mut().resource_mut::<ExplorerRes>().0.view = View::Multivariate;
        app.update();

        let dash = &app.world().resource::<DashboardRes>().0;
        assert_eq!(dash.active_tab, 2);
        assert_eq!(dash.tabs[0].plots.len(), before);

        app.world_mut().resource_mut::<ExplorerRes>().0 = explorer.select(DistributionKind::Poisson);
        app.update();
        let dash = &app.world().resource::<DashboardRes>().0;
        assert_eq!(dash.active_tab, 0);
        assert_eq!(dash.tabs[0].notes[0], "Poisson Distribution");
    }
}
