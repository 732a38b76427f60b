use bevy::math::primitives::Circle;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};

use crate::simulation::scenario::Scenario;

#[derive(Component)]
struct MarkerIndex(pub usize);

/// Fill per category, in band order (green, orange, blue)
const PALETTE: [(f32, f32, f32); 3] = [(0.153, 0.682, 0.376), (0.902, 0.494, 0.133), (0.161, 0.502, 0.725)];

const MARKER_ALPHA: f32 = 0.8;

pub fn run_2d(scenario: Scenario) {
    tracing::info!(points = scenario.simulation.points().len(), "starting Bevy 2D viewer, press Space to toggle grouping");

    App::new()
        .insert_resource(scenario)
        .add_plugins(DefaultPlugins.build().disable::<bevy::log::LogPlugin>())
        .add_systems(Startup, setup_markers_system)
        .add_systems(Update, (toggle_grouping_system, relax_frame_system, sync_transforms_system).chain())
        .run();
}

/// Chart pixels (y down, origin top-left) to world units (y up, origin at the chart center)
fn to_world(scenario: &Scenario, x: f64, y: f64) -> Vec3 {
    let center = scenario.area.center();
    Vec3::new((x - center.x) as f32, (center.y - y) as f32, 0.0)
}

fn setup_markers_system(mut commands: Commands, scenario: Res<Scenario>, mut meshes: ResMut<Assets<Mesh>>, mut materials: ResMut<Assets<ColorMaterial>>) {
    commands.spawn(Camera2dBundle::default());

    for (i, p) in scenario.simulation.points().iter().enumerate() {
        let (r, g, b) = scenario
            .category_index(&p.category)
            .map(|k| PALETTE[k % PALETTE.len()])
            .unwrap_or((0.5, 0.5, 0.5));

        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(p.radius.max(1.0) as f32))),
                material: materials.add(ColorMaterial::from(Color::srgba(r, g, b, MARKER_ALPHA))),
                transform: Transform::from_translation(to_world(&scenario, p.x.x, p.x.y)),
                ..Default::default()
            },
            MarkerIndex(i),
        ));
    }
}

fn toggle_grouping_system(keys: Res<ButtonInput<KeyCode>>, mut scenario: ResMut<Scenario>) {
    if !keys.just_pressed(KeyCode::Space) {
        return;
    }
    match scenario.toggle() {
        Ok(handle) => tracing::info!(mode = ?scenario.mode, generation = handle.generation(), "grouping toggled"),
        Err(err) => tracing::error!(%err, "could not restart the layout"),
    }
}

/// One relaxation tick per rendered frame while a transition is running
fn relax_frame_system(mut scenario: ResMut<Scenario>) {
    scenario.frame();
}

fn sync_transforms_system(scenario: Res<Scenario>, mut query: Query<(&MarkerIndex, &mut Transform)>) {
    for (MarkerIndex(i), mut transform) in &mut query {
        if let Some(p) = scenario.simulation.points().get(*i) {
            transform.translation = to_world(&scenario, p.x.x, p.x.y);
        }
    }
}
