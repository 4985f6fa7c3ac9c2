use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use firing_range::config::{self, RangeConfig};
use firing_range::rendering::RenderingPlugin;
use firing_range::{FiringRangePlugin, StartupSet};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Firing Range".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.55, 0.7, 0.85)))
        // Compiled defaults; load_range_config overwrites them from
        // assets/range.toml before anything is spawned.
        .insert_resource(RangeConfig::default())
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins((FiringRangePlugin, RenderingPlugin))
        .add_systems(
            Startup,
            config::load_range_config.in_set(StartupSet::Config),
        )
        .run();
}
