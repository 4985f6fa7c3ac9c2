//! Targets: slot-based spawning, projectile hits, respawn on destruction.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`spawner`] | `Target`, `TargetSpawner` slot table, wave system, slot audit |
//! | [`hit`] | Projectile hit detection and deferred removal |

pub mod hit;
pub mod spawner;

pub use hit::{deferred_removal_system, target_hit_system};
pub use spawner::{
    init_target_spawner, slot_audit_system, target_wave_system, Target, TargetSpawner,
};

use crate::config::RangeConfig;
use crate::feedback::FeedbackEvent;
use crate::{RangeSchedulePlugin, RangeSet, StartupSet};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Spawner setup, waves, hits, cleanup and the slot audit.
pub struct TargetsPlugin;

impl Plugin for TargetsPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.init_resource::<RangeConfig>()
            .add_message::<CollisionEvent>()
            .add_message::<FeedbackEvent>()
            .configure_sets(PostUpdate, RangeSet::Hits.after(PhysicsSet::Writeback))
            .add_systems(Startup, init_target_spawner.in_set(StartupSet::World))
            .add_systems(
                Update,
                (
                    target_wave_system.in_set(RangeSet::Waves),
                    deferred_removal_system.in_set(RangeSet::Cleanup),
                    slot_audit_system.in_set(RangeSet::Audit),
                ),
            )
            .add_systems(PostUpdate, target_hit_system.in_set(RangeSet::Hits));
    }
}
