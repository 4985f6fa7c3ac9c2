//! Firing range library
//!
//! A small shooting range for tracked hands or a desktop viewpoint: pick up
//! objects, carry a launcher, fire projectiles at targets that respawn in
//! fixed slots.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`pose`] | Rigid transforms and their composition |
//! | [`registry`] | Entity kinds, attachable registry, physical modes |
//! | [`candidate`] | Pointer-ray / proximity candidate resolution |
//! | [`possession`] | Grab, carry, release for hands and the desktop viewpoint |
//! | [`physics_bridge`] | Snapshot / restore of body config around a grab |
//! | [`launcher`] | Projectile launcher, launch velocity, projectile lifetime |
//! | [`targets`] | Target slots, waves, hits, deferred removal |
//! | [`feedback`] | Sound cues, score, highlight |
//! | [`input`] | Stick axes, gamepad tracking, desktop bindings |
//! | [`locomotion`] | Rig movement and mouse look |
//! | [`scene`] | Entity factory and the startup scene |
//! | [`rendering`] | Meshes, camera, light, HUD (windowed builds only) |

pub mod candidate;
pub mod config;
pub mod constants;
pub mod error;
pub mod feedback;
pub mod input;
pub mod launcher;
pub mod locomotion;
pub mod physics_bridge;
pub mod pose;
pub mod possession;
pub mod registry;
pub mod rendering;
pub mod scene;
pub mod targets;

use bevy::prelude::*;

/// Ordered stages of one range frame.
///
/// `Update` runs `Input` through `Audit` in declaration order; `PostUpdate`
/// runs `Hits` (after Rapier writeback) then `Feedback`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSet {
    Input,
    Locomotion,
    Probe,
    Registry,
    Possession,
    Follow,
    Fire,
    Projectiles,
    Waves,
    Cleanup,
    Audit,
    Hits,
    Feedback,
}

/// Startup ordering: configuration is final before anything spawns.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartupSet {
    Config,
    World,
}

/// Configures [`RangeSet`] and [`StartupSet`].  Every range plugin adds it
/// when missing, so plugins can be combined freely.
pub struct RangeSchedulePlugin;

impl Plugin for RangeSchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Startup,
            (StartupSet::Config, StartupSet::World).chain(),
        )
        .configure_sets(
            Update,
            (
                RangeSet::Input,
                RangeSet::Locomotion,
                RangeSet::Probe,
                RangeSet::Registry,
                RangeSet::Possession,
                RangeSet::Follow,
                RangeSet::Fire,
                RangeSet::Projectiles,
                RangeSet::Waves,
                RangeSet::Cleanup,
                RangeSet::Audit,
            )
                .chain(),
        )
        .configure_sets(PostUpdate, (RangeSet::Hits, RangeSet::Feedback).chain());
    }
}

/// Every gameplay plugin plus the startup scene.  Runs headless; add
/// [`rendering::RenderingPlugin`] and Rapier for a playable window.
pub struct FiringRangePlugin;

impl Plugin for FiringRangePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            RangeSchedulePlugin,
            input::RangeInputPlugin,
            locomotion::LocomotionPlugin,
            possession::PossessionPlugin,
            launcher::LauncherPlugin,
            targets::TargetsPlugin,
            feedback::FeedbackPlugin,
        ))
        .add_systems(Startup, scene::setup_scene.in_set(StartupSet::World));
    }
}
