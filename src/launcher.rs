//! Projectile launcher: firing, deferred launch velocity, projectile lifetime.
//!
//! A launcher is armed while some manipulator holds it.  A `Fire` action only
//! fires the launcher held by the manipulator that raised it; fire from an
//! empty hand (or a hand holding something else) is a no-op.

use crate::config::RangeConfig;
use crate::feedback::{FeedbackEvent, SoundCue};
use crate::physics_bridge::set_velocity;
use crate::pose::Pose;
use crate::possession::{ActionKind, ManipulatorAction, Possession};
use crate::scene::spawn_projectile;
use crate::{RangeSchedulePlugin, RangeSet};
use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;
use bevy_rapier3d::prelude::*;

// ── Components ─────────────────────────────────────────────────────────────────

#[derive(Component, Debug, Clone, Copy)]
pub struct ProjectileLauncher {
    /// Muzzle position in the launcher's local frame.
    pub muzzle_offset: Vec3,
    pub speed: f32,
    pub lifetime: f32,
}

impl ProjectileLauncher {
    pub fn from_config(config: &RangeConfig) -> Self {
        Self {
            muzzle_offset: config.muzzle_offset(),
            speed: config.projectile_speed,
            lifetime: config.projectile_lifetime,
        }
    }

    /// World-space muzzle position and launch velocity for a launcher at
    /// `pose`.  The barrel points along local `-Z`.
    pub fn shot(&self, pose: &Pose) -> (Vec3, Vec3) {
        let muzzle = pose.compose(&Pose::from_translation(self.muzzle_offset));
        let forward = pose.forward().normalize_or(Vec3::NEG_Z);
        (muzzle.translation, forward * self.speed)
    }
}

/// Per-projectile state.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    /// Seconds since this projectile was spawned.
    pub age: f32,
    pub lifetime: f32,
}

impl Projectile {
    pub fn new(lifetime: f32) -> Self {
        Self { age: 0.0, lifetime }
    }
}

/// What [`LaunchClock::step`] wants done this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStep {
    /// Body not ready yet; keep waiting.
    Wait,
    /// Write the launch velocity.
    Apply,
    /// Re-application window over.
    Finished,
    /// Body never became ready; the velocity is skipped.
    Abandoned,
}

/// Tracks when a projectile's launch velocity may be applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LaunchClock {
    waited: f32,
    applied_for: Option<f32>,
}

impl LaunchClock {
    /// Advance by `dt`.
    ///
    /// Waits up to `ready_window` for the body; once ready, keeps applying for
    /// `reapply_window` so a body created late in the frame still launches.
    pub fn step(
        &mut self,
        body_ready: bool,
        dt: f32,
        ready_window: f32,
        reapply_window: f32,
    ) -> LaunchStep {
        match self.applied_for {
            None if body_ready => {
                self.applied_for = Some(0.0);
                LaunchStep::Apply
            }
            None => {
                self.waited += dt;
                if self.waited > ready_window {
                    LaunchStep::Abandoned
                } else {
                    LaunchStep::Wait
                }
            }
            Some(ref mut applied_for) => {
                *applied_for += dt;
                if *applied_for <= reapply_window {
                    LaunchStep::Apply
                } else {
                    LaunchStep::Finished
                }
            }
        }
    }
}

/// Launch velocity waiting for its rigid body.
#[derive(Component, Debug, Clone, Copy)]
pub struct LaunchVelocity {
    pub linvel: Vec3,
    pub clock: LaunchClock,
}

impl LaunchVelocity {
    pub fn new(linvel: Vec3) -> Self {
        Self {
            linvel,
            clock: LaunchClock::default(),
        }
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Fire every launcher whose holder raised a `Fire` action this frame.
pub fn launcher_fire_system(
    mut actions: MessageReader<ManipulatorAction>,
    q_possession: Query<&Possession>,
    q_launcher: Query<&ProjectileLauncher>,
    helper: TransformHelper,
    config: Res<RangeConfig>,
    mut commands: Commands,
    mut feedback: MessageWriter<FeedbackEvent>,
) {
    for action in actions.read() {
        if action.kind != ActionKind::Fire {
            continue;
        }
        let Some(held) = q_possession
            .get(action.manipulator)
            .ok()
            .and_then(Possession::target)
        else {
            continue;
        };
        let Ok(launcher) = q_launcher.get(held) else {
            continue;
        };
        let Ok(global) = helper.compute_global_transform(held) else {
            warn!("[launcher] {held:?} has no pose; shot skipped");
            continue;
        };

        let (muzzle, linvel) = launcher.shot(&Pose::from(&global));
        let projectile = spawn_projectile(&mut commands, &config, muzzle, linvel, launcher.lifetime);
        feedback.write(FeedbackEvent::PlaySound(SoundCue::Fire));
        debug!("[launcher] {held:?} fired {projectile:?} at {linvel:?}");
    }
}

/// Apply pending launch velocities once Rapier has created the body.
pub fn launch_velocity_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut LaunchVelocity, Has<RapierRigidBodyHandle>)>,
) {
    let dt = time.delta_secs();
    for (entity, mut launch, body_ready) in &mut q {
        let linvel = launch.linvel;
        let step = launch.clock.step(
            body_ready,
            dt,
            config.velocity_ready_window,
            config.velocity_reapply_window,
        );
        match step {
            LaunchStep::Wait => {}
            LaunchStep::Apply => set_velocity(&mut commands.entity(entity), linvel, Vec3::ZERO),
            LaunchStep::Finished => {
                commands.entity(entity).try_remove::<LaunchVelocity>();
            }
            LaunchStep::Abandoned => {
                warn!("[launcher] {entity:?} never got a rigid body; launch velocity skipped");
                commands.entity(entity).try_remove::<LaunchVelocity>();
            }
        }
    }
}

/// Despawn projectiles that have outlived their lifetime.
pub fn projectile_lifetime_system(
    mut commands: Commands,
    mut q: Query<(Entity, &mut Projectile)>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    for (entity, mut projectile) in &mut q {
        projectile.age += dt;
        if projectile.age >= projectile.lifetime {
            commands.entity(entity).try_despawn();
        }
    }
}

/// Firing, launch velocity and lifetime.
pub struct LauncherPlugin;

impl Plugin for LauncherPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.init_resource::<RangeConfig>()
            .add_message::<ManipulatorAction>()
            .add_message::<FeedbackEvent>()
            .add_systems(
                Update,
                (
                    launcher_fire_system.in_set(RangeSet::Fire),
                    (launch_velocity_system, projectile_lifetime_system)
                        .chain()
                        .in_set(RangeSet::Projectiles),
                ),
            );
    }
}
