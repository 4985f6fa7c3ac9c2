//! Rig locomotion and desktop mouse look.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`move_intent_system`]: merged stick axes (with deadzone) and
//!    WASD (or AZERTY ZQSD) / arrow keys → [`MoveIntent`].  Keys override
//!    sticks per axis.
//! 2. [`apply_move_intent_system`]: yaw the [`PlayerRig`], then translate it
//!    relative to where the player faces.
//! 3. [`mouse_look_system`]: right-drag turns and tilts the viewpoint.
//!
//! Locomotion only consumes [`StickAxes`]; how samples are merged is decided
//! in [`crate::input`].

use crate::config::RangeConfig;
use crate::input::{Stick, StickAxes};
use crate::{RangeSchedulePlugin, RangeSet};
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

/// Root of the player: hands and viewpoint are its children.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct PlayerRig {
    /// Heading in radians about +Y.
    pub yaw: f32,
}

/// Mouse-look angles of the viewpoint relative to the rig.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ViewpointLook {
    pub yaw: f32,
    pub pitch: f32,
}

const MAX_PITCH: f32 = 1.4;

/// What the player asked for this frame, each axis in `[-1, 1]`.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct MoveIntent {
    /// `+1` = right.
    pub strafe: f32,
    /// `+1` = forward.
    pub forward: f32,
    /// `+1` = turn right.
    pub turn: f32,
}

/// Zero out magnitudes below `deadzone`.
pub fn deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        value
    }
}

/// Rig motion for one frame: `(translation delta, yaw delta)`.
///
/// `facing` is the heading the player looks along (rig yaw + look yaw).
pub fn rig_motion(intent: MoveIntent, facing: f32, config: &RangeConfig, dt: f32) -> (Vec3, f32) {
    let yaw_delta = -intent.turn * config.rotate_speed_deg.to_radians() * dt;
    let local = Vec3::new(intent.strafe, 0.0, -intent.forward);
    let step = if local.length_squared() > 0.0 {
        Quat::from_rotation_y(facing) * local.normalize() * config.move_speed * dt
    } else {
        Vec3::ZERO
    };
    (step, yaw_delta)
}

pub fn move_intent_system(
    axes: Res<StickAxes>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<RangeConfig>,
    mut intent: ResMut<MoveIntent>,
) {
    let dz = config.stick_deadzone;
    let left = axes.get(Stick::Left);
    let right = axes.get(Stick::Right);
    *intent = MoveIntent {
        strafe: deadzone(left.x, dz),
        forward: deadzone(left.y, dz),
        turn: deadzone(right.x, dz),
    };

    if keys.any_pressed([KeyCode::KeyW, KeyCode::KeyZ]) {
        intent.forward = 1.0;
    } else if keys.pressed(KeyCode::KeyS) {
        intent.forward = -1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::KeyQ]) {
        intent.strafe = -1.0;
    } else if keys.pressed(KeyCode::KeyD) {
        intent.strafe = 1.0;
    }
    if keys.pressed(KeyCode::ArrowLeft) {
        intent.turn = -1.0;
    } else if keys.pressed(KeyCode::ArrowRight) {
        intent.turn = 1.0;
    }
}

pub fn apply_move_intent_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    intent: Res<MoveIntent>,
    mut q_rig: Query<(&mut PlayerRig, &mut Transform)>,
    q_look: Query<&ViewpointLook>,
) {
    let Ok((mut rig, mut transform)) = q_rig.single_mut() else {
        return;
    };
    let look_yaw = q_look.iter().next().map_or(0.0, |l| l.yaw);
    let (step, yaw_delta) = rig_motion(*intent, rig.yaw + look_yaw, &config, time.delta_secs());
    rig.yaw = (rig.yaw + yaw_delta) % std::f32::consts::TAU;
    transform.rotation = Quat::from_rotation_y(rig.yaw);
    transform.translation += step;
}

/// Right-drag mouse look on the viewpoint.
pub fn mouse_look_system(
    config: Res<RangeConfig>,
    mouse: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut q: Query<(&mut ViewpointLook, &mut Transform)>,
) {
    if !mouse.pressed(MouseButton::Right) || motion.delta == Vec2::ZERO {
        return;
    }
    for (mut look, mut transform) in &mut q {
        look.yaw -= motion.delta.x * config.mouse_look_sensitivity;
        look.pitch = (look.pitch - motion.delta.y * config.mouse_look_sensitivity)
            .clamp(-MAX_PITCH, MAX_PITCH);
        transform.rotation = Quat::from_euler(EulerRot::YXZ, look.yaw, look.pitch, 0.0);
    }
}

/// Rig movement from sticks / keys and desktop mouse look.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.init_resource::<RangeConfig>()
            .init_resource::<StickAxes>()
            .init_resource::<MoveIntent>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<AccumulatedMouseMotion>()
            .add_systems(
                Update,
                (move_intent_system, apply_move_intent_system, mouse_look_system)
                    .chain()
                    .in_set(RangeSet::Locomotion),
            );
    }
}
