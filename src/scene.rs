//! Scene factory: spawns every kind of entity the range uses, each with its
//! explicit [`EntityKind`] tag, rigid body and [`VisualParams`].
//!
//! Rendering is attached later by [`crate::rendering`] from the
//! `VisualParams`, so everything here runs headless.

use crate::config::RangeConfig;
use crate::launcher::{LaunchVelocity, Projectile, ProjectileLauncher};
use crate::locomotion::{PlayerRig, ViewpointLook};
use crate::physics_bridge::rigid_body_for;
use crate::pose::Pose;
use crate::possession::{DesktopCarry, Manipulator, ManipulatorRole, PointerProbe, Possession};
use crate::registry::{Attachable, AttachableKind, EntityKind, PhysicalMode};
use crate::targets::Target;
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

const PROJECTILE_COLOR: Color = Color::srgb(1.0, 0.933, 0.533);
const BOX_TARGET_COLOR: Color = Color::srgb(0.667, 0.2, 0.2);
const CONE_TARGET_COLOR: Color = Color::srgb(0.2, 0.667, 0.2);
const LAUNCHER_COLOR: Color = Color::srgb(0.35, 0.35, 0.4);
const HAND_COLOR: Color = Color::srgb(0.9, 0.75, 0.6);
const GROUND_COLOR: Color = Color::srgb(0.3, 0.32, 0.3);
const TABLE_COLOR: Color = Color::srgb(0.45, 0.3, 0.2);

// ── Components ─────────────────────────────────────────────────────────────────

/// Primitive shape; drives both the collider and the render mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Box { size: Vec3 },
    Cone { height: f32, radius: f32 },
    Sphere { radius: f32 },
}

impl ShapeKind {
    pub fn collider(&self) -> Collider {
        match *self {
            ShapeKind::Box { size } => Collider::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
            ShapeKind::Cone { height, radius } => Collider::cone(height / 2.0, radius),
            ShapeKind::Sphere { radius } => Collider::ball(radius),
        }
    }
}

/// How an entity should look.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub shape: ShapeKind,
    pub color: Color,
}

impl VisualParams {
    pub fn new(shape: ShapeKind, color: Color) -> Self {
        Self { shape, color }
    }
}

/// Scheduled destruction.  Not cancellable; the countdown runs in
/// [`crate::targets::deferred_removal_system`].
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PendingRemoval {
    pub remaining_secs: f32,
}

impl PendingRemoval {
    pub fn after(secs: f32) -> Self {
        Self {
            remaining_secs: secs,
        }
    }
}

// ── Factory ───────────────────────────────────────────────────────────────────

/// Spawn the common part of any range entity: kind tag, pose, visuals.
pub fn spawn_kind<'a>(
    commands: &'a mut Commands,
    kind: EntityKind,
    pose: Pose,
    visual: VisualParams,
) -> EntityCommands<'a> {
    commands.spawn((
        kind,
        Transform::from_translation(pose.translation).with_rotation(pose.rotation),
        Visibility::default(),
        visual,
    ))
}

/// Destroy an entity now.  Missing entities are ignored.
pub fn destroy(commands: &mut Commands, entity: Entity) {
    commands.entity(entity).try_despawn();
}

/// Spawn a projectile at `position`.  Its velocity is applied once Rapier has
/// built the body (see [`LaunchVelocity`]).
pub fn spawn_projectile(
    commands: &mut Commands,
    config: &RangeConfig,
    position: Vec3,
    linvel: Vec3,
    lifetime: f32,
) -> Entity {
    let shape = ShapeKind::Sphere {
        radius: config.projectile_radius,
    };
    spawn_kind(
        commands,
        EntityKind::Projectile,
        Pose::from_translation(position),
        VisualParams::new(shape, PROJECTILE_COLOR),
    )
    .insert((
        Projectile::new(lifetime),
        LaunchVelocity::new(linvel),
        RigidBody::Dynamic,
        shape.collider(),
        ColliderMassProperties::Mass(config.projectile_mass),
        Damping {
            linear_damping: config.projectile_damping,
            angular_damping: config.projectile_damping,
        },
        Velocity::zero(),
        Ccd::enabled(),
        ActiveEvents::COLLISION_EVENTS,
    ))
    .id()
}

/// Target shape for a slot: boxes on even slots, cones on odd ones.
pub fn target_visual(slot: usize, config: &RangeConfig) -> VisualParams {
    if slot % 2 == 0 {
        VisualParams::new(
            ShapeKind::Box {
                size: Vec3::splat(config.target_box_size),
            },
            BOX_TARGET_COLOR,
        )
    } else {
        VisualParams::new(
            ShapeKind::Cone {
                height: config.target_cone_height,
                radius: config.target_cone_radius,
            },
            CONE_TARGET_COLOR,
        )
    }
}

/// Spawn the target for `slot`.  With `physics` off the target is a fixed
/// body that never joins the simulation.
pub fn spawn_target(
    commands: &mut Commands,
    config: &RangeConfig,
    slot: usize,
    position: Vec3,
    physics: bool,
) -> Entity {
    let visual = target_visual(slot, config);
    let mode = if physics {
        PhysicalMode::Free
    } else {
        PhysicalMode::Static
    };
    spawn_kind(
        commands,
        EntityKind::Target,
        Pose::from_translation(position),
        visual,
    )
    .insert((
        Target { slot },
        Attachable {
            kind: AttachableKind::Target,
            mode,
        },
        rigid_body_for(mode),
        visual.shape.collider(),
        ColliderMassProperties::Mass(config.target_mass),
        Damping {
            linear_damping: config.target_damping,
            angular_damping: config.target_damping,
        },
        Velocity::zero(),
        ActiveEvents::COLLISION_EVENTS,
    ))
    .id()
}

/// Spawn a free launcher at `pose`.
pub fn spawn_launcher(commands: &mut Commands, config: &RangeConfig, pose: Pose) -> Entity {
    let shape = ShapeKind::Box {
        size: Vec3::new(0.08, 0.12, 0.5),
    };
    spawn_kind(
        commands,
        EntityKind::Weapon,
        pose,
        VisualParams::new(shape, LAUNCHER_COLOR),
    )
    .insert((
        Attachable::free(AttachableKind::Weapon),
        ProjectileLauncher::from_config(config),
        RigidBody::Dynamic,
        shape.collider(),
        ColliderMassProperties::Mass(0.8),
        Velocity::zero(),
    ))
    .id()
}

/// Spawn a free grabbable prop.
pub fn spawn_prop(commands: &mut Commands, pose: Pose, visual: VisualParams, mass: f32) -> Entity {
    spawn_kind(commands, EntityKind::Grabbable, pose, visual)
        .insert((
            Attachable::free(AttachableKind::Grabbable),
            RigidBody::Dynamic,
            visual.shape.collider(),
            ColliderMassProperties::Mass(mass),
            Velocity::zero(),
        ))
        .id()
}

/// Spawn fixed scenery.
pub fn spawn_scenery(commands: &mut Commands, pose: Pose, visual: VisualParams) -> Entity {
    spawn_kind(commands, EntityKind::Scenery, pose, visual)
        .insert((RigidBody::Fixed, visual.shape.collider()))
        .id()
}

/// Spawn the player rig with its viewpoint and both hands as children.
///
/// Returns the rig entity.  Hands rest at a fixed offset until a tracking
/// host moves their `Transform`.
pub fn spawn_player_rig(commands: &mut Commands, config: &RangeConfig) -> Entity {
    let viewpoint = commands
        .spawn((
            EntityKind::Manipulator,
            Manipulator {
                role: ManipulatorRole::Viewpoint,
                grab_radius: config.viewpoint_grab_radius,
            },
            Possession::Idle,
            PointerProbe::new(config.pointer_ray_length),
            DesktopCarry,
            ViewpointLook::default(),
            Transform::from_xyz(0.0, config.eye_height, 0.0),
            Visibility::default(),
        ))
        .id();

    let hand_shape = ShapeKind::Sphere { radius: 0.04 };
    let mut hands = Vec::with_capacity(2);
    for (role, x) in [
        (ManipulatorRole::LeftHand, -0.25),
        (ManipulatorRole::RightHand, 0.25),
    ] {
        let hand = spawn_kind(
            commands,
            EntityKind::Manipulator,
            Pose::from_translation(Vec3::new(x, config.eye_height - 0.4, -0.35)),
            VisualParams::new(hand_shape, HAND_COLOR),
        )
        .insert((
            Manipulator {
                role,
                grab_radius: config.hand_grab_radius,
            },
            Possession::Idle,
        ))
        .id();
        hands.push(hand);
    }

    let mut rig = commands.spawn((
        PlayerRig::default(),
        Transform::default(),
        Visibility::default(),
    ));
    rig.add_child(viewpoint);
    rig.add_children(&hands);
    rig.id()
}

/// Startup: ground, a table with the launcher and a few props, the player rig.
pub fn setup_scene(mut commands: Commands, config: Res<RangeConfig>) {
    spawn_scenery(
        &mut commands,
        Pose::from_translation(Vec3::new(0.0, -0.05, -3.0)),
        VisualParams::new(
            ShapeKind::Box {
                size: Vec3::new(20.0, 0.1, 20.0),
            },
            GROUND_COLOR,
        ),
    );
    spawn_scenery(
        &mut commands,
        Pose::from_translation(Vec3::new(0.0, 0.45, -0.8)),
        VisualParams::new(
            ShapeKind::Box {
                size: Vec3::new(1.2, 0.9, 0.6),
            },
            TABLE_COLOR,
        ),
    );

    spawn_launcher(
        &mut commands,
        &config,
        Pose::from_translation(Vec3::new(0.25, 0.97, -0.8)),
    );
    spawn_prop(
        &mut commands,
        Pose::from_translation(Vec3::new(-0.35, 0.98, -0.8)),
        VisualParams::new(ShapeKind::Sphere { radius: 0.08 }, Color::srgb(0.2, 0.4, 0.9)),
        0.5,
    );
    spawn_prop(
        &mut commands,
        Pose::from_translation(Vec3::new(-0.1, 0.98, -0.75)),
        VisualParams::new(
            ShapeKind::Box {
                size: Vec3::splat(0.15),
            },
            Color::srgb(0.9, 0.6, 0.1),
        ),
        0.7,
    );

    spawn_player_rig(&mut commands, &config);
    println!("✓ Range scene spawned");
}
