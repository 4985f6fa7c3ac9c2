//! Contract between the possession pipeline and the Rapier simulation.
//!
//! | Operation | Rapier expression |
//! |---|---|
//! | set mode Free / Attached / Static | `RigidBody::Dynamic` / `KinematicPositionBased` / `Fixed` |
//! | get config | [`BodyConfig::capture`] from mass, damping, gravity scale, collider |
//! | restore config | [`release_to_free`] re-inserts the snapshot |
//! | set velocity | `Velocity` component |
//! | collision notification | `CollisionEvent` messages (read in `targets::hit`) |
//! | body ready | `RapierRigidBodyHandle` present on the entity |
//!
//! Mode switches and config snapshots always travel in the same command so a
//! body is never left half-configured (e.g. massless but still dynamic).

use crate::registry::PhysicalMode;
use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Physics configuration saved when a free body is grabbed and restored when
/// it is released.
#[derive(Clone)]
pub struct BodyConfig {
    pub mass: ColliderMassProperties,
    pub damping: Damping,
    pub gravity_scale: GravityScale,
    /// Collision shape; `None` leaves the current collider untouched.
    pub collider: Option<Collider>,
}

impl BodyConfig {
    /// Snapshot whatever the entity currently carries; absent components fall
    /// back to Rapier's defaults.
    pub fn capture(
        mass: Option<&ColliderMassProperties>,
        damping: Option<&Damping>,
        gravity_scale: Option<&GravityScale>,
        collider: Option<&Collider>,
    ) -> Self {
        Self {
            mass: mass.copied().unwrap_or_default(),
            damping: damping.copied().unwrap_or_default(),
            gravity_scale: gravity_scale.copied().unwrap_or_default(),
            collider: collider.cloned(),
        }
    }

    /// Configuration applied on release when nothing was saved.
    pub fn release_default(mass: f32) -> Self {
        Self {
            mass: ColliderMassProperties::Mass(mass),
            damping: Damping::default(),
            gravity_scale: GravityScale::default(),
            collider: None,
        }
    }
}

/// Snapshot held by an attachable while it is attached.
#[derive(Component, Clone)]
pub struct SavedBodyConfig(pub BodyConfig);

/// Rapier body type for a physical mode.
pub fn rigid_body_for(mode: PhysicalMode) -> RigidBody {
    match mode {
        PhysicalMode::Free => RigidBody::Dynamic,
        PhysicalMode::Attached => RigidBody::KinematicPositionBased,
        PhysicalMode::Static => RigidBody::Fixed,
    }
}

/// Switch a body to kinematic and stash its configuration.
///
/// Only bodies that were simulated before the grab carry a snapshot; the
/// others are released with the default configuration.
pub fn attach_kinematic(entity: &mut EntityCommands, snapshot: Option<BodyConfig>) {
    entity.try_insert((rigid_body_for(PhysicalMode::Attached), Velocity::zero()));
    match snapshot {
        Some(config) => entity.try_insert(SavedBodyConfig(config)),
        None => entity.try_remove::<SavedBodyConfig>(),
    };
}

/// Hand a body back to the simulation with its saved configuration (or
/// `fallback`) and zero velocity.
///
/// Callers must have stopped driving the pose before calling this.
pub fn release_to_free(entity: &mut EntityCommands, saved: Option<BodyConfig>, fallback: BodyConfig) {
    let config = saved.unwrap_or(fallback);
    entity.try_remove::<SavedBodyConfig>();
    entity.try_insert((
        rigid_body_for(PhysicalMode::Free),
        config.mass,
        config.damping,
        config.gravity_scale,
        Velocity::zero(),
    ));
    if let Some(collider) = config.collider {
        entity.try_insert(collider);
    }
}

/// Switch a body to a mode without touching its configuration.
pub fn set_mode(entity: &mut EntityCommands, mode: PhysicalMode) {
    entity.try_insert(rigid_body_for(mode));
}

/// Overwrite linear and angular velocity.
pub fn set_velocity(entity: &mut EntityCommands, linvel: Vec3, angvel: Vec3) {
    entity.try_insert(Velocity { linvel, angvel });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_uses_defaults_for_missing_components() {
        let config = BodyConfig::capture(None, None, None, None);
        assert_eq!(config.mass, ColliderMassProperties::default());
        assert_eq!(config.damping, Damping::default());
        assert_eq!(config.gravity_scale, GravityScale::default());
        assert!(config.collider.is_none());
    }

    #[test]
    fn mode_mapping() {
        assert_eq!(rigid_body_for(PhysicalMode::Free), RigidBody::Dynamic);
        assert_eq!(
            rigid_body_for(PhysicalMode::Attached),
            RigidBody::KinematicPositionBased
        );
        assert_eq!(rigid_body_for(PhysicalMode::Static), RigidBody::Fixed);
    }

    #[test]
    fn attach_then_release_restores_snapshot() {
        let mut world = World::new();
        let damping = Damping {
            linear_damping: 0.02,
            angular_damping: 0.03,
        };
        let entity = world
            .spawn((
                RigidBody::Dynamic,
                ColliderMassProperties::Mass(0.6),
                damping,
                GravityScale(0.5),
                Velocity::linear(Vec3::new(1.0, 2.0, 3.0)),
            ))
            .id();

        let snapshot = {
            let e = world.entity(entity);
            BodyConfig::capture(
                e.get::<ColliderMassProperties>(),
                e.get::<Damping>(),
                e.get::<GravityScale>(),
                e.get::<Collider>(),
            )
        };

        let mut commands = world.commands();
        attach_kinematic(&mut commands.entity(entity), Some(snapshot));
        world.flush();
        assert_eq!(
            world.get::<RigidBody>(entity),
            Some(&RigidBody::KinematicPositionBased)
        );

        let saved = world.get::<SavedBodyConfig>(entity).map(|s| s.0.clone());
        let mut commands = world.commands();
        release_to_free(
            &mut commands.entity(entity),
            saved,
            BodyConfig::release_default(1.0),
        );
        world.flush();

        assert_eq!(world.get::<RigidBody>(entity), Some(&RigidBody::Dynamic));
        assert_eq!(
            world.get::<ColliderMassProperties>(entity),
            Some(&ColliderMassProperties::Mass(0.6))
        );
        assert_eq!(world.get::<Damping>(entity), Some(&damping));
        assert_eq!(world.get::<GravityScale>(entity), Some(&GravityScale(0.5)));
        assert_eq!(world.get::<Velocity>(entity), Some(&Velocity::zero()));
        assert!(world.get::<SavedBodyConfig>(entity).is_none());
    }

    #[test]
    fn release_without_snapshot_uses_fallback_mass() {
        let mut world = World::new();
        let entity = world.spawn(RigidBody::KinematicPositionBased).id();
        let mut commands = world.commands();
        release_to_free(
            &mut commands.entity(entity),
            None,
            BodyConfig::release_default(1.0),
        );
        world.flush();
        assert_eq!(
            world.get::<ColliderMassProperties>(entity),
            Some(&ColliderMassProperties::Mass(1.0))
        );
    }
}
