//! Rigid poses (translation + rotation) and the offset algebra used by the
//! attach pipeline.
//!
//! `a.compose(b)` is `a ∘ b`: `b` expressed in `a`'s frame, lifted to world
//! space.  The attach invariant reads
//! `attachable_world = manipulator_world ∘ offset`, so the offset captured at
//! bind time is `manipulator_world⁻¹ ∘ attachable_world`.
//!
//! Scale is not part of a pose.  Writers copy translation and rotation into a
//! `Transform` and leave its scale alone.

use bevy::prelude::*;

/// Position + orientation in some parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// `self ∘ other`.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose {
            translation: self.translation + self.rotation * other.translation,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn inverse(&self) -> Pose {
        let rotation = self.rotation.inverse();
        Pose {
            translation: rotation * -self.translation,
            rotation,
        }
    }

    /// Offset of `child` relative to `parent`: `parent⁻¹ ∘ child`.
    pub fn relative(parent: &Pose, child: &Pose) -> Pose {
        parent.inverse().compose(child)
    }

    /// Local direction rotated into the parent frame.
    pub fn direction(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Local `-Z`, the forward axis of cameras, hands and launchers.
    pub fn forward(&self) -> Vec3 {
        self.direction(Vec3::NEG_Z)
    }

    /// Copy this pose into `transform`, keeping its scale.
    pub fn write_to(&self, transform: &mut Transform) {
        transform.translation = self.translation;
        transform.rotation = self.rotation;
    }

    /// Approximate equality used by tests and audits.
    pub fn abs_diff_eq(&self, other: &Pose, eps: f32) -> bool {
        self.translation.abs_diff_eq(other.translation, eps)
            && (self.rotation.dot(other.rotation).abs() - 1.0).abs() <= eps
    }
}

impl From<&Transform> for Pose {
    fn from(t: &Transform) -> Self {
        Pose::new(t.translation, t.rotation)
    }
}

impl From<&GlobalTransform> for Pose {
    fn from(g: &GlobalTransform) -> Self {
        let (_, rotation, translation) = g.to_scale_rotation_translation();
        Pose::new(translation, rotation)
    }
}

/// Keep only the heading (rotation about +Y) of `rotation`.
pub fn yaw_only(rotation: Quat) -> Quat {
    let (yaw, _pitch, _roll) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_rotation_y(yaw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn relative_then_compose_recovers_child() {
        let parent = Pose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_euler(EulerRot::YXZ, 0.7, -0.3, 0.2),
        );
        let child = Pose::new(Vec3::new(-4.0, 0.5, 1.0), Quat::from_rotation_z(1.1));
        let offset = Pose::relative(&parent, &child);
        assert!(parent.compose(&offset).abs_diff_eq(&child, 1e-5));
    }

    #[test]
    fn inverse_composes_to_identity() {
        let p = Pose::new(Vec3::new(3.0, -1.0, 0.5), Quat::from_rotation_x(0.4));
        assert!(p.compose(&p.inverse()).abs_diff_eq(&Pose::IDENTITY, 1e-5));
    }

    #[test]
    fn forward_is_negative_z_rotated() {
        let p = Pose::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
        assert!(p.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn yaw_only_discards_pitch_and_roll() {
        let tilted = Quat::from_euler(EulerRot::YXZ, 0.9, -0.6, 0.4);
        let flat = yaw_only(tilted);
        assert!((flat.dot(Quat::from_rotation_y(0.9)).abs() - 1.0).abs() < 1e-5);
        // A flat heading keeps the up axis vertical.
        assert!((flat * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn write_to_keeps_scale() {
        let mut t = Transform::from_scale(Vec3::splat(2.0));
        Pose::from_translation(Vec3::X).write_to(&mut t);
        assert_eq!(t.scale, Vec3::splat(2.0));
        assert_eq!(t.translation, Vec3::X);
    }
}
