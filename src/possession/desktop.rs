//! Desktop viewpoint carry: two-tier pickup gating and the drop pose.

use crate::config::RangeConfig;
use crate::pose::{yaw_only, Pose};
use bevy::prelude::*;

/// Outcome of the distance gate for a viewpoint grab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupGate {
    /// Within `pickup_distance`.
    Primary,
    /// Beyond pickup distance but within `extended_reach_distance`, and
    /// extended reach is enabled.
    ExtendedReach,
    OutOfReach,
}

impl PickupGate {
    pub fn allows_pickup(self) -> bool {
        !matches!(self, PickupGate::OutOfReach)
    }
}

/// Classify a candidate at `distance` from the viewpoint.
///
/// The tiers are evaluated once each; a failed primary check falls through to
/// the extended tier and never retries.
pub fn pickup_gate(distance: f32, config: &RangeConfig) -> PickupGate {
    if distance <= config.pickup_distance {
        PickupGate::Primary
    } else if config.auto_extend_reach && distance <= config.extended_reach_distance {
        PickupGate::ExtendedReach
    } else {
        PickupGate::OutOfReach
    }
}

/// Where a carried object lands on release: `drop_distance` ahead of the
/// viewpoint along its heading, `drop_lower` below eye level, yaw only.
pub fn drop_pose(viewpoint: &Pose, config: &RangeConfig) -> Pose {
    let heading = yaw_only(viewpoint.rotation);
    let mut translation = viewpoint.translation + heading * Vec3::new(0.0, 0.0, -config.drop_distance);
    translation.y -= config.drop_lower;
    Pose::new(translation, heading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn gate_tiers_follow_configured_distances() {
        let config = RangeConfig::default();
        assert_eq!(pickup_gate(0.9, &config), PickupGate::Primary);
        assert_eq!(pickup_gate(1.5, &config), PickupGate::Primary);
        assert_eq!(pickup_gate(2.0, &config), PickupGate::ExtendedReach);
        assert_eq!(pickup_gate(3.5, &config), PickupGate::OutOfReach);
    }

    #[test]
    fn disabling_extended_reach_rejects_second_tier() {
        let config = RangeConfig {
            auto_extend_reach: false,
            ..Default::default()
        };
        assert_eq!(pickup_gate(2.0, &config), PickupGate::OutOfReach);
        assert!(!pickup_gate(2.0, &config).allows_pickup());
    }

    #[test]
    fn drop_pose_ignores_pitch_and_lowers_the_object() {
        let config = RangeConfig::default();
        // Looking left (+90° yaw) and steeply down.
        let viewpoint = Pose::new(
            Vec3::new(1.0, 1.6, 0.0),
            Quat::from_euler(EulerRot::YXZ, FRAC_PI_2, -0.8, 0.0),
        );
        let drop = drop_pose(&viewpoint, &config);
        let expected = Vec3::new(
            1.0 - config.drop_distance,
            1.6 - config.drop_lower,
            0.0,
        );
        assert!(drop.translation.abs_diff_eq(expected, 1e-5));
        assert!((drop.rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
        assert!(drop.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}
