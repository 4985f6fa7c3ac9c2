//! Possession: which manipulator holds which attachable, and the attach /
//! detach pipeline that keeps held objects glued to their manipulator.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | `Manipulator`, `Possession` (Idle / Held), `PointerProbe`, `DesktopCarry`, `ManipulatorAction` |
//! | [`control`] | Pointer probe, grab / release transitions, kinematic follow, double-binding audit |
//! | [`desktop`] | Two-tier pickup gate and drop pose for the desktop viewpoint |
//!
//! All public items are re-exported at this level.

pub mod control;
pub mod desktop;
pub mod state;

pub use control::{
    follow_attached_system, pointer_probe_system, possession_action_system,
    possession_audit_system,
};
pub use desktop::{drop_pose, pickup_gate, PickupGate};
pub use state::{
    ActionKind, Attachment, DesktopCarry, Manipulator, ManipulatorAction, ManipulatorRole,
    PointerProbe, Possession,
};

use crate::config::RangeConfig;
use crate::feedback::FeedbackEvent;
use crate::registry::{refresh_registry_system, AttachableRegistry};
use crate::{RangeSchedulePlugin, RangeSet};
use bevy::prelude::*;

/// Registry refresh, pointer probe, grab / release, follow and audit.
pub struct PossessionPlugin;

impl Plugin for PossessionPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.init_resource::<RangeConfig>()
            .init_resource::<AttachableRegistry>()
            .add_message::<ManipulatorAction>()
            .add_message::<FeedbackEvent>()
            .add_systems(
                Update,
                (
                    pointer_probe_system.in_set(RangeSet::Probe),
                    refresh_registry_system.in_set(RangeSet::Registry),
                    possession_action_system.in_set(RangeSet::Possession),
                    follow_attached_system.in_set(RangeSet::Follow),
                    possession_audit_system.in_set(RangeSet::Audit),
                ),
            );
    }
}
