//! Possession components and messages.
//!
//! Systems that drive this state live in the sibling modules:
//! - [`super::control`]: grab / release transitions, kinematic follow, audit
//! - [`super::desktop`]: viewpoint pickup gating and drop pose

use crate::pose::Pose;
use bevy::prelude::*;

// ── Components ─────────────────────────────────────────────────────────────────

/// Which body part a manipulator stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManipulatorRole {
    LeftHand,
    RightHand,
    Viewpoint,
}

/// Something that can hold an attachable: a tracked hand or the desktop
/// viewpoint.  Its world pose comes from its `Transform` hierarchy.
#[derive(Component, Debug, Clone, Copy)]
pub struct Manipulator {
    pub role: ManipulatorRole,
    /// Proximity radius used by the candidate resolver.
    pub grab_radius: f32,
}

/// Binding of one manipulator to one attachable.
///
/// `offset` is captured at bind time so that
/// `attachable_world = manipulator_world ∘ offset` holds while held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub target: Entity,
    pub offset: Pose,
}

/// Per-manipulator possession state.  Authoritative for who holds what.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum Possession {
    #[default]
    Idle,
    Held(Attachment),
}

impl Possession {
    pub fn attachment(&self) -> Option<&Attachment> {
        match self {
            Possession::Idle => None,
            Possession::Held(attachment) => Some(attachment),
        }
    }

    pub fn target(&self) -> Option<Entity> {
        self.attachment().map(|a| a.target)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Possession::Idle)
    }
}

/// Directional probe carried by manipulators that can aim (the viewpoint).
///
/// `hit` is refreshed every frame by `pointer_probe_system` and names the
/// attachable the ray currently intersects, if any.
#[derive(Component, Debug, Clone, Copy)]
pub struct PointerProbe {
    pub max_distance: f32,
    pub hit: Option<Entity>,
}

impl PointerProbe {
    pub fn new(max_distance: f32) -> Self {
        Self {
            max_distance,
            hit: None,
        }
    }
}

/// Marks the desktop viewpoint: pickup is distance-gated and release places
/// the object at a drop pose in front of the player.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DesktopCarry;

// ── Messages ───────────────────────────────────────────────────────────────────

/// Discrete input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    GrabStart,
    GrabEnd,
    Fire,
}

/// Discrete action raised by an input source for one manipulator.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManipulatorAction {
    pub manipulator: Entity,
    pub kind: ActionKind,
}

impl ManipulatorAction {
    pub fn new(manipulator: Entity, kind: ActionKind) -> Self {
        Self { manipulator, kind }
    }
}
