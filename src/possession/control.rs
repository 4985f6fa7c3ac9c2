//! Possession systems.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`pointer_probe_system`]: casts the viewpoint ray and refreshes
//!    [`PointerProbe::hit`], raising highlight feedback on change.
//! 2. [`possession_action_system`]: applies `GrabStart` / `GrabEnd` actions
//!    (Idle → Held → Idle), switching bodies between dynamic and kinematic.
//! 3. [`follow_attached_system`]: writes `manipulator_world ∘ offset` into
//!    every held attachable's `Transform`.
//! 4. [`possession_audit_system`]: logs any attachable bound twice.
//!
//! Attachables are expected to live at the root of the hierarchy or under an
//! unscaled parent; poses are converted into the parent frame before writing.

use super::desktop::{drop_pose, pickup_gate, PickupGate};
use super::state::{
    ActionKind, Attachment, DesktopCarry, Manipulator, ManipulatorAction, PointerProbe, Possession,
};
use crate::candidate::{resolve_candidate, CandidateInfo};
use crate::config::RangeConfig;
use crate::error::RangeError;
use crate::feedback::FeedbackEvent;
use crate::physics_bridge::{attach_kinematic, release_to_free, BodyConfig, SavedBodyConfig};
use crate::pose::Pose;
use crate::registry::{Attachable, AttachableRegistry, HeldBy, PhysicalMode};
use crate::scene::PendingRemoval;
use bevy::prelude::*;
use bevy::transform::helper::TransformHelper;
use bevy_rapier3d::prelude::*;
use std::collections::HashMap;

type AttachableBody = (
    &'static mut Attachable,
    Option<&'static ColliderMassProperties>,
    Option<&'static Damping>,
    Option<&'static GravityScale>,
    Option<&'static Collider>,
    Option<&'static SavedBodyConfig>,
    Has<PendingRemoval>,
);

/// Express a world pose in the frame of `entity`'s parent.
fn world_to_local(
    helper: &TransformHelper,
    q_parent: &Query<&ChildOf>,
    entity: Entity,
    world: Pose,
) -> Option<Pose> {
    match q_parent.get(entity) {
        Ok(child_of) => {
            let parent = helper.compute_global_transform(child_of.parent()).ok()?;
            Some(Pose::relative(&Pose::from(&parent), &world))
        }
        Err(_) => Some(world),
    }
}

// ── Pointer probe ─────────────────────────────────────────────────────────────

/// Cast each probe's ray and record the attachable it hits.
///
/// Does nothing until a Rapier context exists, so tests can drive
/// [`PointerProbe::hit`] directly.
pub fn pointer_probe_system(
    rapier_context: ReadRapierContext,
    helper: TransformHelper,
    mut q_probe: Query<(Entity, &mut PointerProbe, Option<&Possession>)>,
    q_attachable: Query<(), (With<Attachable>, Without<PendingRemoval>)>,
    mut feedback: MessageWriter<FeedbackEvent>,
) {
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    for (entity, mut probe, possession) in &mut q_probe {
        let Ok(global) = helper.compute_global_transform(entity) else {
            continue;
        };
        let pose = Pose::from(&global);
        let mut filter = QueryFilter::default();
        if let Some(held) = possession.and_then(Possession::target) {
            filter = filter.exclude_collider(held);
        }
        let hit = rapier
            .cast_ray(pose.translation, pose.forward(), probe.max_distance, true, filter)
            .map(|(e, _toi)| e)
            .filter(|e| q_attachable.contains(*e));

        if hit != probe.hit {
            if let Some(old) = probe.hit {
                feedback.write(FeedbackEvent::SetHighlight { entity: old, on: false });
            }
            if let Some(new) = hit {
                feedback.write(FeedbackEvent::SetHighlight { entity: new, on: true });
            }
            probe.hit = hit;
        }
    }
}

// ── Grab / release ────────────────────────────────────────────────────────────

/// Apply `GrabStart` / `GrabEnd` actions.
///
/// - **GrabStart** while Idle resolves a candidate, captures
///   `offset = manipulator⁻¹ ∘ attachable`, snapshots the body config of a
///   free body and switches it to kinematic.  No candidate, a bound candidate
///   or a desktop pickup beyond reach leave the manipulator Idle.
/// - **GrabEnd** while Held stops driving the pose, optionally moves a
///   desktop-carried object to its drop pose, then restores the saved config
///   (or the release default) with zero velocity.
///
/// Everything else is a silent no-op.  `Fire` belongs to the launcher.
#[allow(clippy::too_many_arguments)]
pub fn possession_action_system(
    mut actions: MessageReader<ManipulatorAction>,
    config: Res<RangeConfig>,
    registry: Res<AttachableRegistry>,
    helper: TransformHelper,
    q_parent: Query<&ChildOf>,
    q_transform: Query<&Transform>,
    mut q_manip: Query<(
        Entity,
        &Manipulator,
        &mut Possession,
        Option<&PointerProbe>,
        Has<DesktopCarry>,
    )>,
    mut q_body: Query<AttachableBody>,
    mut commands: Commands,
) {
    // attachable → manipulator, kept current within the frame so two grabs
    // queued together cannot claim the same attachable.
    let mut bound: HashMap<Entity, Entity> = HashMap::new();
    for (entity, _, possession, ..) in &q_manip {
        if let Some(target) = possession.target() {
            bound.insert(target, entity);
        }
    }

    for action in actions.read() {
        let Ok((_, manipulator, mut possession, probe, desktop)) =
            q_manip.get_mut(action.manipulator)
        else {
            continue;
        };

        match action.kind {
            ActionKind::GrabStart => {
                if !possession.is_idle() {
                    continue;
                }
                let Ok(global) = helper.compute_global_transform(action.manipulator) else {
                    warn!(
                        "[possession] {}",
                        RangeError::MissingPose {
                            manipulator: action.manipulator
                        }
                    );
                    continue;
                };
                let manipulator_pose = Pose::from(&global);

                let candidate = resolve_candidate(
                    manipulator_pose.translation,
                    manipulator.grab_radius,
                    probe.and_then(|p| p.hit),
                    &registry,
                    |e| {
                        let (.., pending) = q_body.get(e).ok()?;
                        if pending {
                            return None;
                        }
                        let position = helper.compute_global_transform(e).ok()?.translation();
                        Some(CandidateInfo {
                            position,
                            bound: bound.contains_key(&e),
                        })
                    },
                );
                let Some(candidate) = candidate else {
                    debug!("[possession] {:?}: nothing to grab", manipulator.role);
                    continue;
                };

                let gate = desktop.then(|| pickup_gate(candidate.distance, &config));
                if gate == Some(PickupGate::OutOfReach) {
                    debug!(
                        "[possession] {:?} out of reach at {:.2} m",
                        candidate.entity, candidate.distance
                    );
                    continue;
                }

                let Ok(target_global) = helper.compute_global_transform(candidate.entity) else {
                    continue;
                };
                let offset = Pose::relative(&manipulator_pose, &Pose::from(&target_global));

                let Ok((mut attachable, mass, damping, gravity, collider, ..)) =
                    q_body.get_mut(candidate.entity)
                else {
                    continue;
                };
                let snapshot = (attachable.mode == PhysicalMode::Free)
                    .then(|| BodyConfig::capture(mass, damping, gravity, collider));
                attachable.mode = PhysicalMode::Attached;

                let mut entity = commands.entity(candidate.entity);
                attach_kinematic(&mut entity, snapshot);
                entity.try_insert(HeldBy(action.manipulator));

                *possession = Possession::Held(Attachment {
                    target: candidate.entity,
                    offset,
                });
                bound.insert(candidate.entity, action.manipulator);
                info!(
                    "[possession] {:?} grabbed {:?} ({:?}{})",
                    manipulator.role,
                    candidate.entity,
                    candidate.source,
                    gate.map(|g| format!(", {g:?}")).unwrap_or_default()
                );
            }

            ActionKind::GrabEnd => {
                let Possession::Held(attachment) = *possession else {
                    continue;
                };
                *possession = Possession::Idle;
                bound.remove(&attachment.target);

                let Ok((mut attachable, .., saved, _)) = q_body.get_mut(attachment.target) else {
                    continue;
                };
                attachable.mode = PhysicalMode::Free;
                let saved = saved.map(|s| s.0.clone());

                let mut entity = commands.entity(attachment.target);
                entity.try_remove::<HeldBy>();
                if desktop {
                    if let Ok(global) = helper.compute_global_transform(action.manipulator) {
                        let drop = drop_pose(&Pose::from(&global), &config);
                        if let Some(local) =
                            world_to_local(&helper, &q_parent, attachment.target, drop)
                        {
                            let mut transform =
                                q_transform.get(attachment.target).copied().unwrap_or_default();
                            local.write_to(&mut transform);
                            entity.try_insert(transform);
                        }
                    }
                }
                release_to_free(
                    &mut entity,
                    saved,
                    BodyConfig::release_default(config.release_default_mass),
                );
                info!(
                    "[possession] {:?} released {:?}",
                    manipulator.role, attachment.target
                );
            }

            ActionKind::Fire => {}
        }
    }
}

// ── Kinematic follow ──────────────────────────────────────────────────────────

/// Drive every held attachable to `manipulator_world ∘ offset`.
///
/// Uses the manipulator's pose as of this frame (computed through the
/// hierarchy, not last frame's `GlobalTransform`).  A manipulator whose target
/// has disappeared drops back to Idle; one whose own pose cannot be computed
/// is skipped for the frame.
pub fn follow_attached_system(
    mut params: ParamSet<(TransformHelper, Query<&mut Transform>)>,
    q_parent: Query<&ChildOf>,
    mut q_manip: Query<(Entity, &mut Possession)>,
) {
    let mut writes = Vec::new();
    {
        let helper = params.p0();
        for (manipulator, possession) in &q_manip {
            let Some(attachment) = possession.attachment() else {
                continue;
            };
            let Ok(global) = helper.compute_global_transform(manipulator) else {
                continue;
            };
            let world = Pose::from(&global).compose(&attachment.offset);
            if let Some(local) = world_to_local(&helper, &q_parent, attachment.target, world) {
                writes.push((manipulator, attachment.target, local));
            }
        }
    }

    let mut q_transform = params.p1();
    for (manipulator, target, local) in writes {
        match q_transform.get_mut(target) {
            Ok(mut transform) => local.write_to(&mut transform),
            Err(_) => {
                if let Ok((_, mut possession)) = q_manip.get_mut(manipulator) {
                    *possession = Possession::Idle;
                }
                debug!("[possession] held {target:?} is gone; back to idle");
            }
        }
    }
}

// ── Audit ─────────────────────────────────────────────────────────────────────

/// Log an error for every attachable held by more than one manipulator.
pub fn possession_audit_system(q_manip: Query<(Entity, &Possession)>) {
    let mut holders: HashMap<Entity, Vec<Entity>> = HashMap::new();
    for (manipulator, possession) in &q_manip {
        if let Some(target) = possession.target() {
            holders.entry(target).or_default().push(manipulator);
        }
    }
    for (attachable, mut holders) in holders {
        if holders.len() > 1 {
            holders.sort();
            error!(
                "[possession] {}",
                RangeError::DoubleBinding {
                    attachable,
                    holders
                }
            );
        }
    }
}
