//! Projectile → target hits and the deferred removal that frees slots.

use super::spawner::{Target, TargetSpawner};
use crate::config::RangeConfig;
use crate::feedback::{FeedbackEvent, SoundCue};
use crate::possession::Possession;
use crate::registry::{EntityKind, HeldBy};
use crate::scene::PendingRemoval;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::HashSet;

/// Detect projectile–target contacts and schedule both for removal.
///
/// Kinds are compared by their [`EntityKind`] tag.  A target already pending
/// removal ignores further hits, and each projectile scores at most once, so
/// one contact yields exactly one score increment and one hit cue.
pub fn target_hit_system(
    mut collision_events: MessageReader<CollisionEvent>,
    q_kind: Query<&EntityKind>,
    q_pending: Query<(), With<PendingRemoval>>,
    config: Res<RangeConfig>,
    mut commands: Commands,
    mut feedback: MessageWriter<FeedbackEvent>,
) {
    let mut processed: HashSet<Entity> = HashSet::new();

    for event in collision_events.read() {
        let CollisionEvent::Started(e1, e2, _) = event else {
            continue;
        };
        let (target, projectile) = match (q_kind.get(*e1), q_kind.get(*e2)) {
            (Ok(EntityKind::Target), Ok(EntityKind::Projectile)) => (*e1, *e2),
            (Ok(EntityKind::Projectile), Ok(EntityKind::Target)) => (*e2, *e1),
            _ => continue,
        };
        if processed.contains(&target)
            || processed.contains(&projectile)
            || q_pending.contains(target)
            || q_pending.contains(projectile)
        {
            continue;
        }
        processed.insert(target);
        processed.insert(projectile);

        feedback.write(FeedbackEvent::IncrementScore);
        feedback.write(FeedbackEvent::PlaySound(SoundCue::Hit));

        let removal = PendingRemoval::after(config.hit_cleanup_delay);
        commands.entity(target).try_insert(removal);
        commands.entity(projectile).try_insert(removal);
        debug!("[spawner] {projectile:?} hit {target:?}");
    }
}

/// Count down [`PendingRemoval`] and destroy expired entities.
///
/// A target frees exactly its own slot in the same step it is despawned, and
/// any manipulator still holding the entity drops back to Idle.  Entities that
/// are already gone are skipped.
pub fn deferred_removal_system(
    time: Res<Time>,
    mut commands: Commands,
    mut q_pending: Query<(Entity, &mut PendingRemoval, Option<&Target>, Option<&HeldBy>)>,
    mut q_possession: Query<&mut Possession>,
    spawner: Option<ResMut<TargetSpawner>>,
) {
    let dt = time.delta_secs();
    let mut spawner = spawner;
    for (entity, mut pending, target, held_by) in &mut q_pending {
        pending.remaining_secs -= dt;
        if pending.remaining_secs > 0.0 {
            continue;
        }
        if let (Some(target), Some(spawner)) = (target, spawner.as_deref_mut()) {
            spawner.release(target.slot, entity);
        }
        if let Some(&HeldBy(holder)) = held_by {
            if let Ok(mut possession) = q_possession.get_mut(holder) {
                if possession.target() == Some(entity) {
                    *possession = Possession::Idle;
                }
            }
        }
        commands.entity(entity).try_despawn();
    }
}
