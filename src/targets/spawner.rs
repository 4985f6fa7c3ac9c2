//! Target spawner: fixed slots, wave timer, slot-occupancy table.
//!
//! Slot identity is the index into the configured slot list.  The occupancy
//! table holds at most one target per index, and a target's [`Target::slot`]
//! always names the entry that records it; the audit repairs (and reports) any
//! disagreement that outlives the cleanup window.

use crate::config::{RangeConfig, WaveSettings};
use crate::error::RangeError;
use crate::scene::spawn_target;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

/// A target and the slot it occupies for its whole lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub slot: usize,
}

#[derive(Resource, Debug)]
pub struct TargetSpawner {
    slots: Vec<Vec3>,
    occupants: Vec<Option<Entity>>,
    timer: Timer,
    first_wave_pending: bool,
    /// Maximum simultaneously active targets.
    pub max_active: usize,
    /// `false` spawns targets as static bodies.
    pub target_physics: bool,
    /// Seconds each slot has disagreed with the live targets.
    mismatch_secs: Vec<f32>,
}

impl TargetSpawner {
    pub fn new(slots: Vec<Vec3>, wave: WaveSettings) -> Self {
        let n = slots.len();
        Self {
            slots,
            occupants: vec![None; n],
            timer: Timer::from_seconds(wave.period_secs, TimerMode::Repeating),
            first_wave_pending: true,
            max_active: wave.max_active,
            target_physics: wave.target_physics,
            mismatch_secs: vec![0.0; n],
        }
    }

    pub fn from_config(config: &RangeConfig) -> Self {
        Self::new(config.spawn_slot_positions(), config.wave_settings())
    }

    pub fn slots(&self) -> &[Vec3] {
        &self.slots
    }

    pub fn occupant(&self, slot: usize) -> Option<Entity> {
        self.occupants.get(slot).copied().flatten()
    }

    pub fn active_count(&self) -> usize {
        self.occupants.iter().filter(|o| o.is_some()).count()
    }

    /// Effective cap: never more than there are slots.
    pub fn limit(&self) -> usize {
        self.max_active.min(self.slots.len())
    }

    /// Advance the wave timer.  The first call always reports a wave so the
    /// range is populated as soon as it starts.
    pub fn wave_due(&mut self, dt: Duration) -> bool {
        self.timer.tick(dt);
        if self.first_wave_pending {
            self.first_wave_pending = false;
            return true;
        }
        self.timer.just_finished()
    }

    /// Empty slot indices to fill this wave, in index order, stopping at the cap.
    pub fn plan_wave(&self) -> Vec<usize> {
        let room = self.limit().saturating_sub(self.active_count());
        self.occupants
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_none())
            .map(|(i, _)| i)
            .take(room)
            .collect()
    }

    pub fn occupy(&mut self, slot: usize, entity: Entity) {
        if let Some(entry) = self.occupants.get_mut(slot) {
            *entry = Some(entity);
        }
    }

    /// Free `slot` if (and only if) it records `entity`.
    pub fn release(&mut self, slot: usize, entity: Entity) -> bool {
        match self.occupants.get_mut(slot) {
            Some(entry) if *entry == Some(entity) => {
                *entry = None;
                true
            }
            _ => false,
        }
    }

    /// Compare the table with the live targets (`entity → slot`).
    ///
    /// A slot that has disagreed for longer than `window` is repaired to the
    /// lowest live entity claiming it (or emptied) and reported.
    pub fn reconcile(
        &mut self,
        dt: f32,
        window: f32,
        live: &HashMap<Entity, usize>,
    ) -> Vec<RangeError> {
        let mut errors = Vec::new();
        for slot in 0..self.slots.len() {
            let recorded = self.occupants[slot];
            let claimant = live
                .iter()
                .filter(|&(_, &s)| s == slot)
                .map(|(&e, _)| e)
                .min();
            let consistent = match recorded {
                Some(entity) => live.get(&entity) == Some(&slot),
                None => claimant.is_none(),
            };
            if consistent {
                self.mismatch_secs[slot] = 0.0;
                continue;
            }
            self.mismatch_secs[slot] += dt;
            if self.mismatch_secs[slot] > window {
                errors.push(RangeError::SlotMismatch {
                    slot,
                    recorded,
                    persisted_secs: self.mismatch_secs[slot],
                });
                self.occupants[slot] = claimant;
                self.mismatch_secs[slot] = 0.0;
            }
        }
        errors
    }
}

/// Startup: build the spawner from the loaded configuration.
pub fn init_target_spawner(mut commands: Commands, config: Res<RangeConfig>) {
    let spawner = TargetSpawner::from_config(&config);
    println!(
        "✓ Target spawner: {} slots, max {} active, {:?} mode",
        spawner.slots().len(),
        spawner.limit(),
        config.operating_mode
    );
    commands.insert_resource(spawner);
}

/// Fill empty slots whenever the wave timer fires.
///
/// The whole wave is skipped while more than `max_dynamic_bodies` simulated
/// bodies exist.
pub fn target_wave_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    spawner: Option<ResMut<TargetSpawner>>,
    q_bodies: Query<&RigidBody>,
    mut commands: Commands,
) {
    let Some(mut spawner) = spawner else {
        return;
    };
    if !spawner.wave_due(time.delta()) {
        return;
    }

    let dynamic = q_bodies
        .iter()
        .filter(|body| **body == RigidBody::Dynamic)
        .count();
    if dynamic > config.max_dynamic_bodies {
        warn!("[spawner] {dynamic} dynamic bodies exceed the budget; wave skipped");
        return;
    }

    let plan = spawner.plan_wave();
    let physics = spawner.target_physics;
    for &slot in &plan {
        let position = spawner.slots()[slot];
        let target = spawn_target(&mut commands, &config, slot, position, physics);
        spawner.occupy(slot, target);
    }
    if !plan.is_empty() {
        debug!("[spawner] wave filled slots {plan:?}");
    }
}

/// Log and repair slot-table disagreements that outlive the cleanup window.
pub fn slot_audit_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    spawner: Option<ResMut<TargetSpawner>>,
    q_targets: Query<(Entity, &Target)>,
) {
    let Some(mut spawner) = spawner else {
        return;
    };
    let live: HashMap<Entity, usize> = q_targets.iter().map(|(e, t)| (e, t.slot)).collect();
    for error in spawner.reconcile(time.delta_secs(), config.slot_mismatch_window, &live) {
        error!("[spawner] {error}; repaired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_slots(max_active: usize) -> TargetSpawner {
        TargetSpawner::new(
            vec![
                Vec3::new(-1.5, 1.0, -5.0),
                Vec3::new(0.0, 1.0, -5.0),
                Vec3::new(1.5, 1.0, -5.0),
            ],
            WaveSettings {
                period_secs: 3.0,
                max_active,
                target_physics: true,
            },
        )
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn waves_fill_lowest_empty_slots_up_to_cap() {
        let mut spawner = three_slots(2);
        let e = entities(3);
        assert_eq!(spawner.plan_wave(), vec![0, 1]);
        spawner.occupy(0, e[0]);
        spawner.occupy(1, e[1]);
        assert!(spawner.plan_wave().is_empty());

        assert!(spawner.release(0, e[0]));
        assert_eq!(spawner.plan_wave(), vec![0]);
        assert_eq!(spawner.occupant(1), Some(e[1]));
    }

    #[test]
    fn cap_never_exceeds_slot_count() {
        let spawner = three_slots(10);
        assert_eq!(spawner.limit(), 3);
        assert_eq!(spawner.plan_wave(), vec![0, 1, 2]);
    }

    #[test]
    fn release_only_frees_matching_entity() {
        let mut spawner = three_slots(3);
        let e = entities(2);
        spawner.occupy(2, e[0]);
        assert!(!spawner.release(2, e[1]));
        assert!(!spawner.release(7, e[0]));
        assert_eq!(spawner.occupant(2), Some(e[0]));
    }

    #[test]
    fn first_wave_is_immediate_then_periodic() {
        let mut spawner = three_slots(3);
        assert!(spawner.wave_due(Duration::ZERO));
        assert!(!spawner.wave_due(Duration::from_secs_f32(1.0)));
        assert!(!spawner.wave_due(Duration::from_secs_f32(1.5)));
        assert!(spawner.wave_due(Duration::from_secs_f32(0.6)));
    }

    #[test]
    fn reconcile_waits_out_window_then_repairs() {
        let mut spawner = three_slots(3);
        let e = entities(2);
        // Table says e[0] holds slot 1 but e[0] no longer exists.
        spawner.occupy(1, e[0]);
        let live = HashMap::new();
        assert!(spawner.reconcile(0.3, 0.5, &live).is_empty());
        let errors = spawner.reconcile(0.3, 0.5, &live);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            RangeError::SlotMismatch { slot: 1, recorded: Some(_), .. }
        ));
        assert_eq!(spawner.occupant(1), None);

        // A live target claiming an empty slot is written back.
        let live = HashMap::from([(e[1], 2)]);
        spawner.reconcile(0.3, 0.5, &live);
        spawner.reconcile(0.3, 0.5, &live);
        assert_eq!(spawner.occupant(2), Some(e[1]));
    }

    #[test]
    fn consistent_table_resets_mismatch_clock() {
        let mut spawner = three_slots(3);
        let e = entities(1);
        spawner.occupy(0, e[0]);
        let empty = HashMap::new();
        let live = HashMap::from([(e[0], 0)]);
        assert!(spawner.reconcile(0.4, 0.5, &empty).is_empty());
        assert!(spawner.reconcile(0.4, 0.5, &live).is_empty());
        assert!(spawner.reconcile(0.4, 0.5, &empty).is_empty());
    }
}
