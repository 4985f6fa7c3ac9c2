//! Entity-kind tags, the [`Attachable`] component, and the cached snapshot of
//! everything a manipulator may grab.
//!
//! Collision filtering and eligibility checks compare [`EntityKind`] values;
//! nothing is inferred from shape or component layout.

use crate::config::RangeConfig;
use bevy::prelude::*;

/// Explicit kind tag carried by every entity the range spawns.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Grabbable,
    Weapon,
    Target,
    Projectile,
    Manipulator,
    Scenery,
}

/// Eligibility tag of an attachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachableKind {
    Grabbable,
    Weapon,
    Target,
}

impl From<AttachableKind> for EntityKind {
    fn from(kind: AttachableKind) -> Self {
        match kind {
            AttachableKind::Grabbable => EntityKind::Grabbable,
            AttachableKind::Weapon => EntityKind::Weapon,
            AttachableKind::Target => EntityKind::Target,
        }
    }
}

/// Physics participation of an attachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalMode {
    /// Simulated dynamic body.
    Free,
    /// Kinematic body driven by a manipulator.
    Attached,
    /// Fixed body; never moved by the simulation.
    Static,
}

/// Marks an entity as eligible for possession.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachable {
    pub kind: AttachableKind,
    pub mode: PhysicalMode,
}

impl Attachable {
    pub fn free(kind: AttachableKind) -> Self {
        Self {
            kind,
            mode: PhysicalMode::Free,
        }
    }
}

/// Back-reference from an attached entity to the manipulator holding it.
///
/// The manipulator's [`crate::possession::Possession`] is authoritative; this
/// component mirrors it for cheap lookups (launcher arming, audits).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldBy(pub Entity);

/// Cached, ordered snapshot of all attachables.
///
/// Rebuilt every `registry_refresh_secs` or as soon as a new attachable
/// appears.  Entries are sorted so proximity ties resolve identically from one
/// frame to the next.  The snapshot may briefly hold despawned entities;
/// readers skip entries they cannot look up.
#[derive(Resource, Debug, Default)]
pub struct AttachableRegistry {
    entries: Vec<Entity>,
    since_refresh: f32,
    dirty: bool,
}

impl AttachableRegistry {
    pub fn entries(&self) -> &[Entity] {
        &self.entries
    }

    /// Request a rebuild on the next refresh pass.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Advance the refresh clock; `true` when a rebuild is due.
    pub fn tick(&mut self, dt: f32, interval: f32) -> bool {
        self.since_refresh += dt;
        self.dirty || self.since_refresh >= interval
    }

    /// Replace the snapshot with `entities`, sorted.
    pub fn rebuild(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.entries.clear();
        self.entries.extend(entities);
        self.entries.sort();
        self.since_refresh = 0.0;
        self.dirty = false;
    }
}

/// Rebuild the [`AttachableRegistry`] snapshot when it is stale or when new
/// attachables were spawned since the last frame.
pub fn refresh_registry_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    mut registry: ResMut<AttachableRegistry>,
    q_all: Query<Entity, With<Attachable>>,
    q_added: Query<(), Added<Attachable>>,
) {
    if !q_added.is_empty() {
        registry.mark_dirty();
    }
    if registry.tick(time.delta_secs(), config.registry_refresh_secs) {
        registry.rebuild(q_all.iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_due_after_interval() {
        let mut registry = AttachableRegistry::default();
        registry.rebuild(std::iter::empty());
        assert!(!registry.tick(0.4, 1.0));
        assert!(!registry.tick(0.4, 1.0));
        assert!(registry.tick(0.4, 1.0));
    }

    #[test]
    fn dirty_forces_refresh_and_rebuild_clears_it() {
        let mut registry = AttachableRegistry::default();
        registry.rebuild(std::iter::empty());
        registry.mark_dirty();
        assert!(registry.tick(0.0, 1.0));
        registry.rebuild(std::iter::empty());
        assert!(!registry.tick(0.0, 1.0));
    }

    #[test]
    fn new_attachables_appear_in_the_next_frame() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(RangeConfig::default());
        app.init_resource::<AttachableRegistry>();
        app.add_systems(Update, refresh_registry_system);

        let a = app
            .world_mut()
            .spawn(Attachable::free(AttachableKind::Grabbable))
            .id();
        app.update();
        assert_eq!(app.world().resource::<AttachableRegistry>().entries(), &[a]);

        let b = app
            .world_mut()
            .spawn(Attachable::free(AttachableKind::Weapon))
            .id();
        app.update();
        let entries = app.world().resource::<AttachableRegistry>().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&a) && entries.contains(&b));
    }
}
