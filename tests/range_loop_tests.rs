//! Headless end-to-end range loop: waves, hits, respawn, desktop firing.
//!
//! [`MinimalPlugins`] plus the range plugins; Rapier is not stepped, so
//! collisions are injected as `CollisionEvent` messages and the projectile
//! body never becomes ready.
//!
//! Covered scenarios:
//! 1. Waves fill the lowest empty slots up to the cap and refill only the
//!    slot a destroyed target freed.
//! 2. Desktop grab of the launcher through the pointer ray, one click, one
//!    projectile, gone after its lifetime.
//! 3. Too many dynamic bodies skip a whole wave; the next wave fills once the
//!    count is back within budget.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use bevy_rapier3d::rapier::geometry::CollisionEventFlags;
use firing_range::config::RangeConfig;
use firing_range::feedback::{FeedbackPlugin, PendingSounds, RangeScore, SoundCue};
use firing_range::launcher::{LaunchVelocity, Projectile, ProjectileLauncher};
use firing_range::possession::{DesktopCarry, PointerProbe, Possession};
use firing_range::registry::EntityKind;
use firing_range::targets::{Target, TargetSpawner, TargetsPlugin};
use firing_range::FiringRangePlugin;
use std::time::Duration;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn step(app: &mut App) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn live_targets(app: &mut App) -> Vec<(usize, Entity)> {
    let mut q = app.world_mut().query::<(Entity, &Target)>();
    let mut all: Vec<_> = q.iter(app.world()).map(|(e, t)| (t.slot, e)).collect();
    all.sort();
    all
}

fn projectiles(app: &mut App) -> Vec<Entity> {
    let mut q = app
        .world_mut()
        .query_filtered::<Entity, With<Projectile>>();
    q.iter(app.world()).collect()
}

fn click<T>(app: &mut App, button: T)
where
    T: Copy + Eq + std::hash::Hash + Send + Sync + 'static,
{
    app.world_mut().resource_mut::<ButtonInput<T>>().press(button);
    app.update();
    let mut input = app.world_mut().resource_mut::<ButtonInput<T>>();
    input.release(button);
    input.clear();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn destroyed_target_frees_only_its_slot_for_the_next_wave() {
    let mut app = App::new();
    app.insert_resource(RangeConfig {
        max_active_targets: 2,
        ..RangeConfig::default()
    });
    app.add_plugins((MinimalPlugins, TargetsPlugin, FeedbackPlugin));
    step(&mut app);

    // First wave is immediate.
    app.update();
    let first = live_targets(&mut app);
    assert_eq!(first.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![0, 1]);

    let projectile = app.world_mut().spawn(EntityKind::Projectile).id();
    app.world_mut().write_message(CollisionEvent::Started(
        first[0].1,
        projectile,
        CollisionEventFlags::empty(),
    ));
    run(&mut app, 2);
    assert_eq!(app.world().resource::<RangeScore>().hits, 1);
    assert_eq!(live_targets(&mut app), vec![first[1]]);
    assert_eq!(app.world().resource::<TargetSpawner>().occupant(0), None);

    // Next wave (3 s period) refills slot 0 only; slot 2 stays empty.
    run(&mut app, 35);
    let refilled = live_targets(&mut app);
    assert_eq!(refilled.len(), 2);
    assert_eq!(refilled[0].0, 0);
    assert_ne!(refilled[0].1, first[0].1);
    assert_eq!(refilled[1], first[1]);
    assert_eq!(app.world().resource::<TargetSpawner>().occupant(2), None);
}

#[test]
fn wave_is_skipped_while_dynamic_bodies_exceed_the_budget() {
    let mut app = App::new();
    app.insert_resource(RangeConfig {
        max_dynamic_bodies: 2,
        ..RangeConfig::default()
    });
    app.add_plugins((MinimalPlugins, TargetsPlugin, FeedbackPlugin));
    step(&mut app);
    let crates: Vec<Entity> = (0..3)
        .map(|_| app.world_mut().spawn(RigidBody::Dynamic).id())
        .collect();

    // First wave sees three dynamic bodies against a budget of two.
    app.update();
    assert!(live_targets(&mut app).is_empty());
    let spawner = app.world().resource::<TargetSpawner>();
    assert!((0..spawner.slots().len()).all(|slot| spawner.occupant(slot).is_none()));

    // Back at the budget (not above it): the next wave fills every slot.
    app.world_mut().entity_mut(crates[0]).despawn();
    run(&mut app, 35);
    let filled = live_targets(&mut app);
    assert_eq!(filled.iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![0, 1, 2]);
    let spawner = app.world().resource::<TargetSpawner>();
    for (slot, target) in filled {
        assert_eq!(spawner.occupant(slot), Some(target));
    }
}

#[test]
fn desktop_fire_spawns_one_projectile_that_expires() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, FiringRangePlugin));
    step(&mut app);
    app.update();

    let launcher = {
        let mut q = app
            .world_mut()
            .query_filtered::<Entity, With<ProjectileLauncher>>();
        q.single(app.world()).expect("scene has one launcher")
    };
    let viewpoint = {
        let mut q = app
            .world_mut()
            .query_filtered::<Entity, With<DesktopCarry>>();
        q.single(app.world()).expect("scene has one viewpoint")
    };

    // Aim at the launcher; without a Rapier context the probe keeps this hit.
    app.world_mut()
        .get_mut::<PointerProbe>(viewpoint)
        .expect("viewpoint probe")
        .hit = Some(launcher);
    click(&mut app, KeyCode::KeyE);
    assert_eq!(
        app.world().get::<Possession>(viewpoint).and_then(|p| p.target()),
        Some(launcher)
    );
    assert_eq!(
        app.world().get::<RigidBody>(launcher),
        Some(&RigidBody::KinematicPositionBased)
    );

    click(&mut app, MouseButton::Left);
    let shots = projectiles(&mut app);
    assert_eq!(shots.len(), 1);
    assert!(app
        .world()
        .resource::<PendingSounds>()
        .0
        .contains(&SoundCue::Fire));

    // Launch velocity points down the barrel at the configured speed.
    let speed = app.world().resource::<RangeConfig>().projectile_speed;
    let linvel = app
        .world()
        .get::<LaunchVelocity>(shots[0])
        .map(|l| l.linvel)
        .expect("launch velocity pending");
    assert!(linvel.abs_diff_eq(Vec3::new(0.0, 0.0, -speed), 1e-3));

    run(&mut app, 30);
    assert_eq!(projectiles(&mut app), shots);
    run(&mut app, 15);
    assert!(projectiles(&mut app).is_empty());
}
