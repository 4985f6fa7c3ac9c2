//! Centralised interaction and gameplay constants.
//!
//! All tuneable values live here so they can be found and modified in one
//! place.  [`crate::config::RangeConfig::default`] reads every value from this
//! file; `assets/range.toml` can override any subset at startup.
//!
//! Units are metres, seconds and kilograms unless noted otherwise.

// ── Grab: Candidate Resolution ────────────────────────────────────────────────

/// Proximity radius around a tracked hand inside which an attachable can be
/// grabbed.
///
/// Matches the invisible grab sphere on the controller.  Raising it makes
/// grabbing forgiving but lets a hand steal objects from a crowded table.
pub const HAND_GRAB_RADIUS: f32 = 0.3;

/// Proximity radius used by the desktop viewpoint.
///
/// Deliberately equal to [`EXTENDED_REACH_DISTANCE`]: anything further away
/// would be rejected by the pickup gate anyway.
pub const VIEWPOINT_GRAB_RADIUS: f32 = 3.0;

/// Maximum length of the viewpoint pointer ray (crosshair probe).
pub const POINTER_RAY_LENGTH: f32 = 5.0;

/// Seconds between two rebuilds of the eligible-attachable snapshot.
///
/// New attachables also trigger an immediate rebuild, so this only bounds how
/// long a silently-removed entity can linger in the snapshot.
pub const REGISTRY_REFRESH_SECS: f32 = 1.0;

// ── Desktop Carry ─────────────────────────────────────────────────────────────

/// Primary pickup threshold for the desktop viewpoint.
pub const PICKUP_DISTANCE: f32 = 1.5;

/// Fallback reach tried when the primary threshold fails.
pub const EXTENDED_REACH_DISTANCE: f32 = 3.0;

/// Whether the extended reach tier is attempted at all.
pub const AUTO_EXTEND_REACH: bool = true;

/// Distance in front of the viewpoint at which a carried object is dropped.
pub const DROP_DISTANCE: f32 = 0.8;

/// Height below the viewpoint at which a carried object is dropped.
///
/// Keeps the item below eye level so it does not spawn inside the camera.
pub const DROP_LOWER: f32 = 0.3;

/// Mass given to a released object that had no saved body configuration.
pub const RELEASE_DEFAULT_MASS: f32 = 1.0;

// ── Launcher / Projectile ─────────────────────────────────────────────────────

/// Muzzle position in the launcher's local frame (barrel points along −Z).
pub const MUZZLE_OFFSET_X: f32 = 0.0;
pub const MUZZLE_OFFSET_Y: f32 = 0.0;
pub const MUZZLE_OFFSET_Z: f32 = -0.4;

/// Projectile launch speed (m/s).
pub const PROJECTILE_SPEED: f32 = 10.0;

/// Seconds before a projectile is removed, hit or not.
pub const PROJECTILE_LIFETIME: f32 = 4.0;

/// Projectile collider radius.
pub const PROJECTILE_RADIUS: f32 = 0.05;

/// Projectile collider mass.
pub const PROJECTILE_MASS: f32 = 0.1;

/// Linear and angular damping of projectile bodies.
pub const PROJECTILE_DAMPING: f32 = 0.01;

/// Seconds a fresh projectile may wait for its rigid body before the launch
/// velocity is abandoned.
pub const VELOCITY_READY_WINDOW: f32 = 0.5;

/// Seconds during which the launch velocity is re-applied once the body exists.
///
/// Corrects bodies that were created with a residual default velocity.
pub const VELOCITY_REAPPLY_WINDOW: f32 = 0.05;

// ── Targets ───────────────────────────────────────────────────────────────────

/// Spawn slots as `"x y z, x y z, ..."`.
pub const SPAWN_SLOTS: &str = "-1.5 1 -5, 0 1 -5, 1.5 1 -5";

/// Slot used when the configured slot string is empty or malformed.
pub const FALLBACK_SLOT: [f32; 3] = [0.0, 1.0, -5.0];

/// Seconds between two spawn waves (before the mode multiplier).
pub const WAVE_PERIOD: f32 = 3.0;

/// Extra multiplier on the wave period; operating modes stack on top.
pub const WAVE_PERIOD_MULTIPLIER: f32 = 1.0;

/// Maximum number of targets alive at the same time.
pub const MAX_ACTIVE_TARGETS: usize = 3;

/// Dynamic-body budget: a wave is skipped entirely while more bodies than
/// this are being simulated.
pub const MAX_DYNAMIC_BODIES: usize = 40;

/// Operating mode name (`normal`, `safe`, `lite`).
pub const OPERATING_MODE: &str = "normal";

/// Wave period multiplier applied in `safe` mode.
pub const SAFE_MODE_PERIOD_MULTIPLIER: f32 = 2.0;

/// Max-active cap applied in `safe` mode.
pub const SAFE_MODE_MAX_ACTIVE: usize = 2;

/// Target collider mass.
pub const TARGET_MASS: f32 = 0.6;

/// Target linear and angular damping.
pub const TARGET_DAMPING: f32 = 0.02;

/// Edge length of the box target.
pub const TARGET_BOX_SIZE: f32 = 0.5;

/// Height and base radius of the cone target.
pub const TARGET_CONE_HEIGHT: f32 = 0.7;
pub const TARGET_CONE_RADIUS: f32 = 0.3;

/// Delay between a confirmed hit and the removal of the target.
///
/// Lets the current collision pass finish before the entity disappears.
pub const HIT_CLEANUP_DELAY: f32 = 0.01;

/// How long the slot table may disagree with the live targets before the
/// mismatch is reported and repaired.
pub const SLOT_MISMATCH_WINDOW: f32 = 0.5;

// ── Input / Locomotion ────────────────────────────────────────────────────────

/// Minimum interval between two gamepad axis polls.
pub const INPUT_POLL_INTERVAL: f32 = 0.05;

/// Stick deadzone applied by the locomotion consumer.
pub const STICK_DEADZONE: f32 = 0.15;

/// Rig translation speed (m/s).
pub const MOVE_SPEED: f32 = 2.0;

/// Rig yaw speed (degrees/s).
pub const ROTATE_SPEED_DEG: f32 = 80.0;

/// Mouse-look sensitivity (radians per pixel).
pub const MOUSE_LOOK_SENSITIVITY: f32 = 0.003;

/// Viewpoint eye height above the rig origin.
pub const EYE_HEIGHT: f32 = 1.6;

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Score HUD font size.
pub const HUD_FONT_SIZE: f32 = 22.0;

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Clip played for a target hit, relative to `assets/`.  A missing file
/// leaves the cue silent.
pub const HIT_SOUND: &str = "sounds/hit.ogg";

/// Clip played when the launcher fires, relative to `assets/`.
pub const FIRE_SOUND: &str = "sounds/fire.ogg";
