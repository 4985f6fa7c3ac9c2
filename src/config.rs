//! Runtime configuration loaded from `assets/range.toml`.
//!
//! [`RangeConfig`] is a Bevy [`Resource`] holding a flat set of named
//! numeric/string parameters that mirrors [`crate::constants`].  At startup,
//! [`load_range_config`] reads `assets/range.toml` and overwrites the defaults
//! with any values present in the file.  Missing keys fall back to the
//! compile-time defaults, so a minimal TOML can override just the values you
//! care about:
//!
//! ```toml
//! operating_mode = "safe"
//! spawn_slots = "-2 1 -6, 0 1 -6, 2 1 -6, 0 2 -8"
//! projectile_speed = 14.0
//! ```
//!
//! The `RANGE_MODE` environment variable overrides `operating_mode` after the
//! file has been read.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `RangeConfig::default()`.

use crate::constants::*;
use crate::error::{validate_non_negative, validate_positive, RangeError, RangeResult};
use bevy::prelude::*;
use serde::Deserialize;
use std::str::FromStr;

/// Target-spawner operating mode.
///
/// Modes only rescale the wave schedule and the physics participation of new
/// targets; they never change slot identity or indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Configured period and cap, dynamic targets.
    #[default]
    Normal,
    /// Doubled period, cap lowered to [`SAFE_MODE_MAX_ACTIVE`].
    Safe,
    /// Targets spawn as static bodies and never join the simulation.
    Lite,
}

impl FromStr for OperatingMode {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "" => Ok(Self::Normal),
            "safe" => Ok(Self::Safe),
            "lite" => Ok(Self::Lite),
            other => Err(RangeError::ConfigParse {
                what: "operating_mode",
                detail: format!("unknown mode '{other}' (expected normal, safe or lite)"),
            }),
        }
    }
}

/// Effective wave parameters after the operating mode has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSettings {
    pub period_secs: f32,
    pub max_active: usize,
    /// `false` spawns targets as static bodies.
    pub target_physics: bool,
}

/// Runtime-tunable interaction and gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    // ── Grab: Candidate Resolution ───────────────────────────────────────────
    pub hand_grab_radius: f32,
    pub viewpoint_grab_radius: f32,
    pub pointer_ray_length: f32,
    pub registry_refresh_secs: f32,

    // ── Desktop Carry ────────────────────────────────────────────────────────
    pub pickup_distance: f32,
    pub extended_reach_distance: f32,
    pub auto_extend_reach: bool,
    pub drop_distance: f32,
    pub drop_lower: f32,
    pub release_default_mass: f32,

    // ── Launcher / Projectile ────────────────────────────────────────────────
    pub muzzle_offset_x: f32,
    pub muzzle_offset_y: f32,
    pub muzzle_offset_z: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_radius: f32,
    pub projectile_mass: f32,
    pub projectile_damping: f32,
    pub velocity_ready_window: f32,
    pub velocity_reapply_window: f32,

    // ── Targets ──────────────────────────────────────────────────────────────
    pub spawn_slots: String,
    pub wave_period: f32,
    pub wave_period_multiplier: f32,
    pub max_active_targets: usize,
    pub max_dynamic_bodies: usize,
    pub operating_mode: OperatingMode,
    pub target_mass: f32,
    pub target_damping: f32,
    pub target_box_size: f32,
    pub target_cone_height: f32,
    pub target_cone_radius: f32,
    pub hit_cleanup_delay: f32,
    pub slot_mismatch_window: f32,

    // ── Input / Locomotion ───────────────────────────────────────────────────
    pub input_poll_interval: f32,
    pub stick_deadzone: f32,
    pub move_speed: f32,
    pub rotate_speed_deg: f32,
    pub mouse_look_sensitivity: f32,
    pub eye_height: f32,

    // ── Rendering ────────────────────────────────────────────────────────────
    pub hud_font_size: f32,

    // ── Audio ────────────────────────────────────────────────────────────────
    pub hit_sound: String,
    pub fire_sound: String,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            // Grab
            hand_grab_radius: HAND_GRAB_RADIUS,
            viewpoint_grab_radius: VIEWPOINT_GRAB_RADIUS,
            pointer_ray_length: POINTER_RAY_LENGTH,
            registry_refresh_secs: REGISTRY_REFRESH_SECS,
            // Desktop carry
            pickup_distance: PICKUP_DISTANCE,
            extended_reach_distance: EXTENDED_REACH_DISTANCE,
            auto_extend_reach: AUTO_EXTEND_REACH,
            drop_distance: DROP_DISTANCE,
            drop_lower: DROP_LOWER,
            release_default_mass: RELEASE_DEFAULT_MASS,
            // Launcher / projectile
            muzzle_offset_x: MUZZLE_OFFSET_X,
            muzzle_offset_y: MUZZLE_OFFSET_Y,
            muzzle_offset_z: MUZZLE_OFFSET_Z,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            projectile_radius: PROJECTILE_RADIUS,
            projectile_mass: PROJECTILE_MASS,
            projectile_damping: PROJECTILE_DAMPING,
            velocity_ready_window: VELOCITY_READY_WINDOW,
            velocity_reapply_window: VELOCITY_REAPPLY_WINDOW,
            // Targets
            spawn_slots: SPAWN_SLOTS.to_string(),
            wave_period: WAVE_PERIOD,
            wave_period_multiplier: WAVE_PERIOD_MULTIPLIER,
            max_active_targets: MAX_ACTIVE_TARGETS,
            max_dynamic_bodies: MAX_DYNAMIC_BODIES,
            operating_mode: OPERATING_MODE.parse().unwrap_or_default(),
            target_mass: TARGET_MASS,
            target_damping: TARGET_DAMPING,
            target_box_size: TARGET_BOX_SIZE,
            target_cone_height: TARGET_CONE_HEIGHT,
            target_cone_radius: TARGET_CONE_RADIUS,
            hit_cleanup_delay: HIT_CLEANUP_DELAY,
            slot_mismatch_window: SLOT_MISMATCH_WINDOW,
            // Input / locomotion
            input_poll_interval: INPUT_POLL_INTERVAL,
            stick_deadzone: STICK_DEADZONE,
            move_speed: MOVE_SPEED,
            rotate_speed_deg: ROTATE_SPEED_DEG,
            mouse_look_sensitivity: MOUSE_LOOK_SENSITIVITY,
            eye_height: EYE_HEIGHT,
            // Rendering
            hud_font_size: HUD_FONT_SIZE,
            // Audio
            hit_sound: HIT_SOUND.to_string(),
            fire_sound: FIRE_SOUND.to_string(),
        }
    }
}

impl RangeConfig {
    /// Muzzle offset in the launcher's local frame.
    pub fn muzzle_offset(&self) -> Vec3 {
        Vec3::new(
            self.muzzle_offset_x,
            self.muzzle_offset_y,
            self.muzzle_offset_z,
        )
    }

    /// Parsed spawn slots, or the single fallback slot when the string is
    /// empty or malformed.
    pub fn spawn_slot_positions(&self) -> Vec<Vec3> {
        match parse_slots(&self.spawn_slots) {
            Ok(slots) => slots,
            Err(e) => {
                warn!("[config] {e}; using the fallback slot");
                vec![Vec3::from_array(FALLBACK_SLOT)]
            }
        }
    }

    /// Apply the operating mode to the base wave parameters.
    pub fn wave_settings(&self) -> WaveSettings {
        let base_period = self.wave_period * self.wave_period_multiplier;
        match self.operating_mode {
            OperatingMode::Normal => WaveSettings {
                period_secs: base_period,
                max_active: self.max_active_targets,
                target_physics: true,
            },
            OperatingMode::Safe => WaveSettings {
                period_secs: base_period * SAFE_MODE_PERIOD_MULTIPLIER,
                max_active: self.max_active_targets.min(SAFE_MODE_MAX_ACTIVE),
                target_physics: true,
            },
            OperatingMode::Lite => WaveSettings {
                period_secs: base_period,
                max_active: self.max_active_targets,
                target_physics: false,
            },
        }
    }
}

/// Parse a slot list of the form `"x y z, x y z, ..."`.
///
/// Every entry must hold exactly three numbers; an empty list is an error.
pub fn parse_slots(s: &str) -> RangeResult<Vec<Vec3>> {
    let mut slots = Vec::new();
    for entry in s.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let coords: Vec<f32> = entry
            .split_whitespace()
            .map(|c| c.parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|e| RangeError::ConfigParse {
                what: "spawn_slots",
                detail: format!("'{entry}': {e}"),
            })?;
        let &[x, y, z] = coords.as_slice() else {
            return Err(RangeError::ConfigParse {
                what: "spawn_slots",
                detail: format!("'{entry}' must have exactly 3 coordinates"),
            });
        };
        slots.push(Vec3::new(x, y, z));
    }
    if slots.is_empty() {
        return Err(RangeError::ConfigParse {
            what: "spawn_slots",
            detail: "no slots given".to_string(),
        });
    }
    Ok(slots)
}

/// Check every value whose misconfiguration would break an invariant.
pub fn validate_config(config: &RangeConfig) -> RangeResult<()> {
    validate_positive("hand_grab_radius", config.hand_grab_radius)?;
    validate_positive("viewpoint_grab_radius", config.viewpoint_grab_radius)?;
    validate_positive("registry_refresh_secs", config.registry_refresh_secs)?;
    validate_positive("pickup_distance", config.pickup_distance)?;
    validate_positive("projectile_speed", config.projectile_speed)?;
    validate_positive("projectile_lifetime", config.projectile_lifetime)?;
    validate_positive("wave_period", config.wave_period)?;
    validate_positive("wave_period_multiplier", config.wave_period_multiplier)?;
    validate_positive("release_default_mass", config.release_default_mass)?;
    validate_positive("input_poll_interval", config.input_poll_interval)?;
    validate_non_negative("velocity_ready_window", config.velocity_ready_window)?;
    validate_non_negative("velocity_reapply_window", config.velocity_reapply_window)?;
    validate_non_negative("hit_cleanup_delay", config.hit_cleanup_delay)?;
    validate_non_negative("slot_mismatch_window", config.slot_mismatch_window)?;
    if config.extended_reach_distance < config.pickup_distance {
        return Err(RangeError::UnsafeConstant {
            name: "extended_reach_distance",
            value: config.extended_reach_distance,
            safe_range: "[pickup_distance, ∞)",
        });
    }
    parse_slots(&config.spawn_slots)?;
    Ok(())
}

/// Startup system: attempt to load `assets/range.toml` and overwrite the
/// `RangeConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are reported but do not abort the scene; a missing file is not an error.
pub fn load_range_config(mut config: ResMut<RangeConfig>) {
    let path = "assets/range.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<RangeConfig>(&contents) {
            Ok(loaded) => match validate_config(&loaded) {
                Ok(()) => {
                    *config = loaded;
                    println!("✓ Loaded range config from {path}");
                }
                Err(e) => eprintln!("⚠ Rejected {path}: {e}; using defaults"),
            },
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            println!("ℹ No {path} found; using compiled defaults");
        }
    }

    if let Ok(mode) = std::env::var("RANGE_MODE") {
        match mode.parse::<OperatingMode>() {
            Ok(parsed) => {
                config.operating_mode = parsed;
                println!("✓ Operating mode {parsed:?} (RANGE_MODE)");
            }
            Err(e) => eprintln!("⚠ {e}"),
        }
    }
}
