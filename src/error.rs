//! Range-specific error types.
//!
//! Interaction failures (nothing to grab, firing an empty hand, a full spawn
//! wave) are not errors and never reach this module.  `RangeError` covers
//! the cases that are worth reporting: bad configuration, an unreadable
//! manipulator pose, and the two invariant violations that indicate a bug.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::error::{RangeError, RangeResult};
//!
//! fn check(speed: f32) -> RangeResult<()> {
//!     validate_positive("projectile_speed", speed)?;
//!     Ok(())
//! }
//! ```

use bevy::prelude::Entity;
use std::fmt;

/// Top-level error enum for the firing range.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeError {
    /// A configuration string could not be parsed.
    ConfigParse {
        /// Name of the parameter (or file) being parsed.
        what: &'static str,
        /// Parser message or offending fragment.
        detail: String,
    },

    /// A configuration value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the parameter (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// The world pose of a manipulator could not be computed this frame
    /// (entity despawned or broken hierarchy).
    MissingPose {
        /// The manipulator entity.
        manipulator: Entity,
    },

    /// An attachable is bound to more than one manipulator at once.
    DoubleBinding {
        /// The attachable.
        attachable: Entity,
        /// Every manipulator claiming it.
        holders: Vec<Entity>,
    },

    /// The spawner slot table disagreed with the live targets for longer than
    /// the cleanup window.
    SlotMismatch {
        /// Slot index.
        slot: usize,
        /// Occupant recorded in the table, if any.
        recorded: Option<Entity>,
        /// Seconds the mismatch persisted.
        persisted_secs: f32,
    },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::ConfigParse { what, detail } => {
                write!(f, "failed to parse {}: {}", what, detail)
            }
            RangeError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "parameter '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            RangeError::MissingPose { manipulator } => {
                write!(f, "world pose of manipulator {:?} is unavailable", manipulator)
            }
            RangeError::DoubleBinding {
                attachable,
                holders,
            } => write!(
                f,
                "attachable {:?} is bound to {} manipulators: {:?}",
                attachable,
                holders.len(),
                holders
            ),
            RangeError::SlotMismatch {
                slot,
                recorded,
                persisted_secs,
            } => write!(
                f,
                "slot {} records {:?} but no matching target exists (persisted {:.2}s)",
                slot, recorded, persisted_secs
            ),
        }
    }
}

impl std::error::Error for RangeError {}

/// Convenience alias: a `Result` using `RangeError` as the error type.
pub type RangeResult<T> = Result<T, RangeError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> RangeResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RangeError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> RangeResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RangeError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}
