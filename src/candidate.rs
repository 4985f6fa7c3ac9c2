//! Candidate resolution for grab actions.
//!
//! Two strategies, in priority order:
//!
//! 1. **Pointer ray**: manipulators with a [`crate::possession::PointerProbe`]
//!    take whatever eligible attachable the ray currently hits, even if
//!    something else is closer.
//! 2. **Proximity**: the eligible attachable with the smallest squared
//!    distance within the grab radius (boundary included).  Ties keep the first entry in registry
//!    order, so repeated calls on the same world return the same entity.
//!
//! Whichever strategy picks, a candidate already bound to another manipulator
//! yields no candidate at all; there is no fallback to the runner-up.

use crate::registry::AttachableRegistry;
use bevy::prelude::*;

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    PointerRay,
    Proximity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    pub source: CandidateSource,
    /// World-space distance between the manipulator and the candidate.
    pub distance: f32,
}

/// What the resolver needs to know about one attachable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateInfo {
    pub position: Vec3,
    /// Already bound to some manipulator.
    pub bound: bool,
}

/// Closest `(entity, distance²)` at most `radius` from `origin`.
///
/// An entry exactly on the radius counts, matching the inclusive desktop
/// reach gate.  Ranking uses a strict `<` so the first of several
/// equidistant entries wins.
pub fn closest_within_radius(
    origin: Vec3,
    radius: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<(Entity, f32)> {
    let radius_sq = radius * radius;
    let mut best: Option<(Entity, f32)> = None;
    for (entity, position) in candidates {
        let d2 = origin.distance_squared(position);
        if d2 > radius_sq {
            continue;
        }
        if best.is_none_or(|(_, best_d2)| d2 < best_d2) {
            best = Some((entity, d2));
        }
    }
    best
}

/// Resolve the attachable a manipulator at `origin` should bind.
///
/// `ray_hit` is the entity under the manipulator's pointer (if it has one);
/// `lookup` returns `None` for entities that are gone or not attachable.
pub fn resolve_candidate(
    origin: Vec3,
    radius: f32,
    ray_hit: Option<Entity>,
    registry: &AttachableRegistry,
    lookup: impl Fn(Entity) -> Option<CandidateInfo>,
) -> Option<Candidate> {
    if let Some(hit) = ray_hit {
        if let Some(info) = lookup(hit) {
            return (!info.bound).then(|| Candidate {
                entity: hit,
                source: CandidateSource::PointerRay,
                distance: origin.distance(info.position),
            });
        }
    }

    let eligible = registry
        .entries()
        .iter()
        .filter_map(|&e| lookup(e).map(|info| (e, info.position)));
    let (entity, d2) = closest_within_radius(origin, radius, eligible)?;
    if lookup(entity).is_some_and(|info| info.bound) {
        return None;
    }
    Some(Candidate {
        entity,
        source: CandidateSource::Proximity,
        distance: d2.sqrt(),
    })
}
