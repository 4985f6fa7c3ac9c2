//! Rendering: meshes from [`VisualParams`], highlight tint, camera, light,
//! score HUD, the pointer-ray gizmo overlay and sound cue playback.
//!
//! Gameplay entities never carry render components when spawned.  Everything
//! visual is attached here, so the gameplay plugins run headless.
//!
//! ## System Responsibilities
//!
//! | System                          | Schedule | Purpose                                   |
//! |---------------------------------|----------|-------------------------------------------|
//! | `setup_lighting`                | Startup  | Directional sun                           |
//! | `setup_hud_score`               | Startup  | Spawn permanent score HUD node            |
//! | `load_sound_bank`               | Startup  | Load cue clips found under `assets/`      |
//! | `attach_visual_mesh_system`     | Update   | `Mesh3d` + material for new visuals       |
//! | `attach_viewpoint_camera_system`| Update   | `Camera3d` on the viewpoint manipulator   |
//! | `highlight_tint_system`         | Update   | Brighten / restore highlighted materials  |
//! | `hud_score_display_system`      | Update   | Refresh score HUD text                    |
//! | `overlay_toggle_system`         | Update   | F3 toggles the pointer-ray overlay        |
//! | `pointer_ray_gizmo_system`      | Update   | Draw pointer rays when enabled            |
//! | `play_sound_cues_system`        | PostUpdate | One-shot player per queued cue          |

use crate::config::RangeConfig;
use crate::feedback::{Highlighted, PendingSounds, RangeScore, SoundCue};
use crate::possession::{Manipulator, ManipulatorRole, PointerProbe};
use crate::scene::{ShapeKind, VisualParams};
use crate::{RangeSet, StartupSet};
use bevy::prelude::*;
use std::path::Path;

// ── Overlay state resource ────────────────────────────────────────────────────

/// Debug overlay layers drawn with gizmos.
#[derive(Resource, Clone, Debug, Default)]
pub struct OverlayState {
    /// Draw every pointer probe's ray, green when it hits an attachable.
    pub show_pointer_rays: bool,
}

/// Marker for the permanent score HUD node.
#[derive(Component)]
pub struct HudScoreDisplay;

/// Unlit base colour of an entity's own material, restored when the highlight
/// goes away.
#[derive(Component, Debug, Clone, Copy)]
pub struct BaseColor(pub Color);

const HIGHLIGHT_BOOST: f32 = 0.35;

/// Clip per sound cue; `None` keeps that cue silent.
#[derive(Resource, Debug, Default, Clone)]
pub struct SoundBank {
    pub hit: Option<Handle<AudioSource>>,
    pub fire: Option<Handle<AudioSource>>,
}

impl SoundBank {
    pub fn clip(&self, cue: SoundCue) -> Option<&Handle<AudioSource>> {
        match cue {
            SoundCue::Hit => self.hit.as_ref(),
            SoundCue::Fire => self.fire.as_ref(),
        }
    }
}

/// Mesh for a primitive shape.
pub fn shape_mesh(shape: ShapeKind) -> Mesh {
    match shape {
        ShapeKind::Box { size } => Mesh::from(Cuboid::new(size.x, size.y, size.z)),
        ShapeKind::Cone { height, radius } => Mesh::from(Cone { radius, height }),
        ShapeKind::Sphere { radius } => Mesh::from(Sphere::new(radius)),
    }
}

/// Lighter version of `color` used while highlighted.
pub fn highlight_color(color: Color) -> Color {
    let c = color.to_srgba();
    Color::srgba(
        (c.red + HIGHLIGHT_BOOST).min(1.0),
        (c.green + HIGHLIGHT_BOOST).min(1.0),
        (c.blue + HIGHLIGHT_BOOST).min(1.0),
        c.alpha,
    )
}

pub fn score_text(score: &RangeScore) -> String {
    format!("Hits: {}", score.hits)
}

// ── Startup ───────────────────────────────────────────────────────────────────

pub fn setup_lighting(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 9_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Spawn the permanent top-left score HUD.
pub fn setup_hud_score(mut commands: Commands, config: Res<RangeConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                ..default()
            },
            HudScoreDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(score_text(&RangeScore::default())),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.88, 0.45)),
            ));
        });
}

/// Load the configured cue clips that exist under `assets/`.
pub fn load_sound_bank(
    mut commands: Commands,
    config: Res<RangeConfig>,
    asset_server: Res<AssetServer>,
) {
    let load = |cue: SoundCue, path: &str| {
        if Path::new("assets").join(path).is_file() {
            Some(asset_server.load(path.to_owned()))
        } else {
            println!("ℹ No clip at assets/{path}; {cue:?} cue is silent");
            None
        }
    };
    commands.insert_resource(SoundBank {
        hit: load(SoundCue::Hit, &config.hit_sound),
        fire: load(SoundCue::Fire, &config.fire_sound),
    });
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Attach a mesh and an entity-owned material to every new [`VisualParams`].
///
/// Only entities added since the previous frame are visited.
pub fn attach_visual_mesh_system(
    mut commands: Commands,
    query: Query<(Entity, &VisualParams), Added<VisualParams>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, visual) in query.iter() {
        let mesh = meshes.add(shape_mesh(visual.shape));
        let material = materials.add(StandardMaterial {
            base_color: visual.color,
            perceptual_roughness: 0.7,
            ..default()
        });
        commands.entity(entity).try_insert((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            BaseColor(visual.color),
        ));
    }
}

pub fn attach_viewpoint_camera_system(
    mut commands: Commands,
    query: Query<(Entity, &Manipulator), Added<Manipulator>>,
) {
    for (entity, manipulator) in query.iter() {
        if manipulator.role == ManipulatorRole::Viewpoint {
            commands.entity(entity).try_insert(Camera3d::default());
            info!("[rendering] camera attached to viewpoint {entity:?}");
        }
    }
}

/// Brighten newly highlighted entities and restore the ones that lost it.
pub fn highlight_tint_system(
    added: Query<(&MeshMaterial3d<StandardMaterial>, &BaseColor), Added<Highlighted>>,
    mut removed: RemovedComponents<Highlighted>,
    q_material: Query<(&MeshMaterial3d<StandardMaterial>, &BaseColor)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (handle, base) in added.iter() {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = highlight_color(base.0);
        }
    }
    for entity in removed.read() {
        let Ok((handle, base)) = q_material.get(entity) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&handle.0) {
            material.base_color = base.0;
        }
    }
}

/// Refresh the score HUD when the score changes.
pub fn hud_score_display_system(
    score: Res<RangeScore>,
    parent_query: Query<&Children, With<HudScoreDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    if !score.is_changed() {
        return;
    }
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(score_text(&score));
            }
        }
    }
}

pub fn overlay_toggle_system(keys: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<OverlayState>) {
    if keys.just_pressed(KeyCode::F3) {
        overlay.show_pointer_rays = !overlay.show_pointer_rays;
    }
}

pub fn pointer_ray_gizmo_system(
    mut gizmos: Gizmos,
    overlay: Res<OverlayState>,
    query: Query<(&GlobalTransform, &PointerProbe)>,
) {
    if !overlay.show_pointer_rays {
        return;
    }
    for (transform, probe) in query.iter() {
        let origin = transform.translation();
        let tip = origin + transform.forward() * probe.max_distance;
        let color = if probe.hit.is_some() {
            Color::srgb(0.2, 1.0, 0.3)
        } else {
            Color::srgba(1.0, 1.0, 1.0, 0.4)
        };
        gizmos.line(origin, tip, color);
    }
}

// ── PostUpdate ────────────────────────────────────────────────────────────────

/// Spawn a self-despawning audio player for every cue queued this frame.
pub fn play_sound_cues_system(
    mut commands: Commands,
    bank: Res<SoundBank>,
    sounds: Res<PendingSounds>,
) {
    for &cue in &sounds.0 {
        if let Some(clip) = bank.clip(cue) {
            commands.spawn((AudioPlayer::new(clip.clone()), PlaybackSettings::DESPAWN));
        }
    }
}

/// Meshes, camera, light, HUD, debug overlays and cue playback.  Needs
/// `DefaultPlugins`.
pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OverlayState>()
            .init_resource::<RangeScore>()
            .init_resource::<PendingSounds>()
            .init_resource::<SoundBank>()
            .add_systems(Startup, (setup_lighting, setup_hud_score))
            .add_systems(Startup, load_sound_bank.after(StartupSet::Config))
            .add_systems(
                Update,
                (
                    attach_visual_mesh_system,
                    attach_viewpoint_camera_system,
                    highlight_tint_system,
                    hud_score_display_system,
                    overlay_toggle_system,
                    pointer_ray_gizmo_system,
                )
                    .after(RangeSet::Audit),
            )
            .add_systems(
                PostUpdate,
                play_sound_cues_system.after(RangeSet::Feedback),
            );
    }
}
