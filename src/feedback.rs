//! Fire-and-forget feedback: sound cues, score, highlight.
//!
//! Gameplay systems write [`FeedbackEvent`] messages and never wait on the
//! outcome.  [`feedback_sink_system`] is the only consumer: it keeps
//! [`RangeScore`], toggles the [`Highlighted`] marker and queues sound cues in
//! [`PendingSounds`] for whatever audio backend is attached.

use crate::{RangeSchedulePlugin, RangeSet};
use bevy::prelude::*;

/// Named sound cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Fire,
    Hit,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    PlaySound(SoundCue),
    IncrementScore,
    SetHighlight { entity: Entity, on: bool },
}

/// Number of targets hit this session.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RangeScore {
    pub hits: u32,
}

/// Sound cues raised this frame.  Cleared at the start of every sink pass.
#[derive(Resource, Debug, Default)]
pub struct PendingSounds(pub Vec<SoundCue>);

/// Marker on the attachable currently under a pointer.
#[derive(Component, Debug, Default)]
pub struct Highlighted;

pub fn feedback_sink_system(
    mut events: MessageReader<FeedbackEvent>,
    mut score: ResMut<RangeScore>,
    mut sounds: ResMut<PendingSounds>,
    mut commands: Commands,
) {
    sounds.0.clear();
    for event in events.read() {
        match *event {
            FeedbackEvent::PlaySound(cue) => sounds.0.push(cue),
            FeedbackEvent::IncrementScore => score.hits += 1,
            FeedbackEvent::SetHighlight { entity, on: true } => {
                commands.entity(entity).try_insert(Highlighted);
            }
            FeedbackEvent::SetHighlight { entity, on: false } => {
                commands.entity(entity).try_remove::<Highlighted>();
            }
        }
    }
}

/// Score, sound queue and the sink system.
pub struct FeedbackPlugin;

impl Plugin for FeedbackPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.add_message::<FeedbackEvent>()
            .init_resource::<RangeScore>()
            .init_resource::<PendingSounds>()
            .add_systems(PostUpdate, feedback_sink_system.in_set(RangeSet::Feedback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, FeedbackPlugin));
        app
    }

    #[test]
    fn score_counts_increments() {
        let mut app = app();
        app.world_mut().write_message(FeedbackEvent::IncrementScore);
        app.world_mut().write_message(FeedbackEvent::IncrementScore);
        app.update();
        assert_eq!(app.world().resource::<RangeScore>().hits, 2);
    }

    #[test]
    fn sounds_last_one_frame() {
        let mut app = app();
        app.world_mut()
            .write_message(FeedbackEvent::PlaySound(SoundCue::Hit));
        app.update();
        assert_eq!(app.world().resource::<PendingSounds>().0, vec![SoundCue::Hit]);
        app.update();
        assert!(app.world().resource::<PendingSounds>().0.is_empty());
    }

    #[test]
    fn highlight_toggles_marker_and_ignores_missing_entities() {
        let mut app = app();
        let e = app.world_mut().spawn_empty().id();
        app.world_mut()
            .write_message(FeedbackEvent::SetHighlight { entity: e, on: true });
        app.update();
        assert!(app.world().entity(e).contains::<Highlighted>());

        app.world_mut()
            .write_message(FeedbackEvent::SetHighlight { entity: e, on: false });
        app.world_mut().despawn(e);
        app.world_mut()
            .write_message(FeedbackEvent::SetHighlight { entity: e, on: true });
        app.update();
    }
}
