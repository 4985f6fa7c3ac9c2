//! Input adapters: stick axes and desktop bindings.
//!
//! ## Axes
//!
//! Stick values arrive two ways: [`AxisSample`] messages pushed by a tracking
//! host, and a throttled poll of the preferred gamepad.  [`StickAxes`] keeps
//! the last value per stick (never a sum).  When an event and a poll land in
//! the same frame, the event wins.  Once the preferred gamepad is gone, the
//! sticks it last wrote fall back to zero; event-fed values are kept.
//!
//! ## Desktop bindings
//!
//! - **E**: grab / drop with the desktop viewpoint
//! - **Left mouse**: fire whatever the viewpoint holds
//!
//! Without a viewpoint the bindings do nothing (one warning); every other
//! input path keeps working.

use crate::config::RangeConfig;
use crate::possession::{ActionKind, DesktopCarry, ManipulatorAction, Possession};
use crate::{RangeSchedulePlugin, RangeSet};
use bevy::input::gamepad::{GamepadAxis, GamepadConnection, GamepadConnectionEvent};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stick {
    Left,
    Right,
}

/// One stick sample pushed by an event-driven source.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub stick: Stick,
    pub value: Vec2,
}

/// Merged stick state, last writer wins per stick.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct StickAxes {
    pub left: Vec2,
    pub right: Vec2,
    event_this_frame: [bool; 2],
    last_from_poll: [bool; 2],
}

impl StickAxes {
    fn index(stick: Stick) -> usize {
        match stick {
            Stick::Left => 0,
            Stick::Right => 1,
        }
    }

    pub fn get(&self, stick: Stick) -> Vec2 {
        match stick {
            Stick::Left => self.left,
            Stick::Right => self.right,
        }
    }

    fn set(&mut self, stick: Stick, value: Vec2) {
        match stick {
            Stick::Left => self.left = value,
            Stick::Right => self.right = value,
        }
    }

    /// Forget which sticks were written by events last frame.
    pub fn begin_frame(&mut self) {
        self.event_this_frame = [false; 2];
    }

    pub fn apply_event(&mut self, stick: Stick, value: Vec2) {
        let i = Self::index(stick);
        self.set(stick, value);
        self.event_this_frame[i] = true;
        self.last_from_poll[i] = false;
    }

    /// Polled value; ignored for a stick that already had an event this frame.
    pub fn apply_poll(&mut self, stick: Stick, value: Vec2) {
        let i = Self::index(stick);
        if !self.event_this_frame[i] {
            self.set(stick, value);
            self.last_from_poll[i] = true;
        }
    }

    /// Zero every stick whose current value came from a poll.
    pub fn clear_polled(&mut self) {
        for stick in [Stick::Left, Stick::Right] {
            let i = Self::index(stick);
            if self.last_from_poll[i] {
                self.set(stick, Vec2::ZERO);
                self.last_from_poll[i] = false;
            }
        }
    }
}

/// Seconds since the gamepad was last polled.
#[derive(Resource, Debug, Default)]
pub struct AxisPollClock {
    pub since_poll: f32,
}

/// The gamepad entity whose sticks are polled.
#[derive(Resource, Default, Debug)]
pub struct PreferredGamepad(pub Option<Entity>);

/// Desktop binding state.
#[derive(Resource, Debug, Default)]
pub struct DesktopBindings {
    warned_missing_viewpoint: bool,
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Track gamepad connect / disconnect events and update [`PreferredGamepad`].
///
/// The most recently connected gamepad is preferred.
pub fn gamepad_connection_system(
    mut events: MessageReader<GamepadConnectionEvent>,
    mut preferred: ResMut<PreferredGamepad>,
) {
    for event in events.read() {
        match &event.connection {
            GamepadConnection::Connected { .. } => {
                preferred.0 = Some(event.gamepad);
                info!("[input] Gamepad {:?} connected (now preferred)", event.gamepad);
            }
            GamepadConnection::Disconnected => {
                info!("[input] Gamepad {:?} disconnected", event.gamepad);
                if preferred.0 == Some(event.gamepad) {
                    preferred.0 = None;
                }
            }
        }
    }
}

/// Merge pushed samples and the throttled gamepad poll into [`StickAxes`].
pub fn stick_axes_system(
    time: Res<Time>,
    config: Res<RangeConfig>,
    mut samples: MessageReader<AxisSample>,
    preferred: Res<PreferredGamepad>,
    gamepads: Query<&Gamepad>,
    mut clock: ResMut<AxisPollClock>,
    mut axes: ResMut<StickAxes>,
) {
    axes.begin_frame();
    for sample in samples.read() {
        axes.apply_event(sample.stick, sample.value);
    }

    clock.since_poll += time.delta_secs();
    if clock.since_poll < config.input_poll_interval {
        return;
    }
    clock.since_poll = 0.0;

    let Some(gamepad) = preferred.0.and_then(|e| gamepads.get(e).ok()) else {
        axes.clear_polled();
        return;
    };
    let read = |x: GamepadAxis, y: GamepadAxis| {
        Vec2::new(
            gamepad.get(x).unwrap_or(0.0),
            gamepad.get(y).unwrap_or(0.0),
        )
    };
    axes.apply_poll(
        Stick::Left,
        read(GamepadAxis::LeftStickX, GamepadAxis::LeftStickY),
    );
    axes.apply_poll(
        Stick::Right,
        read(GamepadAxis::RightStickX, GamepadAxis::RightStickY),
    );
}

/// Map E / left mouse to actions of the desktop viewpoint.
pub fn desktop_action_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    q_viewpoint: Query<(Entity, &Possession), With<DesktopCarry>>,
    mut bindings: ResMut<DesktopBindings>,
    mut actions: MessageWriter<ManipulatorAction>,
) {
    let Ok((viewpoint, possession)) = q_viewpoint.single() else {
        if !bindings.warned_missing_viewpoint {
            bindings.warned_missing_viewpoint = true;
            warn!("[input] no desktop viewpoint; desktop carry disabled");
        }
        return;
    };

    if keys.just_pressed(KeyCode::KeyE) {
        let kind = if possession.is_idle() {
            ActionKind::GrabStart
        } else {
            ActionKind::GrabEnd
        };
        actions.write(ManipulatorAction::new(viewpoint, kind));
    }
    if mouse.just_pressed(MouseButton::Left) {
        actions.write(ManipulatorAction::new(viewpoint, ActionKind::Fire));
    }
}

/// Stick merge, gamepad tracking and desktop bindings.
pub struct RangeInputPlugin;

impl Plugin for RangeInputPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RangeSchedulePlugin>() {
            app.add_plugins(RangeSchedulePlugin);
        }
        app.init_resource::<RangeConfig>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<StickAxes>()
            .init_resource::<AxisPollClock>()
            .init_resource::<PreferredGamepad>()
            .init_resource::<DesktopBindings>()
            .add_message::<AxisSample>()
            .add_message::<GamepadConnectionEvent>()
            .add_message::<ManipulatorAction>()
            .add_systems(
                Update,
                (
                    gamepad_connection_system,
                    stick_axes_system,
                    desktop_action_system,
                )
                    .chain()
                    .in_set(RangeSet::Input),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    #[test]
    fn last_sample_wins_instead_of_summing() {
        let mut axes = StickAxes::default();
        axes.begin_frame();
        axes.apply_event(Stick::Left, Vec2::new(0.5, 0.0));
        axes.apply_event(Stick::Left, Vec2::new(0.2, 0.1));
        assert_eq!(axes.get(Stick::Left), Vec2::new(0.2, 0.1));
    }

    #[test]
    fn event_beats_poll_in_the_same_frame_only() {
        let mut axes = StickAxes::default();
        axes.begin_frame();
        axes.apply_event(Stick::Right, Vec2::X);
        axes.apply_poll(Stick::Right, Vec2::NEG_X);
        axes.apply_poll(Stick::Left, Vec2::Y);
        assert_eq!(axes.get(Stick::Right), Vec2::X);
        assert_eq!(axes.get(Stick::Left), Vec2::Y);

        axes.begin_frame();
        axes.apply_poll(Stick::Right, Vec2::NEG_X);
        assert_eq!(axes.get(Stick::Right), Vec2::NEG_X);
    }

    #[test]
    fn lost_gamepad_zeroes_only_polled_sticks() {
        let mut axes = StickAxes::default();
        axes.begin_frame();
        axes.apply_poll(Stick::Left, Vec2::Y);
        axes.apply_event(Stick::Right, Vec2::X);
        axes.begin_frame();
        axes.clear_polled();
        assert_eq!(axes.get(Stick::Left), Vec2::ZERO);
        assert_eq!(axes.get(Stick::Right), Vec2::X);

        // An event in the same frame overrides an earlier poll and survives.
        axes.begin_frame();
        axes.apply_poll(Stick::Left, Vec2::Y);
        axes.begin_frame();
        axes.apply_event(Stick::Left, Vec2::NEG_Y);
        axes.clear_polled();
        assert_eq!(axes.get(Stick::Left), Vec2::NEG_Y);
    }

    #[test]
    fn disconnected_gamepad_stops_driving_the_sticks() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RangeInputPlugin));
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        let mut pad = Gamepad::default();
        pad.analog_mut().set(GamepadAxis::LeftStickY, 1.0);
        let gamepad = app.world_mut().spawn(pad).id();
        app.world_mut().resource_mut::<PreferredGamepad>().0 = Some(gamepad);
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(app.world().resource::<StickAxes>().left, Vec2::Y);

        app.world_mut().entity_mut(gamepad).despawn();
        app.world_mut()
            .write_message(GamepadConnectionEvent::new(gamepad, GamepadConnection::Disconnected));
        for _ in 0..3 {
            app.update();
        }
        assert_eq!(app.world().resource::<PreferredGamepad>().0, None);
        assert_eq!(app.world().resource::<StickAxes>().left, Vec2::ZERO);
    }

    fn app_with_viewpoint() -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RangeInputPlugin));
        let viewpoint = app
            .world_mut()
            .spawn((DesktopCarry, Possession::Idle))
            .id();
        (app, viewpoint)
    }

    fn drain_actions(app: &mut App) -> Vec<ManipulatorAction> {
        app.world_mut()
            .resource_mut::<Messages<ManipulatorAction>>()
            .drain()
            .collect()
    }

    #[test]
    fn e_toggles_between_grab_and_drop() {
        let (mut app, viewpoint) = app_with_viewpoint();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyE);
        app.update();
        assert_eq!(
            drain_actions(&mut app),
            vec![ManipulatorAction::new(viewpoint, ActionKind::GrabStart)]
        );

        let held = app.world_mut().spawn_empty().id();
        app.world_mut().entity_mut(viewpoint).insert(Possession::Held(
            crate::possession::Attachment {
                target: held,
                offset: crate::pose::Pose::IDENTITY,
            },
        ));
        app.update();
        assert_eq!(
            drain_actions(&mut app),
            vec![ManipulatorAction::new(viewpoint, ActionKind::GrabEnd)]
        );
    }

    #[test]
    fn left_click_fires_from_viewpoint() {
        let (mut app, viewpoint) = app_with_viewpoint();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        assert_eq!(
            drain_actions(&mut app),
            vec![ManipulatorAction::new(viewpoint, ActionKind::Fire)]
        );
    }

    #[test]
    fn missing_viewpoint_only_disables_desktop_bindings() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, RangeInputPlugin));
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyE);
        app.world_mut().write_message(AxisSample {
            stick: Stick::Left,
            value: Vec2::new(0.0, 1.0),
        });
        app.update();
        assert!(drain_actions(&mut app).is_empty());
        assert_eq!(app.world().resource::<StickAxes>().left, Vec2::new(0.0, 1.0));
    }
}
