//! # Session Module
//!
//! Owns one operator session: both joysticks, the keyboard state, the feed
//! monitor, the display projection, and the outbound channel half. Input
//! events come in from the host, control messages go out on the channel, and
//! inbound peer events land in [`Session::dispatch`].
//!
//! All methods are synchronous state transitions except the ones that write
//! to the channel; the session is driven from a single event-loop task.

pub mod capability;
pub mod display;

pub use display::DisplayState;

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::channel::ChannelIO;
use crate::config::Config;
use crate::error::Result;
use crate::feed::{FeedMonitor, FeedProbe, FeedUpdate};
use crate::input::joystick::{
    CenteringPolicy, Joystick, JoystickUpdate, LayoutBox, Point, PointerId,
};
use crate::input::keyboard::{KeyAction, KeyboardControls};
use crate::protocol::{
    Action, ControlMessage, InboundEvent, Mode, Stick, EVENT_MODE,
};

/// One operator session bound to a connected channel.
pub struct Session<C: ChannelIO> {
    channel: C,
    pub display: DisplayState,
    keyboard: KeyboardControls,
    left_stick: Joystick,
    right_stick: Joystick,
    feed: FeedMonitor,
    mode: Mode,
}

impl<C: ChannelIO> Session<C> {
    /// Creates a session from configuration and a connected channel half.
    ///
    /// The left stick holds its vertical axis on release (throttle), the
    /// right stick snaps both axes back (pitch/roll).
    #[must_use]
    pub fn new(config: &Config, channel: C) -> Self {
        let joystick = &config.joystick;
        Self {
            channel,
            display: DisplayState::new(Duration::from_millis(config.display.status_fade_ms)),
            keyboard: KeyboardControls::new(Duration::from_millis(config.keyboard.debounce_ms)),
            left_stick: Joystick::with_options(
                joystick.max_distance,
                joystick.scale_factor,
                CenteringPolicy::horizontal_only(),
                joystick.mouse_fallback,
            ),
            right_stick: Joystick::with_options(
                joystick.max_distance,
                joystick.scale_factor,
                CenteringPolicy::both(),
                joystick.mouse_fallback,
            ),
            feed: FeedMonitor::new(&config.peer.base_url, config.feed.max_retries),
            mode: Mode::Manual,
        }
    }

    /// Current operating mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current feed liveness.
    #[must_use]
    pub fn feed_status(&self) -> crate::feed::FeedStatus {
        self.feed.status()
    }

    async fn send(&mut self, message: &ControlMessage) -> Result<()> {
        self.channel
            .send_event(message.event(), message.payload())
            .await?;
        Ok(())
    }

    /// Sends a discrete action and shows its local status message.
    pub async fn send_action(&mut self, action: Action, now: Instant) -> Result<()> {
        info!("Sending {} action", action.as_str());
        self.send(&ControlMessage::Action(action)).await?;
        self.display.set_status(action.status_message(), now);
        Ok(())
    }

    /// Processes a key-down from the host.
    ///
    /// Debounced or unmapped presses send nothing.
    pub async fn key_down(&mut self, key: &str, now: Instant) -> Result<()> {
        let Some(update) = self.keyboard.key_down(key, now) else {
            return Ok(());
        };
        self.display.active_commands = update.active_labels;

        if let KeyAction::Start(code) = update.action {
            debug!("Key command start: {}", code.code());
            self.send(&ControlMessage::Keyboard {
                code: code.code().to_string(),
            })
            .await?;
        }
        Ok(())
    }

    /// Processes a key-up from the host. Always sends the stop message for
    /// mapped keys; releases are never debounced.
    pub async fn key_up(&mut self, key: &str) -> Result<()> {
        let Some(update) = self.keyboard.key_up(key) else {
            return Ok(());
        };
        self.display.active_commands = update.active_labels;

        if let KeyAction::Stop(code) = update.action {
            debug!("Key command stop: {}", code.code());
            self.send(&ControlMessage::Keyboard {
                code: format!("stop_{}", code.code()),
            })
            .await?;
        }
        Ok(())
    }

    /// Focus lost: clears held commands and neutralizes the keyboard vector.
    pub async fn blur(&mut self) -> Result<()> {
        let update = self.keyboard.blur();
        self.display.active_commands = update.active_labels;
        self.send(&ControlMessage::KeyboardVector { x: 0.0, y: 0.0 })
            .await
    }

    fn stick_mut(&mut self, stick: Stick) -> &mut Joystick {
        match stick {
            Stick::Left => &mut self.left_stick,
            Stick::Right => &mut self.right_stick,
        }
    }

    async fn send_stick_vector(&mut self, stick: Stick, update: &JoystickUpdate) -> Result<()> {
        self.send(&ControlMessage::Joystick {
            stick,
            x: update.vector.x,
            y: update.vector.y,
        })
        .await
    }

    /// Begins a joystick drag. Returns the handle offset to render, or
    /// `None` when the pointer was ignored.
    pub async fn joystick_down(
        &mut self,
        stick: Stick,
        id: PointerId,
        pos: Point,
        layout: &LayoutBox,
    ) -> Result<Option<JoystickUpdate>> {
        let Some(update) = self.stick_mut(stick).pointer_down(id, pos, layout) else {
            return Ok(None);
        };
        self.send_stick_vector(stick, &update).await?;
        Ok(Some(update))
    }

    /// Continues a joystick drag.
    pub async fn joystick_move(
        &mut self,
        stick: Stick,
        id: PointerId,
        pos: Point,
        layout: &LayoutBox,
    ) -> Result<Option<JoystickUpdate>> {
        let Some(update) = self.stick_mut(stick).pointer_move(id, pos, layout) else {
            return Ok(None);
        };
        self.send_stick_vector(stick, &update).await?;
        Ok(Some(update))
    }

    /// Ends a joystick drag, sending the resting vector.
    pub async fn joystick_up(
        &mut self,
        stick: Stick,
        id: PointerId,
    ) -> Result<Option<JoystickUpdate>> {
        let Some(update) = self.stick_mut(stick).pointer_up(id) else {
            return Ok(None);
        };
        self.send_stick_vector(stick, &update).await?;
        Ok(Some(update))
    }

    /// Switches the operating mode: emits the mode event and toggles the
    /// mode-specific panels.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<()> {
        info!("Switching to {} mode", mode.as_str());
        self.channel
            .send_event(EVENT_MODE, Value::String(mode.as_str().to_string()))
            .await?;
        self.mode = mode;
        self.display.set_mode(mode);
        Ok(())
    }

    /// Applies one inbound peer event to the session state.
    pub fn dispatch(&mut self, event: InboundEvent, now: Instant) {
        match event {
            InboundEvent::Telemetry(sample) => {
                self.display.apply_telemetry(&sample);
            }
            InboundEvent::Arm(armed) => {
                info!("Peer reports {}", if armed { "armed" } else { "disarmed" });
                self.display.armed = armed;
            }
            InboundEvent::Status(message) => {
                self.display.set_status(message, now);
            }
            InboundEvent::Connect => {
                info!("Peer ready");
                self.display.set_connected(true);
            }
            InboundEvent::Disconnect => {
                warn!("Peer away");
                self.display.set_connected(false);
            }
        }
    }

    /// Runs one feed probe and applies the result to the display.
    pub async fn poll_feed(&mut self, probe: &dyn FeedProbe, now_millis: i64) -> FeedUpdate {
        let update = self.feed.poll(probe, now_millis).await;
        self.display.apply_feed(&update);
        update
    }

    /// User-triggered feed retry.
    pub fn refresh_feed(&mut self, now_millis: i64) -> FeedUpdate {
        let update = self.feed.manual_refresh(now_millis);
        self.display.apply_feed(&update);
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channel_trait::mocks::MockChannel;
    use crate::protocol::TelemetrySample;
    use async_trait::async_trait;
    use serde_json::json;

    fn session() -> (Session<MockChannel>, MockChannel) {
        let channel = MockChannel::new();
        let config = Config::default();
        (Session::new(&config, channel.clone()), channel)
    }

    fn layout() -> LayoutBox {
        LayoutBox {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        }
    }

    struct FixedProbe(bool);

    #[async_trait]
    impl FeedProbe for FixedProbe {
        async fn probe(&self) -> bool {
            self.0
        }
    }

    // ==================== Action Tests ====================

    #[tokio::test]
    async fn test_action_sends_bare_string_and_sets_status() {
        let (mut session, channel) = session();
        let now = Instant::now();

        session.send_action(Action::Takeoff, now).await.unwrap();

        assert_eq!(
            channel.get_sent_events(),
            vec![("control".to_string(), json!("takeoff"))]
        );
        assert_eq!(session.display.status_message(), Some("Taking off..."));
        assert_eq!(session.display.status_opacity(now), 1.0);
    }

    #[tokio::test]
    async fn test_disarm_action_status() {
        let (mut session, channel) = session();

        session
            .send_action(Action::Disarm, Instant::now())
            .await
            .unwrap();
        assert_eq!(channel.get_sent_events()[0].1, json!("disarm"));
        assert_eq!(session.display.status_message(), Some("EMERGENCY STOP!"));
    }

    // ==================== Keyboard Tests ====================

    #[tokio::test]
    async fn test_key_down_sends_command_code() {
        let (mut session, channel) = session();

        session.key_down("w", Instant::now()).await.unwrap();

        assert_eq!(
            channel.get_sent_events(),
            vec![(
                "control".to_string(),
                json!({ "type": "keyboard", "code": "throttle_up" })
            )]
        );
        assert_eq!(session.display.active_commands, vec!["↑ Throttle Up"]);
    }

    #[tokio::test]
    async fn test_key_up_sends_stop_code() {
        let (mut session, channel) = session();
        let now = Instant::now();

        session.key_down("w", now).await.unwrap();
        session.key_up("w").await.unwrap();

        let sent = channel.get_sent_events();
        assert_eq!(
            sent[1].1,
            json!({ "type": "keyboard", "code": "stop_throttle_up" })
        );
        assert!(session.display.active_commands.is_empty());
    }

    #[tokio::test]
    async fn test_debounced_key_sends_nothing() {
        let (mut session, channel) = session();
        let now = Instant::now();

        session.key_down("w", now).await.unwrap();
        session
            .key_down("d", now + Duration::from_millis(10))
            .await
            .unwrap();

        // Only the first press went out
        assert_eq!(channel.get_sent_events().len(), 1);
        assert_eq!(session.display.active_commands, vec!["↑ Throttle Up"]);
    }

    #[tokio::test]
    async fn test_unmapped_key_sends_nothing() {
        let (mut session, channel) = session();

        session.key_down("q", Instant::now()).await.unwrap();
        session.key_up("q").await.unwrap();
        assert!(channel.get_sent_events().is_empty());
    }

    #[tokio::test]
    async fn test_blur_sends_neutral_vector() {
        let (mut session, channel) = session();

        session.key_down("w", Instant::now()).await.unwrap();
        session.blur().await.unwrap();

        let sent = channel.get_sent_events();
        assert_eq!(sent[1].1, json!({ "type": "keyboard", "x": 0.0, "y": 0.0 }));
        assert!(session.display.active_commands.is_empty());
    }

    // ==================== Joystick Tests ====================

    #[tokio::test]
    async fn test_left_stick_wire_type() {
        let (mut session, channel) = session();

        let update = session
            .joystick_down(
                Stick::Left,
                PointerId::Touch(0),
                Point { x: 65.0, y: 50.0 },
                &layout(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(update.vector.x, -5.0);
        assert_eq!(
            channel.get_sent_events(),
            vec![(
                "control".to_string(),
                json!({ "type": "left-joystick", "x": -5.0, "y": 0.0 })
            )]
        );
    }

    #[tokio::test]
    async fn test_right_stick_full_drag_cycle() {
        let (mut session, channel) = session();
        let id = PointerId::Touch(7);

        session
            .joystick_down(Stick::Right, id, Point { x: 50.0, y: 50.0 }, &layout())
            .await
            .unwrap();
        session
            .joystick_move(Stick::Right, id, Point { x: 50.0, y: 35.0 }, &layout())
            .await
            .unwrap();
        session.joystick_up(Stick::Right, id).await.unwrap();

        let sent = channel.get_sent_events();
        assert_eq!(sent.len(), 3);
        assert_eq!(
            sent[1].1,
            json!({ "type": "right-joystick", "x": -0.0, "y": 5.0 })
        );
        // Both axes snap back on the right stick
        assert_eq!(
            sent[2].1,
            json!({ "type": "right-joystick", "x": 0.0, "y": 0.0 })
        );
    }

    #[tokio::test]
    async fn test_left_stick_holds_throttle_on_release() {
        let (mut session, channel) = session();
        let id = PointerId::Touch(1);

        // Drag 15 units up and release: Y holds, X centers
        session
            .joystick_down(Stick::Left, id, Point { x: 50.0, y: 35.0 }, &layout())
            .await
            .unwrap();
        session.joystick_up(Stick::Left, id).await.unwrap();

        let sent = channel.get_sent_events();
        assert_eq!(
            sent[1].1,
            json!({ "type": "left-joystick", "x": 0.0, "y": 5.0 })
        );
    }

    #[tokio::test]
    async fn test_ignored_pointer_sends_nothing() {
        let (mut session, channel) = session();

        // Mouse without fallback
        let result = session
            .joystick_down(
                Stick::Left,
                PointerId::Mouse,
                Point { x: 60.0, y: 50.0 },
                &layout(),
            )
            .await
            .unwrap();
        assert!(result.is_none());

        // Move with no active drag
        let result = session
            .joystick_move(
                Stick::Right,
                PointerId::Touch(1),
                Point { x: 60.0, y: 50.0 },
                &layout(),
            )
            .await
            .unwrap();
        assert!(result.is_none());

        assert!(channel.get_sent_events().is_empty());
    }

    #[tokio::test]
    async fn test_sticks_are_independent() {
        let (mut session, channel) = session();

        session
            .joystick_down(
                Stick::Left,
                PointerId::Touch(1),
                Point { x: 60.0, y: 50.0 },
                &layout(),
            )
            .await
            .unwrap();
        session
            .joystick_down(
                Stick::Right,
                PointerId::Touch(2),
                Point { x: 40.0, y: 50.0 },
                &layout(),
            )
            .await
            .unwrap();

        let sent = channel.get_sent_events();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1["type"], "left-joystick");
        assert_eq!(sent[1].1["type"], "right-joystick");
    }

    // ==================== Mode Tests ====================

    #[tokio::test]
    async fn test_set_mode_emits_event_and_toggles_panels() {
        let (mut session, channel) = session();
        assert_eq!(session.mode(), Mode::Manual);

        session.set_mode(Mode::Ai).await.unwrap();
        assert_eq!(session.mode(), Mode::Ai);
        assert!(session.display.ai_panel_visible);
        assert_eq!(
            channel.get_sent_events(),
            vec![("mode".to_string(), json!("ai"))]
        );

        session.set_mode(Mode::Manual).await.unwrap();
        assert!(!session.display.ai_panel_visible);
    }

    // ==================== Dispatch Tests ====================

    #[tokio::test]
    async fn test_dispatch_telemetry() {
        let (mut session, _channel) = session();

        session.dispatch(
            InboundEvent::Telemetry(TelemetrySample {
                lat: 51.5074,
                lon: -0.1278,
                alt: 12.0,
                battery: 90.0,
                signal: 80.0,
                armed: true,
            }),
            Instant::now(),
        );

        assert_eq!(session.display.telemetry.lat, "51.507400");
        assert_eq!(session.display.arm_label(), "Armed");
    }

    #[tokio::test]
    async fn test_dispatch_arm_and_status() {
        let (mut session, _channel) = session();
        let now = Instant::now();

        session.dispatch(InboundEvent::Arm(true), now);
        assert_eq!(session.display.arm_label(), "Armed");

        session.dispatch(InboundEvent::Status("Landing...".to_string()), now);
        assert_eq!(session.display.status_message(), Some("Landing..."));
    }

    #[tokio::test]
    async fn test_dispatch_connect_cycle() {
        let (mut session, _channel) = session();
        assert!(session.display.connection_modal_visible);

        session.dispatch(InboundEvent::Connect, Instant::now());
        assert!(!session.display.connection_modal_visible);

        session.dispatch(InboundEvent::Disconnect, Instant::now());
        assert!(session.display.connection_modal_visible);
    }

    // ==================== Feed Tests ====================

    #[tokio::test]
    async fn test_poll_feed_updates_display() {
        let (mut session, _channel) = session();

        session.poll_feed(&FixedProbe(true), 1).await;
        assert!(session.display.show_stream);
        assert_eq!(session.feed_status(), crate::feed::FeedStatus::Live);

        session.poll_feed(&FixedProbe(false), 2).await;
        assert!(session.display.show_no_feed);
        assert!(session.display.stream_src.is_some());
    }

    #[tokio::test]
    async fn test_refresh_feed_after_failure_budget() {
        let (mut session, _channel) = session();

        for i in 0..5 {
            session.poll_feed(&FixedProbe(false), i).await;
        }
        assert_eq!(session.feed_status(), crate::feed::FeedStatus::Failed);

        session.refresh_feed(99);
        assert_eq!(
            session.feed_status(),
            crate::feed::FeedStatus::Degraded(0)
        );
        assert_eq!(
            session.display.stream_src.as_deref(),
            Some("http://192.168.5.198:8000/video_feed?t=99")
        );
    }

    // ==================== Send Failure Tests ====================

    #[tokio::test]
    async fn test_send_failure_surfaces_error() {
        let (mut session, channel) = session();
        channel.set_send_error(std::io::ErrorKind::BrokenPipe);

        let result = session.send_action(Action::Land, Instant::now()).await;
        assert!(result.is_err());
    }
}
