//! Client app loop
//!
//! Owns the session and everything a browser tab does per frame, minus the
//! GPU and the DOM, so it runs the same under `cargo test`.

use game_core::{
    paddle_from_pointer, Config, Events, FixedStep, GameRng, Role, Session, Side, Viewport,
};
use glam::Vec2;
use proto::{RejectReason, S2C};

use crate::fsm::{FsmState, GameAction, GameFsm};
use crate::network;
use crate::scene::{score_text, Scene};

/// Milliseconds between pings
pub const PING_INTERVAL_MS: f64 = 2000.0;
/// Longest frame gap fed to the scheduler, in seconds
const MAX_FRAME_GAP: f32 = 0.25;

pub struct ClientApp {
    config: Config,
    fsm: GameFsm,
    session: Option<Session>,
    clock: FixedStep,
    rng: GameRng,
    outbox: Vec<Vec<u8>>,
    viewport: Viewport,
    pointer: Option<Vec2>,
    last_frame_ms: Option<f64>,
    last_ping_ms: Option<f64>,
    rtt_ms: Option<u32>,
    last_rejection: Option<RejectReason>,
}

impl ClientApp {
    pub fn new(seed: u64, viewport: Viewport) -> Self {
        Self {
            config: Config::new(),
            fsm: GameFsm::new(),
            session: None,
            clock: FixedStep::default(),
            rng: GameRng::new(seed),
            outbox: Vec::new(),
            viewport,
            pointer: None,
            last_frame_ms: None,
            last_ping_ms: None,
            rtt_ms: None,
            last_rejection: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn state(&self) -> FsmState {
        self.fsm.state()
    }

    pub fn state_string(&self) -> String {
        self.fsm.state_string()
    }

    pub fn rtt_ms(&self) -> Option<u32> {
        self.rtt_ms
    }

    /// End this client looks from; player two's until a session says otherwise
    pub fn viewpoint(&self) -> Side {
        self.session
            .as_ref()
            .map_or(Side::Two, |session| session.viewpoint())
    }

    /// Why the relay turned the last join down, for the page
    pub fn rejection_text(&self) -> Option<String> {
        self.last_rejection.map(|reason| reason.to_string())
    }

    /// Bytes to send once the socket opens. A finished or dropped room is
    /// left first, so the page can join again without reloading.
    pub fn join(&mut self, code: &str) -> Result<Vec<u8>, String> {
        let bytes = network::create_join_message(code)?;
        if self.fsm.can_transition(GameAction::Leave) {
            self.fsm.transition(GameAction::Leave);
        }
        if !self.fsm.transition(GameAction::JoinRoom).success() {
            return Err(format!("Cannot join while {}", self.fsm.state_string()));
        }
        self.last_rejection = None;
        self.last_ping_ms = None;
        Ok(bytes)
    }

    pub fn handle_bytes(&mut self, bytes: &[u8]) -> Result<(), String> {
        let msg = network::decode(bytes)?;
        self.handle_message(msg);
        Ok(())
    }

    pub fn handle_message(&mut self, msg: S2C) {
        match msg {
            S2C::Welcome { .. } => {
                if self.session.is_some() {
                    log::warn!("Ignoring second welcome");
                    return;
                }
                if let Some(session) = network::session_from_welcome(msg) {
                    log::info!(
                        "Joined as guest {} with role {:?} (authority: {})",
                        session.me().id,
                        session.role(),
                        session.is_authority()
                    );
                    self.session = Some(session);
                    self.clock.reset();
                    self.fsm.transition(GameAction::Welcomed);
                    self.queue_record();
                    self.sync_fsm();
                }
            }
            S2C::Rejected { reason } => {
                log::warn!("Rejected by relay: {}", reason);
                self.last_rejection = Some(reason);
                self.fsm.transition(GameAction::Rejected);
            }
            S2C::Pong { t_ms } => {
                if let Some(now) = self.last_frame_ms {
                    let rtt = wrap_ms(now).wrapping_sub(t_ms);
                    log::debug!("RTT {} ms", rtt);
                    self.rtt_ms = Some(rtt);
                }
            }
            other => {
                let Some(session) = self.session.as_mut() else {
                    log::debug!("Dropping {:?} before welcome", other);
                    return;
                };
                match other {
                    S2C::GuestJoined(record) => {
                        log::info!("Guest {} joined as {:?}", record.guest_id, record.role());
                        session.upsert_guest(record.guest_id, record.state);
                    }
                    S2C::GuestUpdated(record) => {
                        session.upsert_guest(record.guest_id, record.state);
                    }
                    S2C::GuestLeft { guest_id } => {
                        session.remove_guest(guest_id);
                    }
                    S2C::Shared(shared) => {
                        session.apply_shared(shared);
                    }
                    _ => {}
                }
                self.sync_fsm();
            }
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    /// One animation frame: input, simulation, outgoing writes
    pub fn frame(&mut self, now_ms: f64) {
        let elapsed = match self.last_frame_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_GAP),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        if self.session.is_none() {
            return;
        }

        // 1. Local paddle from the pointer
        if let Some(pointer) = self.pointer {
            let viewpoint = self.viewpoint();
            let target = paddle_from_pointer(pointer, self.viewport, viewpoint, &self.config);
            let moved = self
                .session
                .as_mut()
                .is_some_and(|session| session.set_local_paddle(target, &self.config));
            if moved {
                self.queue_record();
            }
        }

        // 2. Fixed steps on the authority
        let steps = self.clock.advance(elapsed);
        let mut ran = false;
        if let Some(session) = self.session.as_mut() {
            let mut step_events = Events::new();
            for _ in 0..steps {
                if !session.simulate(&self.config, &mut self.rng, &mut step_events) {
                    break;
                }
                ran = true;
                if step_events.game_ended {
                    log::info!("Game over: {}", score_text(session.shared(), session.role()));
                }
            }
        }
        if ran {
            self.queue_shared();
        }

        // 3. Keepalive
        let ping_due = self.fsm.in_room()
            && self
                .last_ping_ms
                .map_or(true, |last| now_ms - last >= PING_INTERVAL_MS);
        if ping_due {
            self.last_ping_ms = Some(now_ms);
            self.push(network::create_ping_message(wrap_ms(now_ms)));
        }

        self.sync_fsm();
    }

    pub fn take_outgoing(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbox)
    }

    /// The socket closed. The session is torn down.
    pub fn disconnected(&mut self) {
        if self.session.take().is_some() {
            log::info!("Session closed");
        }
        self.outbox.clear();
        self.fsm.transition(GameAction::Disconnected);
    }

    pub fn score_text(&self) -> String {
        match &self.session {
            Some(session) => score_text(session.shared(), session.role()),
            None => String::new(),
        }
    }

    pub fn scene(&self) -> Option<Scene> {
        self.session
            .as_ref()
            .map(|session| Scene::build(session, &self.config))
    }

    fn queue_record(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if session.role() == Role::Observer {
            return;
        }
        let bytes = network::create_record_message(session.me().state);
        self.push(bytes);
    }

    fn queue_shared(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let bytes = network::create_shared_message(*session.shared());
        self.push(bytes);
    }

    fn push(&mut self, bytes: Result<Vec<u8>, String>) {
        match bytes {
            Ok(bytes) => self.outbox.push(bytes),
            Err(e) => log::error!("{}", e),
        }
    }

    /// Derive Waiting / Playing / Ended from what the session shows
    fn sync_fsm(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        let action = if session.shared().phase.is_ended() {
            GameAction::GameOver
        } else if session.paddles().len() == 2 {
            GameAction::OpponentJoined
        } else {
            GameAction::OpponentLeft
        };
        if self.fsm.can_transition(action) {
            self.fsm.transition(action);
        }
    }
}

fn wrap_ms(now_ms: f64) -> u32 {
    (now_ms as u64 & u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{ParticipantState, Phase, SharedState};
    use proto::{GuestRecord, C2S};

    fn welcome(guest_id: u32, role: Role, authority: bool, guests: Vec<GuestRecord>) -> S2C {
        S2C::Welcome {
            guest_id,
            role,
            authority,
            shared: SharedState::default(),
            guests,
        }
    }

    fn sent(app: &mut ClientApp) -> Vec<C2S> {
        app.take_outgoing()
            .iter()
            .map(|bytes| C2S::from_bytes(bytes).unwrap())
            .collect()
    }

    fn authority_app() -> ClientApp {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        app.join("ABCDE").unwrap();
        app.handle_message(welcome(1, Role::Player(Side::One), true, vec![]));
        app
    }

    #[test]
    fn test_join_then_welcome_waits_for_opponent() {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        assert!(app.join("abc").is_err(), "Bad code");
        assert_eq!(app.state(), FsmState::Idle);

        app.join("ABCDE").unwrap();
        assert_eq!(app.state(), FsmState::Connecting);

        app.handle_message(welcome(1, Role::Player(Side::One), true, vec![]));
        assert_eq!(app.state(), FsmState::Waiting);
        assert!(matches!(sent(&mut app)[..], [C2S::WriteRecord(_)]));
    }

    #[test]
    fn test_opponent_arrival_starts_play() {
        let mut app = authority_app();
        app.handle_message(S2C::GuestJoined(GuestRecord::new(
            2,
            ParticipantState::new(Role::Player(Side::Two)),
        )));
        assert_eq!(app.state(), FsmState::Playing);

        app.handle_message(S2C::GuestLeft { guest_id: 2 });
        assert_eq!(app.state(), FsmState::Waiting);
    }

    #[test]
    fn test_authority_steps_and_publishes_shared() {
        let mut app = authority_app();
        app.handle_message(S2C::GuestJoined(GuestRecord::new(
            2,
            ParticipantState::new(Role::Player(Side::Two)),
        )));
        app.frame(0.0);
        app.take_outgoing();

        // Two and a half steps' worth of time
        app.frame(1000.0 / 60.0 * 2.5);
        let shared_writes: Vec<SharedState> = sent(&mut app)
            .into_iter()
            .filter_map(|msg| match msg {
                C2S::WriteShared(shared) => Some(shared),
                _ => None,
            })
            .collect();
        assert_eq!(shared_writes.len(), 1, "One write per frame");
        assert_eq!(shared_writes[0].ball.pos.x, 10.0);
    }

    #[test]
    fn test_follower_never_steps() {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        app.join("ABCDE").unwrap();
        app.handle_message(welcome(
            2,
            Role::Player(Side::Two),
            false,
            vec![GuestRecord::new(1, ParticipantState::new(Role::Player(Side::One)))],
        ));
        app.frame(0.0);
        app.frame(100.0);
        assert!(sent(&mut app)
            .iter()
            .all(|msg| !matches!(msg, C2S::WriteShared(_))));

        let mut shared = SharedState::default();
        shared.score.player1 = 2;
        app.handle_message(S2C::Shared(shared));
        assert_eq!(app.score_text(), "2 - 0");
    }

    #[test]
    fn test_pointer_sends_record_only_on_change() {
        let mut app = authority_app();
        app.take_outgoing();
        app.frame(0.0);
        app.take_outgoing();

        app.pointer_moved(600.0, 350.0);
        app.frame(10.0);
        let records: Vec<ParticipantState> = sent(&mut app)
            .into_iter()
            .filter_map(|msg| match msg {
                C2S::WriteRecord(state) => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].paddle, Vec2::new(100.0, 100.0));

        app.frame(20.0);
        assert!(sent(&mut app)
            .iter()
            .all(|msg| !matches!(msg, C2S::WriteRecord(_))));
    }

    #[test]
    fn test_ping_cadence_and_rtt() {
        let mut app = authority_app();
        app.take_outgoing();

        app.frame(5000.0);
        assert!(sent(&mut app).contains(&C2S::Ping { t_ms: 5000 }));
        app.frame(6000.0);
        assert!(!sent(&mut app).iter().any(|m| matches!(m, C2S::Ping { .. })));
        app.frame(7000.0);
        assert!(sent(&mut app).contains(&C2S::Ping { t_ms: 7000 }));

        app.handle_message(S2C::Pong { t_ms: 6950 });
        assert_eq!(app.rtt_ms(), Some(50));
    }

    #[test]
    fn test_end_of_game_and_disconnect() {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        app.join("ABCDE").unwrap();
        app.handle_message(welcome(
            2,
            Role::Player(Side::Two),
            false,
            vec![GuestRecord::new(1, ParticipantState::new(Role::Player(Side::One)))],
        ));
        let mut shared = SharedState::default();
        shared.score.player2 = 10;
        shared.phase = Phase::Ended { winner: Side::Two };
        app.handle_message(S2C::Shared(shared));

        assert_eq!(app.state(), FsmState::Ended);
        assert_eq!(app.score_text(), "You win!");

        app.disconnected();
        assert_eq!(app.state(), FsmState::Disconnected);
        assert!(app.session().is_none());
        assert_eq!(app.score_text(), "");
    }

    #[test]
    fn test_rejection_returns_to_idle() {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        app.join("ABCDE").unwrap();
        app.handle_message(S2C::Rejected {
            reason: RejectReason::RoomFull,
        });
        assert_eq!(app.state(), FsmState::Idle);
        assert_eq!(app.rejection_text(), Some("room is full".to_string()));

        // The page can retry straight away
        app.join("FGHIJ").unwrap();
        assert_eq!(app.state(), FsmState::Connecting);
        assert_eq!(app.rejection_text(), None);
    }

    #[test]
    fn test_rejoin_after_disconnect() {
        let mut app = authority_app();
        app.disconnected();
        assert_eq!(app.state(), FsmState::Disconnected);

        app.join("ABCDE").unwrap();
        assert_eq!(app.state(), FsmState::Connecting);
        app.handle_message(welcome(4, Role::Player(Side::One), true, vec![]));
        assert_eq!(app.state(), FsmState::Waiting);
        assert_eq!(app.session().map(|s| s.me().id), Some(4));
    }

    #[test]
    fn test_no_ping_outside_a_room() {
        let mut app = ClientApp::new(1, Viewport::new(1000.0, 500.0));
        app.frame(0.0);
        app.frame(5000.0);
        assert!(app.take_outgoing().is_empty());
    }
}
