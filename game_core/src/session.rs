//! Session context
//!
//! Everything one client knows about its room: the shared blob, its own
//! record, and the other guests' records. Built from the relay's welcome,
//! dropped when the connection goes away.

use glam::Vec2;
use hecs::{Entity, World};

use crate::{
    Config, Events, GameRng, GuestId, Paddle, Participant, ParticipantState, Role, SharedState,
    Side,
};

/// The local participant and the record it owns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalParticipant {
    pub id: GuestId,
    pub state: ParticipantState,
}

impl LocalParticipant {
    pub fn new(id: GuestId, role: Role) -> Self {
        Self {
            id,
            state: ParticipantState::new(role),
        }
    }
}

pub struct Session {
    shared: SharedState,
    me: LocalParticipant,
    guests: World,
    authority: bool,
}

impl Session {
    /// `authority` is the token handed out by the relay; only its holder steps the simulation
    pub fn new(me: LocalParticipant, authority: bool, shared: SharedState) -> Self {
        Self {
            shared,
            me,
            guests: World::new(),
            authority,
        }
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    pub fn me(&self) -> &LocalParticipant {
        &self.me
    }

    pub fn role(&self) -> Role {
        self.me.state.role
    }

    pub fn is_authority(&self) -> bool {
        self.authority
    }

    pub fn guests(&self) -> &World {
        &self.guests
    }

    /// Local participant plus every remote guest
    pub fn participant_count(&self) -> usize {
        self.guests.len() as usize + 1
    }

    /// End of the prism this client looks from. Observers share player two's view.
    pub fn viewpoint(&self) -> Side {
        if self.me.state.is_player1() {
            Side::One
        } else {
            Side::Two
        }
    }

    fn find_guest(&self, id: GuestId) -> Option<Entity> {
        self.guests
            .query::<&Participant>()
            .iter()
            .find(|(_e, participant)| participant.id == id)
            .map(|(entity, _)| entity)
    }

    /// Insert or refresh a remote guest's record
    pub fn upsert_guest(&mut self, id: GuestId, state: ParticipantState) {
        if id == self.me.id {
            return;
        }

        let components = (Participant::new(id, state.role), Paddle::new(state.paddle));
        match self.find_guest(id) {
            Some(entity) => {
                if self.guests.insert(entity, components).is_err() {
                    self.guests.spawn(components);
                }
            }
            None => {
                log::info!("Guest {} joined as {:?}", id, state.role);
                self.guests.spawn(components);
            }
        }
    }

    /// Teardown of a departed guest's record. Returns false for unknown ids.
    pub fn remove_guest(&mut self, id: GuestId) -> bool {
        match self.find_guest(id) {
            Some(entity) => {
                log::info!("Guest {} left", id);
                self.guests.despawn(entity).is_ok()
            }
            None => false,
        }
    }

    /// Replace the shared blob with the authority's latest write.
    ///
    /// The authority's own copy is the source of truth, so echoes are ignored.
    pub fn apply_shared(&mut self, shared: SharedState) -> bool {
        if self.authority {
            return false;
        }
        self.shared = shared;
        true
    }

    /// Move the local paddle, clamped to the playable rectangle. Returns true if it moved.
    pub fn set_local_paddle(&mut self, pos: Vec2, config: &Config) -> bool {
        if self.me.state.role == Role::Observer {
            return false;
        }
        let pos = config.clamp_paddle(pos);
        if pos == self.me.state.paddle {
            return false;
        }
        self.me.state.paddle = pos;
        true
    }

    /// Simulation runs only on the authority, with an opponent present, until the game ends
    pub fn can_simulate(&self) -> bool {
        self.authority && self.participant_count() >= 2 && !self.shared.phase.is_ended()
    }

    /// Run one simulation step if this client may. Returns whether it ran.
    pub fn simulate(&mut self, config: &Config, rng: &mut GameRng, events: &mut Events) -> bool {
        if !self.can_simulate() {
            log::debug!(
                "Skipping step (authority={}, participants={}, phase={:?})",
                self.authority,
                self.participant_count(),
                self.shared.phase
            );
            return false;
        }
        crate::step(
            &mut self.shared,
            &self.guests,
            &self.me,
            config,
            rng,
            events,
        );
        true
    }

    /// Paddle of each occupied player slot
    pub fn paddles(&self) -> Vec<(Side, Vec2)> {
        [Side::One, Side::Two]
            .into_iter()
            .filter_map(|side| {
                crate::systems::defender_paddle(&self.guests, &self.me, side)
                    .map(|pos| (side, pos))
            })
            .collect()
    }

    /// Roles held by everyone in the session, local participant included
    pub fn roles(&self) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .guests
            .query::<&Participant>()
            .iter()
            .map(|(_e, participant)| participant.role)
            .collect();
        roles.push(self.me.state.role);
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;

    fn session(role: Role, authority: bool) -> Session {
        Session::new(
            LocalParticipant::new(1, role),
            authority,
            SharedState::new(&Config::new()),
        )
    }

    #[test]
    fn test_upsert_and_remove_guest() {
        let mut s = session(Role::Player(Side::One), true);
        assert_eq!(s.participant_count(), 1);

        s.upsert_guest(2, ParticipantState::new(Role::Player(Side::Two)));
        assert_eq!(s.participant_count(), 2);

        let moved = ParticipantState {
            paddle: Vec2::new(10.0, 20.0),
            role: Role::Player(Side::Two),
        };
        s.upsert_guest(2, moved);
        assert_eq!(s.participant_count(), 2, "Upsert does not duplicate");
        assert_eq!(s.paddles()[1], (Side::Two, Vec2::new(10.0, 20.0)));

        assert!(s.remove_guest(2));
        assert!(!s.remove_guest(2));
        assert_eq!(s.participant_count(), 1);
    }

    #[test]
    fn test_own_record_is_not_a_guest() {
        let mut s = session(Role::Player(Side::Two), false);
        s.upsert_guest(1, ParticipantState::new(Role::Player(Side::Two)));
        assert_eq!(s.participant_count(), 1);
    }

    #[test]
    fn test_simulation_gate() {
        let config = Config::new();
        let mut rng = GameRng::default();
        let mut events = Events::new();

        let mut alone = session(Role::Player(Side::One), true);
        assert!(!alone.simulate(&config, &mut rng, &mut events), "Needs an opponent");

        let mut follower = session(Role::Player(Side::Two), false);
        follower.upsert_guest(5, ParticipantState::new(Role::Player(Side::One)));
        assert!(!follower.can_simulate(), "Needs the authority token");

        let mut authority = session(Role::Player(Side::One), true);
        authority.upsert_guest(5, ParticipantState::new(Role::Player(Side::Two)));
        assert!(authority.simulate(&config, &mut rng, &mut events));

        authority.shared.phase = Phase::Ended { winner: Side::One };
        assert!(!authority.can_simulate(), "Nothing runs after the end");
    }

    #[test]
    fn test_authority_ignores_shared_echo() {
        let mut authority = session(Role::Player(Side::One), true);
        let mut remote = SharedState::new(&Config::new());
        remote.score.player2 = 4;
        assert!(!authority.apply_shared(remote));
        assert_eq!(authority.shared().score.player2, 0);

        let mut follower = session(Role::Player(Side::Two), false);
        assert!(follower.apply_shared(remote));
        assert_eq!(follower.shared().score.player2, 4);
    }

    #[test]
    fn test_local_paddle_clamped_and_change_detected() {
        let config = Config::new();
        let mut s = session(Role::Player(Side::One), true);

        assert!(s.set_local_paddle(Vec2::new(1000.0, 0.0), &config));
        assert_eq!(s.me().state.paddle, Vec2::new(370.0, 0.0));
        assert!(!s.set_local_paddle(Vec2::new(2000.0, 0.0), &config), "Clamped to the same spot");

        let mut observer = session(Role::Observer, false);
        assert!(!observer.set_local_paddle(Vec2::new(5.0, 5.0), &config));
    }

    #[test]
    fn test_viewpoint_and_roles() {
        let mut s = session(Role::Observer, false);
        assert_eq!(s.viewpoint(), Side::Two);
        s.upsert_guest(2, ParticipantState::new(Role::Player(Side::One)));
        let roles = s.roles();
        assert!(roles.contains(&Role::Player(Side::One)));
        assert!(roles.contains(&Role::Observer));

        assert_eq!(session(Role::Player(Side::One), true).viewpoint(), Side::One);
    }
}
