use crate::guest_id_from_tags;
use crate::room::{Environment, GameClient, RoomState, IDLE_TIMEOUT_SECS, MAX_GUESTS};
use game_core::{GuestId, Phase, ParticipantState, Role, SharedState, Side};
use glam::Vec2;
use proto::{RejectReason, C2S, S2C};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use worker::*;

type Inbox = Rc<RefCell<Vec<Vec<u8>>>>;

struct SharedMock {
    msgs: Inbox,
    closed: Rc<Cell<bool>>,
}

impl GameClient for SharedMock {
    fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.msgs.borrow_mut().push(bytes.to_vec());
        Ok(())
    }

    fn disconnect(&self, _reason: &str) -> Result<()> {
        self.closed.set(true);
        Ok(())
    }
}

struct MockEnv {
    time_ms: Rc<Cell<u64>>,
}

impl Environment for MockEnv {
    fn now(&self) -> u64 {
        self.time_ms.get()
    }
    fn log(&self, _msg: String) {
        // No-op for tests
    }
}

struct Guest {
    id: GuestId,
    inbox: Inbox,
    closed: Rc<Cell<bool>>,
}

impl Guest {
    fn messages(&self) -> Vec<S2C> {
        self.inbox
            .borrow()
            .iter()
            .map(|bytes| S2C::from_bytes(bytes).unwrap())
            .collect()
    }

    fn last(&self) -> S2C {
        self.messages().pop().expect("no messages")
    }

    fn clear(&self) {
        self.inbox.borrow_mut().clear();
    }
}

fn room() -> (RoomState, Rc<Cell<u64>>) {
    let clock = Rc::new(Cell::new(1_000));
    let env = MockEnv {
        time_ms: clock.clone(),
    };
    (RoomState::new(Box::new(env)), clock)
}

fn connect(room: &mut RoomState) -> Guest {
    let inbox: Inbox = Rc::new(RefCell::new(Vec::new()));
    let closed = Rc::new(Cell::new(false));
    let id = room.connect(Box::new(SharedMock {
        msgs: inbox.clone(),
        closed: closed.clone(),
    }));
    Guest { id, inbox, closed }
}

fn join(room: &mut RoomState) -> Guest {
    let guest = connect(room);
    room.handle_message(guest.id, C2S::Join { code: *b"ABCDE" });
    guest
}

#[test]
fn test_room_initialization() {
    let (room, _) = room();
    assert!(!room.has_clients());
    assert_eq!(room.authority, None);
    assert_eq!(room.shared, SharedState::default());
}

#[test]
fn test_roles_first_to_claim() {
    let (mut room, _) = room();
    let one = join(&mut room);
    let two = join(&mut room);
    let watcher = join(&mut room);

    match one.messages()[0] {
        S2C::Welcome {
            role, authority, ..
        } => {
            assert_eq!(role, Role::Player(Side::One));
            assert!(authority);
        }
        ref other => panic!("Expected Welcome, got {other:?}"),
    }
    match two.messages()[0] {
        S2C::Welcome {
            role,
            authority,
            ref guests,
            ..
        } => {
            assert_eq!(role, Role::Player(Side::Two));
            assert!(!authority);
            assert_eq!(guests.len(), 1);
            assert_eq!(guests[0].guest_id, one.id);
        }
        ref other => panic!("Expected Welcome, got {other:?}"),
    }
    match watcher.messages()[0] {
        S2C::Welcome { role, .. } => assert_eq!(role, Role::Observer),
        ref other => panic!("Expected Welcome, got {other:?}"),
    }

    assert_eq!(room.authority, Some(one.id));
    // Player one heard about both later arrivals
    let joined = one
        .messages()
        .into_iter()
        .filter(|msg| matches!(msg, S2C::GuestJoined(_)))
        .count();
    assert_eq!(joined, 2);
}

#[test]
fn test_double_join_rejected() {
    let (mut room, _) = room();
    let guest = join(&mut room);
    room.handle_message(guest.id, C2S::Join { code: *b"ABCDE" });
    assert_eq!(
        guest.last(),
        S2C::Rejected {
            reason: RejectReason::AlreadyJoined
        }
    );
    assert_eq!(room.joined_count(), 1);
}

#[test]
fn test_room_full() {
    let (mut room, _) = room();
    for _ in 0..MAX_GUESTS {
        join(&mut room);
    }
    let late = join(&mut room);
    assert_eq!(
        late.last(),
        S2C::Rejected {
            reason: RejectReason::RoomFull
        }
    );
    assert_eq!(room.joined_count(), MAX_GUESTS);
}

#[test]
fn test_shared_write_needs_authority() {
    let (mut room, _) = room();
    let one = join(&mut room);
    let two = join(&mut room);
    one.clear();
    two.clear();

    let mut forged = SharedState::default();
    forged.score.player2 = 9;
    room.handle_message(two.id, C2S::WriteShared(forged));

    assert_eq!(
        two.last(),
        S2C::Rejected {
            reason: RejectReason::NotAuthority
        }
    );
    assert_eq!(room.shared.score.player2, 0);
    assert!(one.messages().is_empty(), "Nothing fanned out");

    let mut update = SharedState::default();
    update.score.player1 = 3;
    update.phase = Phase::Paused { frames_left: 30 };
    room.handle_message(one.id, C2S::WriteShared(update));

    assert_eq!(room.shared, update);
    assert_eq!(two.last(), S2C::Shared(update));
    assert!(one.messages().is_empty(), "No echo to the writer");
}

#[test]
fn test_writes_before_join_rejected() {
    let (mut room, _) = room();
    let guest = connect(&mut room);
    room.handle_message(guest.id, C2S::WriteRecord(ParticipantState::default()));
    assert_eq!(
        guest.last(),
        S2C::Rejected {
            reason: RejectReason::NotJoined
        }
    );
}

#[test]
fn test_record_role_is_forced() {
    let (mut room, _) = room();
    let one = join(&mut room);
    let two = join(&mut room);
    one.clear();

    // Player two claims to be player one and points far outside the prism
    room.handle_message(
        two.id,
        C2S::WriteRecord(ParticipantState {
            paddle: Vec2::new(10_000.0, 12.0),
            role: Role::Player(Side::One),
        }),
    );

    match one.last() {
        S2C::GuestUpdated(record) => {
            assert_eq!(record.guest_id, two.id);
            assert_eq!(record.role(), Role::Player(Side::Two));
            assert_eq!(record.state.paddle, Vec2::new(370.0, 12.0));
        }
        other => panic!("Expected GuestUpdated, got {other:?}"),
    }
}

#[test]
fn test_ping_pong() {
    let (mut room, _) = room();
    let guest = join(&mut room);
    room.handle_message(guest.id, C2S::Ping { t_ms: 1234 });
    assert_eq!(guest.last(), S2C::Pong { t_ms: 1234 });
}

#[test]
fn test_authority_leave_releases_token() {
    let (mut room, _) = room();
    let one = join(&mut room);
    let two = join(&mut room);
    two.clear();

    assert!(room.remove_guest(one.id));
    assert!(!room.remove_guest(one.id));
    assert_eq!(room.authority, None);
    assert_eq!(two.last(), S2C::GuestLeft { guest_id: one.id });

    // Player one's slot and the token go to the next arrival
    let next = join(&mut room);
    match next.messages()[0] {
        S2C::Welcome {
            role, authority, ..
        } => {
            assert_eq!(role, Role::Player(Side::One));
            assert!(authority);
        }
        ref other => panic!("Expected Welcome, got {other:?}"),
    }
    assert_eq!(room.authority, Some(next.id));
}

#[test]
fn test_shared_state_kept_while_occupied_reset_when_empty() {
    let (mut room, _) = room();
    let one = join(&mut room);
    let two = join(&mut room);

    let mut update = SharedState::default();
    update.score.player2 = 5;
    room.handle_message(one.id, C2S::WriteShared(update));

    room.remove_guest(one.id);
    assert_eq!(room.shared.score.player2, 5, "Survives while someone is left");

    room.remove_guest(two.id);
    assert_eq!(room.shared, SharedState::default());
}

#[test]
fn test_idle_sweep() {
    let (mut room, clock) = room();
    let quiet = join(&mut room);
    let chatty = join(&mut room);

    clock.set(1_000 + (IDLE_TIMEOUT_SECS - 1) * 1000);
    room.handle_message(chatty.id, C2S::Ping { t_ms: 1 });
    clock.set(1_000 + (IDLE_TIMEOUT_SECS + 2) * 1000);

    let removed = room.sweep_idle();

    assert_eq!(removed, vec![quiet.id]);
    assert!(quiet.closed.get());
    assert!(!chatty.closed.get());
    assert_eq!(room.joined_count(), 1);
    assert_eq!(room.authority, None);
}

#[test]
fn test_guest_id_from_tags() {
    let tags = vec!["other".to_string(), "guest:42".to_string()];
    assert_eq!(guest_id_from_tags(&tags), Some(42));
    assert_eq!(guest_id_from_tags(&["guest:x".to_string()]), None);
    assert_eq!(guest_id_from_tags(&[]), None);
}

fn stale_socket(id: GuestId) -> (Guest, SharedMock) {
    let inbox: Inbox = Rc::new(RefCell::new(Vec::new()));
    let closed = Rc::new(Cell::new(false));
    let client = SharedMock {
        msgs: inbox.clone(),
        closed: closed.clone(),
    };
    (Guest { id, inbox, closed }, client)
}

#[test]
fn test_rebuilt_room_does_not_reissue_surviving_ids() {
    let (mut before, _) = room();
    let survivor = join(&mut before);
    assert_eq!(survivor.id, 1);

    // Eviction: a fresh room, seeded from the tags still on open sockets
    let (mut after, _) = room();
    after.reserve_ids_through(survivor.id);
    let newcomer = join(&mut after);
    assert_ne!(newcomer.id, survivor.id);
    assert_eq!(after.authority, Some(newcomer.id));

    let mut forged = SharedState::default();
    forged.score.player2 = 9;
    after.handle_message(survivor.id, C2S::WriteShared(forged));
    assert_eq!(after.shared.score.player2, 0, "Stale socket cannot write");
}

#[test]
fn test_unknown_tagged_socket_is_closed() {
    let (mut room, _) = room();
    room.reserve_ids_through(5);
    let known = connect(&mut room);
    assert_eq!(known.id, 6);

    let (stale, client) = stale_socket(3);
    assert!(room.close_if_unknown(stale.id, &client));
    assert!(stale.closed.get(), "Page sees a disconnect and can rejoin");

    let (_, known_client) = stale_socket(known.id);
    assert!(!room.close_if_unknown(known.id, &known_client));
    assert!(!known.closed.get());
}

#[test]
fn test_reserve_never_lowers_next_id() {
    let (mut room, _) = room();
    connect(&mut room);
    connect(&mut room);
    room.reserve_ids_through(1);
    assert_eq!(connect(&mut room).id, 3);
}
