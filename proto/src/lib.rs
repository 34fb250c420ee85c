//! Network protocol for 3D Pong
//!
//! Uses postcard for efficient binary serialization. The relay never looks
//! inside the state blobs beyond what it needs to enforce ownership.

use std::fmt;

use game_core::{GuestId, ParticipantState, Role, SharedState};
use postcard::{from_bytes, to_allocvec};

// ============================================================================
// C2S Messages (Client to Server)
// ============================================================================

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum C2S {
    /// Join the room with code
    Join { code: [u8; 5] },

    /// New shared blob; accepted from the authority only
    WriteShared(SharedState),

    /// The sender's own record
    WriteRecord(ParticipantState),

    /// Ping for latency measurement
    Ping { t_ms: u32 },
}

// ============================================================================
// S2C Messages (Server to Client)
// ============================================================================

/// Another guest's record as seen by the relay
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GuestRecord {
    pub guest_id: GuestId,
    pub state: ParticipantState,
}

impl GuestRecord {
    pub fn new(guest_id: GuestId, state: ParticipantState) -> Self {
        Self { guest_id, state }
    }

    pub fn role(&self) -> Role {
        self.state.role
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum S2C {
    /// Join accepted: assigned identity and role, plus the room as it stands
    Welcome {
        guest_id: GuestId,
        role: Role,
        authority: bool,
        shared: SharedState,
        guests: Vec<GuestRecord>,
    },

    GuestJoined(GuestRecord),

    GuestUpdated(GuestRecord),

    GuestLeft { guest_id: GuestId },

    /// Latest shared blob from the authority
    Shared(SharedState),

    Rejected { reason: RejectReason },

    /// Pong response to ping
    Pong { t_ms: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RejectReason {
    RoomFull,
    AlreadyJoined,
    NotJoined,
    NotAuthority,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::RoomFull => "room is full",
            RejectReason::AlreadyJoined => "already joined",
            RejectReason::NotJoined => "join the room first",
            RejectReason::NotAuthority => "only the authority writes shared state",
        };
        f.write_str(text)
    }
}

// ============================================================================
// Serialization Helpers
// ============================================================================

impl C2S {
    /// Serialize C2S message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize C2S message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}

impl S2C {
    /// Serialize S2C message to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        to_allocvec(self)
    }

    /// Deserialize S2C message from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{Phase, Side};
    use glam::{Vec2, Vec3};

    #[test]
    fn test_c2s_shared_write_keeps_state() {
        let mut shared = SharedState::default();
        shared.ball.pos = Vec3::new(12.5, -3.0, 480.0);
        shared.score.player2 = 7;
        shared.phase = Phase::Paused { frames_left: 12 };

        let bytes = C2S::WriteShared(shared).to_bytes().expect("Serialization should succeed");
        let decoded = C2S::from_bytes(&bytes).expect("Deserialization should succeed");
        assert_eq!(decoded, C2S::WriteShared(shared));
    }

    #[test]
    fn test_s2c_welcome() {
        let record = GuestRecord::new(
            3,
            ParticipantState {
                paddle: Vec2::new(-40.0, 15.0),
                role: Role::Player(Side::One),
            },
        );
        let msg = S2C::Welcome {
            guest_id: 4,
            role: Role::Player(Side::Two),
            authority: false,
            shared: SharedState::default(),
            guests: vec![record],
        };
        let bytes = msg.to_bytes().expect("Serialization should succeed");
        match S2C::from_bytes(&bytes).expect("Deserialization should succeed") {
            S2C::Welcome {
                guest_id,
                role,
                authority,
                guests,
                ..
            } => {
                assert_eq!(guest_id, 4);
                assert_eq!(role, Role::Player(Side::Two));
                assert!(!authority);
                assert_eq!(guests, vec![record]);
            }
            _ => panic!("Message type mismatch"),
        }
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(C2S::from_bytes(&[0xff, 0xff, 0xff]).is_err());
        assert!(S2C::from_bytes(&[]).is_err());
    }

    #[test]
    fn test_reject_reason_display() {
        assert_eq!(RejectReason::RoomFull.to_string(), "room is full");
        assert_eq!(
            RejectReason::NotAuthority.to_string(),
            "only the authority writes shared state"
        );
    }
}
