//! Network message handling

use game_core::{LocalParticipant, ParticipantState, Session, SharedState};
use proto::{GuestRecord, C2S, S2C};

/// Decode one relay frame
pub fn decode(bytes: &[u8]) -> Result<S2C, String> {
    S2C::from_bytes(bytes).map_err(|e| format!("Failed to parse server message: {:?}", e))
}

/// Build the local session from the relay's welcome
pub fn session_from_welcome(msg: S2C) -> Option<Session> {
    match msg {
        S2C::Welcome {
            guest_id,
            role,
            authority,
            shared,
            guests,
        } => {
            let mut session =
                Session::new(LocalParticipant::new(guest_id, role), authority, shared);
            for GuestRecord { guest_id, state } in guests {
                session.upsert_guest(guest_id, state);
            }
            Some(session)
        }
        _ => None,
    }
}

/// Uppercase and check a room code
pub fn parse_room_code(code: &str) -> Result<[u8; 5], String> {
    let code = code.trim().to_ascii_uppercase();
    let bytes: [u8; 5] = code
        .as_bytes()
        .try_into()
        .map_err(|_| "Room code must be exactly 5 characters".to_string())?;
    if !bytes.iter().all(u8::is_ascii_alphanumeric) {
        return Err("Room code must be letters and digits".to_string());
    }
    Ok(bytes)
}

/// Create join message bytes
pub fn create_join_message(code: &str) -> Result<Vec<u8>, String> {
    C2S::Join {
        code: parse_room_code(code)?,
    }
    .to_bytes()
    .map_err(|e| format!("Failed to serialize join message: {:?}", e))
}

pub fn create_record_message(state: ParticipantState) -> Result<Vec<u8>, String> {
    C2S::WriteRecord(state)
        .to_bytes()
        .map_err(|e| format!("Failed to serialize record: {:?}", e))
}

pub fn create_shared_message(shared: SharedState) -> Result<Vec<u8>, String> {
    C2S::WriteShared(shared)
        .to_bytes()
        .map_err(|e| format!("Failed to serialize shared state: {:?}", e))
}

/// Create ping message bytes
pub fn create_ping_message(t_ms: u32) -> Result<Vec<u8>, String> {
    C2S::Ping { t_ms }
        .to_bytes()
        .map_err(|e| format!("Failed to serialize ping message: {:?}", e))
}
