use game_core::*;
use js_sys::Date;
use proto::*;
use std::collections::HashMap;
use worker::*;

/// Joined guests per room, players and observers together
pub const MAX_GUESTS: usize = 8;
/// Guests silent for longer than this are dropped by the sweep
pub const IDLE_TIMEOUT_SECS: u64 = 60;
/// Alarm period while anyone is connected
pub const SWEEP_INTERVAL_MS: u64 = 10_000;

// Abstract connection for testing
pub trait GameClient {
    fn send_bytes(&self, bytes: &[u8]) -> Result<()>;
    fn disconnect(&self, reason: &str) -> Result<()>;
}

impl GameClient for WebSocket {
    fn send_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.send_with_bytes(bytes)
    }

    fn disconnect(&self, reason: &str) -> Result<()> {
        self.close(Some(1000), Some(reason))
    }
}

// Abstract environment (Time, Logging)
pub trait Environment {
    fn now(&self) -> u64; // ms
    fn log(&self, msg: String);
}

pub struct WasmEnv;

impl Environment for WasmEnv {
    fn now(&self) -> u64 {
        Date::now() as u64
    }

    fn log(&self, msg: String) {
        console_log!("{}", msg);
    }
}

// Track client activity
pub struct ClientInfo {
    pub client: Box<dyn GameClient>,
    pub last_activity: u64, // seconds
    /// None until the guest sends `Join`
    pub record: Option<ParticipantState>,
}

/// Relay and session coordinator for one room
pub struct RoomState {
    pub env: Box<dyn Environment>,
    pub config: Config,
    pub clients: HashMap<GuestId, ClientInfo>,
    pub shared: SharedState,
    /// Holder of the authority token, if any
    pub authority: Option<GuestId>,
    pub next_guest_id: GuestId,
}

impl RoomState {
    pub fn new(env: Box<dyn Environment>) -> Self {
        let config = Config::new();
        let shared = SharedState::new(&config);
        Self {
            env,
            config,
            clients: HashMap::new(),
            shared,
            authority: None,
            next_guest_id: 1,
        }
    }

    fn now_secs(&self) -> u64 {
        self.env.now() / 1000
    }

    /// Register a freshly accepted socket. The guest joins later with `Join`.
    pub fn connect(&mut self, client: Box<dyn GameClient>) -> GuestId {
        let guest_id = self.next_guest_id;
        self.next_guest_id = self.next_guest_id.wrapping_add(1).max(1);

        let now = self.now_secs();
        self.clients.insert(
            guest_id,
            ClientInfo {
                client,
                last_activity: now,
                record: None,
            },
        );
        self.env.log(format!(
            "DO: Guest {} connected (connections: {})",
            guest_id,
            self.clients.len()
        ));
        guest_id
    }

    /// Keep fresh ids clear of sockets that outlived an eviction
    pub fn reserve_ids_through(&mut self, highest: GuestId) {
        if highest >= self.next_guest_id {
            self.next_guest_id = highest.wrapping_add(1).max(1);
        }
    }

    pub fn is_connected(&self, guest_id: GuestId) -> bool {
        self.clients.contains_key(&guest_id)
    }

    /// Close a socket whose guest id this room no longer knows.
    ///
    /// Such sockets predate an eviction; their page sees the close and can
    /// join again on a new socket. Returns true if `client` was closed.
    pub fn close_if_unknown(&self, guest_id: GuestId, client: &dyn GameClient) -> bool {
        if self.is_connected(guest_id) {
            return false;
        }
        self.env
            .log(format!("DO: Closing stale socket for unknown guest {}", guest_id));
        let _ = client.disconnect("Session lost");
        true
    }

    pub fn joined_count(&self) -> usize {
        self.clients
            .values()
            .filter(|info| info.record.is_some())
            .count()
    }

    pub fn has_clients(&self) -> bool {
        !self.clients.is_empty()
    }

    fn record(&self, guest_id: GuestId) -> std::result::Result<ParticipantState, RejectReason> {
        self.clients
            .get(&guest_id)
            .and_then(|info| info.record)
            .ok_or(RejectReason::NotJoined)
    }

    pub fn touch(&mut self, guest_id: GuestId) {
        let now = self.now_secs();
        if let Some(info) = self.clients.get_mut(&guest_id) {
            info.last_activity = now;
        }
    }

    /// Dispatch one decoded client message. Rejections go back to the sender.
    pub fn handle_message(&mut self, guest_id: GuestId, msg: C2S) {
        self.touch(guest_id);

        let result = match msg {
            C2S::Join { code } => self.join(guest_id, code),
            C2S::WriteShared(shared) => self.handle_shared_write(guest_id, shared),
            C2S::WriteRecord(state) => self.handle_record_write(guest_id, state),
            C2S::Ping { t_ms } => {
                self.send_to(guest_id, &S2C::Pong { t_ms });
                Ok(())
            }
        };

        if let Err(reason) = result {
            self.env
                .log(format!("DO: Rejected guest {}: {}", guest_id, reason));
            self.send_to(guest_id, &S2C::Rejected { reason });
        }
    }

    /// Admit a connected guest: assign a role, maybe grant the token, and
    /// introduce it to the room.
    pub fn join(
        &mut self,
        guest_id: GuestId,
        code: [u8; 5],
    ) -> std::result::Result<(), RejectReason> {
        let already_joined = match self.clients.get(&guest_id) {
            Some(info) => info.record.is_some(),
            None => return Err(RejectReason::NotJoined),
        };
        if already_joined {
            return Err(RejectReason::AlreadyJoined);
        }
        if self.joined_count() >= MAX_GUESTS {
            return Err(RejectReason::RoomFull);
        }

        let role = assign_role(
            self.clients
                .values()
                .filter_map(|info| info.record.map(|record| record.role)),
        );
        let record = ParticipantState::new(role);
        let authority = role.is_player1() && self.authority.is_none();
        if authority {
            self.authority = Some(guest_id);
        }
        if let Some(info) = self.clients.get_mut(&guest_id) {
            info.record = Some(record);
        }

        self.env.log(format!(
            "DO: Guest {} joined room {} as {:?} (authority: {}, joined: {})",
            guest_id,
            String::from_utf8_lossy(&code),
            role,
            authority,
            self.joined_count()
        ));

        let guests = self.guest_records_except(guest_id);
        self.send_to(
            guest_id,
            &S2C::Welcome {
                guest_id,
                role,
                authority,
                shared: self.shared,
                guests,
            },
        );
        self.broadcast_except(guest_id, &S2C::GuestJoined(GuestRecord::new(guest_id, record)));
        Ok(())
    }

    /// Store and fan out the shared blob. Only the token holder may write it.
    pub fn handle_shared_write(
        &mut self,
        guest_id: GuestId,
        shared: SharedState,
    ) -> std::result::Result<(), RejectReason> {
        self.record(guest_id)?;
        if self.authority != Some(guest_id) {
            return Err(RejectReason::NotAuthority);
        }

        if shared.phase != self.shared.phase {
            self.env
                .log(format!("DO: Phase {:?} -> {:?}", self.shared.phase, shared.phase));
        }
        self.shared = shared;
        self.broadcast_except(guest_id, &S2C::Shared(shared));
        Ok(())
    }

    /// Store and fan out a guest's own record. The role stays the one assigned on join.
    pub fn handle_record_write(
        &mut self,
        guest_id: GuestId,
        state: ParticipantState,
    ) -> std::result::Result<(), RejectReason> {
        let current = self.record(guest_id)?;
        let record = ParticipantState {
            paddle: self.config.clamp_paddle(state.paddle),
            role: current.role,
        };
        if let Some(info) = self.clients.get_mut(&guest_id) {
            info.record = Some(record);
        }
        self.broadcast_except(guest_id, &S2C::GuestUpdated(GuestRecord::new(guest_id, record)));
        Ok(())
    }

    /// Teardown of a guest. Returns false for unknown ids.
    pub fn remove_guest(&mut self, guest_id: GuestId) -> bool {
        let Some(info) = self.clients.remove(&guest_id) else {
            return false;
        };

        if self.authority == Some(guest_id) {
            self.authority = None;
            self.env
                .log(format!("DO: Authority guest {} left, token released", guest_id));
        }

        if info.record.is_some() {
            self.broadcast_except(guest_id, &S2C::GuestLeft { guest_id });
            if self.joined_count() == 0 {
                self.env.log("DO: Room empty, resetting shared state".to_string());
                self.shared = SharedState::new(&self.config);
            }
        }

        self.env.log(format!(
            "DO: Guest {} removed (connections: {})",
            guest_id,
            self.clients.len()
        ));
        true
    }

    /// Drop guests idle past the timeout. Returns the ids removed.
    pub fn sweep_idle(&mut self) -> Vec<GuestId> {
        let now = self.now_secs();
        let mut idle: Vec<GuestId> = self
            .clients
            .iter()
            .filter(|(_, info)| now.saturating_sub(info.last_activity) > IDLE_TIMEOUT_SECS)
            .map(|(&guest_id, _)| guest_id)
            .collect();
        idle.sort_unstable();

        for &guest_id in &idle {
            self.env
                .log(format!("DO: Guest {} idle, disconnecting", guest_id));
            if let Some(info) = self.clients.get(&guest_id) {
                let _ = info.client.disconnect("Idle timeout");
            }
            self.remove_guest(guest_id);
        }
        idle
    }

    fn guest_records_except(&self, guest_id: GuestId) -> Vec<GuestRecord> {
        let mut records: Vec<GuestRecord> = self
            .clients
            .iter()
            .filter(|(&id, _)| id != guest_id)
            .filter_map(|(&id, info)| info.record.map(|record| GuestRecord::new(id, record)))
            .collect();
        records.sort_by_key(|record| record.guest_id);
        records
    }

    pub fn send_to(&self, guest_id: GuestId, msg: &S2C) {
        let Some(info) = self.clients.get(&guest_id) else {
            return;
        };
        match msg.to_bytes() {
            Ok(bytes) => {
                let _ = info.client.send_bytes(&bytes);
            }
            Err(e) => self.env.log(format!("DO: Failed to serialize {msg:?}: {e:?}")),
        }
    }

    /// Send to every joined guest but `sender`
    pub fn broadcast_except(&self, sender: GuestId, msg: &S2C) {
        let bytes = match msg.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.env.log(format!("DO: Failed to serialize {msg:?}: {e:?}"));
                return;
            }
        };
        for (&guest_id, info) in &self.clients {
            if guest_id != sender && info.record.is_some() {
                let _ = info.client.send_bytes(&bytes);
            }
        }
    }
}
