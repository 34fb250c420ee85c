use game_core::GuestId;
use proto::*;
use std::cell::RefCell;
use std::time::Duration;
use worker::*;

pub mod room;

#[cfg(test)]
mod tests;

use room::{RoomState, WasmEnv, SWEEP_INTERVAL_MS};

const GUEST_TAG_PREFIX: &str = "guest:";

fn guest_tag(guest_id: GuestId) -> String {
    format!("{GUEST_TAG_PREFIX}{guest_id}")
}

/// Recover the guest id a socket was accepted with
pub fn guest_id_from_tags(tags: &[String]) -> Option<GuestId> {
    tags.iter()
        .find_map(|tag| tag.strip_prefix(GUEST_TAG_PREFIX))
        .and_then(|id| id.parse().ok())
}

#[durable_object]
pub struct RoomDO {
    state: State,
    #[allow(dead_code)]
    env: Env,
    room: RefCell<RoomState>,
}

impl DurableObject for RoomDO {
    fn new(state: State, env: Env) -> Self {
        let mut room = RoomState::new(Box::new(WasmEnv));
        // Hibernated sockets keep their tags across a rebuild
        let highest = state
            .get_websockets()
            .iter()
            .filter_map(|ws| guest_id_from_tags(&state.get_tags(ws)))
            .max();
        if let Some(highest) = highest {
            room.reserve_ids_through(highest);
        }
        Self {
            state,
            env,
            room: RefCell::new(room),
        }
    }

    async fn fetch(&self, req: Request) -> Result<Response> {
        // Check for WebSocket upgrade
        match req.headers().get("Upgrade") {
            Ok(Some(header)) if header.to_lowercase() == "websocket" => {}
            Ok(_) => return Response::error("Expected WebSocket upgrade request", 426),
            Err(err) => {
                console_error!("DO: Failed to read Upgrade header: {:?}", err);
                return Response::error("Failed to read request headers", 500);
            }
        }

        let pair = match WebSocketPair::new() {
            Ok(pair) => pair,
            Err(err) => {
                console_error!("DO: Failed to create WebSocket pair: {:?}", err);
                return Response::error("Failed to create WebSocket pair", 500);
            }
        };
        let server = pair.server;

        let (guest_id, was_empty) = {
            let mut room = self.room.borrow_mut();
            let was_empty = !room.has_clients();
            (room.connect(Box::new(server.clone())), was_empty)
        };

        let tag = guest_tag(guest_id);
        self.state.accept_websocket_with_tags(&server, &[tag.as_str()]);

        // Start the idle sweep with the first connection
        if was_empty {
            self.schedule_sweep().await?;
        }

        Response::from_websocket(pair.client)
    }

    async fn websocket_message(
        &self,
        ws: WebSocket,
        message: durable::WebSocketIncomingMessage,
    ) -> Result<()> {
        let bytes = match message {
            durable::WebSocketIncomingMessage::Binary(bytes) => bytes,
            // Ignore text messages
            durable::WebSocketIncomingMessage::String(_) => return Ok(()),
        };

        let Some(guest_id) = guest_id_from_tags(&self.state.get_tags(&ws)) else {
            console_error!("DO: Message from untagged socket");
            return Ok(());
        };

        if self.room.borrow().close_if_unknown(guest_id, &ws) {
            return Ok(());
        }

        match C2S::from_bytes(&bytes) {
            Ok(msg) => self.room.borrow_mut().handle_message(guest_id, msg),
            Err(e) => console_error!("DO: Failed to parse C2S message from guest {guest_id}: {e:?}"),
        }
        Ok(())
    }

    async fn websocket_close(
        &self,
        ws: WebSocket,
        code: usize,
        reason: String,
        _was_clean: bool,
    ) -> Result<()> {
        console_log!("DO: WebSocket close event (code: {}, reason: {})", code, reason);
        self.teardown(&ws);
        Ok(())
    }

    async fn websocket_error(&self, ws: WebSocket, error: Error) -> Result<()> {
        console_error!("DO: WebSocket error: {:?}", error);
        self.teardown(&ws);
        Ok(())
    }

    #[allow(clippy::await_holding_refcell_ref)] // We drop the RefCell borrow before await
    async fn alarm(&self) -> Result<Response> {
        let mut room = self.room.borrow_mut();
        room.sweep_idle();

        if !room.has_clients() {
            drop(room);
            return Response::ok("No clients, stopping sweep");
        }
        drop(room);

        self.schedule_sweep().await?;
        Response::ok("Sweep done")
    }
}

impl RoomDO {
    fn teardown(&self, ws: &WebSocket) {
        match guest_id_from_tags(&self.state.get_tags(ws)) {
            Some(guest_id) => {
                self.room.borrow_mut().remove_guest(guest_id);
            }
            None => console_error!("DO: Closed socket carries no guest tag"),
        }
    }

    async fn schedule_sweep(&self) -> Result<()> {
        self.state
            .storage()
            .set_alarm(Duration::from_millis(SWEEP_INTERVAL_MS))
            .await
    }
}
