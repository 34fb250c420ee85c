pub mod components;
pub mod config;
pub mod params;
pub mod resources;
pub mod roles;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod systems;

pub use components::*;
pub use config::*;
pub use params::*;
pub use resources::*;
pub use roles::*;
pub use scheduler::*;
pub use session::*;
pub use state::*;
pub use systems::{paddle_from_pointer, Viewport};

use hecs::World;
use systems::*;

/// Run one frame of the authoritative Pong simulation.
///
/// `guests` holds the other participants' replicated records; `me` is the
/// local participant, who may be defending one of the ends.
pub fn step(
    shared: &mut SharedState,
    guests: &World,
    me: &LocalParticipant,
    config: &Config,
    rng: &mut GameRng,
    events: &mut Events,
) {
    // Clear events at start of frame
    events.clear();

    // 1. Cosmetic countdowns run even while paused
    shared.indicators.tick();

    // 2. Pause between points, or the game is over
    if tick_pause(&mut shared.phase) {
        return;
    }

    // 3. Move ball
    move_ball(&mut shared.ball);

    // 4. Side walls
    bounce_walls(&mut shared.ball, config, events);

    // 5. End walls: paddle returns and points
    check_end_walls(shared, guests, me, config, rng, events);
}
