use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Config, GameRng};

/// Relay-assigned identifier of a connected guest
pub type GuestId = u32;

/// One end of the prism. `One` defends -z, `Two` defends +z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Sign of z travel toward this side's end wall
    pub fn z_sign(self) -> f32 {
        match self {
            Side::One => -1.0,
            Side::Two => 1.0,
        }
    }
}

/// What a participant does in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Observer,
    Player(Side),
}

impl Role {
    pub fn side(self) -> Option<Side> {
        match self {
            Role::Player(side) => Some(side),
            Role::Observer => None,
        }
    }

    pub fn is_player1(self) -> bool {
        self == Role::Player(Side::One)
    }
}

/// Ball - position and per-frame velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec3,
    pub vel: Vec3,
}

impl Ball {
    pub fn new(pos: Vec3, vel: Vec3) -> Self {
        Self { pos, vel }
    }

    /// Ball at session start
    pub fn initial(config: &Config) -> Self {
        Self::new(Vec3::ZERO, Vec3::new(config.ball_speed, 1.0, 1.0))
    }

    /// Serve from the center toward `toward` with a random lateral drift
    pub fn reset(&mut self, toward: Side, config: &Config, rng: &mut GameRng) {
        self.pos = Vec3::ZERO;
        let drift = rng.lateral(config.max_lateral_speed());
        self.vel = Vec3::new(drift.x, drift.y, toward.z_sign() * config.ball_speed);
    }
}

/// Paddle component - center of a participant's paddle in the x/y plane
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Paddle {
    pub pos: Vec2,
}

impl Paddle {
    pub fn new(pos: Vec2) -> Self {
        Self { pos }
    }
}

/// Participant component - a remote guest's identity and role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub id: GuestId,
    pub role: Role,
}

impl Participant {
    pub fn new(id: GuestId, role: Role) -> Self {
        Self { id, role }
    }
}
