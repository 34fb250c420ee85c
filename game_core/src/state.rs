//! Replicated state blobs
//!
//! `SharedState` is written by the authority only and mirrored to everyone.
//! `ParticipantState` is written by its owner only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{Ball, Config, Indicators, Phase, Role, Score};

/// The shared blob: everything the simulation step owns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharedState {
    pub ball: Ball,
    pub score: Score,
    pub indicators: Indicators,
    pub phase: Phase,
}

impl SharedState {
    pub fn new(config: &Config) -> Self {
        Self {
            ball: Ball::initial(config),
            score: Score::new(),
            indicators: Indicators::new(),
            phase: Phase::Playing,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// A participant's own record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantState {
    pub paddle: Vec2,
    pub role: Role,
}

impl ParticipantState {
    pub fn new(role: Role) -> Self {
        Self {
            paddle: Vec2::ZERO,
            role,
        }
    }

    pub fn is_player1(&self) -> bool {
        self.role.is_player1()
    }
}
