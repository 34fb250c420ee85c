use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Side;

/// Game score tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub player1: u8,
    pub player2: u8,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, side: Side) {
        match side {
            Side::One => self.player1 = self.player1.saturating_add(1),
            Side::Two => self.player2 = self.player2.saturating_add(1),
        }
    }

    pub fn has_winner(&self, win_score: u8) -> Option<Side> {
        if self.player1 >= win_score {
            Some(Side::One)
        } else if self.player2 >= win_score {
            Some(Side::Two)
        } else {
            None
        }
    }
}

/// Cosmetic countdowns, in frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    pub player1_contact: u16,
    pub player2_contact: u16,
    pub player1_goal_flash: u16,
    pub player2_goal_flash: u16,
}

impl Indicators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every active timer down by one frame
    pub fn tick(&mut self) {
        for timer in [
            &mut self.player1_contact,
            &mut self.player2_contact,
            &mut self.player1_goal_flash,
            &mut self.player2_goal_flash,
        ] {
            *timer = timer.saturating_sub(1);
        }
    }

    pub fn contact(&self, side: Side) -> u16 {
        match side {
            Side::One => self.player1_contact,
            Side::Two => self.player2_contact,
        }
    }

    pub fn goal_flash(&self, side: Side) -> u16 {
        match side {
            Side::One => self.player1_goal_flash,
            Side::Two => self.player2_goal_flash,
        }
    }

    pub fn set_contact(&mut self, side: Side, frames: u16) {
        match side {
            Side::One => self.player1_contact = frames,
            Side::Two => self.player2_contact = frames,
        }
    }

    pub fn set_goal_flash(&mut self, side: Side, frames: u16) {
        match side {
            Side::One => self.player1_goal_flash = frames,
            Side::Two => self.player2_goal_flash = frames,
        }
    }
}

/// Coarse game state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Playing,
    /// Short break after a point; the ball is frozen
    Paused { frames_left: u16 },
    /// Terminal. Only a new session starts a new game.
    Ended { winner: Side },
}

impl Phase {
    pub fn is_ended(&self) -> bool {
        matches!(self, Phase::Ended { .. })
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Phase::Ended { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// Random x/y velocity, each component in [-max, max]
    pub fn lateral(&mut self, max: f32) -> Vec2 {
        use rand::Rng;
        let max = max.abs();
        Vec2::new(
            self.0.gen_range(-max..=max),
            self.0.gen_range(-max..=max),
        )
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events that occurred during the last step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Events {
    pub player1_hit: bool,
    pub player2_hit: bool,
    pub player1_scored: bool,
    pub player2_scored: bool,
    pub wall_bounce: bool,
    pub game_ended: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn record_hit(&mut self, side: Side) {
        match side {
            Side::One => self.player1_hit = true,
            Side::Two => self.player2_hit = true,
        }
    }

    pub fn record_score(&mut self, side: Side) {
        match side {
            Side::One => self.player1_scored = true,
            Side::Two => self.player2_scored = true,
        }
    }

    pub fn any_score(&self) -> bool {
        self.player1_scored || self.player2_scored
    }
}
