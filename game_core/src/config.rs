use crate::{Params, Side};
use glam::Vec2;

/// Game configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub prism_length: f32,
    pub prism_width: f32,
    pub prism_height: f32,
    pub paddle_size: f32,
    pub paddle_depth: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub win_score: u8,
    pub contact_frames: u16,
    pub goal_flash_frames: u16,
    pub pause_frames: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prism_length: Params::PRISM_LENGTH,
            prism_width: Params::PRISM_WIDTH,
            prism_height: Params::PRISM_HEIGHT,
            paddle_size: Params::PADDLE_SIZE,
            paddle_depth: Params::PADDLE_DEPTH,
            ball_radius: Params::BALL_RADIUS,
            ball_speed: Params::BALL_SPEED,
            win_score: Params::WIN_SCORE,
            contact_frames: Params::CONTACT_FRAMES,
            goal_flash_frames: Params::GOAL_FLASH_FRAMES,
            pause_frames: Params::PAUSE_FRAMES,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn half_length(&self) -> f32 {
        self.prism_length / 2.0
    }

    /// Ball-center limits for the side walls (x, y)
    pub fn wall_limits(&self) -> Vec2 {
        Vec2::new(
            self.prism_width / 2.0 - self.ball_radius,
            self.prism_height / 2.0 - self.ball_radius,
        )
    }

    /// Z coordinate of the end wall a side defends
    pub fn end_z(&self, side: Side) -> f32 {
        match side {
            Side::One => -self.half_length(),
            Side::Two => self.half_length(),
        }
    }

    /// Max per-axis distance between paddle and ball centers that still counts as a hit
    pub fn paddle_reach(&self) -> f32 {
        self.paddle_size / 2.0 + self.ball_radius
    }

    /// Upper bound of the random x/y speed given on serve and on paddle hits
    pub fn max_lateral_speed(&self) -> f32 {
        self.ball_speed / 2.0
    }

    /// Clamp paddle center to the playable rectangle
    pub fn clamp_paddle(&self, pos: Vec2) -> Vec2 {
        let half = self.paddle_size / 2.0;
        let max_x = self.prism_width / 2.0 - half;
        let max_y = self.prism_height / 2.0 - half;
        Vec2::new(pos.x.clamp(-max_x, max_x), pos.y.clamp(-max_y, max_y))
    }
}
