/// Game tuning parameters for 3D Pong
///
/// Distances are world units, durations are simulation frames unless noted.
#[derive(Debug, Clone, Copy)]
pub struct Params;

impl Params {
    // Prism (the playing volume). Players face each other along z.
    pub const PRISM_LENGTH: f32 = 1000.0;
    pub const PRISM_WIDTH: f32 = 800.0;
    pub const PRISM_HEIGHT: f32 = 500.0;

    // Paddle
    pub const PADDLE_SIZE: f32 = 60.0;
    pub const PADDLE_DEPTH: f32 = 10.0; // render only

    // Ball
    pub const BALL_RADIUS: f32 = 20.0;
    pub const BALL_SPEED: f32 = 5.0; // units per frame

    // Score
    pub const WIN_SCORE: u8 = 10;

    // Countdowns
    pub const CONTACT_FRAMES: u16 = 30;
    pub const GOAL_FLASH_FRAMES: u16 = 30;
    pub const PAUSE_FRAMES: u16 = 30;

    // Scheduling
    pub const FIXED_DT: f32 = 1.0 / 60.0; // seconds per simulation frame
    pub const MAX_CATCH_UP_STEPS: u32 = 5;
}
