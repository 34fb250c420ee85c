use crate::Ball;

/// Explicit Euler step; one unit of time is one frame
pub fn move_ball(ball: &mut Ball) {
    ball.pos += ball.vel;
}
