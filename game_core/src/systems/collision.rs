use crate::{Ball, Config, Events, GameRng, Indicators, LocalParticipant, Paddle, Participant, Role, Side};
use glam::Vec2;
use hecs::World;

/// Reflect the ball off the four side walls.
///
/// Only the velocity flips; the ball may sit past the limit by its overshoot
/// until the next frame carries it back.
pub fn bounce_walls(ball: &mut Ball, config: &Config, events: &mut Events) {
    let limits = config.wall_limits();

    if ball.pos.x > limits.x || ball.pos.x < -limits.x {
        ball.vel.x = -ball.vel.x;
        events.wall_bounce = true;
    }
    if ball.pos.y > limits.y || ball.pos.y < -limits.y {
        ball.vel.y = -ball.vel.y;
        events.wall_bounce = true;
    }
}

/// Axis-aligned box test between a paddle center and the ball center
pub fn is_colliding(paddle: Vec2, ball: &Ball, config: &Config) -> bool {
    let reach = config.paddle_reach();
    (paddle.x - ball.pos.x).abs() < reach && (paddle.y - ball.pos.y).abs() < reach
}

/// Paddle position of whoever defends `side`.
///
/// Remote records win; the local participant is the fallback while the
/// replicated view has not caught up.
pub fn defender_paddle(guests: &World, me: &LocalParticipant, side: Side) -> Option<Vec2> {
    let role = Role::Player(side);
    guests
        .query::<(&Participant, &Paddle)>()
        .iter()
        .find(|(_e, (participant, _))| participant.role == role)
        .map(|(_e, (_, paddle))| paddle.pos)
        .or_else(|| (me.state.role == role).then_some(me.state.paddle))
}

/// Return the ball from `side`'s paddle with a fresh random lateral drift
pub fn paddle_hit(
    ball: &mut Ball,
    side: Side,
    config: &Config,
    rng: &mut GameRng,
    indicators: &mut Indicators,
    events: &mut Events,
) {
    ball.vel.z = -ball.vel.z;
    let drift = rng.lateral(config.max_lateral_speed());
    ball.vel.x = drift.x;
    ball.vel.y = drift.y;

    indicators.set_contact(side, config.contact_frames);
    events.record_hit(side);
    log::info!("Player {} hit the ball!", side_number(side));
}

pub(crate) fn side_number(side: Side) -> u8 {
    match side {
        Side::One => 1,
        Side::Two => 2,
    }
}
