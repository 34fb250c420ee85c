use crate::systems::collision::{defender_paddle, is_colliding, paddle_hit, side_number};
use crate::{Config, Events, GameRng, LocalParticipant, Phase, SharedState, Side};
use hecs::World;

/// End wall test along z: paddle hit, or a point when the ball gets past.
pub fn check_end_walls(
    shared: &mut SharedState,
    guests: &World,
    me: &LocalParticipant,
    config: &Config,
    rng: &mut GameRng,
    events: &mut Events,
) {
    let half_length = config.half_length();
    let z = shared.ball.pos.z;

    // Which end is the ball within reach of?
    let side = if z < -half_length + config.ball_radius {
        Side::One
    } else if z > half_length - config.ball_radius {
        Side::Two
    } else {
        return;
    };

    // A ball already travelling away from this end was returned last frame
    if shared.ball.vel.z * side.z_sign() <= 0.0 {
        return;
    }

    let hit = defender_paddle(guests, me, side)
        .is_some_and(|paddle| is_colliding(paddle, &shared.ball, config));

    if hit {
        paddle_hit(
            &mut shared.ball,
            side,
            config,
            rng,
            &mut shared.indicators,
            events,
        );
    } else if z.abs() > half_length {
        award_point(shared, side.opponent(), config, rng, events);
    }
}

/// Credit `scorer`, flash the conceding end, then pause or end the game and re-serve
pub fn award_point(
    shared: &mut SharedState,
    scorer: Side,
    config: &Config,
    rng: &mut GameRng,
    events: &mut Events,
) {
    if shared.phase.is_ended() {
        return;
    }

    let conceded = scorer.opponent();
    shared.score.increment(scorer);
    shared
        .indicators
        .set_goal_flash(conceded, config.goal_flash_frames);
    events.record_score(scorer);

    log::info!(
        "SCORE! Player {} scored. Current score: {} - {}",
        side_number(scorer),
        shared.score.player1,
        shared.score.player2
    );

    if let Some(winner) = shared.score.has_winner(config.win_score) {
        shared.phase = Phase::Ended { winner };
        events.game_ended = true;
        log::info!("Player {} wins!", side_number(winner));
    } else {
        shared.phase = Phase::Paused {
            frames_left: config.pause_frames,
        };
    }

    // Serve in the scorer's direction of play
    shared.ball.reset(conceded, config, rng);
}
