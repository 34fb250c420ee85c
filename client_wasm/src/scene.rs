//! Scene extraction
//!
//! Turns the session into per-mesh instance lists for the renderer, and the
//! score line for the page. Nothing here touches the GPU.

use game_core::{Config, Role, Session, SharedState, Side};
use glam::Vec3;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const PADDLE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 100.0 / 255.0];
const CONTACT_TINT: [f32; 4] = [100.0 / 255.0, 100.0 / 255.0, 1.0, 100.0 / 255.0];
const GOAL_FLASH_TINT: [f32; 3] = [1.0, 0.15, 0.15];
const GOAL_FLASH_MAX_ALPHA: f32 = 0.4;
/// Highlight box grows past the paddle by this much on x and y
const CONTACT_GROWTH: f32 = 5.0;
const CONTACT_DEPTH: f32 = 12.0;

/// Instance data for rendering (matches shader InstanceInput).
/// Must use `repr(C)` and `bytemuck` to safely cast to raw bytes for the GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub offset: [f32; 3],
    pub scale: [f32; 3],
    pub tint: [f32; 4], // rgba
}

impl InstanceData {
    pub fn new(offset: Vec3, scale: Vec3, tint: [f32; 4]) -> Self {
        Self {
            offset: offset.to_array(),
            scale: scale.to_array(),
            tint,
        }
    }
}

/// Everything to draw this frame, grouped by mesh
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scene {
    /// Unit box edges
    pub wireframes: Vec<InstanceData>,
    /// Unit sphere
    pub spheres: Vec<InstanceData>,
    /// Unit cube, translucent
    pub boxes: Vec<InstanceData>,
    /// Unit quad in the x/y plane, translucent
    pub planes: Vec<InstanceData>,
}

impl Scene {
    pub fn build(session: &Session, config: &Config) -> Self {
        let shared = session.shared();
        let mut scene = Scene::default();

        scene.wireframes.push(InstanceData::new(
            Vec3::ZERO,
            Vec3::new(config.prism_width, config.prism_height, config.prism_length),
            WHITE,
        ));

        // Ball only once there is someone to play against
        if session.participant_count() >= 2 {
            scene.spheres.push(InstanceData::new(
                shared.ball.pos,
                Vec3::splat(config.ball_radius),
                WHITE,
            ));
        }

        for (side, paddle) in session.paddles() {
            let center = paddle.extend(config.end_z(side));
            scene.boxes.push(InstanceData::new(
                center,
                Vec3::new(config.paddle_size, config.paddle_size, config.paddle_depth),
                PADDLE_TINT,
            ));
            if shared.indicators.contact(side) > 0 {
                let size = config.paddle_size + CONTACT_GROWTH;
                scene.boxes.push(InstanceData::new(
                    center,
                    Vec3::new(size, size, CONTACT_DEPTH),
                    CONTACT_TINT,
                ));
            }
        }

        for side in [Side::One, Side::Two] {
            let frames = shared.indicators.goal_flash(side);
            if frames == 0 {
                continue;
            }
            let fade = f32::from(frames) / f32::from(config.goal_flash_frames.max(1));
            let [r, g, b] = GOAL_FLASH_TINT;
            scene.planes.push(InstanceData::new(
                Vec3::new(0.0, 0.0, config.end_z(side)),
                Vec3::new(config.prism_width, config.prism_height, 1.0),
                [r, g, b, GOAL_FLASH_MAX_ALPHA * fade.min(1.0)],
            ));
        }

        scene
    }
}

/// Text for the `score-display` element, from `role`'s point of view
pub fn score_text(shared: &SharedState, role: Role) -> String {
    match shared.phase.winner() {
        None => format!("{} - {}", shared.score.player1, shared.score.player2),
        Some(winner) => match role.side() {
            Some(side) if side == winner => "You win!".to_string(),
            Some(_) => "You lose!".to_string(),
            None => match winner {
                Side::One => "Player 1 wins!".to_string(),
                Side::Two => "Player 2 wins!".to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{LocalParticipant, ParticipantState, Phase};
    use glam::Vec2;

    fn session_with_opponent() -> (Session, Config) {
        let config = Config::new();
        let mut session = Session::new(
            LocalParticipant::new(1, Role::Player(Side::One)),
            true,
            SharedState::new(&config),
        );
        session.set_local_paddle(Vec2::new(10.0, -20.0), &config);
        session.upsert_guest(
            2,
            ParticipantState {
                paddle: Vec2::new(-30.0, 40.0),
                role: Role::Player(Side::Two),
            },
        );
        (session, config)
    }

    #[test]
    fn test_ball_hidden_until_opponent() {
        let config = Config::new();
        let session = Session::new(
            LocalParticipant::new(1, Role::Player(Side::One)),
            true,
            SharedState::new(&config),
        );
        let scene = Scene::build(&session, &config);
        assert_eq!(scene.wireframes.len(), 1);
        assert!(scene.spheres.is_empty());
        assert_eq!(scene.boxes.len(), 1, "Own paddle only");
    }

    #[test]
    fn test_paddles_sit_at_their_ends() {
        let (session, config) = session_with_opponent();
        let scene = Scene::build(&session, &config);

        assert_eq!(scene.spheres.len(), 1);
        assert_eq!(scene.boxes.len(), 2);
        assert_eq!(scene.boxes[0].offset, [10.0, -20.0, -500.0]);
        assert_eq!(scene.boxes[1].offset, [-30.0, 40.0, 500.0]);
        assert!(scene.planes.is_empty());
    }

    #[test]
    fn test_contact_and_goal_flash_overlays() {
        let config = Config::new();
        let mut shared = SharedState::new(&config);
        shared.indicators.set_contact(Side::Two, 12);
        shared.indicators.set_goal_flash(Side::One, 30);

        // Followers render whatever the authority sent
        let mut session = Session::new(
            LocalParticipant::new(2, Role::Player(Side::Two)),
            false,
            shared,
        );
        session.upsert_guest(1, ParticipantState::new(Role::Player(Side::One)));

        let scene = Scene::build(&session, &config);
        assert_eq!(scene.boxes.len(), 3, "Two paddles plus one highlight");
        let highlight = scene.boxes.iter().find(|b| b.tint == CONTACT_TINT).unwrap();
        assert_eq!(highlight.offset[2], 500.0);
        assert_eq!(highlight.scale, [65.0, 65.0, 12.0]);

        assert_eq!(scene.planes.len(), 1);
        assert_eq!(scene.planes[0].offset, [0.0, 0.0, -500.0]);
        assert!((scene.planes[0].tint[3] - GOAL_FLASH_MAX_ALPHA).abs() < 1e-6);
    }

    #[test]
    fn test_score_text() {
        let mut shared = SharedState::default();
        shared.score.player1 = 3;
        shared.score.player2 = 7;
        assert_eq!(score_text(&shared, Role::Player(Side::One)), "3 - 7");

        shared.phase = Phase::Ended { winner: Side::Two };
        assert_eq!(score_text(&shared, Role::Player(Side::Two)), "You win!");
        assert_eq!(score_text(&shared, Role::Player(Side::One)), "You lose!");
        assert_eq!(score_text(&shared, Role::Observer), "Player 2 wins!");
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 40);
    }
}
