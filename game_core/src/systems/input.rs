use glam::Vec2;

use crate::{Config, Side};

/// Canvas size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Map a pointer position to a paddle center, as seen from `viewpoint`.
///
/// The prism's half height fills the canvas' half height. Seen from player
/// two's end the x axis runs the other way, so it is mirrored there.
pub fn paddle_from_pointer(
    pointer: Vec2,
    viewport: Viewport,
    viewpoint: Side,
    config: &Config,
) -> Vec2 {
    let half_height = (viewport.height / 2.0).max(1.0);
    let scale = (config.prism_height / 2.0) / half_height;
    let mirror = match viewpoint {
        Side::One => 1.0,
        Side::Two => -1.0,
    };

    let offset = pointer - viewport.center();
    config.clamp_paddle(Vec2::new(mirror * offset.x * scale, offset.y * scale))
}
