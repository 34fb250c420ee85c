//! Camera for 3D Pong
//!
//! Perspective camera sitting behind one end of the prism, far enough back
//! that the whole end face fills the view height.

use game_core::{Config, Side};
use glam::{Mat4, Vec3};

/// Camera struct
pub struct Camera {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Camera {
    pub const FOV_Y: f32 = std::f32::consts::PI / 3.0;
    pub const NEAR: f32 = 1.0;

    /// Camera behind `viewpoint`'s end, looking at the center. Screen down is +y.
    pub fn behind(viewpoint: Side, aspect: f32, config: &Config) -> Self {
        let eye = Self::eye(viewpoint, config);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::NEG_Y);
        let projection = Mat4::perspective_rh(
            Self::FOV_Y,
            aspect.max(0.01),
            Self::NEAR,
            config.prism_length * 2.0,
        );
        Self { view, projection }
    }

    pub fn eye(viewpoint: Side, config: &Config) -> Vec3 {
        let back = (config.prism_height / 2.0) / (Self::FOV_Y / 2.0).tan();
        Vec3::new(0.0, 0.0, viewpoint.z_sign() * (config.half_length() + back))
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Camera uniform data (matches WGSL struct, 256-byte aligned)
#[repr(C, align(256))]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4], // 64 bytes (mat4x4)
    _padding: [f32; 48],      // 192 bytes padding (48 * 4) to reach 256 bytes
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            _padding: [0.0; 48],
        }
    }
}
