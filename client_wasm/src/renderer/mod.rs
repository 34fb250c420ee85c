pub mod draw;
pub mod init;
pub mod pipeline;
pub mod resources;
pub mod shaders;

use crate::camera::{Camera, CameraUniform};
use crate::mesh::{create_box_edges, create_cube, create_quad, create_sphere, Mesh};
use crate::scene::Scene;
use resources::SceneBuffers;
use wgpu::*;

const SPHERE_SEGMENTS: u32 = 24;

/// The four unit meshes every scene is drawn from
pub struct Meshes {
    pub edges: Mesh,
    pub sphere: Mesh,
    pub cube: Mesh,
    pub quad: Mesh,
}

pub struct Renderer {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub depth_view: TextureView,

    // Pipelines
    pub line_pipeline: RenderPipeline,
    pub solid_pipeline: RenderPipeline,
    pub translucent_pipeline: RenderPipeline,

    // Bind Groups
    pub camera_bind_group: BindGroup,

    // Resources
    pub camera_buffer: Buffer,
    pub instances: SceneBuffers,
    pub meshes: Meshes,
}

impl Renderer {
    pub async fn new(canvas: web_sys::HtmlCanvasElement, initial: &Camera) -> Result<Self, String> {
        let ctx = init::init_wgpu(canvas).await?;

        let camera_buffer = resources::create_camera_buffer(&ctx.device, initial);
        let instances = resources::create_scene_buffers(&ctx.device);
        let depth_view = resources::create_depth_view(&ctx.device, &ctx.config);
        let pipes = pipeline::create_pipelines(&ctx.device, ctx.config.format);

        let meshes = Meshes {
            edges: Mesh::new(&ctx.device, &ctx.queue, "Edges", create_box_edges()),
            sphere: Mesh::new(
                &ctx.device,
                &ctx.queue,
                "Sphere",
                create_sphere(SPHERE_SEGMENTS),
            ),
            cube: Mesh::new(&ctx.device, &ctx.queue, "Cube", create_cube()),
            quad: Mesh::new(&ctx.device, &ctx.queue, "Quad", create_quad()),
        };

        let camera_bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &pipes.camera_layout,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        Ok(Self {
            device: ctx.device,
            queue: ctx.queue,
            surface: ctx.surface,
            surface_config: ctx.config,
            depth_view,
            line_pipeline: pipes.line_pipeline,
            solid_pipeline: pipes.solid_pipeline,
            translucent_pipeline: pipes.translucent_pipeline,
            camera_bind_group,
            camera_buffer,
            instances,
            meshes,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Reconfigure for a new backing size in device pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.surface_config.width, self.surface_config.height) {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = resources::create_depth_view(&self.device, &self.surface_config);
        log::debug!("Surface resized to {}x{}", width, height);
    }

    pub fn draw(&mut self, scene: &Scene, camera: &Camera) -> Result<(), String> {
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::from_camera(camera)]),
        );
        draw::draw_frame(self, scene)
    }
}
