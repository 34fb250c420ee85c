use crate::camera::{Camera, CameraUniform};
use crate::scene::InstanceData;
use wgpu::util::DeviceExt;
use wgpu::*;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Growable per-mesh instance buffer
pub struct InstanceBuffer {
    label: &'static str,
    buffer: Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBuffer {
    pub fn new(device: &Device, label: &'static str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            label,
            buffer: Self::allocate(device, label, capacity),
            capacity,
            count: 0,
        }
    }

    fn allocate(device: &Device, label: &str, capacity: usize) -> Buffer {
        device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Upload this frame's instances, growing the buffer if needed
    pub fn write(&mut self, device: &Device, queue: &Queue, instances: &[InstanceData]) {
        if instances.len() > self.capacity {
            self.capacity = instances.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.label, self.capacity);
            log::debug!("Grew {} to {} instances", self.label, self.capacity);
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances));
        }
        self.count = instances.len() as u32;
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Instance buffers, one per scene list
pub struct SceneBuffers {
    pub wireframes: InstanceBuffer,
    pub spheres: InstanceBuffer,
    pub boxes: InstanceBuffer,
    pub planes: InstanceBuffer,
}

pub fn create_scene_buffers(device: &Device) -> SceneBuffers {
    SceneBuffers {
        wireframes: InstanceBuffer::new(device, "Wireframe Instance Buffer", 1),
        spheres: InstanceBuffer::new(device, "Sphere Instance Buffer", 1),
        boxes: InstanceBuffer::new(device, "Box Instance Buffer", 4),
        planes: InstanceBuffer::new(device, "Plane Instance Buffer", 2),
    }
}

pub fn create_camera_buffer(device: &Device, camera: &Camera) -> Buffer {
    let camera_uniform = CameraUniform::from_camera(camera);
    device.create_buffer_init(&util::BufferInitDescriptor {
        label: Some("Camera Buffer"),
        contents: bytemuck::cast_slice(&[camera_uniform]),
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
    })
}

pub fn create_depth_view(device: &Device, config: &SurfaceConfiguration) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Depth Texture"),
        size: Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&TextureViewDescriptor::default())
}
