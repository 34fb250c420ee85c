//! Mesh generation for 3D Pong
//!
//! Every mesh is unit sized and centered on the origin; instances scale it.
//! Sphere has radius 1. Cube, quad and box edges span -0.5..0.5.

/// Vertex data for meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Unit sphere as a UV grid of `segments` rings by `segments` slices
pub fn create_sphere(segments: u32) -> (Vec<Vertex>, Vec<u16>) {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity(((segments + 1) * (segments + 1)) as usize);
    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);

    for ring in 0..=segments {
        let theta = std::f32::consts::PI * ring as f32 / segments as f32;
        for slice in 0..=segments {
            let phi = std::f32::consts::TAU * slice as f32 / segments as f32;
            let p = [theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()];
            vertices.push(Vertex::new(p, p));
        }
    }

    let stride = (segments + 1) as u16;
    for ring in 0..segments as u16 {
        for slice in 0..segments as u16 {
            let a = ring * stride + slice;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }

    (vertices, indices)
}

/// Unit cube with flat normals, four vertices per face
pub fn create_cube() -> (Vec<Vertex>, Vec<u16>) {
    // Outward normal, then the two in-face axes
    const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (normal, u, v)) in FACES.iter().enumerate() {
        for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
            let position =
                std::array::from_fn(|i| normal[i] * 0.5 + u[i] * su + v[i] * sv);
            vertices.push(Vertex::new(position, *normal));
        }
        let base = (face * 4) as u16;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    (vertices, indices)
}

/// Unit quad in the x/y plane facing -z
pub fn create_quad() -> (Vec<Vertex>, Vec<u16>) {
    let normal = [0.0, 0.0, -1.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], normal),
        Vertex::new([0.5, -0.5, 0.0], normal),
        Vertex::new([0.5, 0.5, 0.0], normal),
        Vertex::new([-0.5, 0.5, 0.0], normal),
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// The 12 edges of the unit cube, as a line list
pub fn create_box_edges() -> (Vec<Vertex>, Vec<u16>) {
    let vertices = (0..8u8)
        .map(|corner| {
            let c = |bit: u8| if corner & bit == 0 { -0.5 } else { 0.5 };
            let p = [c(1), c(2), c(4)];
            Vertex::new(p, p)
        })
        .collect();

    // Corners differing in exactly one bit share an edge
    let mut indices = Vec::with_capacity(24);
    for a in 0..8u16 {
        for bit in [1, 2, 4] {
            if a & bit == 0 {
                indices.extend_from_slice(&[a, a | bit]);
            }
        }
    }

    (vertices, indices)
}

/// Mesh data with GPU buffers
#[cfg(target_arch = "wasm32")]
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[cfg(target_arch = "wasm32")]
impl Mesh {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        (vertices, indices): (Vec<Vertex>, Vec<u16>),
    ) -> Self {
        use wgpu::{BufferDescriptor, BufferUsages};

        let vertex_buffer = device.create_buffer(&BufferDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            size: std::mem::size_of_val(vertices.as_slice()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&vertex_buffer, 0, bytemuck::cast_slice(&vertices));

        // Index buffer writes must be 4-byte aligned
        let mut padded = indices.clone();
        if padded.len() % 2 == 1 {
            padded.push(0);
        }
        let index_buffer = device.create_buffer(&BufferDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            size: std::mem::size_of_val(padded.as_slice()) as u64,
            usage: BufferUsages::INDEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&index_buffer, 0, bytemuck::cast_slice(&padded));

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}
