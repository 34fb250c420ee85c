use super::resources::DEPTH_FORMAT;
use super::shaders::SCENE_SHADER;
use crate::mesh::Vertex;
use crate::scene::InstanceData;
use wgpu::*;

pub struct PipelineState {
    /// Prism edges
    pub line_pipeline: RenderPipeline,
    /// Opaque lit meshes (the ball)
    pub solid_pipeline: RenderPipeline,
    /// Alpha blended, no depth writes (paddles, highlights, goal flashes)
    pub translucent_pipeline: RenderPipeline,
    pub camera_layout: BindGroupLayout,
}

const VERTEX_ATTRIBUTES: [VertexAttribute; 2] = vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const INSTANCE_ATTRIBUTES: [VertexAttribute; 3] =
    vertex_attr_array![2 => Float32x3, 3 => Float32x3, 4 => Float32x4];

pub fn create_pipelines(device: &Device, format: TextureFormat) -> PipelineState {
    // 1. Camera Bind Group Layout
    let camera_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    // 2. Shared shader and layout
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Scene Shader"),
        source: ShaderSource::Wgsl(SCENE_SHADER.into()),
    });

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts: &[&camera_layout],
        push_constant_ranges: &[],
    });

    // 3. One pipeline per draw style
    let build = |label: &str,
                 topology: PrimitiveTopology,
                 fragment: &str,
                 blend: BlendState,
                 depth_write: bool| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&layout),
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: VertexStepMode::Vertex,
                        attributes: &VERTEX_ATTRIBUTES,
                    },
                    VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: VertexStepMode::Instance,
                        attributes: &INSTANCE_ATTRIBUTES,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some(fragment),
                targets: &[Some(ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: depth_write,
                depth_compare: CompareFunction::Less,
                stencil: StencilState::default(),
                bias: DepthBiasState::default(),
            }),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    };

    let line_pipeline = build(
        "Line Pipeline",
        PrimitiveTopology::LineList,
        "fs_flat",
        BlendState::REPLACE,
        true,
    );
    let solid_pipeline = build(
        "Solid Pipeline",
        PrimitiveTopology::TriangleList,
        "fs_lit",
        BlendState::REPLACE,
        true,
    );
    let translucent_pipeline = build(
        "Translucent Pipeline",
        PrimitiveTopology::TriangleList,
        "fs_lit",
        BlendState::ALPHA_BLENDING,
        false,
    );

    PipelineState {
        line_pipeline,
        solid_pipeline,
        translucent_pipeline,
        camera_layout,
    }
}
