/// Instanced unit meshes under one perspective camera.
///
/// `fs_lit` shades by the face normal, `fs_flat` uses the tint as is.
pub const SCENE_SHADER: &str = r#"
struct CameraUniform {
    view_proj: mat4x4<f32>,
};
@group(0) @binding(0)
var<uniform> camera: CameraUniform;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) offset: vec3<f32>,
    @location(3) scale: vec3<f32>,
    @location(4) tint: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) tint: vec4<f32>,
};

@vertex
fn vs_main(model: VertexInput, instance: InstanceInput) -> VertexOutput {
    var out: VertexOutput;
    let world = model.position * instance.scale + instance.offset;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.normal = model.normal;
    out.tint = instance.tint;
    return out;
}

@fragment
fn fs_lit(in: VertexOutput) -> @location(0) vec4<f32> {
    let light = normalize(vec3<f32>(0.3, -0.6, 0.7));
    let n = normalize(in.normal);
    let shade = 0.55 + 0.45 * abs(dot(n, light));
    return vec4<f32>(in.tint.rgb * shade, in.tint.a);
}

@fragment
fn fs_flat(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.tint;
}
"#;
