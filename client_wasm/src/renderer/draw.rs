use super::resources::InstanceBuffer;
use super::Renderer;
use crate::mesh::Mesh;
use crate::scene::Scene;
use wgpu::*;

const BACKGROUND: Color = Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

pub fn draw_frame(renderer: &mut Renderer, scene: &Scene) -> Result<(), String> {
    let output = match renderer.surface.get_current_texture() {
        Ok(output) => output,
        Err(SurfaceError::Lost | SurfaceError::Outdated) => {
            // Skip this frame; the next one draws on the fresh surface
            renderer
                .surface
                .configure(&renderer.device, &renderer.surface_config);
            return Ok(());
        }
        Err(e) => return Err(format!("Failed to get current texture: {:?}", e)),
    };
    let view = output.texture.create_view(&TextureViewDescriptor::default());

    update_buffers(renderer, scene);

    let mut encoder = renderer
        .device
        .create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    {
        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Main Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(BACKGROUND),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &renderer.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        draw_objects(renderer, &mut pass);
    }

    renderer.queue.submit(std::iter::once(encoder.finish()));
    output.present();

    Ok(())
}

fn update_buffers(renderer: &mut Renderer, scene: &Scene) {
    let Renderer {
        device,
        queue,
        instances,
        ..
    } = renderer;
    instances.wireframes.write(device, queue, &scene.wireframes);
    instances.spheres.write(device, queue, &scene.spheres);
    instances.boxes.write(device, queue, &scene.boxes);
    instances.planes.write(device, queue, &scene.planes);
}

/// Opaque first, translucent last so blending sees what is behind it
fn draw_objects(renderer: &Renderer, pass: &mut RenderPass<'_>) {
    pass.set_bind_group(0, &renderer.camera_bind_group, &[]);

    pass.set_pipeline(&renderer.line_pipeline);
    draw_mesh(pass, &renderer.meshes.edges, &renderer.instances.wireframes);

    pass.set_pipeline(&renderer.solid_pipeline);
    draw_mesh(pass, &renderer.meshes.sphere, &renderer.instances.spheres);

    pass.set_pipeline(&renderer.translucent_pipeline);
    draw_mesh(pass, &renderer.meshes.cube, &renderer.instances.boxes);
    draw_mesh(pass, &renderer.meshes.quad, &renderer.instances.planes);
}

fn draw_mesh(pass: &mut RenderPass<'_>, mesh: &Mesh, instances: &InstanceBuffer) {
    if instances.count() == 0 {
        return;
    }
    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint16);
    pass.set_vertex_buffer(1, instances.buffer().slice(..));
    pass.draw_indexed(0..mesh.index_count, 0, 0..instances.count());
}
