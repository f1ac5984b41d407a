//! SDF-based WebGPU render pipeline
//!
//! Renders the entire scene in fragment shader using signed distance fields.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::scene::Scene;
use crate::consts::MAX_ENEMIES;
use crate::error::RenderError;
use crate::settings::GameOptions;

/// Maximum number of circles supported (must match shader)
pub const MAX_CIRCLES: usize = 64;

const _: () = assert!(MAX_ENEMIES < MAX_CIRCLES);

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],   // offset 0
    field_size: [f32; 2],   // offset 8
    field_offset: [f32; 2], // offset 16
    pixel_ratio: f32,       // offset 24
    circle_count: u32,      // offset 28
    _pad: [u32; 4],         // pad to 48 bytes
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct CircleData {
    center: [f32; 2],
    radius: f32,
    stroke_width: f32,
    fill: [f32; 4],   // rgb + fill opacity
    stroke: [f32; 4], // rgb + 1
}

// ============================================================================
// SDF RENDER STATE
// ============================================================================

pub struct SdfRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    // Uniform buffers
    globals_buffer: wgpu::Buffer,
    circles_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,

    /// Surface size in physical pixels
    pub size: (u32, u32),
    pixel_ratio: f32,
    field_size: [f32; 2],
    field_offset: [f32; 2],
}

impl SdfRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        options: &GameOptions,
        pixel_ratio: f32,
    ) -> Result<Self, RenderError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sdf-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let (css_w, css_h) = options.canvas_size();
        let width = (css_w as f32 * pixel_ratio).round() as u32;
        let height = (css_h as f32 * pixel_ratio).round() as u32;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!("Surface config: {}x{} (ratio {})", width, height, pixel_ratio);
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sdf_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("sdf_shader.wgsl").into()),
        });

        let field_size = [options.width as f32, options.height as f32];
        let field_offset = [options.padding as f32, options.padding as f32];

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                field_size,
                field_offset,
                pixel_ratio,
                circle_count: 0,
                _pad: [0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let circles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("circles"),
            size: (std::mem::size_of::<CircleData>() * MAX_CIRCLES) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sdf_bind_group_layout"),
            entries: &[uniform_entry(0), uniform_entry(1)],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sdf_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: circles_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sdf_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sdf_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            circles_buffer,
            bind_group,
            size: (width, height),
            pixel_ratio,
            field_size,
            field_offset,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn render(&mut self, scene: &Scene) -> Result<(), wgpu::SurfaceError> {
        let circles = pack_circles(scene);

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            field_size: self.field_size,
            field_offset: self.field_offset,
            pixel_ratio: self.pixel_ratio,
            circle_count: circles.iter().filter(|c| c.radius > 0.0).count() as u32,
            _pad: [0; 4],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
        self.queue
            .write_buffer(&self.circles_buffer, 0, bytemuck::cast_slice(&circles));

        // Render
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sdf_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sdf_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Flatten the scene into the fixed-size GPU array; unused slots have radius 0
fn pack_circles(scene: &Scene) -> Vec<CircleData> {
    let mut data = vec![CircleData::zeroed(); MAX_CIRCLES];
    for (slot, attrs) in data.iter_mut().zip(scene.circles()) {
        *slot = CircleData {
            center: attrs.center.to_array(),
            radius: attrs.radius,
            stroke_width: attrs.stroke_width,
            fill: attrs.fill.with_alpha(attrs.fill_opacity),
            stroke: attrs.stroke.with_alpha(1.0),
        };
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;

    #[test]
    fn test_gpu_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<Globals>(), 48);
        assert_eq!(std::mem::size_of::<CircleData>(), 48);
        assert_eq!(std::mem::offset_of!(Globals, circle_count), 28);
        assert_eq!(std::mem::offset_of!(Globals, _pad), 32);
        assert_eq!(std::mem::offset_of!(CircleData, fill), 16);
    }

    #[test]
    fn test_pack_circles_player_last() {
        let state = GameState::new(GameOptions::default(), 5).unwrap();
        let scene = Scene::from_state(&state);
        let packed = pack_circles(&scene);

        assert_eq!(packed.len(), MAX_CIRCLES);
        let used = packed.iter().filter(|c| c.radius > 0.0).count();
        assert_eq!(used, state.enemies.len() + 1);

        let player = &packed[state.enemies.len()];
        assert_eq!(player.center, state.player.pos.to_array());
        assert_eq!(player.stroke, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(player.fill[3], 0.0);
    }
}
