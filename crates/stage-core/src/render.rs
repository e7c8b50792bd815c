//! wgpu forward renderer for the stage: depth-tested, one ambient and one
//! point light, flat base color per primitive.

use std::num::NonZeroU64;

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::constants::{srgb_to_linear, CLEAR_COLOR_SRGB};
use crate::scene::{Light, Scene};
use crate::stage::{FrameView, Renderer};
use crate::viewport::SurfaceSize;
use crate::STAGE_WGSL;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    point_pos: [f32; 4],
    point_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    base_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    base_color: [f32; 4],
}

/// Draw-uniform ring sized for the current number of draws.
struct DrawSlots {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_slots: DrawSlots,
    slot_stride: u64,
    depth_view: wgpu::TextureView,
    meshes: Vec<Vec<GpuPrimitive>>,
    uploaded_revision: Option<u64>,
    clear_color: wgpu::Color,
}

impl GpuRenderer {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        size: SurfaceSize,
    ) -> anyhow::Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stage_shader"),
            source: wgpu::ShaderSource::Wgsl(STAGE_WGSL.into()),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stage_pl"),
            bind_group_layouts: &[&globals_layout, &draw_layout],
            push_constant_ranges: &[],
        });
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        }];
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("stage_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let slot_stride = (std::mem::size_of::<DrawUniforms>() as u64).next_multiple_of(alignment);
        let draw_slots = create_draw_slots(&device, &draw_layout, slot_stride, 16);
        let depth_view = create_depth_view(&device, config.width, config.height);

        let [r, g, b] = CLEAR_COLOR_SRGB.map(srgb_to_linear);
        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            globals_bind_group,
            draw_layout,
            draw_slots,
            slot_stride,
            depth_view,
            meshes: Vec::new(),
            uploaded_revision: None,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    #[inline]
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Reconfigure after the surface was lost or became outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn upload(&mut self, scene: &Scene) {
        self.meshes = scene
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .filter(|p| !p.indices.is_empty())
                    .map(|p| {
                        let vertices: Vec<Vertex> = p
                            .positions
                            .iter()
                            .zip(p.normals.iter().chain(std::iter::repeat(&[0.0, 1.0, 0.0])))
                            .map(|(&position, &normal)| Vertex { position, normal })
                            .collect();
                        let vertex_buffer =
                            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("stage_vb"),
                                contents: bytemuck::cast_slice(&vertices),
                                usage: wgpu::BufferUsages::VERTEX,
                            });
                        let index_buffer =
                            self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                                label: Some("stage_ib"),
                                contents: bytemuck::cast_slice(&p.indices),
                                usage: wgpu::BufferUsages::INDEX,
                            });
                        GpuPrimitive {
                            vertex_buffer,
                            index_buffer,
                            index_count: p.indices.len() as u32,
                            base_color: p.base_color,
                        }
                    })
                    .collect()
            })
            .collect();
        self.uploaded_revision = Some(scene.revision());
        log::info!("[render] uploaded {} meshes", self.meshes.len());
    }

    fn write_globals(&self, frame: &FrameView<'_>) {
        let mut ambient = Vec3::ZERO;
        let mut point = (Vec3::ZERO, Vec3::ZERO);
        for light in &frame.scene.lights {
            match *light {
                Light::Ambient { color, intensity } => ambient += color * intensity,
                Light::Point {
                    color,
                    intensity,
                    position,
                } => point = (position, color * intensity),
            }
        }
        let globals = Globals {
            view_proj: (frame.projection * frame.view).to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            point_pos: point.0.extend(1.0).to_array(),
            point_color: point.1.extend(0.0).to_array(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Build one draw-uniform slot per visible primitive. Returns
    /// `(mesh, primitive)` per slot.
    fn write_draws(&mut self, frame: &FrameView<'_>) -> Vec<(usize, usize)> {
        let mut draws = Vec::new();
        let mut uniforms = Vec::new();
        for (node, mesh) in frame.scene.mesh_instances() {
            let Some(primitives) = self.meshes.get(mesh) else {
                continue;
            };
            let model = frame.world.get(node).copied().unwrap_or(Mat4::IDENTITY);
            let normal_matrix = model.inverse().transpose();
            for (pi, prim) in primitives.iter().enumerate() {
                draws.push((mesh, pi));
                uniforms.push(DrawUniforms {
                    model: model.to_cols_array_2d(),
                    normal_matrix: normal_matrix.to_cols_array_2d(),
                    base_color: prim.base_color,
                });
            }
        }

        if uniforms.len() > self.draw_slots.capacity {
            let capacity = uniforms.len().next_power_of_two();
            self.draw_slots =
                create_draw_slots(&self.device, &self.draw_layout, self.slot_stride, capacity);
        }
        let stride = self.slot_stride as usize;
        let mut bytes = vec![0u8; stride * uniforms.len()];
        for (i, u) in uniforms.iter().enumerate() {
            let src = bytemuck::bytes_of(u);
            bytes[i * stride..i * stride + src.len()].copy_from_slice(src);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.draw_slots.buffer, 0, &bytes);
        }
        draws
    }
}

impl Renderer for GpuRenderer {
    type Error = wgpu::SurfaceError;

    fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty() {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, size.width, size.height);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), wgpu::SurfaceError> {
        if self.uploaded_revision != Some(frame.scene.revision()) {
            self.upload(frame.scene);
        }
        self.write_globals(frame);
        let draws = self.write_draws(frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("stage_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("stage_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.globals_bind_group, &[]);
            for (slot, &(mesh, pi)) in draws.iter().enumerate() {
                let prim = &self.meshes[mesh][pi];
                let offset = (slot as u64 * self.slot_stride) as u32;
                rpass.set_bind_group(1, &self.draw_slots.bind_group, &[offset]);
                rpass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
                rpass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..prim.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_draw_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> DrawSlots {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw_uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draw_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<DrawUniforms>() as u64),
            }),
        }],
    });
    DrawSlots {
        buffer,
        bind_group,
        capacity,
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("stage_depth"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth.create_view(&wgpu::TextureViewDescriptor::default())
}
