//! wgpu Backend
//!
//! [`WgpuDevice`] implements [`GraphicsDevice`] on top of `wgpu`.
//!
//! # Blits
//!
//! `draw_quad` is immediate-mode from the caller's point of view. Internally
//! each blit is recorded as its own render pass (load + store, viewport and
//! scissor restricted to the destination slot) into a pending command
//! encoder, and per-blit uniforms live in a ring of dynamic-offset slots:
//!
//! ```text
//!  draw_quad ─► write_buffer(slot n) ─► encoder.begin_render_pass ─► draw(0..3)
//!                                                   │
//!  flush() ◄── ring full ◄──────────────────────────┘
//! ```
//!
//! Call [`WgpuDevice::flush`] before anything samples the blitted target.

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::context::WgpuContext;
use super::device::{
    Attachment, BlitParams, DeviceCapabilities, GraphicsDevice, RenderTargetDesc, ShaderDesc,
    TextureDesc,
};

/// Depth buffer format of render targets with colour-encoded depth.
pub const RENDER_TARGET_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Blits recorded before the pending encoder is submitted automatically.
const BLIT_UNIFORM_SLOTS: u32 = 64;

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct BlitUniforms {
    inv_view_proj: Mat4,
}

/// Texture, default view and sampler.
pub struct WgpuTexture {
    pub texture: wgpu::Texture,
    /// `D2` or `Cube` view over the whole texture.
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: u32,
    pub format: wgpu::TextureFormat,
}

pub struct WgpuRenderTarget {
    pub label: String,
    pub color_view: Option<wgpu::TextureView>,
    pub color_format: Option<wgpu::TextureFormat>,
    /// Depth attachment: the shadow texture itself, or the internal buffer.
    pub depth_view: Option<wgpu::TextureView>,
    depth_buffer: Option<wgpu::Texture>,
    pub width: u32,
}

pub struct WgpuShader {
    id: u64,
    pub label: String,
    pub module: wgpu::ShaderModule,
    pub source_dimension: wgpu::TextureViewDimension,
}

struct PendingBlits {
    encoder: Option<wgpu::CommandEncoder>,
    next_slot: u32,
}

pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    capabilities: DeviceCapabilities,

    uniform_buffer: wgpu::Buffer,
    uniform_stride: u32,

    layouts: Mutex<FxHashMap<wgpu::TextureViewDimension, wgpu::BindGroupLayout>>,
    pipelines: Mutex<FxHashMap<(u64, wgpu::TextureFormat), wgpu::RenderPipeline>>,
    pending: Mutex<PendingBlits>,
}

impl WgpuDevice {
    #[must_use]
    pub fn new(context: &WgpuContext) -> Self {
        let device = context.device.clone();
        let queue = context.queue.clone();

        let min_alignment = device.limits().min_uniform_buffer_offset_alignment.max(1);
        let uniform_stride = align_to(std::mem::size_of::<BlitUniforms>() as u32, min_alignment);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Blit Uniform Ring"),
            size: u64::from(uniform_stride) * u64::from(BLIT_UNIFORM_SLOTS),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            device,
            queue,
            capabilities: context.capabilities(),
            uniform_buffer,
            uniform_stride,
            layouts: Mutex::new(FxHashMap::default()),
            pipelines: Mutex::new(FxHashMap::default()),
            pending: Mutex::new(PendingBlits {
                encoder: None,
                next_slot: 0,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Submits all blits recorded since the last flush.
    pub fn flush(&self) {
        let mut pending = self.pending.lock();
        self.submit_pending(&mut pending);
    }

    fn submit_pending(&self, pending: &mut PendingBlits) {
        if let Some(encoder) = pending.encoder.take() {
            log::trace!("Submitting {} cookie blits", pending.next_slot);
            self.queue.submit(std::iter::once(encoder.finish()));
        }
        pending.next_slot = 0;
    }

    fn blit_layout(&self, dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayout {
        self.layouts
            .lock()
            .entry(dimension)
            .or_insert_with(|| {
                self.device
                    .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                        label: Some("Blit BindGroup Layout"),
                        entries: &[
                            wgpu::BindGroupLayoutEntry {
                                binding: 0,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Texture {
                                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                    view_dimension: dimension,
                                    multisampled: false,
                                },
                                count: None,
                            },
                            wgpu::BindGroupLayoutEntry {
                                binding: 1,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                                count: None,
                            },
                            wgpu::BindGroupLayoutEntry {
                                binding: 2,
                                visibility: wgpu::ShaderStages::FRAGMENT,
                                ty: wgpu::BindingType::Buffer {
                                    ty: wgpu::BufferBindingType::Uniform,
                                    has_dynamic_offset: true,
                                    min_binding_size: wgpu::BufferSize::new(
                                        std::mem::size_of::<BlitUniforms>() as u64,
                                    ),
                                },
                                count: None,
                            },
                        ],
                    })
            })
            .clone()
    }

    fn blit_pipeline(
        &self,
        shader: &WgpuShader,
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let layout = self.blit_layout(shader.source_dimension);

        self.pipelines
            .lock()
            .entry((shader.id, format))
            .or_insert_with(|| {
                log::debug!("Creating blit pipeline '{}' for {format:?}", shader.label);

                let pipeline_layout =
                    self.device
                        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                            label: Some("Blit Pipeline Layout"),
                            bind_group_layouts: &[Some(&layout)],
                            immediate_size: 0,
                        });

                self.device
                    .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some(&shader.label),
                        layout: Some(&pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &shader.module,
                            entry_point: Some("vs_main"),
                            buffers: &[],
                            compilation_options: wgpu::PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader.module,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: wgpu::PipelineCompilationOptions::default(),
                        }),
                        primitive: wgpu::PrimitiveState::default(),
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState::default(),
                        multiview_mask: None,
                        cache: None,
                    })
            })
            .clone()
    }
}

impl GraphicsDevice for WgpuDevice {
    type Texture = WgpuTexture;
    type RenderTarget = WgpuRenderTarget;
    type Shader = WgpuShader;

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn create_texture(&self, desc: &TextureDesc) -> WgpuTexture {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&desc.label),
            size: wgpu::Extent3d {
                width: desc.size,
                height: desc.size,
                depth_or_array_layers: if desc.cubemap { 6 } else { 1 },
            },
            mip_level_count: if desc.mipmaps {
                desc.size.max(1).ilog2() + 1
            } else {
                1
            },
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&desc.label),
            dimension: Some(if desc.cubemap {
                wgpu::TextureViewDimension::Cube
            } else {
                wgpu::TextureViewDimension::D2
            }),
            ..Default::default()
        });

        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&desc.label),
            address_mode_u: desc.address_mode,
            address_mode_v: desc.address_mode,
            address_mode_w: desc.address_mode,
            mag_filter: desc.filter,
            min_filter: desc.filter,
            compare: desc.compare,
            ..Default::default()
        });

        WgpuTexture {
            texture,
            view,
            sampler,
            size: desc.size,
            format: desc.format,
        }
    }

    fn destroy_texture(&self, texture: &WgpuTexture) {
        texture.texture.destroy();
    }

    fn create_render_target(&self, desc: &RenderTargetDesc<'_, WgpuTexture>) -> WgpuRenderTarget {
        match desc.attachment {
            Attachment::Depth { texture } => WgpuRenderTarget {
                label: desc.label.clone(),
                color_view: None,
                color_format: None,
                depth_view: Some(texture.texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&desc.label),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    ..Default::default()
                })),
                depth_buffer: None,
                width: texture.size,
            },
            Attachment::Color { texture, face } => {
                let color_view = texture.texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(&desc.label),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: face.unwrap_or(0),
                    array_layer_count: Some(1),
                    ..Default::default()
                });

                let depth_buffer = desc.depth_buffer.then(|| {
                    self.device.create_texture(&wgpu::TextureDescriptor {
                        label: Some(&desc.label),
                        size: wgpu::Extent3d {
                            width: texture.size,
                            height: texture.size,
                            depth_or_array_layers: 1,
                        },
                        mip_level_count: 1,
                        sample_count: 1,
                        dimension: wgpu::TextureDimension::D2,
                        format: RENDER_TARGET_DEPTH_FORMAT,
                        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                        view_formats: &[],
                    })
                });
                let depth_view = depth_buffer
                    .as_ref()
                    .map(|buffer| buffer.create_view(&wgpu::TextureViewDescriptor::default()));

                WgpuRenderTarget {
                    label: desc.label.clone(),
                    color_view: Some(color_view),
                    color_format: Some(texture.format),
                    depth_view,
                    depth_buffer,
                    width: texture.size,
                }
            }
        }
    }

    fn destroy_render_target(&self, target: &WgpuRenderTarget) {
        if let Some(buffer) = &target.depth_buffer {
            buffer.destroy();
        }
    }

    fn render_target_width(&self, target: &WgpuRenderTarget) -> u32 {
        target.width
    }

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> WgpuShader {
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(desc.label),
                source: wgpu::ShaderSource::Wgsl(desc.source.to_owned().into()),
            });

        WgpuShader {
            id: NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed),
            label: desc.label.to_string(),
            module,
            source_dimension: desc.source_dimension,
        }
    }

    fn draw_quad(
        &self,
        target: &WgpuRenderTarget,
        shader: &WgpuShader,
        viewport: Vec4,
        params: &BlitParams<'_, WgpuTexture>,
    ) {
        let (Some(color_view), Some(format)) = (&target.color_view, target.color_format) else {
            log::warn!("Blit target '{}' has no colour attachment", target.label);
            return;
        };

        let Some(rect) = clamp_viewport(viewport, target.width) else {
            log::trace!("Blit into '{}' clipped away: {viewport}", target.label);
            return;
        };

        let pipeline = self.blit_pipeline(shader, format);
        let layout = self.blit_layout(shader.source_dimension);

        let mut pending = self.pending.lock();
        if pending.next_slot == BLIT_UNIFORM_SLOTS {
            self.submit_pending(&mut pending);
        }
        let dynamic_offset = pending.next_slot * self.uniform_stride;
        pending.next_slot += 1;

        let uniforms = BlitUniforms {
            inv_view_proj: params.inv_view_proj.unwrap_or(Mat4::IDENTITY),
        };
        self.queue.write_buffer(
            &self.uniform_buffer,
            u64::from(dynamic_offset),
            bytemuck::bytes_of(&uniforms),
        );

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit BindGroup"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&params.source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&params.source.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.uniform_buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(std::mem::size_of::<BlitUniforms>() as u64),
                    }),
                },
            ],
        });

        let device = &self.device;
        let encoder = pending.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Cookie Blit Encoder"),
            })
        });

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cookie Blit Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            ..Default::default()
        });

        pass.set_viewport(rect.x, rect.y, rect.z, rect.w, 0.0, 1.0);
        pass.set_scissor_rect(rect.x as u32, rect.y as u32, rect.z as u32, rect.w as u32);
        pass.set_pipeline(&pipeline);
        pass.set_bind_group(0, &bind_group, &[dynamic_offset]);
        pass.draw(0..3, 0..1);
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

/// Clips a pixel viewport to a square target of edge `size`.
///
/// Returns `None` when nothing of it remains, including rectangles whose
/// scissor would be narrower than one pixel.
fn clamp_viewport(viewport: Vec4, size: u32) -> Option<Vec4> {
    let size = size as f32;
    let x = viewport.x.clamp(0.0, size);
    let y = viewport.y.clamp(0.0, size);
    let width = viewport.z.min(size - x);
    let height = viewport.w.min(size - y);
    (width >= 1.0 && height >= 1.0).then(|| Vec4::new(x, y, width, height))
}
