//! GPU-free [`GraphicsDevice`] that records every call.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use glam::{Mat4, Vec4};
use umbra::renderer::core::{
    Attachment, BlitParams, DeviceCapabilities, GraphicsDevice, RenderTargetDesc, ShaderDesc,
    TextureDesc,
};

#[derive(Debug)]
pub struct MockTexture {
    pub id: u32,
    pub desc: TextureDesc,
}

#[derive(Debug)]
pub struct MockRenderTarget {
    pub id: u32,
    pub label: String,
    pub texture_id: u32,
    pub face: Option<u32>,
    pub depth_attachment: bool,
    pub depth_buffer: bool,
    pub width: u32,
}

#[derive(Debug)]
pub struct MockShader {
    pub id: u32,
    pub label: String,
    pub source: String,
    pub source_dimension: wgpu::TextureViewDimension,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub target_id: u32,
    pub shader_label: String,
    pub source_id: u32,
    pub viewport: Vec4,
    pub inv_view_proj: Option<Mat4>,
}

#[derive(Default)]
pub struct RecordingDevice {
    pub caps: DeviceCapabilities,
    next_id: Cell<u32>,
    pub textures_created: Cell<usize>,
    pub textures_destroyed: RefCell<Vec<u32>>,
    pub targets_created: Cell<usize>,
    pub targets_destroyed: RefCell<Vec<u32>>,
    pub shaders_created: RefCell<Vec<String>>,
    pub draws: RefCell<Vec<DrawCall>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::with_caps(DeviceCapabilities::all())
    }

    pub fn with_caps(caps: DeviceCapabilities) -> Self {
        Self {
            caps,
            ..Default::default()
        }
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub fn draw_count(&self) -> usize {
        self.draws.borrow().len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures_created.get() - self.textures_destroyed.borrow().len()
    }

    pub fn live_targets(&self) -> usize {
        self.targets_created.get() - self.targets_destroyed.borrow().len()
    }

    /// A standalone texture, e.g. a light cookie.
    pub fn texture(&self, size: u32, cubemap: bool) -> MockTexture {
        self.create_texture(&TextureDesc {
            label: "Cookie".to_string(),
            size,
            cubemap,
            format: wgpu::TextureFormat::Rgba8Unorm,
            filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
            mipmaps: false,
            compare: None,
        })
    }

    /// A colour render target of the given width.
    pub fn color_target(&self, size: u32) -> MockRenderTarget {
        let texture = self.texture(size, false);
        self.create_render_target(&RenderTargetDesc {
            label: "Target".to_string(),
            attachment: Attachment::Color {
                texture: &texture,
                face: None,
            },
            depth_buffer: false,
        })
    }
}

impl GraphicsDevice for RecordingDevice {
    type Texture = MockTexture;
    type RenderTarget = MockRenderTarget;
    type Shader = MockShader;

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.caps
    }

    fn create_texture(&self, desc: &TextureDesc) -> MockTexture {
        self.textures_created.set(self.textures_created.get() + 1);
        MockTexture {
            id: self.next_id(),
            desc: desc.clone(),
        }
    }

    fn destroy_texture(&self, texture: &MockTexture) {
        self.textures_destroyed.borrow_mut().push(texture.id);
    }

    fn create_render_target(&self, desc: &RenderTargetDesc<'_, MockTexture>) -> MockRenderTarget {
        self.targets_created.set(self.targets_created.get() + 1);
        let (texture, face, depth_attachment) = match desc.attachment {
            Attachment::Color { texture, face } => (texture, face, false),
            Attachment::Depth { texture } => (texture, None, true),
        };
        MockRenderTarget {
            id: self.next_id(),
            label: desc.label.clone(),
            texture_id: texture.id,
            face,
            depth_attachment,
            depth_buffer: desc.depth_buffer,
            width: texture.desc.size,
        }
    }

    fn destroy_render_target(&self, target: &MockRenderTarget) {
        self.targets_destroyed.borrow_mut().push(target.id);
    }

    fn render_target_width(&self, target: &MockRenderTarget) -> u32 {
        target.width
    }

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> MockShader {
        self.shaders_created.borrow_mut().push(desc.label.to_string());
        MockShader {
            id: self.next_id(),
            label: desc.label.to_string(),
            source: desc.source.to_string(),
            source_dimension: desc.source_dimension,
        }
    }

    fn draw_quad(
        &self,
        target: &MockRenderTarget,
        shader: &MockShader,
        viewport: Vec4,
        params: &BlitParams<'_, MockTexture>,
    ) {
        self.draws.borrow_mut().push(DrawCall {
            target_id: target.id,
            shader_label: shader.label.clone(),
            source_id: params.source.id,
            viewport,
            inv_view_proj: params.inv_view_proj,
        });
    }
}

pub const EPSILON: f32 = 1e-5;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Comparison for pixel-space values, where f32 spacing exceeds [`EPSILON`].
pub fn approx_px(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-2
}
