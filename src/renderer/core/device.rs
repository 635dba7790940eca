//! Graphics Device Abstraction
//!
//! The shadow and cookie subsystems talk to the GPU through the
//! [`GraphicsDevice`] trait. Handle types are associated types so the same
//! code drives the wgpu backend ([`WgpuDevice`](super::wgpu_device::WgpuDevice))
//! and the recording device used in tests.
//!
//! Descriptors reuse wgpu's plain value types (formats, filters, compare
//! functions) so no parallel enum hierarchy is needed.

use glam::{Mat4, Vec4};

/// Capability flags the format and filter tables depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceCapabilities {
    /// Depth textures can be sampled with a comparison sampler (hardware PCF).
    pub depth_compare: bool,
    /// `Rgba32Float` textures support linear filtering.
    pub float32_filterable: bool,
    /// `Rgba16Float` textures support linear filtering.
    pub float16_filterable: bool,
    /// `Rgba32Float` textures can be render attachments.
    pub float32_renderable: bool,
    /// `Rgba16Float` textures can be render attachments.
    pub float16_renderable: bool,
}

impl DeviceCapabilities {
    /// Capabilities of a modern desktop GPU.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            depth_compare: true,
            float32_filterable: true,
            float16_filterable: true,
            float32_renderable: true,
            float16_renderable: true,
        }
    }
}

/// Square 2D or cube texture request.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub label: String,
    /// Edge length in pixels.
    pub size: u32,
    /// Six-face cube texture when `true`.
    pub cubemap: bool,
    pub format: wgpu::TextureFormat,
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
    pub mipmaps: bool,
    /// Comparison function for hardware depth-compare sampling.
    pub compare: Option<wgpu::CompareFunction>,
}

/// How a texture is bound to a render target.
#[derive(Debug, Clone, Copy)]
pub enum Attachment<'a, T> {
    /// Colour attachment; `face` selects a cube face, `None` for 2D textures.
    Color { texture: &'a T, face: Option<u32> },
    /// The texture itself is the depth attachment; there is no colour output.
    Depth { texture: &'a T },
}

#[derive(Debug, Clone)]
pub struct RenderTargetDesc<'a, T> {
    pub label: String,
    pub attachment: Attachment<'a, T>,
    /// Allocate an internal depth buffer alongside a colour attachment.
    pub depth_buffer: bool,
}

/// A WGSL module exposing `vs_main` and `fs_main`.
#[derive(Debug, Clone, Copy)]
pub struct ShaderDesc<'a> {
    pub label: &'a str,
    pub source: &'a str,
    /// View dimension of the sampled source texture (`D2` or `Cube`).
    pub source_dimension: wgpu::TextureViewDimension,
}

/// Inputs of a fullscreen-quad blit.
#[derive(Debug, Clone, Copy)]
pub struct BlitParams<'a, T> {
    pub source: &'a T,
    /// Inverse view-projection of the cube face being reprojected.
    pub inv_view_proj: Option<Mat4>,
}

/// GPU resource factory and immediate-mode blitter.
///
/// All calls happen on the rendering thread; implementations are free to
/// use interior mutability for their caches.
pub trait GraphicsDevice {
    type Texture;
    type RenderTarget;
    type Shader;

    fn capabilities(&self) -> &DeviceCapabilities;

    fn create_texture(&self, desc: &TextureDesc) -> Self::Texture;

    fn destroy_texture(&self, texture: &Self::Texture);

    fn create_render_target(&self, desc: &RenderTargetDesc<'_, Self::Texture>) -> Self::RenderTarget;

    fn destroy_render_target(&self, target: &Self::RenderTarget);

    /// Width in pixels of the target's colour attachment.
    fn render_target_width(&self, target: &Self::RenderTarget) -> u32;

    fn create_shader(&self, desc: &ShaderDesc<'_>) -> Self::Shader;

    /// Draws a fullscreen quad into `viewport` (pixels: x, y, width, height)
    /// of `target`, preserving the rest of its contents.
    fn draw_quad(
        &self,
        target: &Self::RenderTarget,
        shader: &Self::Shader,
        viewport: Vec4,
        params: &BlitParams<'_, Self::Texture>,
    );
}
