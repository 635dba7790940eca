//! Shadow Map
//!
//! A [`ShadowMap`] owns one GPU texture (2D or cube) and the render targets
//! that write into it.
//!
//! # Shapes
//!
//! | Factory                          | Texture | Render targets                      |
//! |----------------------------------|---------|-------------------------------------|
//! | [`ShadowMap::create_2d_map`]     | 2D      | 1                                   |
//! | [`ShadowMap::create_atlas`]      | 2D      | 6, all the same `Arc`               |
//! | [`ShadowMap::create_cubemap`]    | Cube    | 6 distinct, one per face            |
//!
//! The atlas shape lets omni-light code index render targets by face
//! `0..6` whether the light lives in a cube map or in a region of a shared
//! 2D atlas.
//!
//! # Destruction
//!
//! [`ShadowMap::destroy`] releases the texture once and destroys each
//! *distinct* render target once; aliased atlas entries are deduplicated by
//! `Arc` identity. The caller must not destroy a shadow map that an
//! in-flight pass still renders into.

use std::sync::Arc;

use smallvec::SmallVec;

use super::format::{resolve_shadow_type, shadow_filtering, shadow_format, uses_depth_compare};
use crate::renderer::core::device::{Attachment, GraphicsDevice, RenderTargetDesc, TextureDesc};
use crate::scene::light::{Light, ShadowType};

/// Number of faces addressed by omni-light shadow code.
pub const CUBE_FACE_COUNT: usize = 6;

/// Cube shadows always store colour-encoded depth.
const CUBE_SHADOW_FORMAT: wgpu::TextureFormat = super::format::SHADOW_ENCODED_FORMAT;

pub struct ShadowMap<D: GraphicsDevice> {
    texture: Option<D::Texture>,
    render_targets: SmallVec<[Arc<D::RenderTarget>; CUBE_FACE_COUNT]>,
    /// Lifetime managed by a [`ShadowMapCache`](super::cache::ShadowMapCache).
    pub(crate) cached: bool,
    size: u32,
    format: wgpu::TextureFormat,
    cubemap: bool,
}

impl<D: GraphicsDevice> ShadowMap<D> {
    /// Allocates a shadow map matching the light's shape: a cube map for
    /// omni lights, a single 2D map otherwise.
    #[must_use]
    pub fn create<T>(device: &D, light: &Light<T>) -> Self {
        if light.is_omni() {
            Self::create_cubemap(device, light.shadow_resolution)
        } else {
            Self::create_2d_map(device, light.shadow_resolution, light.shadow_type)
        }
    }

    /// A 2D map whose single render target is replicated for all six faces.
    #[must_use]
    pub fn create_atlas(device: &D, resolution: u32, shadow_type: ShadowType) -> Self {
        let mut shadow_map = Self::create_2d_map(device, resolution, shadow_type);

        let target = Arc::clone(&shadow_map.render_targets[0]);
        shadow_map
            .render_targets
            .extend(std::iter::repeat_n(target, CUBE_FACE_COUNT - 1));

        shadow_map
    }

    #[must_use]
    pub fn create_2d_map(device: &D, size: u32, shadow_type: ShadowType) -> Self {
        let caps = *device.capabilities();
        let resolved = resolve_shadow_type(&caps, shadow_type);
        if resolved != shadow_type {
            log::debug!("{shadow_type:?} shadow map not renderable on this device, using {resolved:?}");
        }
        let format = shadow_format(&caps, shadow_type);
        let filter = shadow_filtering(&caps, shadow_type);
        let depth_compare = uses_depth_compare(&caps, shadow_type);

        let texture = device.create_texture(&TextureDesc {
            label: "ShadowMap2D".to_string(),
            size,
            cubemap: false,
            format,
            filter,
            address_mode: wgpu::AddressMode::ClampToEdge,
            mipmaps: false,
            compare: depth_compare.then_some(wgpu::CompareFunction::LessEqual),
        });

        let target_desc = if depth_compare {
            RenderTargetDesc {
                label: "ShadowRT".to_string(),
                attachment: Attachment::Depth { texture: &texture },
                depth_buffer: false,
            }
        } else {
            // Depth is encoded into the colour channels; the pass still
            // needs its own depth buffer for visibility.
            RenderTargetDesc {
                label: "ShadowRT".to_string(),
                attachment: Attachment::Color {
                    texture: &texture,
                    face: None,
                },
                depth_buffer: true,
            }
        };
        let target = Arc::new(device.create_render_target(&target_desc));

        log::debug!(
            "Allocated {size}x{size} 2D shadow map ({resolved:?}: {format:?}, {filter:?} filtering, depth compare: {depth_compare})"
        );

        let mut render_targets = SmallVec::new();
        render_targets.push(target);

        Self {
            texture: Some(texture),
            render_targets,
            cached: false,
            size,
            format,
            cubemap: false,
        }
    }

    #[must_use]
    pub fn create_cubemap(device: &D, size: u32) -> Self {
        let texture = device.create_texture(&TextureDesc {
            label: "ShadowMapCube".to_string(),
            size,
            cubemap: true,
            format: CUBE_SHADOW_FORMAT,
            filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
            mipmaps: false,
            compare: None,
        });

        let render_targets = (0..CUBE_FACE_COUNT as u32)
            .map(|face| {
                Arc::new(device.create_render_target(&RenderTargetDesc {
                    label: format!("ShadowRTCube_{face}"),
                    attachment: Attachment::Color {
                        texture: &texture,
                        face: Some(face),
                    },
                    depth_buffer: true,
                }))
            })
            .collect();

        log::debug!("Allocated {size}x{size} cube shadow map ({CUBE_SHADOW_FORMAT:?})");

        Self {
            texture: Some(texture),
            render_targets,
            cached: false,
            size,
            format: CUBE_SHADOW_FORMAT,
            cubemap: true,
        }
    }

    /// Releases the texture and every distinct render target.
    ///
    /// Calling it again is a no-op.
    pub fn destroy(&mut self, device: &D) {
        if let Some(texture) = self.texture.take() {
            device.destroy_texture(&texture);
        }

        let targets = std::mem::take(&mut self.render_targets);
        for (i, target) in targets.iter().enumerate() {
            if targets[..i].iter().any(|seen| Arc::ptr_eq(seen, target)) {
                continue;
            }
            device.destroy_render_target(target);
        }
    }

    /// The shadow texture, `None` once destroyed.
    #[inline]
    #[must_use]
    pub fn texture(&self) -> Option<&D::Texture> {
        self.texture.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn render_targets(&self) -> &[Arc<D::RenderTarget>] {
        &self.render_targets
    }

    /// Render target for a face index (always `0` for plain 2D maps).
    #[inline]
    #[must_use]
    pub fn render_target(&self, face: usize) -> Option<&Arc<D::RenderTarget>> {
        self.render_targets.get(face)
    }

    #[inline]
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    #[must_use]
    pub fn is_cubemap(&self) -> bool {
        self.cubemap
    }
}
