//! Light Texture Atlas
//!
//! Owns the shared cookie atlas and assigns each cookie-bearing light a
//! square slot in normalized atlas coordinates.
//!
//! # Slot layout
//!
//! With `n` cookie lights the atlas is split into a uniform
//! `ceil(sqrt(n))²` grid, filled row by row. Omni lights further split
//! their slot into a 3×3 grid and use six of its cells, one per cube face.
//! Viewports follow wgpu's framebuffer convention: origin at the top-left,
//! `y` growing downwards.
//!
//! ```text
//!     0        1        2      x
//!   ┌────────┬────────┬────────┐
//! 0 │ face 0 │ face 2 │ face 4 │
//!   ├────────┼────────┼────────┤
//! 1 │ face 1 │ face 3 │ face 5 │
//!   ├────────┼────────┼────────┤
//! 2 │        │        │        │
//!   └────────┴────────┴────────┘
//! y
//! ```
//!
//! The bottom row of the 3×3 grid is unused.

use std::sync::Arc;

use glam::{Vec2, Vec4};

use crate::renderer::core::device::{Attachment, GraphicsDevice, RenderTargetDesc, TextureDesc};
use crate::renderer::settings::LightingSettings;
use crate::scene::light::Light;

pub const COOKIE_ATLAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Cell offsets of the six cube faces inside an omni light's 3×3 slot grid.
pub const CUBE_SLOTS_OFFSETS: [Vec2; 6] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(2.0, 0.0),
    Vec2::new(2.0, 1.0),
];

/// Placement of cube faces inside an atlas slot.
pub trait CubeSlotLayout {
    /// Cell offset (in 3×3 grid cells) for each cube face.
    fn cube_slots_offsets(&self) -> &[Vec2; 6];
}

/// The default layout, usable without an allocated atlas.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCubeSlots;

impl CubeSlotLayout for DefaultCubeSlots {
    fn cube_slots_offsets(&self) -> &[Vec2; 6] {
        &CUBE_SLOTS_OFFSETS
    }
}

pub struct LightTextureAtlas<D: GraphicsDevice> {
    cookie_texture: Option<D::Texture>,
    cookie_target: Option<Arc<D::RenderTarget>>,
    resolution: u32,
    slot_count: usize,
}

impl<D: GraphicsDevice> LightTextureAtlas<D> {
    /// Creates an empty atlas; the texture is allocated by the first
    /// [`update`](Self::update) that finds a cookie light.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookie_texture: None,
            cookie_target: None,
            resolution: 0,
            slot_count: 0,
        }
    }

    /// Assigns atlas slots to the lights whose cookies are rendered this
    /// frame, (re)allocating the atlas when its configured size changed.
    pub fn update(
        &mut self,
        device: &D,
        lights: &mut [Light<D::Texture>],
        settings: &LightingSettings,
    ) {
        if !settings.cookies_enabled {
            self.slot_count = 0;
            self.release(device);
            return;
        }

        let mut cookie_lights: Vec<&mut Light<D::Texture>> = lights
            .iter_mut()
            .filter(|light| light.enabled && light.visible_this_frame && light.cookie.is_some())
            .collect();

        self.slot_count = cookie_lights.len();
        if cookie_lights.is_empty() {
            return;
        }

        if self.cookie_target.is_none() || self.resolution != settings.cookie_atlas_resolution {
            self.allocate(device, settings.cookie_atlas_resolution);
        }

        let grid = grid_size(cookie_lights.len());
        for (slot, light) in cookie_lights.iter_mut().enumerate() {
            light.atlas_viewport = slot_viewport(slot, grid);
        }
    }

    fn allocate(&mut self, device: &D, resolution: u32) {
        self.release(device);

        let texture = device.create_texture(&TextureDesc {
            label: "CookieAtlas".to_string(),
            size: resolution,
            cubemap: false,
            format: COOKIE_ATLAS_FORMAT,
            filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
            mipmaps: false,
            compare: None,
        });
        let target = device.create_render_target(&RenderTargetDesc {
            label: "CookieAtlasRT".to_string(),
            attachment: Attachment::Color {
                texture: &texture,
                face: None,
            },
            depth_buffer: false,
        });

        log::debug!("Allocated {resolution}x{resolution} cookie atlas");

        self.cookie_texture = Some(texture);
        self.cookie_target = Some(Arc::new(target));
        self.resolution = resolution;
    }

    fn release(&mut self, device: &D) {
        if let Some(target) = self.cookie_target.take() {
            device.destroy_render_target(&target);
        }
        if let Some(texture) = self.cookie_texture.take() {
            device.destroy_texture(&texture);
        }
        self.resolution = 0;
    }

    #[inline]
    #[must_use]
    pub fn cookie_texture(&self) -> Option<&D::Texture> {
        self.cookie_texture.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn cookie_render_target(&self) -> Option<&Arc<D::RenderTarget>> {
        self.cookie_target.as_ref()
    }

    /// Current atlas edge length, `0` when not allocated.
    #[inline]
    #[must_use]
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Number of slots assigned by the last update.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn destroy(&mut self, device: &D) {
        self.release(device);
        self.slot_count = 0;
    }
}

impl<D: GraphicsDevice> CubeSlotLayout for LightTextureAtlas<D> {
    fn cube_slots_offsets(&self) -> &[Vec2; 6] {
        &CUBE_SLOTS_OFFSETS
    }
}

impl<D: GraphicsDevice> Default for LightTextureAtlas<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Edge length of the smallest square grid holding `count` slots.
#[must_use]
pub fn grid_size(count: usize) -> usize {
    let mut grid = 1;
    while grid * grid < count {
        grid += 1;
    }
    grid
}

/// Normalized rectangle of `slot` in a `grid × grid` subdivision.
#[must_use]
pub fn slot_viewport(slot: usize, grid: usize) -> Vec4 {
    let cell = 1.0 / grid as f32;
    let x = (slot % grid) as f32 * cell;
    let y = (slot / grid) as f32 * cell;
    Vec4::new(x, y, cell, cell)
}
