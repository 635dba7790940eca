//! Cookie Renderer
//!
//! Blits light cookies into their slot of the cookie atlas with a
//! fullscreen-quad shader, once per visible cookie light per frame.
//!
//! - 2D cookies (spot lights) are copied into the light's atlas viewport.
//! - Cube cookies (omni lights) are reprojected face by face into six cells
//!   of a 3×3 subdivision of the viewport, using the inverse
//!   view-projection of each face camera.
//!
//! The face matrices depend only on the face index, so they are computed
//! once for the whole process.

use std::f32::consts::FRAC_PI_2;
use std::sync::{Arc, OnceLock};

use glam::{Mat4, Vec3, Vec4};

use super::atlas::CubeSlotLayout;
use crate::errors::Result;
use crate::renderer::core::device::{BlitParams, GraphicsDevice};
use crate::renderer::pipeline::{ShaderLibrary, ShaderVariantOptions};
use crate::scene::light::Light;

const COOKIE_BLIT_TEMPLATE: &str = "cookie_blit";

static INV_VIEW_PROJ_MATRICES: OnceLock<[Mat4; 6]> = OnceLock::new();

/// Look direction and up vector of each cube face camera (+X, -X, +Y, -Y, +Z, -Z).
const CUBE_FACE_CAMERAS: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Y),
    (Vec3::NEG_X, Vec3::NEG_Y),
    (Vec3::Y, Vec3::Z),
    (Vec3::NEG_Y, Vec3::NEG_Z),
    (Vec3::Z, Vec3::NEG_Y),
    (Vec3::NEG_Z, Vec3::NEG_Y),
];

/// Inverse view-projection matrices of the six 90° cube face cameras.
pub fn inv_view_proj_matrices() -> &'static [Mat4; 6] {
    INV_VIEW_PROJ_MATRICES.get_or_init(|| {
        let proj = Mat4::perspective_rh(FRAC_PI_2, 1.0, 0.1, 10.0);
        CUBE_FACE_CAMERAS.map(|(dir, up)| (proj * Mat4::look_to_rh(Vec3::ZERO, dir, up)).inverse())
    })
}

/// Destination rectangle of `face` in normalized atlas coordinates.
///
/// Single-face lights use their atlas viewport unchanged. Cube faces take
/// one third of it, offset by the face's cell in the 3×3 grid.
///
/// # Panics
///
/// When `face_count > 1` and `face` is not a cube face index (`0..6`).
#[must_use]
pub fn face_viewport(
    atlas_viewport: Vec4,
    face: usize,
    face_count: u32,
    layout: &impl CubeSlotLayout,
) -> Vec4 {
    if face_count <= 1 {
        return atlas_viewport;
    }

    let offsets = layout.cube_slots_offsets();
    assert!(
        face < offsets.len(),
        "cube face {face} out of range 0..{}",
        offsets.len()
    );

    let small_size = atlas_viewport.z / 3.0;
    let offset = offsets[face];
    Vec4::new(
        atlas_viewport.x + small_size * offset.x,
        atlas_viewport.y + small_size * offset.y,
        small_size,
        small_size,
    )
}

pub struct CookieRenderer<D: GraphicsDevice> {
    shader_2d: Option<Arc<D::Shader>>,
    shader_cube: Option<Arc<D::Shader>>,
}

impl<D: GraphicsDevice> CookieRenderer<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shader_2d: None,
            shader_cube: None,
        }
    }

    fn shader(
        &mut self,
        device: &D,
        shaders: &mut ShaderLibrary<D>,
        cube: bool,
    ) -> Result<Arc<D::Shader>> {
        let slot = if cube {
            &mut self.shader_cube
        } else {
            &mut self.shader_2d
        };

        if let Some(shader) = slot.as_ref() {
            return Ok(Arc::clone(shader));
        }

        let options = if cube {
            ShaderVariantOptions::new(COOKIE_BLIT_TEMPLATE, "CookieRendererCube")
                .with_define("CUBE", "1")
                .with_source_dimension(wgpu::TextureViewDimension::Cube)
        } else {
            ShaderVariantOptions::new(COOKIE_BLIT_TEMPLATE, "CookieRenderer2d")
        };

        let shader = shaders.get_or_create(device, &options)?;
        *slot = Some(Arc::clone(&shader));
        Ok(shader)
    }

    /// Draws the light's cookie into its atlas slot of `target`.
    ///
    /// Disabled lights, lights without a cookie and lights not visible this
    /// frame are skipped.
    pub fn render(
        &mut self,
        device: &D,
        shaders: &mut ShaderLibrary<D>,
        layout: &impl CubeSlotLayout,
        light: &Light<D::Texture>,
        target: &D::RenderTarget,
    ) -> Result<()> {
        if !light.enabled || !light.visible_this_frame {
            return Ok(());
        }
        let Some(cookie) = light.cookie.as_ref() else {
            return Ok(());
        };

        let face_count = light.num_shadow_faces();
        let cube = face_count > 1;
        let shader = self.shader(device, shaders, cube)?;
        let matrices = cube.then(inv_view_proj_matrices);
        let target_size = device.render_target_width(target) as f32;

        for face in 0..face_count as usize {
            let viewport = face_viewport(light.atlas_viewport, face, face_count, layout) * target_size;
            let params = BlitParams {
                source: cookie,
                inv_view_proj: matrices.map(|m| m[face]),
            };

            log::trace!("Cookie blit '{}' face {face} -> {viewport}", light.name);
            device.draw_quad(target, &shader, viewport, &params);
        }

        Ok(())
    }

    /// Drops the renderer's shader handles; the library keeps the compiled
    /// variants.
    pub fn destroy(&mut self) {
        self.shader_2d = None;
        self.shader_cube = None;
    }
}

impl<D: GraphicsDevice> Default for CookieRenderer<D> {
    fn default() -> Self {
        Self::new()
    }
}
