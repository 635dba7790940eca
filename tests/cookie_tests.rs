//! Cookie Rendering Tests
//!
//! Tests for:
//! - Skip conditions of `CookieRenderer::render`
//! - Draw count and viewports per light kind
//! - Cube face subdivision of the atlas viewport
//! - Shader variant reuse
//! - Atlas slot assignment and reallocation

mod common;

use glam::Vec4;

use common::{MockTexture, RecordingDevice, approx, approx_px};
use umbra::renderer::core::GraphicsDevice;
use umbra::renderer::lighting::{
    CUBE_SLOTS_OFFSETS, CookieRenderer, DefaultCubeSlots, LightTextureAtlas, face_viewport,
    inv_view_proj_matrices,
};
use umbra::renderer::pipeline::ShaderLibrary;
use umbra::renderer::settings::LightingSettings;
use umbra::scene::light::Light;

struct Fixture {
    device: RecordingDevice,
    shaders: ShaderLibrary<RecordingDevice>,
    renderer: CookieRenderer<RecordingDevice>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            device: RecordingDevice::new(),
            shaders: ShaderLibrary::new(),
            renderer: CookieRenderer::new(),
        }
    }

    fn spot_with_cookie(&self) -> Light<MockTexture> {
        Light::new_spot("spot").with_cookie(self.device.texture(64, false))
    }

    fn omni_with_cookie(&self) -> Light<MockTexture> {
        Light::new_omni("omni").with_cookie(self.device.texture(64, true))
    }

    fn render(&mut self, light: &Light<MockTexture>, target_size: u32) {
        let target = self.device.color_target(target_size);
        self.renderer
            .render(
                &self.device,
                &mut self.shaders,
                &DefaultCubeSlots,
                light,
                &target,
            )
            .expect("cookie render");
    }
}

// ============================================================================
// Skip conditions
// ============================================================================

#[test]
fn disabled_light_draws_nothing() {
    let mut fx = Fixture::new();
    let mut light = fx.spot_with_cookie();
    light.enabled = false;

    fx.render(&light, 1024);
    assert_eq!(fx.device.draw_count(), 0);
}

#[test]
fn light_without_cookie_draws_nothing() {
    let mut fx = Fixture::new();
    let light: Light<MockTexture> = Light::new_omni("omni");

    fx.render(&light, 1024);
    assert_eq!(fx.device.draw_count(), 0);
    assert!(fx.shaders.is_empty());
}

#[test]
fn invisible_light_draws_nothing() {
    let mut fx = Fixture::new();
    let mut light = fx.omni_with_cookie();
    light.visible_this_frame = false;

    fx.render(&light, 1024);
    assert_eq!(fx.device.draw_count(), 0);
}

// ============================================================================
// Draws
// ============================================================================

#[test]
fn spot_cookie_draws_once_into_pixel_viewport() {
    let mut fx = Fixture::new();
    let mut light = fx.spot_with_cookie();
    light.atlas_viewport = Vec4::new(0.5, 0.25, 0.25, 0.25);
    let cookie_id = light.cookie.as_ref().map(|c| c.id);

    fx.render(&light, 1024);

    let draws = fx.device.draws.borrow();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].viewport, Vec4::new(512.0, 256.0, 256.0, 256.0));
    assert_eq!(draws[0].shader_label, "CookieRenderer2d");
    assert_eq!(Some(draws[0].source_id), cookie_id);
    assert!(draws[0].inv_view_proj.is_none());
}

#[test]
fn omni_cookie_draws_six_faces_with_face_matrices() {
    let mut fx = Fixture::new();
    let light = fx.omni_with_cookie();

    fx.render(&light, 900);

    let draws = fx.device.draws.borrow();
    assert_eq!(draws.len(), 6);
    let matrices = inv_view_proj_matrices();
    for (face, draw) in draws.iter().enumerate() {
        assert_eq!(draw.shader_label, "CookieRendererCube");
        assert_eq!(draw.inv_view_proj, Some(matrices[face]));
        assert!(approx_px(draw.viewport.z, 300.0));
        assert!(approx_px(draw.viewport.w, 300.0));
        assert!(approx_px(draw.viewport.x, 300.0 * CUBE_SLOTS_OFFSETS[face].x));
        assert!(approx_px(draw.viewport.y, 300.0 * CUBE_SLOTS_OFFSETS[face].y));
    }
}

#[test]
fn cube_faces_subdivide_viewport_into_thirds() {
    let parent = Vec4::new(0.0, 0.0, 0.9, 0.9);

    for face in 0..6 {
        let vp = face_viewport(parent, face, 6, &DefaultCubeSlots);
        assert!(approx(vp.z, 0.3), "face {face}: width {}", vp.z);
        assert!(approx(vp.w, 0.3), "face {face}: height {}", vp.w);
        assert!(vp.x >= parent.x && vp.y >= parent.y);
        assert!(vp.x + vp.z <= parent.x + parent.z + common::EPSILON);
        assert!(vp.y + vp.w <= parent.y + parent.w + common::EPSILON);
    }
}

#[test]
fn cube_faces_use_six_distinct_cells() {
    let parent = Vec4::new(0.25, 0.5, 0.3, 0.3);
    let mut cells: Vec<(i32, i32)> = (0..6)
        .map(|face| {
            let vp = face_viewport(parent, face, 6, &DefaultCubeSlots);
            (
                ((vp.x - parent.x) / vp.z).round() as i32,
                ((vp.y - parent.y) / vp.w).round() as i32,
            )
        })
        .collect();
    cells.sort_unstable();
    cells.dedup();
    assert_eq!(cells.len(), 6);
}

#[test]
fn cube_faces_fill_top_two_rows() {
    let parent = Vec4::new(0.0, 0.0, 0.9, 0.9);
    let top = parent.y;
    let second = parent.y + parent.w / 3.0;

    for face in 0..6 {
        let vp = face_viewport(parent, face, 6, &DefaultCubeSlots);
        let expected_y = if face % 2 == 0 { top } else { second };
        assert!(approx(vp.y, expected_y), "face {face}: y {}", vp.y);
        assert!(vp.y + vp.w <= parent.y + 2.0 * parent.w / 3.0 + common::EPSILON);
    }
}

#[test]
#[should_panic(expected = "out of range")]
fn cube_face_index_past_last_face_panics() {
    let _ = face_viewport(Vec4::new(0.0, 0.0, 0.9, 0.9), 6, 6, &DefaultCubeSlots);
}

#[test]
fn single_face_uses_atlas_viewport_unchanged() {
    let parent = Vec4::new(0.1, 0.2, 0.3, 0.4);
    assert_eq!(face_viewport(parent, 0, 1, &DefaultCubeSlots), parent);
}

// ============================================================================
// Shader reuse
// ============================================================================

#[test]
fn shaders_are_compiled_once_per_kind() {
    let mut fx = Fixture::new();
    let spot = fx.spot_with_cookie();
    let omni = fx.omni_with_cookie();

    fx.render(&spot, 512);
    fx.render(&spot, 512);
    fx.render(&omni, 512);
    fx.render(&omni, 512);

    assert_eq!(fx.shaders.len(), 2);
    assert_eq!(
        fx.device.shaders_created.borrow().as_slice(),
        &["CookieRenderer2d".to_string(), "CookieRendererCube".to_string()]
    );
}

#[test]
fn renderers_share_library_variants() {
    let mut fx = Fixture::new();
    let spot = fx.spot_with_cookie();
    fx.render(&spot, 256);

    let mut other = CookieRenderer::new();
    let target = fx.device.color_target(256);
    other
        .render(&fx.device, &mut fx.shaders, &DefaultCubeSlots, &spot, &target)
        .expect("cookie render");

    assert_eq!(fx.device.shaders_created.borrow().len(), 1);
}

#[test]
fn destroy_keeps_library_variants() {
    let mut fx = Fixture::new();
    let spot = fx.spot_with_cookie();
    fx.render(&spot, 256);

    fx.renderer.destroy();
    fx.render(&spot, 256);

    assert_eq!(fx.device.shaders_created.borrow().len(), 1);
    assert_eq!(fx.device.draw_count(), 2);
}

// ============================================================================
// Light texture atlas
// ============================================================================

#[test]
fn atlas_assigns_grid_slots_to_cookie_lights() {
    let device = RecordingDevice::new();
    let mut atlas = LightTextureAtlas::new();
    let settings = LightingSettings::default();

    let mut lights = vec![
        Light::new_spot("a").with_cookie(device.texture(32, false)),
        Light::new_spot("no cookie"),
        Light::new_omni("b").with_cookie(device.texture(32, true)),
        Light::new_spot("c").with_cookie(device.texture(32, false)),
    ];

    atlas.update(&device, &mut lights, &settings);

    assert_eq!(atlas.slot_count(), 3);
    assert_eq!(atlas.resolution(), settings.cookie_atlas_resolution);
    assert_eq!(lights[0].atlas_viewport, Vec4::new(0.0, 0.0, 0.5, 0.5));
    assert_eq!(lights[2].atlas_viewport, Vec4::new(0.5, 0.0, 0.5, 0.5));
    assert_eq!(lights[3].atlas_viewport, Vec4::new(0.0, 0.5, 0.5, 0.5));

    let target = atlas.cookie_render_target().expect("atlas target");
    assert_eq!(
        device.render_target_width(target),
        settings.cookie_atlas_resolution
    );
}

#[test]
fn atlas_reallocates_on_resolution_change() {
    let device = RecordingDevice::new();
    let mut atlas = LightTextureAtlas::new();
    let mut settings = LightingSettings::default();
    let mut lights = vec![Light::new_spot("a").with_cookie(device.texture(32, false))];

    atlas.update(&device, &mut lights, &settings);
    atlas.update(&device, &mut lights, &settings);
    let created = device.textures_created.get();

    settings.cookie_atlas_resolution = 1024;
    atlas.update(&device, &mut lights, &settings);

    assert_eq!(device.textures_created.get(), created + 1);
    assert_eq!(device.textures_destroyed.borrow().len(), 1);
    assert_eq!(atlas.resolution(), 1024);
}

#[test]
fn atlas_released_when_cookies_disabled() {
    let device = RecordingDevice::new();
    let mut atlas = LightTextureAtlas::new();
    let mut settings = LightingSettings::default();
    let mut lights = vec![Light::new_spot("a").with_cookie(device.texture(32, false))];

    atlas.update(&device, &mut lights, &settings);
    assert!(atlas.cookie_texture().is_some());

    settings.cookies_enabled = false;
    atlas.update(&device, &mut lights, &settings);

    assert!(atlas.cookie_texture().is_none());
    assert!(atlas.cookie_render_target().is_none());
    assert_eq!(atlas.slot_count(), 0);
}

#[test]
fn atlas_feeds_cookie_renderer() {
    let mut fx = Fixture::new();
    let mut atlas = LightTextureAtlas::new();
    let settings = LightingSettings {
        cookie_atlas_resolution: 600,
        ..LightingSettings::default()
    };
    let mut lights = vec![fx.spot_with_cookie(), fx.omni_with_cookie()];

    atlas.update(&fx.device, &mut lights, &settings);
    let target = atlas.cookie_render_target().expect("atlas target");
    for light in &lights {
        fx.renderer
            .render(&fx.device, &mut fx.shaders, &atlas, light, target)
            .expect("cookie render");
    }

    let draws = fx.device.draws.borrow();
    assert_eq!(draws.len(), 7);
    assert_eq!(draws[0].viewport, Vec4::new(0.0, 0.0, 300.0, 300.0));
    for draw in &draws[1..] {
        assert!(approx_px(draw.viewport.z, 100.0));
        assert!(draw.viewport.x >= 299.99);
    }
}
