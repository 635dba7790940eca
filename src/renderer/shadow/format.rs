//! Shadow Format Selection
//!
//! Maps a [`ShadowType`] and the device capabilities to the storage format
//! and the sampler filter of its shadow map.
//!
//! Float VSM techniques the device cannot render to are demoted first
//! (`Vsm32` → `Vsm16` → `Vsm8`, see [`resolve_shadow_type`]); the tables
//! below then apply to the resolved technique.
//!
//! | Technique           | Format                       | Filter                          |
//! |---------------------|------------------------------|---------------------------------|
//! | `Vsm32`             | `Rgba32Float`                | linear if float32 filterable    |
//! | `Vsm16`             | `Rgba16Float`                | linear if float16 filterable    |
//! | `Pcf5`              | `Depth32Float`               | linear                          |
//! | `Pcf1` / `Pcf3`     | `Depth32Float` with compare, | linear with compare,            |
//! |                     | else `Rgba8Unorm`            | else nearest                    |
//! | `Vsm8`, `Pcss`      | `Rgba8Unorm`                 | linear                          |
//!
//! Colour-encoded depth (`Rgba8Unorm` for PCF) packs depth bits into the
//! channels and must never be filtered.

use crate::renderer::core::device::DeviceCapabilities;
use crate::scene::light::ShadowType;

/// Format used when the shadow map is a hardware depth texture.
pub const SHADOW_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Format used for colour-encoded depth and 8-bit VSM moments.
pub const SHADOW_ENCODED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// The technique actually allocated on this device.
///
/// Float VSM maps need a renderable float format; without one they step
/// down to the next smaller moment format. Other techniques are unchanged.
#[must_use]
pub fn resolve_shadow_type(caps: &DeviceCapabilities, shadow_type: ShadowType) -> ShadowType {
    if !shadow_type.is_vsm() {
        return shadow_type;
    }

    let mut resolved = shadow_type;
    if resolved == ShadowType::Vsm32 && !caps.float32_renderable {
        resolved = ShadowType::Vsm16;
    }
    if resolved == ShadowType::Vsm16 && !caps.float16_renderable {
        resolved = ShadowType::Vsm8;
    }
    resolved
}

/// Returns `true` when the technique renders into a depth attachment that
/// is sampled with hardware comparison.
#[inline]
#[must_use]
pub fn uses_depth_compare(caps: &DeviceCapabilities, shadow_type: ShadowType) -> bool {
    match resolve_shadow_type(caps, shadow_type) {
        ShadowType::Pcf5 => true,
        ShadowType::Pcf1 | ShadowType::Pcf3 => caps.depth_compare,
        ShadowType::Vsm8 | ShadowType::Vsm16 | ShadowType::Vsm32 | ShadowType::Pcss => false,
    }
}

#[must_use]
pub fn shadow_format(caps: &DeviceCapabilities, shadow_type: ShadowType) -> wgpu::TextureFormat {
    match resolve_shadow_type(caps, shadow_type) {
        ShadowType::Vsm32 => wgpu::TextureFormat::Rgba32Float,
        ShadowType::Vsm16 => wgpu::TextureFormat::Rgba16Float,
        ShadowType::Pcf5 => SHADOW_DEPTH_FORMAT,
        ShadowType::Pcf1 | ShadowType::Pcf3 if caps.depth_compare => SHADOW_DEPTH_FORMAT,
        ShadowType::Pcf1 | ShadowType::Pcf3 | ShadowType::Vsm8 | ShadowType::Pcss => {
            SHADOW_ENCODED_FORMAT
        }
    }
}

#[must_use]
pub fn shadow_filtering(caps: &DeviceCapabilities, shadow_type: ShadowType) -> wgpu::FilterMode {
    let linear_if = |supported: bool| {
        if supported {
            wgpu::FilterMode::Linear
        } else {
            wgpu::FilterMode::Nearest
        }
    };

    match resolve_shadow_type(caps, shadow_type) {
        ShadowType::Pcf1 | ShadowType::Pcf3 => linear_if(caps.depth_compare),
        ShadowType::Vsm32 => linear_if(caps.float32_filterable),
        ShadowType::Vsm16 => linear_if(caps.float16_filterable),
        ShadowType::Pcf5 | ShadowType::Vsm8 | ShadowType::Pcss => wgpu::FilterMode::Linear,
    }
}
