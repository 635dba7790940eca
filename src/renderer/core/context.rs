//! wgpu Context
//!
//! The [`WgpuContext`] holds the adapter, device and queue, plus the
//! capability flags the shadow and cookie code depends on. Shadow and cookie
//! rendering are offscreen only, so no surface is created.

use crate::errors::{Result, UmbraError};
use crate::renderer::core::device::DeviceCapabilities;

pub struct WgpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    capabilities: DeviceCapabilities,
}

impl WgpuContext {
    /// Requests an adapter and device without a presentation surface.
    ///
    /// `FLOAT32_FILTERABLE` is enabled when the adapter offers it so that
    /// 32-bit VSM maps can be sampled linearly.
    pub async fn new_headless(power_preference: wgpu::PowerPreference) -> Result<Self> {
        let instance = wgpu::Instance::default();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| UmbraError::AdapterRequestFailed(e.to_string()))?;

        let required_features = adapter.features() & wgpu::Features::FLOAT32_FILTERABLE;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Umbra Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let capabilities = capabilities_from_adapter(&adapter, device.features());

        let info = adapter.get_info();
        log::info!(
            "Using adapter '{}' ({:?}), capabilities: {capabilities:?}",
            info.name,
            info.backend
        );

        Ok(Self {
            adapter,
            device,
            queue,
            capabilities,
        })
    }

    #[inline]
    #[must_use]
    pub fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }
}

/// Derives the capability flags from what the adapter reports and the
/// features actually enabled on the device.
#[must_use]
pub fn capabilities_from_adapter(
    adapter: &wgpu::Adapter,
    enabled_features: wgpu::Features,
) -> DeviceCapabilities {
    let downlevel = adapter.get_downlevel_capabilities();
    let float32 = adapter.get_texture_format_features(wgpu::TextureFormat::Rgba32Float);
    let float16 = adapter.get_texture_format_features(wgpu::TextureFormat::Rgba16Float);

    DeviceCapabilities {
        depth_compare: downlevel
            .flags
            .contains(wgpu::DownlevelFlags::COMPARISON_SAMPLERS),
        float32_filterable: enabled_features.contains(wgpu::Features::FLOAT32_FILTERABLE),
        float16_filterable: float16
            .flags
            .contains(wgpu::TextureFormatFeatureFlags::FILTERABLE),
        float32_renderable: float32
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT),
        float16_renderable: float16
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT),
    }
}
