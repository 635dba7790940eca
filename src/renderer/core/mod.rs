//! GPU device abstraction and the wgpu backend.
//!
//! - [`GraphicsDevice`]: the handle-level interface shadow and cookie code is written against
//! - [`WgpuDevice`]: wgpu implementation, with blit pipelines cached per shader and format
//! - [`WgpuContext`]: headless adapter/device bootstrap

pub mod context;
pub mod device;
pub mod wgpu_device;

pub use context::{WgpuContext, capabilities_from_adapter};
pub use device::{
    Attachment, BlitParams, DeviceCapabilities, GraphicsDevice, RenderTargetDesc, ShaderDesc,
    TextureDesc,
};
pub use wgpu_device::{WgpuDevice, WgpuRenderTarget, WgpuShader, WgpuTexture};
