#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{Result, UmbraError};
pub use renderer::core::{DeviceCapabilities, GraphicsDevice, WgpuContext, WgpuDevice};
pub use renderer::lighting::{CookieRenderer, CubeSlotLayout, LightTextureAtlas};
pub use renderer::pipeline::{ShaderLibrary, ShaderVariantOptions};
pub use renderer::settings::LightingSettings;
pub use renderer::shadow::{ShadowMap, ShadowMapCache, ShadowMapKey, shadow_filtering, shadow_format};
pub use resources::{MaterialParameters, ParameterBlock, ParameterValue, ShaderDefines};
pub use scene::{Light, LightKind, ShadowType};
