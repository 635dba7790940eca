//! Lighting Settings
//!
//! Configuration consumed by the shadow and cookie subsystems.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use umbra::renderer::settings::LightingSettings;
//! use umbra::scene::light::ShadowType;
//!
//! // Defaults: cookies on, 2048² cookie atlas, PCF 3x3 at 1024².
//! let settings = LightingSettings::default();
//!
//! // Soft shadows with a smaller cookie atlas
//! let settings = LightingSettings {
//!     shadow_type: ShadowType::Vsm16,
//!     cookie_atlas_resolution: 1024,
//!     ..Default::default()
//! };
//! ```
//!
//! The struct is `serde`-enabled so it can be loaded from a project file.

use serde::{Deserialize, Serialize};

use crate::scene::light::ShadowType;

/// Lighting configuration shared by the light texture atlas and new lights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingSettings {
    /// When `false`, no atlas slots are assigned and cookies are not rendered.
    pub cookies_enabled: bool,
    /// Edge length in pixels of the square cookie atlas texture.
    pub cookie_atlas_resolution: u32,
    /// Shadow technique given to newly constructed lights.
    pub shadow_type: ShadowType,
    /// Shadow map edge length given to newly constructed lights.
    pub shadow_resolution: u32,
}

impl Default for LightingSettings {
    fn default() -> Self {
        Self {
            cookies_enabled: true,
            cookie_atlas_resolution: 2048,
            shadow_type: ShadowType::Pcf3,
            shadow_resolution: 1024,
        }
    }
}
