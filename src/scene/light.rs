use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::renderer::settings::LightingSettings;

/// Shadow filtering technique of a light.
///
/// Selects both the storage format of the shadow map and whether it is
/// sampled with hardware depth comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShadowType {
    /// Hardware PCF, single tap.
    Pcf1,
    /// Hardware PCF, 3x3 kernel.
    Pcf3,
    /// Hardware PCF, 5x5 kernel. Always requires a depth texture.
    Pcf5,
    /// Variance shadow map, moments packed into 8-bit RGBA.
    Vsm8,
    /// Variance shadow map, 16-bit float moments.
    Vsm16,
    /// Variance shadow map, 32-bit float moments.
    Vsm32,
    /// Software percentage-closer soft shadows.
    Pcss,
}

impl ShadowType {
    pub const ALL: [ShadowType; 7] = [
        ShadowType::Pcf1,
        ShadowType::Pcf3,
        ShadowType::Pcf5,
        ShadowType::Vsm8,
        ShadowType::Vsm16,
        ShadowType::Vsm32,
        ShadowType::Pcss,
    ];

    /// Stable numeric id, used when composing cache keys.
    #[inline]
    #[must_use]
    pub fn index(self) -> u32 {
        match self {
            Self::Pcf3 => 0,
            Self::Vsm8 => 1,
            Self::Vsm16 => 2,
            Self::Vsm32 => 3,
            Self::Pcf5 => 4,
            Self::Pcf1 => 5,
            Self::Pcss => 6,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_vsm(self) -> bool {
        matches!(self, Self::Vsm8 | Self::Vsm16 | Self::Vsm32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    /// Point light, shadowed through six cube faces.
    Omni,
    Spot,
}

/// Light as seen by the shadow and cookie paths.
///
/// `T` is the texture handle type of the graphics backend the cookie lives on.
#[derive(Debug, Clone)]
pub struct Light<T> {
    /// Debug label used for GPU resource names.
    pub name: String,
    pub kind: LightKind,
    pub enabled: bool,
    pub visible_this_frame: bool,

    pub shadow_type: ShadowType,
    pub shadow_resolution: u32,

    /// Projected texture (2D for spot lights, cube for omni lights).
    pub cookie: Option<T>,
    /// Slot in the light texture atlas, in normalized atlas coordinates:
    /// `x`, `y` origin and `z`, `w` width and height.
    pub atlas_viewport: Vec4,
}

impl<T> Light<T> {
    fn new(name: impl Into<String>, kind: LightKind) -> Self {
        let defaults = LightingSettings::default();
        Self {
            name: name.into(),
            kind,
            enabled: true,
            visible_this_frame: true,
            shadow_type: defaults.shadow_type,
            shadow_resolution: defaults.shadow_resolution,
            cookie: None,
            atlas_viewport: Vec4::new(0.0, 0.0, 1.0, 1.0),
        }
    }

    #[must_use]
    pub fn new_directional(name: impl Into<String>) -> Self {
        Self::new(name, LightKind::Directional)
    }

    #[must_use]
    pub fn new_omni(name: impl Into<String>) -> Self {
        Self::new(name, LightKind::Omni)
    }

    #[must_use]
    pub fn new_spot(name: impl Into<String>) -> Self {
        Self::new(name, LightKind::Spot)
    }

    #[must_use]
    pub fn with_shadow(mut self, shadow_type: ShadowType, resolution: u32) -> Self {
        self.shadow_type = shadow_type;
        self.shadow_resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, cookie: T) -> Self {
        self.cookie = Some(cookie);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_omni(&self) -> bool {
        self.kind == LightKind::Omni
    }

    /// Number of faces the light renders into: 6 for omni lights, 1 otherwise.
    #[inline]
    #[must_use]
    pub fn num_shadow_faces(&self) -> u32 {
        if self.is_omni() { 6 } else { 1 }
    }
}
