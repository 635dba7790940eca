pub mod light;

pub use light::{Light, LightKind, ShadowType};
