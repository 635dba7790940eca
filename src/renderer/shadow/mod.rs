//! Shadow map resources: format selection, allocation and pooling.

pub mod cache;
pub mod format;
pub mod shadow_map;

pub use cache::{ShadowMapCache, ShadowMapKey};
pub use format::{resolve_shadow_type, shadow_filtering, shadow_format, uses_depth_compare};
pub use shadow_map::{CUBE_FACE_COUNT, ShadowMap};
