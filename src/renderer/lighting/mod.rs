//! Clustered-lighting texture atlas and cookie rendering.

pub mod atlas;
pub mod cookie;

pub use atlas::{CUBE_SLOTS_OFFSETS, CubeSlotLayout, DefaultCubeSlots, LightTextureAtlas};
pub use cookie::{CookieRenderer, face_viewport, inv_view_proj_matrices};
