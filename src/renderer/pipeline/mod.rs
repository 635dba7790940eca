//! Shader variant generation and caching.

pub mod shader_gen;
pub mod shader_manager;

pub use shader_gen::{ShaderGenerator, ShaderVariantOptions};
pub use shader_manager::ShaderLibrary;
