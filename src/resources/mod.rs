pub mod material;
pub mod shader_defines;

pub use material::{MaterialParameters, ParameterBlock, ParameterValue};
pub use shader_defines::ShaderDefines;
