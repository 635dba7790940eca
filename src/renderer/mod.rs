pub mod core;
pub mod lighting;
pub mod pipeline;
pub mod settings;
pub mod shadow;

pub use settings::LightingSettings;
