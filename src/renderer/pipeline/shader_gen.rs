//! Shader Variant Options
//!
//! A shader variant is identified by its template name plus the define set
//! it is rendered with. [`ShaderVariantOptions::cache_key`] folds both into a
//! stable 64-bit key, so requesting the same variant twice never recompiles.

use std::collections::BTreeMap;

use serde::Serialize;
use xxhash_rust::xxh3::Xxh3;

use super::shader_manager::get_env;
use crate::errors::{Result, UmbraError};
use crate::resources::shader_defines::ShaderDefines;

/// Everything needed to generate and compile one shader variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderVariantOptions {
    /// Embedded template path, without the `.wgsl` extension.
    pub template: &'static str,
    /// Debug label of the compiled shader.
    pub label: String,
    pub defines: ShaderDefines,
    /// View dimension of the texture the shader samples.
    pub source_dimension: wgpu::TextureViewDimension,
}

impl ShaderVariantOptions {
    #[must_use]
    pub fn new(template: &'static str, label: impl Into<String>) -> Self {
        Self {
            template,
            label: label.into(),
            defines: ShaderDefines::new(),
            source_dimension: wgpu::TextureViewDimension::D2,
        }
    }

    #[must_use]
    pub fn with_define(mut self, key: &str, value: &str) -> Self {
        self.defines.set(key, value);
        self
    }

    #[must_use]
    pub fn with_source_dimension(mut self, dimension: wgpu::TextureViewDimension) -> Self {
        self.source_dimension = dimension;
        self
    }

    /// Key identifying the compiled variant. The label does not take part.
    #[must_use]
    pub fn cache_key(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(self.template.as_bytes());
        for (key, value) in self.defines.iter() {
            hasher.update(&[0]);
            hasher.update(key.as_bytes());
            hasher.update(&[b'=']);
            hasher.update(value.as_bytes());
        }
        hasher.update(format!("{:?}", self.source_dimension).as_bytes());
        hasher.digest()
    }
}

#[derive(Serialize)]
struct ShaderContext {
    #[serde(flatten)]
    defines: BTreeMap<String, String>,
}

pub struct ShaderGenerator;

impl ShaderGenerator {
    /// Renders the variant's template to WGSL.
    pub fn generate_shader(options: &ShaderVariantOptions) -> Result<String> {
        let env = get_env();
        let template = env.get_template(options.template).map_err(|e| {
            if e.kind() == minijinja::ErrorKind::TemplateNotFound {
                UmbraError::ShaderTemplateNotFound(options.template.to_string())
            } else {
                UmbraError::ShaderTemplate(e)
            }
        })?;

        let ctx = ShaderContext {
            defines: options.defines.to_map(),
        };
        let source = template.render(&ctx)?;

        Ok(format!("// === Auto-generated Shader: {} ===\n{source}", options.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_ignores_label() {
        let a = ShaderVariantOptions::new("cookie_blit", "A").with_define("CUBE", "1");
        let b = ShaderVariantOptions::new("cookie_blit", "B").with_define("CUBE", "1");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_depends_on_defines() {
        let plain = ShaderVariantOptions::new("cookie_blit", "2d");
        let cube = ShaderVariantOptions::new("cookie_blit", "cube").with_define("CUBE", "1");
        assert_ne!(plain.cache_key(), cube.cache_key());
    }
}
