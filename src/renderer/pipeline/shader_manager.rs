//! Shader Template Manager
//!
//! WGSL templates are embedded with `rust-embed` and rendered with
//! minijinja using the `{$ ... $}` block syntax, so that WGSL braces stay
//! untouched. [`ShaderLibrary`] compiles each variant once and hands out
//! shared handles afterwards.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;

use super::shader_gen::{ShaderGenerator, ShaderVariantOptions};
use crate::errors::Result;
use crate::renderer::core::device::{GraphicsDevice, ShaderDesc};

pub static SHADER_ENV: OnceLock<Environment<'static>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/renderer/pipeline/shaders"]
struct ShaderAssets;

pub fn get_env() -> &'static Environment<'static> {
    SHADER_ENV.get_or_init(|| {
        let mut env = Environment::new();

        match SyntaxConfig::builder()
            .block_delimiters("{$", "$}")
            .variable_delimiters("{{", "}}")
            .line_statement_prefix("$$")
            .build()
        {
            Ok(syntax) => env.set_syntax(syntax),
            Err(e) => log::error!("Failed to configure shader template syntax: {e}"),
        }

        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Lenient);
        env.set_loader(shader_loader);

        env
    })
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    let Some(file) = ShaderAssets::get(&filename) else {
        return Ok(None);
    };

    match std::str::from_utf8(file.data.as_ref()) {
        Ok(source) => Ok(Some(source.to_string())),
        Err(e) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("Shader template {filename} is not UTF-8: {e}"),
        )),
    }
}

/// Compiled shader variants, keyed by [`ShaderVariantOptions::cache_key`].
pub struct ShaderLibrary<D: GraphicsDevice> {
    shaders: FxHashMap<u64, Arc<D::Shader>>,
}

impl<D: GraphicsDevice> ShaderLibrary<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shaders: FxHashMap::default(),
        }
    }

    /// Returns the compiled variant, generating and compiling it on first use.
    pub fn get_or_create(
        &mut self,
        device: &D,
        options: &ShaderVariantOptions,
    ) -> Result<Arc<D::Shader>> {
        let key = options.cache_key();
        if let Some(shader) = self.shaders.get(&key) {
            return Ok(Arc::clone(shader));
        }

        let source = ShaderGenerator::generate_shader(options)?;
        log::debug!(
            "Compiling shader variant '{}' ({} defines, key {key:016x})",
            options.label,
            options.defines.len()
        );

        let shader = Arc::new(device.create_shader(&ShaderDesc {
            label: &options.label,
            source: &source,
            source_dimension: options.source_dimension,
        }));
        self.shaders.insert(key, Arc::clone(&shader));
        Ok(shader)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

impl<D: GraphicsDevice> Default for ShaderLibrary<D> {
    fn default() -> Self {
        Self::new()
    }
}
