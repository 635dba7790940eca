//! Shader Define Sets
//!
//! [`ShaderDefines`] is the option set that selects a shader variant. Entries
//! are kept sorted by key so that equal sets compare and hash identically
//! regardless of insertion order.
//!
//! ```rust,ignore
//! use umbra::resources::shader_defines::ShaderDefines;
//!
//! let mut defines = ShaderDefines::new();
//! defines.set("CUBE", "1");
//! defines.set("DECODE", "srgb");
//!
//! let hash = defines.compute_hash();
//! ```

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Sorted set of `key = value` shader defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderDefines {
    defines: Vec<(String, String)>,
}

impl ShaderDefines {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Set a define, replacing an existing value for the same key.
    pub fn set(&mut self, key: &str, value: &str) {
        match self
            .defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
        {
            Ok(idx) => value.clone_into(&mut self.defines[idx].1),
            Err(idx) => self.defines.insert(idx, (key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if let Ok(idx) = self
            .defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
        {
            self.defines.remove(idx);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.defines
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| self.defines[idx].1.as_str())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.defines.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert to `BTreeMap` (for template rendering)
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.defines.iter().cloned().collect()
    }

    /// Merge defines from `other`; its values win on conflicts.
    pub fn merge(&mut self, other: &ShaderDefines) {
        for (key, value) in &other.defines {
            self.set(key, value);
        }
    }

    /// Compute content hash (for caching)
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

impl Hash for ShaderDefines {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl From<&[(&str, &str)]> for ShaderDefines {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self::new();
        for (k, v) in defines {
            result.set(k, v);
        }
        result
    }
}
