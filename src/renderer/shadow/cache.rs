//! Shadow Map Cache
//!
//! Pools [`ShadowMap`]s by light shape so sequential single-light work
//! (lightmap baking one light at a time, VSM blur temporaries) does not
//! allocate and free GPU textures for every light.
//!
//! # Design
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  ShadowMapCache                      │
//! │                                                      │
//! │  pools: HashMap<ShadowMapKey, Vec<ShadowMap>>        │
//! │                                                      │
//! │  get(light)      → pop newest, or allocate (miss)    │
//! │  add(light, map) → push onto the light's pool        │
//! │  clear()         → destroy every pooled map          │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Checkout moves the [`ShadowMap`] out of the pool, so two holders can
//! never share one buffer. Pools are LIFO: the most recently returned map is
//! reused first. There is no eviction or size limit; the cache is meant for
//! the bounded checkout/return patterns above, not as a general allocator.
//!
//! Maps must be returned with the same light shape they were checked out
//! for. The key is derived from the light, not the map, so returning a map
//! against a different light files it under the wrong pool.
//!
//! Keys use the light's requested [`ShadowType`]. Demotion of float VSM
//! techniques depends only on the device, so every map under one key has
//! the same format.

use std::fmt;

use rustc_hash::FxHashMap;

use super::shadow_map::ShadowMap;
use crate::renderer::core::device::GraphicsDevice;
use crate::scene::light::{Light, ShadowType};

/// Pool key. Two lights with equal keys can share shadow buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShadowMapKey {
    pub cubemap: bool,
    pub shadow_type: ShadowType,
    pub resolution: u32,
}

impl ShadowMapKey {
    #[must_use]
    pub fn from_light<T>(light: &Light<T>) -> Self {
        Self {
            cubemap: light.is_omni(),
            shadow_type: light.shadow_type,
            resolution: light.shadow_resolution,
        }
    }
}

impl fmt::Display for ShadowMapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.cubemap,
            self.shadow_type.index(),
            self.resolution
        )
    }
}

pub struct ShadowMapCache<D: GraphicsDevice> {
    pools: FxHashMap<ShadowMapKey, Vec<ShadowMap<D>>>,
}

impl<D: GraphicsDevice> ShadowMapCache<D> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pools: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn key<T>(light: &Light<T>) -> ShadowMapKey {
        ShadowMapKey::from_light(light)
    }

    /// Checks out a shadow map for the light's shape.
    ///
    /// Reuses the most recently returned map when one is pooled, otherwise
    /// allocates a new one marked as cached.
    pub fn get<T>(&mut self, device: &D, light: &Light<T>) -> ShadowMap<D> {
        let key = Self::key(light);

        if let Some(shadow_map) = self.pools.get_mut(&key).and_then(Vec::pop) {
            log::trace!("Shadow map cache hit for {key} ({})", light.name);
            return shadow_map;
        }

        log::debug!("Shadow map cache miss for {key} ({}), allocating", light.name);
        let mut shadow_map = ShadowMap::create(device, light);
        shadow_map.cached = true;
        shadow_map
    }

    /// Returns a shadow map to the pool of the light's shape.
    ///
    /// The cache takes over the map's lifetime.
    pub fn add<T>(&mut self, light: &Light<T>, mut shadow_map: ShadowMap<D>) {
        let key = Self::key(light);
        log::trace!("Returning shadow map to pool {key} ({})", light.name);

        shadow_map.cached = true;
        self.pools.entry(key).or_default().push(shadow_map);
    }

    /// Destroys every pooled shadow map. Checked-out maps are unaffected.
    pub fn clear(&mut self, device: &D) {
        for (_, pool) in self.pools.drain() {
            for mut shadow_map in pool {
                shadow_map.destroy(device);
            }
        }
    }

    /// Destroys the pooled maps and the cache itself.
    pub fn destroy(mut self, device: &D) {
        self.clear(device);
    }

    /// Number of pooled maps for a key.
    #[must_use]
    pub fn pool_len(&self, key: &ShadowMapKey) -> usize {
        self.pools.get(key).map_or(0, Vec::len)
    }

    /// Total number of pooled maps across all keys.
    #[must_use]
    pub fn pooled_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }
}

impl<D: GraphicsDevice> Default for ShadowMapCache<D> {
    fn default() -> Self {
        Self::new()
    }
}
