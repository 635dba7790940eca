//! Material Parameters
//!
//! Materials are consumed by the lighting code only through
//! [`MaterialParameters`]: get/set a parameter by name plus a dirty flag
//! telling the renderer that uniforms must be re-uploaded.
//!
//! [`ParameterBlock`] resolves names to dense slot indices once, at
//! construction, so per-frame access is a hash lookup plus an index.

use glam::{Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl ParameterValue {
    /// Values of different variants cannot share a slot.
    #[inline]
    fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

pub trait MaterialParameters {
    fn parameter(&self, name: &str) -> Option<&ParameterValue>;

    /// Sets a declared parameter. Returns `false` if the name is unknown or
    /// the value has a different type than the declared one.
    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool;

    fn is_dirty(&self) -> bool;

    fn clear_dirty(&mut self);
}

/// Fixed set of named parameters stored in declaration order.
#[derive(Debug, Clone)]
pub struct ParameterBlock {
    slots: FxHashMap<&'static str, usize>,
    values: Vec<ParameterValue>,
    dirty: bool,
}

impl ParameterBlock {
    /// Declares the parameters and their initial values. A repeated name
    /// keeps its first slot.
    #[must_use]
    pub fn new(declarations: &[(&'static str, ParameterValue)]) -> Self {
        let mut slots = FxHashMap::default();
        let mut values = Vec::with_capacity(declarations.len());

        for &(name, value) in declarations {
            slots.entry(name).or_insert_with(|| {
                values.push(value);
                values.len() - 1
            });
        }

        Self {
            slots,
            values,
            dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Values in slot order, ready for uniform packing.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[ParameterValue] {
        &self.values
    }
}

impl MaterialParameters for ParameterBlock {
    fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.slot(name).map(|slot| &self.values[slot])
    }

    fn set_parameter(&mut self, name: &str, value: ParameterValue) -> bool {
        let Some(slot) = self.slot(name) else {
            return false;
        };

        let current = &mut self.values[slot];
        if !current.same_kind(&value) {
            log::warn!("Parameter '{name}' type mismatch: {current:?} vs {value:?}");
            return false;
        }

        if *current != value {
            *current = value;
            self.dirty = true;
        }
        true
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
