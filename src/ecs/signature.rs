//! Utilities for *signatures* of entities and systems in ECS.

use std::fmt;

use bit_vec::BitVec;

use super::ComponentType;

/// Set of component types, one bit per registered type.
///
/// The set grows on demand, so the number of component types is only bounded
/// by [`Config::max_component_types`](crate::config::Config::max_component_types).
/// Trailing unset bits are never stored, which keeps equality and hashing
/// independent of how the signature was built.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    bits: BitVec,
}

impl Signature {
    /// Creates an empty signature.
    pub fn new() -> Self {
        Self { bits: BitVec::new() }
    }

    /// Sets the bit of the component type.
    ///
    /// Returns `true` if the bit was not set before.
    ///
    pub fn insert(&mut self, component: ComponentType) -> bool {
        let index = component.index();
        if index >= self.bits.len() {
            self.bits.grow(index + 1 - self.bits.len(), false);
        }
        let was_set = self.bits.get(index).unwrap_or(false);
        self.bits.set(index, true);
        !was_set
    }

    /// Clears the bit of the component type.
    ///
    /// Returns `true` if the bit was set before.
    ///
    pub fn remove(&mut self, component: ComponentType) -> bool {
        let index = component.index();
        if !self.bits.get(index).unwrap_or(false) {
            return false;
        }
        self.bits.set(index, false);
        self.trim();
        true
    }

    /// Returns `true` if the bit of the component type is set.
    pub fn has(&self, component: ComponentType) -> bool {
        self.bits.get(component.index()).unwrap_or(false)
    }

    /// Returns `true` if every bit of `required` is also set in this signature,
    /// i.e. `(self & required) == required`.
    pub fn contains(&self, required: &Signature) -> bool {
        if required.bits.len() > self.bits.len() {
            return false;
        }
        required
            .bits
            .iter()
            .zip(self.bits.iter())
            .all(|(needed, present)| !needed || present)
    }

    /// Returns `true` if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.bits.iter().filter(|bit| *bit).count()
    }

    /// Returns iterator over the component types whose bits are set.
    pub fn iter(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(index, _)| ComponentType::from_index(index))
    }

    /// Returns a copy of this signature with the bit of the component type set.
    pub fn with(&self, component: ComponentType) -> Self {
        let mut signature = self.clone();
        signature.insert(component);
        signature
    }

    /// Returns a copy of this signature with the bit of the component type cleared.
    pub fn without(&self, component: ComponentType) -> Self {
        let mut signature = self.clone();
        signature.remove(component);
        signature
    }

    fn trim(&mut self) {
        while let Some(false) = self.bits.get(self.bits.len().wrapping_sub(1)) {
            self.bits.pop();
        }
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        let mut signature = Self::new();
        for component in iter {
            signature.insert(component);
        }
        signature
    }
}

impl Extend<ComponentType> for Signature {
    fn extend<I: IntoIterator<Item = ComponentType>>(&mut self, iter: I) {
        for component in iter {
            self.insert(component);
        }
    }
}

/// Formats the signature as a binary number, highest bit first.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0b")?;
        if self.bits.is_empty() {
            return f.write_str("0");
        }
        for index in (0..self.bits.len()).rev() {
            let bit = self.bits.get(index).unwrap_or(false);
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
