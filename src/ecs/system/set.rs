//! Utilities for component requirements of *systems* in ECS.

use crate::error::Result;

use super::super::{Component, ComponentManager, Signature};

/// Set of component types which are required by the *system* in ECS.
///
/// Implemented for the unit type and for tuples of up to 12 component types.
///
pub trait ComponentSet {
    /// Resolves every type of this set into its bit and combines them.
    ///
    /// # Errors
    ///
    /// An error is returned if any of the types was not registered.
    ///
    fn signature(components: &ComponentManager) -> Result<Signature>;
}

impl ComponentSet for () {
    fn signature(_components: &ComponentManager) -> Result<Signature> {
        Ok(Signature::new())
    }
}

// Generate implementations of ComponentSet for tuples up to 12 elements.
macro_rules! impl_component_set {
    ($($ty:ident),+) => {
        impl<$($ty),+> ComponentSet for ($($ty,)+)
        where
            $($ty: Component,)+
        {
            fn signature(components: &ComponentManager) -> Result<Signature> {
                let mut signature = Signature::new();
                $(signature.insert(components.component_type::<$ty>()?);)+
                Ok(signature)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
impl_component_set!(A, B, C, D, E, F, G, H, I);
impl_component_set!(A, B, C, D, E, F, G, H, I, J);
impl_component_set!(A, B, C, D, E, F, G, H, I, J, K);
impl_component_set!(A, B, C, D, E, F, G, H, I, J, K, L);
