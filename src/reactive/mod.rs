//! Pull-model reactive values and the bindings that derive element state from them.

pub(crate) mod binding;
pub(crate) mod value;
