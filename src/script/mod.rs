//! Declarative scene programs.

pub(crate) mod builder;
pub mod liquidity;
