//! Rasterization seam and the frame pipeline.

pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod pipeline;
