//! Steps, batches and the director that plays them.

pub(crate) mod cue;
pub(crate) mod director;
pub(crate) mod frame;
pub(crate) mod state;
pub(crate) mod step;
