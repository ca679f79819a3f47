pub(crate) mod element;
pub(crate) mod graph;
pub(crate) mod payload;
