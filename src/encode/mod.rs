//! Frame sinks: in-memory capture, ffmpeg MP4, and PNG sequences.

pub(crate) mod ffmpeg;
pub(crate) mod png;
pub(crate) mod sink;
