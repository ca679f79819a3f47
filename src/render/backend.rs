use crate::foundation::core::Canvas;
use crate::foundation::error::KinetexResult;
use crate::timeline::frame::FrameState;

/// A rendered frame as premultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

/// Consumed rendering backend: turns a frame snapshot into pixels.
pub trait Rasterizer {
    /// Output size in pixels.
    fn canvas(&self) -> Canvas;

    /// Draw every node of `frame`, in order, over the backend's clear color.
    fn rasterize(&mut self, frame: &FrameState) -> KinetexResult<FrameRGBA>;
}
