use crate::foundation::error::{KinetexError, KinetexResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Height of the visible frame in scene units.
pub const FRAME_HEIGHT: f64 = 8.0;
/// Width of the visible frame in scene units (16:9).
pub const FRAME_WIDTH: f64 = FRAME_HEIGHT * 16.0 / 9.0;

/// Unit vector pointing up (+y).
pub const UP: Vec2 = Vec2::new(0.0, 1.0);
/// Unit vector pointing down (-y).
pub const DOWN: Vec2 = Vec2::new(0.0, -1.0);
/// Unit vector pointing left (-x).
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
/// Unit vector pointing right (+x).
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
/// The zero vector; used as "no alignment" for `aligned_edge`.
pub const ORIGIN: Vec2 = Vec2::ZERO;

/// Absolute 0-based frame index in output space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> KinetexResult<Self> {
        if den == 0 {
            return Err(KinetexError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(KinetexError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }

    /// Convert seconds to frame count, rounding to the nearest frame.
    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Pixels per scene unit; the frame is always [`FRAME_HEIGHT`] units tall.
    pub fn px_per_unit(self) -> f64 {
        f64::from(self.height) / FRAME_HEIGHT
    }

    /// Map scene coordinates (origin centred, +y up) to pixel space.
    pub fn scene_to_pixels(self) -> Affine {
        let k = self.px_per_unit();
        Affine::translate((f64::from(self.width) * 0.5, f64::from(self.height) * 0.5))
            * Affine::scale_non_uniform(k, -k)
    }
}

/// Placement of a scene element: centre position and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    /// Centre of the element's bounding box in scene units.
    pub position: Point,
    /// Uniform scale applied around `position`.
    pub scale: f64, // default 1
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            scale: 1.0,
        }
    }
}

impl Transform2D {
    /// Transform positioned at `position` with unit scale.
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale: 1.0,
        }
    }

    /// Local-to-scene affine.
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.position.to_vec2()) * Affine::scale(self.scale)
    }
}

/// The visible frame as a rectangle in scene units.
pub fn frame_rect() -> Rect {
    Rect::new(
        -FRAME_WIDTH * 0.5,
        -FRAME_HEIGHT * 0.5,
        FRAME_WIDTH * 0.5,
        FRAME_HEIGHT * 0.5,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
