use smallvec::SmallVec;

use crate::foundation::core::{Rect, Transform2D};
use crate::foundation::ids::{ElementId, GroupId, ValueId};
use crate::scene::payload::Payload;

/// Straight-alpha RGBA8 white.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];
/// Straight-alpha RGBA8 used for highlighted elements.
pub const YELLOW: [u8; 4] = [255, 255, 0, 255];
/// Straight-alpha RGBA8 used for plotted curves.
pub const BLUE: [u8; 4] = [88, 196, 221, 255];

/// Draw style of an element.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    /// Straight-alpha RGBA8 color.
    pub color: [u8; 4],
    /// Stroke width in scene units for stroked payloads (curves, braces, axes).
    pub stroke_width: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: WHITE,
            stroke_width: 0.04,
        }
    }
}

/// A node of the scene graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneElement {
    pub id: ElementId,
    pub payload: Payload,
    pub transform: Transform2D,
    pub style: Style,
    /// Visibility scalar in `[0, 1]`.
    pub opacity: f64,
    /// Fraction of the payload drawn, in `[0, 1]` (write/draw-in effects).
    pub reveal: f64,
    /// Most recent layout group this element was placed in. Layout only; the group does not
    /// own the element.
    pub parent: Option<GroupId>,
    /// Reactive values this element is currently subscribed to.
    pub bindings: SmallVec<[ValueId; 2]>,
}

impl SceneElement {
    pub fn new(id: ElementId, payload: Payload) -> Self {
        Self {
            id,
            payload,
            transform: Transform2D::default(),
            style: Style::default(),
            opacity: 1.0,
            reveal: 1.0,
            parent: None,
            bindings: SmallVec::new(),
        }
    }

    /// Current bounding box in scene units.
    pub fn bounds(&self) -> Rect {
        let ext = self.payload.extent() * self.transform.scale;
        Rect::from_center_size(self.transform.position, (ext.x, ext.y))
    }
}
