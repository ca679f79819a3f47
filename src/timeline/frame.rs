use std::collections::{BTreeMap, BTreeSet};

use crate::animation::lerp::Lerp;
use crate::foundation::core::{Rect, Transform2D};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::ElementId;
use crate::foundation::math::fingerprint_bytes;
use crate::scene::element::SceneElement;
use crate::scene::graph::SceneGraph;
use crate::scene::payload::{FragmentKey, Payload};

/// Identity of a node in a frame snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum NodeKey {
    /// A scene element.
    Element(ElementId),
    /// A transient fragment of a morph, owned by the morph's target element.
    Fragment { owner: ElementId, key: FragmentKey },
}

/// Partial outline drawn around `bounds`; `tail..head` are fractions of the perimeter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Outline {
    pub bounds: Rect,
    pub color: [u8; 4],
    pub head: f64,
    pub tail: f64,
}

/// Fully resolved visual state of one node.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VisualNode {
    pub key: NodeKey,
    pub payload: Payload,
    pub transform: Transform2D,
    pub opacity: f64,
    pub reveal: f64,
    pub color: [u8; 4],
    pub stroke_width: f64,
    pub outline: Option<Outline>,
}

impl VisualNode {
    pub(crate) fn of_element(el: &SceneElement) -> Self {
        Self {
            key: NodeKey::Element(el.id),
            payload: el.payload.clone(),
            transform: el.transform,
            opacity: el.opacity,
            reveal: el.reveal,
            color: el.style.color,
            stroke_width: el.style.stroke_width,
            outline: None,
        }
    }

    /// Bounds of the node in scene units.
    pub fn bounds(&self) -> Rect {
        let ext = self.payload.extent() * self.transform.scale;
        Rect::from_center_size(self.transform.position, (ext.x, ext.y))
    }
}

/// Deterministic snapshot of every visible node at a timeline time, in paint order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameState {
    pub time: f64,
    pub nodes: Vec<VisualNode>,
}

impl FrameState {
    /// Node of a scene element, if it is visible.
    pub fn element(&self, id: ElementId) -> Option<&VisualNode> {
        self.nodes
            .iter()
            .find(|n| matches!(n.key, NodeKey::Element(e) if e == id))
    }

    pub fn is_visible(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn to_json_bytes(&self) -> KinetexResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| KinetexError::evaluation(format!("snapshot serialization failed: {e}")))
    }

    /// Fingerprint of the visual content (time excluded), used for static frame elision.
    pub fn fingerprint(&self) -> KinetexResult<u64> {
        let bytes = serde_json::to_vec(&self.nodes)
            .map_err(|e| KinetexError::evaluation(format!("snapshot serialization failed: {e}")))?;
        Ok(fingerprint_bytes(&bytes))
    }

    pub(crate) fn capture(time: f64, graph: &SceneGraph, overlays: &Overlays) -> Self {
        let mut nodes = Vec::with_capacity(graph.len() + overlays.ghosts.len());
        for el in graph.iter() {
            if overlays.hidden.contains(&el.id) {
                continue;
            }
            let mut node = VisualNode::of_element(el);
            if let Some(accent) = overlays.accents.get(&el.id) {
                node.transform.scale *= accent.scale;
                if let Some((tint, amount)) = accent.tint {
                    node.color = <[u8; 4] as Lerp>::lerp(&node.color, &tint, amount);
                }
                node.outline = accent.outline;
            }
            if node.opacity > 0.0 {
                nodes.push(node);
            }
        }
        nodes.extend(overlays.ghosts.iter().filter(|g| g.opacity > 0.0).cloned());
        Self { time, nodes }
    }
}

/// Transient emphasis on an element for one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Accent {
    pub(crate) scale: f64,
    pub(crate) tint: Option<([u8; 4], f64)>,
    pub(crate) outline: Option<Outline>,
}

impl Default for Accent {
    fn default() -> Self {
        Self {
            scale: 1.0,
            tint: None,
            outline: None,
        }
    }
}

/// Sample-local visuals that are not part of the scene state.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overlays {
    pub(crate) ghosts: Vec<VisualNode>,
    pub(crate) accents: BTreeMap<ElementId, Accent>,
    pub(crate) hidden: BTreeSet<ElementId>,
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/frame.rs"]
mod tests;
