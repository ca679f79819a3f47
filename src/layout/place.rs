//! Relative placement operators.
//!
//! All operators are pure with respect to their anchors: only the moved target's transforms
//! change. Directions are normalized; components of `aligned_edge` parallel to the direction
//! are ignored.

use crate::foundation::core::{Point, Rect, Vec2, frame_rect};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::GroupId;
use crate::foundation::math::EPSILON;
use crate::scene::graph::{SceneGraph, StackLayout, Target};

/// Point of `bounds` picked per axis by the sign of `dir`: max for positive, min for
/// negative, centre for zero.
pub fn critical_point(bounds: Rect, dir: Vec2) -> Point {
    let pick = |v: f64, lo: f64, hi: f64| {
        if v > EPSILON {
            hi
        } else if v < -EPSILON {
            lo
        } else {
            (lo + hi) * 0.5
        }
    };
    Point::new(
        pick(dir.x, bounds.x0, bounds.x1),
        pick(dir.y, bounds.y0, bounds.y1),
    )
}

fn unit_direction(direction: Vec2) -> KinetexResult<Vec2> {
    let len = direction.hypot();
    if !len.is_finite() || len <= EPSILON {
        return Err(KinetexError::layout(
            "placement direction must be a non-zero, finite vector",
        ));
    }
    Ok(direction / len)
}

fn check_buffer(buffer: f64) -> KinetexResult<()> {
    if !buffer.is_finite() || buffer < 0.0 {
        return Err(KinetexError::layout(format!(
            "placement buffer must be finite and >= 0 (got {buffer})"
        )));
    }
    Ok(())
}

/// Translation that puts a box with `bounds` next to `anchor`.
///
/// The nearest edges end up exactly `buffer` apart along `direction`, and the boxes share
/// `aligned_edge` (or centres, for a zero edge) on the perpendicular axis.
pub fn next_to_offset(
    bounds: Rect,
    anchor: Rect,
    direction: Vec2,
    aligned_edge: Vec2,
    buffer: f64,
) -> KinetexResult<Vec2> {
    let d = unit_direction(direction)?;
    check_buffer(buffer)?;
    let edge = aligned_edge - d * aligned_edge.dot(d);
    let target = critical_point(anchor, d + edge);
    let own = critical_point(bounds, -d + edge);
    Ok(target - own + d * buffer)
}

/// Move `target` so it sits next to `anchor` (see [`next_to_offset`]).
pub fn place_next_to(
    graph: &mut SceneGraph,
    target: impl Into<Target>,
    anchor: impl Into<Target>,
    direction: Vec2,
    aligned_edge: Vec2,
    buffer: f64,
) -> KinetexResult<()> {
    let target = target.into();
    let anchor = anchor.into();
    if target == anchor {
        return Err(KinetexError::layout(
            "cannot place a target next to itself",
        ));
    }
    let delta = next_to_offset(
        graph.target_bounds(target)?,
        graph.target_bounds(anchor)?,
        direction,
        aligned_edge,
        buffer,
    )?;
    graph.shift(target, delta)
}

/// Stack every member of `group` along `direction` in declaration order.
///
/// The first member stays put; each following member is placed next to its predecessor with
/// exactly `buffer` between them and aligned on `aligned_edge`. The rule is recorded on the
/// group.
pub fn arrange(
    graph: &mut SceneGraph,
    group: GroupId,
    direction: Vec2,
    aligned_edge: Vec2,
    buffer: f64,
) -> KinetexResult<()> {
    unit_direction(direction)?;
    check_buffer(buffer)?;
    let members = graph.group(group)?.members.clone();
    for pair in members.windows(2) {
        place_next_to(graph, pair[1], pair[0], direction, aligned_edge, buffer)?;
    }
    graph.group_mut(group)?.layout = Some(StackLayout {
        direction,
        aligned_edge,
        buffer,
    });
    Ok(())
}

/// Move `target` along the axes of `edge` so its `edge` coordinate matches the anchor's.
pub fn align_to(
    graph: &mut SceneGraph,
    target: impl Into<Target>,
    anchor: impl Into<Target>,
    edge: Vec2,
) -> KinetexResult<()> {
    let target = target.into();
    let anchor = anchor.into();
    unit_direction(edge)?;
    let own = critical_point(graph.target_bounds(target)?, edge);
    let goal = critical_point(graph.target_bounds(anchor)?, edge);
    let mut delta = goal - own;
    if edge.x.abs() <= EPSILON {
        delta.x = 0.0;
    }
    if edge.y.abs() <= EPSILON {
        delta.y = 0.0;
    }
    graph.shift(target, delta)
}

/// Move `target` so its edge in `direction` sits `buffer` inside the frame edge.
pub fn to_edge(
    graph: &mut SceneGraph,
    target: impl Into<Target>,
    direction: Vec2,
    buffer: f64,
) -> KinetexResult<()> {
    let target = target.into();
    let d = unit_direction(direction)?;
    check_buffer(buffer)?;
    let own = critical_point(graph.target_bounds(target)?, d);
    let frame = critical_point(frame_rect(), d);
    let mut delta = frame - own - d * buffer;
    if d.x.abs() <= EPSILON {
        delta.x = 0.0;
    }
    if d.y.abs() <= EPSILON {
        delta.y = 0.0;
    }
    graph.shift(target, delta)
}

/// Move `target` so its bounding-box centre is at `point`.
pub fn move_to(graph: &mut SceneGraph, target: impl Into<Target>, point: Point) -> KinetexResult<()> {
    let target = target.into();
    let centre = graph.target_bounds(target)?.center();
    graph.shift(target, point - centre)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/place.rs"]
mod tests;
