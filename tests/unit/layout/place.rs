use super::*;
use crate::foundation::core::{DOWN, LEFT, ORIGIN, RIGHT, UP};
use crate::foundation::error::KinetexError;
use crate::foundation::ids::ElementId;
use crate::scene::element::SceneElement;
use crate::scene::graph::Group;
use crate::scene::payload::{BracePayload, Payload};

/// Downward brace: `span` wide and `BRACE_DEPTH` tall.
fn brace(g: &mut SceneGraph, id: u32, centre: Point, span: f64) -> ElementId {
    let mut el = SceneElement::new(
        ElementId(id),
        Payload::Brace(BracePayload {
            direction: DOWN,
            span,
        }),
    );
    el.transform.position = centre;
    g.insert(el).unwrap();
    ElementId(id)
}

fn marker(g: &mut SceneGraph, id: u32, centre: Point, radius: f64) -> ElementId {
    let mut el = SceneElement::new(ElementId(id), Payload::Marker { radius });
    el.transform.position = centre;
    g.insert(el).unwrap();
    ElementId(id)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn critical_point_picks_edges_by_sign() {
    let r = Rect::new(-1.0, -2.0, 3.0, 4.0);
    assert_eq!(critical_point(r, RIGHT), Point::new(3.0, 1.0));
    assert_eq!(critical_point(r, DOWN + LEFT), Point::new(-1.0, -2.0));
    assert_eq!(critical_point(r, ORIGIN), r.center());
}

#[test]
fn next_to_leaves_exact_gap_and_aligns_edge() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(0.0, 0.0), 1.0);
    let b = marker(&mut g, 1, Point::new(5.0, 5.0), 0.5);
    place_next_to(&mut g, b, a, DOWN, LEFT, 0.25).unwrap();
    let ba = g.bounds(a).unwrap();
    let bb = g.bounds(b).unwrap();
    assert!(close(ba.y0 - bb.y1, 0.25));
    assert!(close(ba.x0, bb.x0));
}

#[test]
fn next_to_centres_on_zero_edge() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(1.0, 2.0), 1.0);
    let b = marker(&mut g, 1, Point::new(-3.0, 0.0), 0.2);
    place_next_to(&mut g, b, a, RIGHT, ORIGIN, 0.5).unwrap();
    let bb = g.bounds(b).unwrap();
    assert!(close(bb.x0, 2.0 + 0.5));
    assert!(close(bb.center().y, 2.0));
    assert_eq!(g.bounds(a).unwrap().center(), Point::new(1.0, 2.0));
}

#[test]
fn next_to_ignores_edge_component_parallel_to_direction() {
    let a = Rect::new(0.0, 0.0, 2.0, 2.0);
    let b = Rect::new(10.0, 10.0, 11.0, 11.0);
    let plain = next_to_offset(b, a, DOWN, LEFT, 0.3).unwrap();
    let noisy = next_to_offset(b, a, DOWN, LEFT + DOWN, 0.3).unwrap();
    assert!(close(plain.x, noisy.x));
    assert!(close(plain.y, noisy.y));
}

#[test]
fn invalid_requests_are_layout_errors() {
    let a = Rect::new(0.0, 0.0, 1.0, 1.0);
    assert!(matches!(
        next_to_offset(a, a, ORIGIN, ORIGIN, 0.1),
        Err(KinetexError::Layout(_))
    ));
    assert!(matches!(
        next_to_offset(a, a, UP, ORIGIN, -0.1),
        Err(KinetexError::Layout(_))
    ));
    let mut g = SceneGraph::new();
    let m = marker(&mut g, 0, Point::ORIGIN, 1.0);
    assert!(matches!(
        place_next_to(&mut g, m, m, UP, ORIGIN, 0.1),
        Err(KinetexError::Layout(_))
    ));
}

#[test]
fn arrange_stacks_members_with_uniform_gaps() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(0.0, 2.0), 0.3);
    let b = marker(&mut g, 1, Point::new(4.0, -1.0), 0.5);
    let c = brace(&mut g, 2, Point::new(-2.0, 3.0), 2.0);
    g.insert_group(Group {
        id: GroupId(0),
        members: vec![a, b, c],
        layout: None,
    });
    arrange(&mut g, GroupId(0), DOWN, LEFT, 0.4).unwrap();

    let ra = g.bounds(a).unwrap();
    let rb = g.bounds(b).unwrap();
    let rc = g.bounds(c).unwrap();
    assert_eq!(ra.center(), Point::new(0.0, 2.0));
    assert!(close(ra.y0 - rb.y1, 0.4));
    assert!(close(rb.y0 - rc.y1, 0.4));
    assert!(close(ra.x0, rb.x0));
    assert!(close(rb.x0, rc.x0));
    assert!(g.group(GroupId(0)).unwrap().layout.is_some());
}

#[test]
fn align_to_moves_only_along_edge_axis() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(-3.0, 0.0), 1.0);
    let b = marker(&mut g, 1, Point::new(2.0, 5.0), 0.5);
    align_to(&mut g, b, a, LEFT).unwrap();
    let rb = g.bounds(b).unwrap();
    assert!(close(rb.x0, -4.0));
    assert!(close(rb.center().y, 5.0));
}

#[test]
fn to_edge_respects_frame_and_buffer() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(1.0, 0.0), 0.5);
    to_edge(&mut g, a, UP, 0.5).unwrap();
    let r = g.bounds(a).unwrap();
    assert!(close(r.y1, 4.0 - 0.5));
    assert!(close(r.center().x, 1.0));
}

#[test]
fn move_to_centres_target() {
    let mut g = SceneGraph::new();
    let a = marker(&mut g, 0, Point::new(1.0, 1.0), 0.5);
    move_to(&mut g, a, Point::new(-2.0, 3.0)).unwrap();
    assert_eq!(g.bounds(a).unwrap().center(), Point::new(-2.0, 3.0));
}
