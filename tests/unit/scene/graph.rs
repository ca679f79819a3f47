use super::*;
use crate::scene::payload::AxesPayload;

fn marker(id: u32, x: f64, y: f64) -> SceneElement {
    let mut el = SceneElement::new(ElementId(id), Payload::Marker { radius: 0.5 });
    el.transform.position = Point::new(x, y);
    el
}

#[test]
fn insert_keeps_paint_order_and_rejects_duplicates() {
    let mut g = SceneGraph::new();
    g.insert(marker(2, 0.0, 0.0)).unwrap();
    g.insert(marker(1, 0.0, 0.0)).unwrap();
    let order: Vec<_> = g.iter().map(|e| e.id).collect();
    assert_eq!(order, vec![ElementId(2), ElementId(1)]);
    assert!(matches!(
        g.insert(marker(1, 0.0, 0.0)),
        Err(KinetexError::Validation(_))
    ));
}

#[test]
fn missing_elements_are_scene_reference_errors() {
    let mut g = SceneGraph::new();
    assert!(matches!(
        g.get(ElementId(9)),
        Err(KinetexError::SceneReference(_))
    ));
    assert!(matches!(
        g.remove(ElementId(9)),
        Err(KinetexError::SceneReference(_))
    ));
}

#[test]
fn group_bounds_union_present_members_only() {
    let mut g = SceneGraph::new();
    g.insert(marker(0, 0.0, 0.0)).unwrap();
    g.insert(marker(1, 4.0, 0.0)).unwrap();
    g.insert_group(Group {
        id: GroupId(0),
        members: vec![ElementId(0), ElementId(1), ElementId(5)],
        layout: None,
    });
    let b = g.group_bounds(GroupId(0)).unwrap();
    assert_eq!(b, Rect::new(-0.5, -0.5, 4.5, 0.5));

    g.remove(ElementId(1)).unwrap();
    assert_eq!(
        g.group_bounds(GroupId(0)).unwrap(),
        Rect::new(-0.5, -0.5, 0.5, 0.5)
    );
    g.remove(ElementId(0)).unwrap();
    assert!(g.group_bounds(GroupId(0)).is_err());
}

#[test]
fn shift_moves_every_member() {
    let mut g = SceneGraph::new();
    g.insert(marker(0, 0.0, 0.0)).unwrap();
    g.insert(marker(1, 1.0, 1.0)).unwrap();
    g.insert_group(Group {
        id: GroupId(3),
        members: vec![ElementId(0), ElementId(1)],
        layout: None,
    });
    g.shift(Target::Group(GroupId(3)), Vec2::new(1.0, -1.0))
        .unwrap();
    assert_eq!(
        g.get(ElementId(1)).unwrap().transform.position,
        Point::new(2.0, 0.0)
    );
}

#[test]
fn coords_to_point_uses_axes_placement() {
    let mut g = SceneGraph::new();
    let mut axes = SceneElement::new(
        ElementId(0),
        Payload::Axes(AxesPayload {
            x_range: [0.0, 10.0],
            y_range: [0.0, 10.0],
            x_step: 1.0,
            y_step: 1.0,
            x_length: 4.0,
            y_length: 4.0,
        }),
    );
    axes.transform.position = Point::new(1.0, -1.0);
    g.insert(axes).unwrap();
    g.insert(marker(1, 0.0, 0.0)).unwrap();

    let p = g.coords_to_point(ElementId(0), 10.0, 0.0).unwrap();
    assert_eq!(p, Point::new(3.0, -3.0));
    assert!(matches!(
        g.coords_to_point(ElementId(1), 0.0, 0.0),
        Err(KinetexError::Validation(_))
    ));
}
