use super::*;
use crate::foundation::core::Point;
use crate::scene::element::YELLOW;

fn graph_with_markers() -> SceneGraph {
    let mut g = SceneGraph::new();
    for (i, x) in [(0u32, -1.0), (1, 1.0)] {
        let mut el = SceneElement::new(ElementId(i), Payload::Marker { radius: 0.2 });
        el.transform.position = Point::new(x, 0.0);
        g.insert(el).unwrap();
    }
    g
}

#[test]
fn capture_keeps_paint_order_and_skips_invisible() {
    let mut g = graph_with_markers();
    g.get_mut(ElementId(1)).unwrap().opacity = 0.0;
    let f = FrameState::capture(0.5, &g, &Overlays::default());
    assert_eq!(f.nodes.len(), 1);
    assert!(f.is_visible(ElementId(0)));
    assert!(!f.is_visible(ElementId(1)));
}

#[test]
fn hidden_elements_are_left_out() {
    let g = graph_with_markers();
    let mut o = Overlays::default();
    o.hidden.insert(ElementId(0));
    let f = FrameState::capture(0.0, &g, &o);
    assert_eq!(f.nodes.len(), 1);
    assert_eq!(f.nodes[0].key, NodeKey::Element(ElementId(1)));
}

#[test]
fn accents_scale_and_tint_without_touching_the_graph() {
    let g = graph_with_markers();
    let mut o = Overlays::default();
    o.accents.insert(
        ElementId(0),
        Accent {
            scale: 2.0,
            tint: Some((YELLOW, 1.0)),
            outline: None,
        },
    );
    let f = FrameState::capture(0.0, &g, &o);
    let n = f.element(ElementId(0)).unwrap();
    assert_eq!(n.transform.scale, 2.0);
    assert_eq!(n.color, YELLOW);
    assert_eq!(g.get(ElementId(0)).unwrap().transform.scale, 1.0);
}

#[test]
fn ghosts_are_painted_last() {
    let g = graph_with_markers();
    let el = g.get(ElementId(0)).unwrap();
    let mut ghost = VisualNode::of_element(el);
    ghost.key = NodeKey::Fragment {
        owner: ElementId(1),
        key: FragmentKey("x#0".into()),
    };
    let o = Overlays {
        ghosts: vec![ghost],
        ..Overlays::default()
    };
    let f = FrameState::capture(0.0, &g, &o);
    assert_eq!(f.nodes.len(), 3);
    assert!(matches!(f.nodes[2].key, NodeKey::Fragment { .. }));
}

#[test]
fn fingerprint_ignores_time_but_not_content() {
    let g = graph_with_markers();
    let a = FrameState::capture(0.0, &g, &Overlays::default());
    let b = FrameState::capture(1.0, &g, &Overlays::default());
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    assert_ne!(a.to_json_bytes().unwrap(), b.to_json_bytes().unwrap());

    let mut moved = g.clone();
    moved.get_mut(ElementId(1)).unwrap().transform.position.y = 0.5;
    let c = FrameState::capture(0.0, &moved, &Overlays::default());
    assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
}

#[test]
fn node_bounds_follow_scale() {
    let g = graph_with_markers();
    let mut n = VisualNode::of_element(g.get(ElementId(1)).unwrap());
    n.transform.scale = 2.0;
    let b: Rect = n.bounds();
    assert!((b.width() - 0.8).abs() < 1e-12);
    assert_eq!(b.center(), Point::new(1.0, 0.0));
}
