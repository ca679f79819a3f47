use super::*;
use crate::foundation::core::Point;
use crate::scene::element::SceneElement;
use crate::scene::payload::Payload;

#[test]
fn set_marks_dependents_dirty_without_recomputing() {
    let mut store = ValueStore::new();
    store.insert(ValueId(0), ValueSource::Scalar, 2.2);
    store.add_dependent(ValueId(0), ElementId(7)).unwrap();
    store.take_dirty();

    store.set(ValueId(0), 3.0).unwrap();
    assert_eq!(store.get(ValueId(0)).unwrap(), 3.0);
    assert!(store.is_dirty(ElementId(7)));
}

#[test]
fn set_rejects_non_finite_and_unknown_values() {
    let mut store = ValueStore::new();
    store.insert(ValueId(0), ValueSource::Scalar, 0.0);
    assert!(matches!(
        store.set(ValueId(0), f64::INFINITY),
        Err(KinetexError::Validation(_))
    ));
    assert!(matches!(
        store.set(ValueId(1), 1.0),
        Err(KinetexError::SceneReference(_))
    ));
    assert_eq!(store.get(ValueId(0)).unwrap(), 0.0);
}

#[test]
fn tracking_values_are_read_only() {
    let mut store = ValueStore::new();
    store.insert(
        ValueId(0),
        ValueSource::Tracking {
            element: ElementId(1),
            axis: Axis::X,
        },
        0.0,
    );
    assert!(matches!(
        store.set(ValueId(0), 1.0),
        Err(KinetexError::Validation(_))
    ));
}

#[test]
fn refresh_tracking_follows_element_position() {
    let mut graph = SceneGraph::new();
    let mut el = SceneElement::new(ElementId(1), Payload::Marker { radius: 0.1 });
    el.transform.position = Point::new(1.5, -2.0);
    graph.insert(el).unwrap();

    let mut store = ValueStore::new();
    store.insert(
        ValueId(0),
        ValueSource::Tracking {
            element: ElementId(1),
            axis: Axis::Y,
        },
        0.0,
    );
    store.add_dependent(ValueId(0), ElementId(2)).unwrap();
    store.take_dirty();

    store.refresh_tracking(&graph);
    assert_eq!(store.get(ValueId(0)).unwrap(), -2.0);
    assert!(store.is_dirty(ElementId(2)));

    store.take_dirty();
    store.refresh_tracking(&graph);
    assert!(!store.has_dirty());
}

#[test]
fn release_returns_dependents_and_forgets_value() {
    let mut store = ValueStore::new();
    store.insert(ValueId(3), ValueSource::Scalar, 1.0);
    store.add_dependent(ValueId(3), ElementId(1)).unwrap();
    store.add_dependent(ValueId(3), ElementId(1)).unwrap();
    let deps = store.release(ValueId(3)).unwrap();
    assert_eq!(deps.as_slice(), &[ElementId(1)]);
    assert!(!store.contains(ValueId(3)));
    assert!(store.release(ValueId(3)).is_err());
}
