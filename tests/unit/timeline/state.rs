use super::*;
use crate::foundation::core::Vec2;
use crate::scene::payload::Payload;
use crate::typeset::{TokenTypesetter, Typesetter};

fn catalog() -> SceneGraph {
    let mut g = SceneGraph::new();
    g.insert(SceneElement::new(ElementId(0), Payload::Marker { radius: 0.2 }))
        .unwrap();
    let f = |src: &str| TokenTypesetter.layout_formula(src, 48.0).unwrap();
    g.insert(SceneElement::new(ElementId(1), f("x y = k"))).unwrap();
    g.insert(SceneElement::new(ElementId(2), f(r"x \cdot y = k")))
        .unwrap();
    g.insert(SceneElement::new(ElementId(3), f("p_a"))).unwrap();
    g
}

fn sample(step: &AnimationStep, start: &SceneState, p: f64) -> KinetexResult<(SceneState, Overlays)> {
    let mut state = start.clone();
    let mut overlays = Overlays::default();
    apply_step(step, start, &mut state, &catalog(), p, &mut overlays)?;
    Ok((state, overlays))
}

fn with(ids: &[u32]) -> SceneState {
    let cat = catalog();
    let mut s = SceneState::default();
    for id in ids {
        s.insert_from_catalog(&cat, ElementId(*id)).unwrap();
    }
    s
}

#[test]
fn progress_handles_zero_duration() {
    let s = AnimationStep::create(ElementId(0)).duration(0.0);
    assert_eq!(progress(&s, 0.0), 1.0);
    let s = s.duration(2.0);
    assert_eq!(progress(&s, 1.0), 0.5);
    assert_eq!(progress(&s, 5.0), 1.0);
}

#[test]
fn write_reveals_progressively() {
    let step = AnimationStep::write(ElementId(1)).ease(crate::animation::ease::Ease::Linear);
    let (mid, _) = sample(&step, &SceneState::default(), 0.5).unwrap();
    assert_eq!(mid.graph.get(ElementId(1)).unwrap().reveal, 0.5);
    let (end, _) = sample(&step, &SceneState::default(), 1.0).unwrap();
    assert_eq!(end.graph.get(ElementId(1)).unwrap().reveal, 1.0);
}

#[test]
fn creating_twice_or_undeclared_fails() {
    let start = with(&[0]);
    assert!(matches!(
        sample(&AnimationStep::create(ElementId(0)), &start, 1.0),
        Err(KinetexError::Validation(_))
    ));
    assert!(matches!(
        sample(&AnimationStep::create(ElementId(42)), &start, 1.0),
        Err(KinetexError::SceneReference(_))
    ));
}

#[test]
fn fade_out_destroys_at_completion() {
    let start = with(&[0]);
    let step = AnimationStep::fade_out(ElementId(0));
    let (mid, _) = sample(&step, &start, 0.5).unwrap();
    let o = mid.graph.get(ElementId(0)).unwrap().opacity;
    assert!(o > 0.0 && o < 1.0);

    let (end, _) = sample(&step, &start, 1.0).unwrap();
    assert!(!end.graph.contains(ElementId(0)));
    assert!(matches!(
        end.require_live(ElementId(0)),
        Err(KinetexError::SceneReference(_))
    ));
    assert!(matches!(
        sample(&AnimationStep::create(ElementId(0)), &end, 1.0),
        Err(KinetexError::SceneReference(_))
    ));
}

#[test]
fn transform_reads_from_batch_start() {
    let start = with(&[0]);
    let to = Transform2D::at(Point::new(2.0, 0.0));
    let step = AnimationStep::transform_to(ElementId(0), to).ease(crate::animation::ease::Ease::Linear);

    let mut state = start.clone();
    state.graph.get_mut(ElementId(0)).unwrap().transform.position = Point::new(100.0, 0.0);
    let mut overlays = Overlays::default();
    apply_step(&step, &start, &mut state, &catalog(), 0.5, &mut overlays).unwrap();
    assert_eq!(
        state.graph.get(ElementId(0)).unwrap().transform.position,
        Point::new(1.0, 0.0)
    );
}

#[test]
fn fade_in_shift_travels_to_rest_position() {
    let step = AnimationStep::fade_in_shifted(ElementId(0), Vec2::new(0.0, -1.0))
        .ease(crate::animation::ease::Ease::Linear);
    let (mid, _) = sample(&step, &SceneState::default(), 0.5).unwrap();
    let el = mid.graph.get(ElementId(0)).unwrap();
    assert_eq!(el.opacity, 0.5);
    assert_eq!(el.transform.position, Point::new(0.0, 0.5));
}

#[test]
fn indicate_is_transient() {
    let start = with(&[1]);
    let step = AnimationStep::circumscribe(ElementId(1));
    let (mid, overlays) = sample(&step, &start, 0.5).unwrap();
    assert!(overlays.accents[&ElementId(1)].outline.is_some());
    assert_eq!(mid.graph, start.graph);

    let (_, done) = sample(&step, &start, 1.0).unwrap();
    assert!(done.accents.is_empty());
}

#[test]
fn pulse_scales_only_the_accent() {
    let start = with(&[0]);
    let (state, overlays) = sample(&AnimationStep::pulse(ElementId(0)), &start, 0.5).unwrap();
    assert!((overlays.accents[&ElementId(0)].scale - 1.2).abs() < 1e-12);
    assert_eq!(state.graph.get(ElementId(0)).unwrap().transform.scale, 1.0);
}

#[test]
fn matching_moves_shared_fragments_and_hides_source() {
    let start = with(&[1]);
    let step = AnimationStep::transform_matching(ElementId(1), ElementId(2));
    let (state, overlays) = sample(&step, &start, 0.5).unwrap();
    assert!(overlays.hidden.contains(&ElementId(1)));
    assert!(!state.graph.contains(ElementId(2)));
    let keys: Vec<&str> = overlays
        .ghosts
        .iter()
        .filter_map(|n| match &n.key {
            NodeKey::Fragment { key, .. } => Some(key.0.as_str()),
            NodeKey::Element(_) => None,
        })
        .collect();
    for k in ["x#0", "y#0", "=#0", "k#0", r"\cdot#0"] {
        assert!(keys.contains(&k), "missing {k} in {keys:?}");
    }

    let (done, overlays) = sample(&step, &start, 1.0).unwrap();
    assert!(done.graph.contains(ElementId(2)));
    assert!(!done.graph.contains(ElementId(1)));
    assert!(overlays.ghosts.is_empty());
}

#[test]
fn retained_source_survives_the_morph() {
    let start = with(&[1]);
    let step = AnimationStep::transform_matching(ElementId(1), ElementId(2)).retain_source();
    let (mid, overlays) = sample(&step, &start, 0.5).unwrap();
    assert!(!overlays.hidden.contains(&ElementId(1)));
    assert!(mid.graph.contains(ElementId(1)));
    let (done, _) = sample(&step, &start, 1.0).unwrap();
    assert!(done.graph.contains(ElementId(1)));
    assert!(done.graph.contains(ElementId(2)));
}

#[test]
fn matching_without_substructure_is_incompatible() {
    let start = with(&[0]);
    let step = AnimationStep::transform_matching(ElementId(0), ElementId(2));
    assert!(matches!(
        sample(&step, &start, 0.5),
        Err(KinetexError::IncompatibleTransform(_))
    ));
}

#[test]
fn disjoint_match_needs_fallback() {
    let start = with(&[1]);
    let strict = AnimationStep::transform_matching(ElementId(1), ElementId(3))
        .fallback(MatchFallback::None);
    assert!(matches!(
        sample(&strict, &start, 0.5),
        Err(KinetexError::IncompatibleTransform(_))
    ));
    let faded = AnimationStep::transform_matching(ElementId(1), ElementId(3));
    let (_, overlays) = sample(&faded, &start, 0.5).unwrap();
    assert!(!overlays.ghosts.is_empty());
}

#[test]
fn destroy_drops_binding_and_marks_id() {
    let mut s = with(&[0]);
    s.destroy(ElementId(0)).unwrap();
    assert!(s.destroyed.contains(&ElementId(0)));
    assert!(s.destroy(ElementId(0)).is_err());
    assert!(matches!(
        s.unbind(ElementId(0)),
        Err(KinetexError::SceneReference(_))
    ));
}

#[test]
fn unbinding_a_live_unbound_element_is_a_validation_error() {
    let mut s = with(&[0]);
    assert!(matches!(s.unbind(ElementId(0)), Err(KinetexError::Validation(_))));
}
