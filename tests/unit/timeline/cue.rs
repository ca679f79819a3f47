use super::*;
use crate::timeline::step::AnimationStep;

#[test]
fn batch_rejects_empty_and_duplicate_targets() {
    assert!(matches!(Batch::new(vec![]), Err(KinetexError::Validation(_))));
    let err = Batch::new(vec![
        AnimationStep::write(ElementId(0)),
        AnimationStep::circumscribe(ElementId(0)),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("step 1"), "{err}");
}

#[test]
fn batch_reports_failing_step_index() {
    let err = Batch::new(vec![
        AnimationStep::write(ElementId(0)),
        AnimationStep::write(ElementId(1)).duration(-2.0),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("step 1"), "{err}");
}

#[test]
fn batch_lasts_as_long_as_its_longest_step() {
    let b = Batch::new(vec![
        AnimationStep::write(ElementId(0)).duration(0.5),
        AnimationStep::write(ElementId(1)).duration(2.0),
        AnimationStep::write(ElementId(2)).duration(0.0),
    ])
    .unwrap();
    assert_eq!(b.duration(), 2.0);
}

#[test]
fn timeline_lays_cues_end_to_end() {
    let mut t = Timeline::new();
    t.push(Cue::Play(
        Batch::new(vec![AnimationStep::write(ElementId(0))]).unwrap(),
    ));
    t.push(Cue::Wait(0.5));
    t.push(Cue::Unbind(ElementId(0)));
    t.push(Cue::Play(
        Batch::new(vec![AnimationStep::write(ElementId(1)).duration(2.0)]).unwrap(),
    ));
    assert_eq!(t.duration(), 3.5);
    assert_eq!(t.start_of(1), Some(1.0));
    assert_eq!(t.end_of(2), Some(1.5));
    assert_eq!(t.start_of(3), Some(1.5));
    assert_eq!(t.start_of(4), None);

    assert_eq!(t.entered_at(0.0), 1);
    assert_eq!(t.entered_at(1.2), 2);
    assert_eq!(t.entered_at(1.5), 4);
    assert_eq!(t.entered_at(10.0), 4);
}

#[test]
fn next_cue_is_not_entered_before_the_previous_one_ends() {
    let mut t = Timeline::new();
    t.push(Cue::Wait(1.0));
    t.push(Cue::Wait(1.0));
    assert_eq!(t.entered_at(1.0 - 5e-10), 1);
    assert_eq!(t.entered_at(1.0), 2);
}

#[test]
fn summary_lists_every_cue() {
    let mut t = Timeline::new();
    t.push(Cue::Wait(1.0));
    t.push(Cue::Release(vec![ValueId(0), ValueId(1)]));
    let rows = t.summary();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "wait 1s");
    assert_eq!(rows[1].label, "release 2 value(s)");
    assert_eq!(rows[1].start, 1.0);
    assert_eq!(rows[1].end, 1.0);
}

#[test]
fn instantaneous_cue_failures_are_tagged() {
    let err = Cue::Unbind(ElementId(3))
        .sample(
            5,
            &SceneState::default(),
            &SceneGraph::new(),
            0.0,
            &mut Overlays::default(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        KinetexError::Aborted {
            cue: 5,
            step: None,
            ..
        }
    ));
    assert!(matches!(err.root(), KinetexError::Validation(_)));
}

#[test]
fn play_failures_carry_step_index() {
    let b = Batch::new(vec![
        AnimationStep::create(ElementId(0)).duration(0.0),
        AnimationStep::fade_out(ElementId(9)),
    ])
    .unwrap();
    let mut catalog = SceneGraph::new();
    catalog
        .insert(crate::scene::element::SceneElement::new(
            ElementId(0),
            crate::scene::payload::Payload::Marker { radius: 0.1 },
        ))
        .unwrap();
    let err = b
        .sample(2, &SceneState::default(), &catalog, 0.5, &mut Overlays::default())
        .unwrap_err();
    assert!(matches!(
        err,
        KinetexError::Aborted {
            cue: 2,
            step: Some(1),
            ..
        }
    ));
    assert!(matches!(err.root(), KinetexError::SceneReference(_)));
}
