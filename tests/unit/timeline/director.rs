use super::*;
use crate::animation::ease::Ease;
use crate::foundation::core::{Point, Transform2D};
use crate::foundation::ids::ElementId;
use crate::reactive::binding::Derived;
use crate::timeline::step::AnimationStep;

/// create(a) instantly, wait 1s, write(b) over 2s.
fn small_script() -> SceneScript {
    let mut s = SceneScript::new();
    let a = s.marker(0.2).unwrap();
    let b = s.text("hello", 40.0).unwrap();
    s.play([AnimationStep::create(a).duration(0.0)]).unwrap();
    s.wait(1.0).unwrap();
    s.play([AnimationStep::write(b).duration(2.0)]).unwrap();
    s
}

#[test]
fn director_walks_through_states() {
    let mut d = Director::new(small_script());
    assert_eq!(d.state(), DirectorState::Idle);
    d.start().unwrap();
    assert_eq!(d.state(), DirectorState::Running { cue: 0 });

    assert_eq!(
        d.advance_to(0.5).unwrap(),
        DirectorState::Paused {
            cue: 1,
            elapsed: 0.5
        }
    );
    assert_eq!(d.completed_cues(), 1);
    assert!(d.scene().graph.contains(ElementId(0)));

    assert_eq!(d.tick(1.0).unwrap(), DirectorState::Running { cue: 2 });
    assert!(!d.scene().graph.contains(ElementId(1)));

    assert_eq!(d.advance_to(3.0).unwrap(), DirectorState::Done);
    assert!(d.is_finished());
    assert_eq!(d.completed_cues(), 3);
    assert_eq!(d.scene().graph.get(ElementId(1)).unwrap().reveal, 1.0);
}

#[test]
fn clock_never_runs_backwards() {
    let mut d = Director::new(small_script());
    d.advance_to(2.0).unwrap();
    d.advance_to(1.0).unwrap();
    assert_eq!(d.time(), 2.0);
    assert!(d.advance_to(f64::NAN).is_err());
}

#[test]
fn render_frame_is_pure_and_repeatable() {
    let mut d = Director::new(small_script());
    d.advance_to(3.0).unwrap();
    let a = d.render_frame(1.7).to_json_bytes().unwrap();
    let _ = d.render_frame(0.2);
    let b = d.render_frame(1.7).to_json_bytes().unwrap();
    assert_eq!(a, b);

    let early = d.render_frame(0.5);
    assert!(early.is_visible(ElementId(0)));
    assert!(!early.is_visible(ElementId(1)));
    let mid = d.render_frame(2.0);
    let reveal = mid.element(ElementId(1)).unwrap().reveal;
    assert!(reveal > 0.0 && reveal < 1.0);
}

#[test]
fn render_frame_works_before_running() {
    let d = Director::new(small_script());
    let f = d.render_frame(2.0);
    assert!(f.is_visible(ElementId(0)));
    assert_eq!(d.state(), DirectorState::Idle);
}

#[test]
fn reference_after_fade_out_aborts_at_that_cue() {
    let mut s = SceneScript::new();
    let a = s.marker(0.2).unwrap();
    s.play([AnimationStep::create(a).duration(0.0)]).unwrap();
    s.play([AnimationStep::fade_out(a)]).unwrap();
    s.play([AnimationStep::transform_to(a, Transform2D::at(Point::new(1.0, 0.0)))])
        .unwrap();

    let mut d = Director::new(s);
    let err = d.advance_to(10.0).unwrap_err();
    assert!(matches!(err.root(), KinetexError::SceneReference(_)));
    assert_eq!(d.state(), DirectorState::Aborted { cue: 2 });
    assert!(d.failure().is_some());
    assert_eq!(d.completed_cues(), 2);
    assert!(!d.scene().graph.contains(a));
    assert!(d.render_frame(5.0).nodes.is_empty());
}

#[test]
fn abort_request_stops_at_next_boundary() {
    let mut d = Director::new(small_script());
    let handle = d.abort_handle();
    d.advance_to(0.5).unwrap();
    handle.abort();
    assert_eq!(
        d.advance_to(3.0).unwrap(),
        DirectorState::Aborted { cue: 2 }
    );
    assert_eq!(d.failure(), Some("abort requested"));
    assert!(!d.scene().graph.contains(ElementId(1)));
}

#[test]
fn driven_value_moves_bound_element_along_curve() {
    let mut s = SceneScript::new();
    let dot = s.marker(0.05).unwrap();
    let x = s.value(2.2).unwrap();
    s.play([AnimationStep::create(dot).duration(0.0)]).unwrap();
    s.bind(dot, &[x], |i| {
        let x = i.value(0)?;
        Ok(Derived::at(Point::new(x, 36.0 / x)))
    })
    .unwrap();
    s.play([AnimationStep::drive(x, 7.5).duration(4.0).ease(Ease::Linear)])
        .unwrap();

    let d = Director::new(s);
    for (t, want_x, want_y) in [(0.0, 2.2, 16.3636), (2.0, 4.85, 7.4227), (4.0, 7.5, 4.8)] {
        let p = d.render_frame(t).element(dot).unwrap().transform.position;
        assert!((p.x - want_x).abs() < 1e-9, "x at {t}: {}", p.x);
        assert!((p.y - want_y).abs() < 1e-4, "y at {t}: {}", p.y);
    }
}

#[test]
fn empty_script_is_done_immediately() {
    let mut d = Director::new(SceneScript::new());
    d.start().unwrap();
    assert_eq!(d.state(), DirectorState::Done);
    assert!(d.render_frame(0.0).nodes.is_empty());
}
