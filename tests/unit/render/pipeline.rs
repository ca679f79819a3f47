use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::foundation::error::KinetexError;
use crate::timeline::frame::FrameState;
use crate::timeline::step::AnimationStep;

/// Rasterizer that counts calls and encodes the node count in the first byte.
#[derive(Default)]
struct CountingRasterizer {
    calls: usize,
}

impl Rasterizer for CountingRasterizer {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: 2,
            height: 2,
        }
    }

    fn rasterize(&mut self, frame: &FrameState) -> KinetexResult<FrameRGBA> {
        self.calls += 1;
        let mut data = vec![0u8; 16];
        data[0] = frame.nodes.len() as u8;
        Ok(FrameRGBA {
            width: 2,
            height: 2,
            data,
        })
    }
}

fn fps10() -> Fps {
    Fps::new(10, 1).unwrap()
}

#[test]
fn static_stretches_are_elided() {
    let mut s = SceneScript::new();
    let a = s.marker(0.2).unwrap();
    s.play([AnimationStep::create(a).duration(0.0)]).unwrap();
    s.wait(1.0).unwrap();
    s.play([AnimationStep::fade_out(a)]).unwrap();

    let mut director = Director::new(s);
    let mut raster = CountingRasterizer::default();
    let mut sink = InMemorySink::new();
    let report = render_timeline(&mut director, fps10(), &mut raster, &mut sink).unwrap();

    assert_eq!(report.frames_total, 20);
    assert_eq!(report.frames_rendered + report.frames_elided, 20);
    assert!(report.frames_elided >= 9, "{report:?}");
    assert_eq!(raster.calls as u64, report.frames_rendered);
    assert_eq!(report.completed_cues, 3);
    assert!(report.aborted.is_none());
    assert_eq!(director.state(), DirectorState::Done);

    assert!(sink.is_finished());
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..20).collect::<Vec<_>>());
    assert_eq!(sink.config().unwrap().fps, fps10());
}

#[test]
fn failing_cue_keeps_earlier_frames_and_finalizes_sink() {
    let mut s = SceneScript::new();
    let a = s.marker(0.2).unwrap();
    s.play([AnimationStep::create(a).duration(0.0)]).unwrap();
    s.play([AnimationStep::fade_out(a)]).unwrap();
    s.play([AnimationStep::pulse(a)]).unwrap();

    let mut director = Director::new(s);
    let mut raster = CountingRasterizer::default();
    let mut sink = InMemorySink::new();
    let err = render_timeline(&mut director, fps10(), &mut raster, &mut sink).unwrap_err();

    assert!(matches!(err.root(), KinetexError::SceneReference(_)));
    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 10);
    assert!(matches!(director.state(), DirectorState::Aborted { cue: 2 }));
}

#[test]
fn abort_request_ends_run_cleanly() {
    let mut s = SceneScript::new();
    let a = s.marker(0.2).unwrap();
    s.play([AnimationStep::create(a).duration(0.0)]).unwrap();
    s.wait(1.0).unwrap();

    let mut director = Director::new(s);
    director.abort_handle().abort();
    let mut sink = InMemorySink::new();
    let report =
        render_timeline(&mut director, fps10(), &mut CountingRasterizer::default(), &mut sink)
            .unwrap();
    assert_eq!(report.aborted.as_deref(), Some("abort requested"));
    assert_eq!(report.frames_total, 0);
    assert!(sink.is_finished());
}

#[test]
fn empty_timeline_still_yields_one_frame() {
    let mut director = Director::new(SceneScript::new());
    let mut sink = InMemorySink::new();
    let report =
        render_timeline(&mut director, fps10(), &mut CountingRasterizer::default(), &mut sink)
            .unwrap();
    assert_eq!(report.frames_total, 1);
    assert_eq!(sink.frames()[0].1.data[0], 0);
}
