use std::collections::BTreeSet;

use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, ValueId};
use crate::reactive::binding::Binding;
use crate::scene::graph::SceneGraph;
use crate::timeline::frame::Overlays;
use crate::timeline::state::{SceneState, apply_step, progress};
use crate::timeline::step::{AnimationStep, Touch};

/// Steps sharing one start time. The batch lasts as long as its longest step.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    steps: Vec<AnimationStep>,
}

impl Batch {
    /// Validate and build a batch: non-empty, valid durations, no two steps on one target.
    pub fn new(steps: Vec<AnimationStep>) -> KinetexResult<Self> {
        if steps.is_empty() {
            return Err(KinetexError::validation("a batch needs at least one step"));
        }
        let mut seen = BTreeSet::new();
        for (i, step) in steps.iter().enumerate() {
            step.validate()
                .map_err(|e| KinetexError::validation(format!("step {i}: {e}")))?;
            for t in step.touches() {
                if !seen.insert(t) {
                    let what = match t {
                        Touch::Element(id) => id.to_string(),
                        Touch::Value(id) => id.to_string(),
                    };
                    return Err(KinetexError::validation(format!(
                        "step {i} targets {what}, which another step of the batch already targets"
                    )));
                }
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    pub fn duration(&self) -> f64 {
        self.steps.iter().map(|s| s.duration).fold(0.0, f64::max)
    }

    /// Scene state `elapsed` seconds into the batch, with bindings resolved.
    ///
    /// Failures are tagged with `cue` and the failing step index.
    pub(crate) fn sample(
        &self,
        cue: usize,
        start: &SceneState,
        catalog: &SceneGraph,
        elapsed: f64,
        overlays: &mut Overlays,
    ) -> KinetexResult<SceneState> {
        let mut state = start.clone();
        for (i, step) in self.steps.iter().enumerate() {
            apply_step(step, start, &mut state, catalog, progress(step, elapsed), overlays)
                .map_err(|e| KinetexError::aborted(cue, Some(i), e))?;
        }
        state
            .resolve()
            .map_err(|e| KinetexError::aborted(cue, None, e))?;
        Ok(state)
    }
}

/// One entry of the timeline.
#[derive(Clone, Debug)]
pub enum Cue {
    /// Play a batch of steps.
    Play(Batch),
    /// Bare delay; the scene does not change.
    Wait(f64),
    /// Attach a binding (instantaneous).
    Bind(Binding),
    /// Detach an element's binding (instantaneous).
    Unbind(ElementId),
    /// Release reactive values at the end of a scene block (instantaneous).
    Release(Vec<ValueId>),
}

impl Cue {
    pub fn duration(&self) -> f64 {
        match self {
            Self::Play(b) => b.duration(),
            Self::Wait(secs) => *secs,
            Self::Bind(_) | Self::Unbind(_) | Self::Release(_) => 0.0,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Play(b) => format!("play {} step(s)", b.steps().len()),
            Self::Wait(secs) => format!("wait {secs}s"),
            Self::Bind(b) => format!("bind {}", b.element),
            Self::Unbind(e) => format!("unbind {e}"),
            Self::Release(v) => format!("release {} value(s)", v.len()),
        }
    }

    /// State at `elapsed` seconds into this cue.
    pub(crate) fn sample(
        &self,
        index: usize,
        start: &SceneState,
        catalog: &SceneGraph,
        elapsed: f64,
        overlays: &mut Overlays,
    ) -> KinetexResult<SceneState> {
        match self {
            Self::Play(b) => b.sample(index, start, catalog, elapsed, overlays),
            Self::Wait(_) => Ok(start.clone()),
            Self::Bind(b) => instant(index, start, |s| s.bind(b.clone())),
            Self::Unbind(e) => instant(index, start, |s| s.unbind(*e)),
            Self::Release(v) => instant(index, start, |s| s.release(v)),
        }
    }
}

fn instant(
    index: usize,
    start: &SceneState,
    f: impl FnOnce(&mut SceneState) -> KinetexResult<()>,
) -> KinetexResult<SceneState> {
    let mut state = start.clone();
    f(&mut state)
        .and_then(|()| state.resolve())
        .map_err(|e| KinetexError::aborted(index, None, e))?;
    Ok(state)
}

/// Row of [`Timeline::summary`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CueSummary {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub label: String,
}

/// Ordered cues; each starts when the previous one has fully elapsed.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    cues: Vec<Cue>,
    starts: Vec<f64>,
    total: f64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, cue: Cue) {
        self.starts.push(self.total);
        self.total += cue.duration();
        self.cues.push(cue);
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.total
    }

    pub fn start_of(&self, index: usize) -> Option<f64> {
        self.starts.get(index).copied()
    }

    pub fn end_of(&self, index: usize) -> Option<f64> {
        Some(self.start_of(index)? + self.cues.get(index)?.duration())
    }

    /// Number of cues already entered at time `t`.
    ///
    /// Cue `i` spans `[start, end)`; zero-length cues count as entered once `t >= start`.
    pub(crate) fn entered_at(&self, t: f64) -> usize {
        self.starts.partition_point(|s| *s <= t)
    }

    pub fn summary(&self) -> Vec<CueSummary> {
        self.cues
            .iter()
            .enumerate()
            .map(|(index, cue)| CueSummary {
                index,
                start: self.starts[index],
                end: self.starts[index] + cue.duration(),
                label: cue.label(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/cue.rs"]
mod tests;
