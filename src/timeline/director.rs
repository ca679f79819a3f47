use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::math::EPSILON;
use crate::scene::graph::SceneGraph;
use crate::script::builder::SceneScript;
use crate::timeline::cue::{Cue, Timeline};
use crate::timeline::frame::{FrameState, Overlays};
use crate::timeline::state::SceneState;

/// Position of a [`Director`] in its timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DirectorState {
    /// Not started.
    Idle,
    /// Playing cue `cue`.
    Running { cue: usize },
    /// Inside a bare wait.
    Paused { cue: usize, elapsed: f64 },
    /// Every cue has completed.
    Done,
    /// Stopped before cue `cue`, by an error or an abort request. The scene holds the state
    /// of the last completed cue.
    Aborted { cue: usize },
}

/// Cloneable request to stop a run at the next cue boundary.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Owns all mutable state of one script run and advances it along a single clock.
pub struct Director {
    timeline: Timeline,
    catalog: SceneGraph,
    /// `checkpoints[i]` is the resolved state at the start of cue `i`.
    checkpoints: Vec<SceneState>,
    /// End state of the cue in progress, computed when the cue is entered.
    pending: Option<SceneState>,
    phase: DirectorState,
    time: f64,
    failure: Option<String>,
    abort: AbortHandle,
}

impl Director {
    /// Take ownership of a finished script.
    pub fn new(script: SceneScript) -> Self {
        let (timeline, catalog, initial) = script.into_parts();
        Self {
            timeline,
            catalog,
            checkpoints: vec![initial],
            pending: None,
            phase: DirectorState::Idle,
            time: 0.0,
            failure: None,
            abort: AbortHandle::default(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Every declared element, in declaration state.
    pub fn catalog(&self) -> &SceneGraph {
        &self.catalog
    }

    pub fn state(&self) -> DirectorState {
        self.phase
    }

    /// Director clock in timeline seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Committed scene: the state at the start of the current cue (or the final state).
    pub fn scene(&self) -> &SceneState {
        // `checkpoints` always holds the initial state.
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Reason the run stopped early, if it did.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            DirectorState::Done | DirectorState::Aborted { .. }
        )
    }

    /// Cues fully completed so far.
    pub fn completed_cues(&self) -> usize {
        self.checkpoints.len() - 1
    }

    /// Leave `Idle` and enter the first cue.
    #[tracing::instrument(skip(self))]
    pub fn start(&mut self) -> KinetexResult<()> {
        if self.phase != DirectorState::Idle {
            return Ok(());
        }
        if self.timeline.is_empty() {
            self.phase = DirectorState::Done;
            return Ok(());
        }
        self.enter(0)
    }

    fn enter(&mut self, index: usize) -> KinetexResult<()> {
        let Some(cue) = self.timeline.cues().get(index) else {
            self.phase = DirectorState::Done;
            tracing::debug!(time = self.time, "timeline done");
            return Ok(());
        };
        tracing::debug!(cue = index, label = %cue.label(), "entering cue");
        let start = self.scene();
        match cue.sample(
            index,
            start,
            &self.catalog,
            cue.duration(),
            &mut Overlays::default(),
        ) {
            Ok(end) => {
                self.pending = Some(end);
                self.phase = match cue {
                    Cue::Wait(_) => DirectorState::Paused {
                        cue: index,
                        elapsed: 0.0,
                    },
                    _ => DirectorState::Running { cue: index },
                };
                Ok(())
            }
            Err(err) => {
                tracing::warn!(cue = index, error = %err, "timeline aborted");
                self.failure = Some(err.to_string());
                self.phase = DirectorState::Aborted { cue: index };
                self.pending = None;
                Err(err)
            }
        }
    }

    fn current(&self) -> Option<usize> {
        match self.phase {
            DirectorState::Running { cue } | DirectorState::Paused { cue, .. } => Some(cue),
            _ => None,
        }
    }

    /// Move to the next cue if the current one has fully elapsed.
    ///
    /// Returns whether the director moved. An abort request is honoured here, at the cue
    /// boundary.
    pub fn advance(&mut self) -> KinetexResult<bool> {
        if self.phase == DirectorState::Idle {
            self.start()?;
            return Ok(true);
        }
        let Some(index) = self.current() else {
            return Ok(false);
        };
        let end = self.timeline.end_of(index).unwrap_or(self.time);
        if self.time + EPSILON < end {
            return Ok(false);
        }
        let Some(done) = self.pending.take() else {
            return Err(KinetexError::evaluation(format!(
                "cue {index} has no computed end state"
            )));
        };
        self.checkpoints.push(done);
        if self.abort.is_aborted() && index + 1 < self.timeline.len() {
            tracing::warn!(cue = index + 1, "abort requested; stopping at cue boundary");
            self.failure = Some("abort requested".to_string());
            self.phase = DirectorState::Aborted { cue: index + 1 };
            return Ok(true);
        }
        self.enter(index + 1)?;
        Ok(true)
    }

    /// Advance the clock by `dt` seconds, crossing as many cue boundaries as needed.
    pub fn tick(&mut self, dt: f64) -> KinetexResult<DirectorState> {
        self.advance_to(self.time + dt.max(0.0))
    }

    /// Advance the clock to `t` (never backwards).
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn advance_to(&mut self, t: f64) -> KinetexResult<DirectorState> {
        if !t.is_finite() {
            return Err(KinetexError::validation(format!(
                "timeline time must be finite (got {t})"
            )));
        }
        self.time = self.time.max(t);
        if self.phase == DirectorState::Idle {
            self.start()?;
        }
        while self.advance()? {}
        if let DirectorState::Paused { cue, .. } = self.phase {
            let start = self.timeline.start_of(cue).unwrap_or(self.time);
            self.phase = DirectorState::Paused {
                cue,
                elapsed: self.time - start,
            };
        }
        Ok(self.phase)
    }

    /// Snapshot of every visible element at timeline time `t`.
    ///
    /// Pure: it never changes the director, and the same `t` always yields the same
    /// snapshot. Times past an abort show the last completed cue's state.
    pub fn render_frame(&self, t: f64) -> FrameState {
        let entered = self.timeline.entered_at(t.max(0.0));
        let stop = match self.phase {
            DirectorState::Aborted { cue } => cue,
            _ => self.timeline.len(),
        };
        if entered == 0 {
            return FrameState::capture(t, &self.checkpoints[0].graph, &Overlays::default());
        }
        let target = entered - 1;
        if target >= stop {
            return FrameState::capture(t, &self.scene().graph, &Overlays::default());
        }

        // Replay whole cues from the latest checkpoint at or before `target`.
        let mut cue = target.min(self.checkpoints.len() - 1);
        let mut start = self.checkpoints[cue].clone();
        while cue < target {
            let Some(c) = self.timeline.cues().get(cue) else {
                break;
            };
            match c.sample(cue, &start, &self.catalog, c.duration(), &mut Overlays::default()) {
                Ok(next) => start = next,
                Err(_) => return FrameState::capture(t, &start.graph, &Overlays::default()),
            }
            cue += 1;
        }

        let (Some(c), Some(begin)) = (self.timeline.cues().get(target), self.timeline.start_of(target))
        else {
            return FrameState::capture(t, &start.graph, &Overlays::default());
        };
        let elapsed = (t - begin).clamp(0.0, c.duration());
        let mut overlays = Overlays::default();
        match c.sample(target, &start, &self.catalog, elapsed, &mut overlays) {
            Ok(state) => FrameState::capture(t, &state.graph, &overlays),
            Err(_) => FrameState::capture(t, &start.graph, &Overlays::default()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/director.rs"]
mod tests;
