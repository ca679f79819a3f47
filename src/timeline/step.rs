use smallvec::SmallVec;

use crate::animation::ease::Ease;
use crate::foundation::core::{Transform2D, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, ValueId};
use crate::scene::element::YELLOW;

/// Default step duration in seconds.
pub const DEFAULT_DURATION: f64 = 1.0;

/// How a created element appears.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CreateEffect {
    /// Present from the first sample of the step.
    Instant,
    /// Reveal fraction 0 -> 1 (glyph-by-glyph for text and formulas).
    Write,
    /// Reveal fraction 0 -> 1 (stroke draw-in for curves, axes and braces).
    Draw,
    /// Opacity 0 -> 1 while travelling from `position - shift` to `position`.
    FadeIn { shift: Vec2 },
    /// Scale 0 -> 1 around the element centre.
    Grow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeDirection {
    In,
    Out,
}

/// What a transform step interpolates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransformTarget {
    /// An element's transform, from `from` (or its state at batch start) to `to`.
    Element {
        element: ElementId,
        to: Transform2D,
        from: Option<Transform2D>,
    },
    /// A reactive value; dependents follow through their bindings.
    Value {
        value: ValueId,
        to: f64,
        from: Option<f64>,
    },
}

/// Transient emphasis; never changes persisted state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Emphasis {
    /// An outline segment sweeping once around the target's bounds.
    Circumscribe { color: [u8; 4], time_width: f64 },
    /// Scale and tint that rise and fall back.
    Pulse { scale: f64, color: [u8; 4] },
}

/// What happens to fragments without a counterpart in a transform-matching step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchFallback {
    /// Unmatched source fragments fade out, unmatched target fragments fade in.
    #[default]
    Fade,
    /// No fallback: unmatched fragments pop, and a pair with nothing in common is rejected.
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    Create {
        element: ElementId,
        effect: CreateEffect,
    },
    Transform(TransformTarget),
    Fade {
        element: ElementId,
        direction: FadeDirection,
        shift: Vec2,
    },
    Indicate {
        element: ElementId,
        emphasis: Emphasis,
    },
    TransformMatching {
        source: ElementId,
        target: ElementId,
        retain_source: bool,
        fallback: MatchFallback,
    },
}

/// What a step writes to; two steps of one batch may not share a touch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Touch {
    Element(ElementId),
    Value(ValueId),
}

/// A unit of change over `duration` seconds under `ease`.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationStep {
    pub kind: StepKind,
    pub duration: f64,
    pub ease: Ease,
}

impl AnimationStep {
    fn new(kind: StepKind) -> Self {
        Self {
            kind,
            duration: DEFAULT_DURATION,
            ease: Ease::default(),
        }
    }

    pub fn create(element: ElementId) -> Self {
        Self::new(StepKind::Create {
            element,
            effect: CreateEffect::Instant,
        })
    }

    pub fn write(element: ElementId) -> Self {
        Self::new(StepKind::Create {
            element,
            effect: CreateEffect::Write,
        })
    }

    pub fn draw(element: ElementId) -> Self {
        Self::new(StepKind::Create {
            element,
            effect: CreateEffect::Draw,
        })
    }

    pub fn grow(element: ElementId) -> Self {
        Self::new(StepKind::Create {
            element,
            effect: CreateEffect::Grow,
        })
    }

    /// Create by fading in from `shift` away.
    pub fn fade_in_shifted(element: ElementId, shift: Vec2) -> Self {
        Self::new(StepKind::Create {
            element,
            effect: CreateEffect::FadeIn { shift },
        })
    }

    /// Fade an element in; creates it if it is not in the scene yet.
    pub fn fade_in(element: ElementId) -> Self {
        Self::new(StepKind::Fade {
            element,
            direction: FadeDirection::In,
            shift: Vec2::ZERO,
        })
    }

    /// Fade an element out and destroy it on completion.
    pub fn fade_out(element: ElementId) -> Self {
        Self::new(StepKind::Fade {
            element,
            direction: FadeDirection::Out,
            shift: Vec2::ZERO,
        })
    }

    /// Fade out while moving by `shift`.
    pub fn fade_out_shifted(element: ElementId, shift: Vec2) -> Self {
        Self::new(StepKind::Fade {
            element,
            direction: FadeDirection::Out,
            shift,
        })
    }

    pub fn transform_to(element: ElementId, to: Transform2D) -> Self {
        Self::new(StepKind::Transform(TransformTarget::Element {
            element,
            to,
            from: None,
        }))
    }

    /// Drive a reactive value to `to`.
    pub fn drive(value: ValueId, to: f64) -> Self {
        Self::new(StepKind::Transform(TransformTarget::Value {
            value,
            to,
            from: None,
        }))
    }

    pub fn circumscribe(element: ElementId) -> Self {
        Self::new(StepKind::Indicate {
            element,
            emphasis: Emphasis::Circumscribe {
                color: YELLOW,
                time_width: 0.3,
            },
        })
    }

    pub fn pulse(element: ElementId) -> Self {
        Self::new(StepKind::Indicate {
            element,
            emphasis: Emphasis::Pulse {
                scale: 1.2,
                color: YELLOW,
            },
        })
    }

    /// Morph `source` into `target` by fragment key. The source is removed on completion
    /// unless [`AnimationStep::retain_source`] is set.
    pub fn transform_matching(source: ElementId, target: ElementId) -> Self {
        Self::new(StepKind::TransformMatching {
            source,
            target,
            retain_source: false,
            fallback: MatchFallback::Fade,
        })
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = secs;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Override the start state of a transform step.
    pub fn from(mut self, from: Transform2D) -> Self {
        if let StepKind::Transform(TransformTarget::Element { from: f, .. }) = &mut self.kind {
            *f = Some(from);
        }
        self
    }

    /// Override the start value of a drive step.
    pub fn from_value(mut self, from: f64) -> Self {
        if let StepKind::Transform(TransformTarget::Value { from: f, .. }) = &mut self.kind {
            *f = Some(from);
        }
        self
    }

    pub fn retain_source(mut self) -> Self {
        if let StepKind::TransformMatching { retain_source, .. } = &mut self.kind {
            *retain_source = true;
        }
        self
    }

    pub fn fallback(mut self, fallback: MatchFallback) -> Self {
        if let StepKind::TransformMatching { fallback: f, .. } = &mut self.kind {
            *f = fallback;
        }
        self
    }

    pub fn with_emphasis(mut self, emphasis: Emphasis) -> Self {
        if let StepKind::Indicate { emphasis: e, .. } = &mut self.kind {
            *e = emphasis;
        }
        self
    }

    /// Elements and values this step writes.
    pub fn touches(&self) -> SmallVec<[Touch; 2]> {
        let mut out = SmallVec::new();
        match &self.kind {
            StepKind::Create { element, .. }
            | StepKind::Fade { element, .. }
            | StepKind::Indicate { element, .. } => out.push(Touch::Element(*element)),
            StepKind::Transform(TransformTarget::Element { element, .. }) => {
                out.push(Touch::Element(*element))
            }
            StepKind::Transform(TransformTarget::Value { value, .. }) => {
                out.push(Touch::Value(*value))
            }
            StepKind::TransformMatching { source, target, .. } => {
                out.push(Touch::Element(*source));
                out.push(Touch::Element(*target));
            }
        }
        out
    }

    /// Static checks that do not need scene state.
    pub fn validate(&self) -> KinetexResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(KinetexError::validation(format!(
                "step duration must be finite and >= 0 (got {})",
                self.duration
            )));
        }
        match &self.kind {
            StepKind::TransformMatching { source, target, .. } if source == target => {
                Err(KinetexError::validation(format!(
                    "{source} cannot be transform-matched into itself"
                )))
            }
            StepKind::Indicate {
                emphasis: Emphasis::Circumscribe { time_width, .. },
                ..
            } if !(time_width.is_finite() && *time_width > 0.0) => Err(
                KinetexError::validation("circumscribe time_width must be finite and > 0"),
            ),
            StepKind::Transform(TransformTarget::Element { to, .. })
                if !(to.scale.is_finite() && to.position.x.is_finite() && to.position.y.is_finite()) =>
            {
                Err(KinetexError::validation("transform target must be finite"))
            }
            StepKind::Transform(TransformTarget::Value { to, .. }) if !to.is_finite() => {
                Err(KinetexError::validation("drive target must be finite"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/step.rs"]
mod tests;
