//! kinetex is a declarative animation timeline engine for formula explainer videos.
//!
//! A [`SceneScript`] declares elements (text, formulas, axes, curves, markers, braces), lays
//! them out relative to each other, binds derived elements to reactive values, and appends
//! batches of [`AnimationStep`]s. A [`Director`] owns the resulting state for one run: it
//! advances a single clock cue by cue and can produce a deterministic [`FrameState`] snapshot
//! for any timeline time. Snapshots are turned into pixels by a [`Rasterizer`] and handed to
//! a [`FrameSink`].
//!
//! - Build a script, or use [`script::liquidity::build`]
//! - Create a [`Director`] from it
//! - Render with [`render_timeline`] or [`render_script`]
#![forbid(unsafe_code)]

mod animation;
mod config;
mod encode;
mod foundation;
mod layout;
mod reactive;
mod render;
mod scene;
/// Scene programs, including the bundled explainer.
pub mod script;
mod timeline;
mod typeset;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, DOWN, FRAME_HEIGHT, FRAME_WIDTH, Fps, FrameIndex, LEFT, ORIGIN,
    Point, RIGHT, Rect, Transform2D, UP, Vec2, frame_rect,
};
pub use crate::foundation::error::{KinetexError, KinetexResult};
pub use crate::foundation::ids::{ElementId, GroupId, ValueId};

pub use crate::animation::ease::Ease;
pub use crate::animation::lerp::Lerp;
pub use crate::layout::place::{
    align_to, arrange, critical_point, move_to, next_to_offset, place_next_to, to_edge,
};
pub use crate::reactive::binding::{
    Binding, BindingInputs, BindingTable, ComputeFn, Derived, Placement,
};
pub use crate::reactive::value::{Axis, ReactiveValue, ValueSource, ValueStore};
pub use crate::scene::element::{BLUE, SceneElement, Style, WHITE, YELLOW};
pub use crate::scene::graph::{Group, SceneGraph, StackLayout, Target};
pub use crate::scene::payload::{
    AxesPayload, BRACE_DEPTH, BracePayload, CurvePayload, FormulaPayload, Fragment, FragmentKey,
    Payload, TextPayload,
};
pub use crate::script::builder::SceneScript;
pub use crate::timeline::cue::{Batch, Cue, CueSummary, Timeline};
pub use crate::timeline::director::{AbortHandle, Director, DirectorState};
pub use crate::timeline::frame::{FrameState, NodeKey, Outline, VisualNode};
pub use crate::timeline::state::SceneState;
pub use crate::timeline::step::{
    AnimationStep, CreateEffect, DEFAULT_DURATION, Emphasis, FadeDirection, MatchFallback,
    StepKind, Touch, TransformTarget,
};
pub use crate::typeset::{TokenTypesetter, Typesetter};

pub use crate::config::{OutputFormat, Quality, RenderConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::png::{PngSequenceSink, save_frame_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::render::backend::{FrameRGBA, Rasterizer};
pub use crate::render::cpu::CpuRasterizer;
pub use crate::render::pipeline::{
    RenderOutcome, RunReport, render_script, render_still, render_timeline,
};
