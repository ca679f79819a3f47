use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, GroupId, ValueId};
use crate::foundation::math::EPSILON;
use crate::layout::place;
use crate::reactive::binding::{Binding, BindingInputs, Derived};
use crate::reactive::value::{Axis, ValueSource, ValueStore};
use crate::scene::element::SceneElement;
use crate::scene::graph::{Group, SceneGraph, Target};
use crate::scene::payload::{AxesPayload, BracePayload, Payload};
use crate::timeline::cue::{Batch, Cue, Timeline};
use crate::timeline::state::SceneState;
use crate::timeline::step::AnimationStep;
use crate::typeset::{TokenTypesetter, Typesetter};

/// Samples taken along the x range by [`SceneScript::plot`].
const PLOT_SAMPLES: usize = 200;

/// Default gap between a brace tip and its label.
const BRACE_LABEL_BUFF: f64 = 0.25;

/// Builder for a scene program: declared elements laid out up front, plus a timeline of cues.
///
/// Elements are declared into a catalog and only enter the scene when a step creates them.
/// Layout operators act on the catalog, so placement is resolved before playback starts.
///
/// ```
/// use kinetex::{AnimationStep, SceneScript, DOWN, LEFT};
///
/// let mut script = SceneScript::new();
/// let h = script.text("Constant product", 40.0)?;
/// let f = script.formula(r"x \cdot y = k", 48.0)?;
/// let g = script.group(&[h, f])?;
/// script.arrange(g, DOWN, LEFT, 0.4)?;
/// script.play([AnimationStep::write(h)])?;
/// script.play([AnimationStep::write(f)])?;
/// script.wait(1.0)?;
/// assert_eq!(script.timeline().duration(), 3.0);
/// # Ok::<(), kinetex::KinetexError>(())
/// ```
pub struct SceneScript {
    catalog: SceneGraph,
    next_element: u32,
    next_group: u32,
    next_value: u32,
    initial_values: ValueStore,
    /// Values and bindings as they stand after every cue declared so far.
    head: SceneState,
    timeline: Timeline,
    blocks: Vec<Vec<ValueId>>,
    typesetter: Arc<dyn Typesetter>,
}

impl Default for SceneScript {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneScript {
    pub fn new() -> Self {
        Self::with_typesetter(Arc::new(TokenTypesetter))
    }

    pub fn with_typesetter(typesetter: Arc<dyn Typesetter>) -> Self {
        Self {
            catalog: SceneGraph::new(),
            next_element: 0,
            next_group: 0,
            next_value: 0,
            initial_values: ValueStore::new(),
            head: SceneState::default(),
            timeline: Timeline::new(),
            blocks: Vec::new(),
            typesetter,
        }
    }

    pub fn catalog(&self) -> &SceneGraph {
        &self.catalog
    }

    /// Typesetter used by [`SceneScript::formula`]; bindings can share it.
    pub fn typesetter(&self) -> Arc<dyn Typesetter> {
        Arc::clone(&self.typesetter)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn into_parts(self) -> (Timeline, SceneGraph, SceneState) {
        let initial = SceneState {
            graph: SceneGraph::new().with_groups_of(&self.catalog),
            values: self.initial_values,
            ..SceneState::default()
        };
        (self.timeline, self.catalog, initial)
    }

    /// Declare an element at the origin.
    pub fn add(&mut self, payload: Payload) -> KinetexResult<ElementId> {
        let id = ElementId(self.next_element);
        self.catalog.insert(SceneElement::new(id, payload))?;
        self.next_element += 1;
        Ok(id)
    }

    pub fn text(&mut self, content: &str, font_size: f64) -> KinetexResult<ElementId> {
        self.add(Payload::text(content, font_size)?)
    }

    /// Declare a formula typeset by the script's typesetter.
    pub fn formula(&mut self, source: &str, font_size: f64) -> KinetexResult<ElementId> {
        let payload = self.typesetter.layout_formula(source, font_size)?;
        self.add(payload)
    }

    pub fn axes(&mut self, axes: AxesPayload) -> KinetexResult<ElementId> {
        axes.validate()?;
        self.add(Payload::Axes(axes))
    }

    pub fn marker(&mut self, radius: f64) -> KinetexResult<ElementId> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(KinetexError::validation(format!(
                "marker radius must be > 0 (got {radius})"
            )));
        }
        self.add(Payload::Marker { radius })
    }

    /// Declare the graph of `f` over `[x_min, x_max]` on `axes`, at the axes' current place.
    pub fn plot(
        &mut self,
        axes: ElementId,
        f: impl Fn(f64) -> f64,
        x_min: f64,
        x_max: f64,
    ) -> KinetexResult<ElementId> {
        if !(x_min.is_finite() && x_max.is_finite() && x_max > x_min) {
            return Err(KinetexError::validation(format!(
                "plot range [{x_min}, {x_max}] is empty"
            )));
        }
        let mut points = Vec::with_capacity(PLOT_SAMPLES + 1);
        for i in 0..=PLOT_SAMPLES {
            let x = x_min + (x_max - x_min) * (i as f64) / (PLOT_SAMPLES as f64);
            let y = f(x);
            if !y.is_finite() {
                return Err(KinetexError::validation(format!(
                    "plotted function is not finite at x = {x}"
                )));
            }
            points.push(self.catalog.coords_to_point(axes, x, y)?);
        }
        let (payload, centre) = Payload::curve(points)?;
        let id = self.add(payload)?;
        self.catalog.get_mut(id)?.transform.position = centre;
        Ok(id)
    }

    pub fn set_color(&mut self, target: impl Into<Target>, color: [u8; 4]) -> KinetexResult<()> {
        for id in self.catalog.members(target.into())? {
            self.catalog.get_mut(id)?.style.color = color;
        }
        Ok(())
    }

    /// Group declared elements in order. Members remember the group as their layout parent.
    pub fn group(&mut self, members: &[ElementId]) -> KinetexResult<GroupId> {
        if members.is_empty() {
            return Err(KinetexError::layout("a group needs at least one member"));
        }
        let id = GroupId(self.next_group);
        for m in members {
            self.catalog.get(*m)?;
        }
        for m in members {
            self.catalog.get_mut(*m)?.parent = Some(id);
        }
        self.catalog.insert_group(Group {
            id,
            members: members.to_vec(),
            layout: None,
        });
        self.next_group += 1;
        Ok(id)
    }

    pub fn next_to(
        &mut self,
        target: impl Into<Target>,
        anchor: impl Into<Target>,
        direction: Vec2,
        aligned_edge: Vec2,
        buffer: f64,
    ) -> KinetexResult<()> {
        place::place_next_to(&mut self.catalog, target, anchor, direction, aligned_edge, buffer)
    }

    pub fn arrange(
        &mut self,
        group: GroupId,
        direction: Vec2,
        aligned_edge: Vec2,
        buffer: f64,
    ) -> KinetexResult<()> {
        place::arrange(&mut self.catalog, group, direction, aligned_edge, buffer)
    }

    pub fn align_to(
        &mut self,
        target: impl Into<Target>,
        anchor: impl Into<Target>,
        edge: Vec2,
    ) -> KinetexResult<()> {
        place::align_to(&mut self.catalog, target, anchor, edge)
    }

    pub fn to_edge(
        &mut self,
        target: impl Into<Target>,
        direction: Vec2,
        buffer: f64,
    ) -> KinetexResult<()> {
        place::to_edge(&mut self.catalog, target, direction, buffer)
    }

    pub fn move_to(&mut self, target: impl Into<Target>, point: Point) -> KinetexResult<()> {
        place::move_to(&mut self.catalog, target, point)
    }

    pub fn shift(&mut self, target: impl Into<Target>, delta: Vec2) -> KinetexResult<()> {
        self.catalog.shift(target.into(), delta)
    }

    /// Declare a brace spanning `target` on the axis perpendicular to `direction`, placed
    /// `buffer` away from it.
    pub fn brace_for(
        &mut self,
        target: impl Into<Target>,
        direction: Vec2,
        buffer: f64,
    ) -> KinetexResult<ElementId> {
        let target = target.into();
        let len = direction.hypot();
        if !len.is_finite() || len <= EPSILON {
            return Err(KinetexError::layout("brace direction must be non-zero"));
        }
        let d = direction / len;
        let bounds = self.catalog.target_bounds(target)?;
        let span = if d.x.abs() >= d.y.abs() {
            bounds.height()
        } else {
            bounds.width()
        };
        let brace = self.add(Payload::Brace(BracePayload { direction: d, span }))?;
        place::place_next_to(&mut self.catalog, brace, target, d, Vec2::ZERO, buffer)?;
        Ok(brace)
    }

    /// Declare a text label next to a brace's tip.
    pub fn brace_label(
        &mut self,
        brace: ElementId,
        content: &str,
        font_size: f64,
    ) -> KinetexResult<ElementId> {
        let Payload::Brace(b) = &self.catalog.get(brace)?.payload else {
            return Err(KinetexError::validation(format!("{brace} is not a brace")));
        };
        let direction = b.direction;
        let label = self.text(content, font_size)?;
        place::place_next_to(
            &mut self.catalog,
            label,
            brace,
            direction,
            Vec2::ZERO,
            BRACE_LABEL_BUFF,
        )?;
        Ok(label)
    }

    /// Member elements of a target, in declaration order.
    pub fn expand(&self, target: impl Into<Target>) -> KinetexResult<Vec<ElementId>> {
        self.catalog.members(target.into())
    }

    pub fn bounds(&self, target: impl Into<Target>) -> KinetexResult<Rect> {
        self.catalog.target_bounds(target.into())
    }

    fn new_value(&mut self, source: ValueSource, initial: f64) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        self.initial_values.insert(id, source, initial);
        self.head.values.insert(id, source, initial);
        if let Some(block) = self.blocks.last_mut() {
            block.push(id);
        }
        id
    }

    /// Declare a scalar value.
    pub fn value(&mut self, initial: f64) -> KinetexResult<ValueId> {
        if !initial.is_finite() {
            return Err(KinetexError::validation(format!(
                "value must be finite (got {initial})"
            )));
        }
        Ok(self.new_value(ValueSource::Scalar, initial))
    }

    /// Declare a value mirroring one coordinate of an element's position.
    pub fn tracking_value(&mut self, element: ElementId, axis: Axis) -> KinetexResult<ValueId> {
        let p = self.catalog.get(element)?.transform.position;
        let initial = match axis {
            Axis::X => p.x,
            Axis::Y => p.y,
        };
        Ok(self.new_value(ValueSource::Tracking { element, axis }, initial))
    }

    /// Derive `element` from `sources` from this point of the timeline on.
    ///
    /// Rejects bindings that would make the element depend on itself.
    pub fn bind<F>(&mut self, element: ElementId, sources: &[ValueId], compute: F) -> KinetexResult<()>
    where
        F: Fn(&BindingInputs<'_>) -> KinetexResult<Derived> + Send + Sync + 'static,
    {
        self.catalog.get(element)?;
        for v in sources {
            self.head.values.entry(*v)?;
        }
        let binding = Binding {
            element,
            sources: SmallVec::from_slice(sources),
            compute: Arc::new(compute),
        };
        self.head.bind(binding.clone())?;
        self.timeline.push(Cue::Bind(binding));
        Ok(())
    }

    /// Stop deriving `element`; it keeps its last derived state.
    pub fn unbind(&mut self, element: ElementId) -> KinetexResult<()> {
        self.head.unbind(element)?;
        self.timeline.push(Cue::Unbind(element));
        Ok(())
    }

    /// Open a scene block; values declared until [`SceneScript::end_block`] belong to it.
    pub fn begin_block(&mut self) {
        self.blocks.push(Vec::new());
    }

    /// Close the innermost block, releasing its values and any bindings on them.
    pub fn end_block(&mut self) -> KinetexResult<()> {
        let values = self
            .blocks
            .pop()
            .ok_or_else(|| KinetexError::validation("end_block without begin_block"))?;
        if values.is_empty() {
            return Ok(());
        }
        self.head.release(&values)?;
        self.timeline.push(Cue::Release(values));
        Ok(())
    }

    /// Append a batch: all `steps` start together.
    pub fn play(&mut self, steps: impl IntoIterator<Item = AnimationStep>) -> KinetexResult<()> {
        let batch = Batch::new(steps.into_iter().collect())?;
        self.timeline.push(Cue::Play(batch));
        Ok(())
    }

    /// Append a bare delay.
    pub fn wait(&mut self, secs: f64) -> KinetexResult<()> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(KinetexError::validation(format!(
                "wait must be finite and >= 0 (got {secs})"
            )));
        }
        self.timeline.push(Cue::Wait(secs));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/builder.rs"]
mod tests;
