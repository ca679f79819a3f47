use std::collections::{BTreeMap, BTreeSet};

use crate::animation::ease::there_and_back;
use crate::animation::lerp::Lerp;
use crate::foundation::core::{Point, Transform2D};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, ValueId};
use crate::reactive::binding::{Binding, BindingTable};
use crate::reactive::value::ValueStore;
use crate::scene::element::SceneElement;
use crate::scene::graph::SceneGraph;
use crate::scene::payload::{Fragment, FragmentKey};
use crate::timeline::frame::{Accent, NodeKey, Outline, Overlays, VisualNode};
use crate::timeline::step::{
    AnimationStep, CreateEffect, Emphasis, FadeDirection, MatchFallback, StepKind, TransformTarget,
};

/// Padding between a circumscribed target and its outline.
const OUTLINE_PAD: f64 = 0.1;

/// Everything a run mutates: live elements, values, bindings and the ids already destroyed.
#[derive(Clone, Debug, Default)]
pub struct SceneState {
    pub graph: SceneGraph,
    pub values: ValueStore,
    pub bindings: BindingTable,
    pub destroyed: BTreeSet<ElementId>,
}

impl SceneState {
    /// Live element, or a reference error naming why it is unavailable.
    pub fn require_live(&self, id: ElementId) -> KinetexResult<&SceneElement> {
        if self.destroyed.contains(&id) {
            return Err(KinetexError::scene_reference(format!(
                "{id} was destroyed earlier in the timeline"
            )));
        }
        self.graph.get(id)
    }

    fn require_live_mut(&mut self, id: ElementId) -> KinetexResult<&mut SceneElement> {
        self.require_live(id)?;
        self.graph.get_mut(id)
    }

    /// Add a declared element to the scene.
    pub(crate) fn insert_from_catalog(
        &mut self,
        catalog: &SceneGraph,
        id: ElementId,
    ) -> KinetexResult<&mut SceneElement> {
        if self.destroyed.contains(&id) {
            return Err(KinetexError::scene_reference(format!(
                "{id} was destroyed and cannot be created again"
            )));
        }
        if self.graph.contains(id) {
            return Err(KinetexError::validation(format!(
                "{id} is already in the scene"
            )));
        }
        let declared = catalog
            .get(id)
            .map_err(|_| KinetexError::scene_reference(format!("{id} was never declared")))?;
        self.graph.insert(declared.clone())?;
        if self.bindings.is_bound(id) {
            self.values.mark_dirty(id);
        }
        self.graph.get_mut(id)
    }

    /// Remove an element for good, dropping its binding.
    pub(crate) fn destroy(&mut self, id: ElementId) -> KinetexResult<()> {
        self.graph.remove(id)?;
        self.bindings.remove(id, &mut self.values);
        self.destroyed.insert(id);
        Ok(())
    }

    pub(crate) fn bind(&mut self, binding: Binding) -> KinetexResult<()> {
        if self.destroyed.contains(&binding.element) {
            return Err(KinetexError::scene_reference(format!(
                "cannot bind destroyed {}",
                binding.element
            )));
        }
        let element = binding.element;
        self.bindings.insert(binding, &mut self.values)?;
        if self.graph.contains(element) {
            self.values.mark_dirty(element);
        }
        Ok(())
    }

    pub(crate) fn unbind(&mut self, element: ElementId) -> KinetexResult<()> {
        if self.destroyed.contains(&element) {
            return Err(KinetexError::scene_reference(format!(
                "cannot unbind destroyed {element}"
            )));
        }
        self.bindings
            .remove(element, &mut self.values)
            .map(|_| ())
            .ok_or_else(|| KinetexError::validation(format!("{element} is not bound")))
    }

    pub(crate) fn release(&mut self, ids: &[ValueId]) -> KinetexResult<()> {
        for v in ids {
            self.bindings.drop_for_value(*v, &mut self.values);
            self.values.release(*v)?;
        }
        Ok(())
    }

    /// Recompute dirty bound elements and refresh each element's subscription list.
    pub(crate) fn resolve(&mut self) -> KinetexResult<()> {
        self.bindings.recompute(&mut self.values, &mut self.graph)?;
        let ids: Vec<ElementId> = self.graph.iter().map(|e| e.id).collect();
        for id in ids {
            let subscribed = self
                .bindings
                .get(id)
                .map(|b| b.sources.clone())
                .unwrap_or_default();
            self.graph.get_mut(id)?.bindings = subscribed;
        }
        Ok(())
    }
}

/// Normalized progress of a step `elapsed` seconds after its batch started.
pub(crate) fn progress(step: &AnimationStep, elapsed: f64) -> f64 {
    if step.duration <= 0.0 {
        1.0
    } else {
        (elapsed / step.duration).clamp(0.0, 1.0)
    }
}

/// Apply one step at raw progress `p` onto `state`.
///
/// "From" values are read from `start`, the state at the batch start, so the steps of one
/// batch can be applied in any order.
pub(crate) fn apply_step(
    step: &AnimationStep,
    start: &SceneState,
    state: &mut SceneState,
    catalog: &SceneGraph,
    p: f64,
    overlays: &mut Overlays,
) -> KinetexResult<()> {
    let e = step.ease.apply(p);
    match &step.kind {
        StepKind::Create { element, effect } => {
            let el = state.insert_from_catalog(catalog, *element)?;
            match effect {
                CreateEffect::Instant => {}
                CreateEffect::Write | CreateEffect::Draw => el.reveal = e,
                CreateEffect::FadeIn { shift } => {
                    el.opacity *= e;
                    el.transform.position -= *shift * (1.0 - e);
                }
                CreateEffect::Grow => el.transform.scale *= e,
            }
        }
        StepKind::Transform(TransformTarget::Element { element, to, from }) => {
            let from = match from {
                Some(f) => *f,
                None => start.require_live(*element)?.transform,
            };
            state.require_live_mut(*element)?.transform = <Transform2D as Lerp>::lerp(&from, to, e);
        }
        StepKind::Transform(TransformTarget::Value { value, to, from }) => {
            let from = match from {
                Some(f) => *f,
                None => start.values.get(*value)?,
            };
            state.values.set(*value, <f64 as Lerp>::lerp(&from, to, e))?;
        }
        StepKind::Fade {
            element,
            direction: FadeDirection::In,
            shift,
        } => {
            if start.graph.contains(*element) {
                let from = start.require_live(*element)?.opacity;
                state.require_live_mut(*element)?.opacity = <f64 as Lerp>::lerp(&from, &1.0, e);
            } else {
                let el = state.insert_from_catalog(catalog, *element)?;
                el.opacity *= e;
                el.transform.position -= *shift * (1.0 - e);
            }
        }
        StepKind::Fade {
            element,
            direction: FadeDirection::Out,
            shift,
        } => {
            let from = start.require_live(*element)?;
            let (opacity, position) = (from.opacity, from.transform.position);
            if p >= 1.0 {
                state.destroy(*element)?;
            } else {
                let el = state.require_live_mut(*element)?;
                el.opacity = opacity * (1.0 - e);
                el.transform.position = position + *shift * e;
            }
        }
        StepKind::Indicate { element, emphasis } => {
            let bounds = state.require_live(*element)?.bounds();
            if p > 0.0 && p < 1.0 {
                let accent = overlays.accents.entry(*element).or_default();
                match emphasis {
                    Emphasis::Circumscribe { color, time_width } => {
                        let head = e * (1.0 + time_width);
                        accent.outline = Some(Outline {
                            bounds: bounds.inflate(OUTLINE_PAD, OUTLINE_PAD),
                            color: *color,
                            head: head.min(1.0),
                            tail: (head - time_width).max(0.0),
                        });
                    }
                    Emphasis::Pulse { scale, color } => {
                        let k = there_and_back(e);
                        accent.scale = 1.0 + (scale - 1.0) * k;
                        accent.tint = Some((*color, k));
                    }
                }
            }
        }
        StepKind::TransformMatching {
            source,
            target,
            retain_source,
            fallback,
        } => {
            let src = start.require_live(*source)?;
            if start.destroyed.contains(target) {
                return Err(KinetexError::scene_reference(format!(
                    "{target} was destroyed earlier in the timeline"
                )));
            }
            let tgt = catalog
                .get(*target)
                .map_err(|_| KinetexError::scene_reference(format!("{target} was never declared")))?;
            let (Some(src_frags), Some(tgt_frags)) = (src.payload.fragments(), tgt.payload.fragments())
            else {
                return Err(KinetexError::incompatible_transform(format!(
                    "cannot match a {} into a {}: both need keyed fragments",
                    src.payload.kind_name(),
                    tgt.payload.kind_name()
                )));
            };
            let by_key: BTreeMap<&FragmentKey, &Fragment> =
                src_frags.iter().map(|f| (&f.key, f)).collect();
            let shared = tgt_frags.iter().filter(|f| by_key.contains_key(&f.key)).count();
            if shared == 0 && *fallback == MatchFallback::None {
                return Err(KinetexError::incompatible_transform(format!(
                    "{source} and {target} share no fragments and no fade fallback is set"
                )));
            }

            if p >= 1.0 {
                state.insert_from_catalog(catalog, *target)?;
                if !retain_source {
                    state.destroy(*source)?;
                }
                return Ok(());
            }
            if start.graph.contains(*target) {
                return Err(KinetexError::validation(format!(
                    "{target} is already in the scene"
                )));
            }
            if !retain_source {
                overlays.hidden.insert(*source);
            }
            let fade = *fallback == MatchFallback::Fade;
            for f in tgt_frags {
                let to = fragment_position(tgt, f);
                let node = match by_key.get(&f.key) {
                    Some(from_frag) => {
                        let from = fragment_position(src, from_frag);
                        morph_node(src, tgt, *target, f, <Point as Lerp>::lerp(&from, &to, e), e, 1.0)
                    }
                    None if fade => morph_node(src, tgt, *target, f, to, 1.0, e),
                    None => continue,
                };
                overlays.ghosts.push(node);
            }
            if fade {
                let target_keys: BTreeSet<&FragmentKey> = tgt_frags.iter().map(|f| &f.key).collect();
                for f in src_frags.iter().filter(|f| !target_keys.contains(&f.key)) {
                    let at = fragment_position(src, f);
                    overlays
                        .ghosts
                        .push(morph_node(src, src, *target, f, at, 0.0, 1.0 - e));
                }
            }
        }
    }
    Ok(())
}

fn fragment_position(el: &SceneElement, f: &Fragment) -> Point {
    el.transform.position + f.offset * el.transform.scale
}

/// Ghost node for one fragment of a morph; `mix` blends the source style into the target's.
fn morph_node(
    src: &SceneElement,
    tgt: &SceneElement,
    owner: ElementId,
    fragment: &Fragment,
    position: Point,
    mix: f64,
    fade: f64,
) -> VisualNode {
    VisualNode {
        key: NodeKey::Fragment {
            owner,
            key: fragment.key.clone(),
        },
        payload: tgt.payload.fragment_piece(fragment),
        transform: Transform2D {
            position,
            scale: <f64 as Lerp>::lerp(&src.transform.scale, &tgt.transform.scale, mix),
        },
        opacity: <f64 as Lerp>::lerp(&src.opacity, &tgt.opacity, mix) * fade,
        reveal: 1.0,
        color: <[u8; 4] as Lerp>::lerp(&src.style.color, &tgt.style.color, mix),
        stroke_width: tgt.style.stroke_width,
        outline: None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/state.rs"]
mod tests;
