use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, ValueId};
use crate::layout::place::place_next_to;
use crate::reactive::value::{ValueSource, ValueStore};
use crate::scene::graph::{SceneGraph, Target};
use crate::scene::payload::Payload;

/// Next-to request resolved after a derived payload has been applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub anchor: Target,
    pub direction: Vec2,
    pub aligned_edge: Vec2,
    pub buffer: f64,
}

/// Patch returned by a compute function. `None` fields leave the element untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Derived {
    pub position: Option<Point>,
    pub payload: Option<Payload>,
    pub opacity: Option<f64>,
    pub placement: Option<Placement>,
}

impl Derived {
    /// Patch that only moves the element.
    pub fn at(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    /// Patch that swaps the payload.
    pub fn payload(payload: Payload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }

    pub fn next_to(
        mut self,
        anchor: impl Into<Target>,
        direction: Vec2,
        aligned_edge: Vec2,
        buffer: f64,
    ) -> Self {
        self.placement = Some(Placement {
            anchor: anchor.into(),
            direction,
            aligned_edge,
            buffer,
        });
        self
    }
}

/// What a compute function can read: the bound values (in binding order) and the scene.
pub struct BindingInputs<'a> {
    pub values: &'a [f64],
    pub scene: &'a SceneGraph,
}

impl BindingInputs<'_> {
    /// Value at `index`, or a reference error if the binding has fewer sources.
    pub fn value(&self, index: usize) -> KinetexResult<f64> {
        self.values.get(index).copied().ok_or_else(|| {
            KinetexError::scene_reference(format!("binding has no source #{index}"))
        })
    }
}

/// Pure derivation of element state from bound values.
pub type ComputeFn = Arc<dyn Fn(&BindingInputs<'_>) -> KinetexResult<Derived> + Send + Sync>;

/// One element's dependency on a list of values.
#[derive(Clone)]
pub struct Binding {
    pub element: ElementId,
    pub sources: SmallVec<[ValueId; 2]>,
    pub compute: ComputeFn,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("element", &self.element)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

/// Anchor a derived element was last placed against, and the anchor's bounds at that time.
#[derive(Clone, Debug, PartialEq)]
struct AnchorEdge {
    target: Target,
    members: SmallVec<[ElementId; 2]>,
    seen: Rect,
}

/// Active bindings keyed by bound element.
///
/// Besides value sources, a binding depends on whatever its last placement anchored to. Those
/// edges are learned when the compute function runs and re-dirty the element when the anchor
/// moves.
#[derive(Clone, Debug, Default)]
pub struct BindingTable {
    bindings: BTreeMap<ElementId, Binding>,
    anchors: BTreeMap<ElementId, AnchorEdge>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, element: ElementId) -> Option<&Binding> {
        self.bindings.get(&element)
    }

    pub fn is_bound(&self, element: ElementId) -> bool {
        self.bindings.contains_key(&element)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Reject a binding of `element` on `sources` that would make `element` depend on itself.
    ///
    /// Walks tracking values back to the elements they read, then through those elements'
    /// own bindings and placement anchors.
    pub fn check_cycle(
        &self,
        element: ElementId,
        sources: &[ValueId],
        values: &ValueStore,
    ) -> KinetexResult<()> {
        let mut pending = Vec::new();
        tracked_elements(sources, values, &mut pending)?;
        self.walk_dependencies(element, pending, values)
    }

    fn walk_dependencies(
        &self,
        element: ElementId,
        mut pending: Vec<ElementId>,
        values: &ValueStore,
    ) -> KinetexResult<()> {
        let mut seen: BTreeSet<ElementId> = BTreeSet::new();
        while let Some(read) = pending.pop() {
            if read == element {
                return Err(KinetexError::binding_cycle(format!(
                    "{element} would depend on itself"
                )));
            }
            if !seen.insert(read) {
                continue;
            }
            if let Some(b) = self.bindings.get(&read) {
                tracked_elements(&b.sources, values, &mut pending)?;
            }
            if let Some(edge) = self.anchors.get(&read) {
                pending.extend(edge.members.iter().copied());
            }
        }
        Ok(())
    }

    /// Register a binding; checks for cycles and subscribes the element to its sources.
    pub(crate) fn insert(&mut self, binding: Binding, values: &mut ValueStore) -> KinetexResult<()> {
        if self.bindings.contains_key(&binding.element) {
            return Err(KinetexError::validation(format!(
                "{} is already bound; unbind it first",
                binding.element
            )));
        }
        self.check_cycle(binding.element, &binding.sources, values)?;
        for v in &binding.sources {
            values.add_dependent(*v, binding.element)?;
        }
        self.bindings.insert(binding.element, binding);
        Ok(())
    }

    /// Remove an element's binding. The element keeps its last derived state.
    pub(crate) fn remove(&mut self, element: ElementId, values: &mut ValueStore) -> Option<Binding> {
        let b = self.bindings.remove(&element)?;
        self.anchors.remove(&element);
        for v in &b.sources {
            values.remove_dependent(*v, element);
        }
        Some(b)
    }

    /// Drop every binding that reads `value` (used when the value is released).
    pub(crate) fn drop_for_value(&mut self, value: ValueId, values: &mut ValueStore) {
        let hit: Vec<ElementId> = self
            .bindings
            .values()
            .filter(|b| b.sources.contains(&value))
            .map(|b| b.element)
            .collect();
        for e in hit {
            self.remove(e, values);
        }
    }

    /// Re-run the compute function of every dirty, present element until nothing is dirty.
    ///
    /// Elements that are bound but not yet in the graph stay dirty so they are derived as
    /// soon as they are created. An element placed next to an anchor that has since moved is
    /// dirty again, so declaration order does not matter.
    pub(crate) fn recompute(
        &mut self,
        values: &mut ValueStore,
        graph: &mut SceneGraph,
    ) -> KinetexResult<()> {
        let mut deferred = BTreeSet::new();
        for _ in 0..=self.bindings.len() {
            values.refresh_tracking(graph);
            self.refresh_anchors(values, graph);
            if !values.has_dirty() {
                break;
            }
            for element in values.take_dirty() {
                let Some(binding) = self.bindings.get(&element) else {
                    continue;
                };
                if !graph.contains(element) {
                    deferred.insert(element);
                    continue;
                }
                let inputs = binding
                    .sources
                    .iter()
                    .map(|v| values.get(*v))
                    .collect::<KinetexResult<SmallVec<[f64; 2]>>>()?;
                let derived = (binding.compute)(&BindingInputs {
                    values: &inputs,
                    scene: graph,
                })?;
                let placement = derived.placement;
                let members = match placement {
                    Some(p) => {
                        let members: SmallVec<[ElementId; 2]> =
                            SmallVec::from_vec(graph.members(p.anchor)?);
                        self.walk_dependencies(element, members.to_vec(), values)?;
                        members
                    }
                    None => {
                        self.anchors.remove(&element);
                        SmallVec::new()
                    }
                };
                apply_derived(graph, element, derived)?;
                if let Some(p) = placement {
                    let edge = AnchorEdge {
                        target: p.anchor,
                        members,
                        seen: graph.target_bounds(p.anchor)?,
                    };
                    self.anchors.insert(element, edge);
                }
            }
        }
        for e in deferred {
            values.mark_dirty(e);
        }
        Ok(())
    }

    /// Dirty every present element whose anchor no longer has the bounds it was placed against.
    fn refresh_anchors(&self, values: &mut ValueStore, graph: &SceneGraph) {
        for (element, edge) in &self.anchors {
            if !graph.contains(*element) {
                continue;
            }
            if graph
                .target_bounds(edge.target)
                .is_ok_and(|now| now != edge.seen)
            {
                values.mark_dirty(*element);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> + '_ {
        self.bindings.values()
    }
}

fn tracked_elements(
    sources: &[ValueId],
    values: &ValueStore,
    out: &mut Vec<ElementId>,
) -> KinetexResult<()> {
    for v in sources {
        if let ValueSource::Tracking { element, .. } = values.entry(*v)?.source {
            out.push(element);
        }
    }
    Ok(())
}

fn apply_derived(graph: &mut SceneGraph, element: ElementId, derived: Derived) -> KinetexResult<()> {
    let el = graph.get_mut(element)?;
    if let Some(payload) = derived.payload {
        el.payload = payload;
    }
    if let Some(position) = derived.position {
        el.transform.position = position;
    }
    if let Some(opacity) = derived.opacity {
        el.opacity = opacity.clamp(0.0, 1.0);
    }
    if let Some(p) = derived.placement {
        place_next_to(graph, element, p.anchor, p.direction, p.aligned_edge, p.buffer)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/reactive/binding.rs"]
mod tests;
