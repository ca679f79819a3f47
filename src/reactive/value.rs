use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;

use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, ValueId};
use crate::scene::graph::SceneGraph;

/// Coordinate read by a tracking value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// Where a reactive value gets its scalar from.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ValueSource {
    /// Stored scalar, changed only by `set` (and therefore by transform steps).
    Scalar,
    /// Mirrors one coordinate of an element's current position.
    Tracking { element: ElementId, axis: Axis },
}

/// A scalar with a list of dependent elements.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactiveValue {
    pub id: ValueId,
    pub source: ValueSource,
    pub current: f64,
    pub dependents: SmallVec<[ElementId; 4]>,
}

/// All live reactive values plus the set of elements awaiting recomputation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueStore {
    values: BTreeMap<ValueId, ReactiveValue>,
    dirty: BTreeSet<ElementId>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: ValueId, source: ValueSource, initial: f64) {
        self.values.insert(
            id,
            ReactiveValue {
                id,
                source,
                current: initial,
                dependents: SmallVec::new(),
            },
        );
    }

    pub fn contains(&self, id: ValueId) -> bool {
        self.values.contains_key(&id)
    }

    pub fn entry(&self, id: ValueId) -> KinetexResult<&ReactiveValue> {
        self.values
            .get(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not live")))
    }

    /// Current scalar of a value.
    pub fn get(&self, id: ValueId) -> KinetexResult<f64> {
        Ok(self.entry(id)?.current)
    }

    /// Store a new scalar and mark every dependent dirty. Does not recompute anything.
    pub fn set(&mut self, id: ValueId, x: f64) -> KinetexResult<()> {
        if !x.is_finite() {
            return Err(KinetexError::validation(format!(
                "{id} cannot be set to non-finite {x}"
            )));
        }
        let v = self
            .values
            .get_mut(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not live")))?;
        if let ValueSource::Tracking { element, .. } = v.source {
            return Err(KinetexError::validation(format!(
                "{id} tracks {element} and cannot be set directly"
            )));
        }
        v.current = x;
        self.dirty.extend(v.dependents.iter().copied());
        Ok(())
    }

    pub(crate) fn add_dependent(&mut self, id: ValueId, element: ElementId) -> KinetexResult<()> {
        let v = self
            .values
            .get_mut(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not live")))?;
        if !v.dependents.contains(&element) {
            v.dependents.push(element);
        }
        self.dirty.insert(element);
        Ok(())
    }

    pub(crate) fn remove_dependent(&mut self, id: ValueId, element: ElementId) {
        if let Some(v) = self.values.get_mut(&id) {
            v.dependents.retain(|e| *e != element);
        }
    }

    pub(crate) fn mark_dirty(&mut self, element: ElementId) {
        self.dirty.insert(element);
    }

    pub(crate) fn take_dirty(&mut self) -> BTreeSet<ElementId> {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_dirty(&self, element: ElementId) -> bool {
        self.dirty.contains(&element)
    }

    pub(crate) fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drop a value; returns the elements that depended on it.
    pub(crate) fn release(&mut self, id: ValueId) -> KinetexResult<SmallVec<[ElementId; 4]>> {
        let v = self
            .values
            .remove(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not live")))?;
        Ok(v.dependents)
    }

    /// Re-read every tracking value from the graph; changed values dirty their dependents.
    ///
    /// A tracked element that is not in the graph keeps its last value.
    pub(crate) fn refresh_tracking(&mut self, graph: &SceneGraph) {
        for v in self.values.values_mut() {
            let ValueSource::Tracking { element, axis } = v.source else {
                continue;
            };
            let Ok(el) = graph.get(element) else {
                continue;
            };
            let p = el.transform.position;
            let now = match axis {
                Axis::X => p.x,
                Axis::Y => p.y,
            };
            if now != v.current {
                v.current = now;
                self.dirty.extend(v.dependents.iter().copied());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReactiveValue> + '_ {
        self.values.values()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/reactive/value.rs"]
mod tests;
