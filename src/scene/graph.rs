use std::collections::BTreeMap;

use crate::foundation::core::{Point, Rect, Vec2};
use crate::foundation::error::{KinetexError, KinetexResult};
use crate::foundation::ids::{ElementId, GroupId};
use crate::scene::element::SceneElement;
use crate::scene::payload::Payload;

/// Stacking rule recorded on a group by `arrange`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StackLayout {
    pub direction: Vec2,
    pub aligned_edge: Vec2,
    pub buffer: f64,
}

/// Ordered set of element references with an optional stacking rule.
///
/// A group never caches geometry; its bounds are the union of its members' current bounds,
/// computed on every query.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub id: GroupId,
    pub members: Vec<ElementId>,
    pub layout: Option<StackLayout>,
}

/// Layout/step target: a single element or a whole group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Element(ElementId),
    Group(GroupId),
}

impl From<ElementId> for Target {
    fn from(value: ElementId) -> Self {
        Self::Element(value)
    }
}

impl From<GroupId> for Target {
    fn from(value: GroupId) -> Self {
        Self::Group(value)
    }
}

/// Elements in paint order plus the groups that reference them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
    elements: BTreeMap<ElementId, SceneElement>,
    order: Vec<ElementId>,
    groups: BTreeMap<GroupId, Group>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element on top of the paint order.
    pub fn insert(&mut self, element: SceneElement) -> KinetexResult<()> {
        if self.elements.contains_key(&element.id) {
            return Err(KinetexError::validation(format!(
                "{} is already in the scene",
                element.id
            )));
        }
        self.order.push(element.id);
        self.elements.insert(element.id, element);
        Ok(())
    }

    /// Remove an element; its group memberships are left untouched (groups are weak).
    pub fn remove(&mut self, id: ElementId) -> KinetexResult<SceneElement> {
        let el = self
            .elements
            .remove(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not in the scene")))?;
        self.order.retain(|e| *e != id);
        Ok(el)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> KinetexResult<&SceneElement> {
        self.elements
            .get(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not in the scene")))
    }

    pub fn get_mut(&mut self, id: ElementId) -> KinetexResult<&mut SceneElement> {
        self.elements
            .get_mut(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("{id} is not in the scene")))
    }

    /// Elements in paint order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneElement> + '_ {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id, group);
    }

    pub fn group(&self, id: GroupId) -> KinetexResult<&Group> {
        self.groups
            .get(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("unknown {id}")))
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> KinetexResult<&mut Group> {
        self.groups
            .get_mut(&id)
            .ok_or_else(|| KinetexError::scene_reference(format!("unknown {id}")))
    }

    /// Copy group definitions (not members' elements) from another graph.
    pub(crate) fn with_groups_of(mut self, other: &SceneGraph) -> Self {
        self.groups = other.groups.clone();
        self
    }

    /// Member ids of a target, in declaration order.
    pub fn members(&self, target: Target) -> KinetexResult<Vec<ElementId>> {
        match target {
            Target::Element(id) => {
                self.get(id)?;
                Ok(vec![id])
            }
            Target::Group(gid) => Ok(self.group(gid)?.members.clone()),
        }
    }

    /// Bounding box of an element.
    pub fn bounds(&self, id: ElementId) -> KinetexResult<Rect> {
        Ok(self.get(id)?.bounds())
    }

    /// Union of the current bounds of the group's members that are present in this graph.
    pub fn group_bounds(&self, id: GroupId) -> KinetexResult<Rect> {
        let group = self.group(id)?;
        let mut out: Option<Rect> = None;
        for m in &group.members {
            if let Some(el) = self.elements.get(m) {
                let b = el.bounds();
                out = Some(match out {
                    Some(r) => r.union(b),
                    None => b,
                });
            }
        }
        out.ok_or_else(|| {
            KinetexError::scene_reference(format!("{id} has no members in the scene"))
        })
    }

    pub fn target_bounds(&self, target: Target) -> KinetexResult<Rect> {
        match target {
            Target::Element(id) => self.bounds(id),
            Target::Group(gid) => self.group_bounds(gid),
        }
    }

    /// Scene position of data coordinates `(x, y)` on an axes element.
    pub fn coords_to_point(&self, axes: ElementId, x: f64, y: f64) -> KinetexResult<Point> {
        let el = self.get(axes)?;
        let Payload::Axes(a) = &el.payload else {
            return Err(KinetexError::validation(format!(
                "{axes} is a {}, not axes",
                el.payload.kind_name()
            )));
        };
        let local = a.coords_to_local(x, y).to_vec2() * el.transform.scale;
        Ok(el.transform.position + local)
    }

    /// Translate every member of a target.
    pub fn shift(&mut self, target: Target, delta: Vec2) -> KinetexResult<()> {
        for id in self.members(target)? {
            if let Some(el) = self.elements.get_mut(&id) {
                el.transform.position += delta;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
