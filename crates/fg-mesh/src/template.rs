//! Element templates: the prototype definition used to create or modify
//! elements.

use crate::basis::ElementBasis;
use crate::error::MeshError;
use crate::shape::ElementShape;
use fg_core::FieldId;
use indexmap::IndexMap;

/// Identifier of a scale-factor set referenced by an element template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleFactorSetId(pub u32);

/// What a nodal value represents: the field value itself, or one of its
/// parametric derivatives, carried alongside a version number and an
/// optional scale-factor index into the element's scale-factor sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodalValueDescriptor {
    /// `0` for the plain value, `1..` for successive derivative tags
    /// (`d/ds1`, `d/ds2`, `d2/ds1ds2`, ...); the exact numbering is a
    /// field-type concern and not specified further here.
    pub value_tag: u32,
    /// Which version of this nodal value (for multi-valued nodes shared by
    /// several elements with different versions).
    pub version: u32,
    /// Index into the element's scale-factor sets, if this nodal value is
    /// scaled.
    pub scale_factor_index: Option<u32>,
}

/// Per-component element-field definition: the basis used to interpolate
/// this component, how many of the element's local nodes contribute, which
/// local nodes they are, and the nodal value descriptor list for each.
#[derive(Debug, Clone)]
pub struct ElementFieldComponent {
    basis: ElementBasis,
    local_node_indices: Vec<u32>,
    nodal_values: Vec<Vec<NodalValueDescriptor>>,
}

impl ElementFieldComponent {
    /// Construct a component definition.
    ///
    /// `nodal_values[i]` is the list of nodal-value descriptors attached to
    /// `local_node_indices[i]`; the two slices must have equal length.
    pub fn new(
        basis: ElementBasis,
        local_node_indices: Vec<u32>,
        nodal_values: Vec<Vec<NodalValueDescriptor>>,
    ) -> Result<Self, MeshError> {
        if local_node_indices.len() != nodal_values.len() {
            return Err(MeshError::InvalidElementField {
                reason: format!(
                    "{} local node indices but {} nodal value lists",
                    local_node_indices.len(),
                    nodal_values.len()
                ),
            });
        }
        Ok(Self { basis, local_node_indices, nodal_values })
    }

    /// The basis used to interpolate this component.
    pub fn basis(&self) -> &ElementBasis {
        &self.basis
    }

    /// Local node indices contributing to this component, in basis order.
    pub fn local_node_indices(&self) -> &[u32] {
        &self.local_node_indices
    }

    /// Nodal value descriptors, one list per entry of
    /// [`local_node_indices`](Self::local_node_indices).
    pub fn nodal_values(&self) -> &[Vec<NodalValueDescriptor>] {
        &self.nodal_values
    }
}

/// The validated, prototype-producing shape of an [`ElementTemplate`].
///
/// Cached on the template and invalidated whenever the shape changes;
/// `validate()` must be idempotent, which this satisfies by
/// short-circuiting when a prototype for the current shape already
/// exists.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Prototype {
    shape: ElementShape,
    local_node_count: u32,
}

/// Prototype element definition: shape, local node count, scale-factor
/// sets, and per-(field, component) element-field definitions.
#[derive(Debug, Clone)]
pub struct ElementTemplate {
    shape: ElementShape,
    local_node_count: u32,
    scale_factor_sets: IndexMap<ScaleFactorSetId, u32>,
    components: IndexMap<(FieldId, usize), ElementFieldComponent>,
    prototype: Option<Prototype>,
}

impl ElementTemplate {
    /// Construct an empty template with the given shape and local node
    /// count. `shape` may be [`ElementShape::Unspecified`], in which case
    /// merging this template into an existing element preserves that
    /// element's shape.
    pub fn new(shape: ElementShape, local_node_count: u32) -> Self {
        Self {
            shape,
            local_node_count,
            scale_factor_sets: IndexMap::new(),
            components: IndexMap::new(),
            prototype: None,
        }
    }

    /// This template's shape tag.
    pub fn shape(&self) -> ElementShape {
        self.shape
    }

    /// Number of local nodes declared on this template.
    pub fn local_node_count(&self) -> u32 {
        self.local_node_count
    }

    /// Set or clear a scale-factor set's count.
    ///
    /// Write-once per set: once a non-zero count has been set for `set`, a
    /// different non-zero count is rejected. Setting the count to zero
    /// removes the set.
    pub fn set_scale_factor_set(&mut self, set: ScaleFactorSetId, count: u32) -> Result<(), MeshError> {
        if count == 0 {
            self.scale_factor_sets.shift_remove(&set);
            return Ok(());
        }
        if let Some(existing) = self.scale_factor_sets.get(&set) {
            if *existing != count {
                return Err(MeshError::ScaleFactorSetConflict {
                    set: set.0,
                    existing: *existing,
                    attempted: count,
                });
            }
            return Ok(());
        }
        self.scale_factor_sets.insert(set, count);
        Ok(())
    }

    /// Current scale-factor-set counts.
    pub fn scale_factor_sets(&self) -> impl Iterator<Item = (ScaleFactorSetId, u32)> + '_ {
        self.scale_factor_sets.iter().map(|(k, v)| (*k, *v))
    }

    /// Define (or replace) one field component's element-field definition.
    /// Invalidates the cached prototype: a new component definition must
    /// be re-validated.
    pub fn define_component(&mut self, field: FieldId, component: usize, def: ElementFieldComponent) {
        self.components.insert((field, component), def);
        self.prototype = None;
    }

    /// Look up a defined component.
    pub fn component(&self, field: FieldId, component: usize) -> Option<&ElementFieldComponent> {
        self.components.get(&(field, component))
    }

    /// Validate the template, producing (or reusing) its cached prototype.
    ///
    /// Idempotent: calling this repeatedly without an intervening shape or
    /// component change returns without recomputing.
    pub fn validate(&mut self) -> Result<(), MeshError> {
        if let Some(proto) = &self.prototype {
            if proto.shape == self.shape && proto.local_node_count == self.local_node_count {
                return Ok(());
            }
        }
        for ((field, component), def) in &self.components {
            for &node in &def.local_node_indices {
                if node >= self.local_node_count {
                    return Err(MeshError::InvalidElementField {
                        reason: format!(
                            "component {component} of field {field} references local node {node} but template has {} nodes",
                            self.local_node_count
                        ),
                    });
                }
            }
        }
        self.prototype = Some(Prototype { shape: self.shape, local_node_count: self.local_node_count });
        Ok(())
    }

    /// Whether `validate` has produced a prototype for the current shape
    /// and node count.
    pub fn is_validated(&self) -> bool {
        self.prototype
            .as_ref()
            .is_some_and(|p| p.shape == self.shape && p.local_node_count == self.local_node_count)
    }

    /// Overlay `incoming` onto `self` (used when merging a template into an
    /// existing element): incoming components replace same-keyed existing
    /// ones, an unspecified incoming shape leaves `self.shape` untouched.
    pub(crate) fn merge_from(&mut self, incoming: ElementTemplate) {
        if incoming.shape != ElementShape::Unspecified {
            self.shape = incoming.shape;
            self.local_node_count = incoming.local_node_count;
        }
        for (key, def) in incoming.components {
            self.components.insert(key, def);
        }
        for (set, count) in incoming.scale_factor_sets {
            self.scale_factor_sets.insert(set, count);
        }
        self.prototype = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::BasisFunctionType;

    fn linear_line_basis() -> ElementBasis {
        ElementBasis::new(vec![BasisFunctionType::LinearLagrange]).unwrap()
    }

    #[test]
    fn validate_is_idempotent() {
        let mut t = ElementTemplate::new(ElementShape::Line, 2);
        t.validate().unwrap();
        assert!(t.is_validated());
        t.validate().unwrap();
        assert!(t.is_validated());
    }

    #[test]
    fn defining_a_component_invalidates_prototype() {
        let mut t = ElementTemplate::new(ElementShape::Line, 2);
        t.validate().unwrap();
        assert!(t.is_validated());
        let def = ElementFieldComponent::new(
            linear_line_basis(),
            vec![0, 1],
            vec![
                vec![NodalValueDescriptor { value_tag: 0, version: 0, scale_factor_index: None }],
                vec![NodalValueDescriptor { value_tag: 0, version: 0, scale_factor_index: None }],
            ],
        )
        .unwrap();
        t.define_component(FieldId(1), 0, def);
        assert!(!t.is_validated());
        t.validate().unwrap();
        assert!(t.is_validated());
    }

    #[test]
    fn out_of_range_local_node_is_rejected() {
        let mut t = ElementTemplate::new(ElementShape::Line, 2);
        let def = ElementFieldComponent::new(
            linear_line_basis(),
            vec![0, 5],
            vec![
                vec![NodalValueDescriptor { value_tag: 0, version: 0, scale_factor_index: None }],
                vec![NodalValueDescriptor { value_tag: 0, version: 0, scale_factor_index: None }],
            ],
        )
        .unwrap();
        t.define_component(FieldId(1), 0, def);
        assert!(t.validate().is_err());
    }

    #[test]
    fn scale_factor_set_write_once_per_set() {
        let mut t = ElementTemplate::new(ElementShape::Line, 2);
        t.set_scale_factor_set(ScaleFactorSetId(1), 2).unwrap();
        assert!(t.set_scale_factor_set(ScaleFactorSetId(1), 3).is_err());
        t.set_scale_factor_set(ScaleFactorSetId(1), 2).unwrap();
        t.set_scale_factor_set(ScaleFactorSetId(1), 0).unwrap();
        assert_eq!(t.scale_factor_sets().count(), 0);
    }

    #[test]
    fn unspecified_shape_merge_preserves_existing_shape() {
        let mut existing = ElementTemplate::new(ElementShape::Square, 4);
        let incoming = ElementTemplate::new(ElementShape::Unspecified, 4);
        existing.merge_from(incoming);
        assert_eq!(existing.shape(), ElementShape::Square);
    }
}
