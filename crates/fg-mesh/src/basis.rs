//! Element basis: per-chart-coordinate interpolation tag, with simplex
//! linking validation and node/function counting delegated to an
//! underlying finite-element basis table.

use crate::error::MeshError;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Basis function family for one chart coordinate direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasisFunctionType {
    /// Constant (single value, no interpolation) along this direction.
    Constant,
    /// Linear Lagrange interpolation (2 nodes).
    LinearLagrange,
    /// Quadratic Lagrange interpolation (3 nodes).
    QuadraticLagrange,
    /// Cubic Lagrange interpolation (4 nodes).
    CubicLagrange,
    /// Linear simplex interpolation; must be linked with another simplex
    /// direction.
    LinearSimplex,
    /// Quadratic simplex interpolation; must be linked with another
    /// simplex direction.
    QuadraticSimplex,
    /// Cubic Hermite interpolation (2 nodes, value + derivative each).
    CubicHermite,
}

impl BasisFunctionType {
    /// Number of 1-D interpolation nodes this tag contributes along its own
    /// direction, ignoring simplex linking (the node count used to build a
    /// [`BasisSignature`]).
    fn signature_code(&self) -> u32 {
        match self {
            Self::Constant => 0,
            Self::LinearLagrange => 1,
            Self::QuadraticLagrange => 2,
            Self::CubicLagrange => 3,
            Self::LinearSimplex => 4,
            Self::QuadraticSimplex => 5,
            Self::CubicHermite => 6,
        }
    }

    fn is_simplex(&self) -> bool {
        matches!(self, Self::LinearSimplex | Self::QuadraticSimplex)
    }

    /// 1-D node count along this direction, used by the non-simplex node
    /// count computation.
    fn node_count_1d(&self) -> u32 {
        match self {
            Self::Constant => 1,
            Self::LinearLagrange | Self::CubicHermite => 2,
            Self::QuadraticLagrange => 3,
            Self::CubicLagrange => 4,
            // Simplex node counts depend on the linked group, handled
            // separately in `ElementBasis::node_count`.
            Self::LinearSimplex | Self::QuadraticSimplex => 0,
        }
    }
}

/// A "basis signature": the integer sequence of per-direction basis codes
/// used to look up or create a shared finite-element basis description.
///
/// Two [`ElementBasis`] values with the same signature share the same node
/// count, function count and simplex linkage, so the signature table only
/// ever grows, never mutates an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasisSignature(Vec<u32>);

#[derive(Debug, Clone)]
struct FeBasisInfo {
    node_count: u32,
    function_count: u32,
}

fn basis_table() -> &'static Mutex<HashMap<BasisSignature, FeBasisInfo>> {
    static TABLE: OnceLock<Mutex<HashMap<BasisSignature, FeBasisInfo>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// An element basis: one [`BasisFunctionType`] per chart coordinate
/// direction, with simplex-linking validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementBasis {
    tags: Vec<BasisFunctionType>,
}

impl ElementBasis {
    /// Construct and validate a basis from its per-direction tags.
    ///
    /// Rejects an empty basis and any simplex tag that appears on exactly
    /// one chart direction (a single simplex direction is invalid; simplex
    /// tags of matching type on two or more directions are *linked*).
    pub fn new(tags: Vec<BasisFunctionType>) -> Result<Self, MeshError> {
        if tags.is_empty() {
            return Err(MeshError::EmptyBasis);
        }
        for (axis, tag) in tags.iter().enumerate() {
            if tag.is_simplex() {
                let linked = tags.iter().filter(|t| *t == tag).count();
                if linked < 2 {
                    return Err(MeshError::UnlinkedSimplexDirection { axis });
                }
            }
        }
        Ok(Self { tags })
    }

    /// Number of chart dimensions this basis spans.
    pub fn dimension(&self) -> usize {
        self.tags.len()
    }

    /// The basis tag for one chart direction.
    pub fn tag(&self, axis: usize) -> Option<BasisFunctionType> {
        self.tags.get(axis).copied()
    }

    /// The basis signature used to look up the shared node/function count
    /// table.
    pub fn signature(&self) -> BasisSignature {
        BasisSignature(self.tags.iter().map(BasisFunctionType::signature_code).collect())
    }

    /// Number of local nodes, delegating to the underlying finite-element
    /// basis table, creating an entry on first use of this signature.
    pub fn node_count(&self) -> u32 {
        self.lookup_or_create().node_count
    }

    /// Number of interpolation functions (degrees of freedom per
    /// component), delegating to the same table.
    pub fn function_count(&self) -> u32 {
        self.lookup_or_create().function_count
    }

    fn lookup_or_create(&self) -> FeBasisInfo {
        let sig = self.signature();
        let mut table = basis_table().lock().expect("basis table poisoned");
        table
            .entry(sig)
            .or_insert_with(|| self.compute_node_and_function_counts())
            .clone()
    }

    fn compute_node_and_function_counts(&self) -> FeBasisInfo {
        // Group directions that share an identical simplex tag; each group
        // of `k` linked linear-simplex directions contributes `k + 1` nodes
        // (a k-simplex), each quadratic-simplex group contributes the
        // second-order count.
        let mut visited = vec![false; self.tags.len()];
        let mut node_count: u64 = 1;
        for (i, tag) in self.tags.iter().enumerate() {
            if visited[i] {
                continue;
            }
            if tag.is_simplex() {
                let group_len = self.tags.iter().filter(|t| *t == tag).count();
                for (j, other) in self.tags.iter().enumerate() {
                    if other == tag {
                        visited[j] = true;
                    }
                }
                let per_group_nodes = match tag {
                    BasisFunctionType::LinearSimplex => group_len as u64 + 1,
                    BasisFunctionType::QuadraticSimplex => {
                        let n = group_len as u64 + 1;
                        n * (n + 1) / 2
                    }
                    _ => unreachable!(),
                };
                node_count *= per_group_nodes;
            } else {
                visited[i] = true;
                node_count *= tag.node_count_1d() as u64;
            }
        }
        // Every node contributes exactly one degree of freedom per
        // component except cubic Hermite, which contributes two (value and
        // derivative) per node along that direction.
        let hermite_multiplier: u64 =
            self.tags.iter().map(|tag| if matches!(tag, BasisFunctionType::CubicHermite) { 2 } else { 1 }).product();
        FeBasisInfo {
            node_count: node_count as u32,
            function_count: (node_count * hermite_multiplier) as u32,
        }
    }
}
