//! Element shape tags.

use std::fmt;

/// The topological shape of an element, independent of its basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementShape {
    /// 1-D line element.
    Line,
    /// 2-D quadrilateral element.
    Square,
    /// 2-D triangular (simplex) element.
    Triangle,
    /// 3-D hexahedral element.
    Cube,
    /// 3-D tetrahedral (simplex) element.
    Tetrahedron,
    /// 3-D wedge, simplex in chart directions (1, 2).
    WedgeXi12,
    /// 3-D wedge, simplex in chart directions (1, 3).
    WedgeXi13,
    /// 3-D wedge, simplex in chart directions (2, 3).
    WedgeXi23,
    /// Shape not yet specified; a template with this tag preserves an
    /// existing element's shape when merged.
    Unspecified,
}

impl ElementShape {
    /// Number of chart dimensions this shape occupies, or `None` for
    /// [`ElementShape::Unspecified`].
    pub fn dimension(&self) -> Option<u32> {
        match self {
            Self::Line => Some(1),
            Self::Square | Self::Triangle => Some(2),
            Self::Cube | Self::Tetrahedron | Self::WedgeXi12 | Self::WedgeXi13 | Self::WedgeXi23 => {
                Some(3)
            }
            Self::Unspecified => None,
        }
    }

    /// Number of local nodes a linear element of this shape has.
    pub fn linear_node_count(&self) -> Option<u32> {
        match self {
            Self::Line => Some(2),
            Self::Square => Some(4),
            Self::Triangle => Some(3),
            Self::Cube => Some(8),
            Self::Tetrahedron => Some(4),
            Self::WedgeXi12 | Self::WedgeXi13 | Self::WedgeXi23 => Some(6),
            Self::Unspecified => None,
        }
    }
}

impl fmt::Display for ElementShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Line => "line",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Cube => "cube",
            Self::Tetrahedron => "tetrahedron",
            Self::WedgeXi12 => "wedge_xi1_xi2",
            Self::WedgeXi13 => "wedge_xi1_xi3",
            Self::WedgeXi23 => "wedge_xi2_xi3",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_has_no_dimension() {
        assert_eq!(ElementShape::Unspecified.dimension(), None);
        assert_eq!(ElementShape::Unspecified.linear_node_count(), None);
    }

    #[test]
    fn square_is_2d_with_4_nodes() {
        assert_eq!(ElementShape::Square.dimension(), Some(2));
        assert_eq!(ElementShape::Square.linear_node_count(), Some(4));
    }
}
