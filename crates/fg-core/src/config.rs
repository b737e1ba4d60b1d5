//! The one ambient configuration record: per-region tunables that are
//! properties of a region rather than hard-coded constants.

/// Construction-time configuration for one region's field manager and
/// finite-difference fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    /// Step size `h` used by the finite-difference mesh-chart derivative.
    /// `1e-5` gives an `O(h^2)` central-difference error bound that is
    /// negligible against typical mesh-chart scales.
    pub finite_difference_mesh_step: f64,
    /// Separator inserted between an auto-uniquified name's stem and its
    /// integer suffix. Empty string gives the conventional `"temp1"`,
    /// `"temp2"` naming.
    pub name_uniquify_separator: String,
    /// Stem used when a field is added with an empty name.
    pub default_name_stem: String,
    /// Initial capacity hint for the field manager's registries.
    pub initial_manager_capacity: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            finite_difference_mesh_step: 1e-5,
            name_uniquify_separator: String::new(),
            default_name_stem: "temp".to_string(),
            initial_manager_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_plain_temp_n_naming() {
        let cfg = RegionConfig::default();
        assert_eq!(cfg.default_name_stem, "temp");
        assert_eq!(cfg.name_uniquify_separator, "");
        assert_eq!(cfg.finite_difference_mesh_step, 1e-5);
    }
}
