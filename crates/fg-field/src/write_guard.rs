//! Debug-mode write coverage tracking for the finite-difference
//! derivative's canonical output layout.
//!
//! [`DerivativeWriteGuard`] wraps the `[component][lower-terms][d]` output
//! buffer and, in debug builds, tracks which cells have been written. On
//! drop it logs a `tracing` warning if coverage is incomplete. Release
//! builds pay zero overhead.

use fg_core::FieldId;

/// Guard that tracks write coverage for one derivative cache's canonical
/// layout during finite-difference evaluation.
pub struct DerivativeWriteGuard<'a> {
    data: &'a mut [f64],
    #[cfg(debug_assertions)]
    written: Vec<bool>,
    #[cfg(debug_assertions)]
    field_id: FieldId,
}

impl<'a> DerivativeWriteGuard<'a> {
    /// Wrap a mutable derivative-cache buffer. `field_id` is used for the
    /// diagnostic in debug builds.
    pub fn new(
        data: &'a mut [f64],
        #[cfg_attr(not(debug_assertions), allow(unused_variables))] field_id: FieldId,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            written: vec![false; data.len()],
            #[cfg(debug_assertions)]
            field_id,
            data,
        }
    }

    /// Write a single value at the given flat index.
    pub fn write_at(&mut self, index: usize, value: f64) {
        self.data[index] = value;
        #[cfg(debug_assertions)]
        {
            self.written[index] = true;
        }
    }

    /// Number of cells in the buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fraction of cells written (always `1.0` in release builds).
    pub fn coverage(&self) -> f64 {
        #[cfg(debug_assertions)]
        {
            if self.data.is_empty() {
                return 1.0;
            }
            let count = self.written.iter().filter(|&&b| b).count();
            count as f64 / self.data.len() as f64
        }
        #[cfg(not(debug_assertions))]
        {
            1.0
        }
    }
}

#[cfg(debug_assertions)]
impl Drop for DerivativeWriteGuard<'_> {
    fn drop(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let total = self.written.len();
        let count = self.written.iter().filter(|&&b| b).count();
        if count < total {
            tracing::warn!(
                field = %self.field_id,
                written = count,
                total,
                coverage_pct = (count as f64 / total as f64) * 100.0,
                "finite-difference derivative layout incomplete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_coverage_reports_one() {
        let mut buf = [0.0; 4];
        let mut guard = DerivativeWriteGuard::new(&mut buf, FieldId(1));
        for i in 0..4 {
            guard.write_at(i, i as f64);
        }
        assert_eq!(guard.coverage(), 1.0);
    }

    #[test]
    fn partial_coverage_is_reported() {
        let mut buf = [0.0; 4];
        let mut guard = DerivativeWriteGuard::new(&mut buf, FieldId(1));
        guard.write_at(0, 1.0);
        assert_eq!(guard.coverage(), 0.25);
    }

    #[test]
    fn empty_buffer_is_always_fully_covered() {
        let mut buf: [f64; 0] = [];
        let guard = DerivativeWriteGuard::new(&mut buf, FieldId(1));
        assert_eq!(guard.coverage(), 1.0);
    }
}
