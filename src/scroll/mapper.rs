use crate::foundation::core::unit_clamp;

/// Maps normalized scroll progress to a frame index and suppresses redundant redraws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressMapper {
    total: usize,
    current: usize,
}

impl ProgressMapper {
    /// A mapper over `total` frames, starting at frame 0.
    pub fn new(total: usize) -> Self {
        Self { total, current: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// `round(p * (total - 1))`, with `p` clamped to `[0, 1]`.
    pub fn index_for(&self, progress: f64) -> usize {
        if self.total <= 1 {
            return 0;
        }
        let last = (self.total - 1) as f64;
        (unit_clamp(progress) * last).round() as usize
    }

    /// Record `progress` and return the new index only if it differs from the current one.
    pub fn update(&mut self, progress: f64) -> Option<usize> {
        let idx = self.index_for(progress);
        if idx == self.current {
            return None;
        }
        self.current = idx;
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_endpoints_and_midpoint() {
        let m = ProgressMapper::new(242);
        assert_eq!(m.index_for(0.0), 0);
        assert_eq!(m.index_for(1.0), 241);
        assert_eq!(m.index_for(0.5), 121);
    }

    #[test]
    fn every_progress_maps_into_range() {
        for total in [1usize, 2, 3, 242] {
            let m = ProgressMapper::new(total);
            for i in 0..=1000 {
                let p = f64::from(i) / 1000.0;
                let idx = m.index_for(p);
                assert!(idx < total);
                assert_eq!(idx, (p * (total - 1) as f64).round() as usize);
            }
        }
    }

    #[test]
    fn out_of_domain_progress_is_clamped() {
        let m = ProgressMapper::new(10);
        assert_eq!(m.index_for(-3.0), 0);
        assert_eq!(m.index_for(7.0), 9);
        assert_eq!(m.index_for(f64::NAN), 0);
    }

    #[test]
    fn update_reports_only_changes() {
        let mut m = ProgressMapper::new(5);
        assert_eq!(m.update(0.0), None);
        assert_eq!(m.update(0.1), None);
        assert_eq!(m.update(0.2), Some(1));
        assert_eq!(m.update(0.26), None);
        assert_eq!(m.update(1.0), Some(4));
        assert_eq!(m.current(), 4);
    }

    #[test]
    fn thousand_events_over_five_indices_yield_five_changes() {
        let mut m = ProgressMapper::new(5);
        let changes = (1..=1000)
            .filter_map(|i| m.update(f64::from(i) / 1000.0))
            .count();
        // Starts at 0, so only indices 1..=4 are changes.
        assert_eq!(changes, 4);
    }
}
