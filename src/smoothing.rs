//! Moving-average smoothing for accepted scalar estimates.

use crate::sliding::SlidingWindow;

/// Ring of recently accepted estimates with a count-based validity gate.
///
/// The mean is taken over the entries written so far, so the output is live
/// (if not yet trustworthy) before the ring saturates and becomes a true
/// fixed-window moving average afterwards. `average` reports `None` until at
/// least `min_samples` estimates have been accepted.
pub struct Smoother<C> {
    history: SlidingWindow<u16, C>,
    min_samples: usize,
}

impl<C> Smoother<C>
where
    C: AsRef<[u16]> + AsMut<[u16]>,
{
    pub fn new(history: C, min_samples: usize) -> Self {
        Self {
            history: SlidingWindow::new(history),
            min_samples,
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn push(&mut self, estimate: u16) {
        self.history.push(estimate);
    }

    pub fn average(&self) -> Option<u16> {
        let count = self.history.len();
        if count < self.min_samples {
            return None;
        }

        let sum: u32 = self.history.iter_unordered().map(u32::from).sum();
        Some((sum / count as u32) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_until_minimum_sample_count() {
        let mut smoother = Smoother::new([0u16; 8], 3);

        smoother.push(72);
        assert_eq!(smoother.average(), None);
        smoother.push(74);
        assert_eq!(smoother.average(), None);
        smoother.push(76);
        assert_eq!(smoother.average(), Some(74));
    }

    #[test]
    fn averages_over_written_entries_before_saturation() {
        let mut smoother = Smoother::new([0u16; 8], 2);

        smoother.push(95);
        smoother.push(97);
        // (95 + 97) / 2, the six untouched slots do not participate.
        assert_eq!(smoother.average(), Some(96));
    }

    #[test]
    fn saturated_ring_is_a_fixed_window() {
        let mut smoother = Smoother::new([0u16; 3], 3);

        for estimate in [60, 60, 60, 90, 90, 90] {
            smoother.push(estimate);
        }
        // Only the newest three survive.
        assert_eq!(smoother.average(), Some(90));
    }

    #[test]
    fn clear_restarts_the_validity_gate() {
        let mut smoother = Smoother::new([0u16; 4], 2);

        smoother.push(80);
        smoother.push(82);
        assert!(smoother.average().is_some());

        smoother.clear();
        assert_eq!(smoother.average(), None);
    }
}
