/// Separates the raw IR signal into its DC baseline and pulsatile AC
/// component using two cascaded exponential low-pass filters.
///
/// A slow filter (small alpha) tracks the ambient/tissue baseline; the
/// residual is the heartbeat-synchronous ripple, which a second, faster
/// filter smooths before zero-crossing detection. Two time constants do the
/// job of a band-pass without any transform work.
pub struct AcExtractor {
    dc: f32,
    ac: f32,
    dc_alpha: f32,
    ac_alpha: f32,
}

impl AcExtractor {
    pub fn new(dc_alpha: f32, ac_alpha: f32) -> Self {
        Self {
            dc: 0.0,
            ac: 0.0,
            dc_alpha,
            ac_alpha,
        }
    }

    /// Resets both accumulators. Only called from the initial-fill routine;
    /// a finger lift must not reset filter state.
    pub fn clear(&mut self) {
        self.dc = 0.0;
        self.ac = 0.0;
    }

    /// Feeds one raw IR count, returning the filtered AC value.
    pub fn update(&mut self, ir: f32) -> f32 {
        self.dc = lerp(ir, self.dc, self.dc_alpha);
        self.ac = lerp(ir - self.dc, self.ac, self.ac_alpha);
        self.ac
    }
}

fn lerp(current: f32, previous: f32, alpha: f32) -> f32 {
    alpha * current + (1.0 - alpha) * previous
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dc_converges_to_constant_input() {
        let mut filter = AcExtractor::new(0.02, 0.3);

        let mut ac = 0.0;
        for _ in 0..2000 {
            ac = filter.update(100_000.0);
        }

        // Once the baseline has settled, a constant signal has no AC left.
        assert!(ac.abs() < 1.0, "residual AC {} too large", ac);
    }

    #[test]
    fn ac_tracks_the_ripple_not_the_baseline() {
        let mut filter = AcExtractor::new(0.02, 0.3);

        // Settle on the baseline first.
        for _ in 0..2000 {
            filter.update(100_000.0);
        }

        // A step above the baseline shows up in AC almost immediately.
        let ac = filter.update(104_000.0);
        assert!(ac > 500.0, "step barely visible in AC: {}", ac);
    }

    #[test]
    fn clear_zeroes_the_accumulators() {
        let mut filter = AcExtractor::new(0.02, 0.3);

        for _ in 0..100 {
            filter.update(80_000.0);
        }
        filter.clear();

        // After a reset the first sample is treated like a cold start.
        let ac = filter.update(80_000.0);
        let expected = 0.3 * (80_000.0 - 0.02 * 80_000.0);
        assert!((ac - expected).abs() < 1e-3);
    }
}
