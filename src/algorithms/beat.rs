use crate::{algorithms::AcExtractor, Config};

/// Sign of the filtered AC signal on the previous sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Negative,
    NonNegative,
}

/// Detects heartbeats as negative-to-positive zero crossings of the filtered
/// AC signal and converts crossing intervals into instantaneous BPM.
///
/// All state is owned by the detector instance: the filter accumulators, the
/// previous sign and the last crossing timestamp. Nothing here is reset when
/// the finger leaves the sensor; the caller simply stops feeding samples.
pub struct BeatDetector {
    filter: AcExtractor,
    phase: Phase,
    /// Millisecond timestamp of the previous zero crossing, accepted or not.
    /// Zero doubles as "no crossing seen since reset".
    last_crossing_ms: u32,
    min_interval_ms: u32,
    max_interval_ms: u32,
    min_bpm: u16,
    max_bpm: u16,
}

impl BeatDetector {
    pub fn new(config: &Config) -> Self {
        Self {
            filter: AcExtractor::new(config.dc_alpha, config.ac_alpha),
            phase: Phase::NonNegative,
            last_crossing_ms: 0,
            min_interval_ms: config.min_beat_interval_ms,
            max_interval_ms: config.max_beat_interval_ms,
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
        }
    }

    /// Resets the filter and crossing state. Initial-fill only.
    pub fn clear(&mut self) {
        self.filter.clear();
        self.phase = Phase::NonNegative;
        self.last_crossing_ms = 0;
    }

    /// Processes one IR sample. Returns the instantaneous BPM when the
    /// sample completes an accepted beat.
    ///
    /// A crossing is accepted only when a previous crossing exists as a
    /// reference and the interval maps into the plausible human range; the
    /// crossing timestamp is recorded either way so the next interval is
    /// measured from the true last crossing.
    pub fn update(&mut self, ir: u32, now_ms: u32) -> Option<u16> {
        let ac = self.filter.update(ir as f32);

        let phase = if ac < 0.0 {
            Phase::Negative
        } else {
            Phase::NonNegative
        };
        let rising = self.phase == Phase::Negative && phase == Phase::NonNegative;
        self.phase = phase;

        if !rising {
            return None;
        }

        let interval_ms = now_ms.wrapping_sub(self.last_crossing_ms);
        let armed = self.last_crossing_ms > 0;
        self.last_crossing_ms = now_ms;

        if !armed || interval_ms <= self.min_interval_ms || interval_ms >= self.max_interval_ms {
            return None;
        }

        let bpm = (60_000 / interval_ms) as u16;
        if (self.min_bpm..=self.max_bpm).contains(&bpm) {
            Some(bpm)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PERIOD_MS: u32 = 20;
    const BASELINE: u32 = 100_000;
    const SWING: u32 = 5_000;

    /// Drives the detector with a square wave of the given period starting
    /// at `start_ms`, returning (accepted BPM values, final timestamp).
    fn drive_square_wave(
        detector: &mut BeatDetector,
        period_ms: u32,
        start_ms: u32,
        cycles: u32,
    ) -> (Vec<u16>, u32) {
        let mut accepted = Vec::new();
        let mut now = start_ms;
        for _ in 0..cycles {
            for tick in 0..(period_ms / SAMPLE_PERIOD_MS) {
                let ir = if tick < period_ms / SAMPLE_PERIOD_MS / 2 {
                    BASELINE - SWING
                } else {
                    BASELINE + SWING
                };
                if let Some(bpm) = detector.update(ir, now) {
                    accepted.push(bpm);
                }
                now = now.wrapping_add(SAMPLE_PERIOD_MS);
            }
        }
        (accepted, now)
    }

    fn settled_detector() -> BeatDetector {
        let mut detector = BeatDetector::new(&Config::default());
        // Let the DC filter converge to the baseline before measuring.
        let mut now = 1;
        for _ in 0..5_000 {
            detector.update(BASELINE, now);
            now += SAMPLE_PERIOD_MS;
        }
        detector
    }

    #[test]
    fn periodic_signal_yields_in_range_bpm() {
        let mut detector = settled_detector();

        let (accepted, _) = drive_square_wave(&mut detector, 800, 200_000, 20);

        assert!(accepted.len() >= 10, "too few beats: {}", accepted.len());
        for bpm in accepted {
            // 800 ms period, allow one sample of crossing jitter.
            assert!((73..=77).contains(&bpm), "bpm {} off target", bpm);
        }
    }

    #[test]
    fn first_crossing_only_arms_the_detector() {
        let mut detector = settled_detector();

        // One full cycle produces exactly one rising crossing; with no
        // reference crossing it must not report a beat.
        let (accepted, _) = drive_square_wave(&mut detector, 800, 200_000, 1);
        assert!(accepted.is_empty());
    }

    #[test]
    fn too_slow_rhythm_is_rejected() {
        let mut detector = settled_detector();

        // 2 s between beats is below the 40 BPM floor.
        let (accepted, _) = drive_square_wave(&mut detector, 2_000, 200_000, 6);
        assert!(accepted.is_empty());
    }

    #[test]
    fn too_fast_rhythm_is_rejected() {
        let mut detector = settled_detector();

        // 240 ms period maps to 250 BPM, outside both gates.
        let (accepted, _) = drive_square_wave(&mut detector, 240, 200_000, 30);
        assert!(accepted.is_empty());
    }

    #[test]
    fn intervals_survive_millisecond_counter_wrap() {
        let mut detector = BeatDetector::new(&Config::default());

        // Settle just short of the wrap so the beats straddle it.
        let mut now = u32::MAX - 20_000;
        for _ in 0..900 {
            detector.update(BASELINE, now);
            now = now.wrapping_add(SAMPLE_PERIOD_MS);
        }

        let (accepted, _) = drive_square_wave(&mut detector, 800, now, 20);
        assert!(
            accepted.iter().any(|bpm| (73..=77).contains(bpm)),
            "no plausible beats across the wrap: {:?}",
            accepted
        );
    }
}
