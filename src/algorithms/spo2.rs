use crate::{source::RawSample, Config};

/// Per-channel DC (window mean) and AC (peak-to-peak) statistics over one
/// sample window.
///
/// Peak-to-peak is a deliberately cheap stand-in for the true AC amplitude;
/// with a window spanning one or two pulse cycles it tracks the pulsatile
/// swing closely enough for the ratio below.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowStats {
    pub ir_dc: f32,
    pub red_dc: f32,
    pub ir_ac: f32,
    pub red_ac: f32,
}

impl WindowStats {
    pub fn collect(samples: impl Iterator<Item = RawSample>) -> Self {
        let mut ir_min = u32::MAX;
        let mut ir_max = 0u32;
        let mut red_min = u32::MAX;
        let mut red_max = 0u32;
        let mut ir_sum = 0u64;
        let mut red_sum = 0u64;
        let mut count = 0u32;

        for sample in samples {
            ir_min = ir_min.min(sample.ir);
            ir_max = ir_max.max(sample.ir);
            red_min = red_min.min(sample.red);
            red_max = red_max.max(sample.red);
            ir_sum += u64::from(sample.ir);
            red_sum += u64::from(sample.red);
            count += 1;
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            ir_dc: ir_sum as f32 / count as f32,
            red_dc: red_sum as f32 / count as f32,
            ir_ac: (ir_max - ir_min) as f32,
            red_ac: (red_max - red_min) as f32,
        }
    }

    /// A window with a vanishing denominator cannot produce a ratio; the
    /// whole pass is skipped rather than risking a division blow-up.
    pub fn is_degenerate(&self) -> bool {
        self.ir_dc < 1.0 || self.red_dc < 1.0 || self.ir_ac < 1.0
    }

    /// The standard ratio-of-ratios input to empirical SpO2 formulas.
    pub fn ratio_of_ratios(&self) -> f32 {
        (self.red_ac / self.red_dc) / (self.ir_ac / self.ir_dc)
    }
}

/// Coefficients of the empirical `SpO2 = offset − slope·R` line.
///
/// The defaults are the conventional textbook approximation, not a
/// device-specific calibration; a calibrated design substitutes its own
/// coefficients here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spo2Calibration {
    pub offset: f32,
    pub slope: f32,
}

impl Default for Spo2Calibration {
    fn default() -> Self {
        Self {
            offset: 110.0,
            slope: 25.0,
        }
    }
}

impl Spo2Calibration {
    pub fn percent(&self, ratio: f32) -> i32 {
        (self.offset - self.slope * ratio) as i32
    }
}

/// Runs one SpO2 estimation pass over the collected window statistics.
///
/// Returns `None` for degenerate windows and for estimates outside the
/// accepted saturation range; neither outcome touches the history.
pub fn estimate_spo2(stats: &WindowStats, config: &Config) -> Option<u16> {
    if stats.is_degenerate() {
        return None;
    }

    let percent = config.spo2_calibration.percent(stats.ratio_of_ratios());

    if (i32::from(config.min_spo2)..=i32::from(config.max_spo2)).contains(&percent) {
        Some(percent as u16)
    } else {
        None
    }
}
