//! This crate provides a realtime vital-signs pipeline for optical
//! pulse-oximetry sensors.
//!
//! Raw (IR, red) photodetector counts go in, validity-gated heart rate and
//! SpO2 come out: a slow/fast exponential filter pair isolates the pulsatile
//! component, a zero-crossing state machine turns crossing intervals into
//! beat candidates, a periodic ratio-of-ratios pass over the sample window
//! estimates oxygen saturation, and moving-average rings stabilize both
//! outputs. A finger-presence gate suppresses readings the instant the
//! sensor loses skin contact.
//!
//! The sensor transport itself is not part of this crate; drivers implement
//! the [`source::SampleSource`] contract (and, for the independent
//! body-temperature subsystem, [`temperature::TemperatureSource`]).
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

mod algorithms;
mod sliding;
mod smoothing;
pub mod source;
pub mod temperature;

use log::{debug, trace};

use crate::{
    algorithms::{estimate_spo2, BeatDetector, WindowStats},
    sliding::SlidingWindow,
    smoothing::Smoother,
    source::{RawSample, SampleSource},
};

pub use crate::algorithms::Spo2Calibration;

/// Tuning constants of the pipeline.
///
/// Every empirical number lives here: the filter time constants, the
/// physiological acceptance gates, the SpO2 calibration line and the
/// pass/report cadences. The defaults are the values the pipeline was tuned
/// with at 100 samples per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Raw IR counts above this mean a finger is on the sensor.
    pub finger_threshold: u32,
    /// Slow filter constant tracking the DC baseline.
    pub dc_alpha: f32,
    /// Fast filter constant smoothing the pulsatile AC component.
    pub ac_alpha: f32,
    /// Beat-to-beat intervals must be strictly inside these bounds.
    pub min_beat_interval_ms: u32,
    pub max_beat_interval_ms: u32,
    /// Instantaneous BPM acceptance range (inclusive).
    pub min_bpm: u16,
    pub max_bpm: u16,
    /// Beats required before the smoothed heart rate is trustworthy.
    pub bpm_min_samples: usize,
    /// Coefficients of the empirical saturation line.
    pub spo2_calibration: Spo2Calibration,
    /// SpO2 acceptance range in percent (inclusive).
    pub min_spo2: u16,
    pub max_spo2: u16,
    /// Accepted passes required before the smoothed SpO2 is trustworthy.
    pub spo2_min_samples: usize,
    /// Samples between SpO2 estimation passes.
    pub spo2_interval_samples: u32,
    /// Minimum spacing of [`PulseOximeter::poll`] reports, independent of
    /// the sample rate.
    pub report_interval_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            finger_threshold: 50_000,
            dc_alpha: 0.02,
            ac_alpha: 0.3,
            min_beat_interval_ms: 333,
            max_beat_interval_ms: 1_500,
            min_bpm: 40,
            max_bpm: 180,
            bpm_min_samples: 3,
            spo2_calibration: Spo2Calibration::default(),
            min_spo2: 70,
            max_spo2: 100,
            spo2_min_samples: 2,
            spo2_interval_samples: 50,
            report_interval_ms: 500,
        }
    }
}

/// One rate-limited snapshot of the pipeline outputs.
///
/// `heart_rate` and `spo2` are `None` until enough history has accumulated,
/// and immediately revert to `None` whenever the finger leaves the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VitalSigns {
    /// Raw IR count of the newest sample.
    pub ir: u32,
    pub finger_present: bool,
    /// Smoothed heart rate in BPM.
    pub heart_rate: Option<u16>,
    /// Smoothed oxygen saturation in percent.
    pub spo2: Option<u16>,
}

/// Derives heart rate and SpO2 from a realtime stream of raw samples.
///
/// # Type parameters:
///
/// - `W` - backing buffer for the raw sample window (one or two pulse cycles
///   worth of samples, e.g. 150 at 100 sps)
/// - `B` - backing buffer for the heart-rate history ring
/// - `S` - backing buffer for the SpO2 history ring
pub struct PulseOximeter<W, B, S> {
    config: Config,
    window: SlidingWindow<RawSample, W>,
    beat: BeatDetector,
    bpm: Smoother<B>,
    spo2: Smoother<S>,
    samples_since_spo2: u32,
    finger_present: bool,
    last_report_ms: u32,
}

impl PulseOximeter<(), (), ()> {
    /// Creates a pipeline with stack-allocated buffers.
    ///
    /// # Arguments
    /// * `config` - pipeline tuning constants, usually [`Config::default`].
    ///
    /// # Example
    /// ```rust
    /// use pulse_oximeter::{Config, PulseOximeter};
    ///
    /// // 1.5 s of samples at 100 sps, 8-beat and 5-pass histories
    /// let oximeter = PulseOximeter::new::<150, 8, 5>(Config::default());
    /// ```
    pub fn new<const WINDOW: usize, const BPM: usize, const SPO2: usize>(
        config: Config,
    ) -> PulseOximeter<[RawSample; WINDOW], [u16; BPM], [u16; SPO2]> {
        PulseOximeter::new_from(
            config,
            [RawSample::default(); WINDOW],
            [0; BPM],
            [0; SPO2],
        )
    }

    /// Creates a pipeline using the provided backing buffers.
    ///
    /// # Arguments
    /// * `config` - pipeline tuning constants.
    /// * `window_buffer` - holds the raw sample window.
    /// * `bpm_history` - holds accepted instantaneous BPM values.
    /// * `spo2_history` - holds accepted SpO2 estimates.
    ///
    /// # Example
    ///
    /// The backing buffers may be arrays or slices:
    ///
    /// ```rust
    /// use pulse_oximeter::{Config, PulseOximeter};
    /// use pulse_oximeter::source::RawSample;
    ///
    /// let mut window = [RawSample::default(); 150];
    /// let mut bpm_history = [0u16; 8];
    /// let mut spo2_history = [0u16; 5];
    /// let oximeter = PulseOximeter::new_from(
    ///     Config::default(),
    ///     &mut window[..],
    ///     &mut bpm_history[..],
    ///     &mut spo2_history[..],
    /// );
    /// ```
    pub fn new_from<W, B, S>(
        config: Config,
        window_buffer: W,
        bpm_history: B,
        spo2_history: S,
    ) -> PulseOximeter<W, B, S>
    where
        W: AsRef<[RawSample]> + AsMut<[RawSample]>,
        B: AsRef<[u16]> + AsMut<[u16]>,
        S: AsRef<[u16]> + AsMut<[u16]>,
    {
        PulseOximeter {
            window: SlidingWindow::new(window_buffer),
            beat: BeatDetector::new(&config),
            bpm: Smoother::new(bpm_history, config.bpm_min_samples),
            spo2: Smoother::new(spo2_history, config.spo2_min_samples),
            samples_since_spo2: 0,
            finger_present: false,
            last_report_ms: 0,
            config,
        }
    }

    /// Creates a pipeline with heap-allocated buffers.
    ///
    /// # Arguments
    /// * `config` - pipeline tuning constants.
    /// * `window_len` - raw sample window capacity.
    /// * `bpm_history_len` - heart-rate history capacity.
    /// * `spo2_history_len` - SpO2 history capacity.
    #[cfg(feature = "alloc")]
    pub fn new_alloc(
        config: Config,
        window_len: usize,
        bpm_history_len: usize,
        spo2_history_len: usize,
    ) -> PulseOximeter<
        alloc::boxed::Box<[RawSample]>,
        alloc::boxed::Box<[u16]>,
        alloc::boxed::Box<[u16]>,
    > {
        use alloc::vec;
        PulseOximeter::new_from(
            config,
            vec![RawSample::default(); window_len].into_boxed_slice(),
            vec![0; bpm_history_len].into_boxed_slice(),
            vec![0; spo2_history_len].into_boxed_slice(),
        )
    }
}

impl<W, B, S> PulseOximeter<W, B, S>
where
    W: AsRef<[RawSample]> + AsMut<[RawSample]>,
    B: AsRef<[u16]> + AsMut<[u16]>,
    S: AsRef<[u16]> + AsMut<[u16]>,
{
    /// Resets the window, the filter state and both history rings.
    pub fn clear(&mut self) {
        self.window.clear();
        self.beat.clear();
        self.bpm.clear();
        self.spo2.clear();
        self.samples_since_spo2 = 0;
        self.finger_present = false;
        self.last_report_ms = 0;
    }

    /// Discards any stale state and cooperatively polls `source` until the
    /// sample window is full. Startup-only; "no sample ready" retries and is
    /// never an error, so this returns only once the sensor has produced a
    /// full window.
    pub fn fill<Src: SampleSource>(&mut self, source: &mut Src) {
        debug!(
            "filling initial sample window ({} samples)",
            self.window.capacity()
        );
        self.clear();

        while !self.window.is_full() {
            if let Some(sample) = source.try_read_sample() {
                self.update(sample);
            }
        }

        debug!("initial sample window full, entering steady state");
    }

    /// Processes one raw sample. Returns Some instantaneous BPM if the
    /// sample completes an accepted beat.
    ///
    /// Finger presence is recomputed from this sample's IR amplitude; while
    /// the finger is absent beat detection is skipped entirely (the filter
    /// state and both histories are preserved) and SpO2 passes are
    /// suppressed.
    pub fn update(&mut self, sample: RawSample) -> Option<u16> {
        self.window.push(sample);
        self.finger_present = sample.ir > self.config.finger_threshold;

        let beat = if self.finger_present {
            self.beat.update(sample.ir, sample.timestamp_ms)
        } else {
            None
        };

        if let Some(instant_bpm) = beat {
            trace!("beat accepted at {} bpm", instant_bpm);
            self.bpm.push(instant_bpm);
        }

        self.samples_since_spo2 += 1;
        if self.samples_since_spo2 >= self.config.spo2_interval_samples {
            self.samples_since_spo2 = 0;
            self.spo2_pass();
        }

        beat
    }

    /// One tick of the acquisition loop: try to read a sample, feed it
    /// through the pipeline, and emit a rate-limited [`VitalSigns`] report.
    ///
    /// Returns `None` both when no sample was ready this tick and between
    /// report intervals.
    pub fn poll<Src: SampleSource>(&mut self, source: &mut Src) -> Option<VitalSigns> {
        let sample = source.try_read_sample()?;
        self.update(sample);

        if sample
            .timestamp_ms
            .wrapping_sub(self.last_report_ms)
            >= self.config.report_interval_ms
        {
            self.last_report_ms = sample.timestamp_ms;
            Some(self.vital_signs())
        } else {
            None
        }
    }

    /// Smoothed heart rate in BPM, `None` until at least
    /// [`Config::bpm_min_samples`] beats have been accepted and whenever no
    /// finger is on the sensor.
    pub fn heart_rate(&self) -> Option<u16> {
        if !self.finger_present {
            return None;
        }
        self.bpm.average()
    }

    /// Smoothed SpO2 in percent, `None` until at least
    /// [`Config::spo2_min_samples`] passes have been accepted and whenever
    /// no finger is on the sensor.
    pub fn spo2(&self) -> Option<u16> {
        if !self.finger_present {
            return None;
        }
        self.spo2.average()
    }

    /// Whether the newest sample's IR amplitude indicates skin contact.
    pub fn finger_present(&self) -> bool {
        self.finger_present
    }

    /// Current snapshot of all pipeline outputs.
    pub fn vital_signs(&self) -> VitalSigns {
        VitalSigns {
            ir: self.window.last().map_or(0, |sample| sample.ir),
            finger_present: self.finger_present,
            heart_rate: self.heart_rate(),
            spo2: self.spo2(),
        }
    }

    /// Runs one ratio-of-ratios estimation pass over the sample window.
    ///
    /// Requires a full window and a present finger; degenerate statistics or
    /// an out-of-range estimate skip the pass without touching the history.
    fn spo2_pass(&mut self) {
        if !self.finger_present || !self.window.is_full() {
            return;
        }

        let stats = WindowStats::collect(self.window.iter_unordered());
        if let Some(percent) = estimate_spo2(&stats, &self.config) {
            debug!("SpO2 pass accepted: {}%", percent);
            self.spo2.push(percent);
        }
    }
}
