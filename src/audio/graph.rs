use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::decode::PcmBuffer;

const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Capabilities the analysis engine needs from an audio graph
/// (source -> gain -> analyser -> output). How the nodes are wired is the
/// implementor's business.
pub trait AudioGraph {
    /// Number of frequency bins the analyser produces.
    fn bin_count(&self) -> usize;
    fn start(&mut self);
    fn disconnect(&mut self);
    fn set_volume(&mut self, level: f32);
    /// Write one byte magnitude per bin into `target`.
    fn fill_frequency_domain(&mut self, target: &mut [u8]);
    /// Write the most recent waveform as bytes (128 is silence) into `target`.
    fn fill_time_domain(&mut self, target: &mut [u8]);
}

/// Playback time in seconds, shared between the scheduler that advances it and the
/// graphs that read it.
#[derive(Clone, Debug, Default)]
pub struct MediaClock {
    now: Rc<Cell<f64>>,
}

impl MediaClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn set(&self, seconds: f64) {
        self.now.set(seconds);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AnalyserOptions {
    pub fft_size: usize,
    /// Temporal blending between consecutive spectra, 0.0-1.0.
    pub smoothing: f32,
}

impl Default for AnalyserOptions {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            smoothing: 0.8,
        }
    }
}

/// Software audio graph playing a decoded buffer against a [`MediaClock`].
///
/// Reads are pure functions of the clock, so rendering is deterministic and
/// independent of wall time.
pub struct OfflineGraph {
    pcm: PcmBuffer,
    clock: MediaClock,
    gain: f32,
    started_at: Option<f64>,
    connected: bool,
    fft_size: usize,
    smoothing: f32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    frame: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl OfflineGraph {
    pub fn new(pcm: PcmBuffer, options: AnalyserOptions, clock: MediaClock) -> Self {
        let fft_size = options.fft_size;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            pcm,
            clock,
            gain: 1.0,
            started_at: None,
            connected: true,
            fft_size,
            smoothing: options.smoothing,
            fft,
            window: blackman_window(fft_size),
            frame: vec![0.0; fft_size],
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
        }
    }

    /// Index one past the newest sample the source has emitted, if playing.
    fn playhead(&self) -> Option<usize> {
        if !self.connected {
            return None;
        }
        let started = self.started_at?;
        let elapsed = (self.clock.now() - started).max(0.0);
        Some((elapsed * self.pcm.sample_rate as f64) as usize)
    }

    /// Copy the analyser's window (the last `fft_size` samples) into `self.frame`.
    fn capture(&mut self) {
        self.frame.fill(0.0);
        let Some(end) = self.playhead() else {
            return;
        };
        let start = end as isize - self.fft_size as isize;
        for (i, slot) in self.frame.iter_mut().enumerate() {
            let idx = start + i as isize;
            if idx >= 0 {
                if let Some(&s) = self.pcm.samples.get(idx as usize) {
                    *slot = s * self.gain;
                }
            }
        }
    }
}

impl AudioGraph for OfflineGraph {
    fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    fn start(&mut self) {
        self.started_at = Some(self.clock.now());
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn set_volume(&mut self, level: f32) {
        self.gain = level;
    }

    fn fill_frequency_domain(&mut self, target: &mut [u8]) {
        self.capture();

        for ((out, &s), &w) in self.spectrum.iter_mut().zip(&self.frame).zip(&self.window) {
            *out = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.spectrum);

        let tau = self.smoothing;
        let scale = 255.0 / (MAX_DECIBELS - MIN_DECIBELS);
        let norm = 1.0 / self.fft_size as f32;

        for (k, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.spectrum[k].norm() * norm;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
        }

        for (out, &mag) in target.iter_mut().zip(&self.smoothed) {
            let db = 20.0 * mag.log10();
            *out = (scale * (db - MIN_DECIBELS)).clamp(0.0, 255.0) as u8;
        }
    }

    fn fill_time_domain(&mut self, target: &mut [u8]) {
        self.capture();
        for (out, &s) in target.iter_mut().zip(&self.frame) {
            *out = (128.0 * (1.0 + s)).clamp(0.0, 255.0) as u8;
        }
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    let alpha = 0.16f32;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}
