use super::graph::AudioGraph;
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Playing,
    Disconnected,
}

/// Pulls raw analyser buffers from an [`AudioGraph`] and derives the per-frame
/// readings the particle field runs on.
pub struct AnalysisEngine<G: AudioGraph> {
    graph: G,
    frequency: Vec<u8>,
    amplitude: Vec<u8>,
    state: Lifecycle,
}

impl<G: AudioGraph> AnalysisEngine<G> {
    pub fn new(graph: G) -> Self {
        let capacity = graph.bin_count();
        Self {
            graph,
            frequency: vec![0; capacity],
            amplitude: vec![0; capacity],
            state: Lifecycle::Idle,
        }
    }

    /// Fixed number of bins sampled per frame.
    pub fn capacity(&self) -> usize {
        self.frequency.len()
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            Lifecycle::Idle => {
                self.graph.start();
                self.state = Lifecycle::Playing;
                log::debug!("Analysis engine started ({} bins)", self.capacity());
                Ok(())
            }
            Lifecycle::Playing => Err(EngineError::AlreadyStarted),
            Lifecycle::Disconnected => Err(EngineError::Disconnected),
        }
    }

    pub fn disconnect(&mut self) -> Result<(), EngineError> {
        self.ensure_connected()?;
        self.graph.disconnect();
        self.state = Lifecycle::Disconnected;
        log::debug!("Analysis engine disconnected");
        Ok(())
    }

    /// Output gain. Not clamped; keep it in 0.0-1.0.
    pub fn set_volume(&mut self, level: f32) -> Result<(), EngineError> {
        self.ensure_connected()?;
        self.graph.set_volume(level);
        Ok(())
    }

    /// Every bin above the frame's mean magnitude, minus that mean, in bin order.
    ///
    /// The mean divides by the fixed capacity. Position `i` of the result is the
    /// `i`-th bin that exceeded the mean, not bin `i`.
    pub fn spectrum_above_average(&mut self) -> Result<Vec<f32>, EngineError> {
        self.ensure_connected()?;
        self.graph.fill_frequency_domain(&mut self.frequency);
        Ok(above_average(&self.frequency, self.capacity()))
    }

    /// Root of the sum of squares of the raw time-domain bytes. Not divided by the
    /// sample count.
    pub fn amplitude_level(&mut self) -> Result<f32, EngineError> {
        self.ensure_connected()?;
        self.graph.fill_time_domain(&mut self.amplitude);
        Ok(root_sum_of_squares(&self.amplitude))
    }

    fn ensure_connected(&self) -> Result<(), EngineError> {
        if self.state == Lifecycle::Disconnected {
            return Err(EngineError::Disconnected);
        }
        Ok(())
    }
}

fn above_average(sample: &[u8], capacity: usize) -> Vec<f32> {
    let sum: f32 = sample.iter().map(|&v| v as f32).sum();
    let mean = sum / capacity as f32;
    sample
        .iter()
        .map(|&v| v as f32)
        .filter(|&v| v > mean)
        .map(|v| v - mean)
        .collect()
}

fn root_sum_of_squares(sample: &[u8]) -> f32 {
    sample
        .iter()
        .map(|&v| {
            let v = v as f32;
            v * v
        })
        .sum::<f32>()
        .sqrt()
}
