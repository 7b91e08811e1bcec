use crate::audio::engine::AnalysisEngine;
use crate::audio::graph::AudioGraph;
use crate::error::EngineError;
use crate::particles::ParticleField;
use crate::render::canvas::Canvas;
use crate::render::renderer;

/// What one frame step produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    pub particles: usize,
    pub amplitude: f32,
}

/// Owns the active analysis engine and the particle state it drives.
///
/// Loading a file replaces both: the previous engine is disconnected before the
/// next graph is even built, so two sources never play at once.
pub struct Visualizer<G: AudioGraph> {
    engine: Option<AnalysisEngine<G>>,
    field: ParticleField,
    volume: f32,
}

impl<G: AudioGraph> Visualizer<G> {
    pub fn new(volume: f32) -> Self {
        Self {
            engine: None,
            field: ParticleField::new(0),
            volume,
        }
    }

    pub fn load<F>(&mut self, build_graph: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> G,
    {
        self.unload()?;

        let mut engine = AnalysisEngine::new(build_graph());
        self.field.reset(engine.capacity());
        engine.set_volume(self.volume)?;
        engine.start()?;

        log::debug!("Loaded engine with {} bins", engine.capacity());
        self.engine = Some(engine);
        Ok(())
    }

    /// Disconnect the active engine, if any.
    pub fn unload(&mut self) -> Result<(), EngineError> {
        if let Some(mut previous) = self.engine.take() {
            previous.disconnect()?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Analyse, move and paint one frame. Without a loaded engine nothing is drawn.
    pub fn step<C: Canvas>(&mut self, canvas: &mut C) -> Result<FrameStats, EngineError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(FrameStats {
                particles: 0,
                amplitude: 0.0,
            });
        };

        let spectrum = engine.spectrum_above_average()?;
        let amplitude = engine.amplitude_level()?;

        self.field.update(&spectrum);
        renderer::draw_frame(canvas, &spectrum, amplitude, &self.field);

        Ok(FrameStats {
            particles: spectrum.len(),
            amplitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::render::canvas::RasterCanvas;

    type Events = Rc<RefCell<Vec<String>>>;

    struct LoggedGraph {
        name: &'static str,
        events: Events,
        bins: Vec<u8>,
    }

    impl LoggedGraph {
        fn build(name: &'static str, events: &Events, bins: &[u8]) -> Self {
            events.borrow_mut().push(format!("build {}", name));
            Self {
                name,
                events: events.clone(),
                bins: bins.to_vec(),
            }
        }

        fn log(&self, what: &str) {
            self.events.borrow_mut().push(format!("{} {}", what, self.name));
        }
    }

    impl AudioGraph for LoggedGraph {
        fn bin_count(&self) -> usize {
            self.bins.len()
        }
        fn start(&mut self) {
            self.log("start");
        }
        fn disconnect(&mut self) {
            self.log("disconnect");
        }
        fn set_volume(&mut self, level: f32) {
            self.log(&format!("volume={}", level));
        }
        fn fill_frequency_domain(&mut self, target: &mut [u8]) {
            target.copy_from_slice(&self.bins);
        }
        fn fill_time_domain(&mut self, target: &mut [u8]) {
            target.fill(128);
        }
    }

    #[test]
    fn test_reload_disconnects_before_building_next() {
        let events: Events = Rc::default();
        let mut viz = Visualizer::new(0.5);

        viz.load(|| LoggedGraph::build("a", &events, &[0; 4])).unwrap();
        viz.load(|| LoggedGraph::build("b", &events, &[0; 8])).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                "build a",
                "volume=0.5 a",
                "start a",
                "disconnect a",
                "build b",
                "volume=0.5 b",
                "start b",
            ]
        );
        assert!(viz.is_active());
        assert_eq!(viz.field().capacity(), 8);
    }

    #[test]
    fn test_reload_resets_particles() {
        let events: Events = Rc::default();
        let mut viz = Visualizer::new(1.0);
        let mut canvas = RasterCanvas::new(32, 32).unwrap();

        viz.load(|| LoggedGraph::build("a", &events, &[0, 255, 0, 255])).unwrap();
        viz.step(&mut canvas).unwrap();
        assert!(viz.field().angle(0) > 0.0);

        viz.load(|| LoggedGraph::build("b", &events, &[0, 255, 0, 255])).unwrap();
        assert_eq!(viz.field().angle(0), 0.0);
    }

    #[test]
    fn test_step_reports_particles() {
        let events: Events = Rc::default();
        let mut viz = Visualizer::new(1.0);
        let mut canvas = RasterCanvas::new(64, 64).unwrap();

        let idle = viz.step(&mut canvas).unwrap();
        assert_eq!(idle.particles, 0);
        assert_eq!(canvas.pixel(32, 32), [0, 0, 0, 255]);

        viz.load(|| LoggedGraph::build("a", &events, &[0, 100, 0, 100])).unwrap();
        let stats = viz.step(&mut canvas).unwrap();
        assert_eq!(stats.particles, 2);
        assert_eq!(stats.amplitude, 256.0);

        // 50 / 255 * 25 * 1.331 ~ 6.5 px disc at the canvas center
        let center = canvas.pixel(32, 32);
        assert!(center[0] > 0);
    }

    #[test]
    fn test_unload_leaves_nothing_connected() {
        let events: Events = Rc::default();
        let mut viz = Visualizer::new(1.0);
        viz.load(|| LoggedGraph::build("a", &events, &[0; 4])).unwrap();
        viz.unload().unwrap();
        viz.unload().unwrap();

        assert!(!viz.is_active());
        assert_eq!(events.borrow().last().map(String::as_str), Some("disconnect a"));
    }
}
