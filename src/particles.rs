use crate::mapping::map;

const VELOCITY_LIMIT: f64 = 5.0;
const MAX_VELOCITY_STEP: f32 = 0.03;

/// Per-particle rotation state, indexed by rank within the current
/// above-average spectrum.
///
/// Angles grow without bound over a long render, so state is kept in `f64`.
#[derive(Clone, Debug)]
pub struct ParticleField {
    angle: Vec<f64>,
    angular_velocity: Vec<f64>,
}

impl ParticleField {
    pub fn new(capacity: usize) -> Self {
        Self {
            angle: vec![0.0; capacity],
            angular_velocity: vec![0.0; capacity],
        }
    }

    /// Zero all state and resize to `capacity`.
    pub fn reset(&mut self, capacity: usize) {
        self.angle.clear();
        self.angle.resize(capacity, 0.0);
        self.angular_velocity.clear();
        self.angular_velocity.resize(capacity, 0.0);
    }

    pub fn capacity(&self) -> usize {
        self.angle.len()
    }

    /// Accelerate and advance the first `spectrum.len()` particles. Particles past
    /// the end keep their previous state.
    pub fn update(&mut self, spectrum: &[f32]) {
        let particles = self.angle.iter_mut().zip(self.angular_velocity.iter_mut());
        for ((angle, velocity), &value) in particles.zip(spectrum) {
            *velocity += f64::from(map(value, 0.0, 255.0, 0.0, MAX_VELOCITY_STEP));
            // reset, never clamp
            if *velocity > VELOCITY_LIMIT {
                *velocity = 0.0;
            }
            *angle += *velocity;
        }
    }

    /// Accumulated rotation in degrees.
    pub fn angle(&self, index: usize) -> f64 {
        self.angle[index]
    }

    #[cfg(test)]
    pub fn angular_velocity(&self, index: usize) -> f64 {
        self.angular_velocity[index]
    }
}
