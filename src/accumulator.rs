// accumulator.rs — running rotation angle

/// Radians of rotation per pixel of horizontal drag.
pub const DEFAULT_SENSITIVITY: f64 = 0.008;

/// Integrates drag deltas into one unbounded angle.
///
/// The angle is never reduced here; callers must not assume it stays
/// within a single turn. `reset` is the only way back to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleAccumulator {
    angle: f64,
    sensitivity: f64,
}

impl AngleAccumulator {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            angle: 0.0,
            sensitivity,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity;
    }

    pub fn accumulate(&mut self, delta: f64) -> f64 {
        self.angle += delta * self.sensitivity;
        self.angle
    }

    pub fn reset(&mut self) {
        self.angle = 0.0;
    }
}

impl Default for AngleAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}
