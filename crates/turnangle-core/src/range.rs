//! Allowed steering-angle interval.

/// Largest accepted steering angle, in degrees.
pub const MAX_TURN_ANGLE: f64 = 180.0;

/// Smallest accepted steering angle, in degrees.
pub const MIN_TURN_ANGLE: f64 = -180.0;

/// A closed interval `[min, max]` of angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

impl AngleRange {
    /// The steering interval `[-180, 180]`.
    pub const STEERING: AngleRange = AngleRange {
        min: MIN_TURN_ANGLE,
        max: MAX_TURN_ANGLE,
    };

    /// Inclusive on both ends. `NaN` is never contained.
    pub fn contains(&self, angle: f64) -> bool {
        self.min <= angle && angle <= self.max
    }
}

impl Default for AngleRange {
    fn default() -> Self {
        Self::STEERING
    }
}

/// Check whether `angle` lies within `[MIN_TURN_ANGLE, MAX_TURN_ANGLE]`.
pub fn is_in_range(angle: f64) -> bool {
    AngleRange::STEERING.contains(angle)
}
