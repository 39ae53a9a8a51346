//! Drag release classification
//!
//! Offsets and velocities are vertical, in pixels and pixels per second,
//! positive downward.

/// Distance and velocity thresholds; either one alone triggers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureThresholds {
    pub close_distance: f64,
    pub close_velocity: f64,
    pub expand_distance: f64,
    pub expand_velocity: f64,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            close_distance: 200.0,
            close_velocity: 500.0,
            expand_distance: 150.0,
            expand_velocity: 500.0,
        }
    }
}

/// Drag state at the moment the pointer is released
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRelease {
    pub offset_y: f64,
    pub velocity_y: f64,
}

impl DragRelease {
    pub fn new(offset_y: f64, velocity_y: f64) -> Self {
        Self { offset_y, velocity_y }
    }
}

/// What a release asks the sheet to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseIntent {
    Close,
    Expand,
    /// Return to the current resting position
    Settle,
}

impl GestureThresholds {
    /// Classify a release. Downward wins over upward; `Expand` is only
    /// produced when `can_expand` is set.
    pub fn classify(&self, release: DragRelease, can_expand: bool) -> ReleaseIntent {
        if release.offset_y > self.close_distance || release.velocity_y > self.close_velocity {
            ReleaseIntent::Close
        } else if can_expand
            && (release.offset_y < -self.expand_distance || release.velocity_y < -self.expand_velocity)
        {
            ReleaseIntent::Expand
        } else {
            ReleaseIntent::Settle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let t = GestureThresholds::default();

        assert_eq!(t.classify(DragRelease::new(250.0, 0.0), true), ReleaseIntent::Close);
        assert_eq!(t.classify(DragRelease::new(10.0, 600.0), true), ReleaseIntent::Close);
        assert_eq!(t.classify(DragRelease::new(-160.0, 0.0), true), ReleaseIntent::Expand);
        assert_eq!(t.classify(DragRelease::new(-20.0, -900.0), true), ReleaseIntent::Expand);
        assert_eq!(t.classify(DragRelease::new(50.0, 100.0), true), ReleaseIntent::Settle);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let t = GestureThresholds::default();
        assert_eq!(t.classify(DragRelease::new(200.0, 500.0), true), ReleaseIntent::Settle);
        assert_eq!(t.classify(DragRelease::new(-150.0, -500.0), true), ReleaseIntent::Settle);
    }

    #[test]
    fn test_expand_needs_permission() {
        let t = GestureThresholds::default();
        assert_eq!(t.classify(DragRelease::new(-400.0, -900.0), false), ReleaseIntent::Settle);
    }
}
