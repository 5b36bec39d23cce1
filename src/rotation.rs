// ============================================================================
// ROTATION ENGINE
// ============================================================================

use thiserror::Error;

/// Default lower stop, normalizes to 225 degrees (third quadrant).
pub const DEFAULT_MIN_ANGLE: i32 = -135;
/// Default upper stop, normalizes to 315 degrees (fourth quadrant).
pub const DEFAULT_MAX_ANGLE: i32 = -45;
/// Reference divisor applied to raw scroll magnitude before it becomes degrees.
pub const VELOCITY_DOWNSCALE: f32 = 2.5;

/// Contract failures surfaced when building a [`RotationRange`].
///
/// These are configuration errors: the stop angles must sit in their required
/// quadrants or the dial's validity check is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KnobError {
    #[error("min angle {0} must normalize strictly inside (180, 270) degrees")]
    MinAngleOutOfQuadrant(i32),
    #[error("max angle {0} must normalize strictly inside (270, 360) degrees")]
    MaxAngleOutOfQuadrant(i32),
}

/// The pair of stop angles bounding the dial, in degrees modulo 360.
///
/// The open arc between the normalized min and max is forbidden, modeling the
/// stop-gap at the bottom of a physical knob; the remaining sweep is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationRange {
    min_angle: i32,
    max_angle: i32,
}

impl Default for RotationRange {
    fn default() -> Self {
        // The defaults satisfy the quadrant contract by construction.
        Self {
            min_angle: DEFAULT_MIN_ANGLE,
            max_angle: DEFAULT_MAX_ANGLE,
        }
    }
}

impl RotationRange {
    /// Validates the quadrant contract: normalized min strictly inside
    /// (180, 270), normalized max strictly inside (270, 360).
    pub fn new(min_angle: i32, max_angle: i32) -> Result<Self, KnobError> {
        let min = min_angle.rem_euclid(360);
        let max = max_angle.rem_euclid(360);
        if !(min > 180 && min < 270) {
            return Err(KnobError::MinAngleOutOfQuadrant(min_angle));
        }
        if !(max > 270 && max < 360) {
            return Err(KnobError::MaxAngleOutOfQuadrant(max_angle));
        }
        Ok(Self {
            min_angle,
            max_angle,
        })
    }

    pub fn min_normalized(&self) -> i32 {
        self.min_angle.rem_euclid(360)
    }

    pub fn max_normalized(&self) -> i32 {
        self.max_angle.rem_euclid(360)
    }

    /// Angular length of the allowed arc, in degrees.
    pub fn allowed_sweep(&self) -> i32 {
        (self.min_normalized() - self.max_normalized()).rem_euclid(360)
    }

    /// Degrees traveled from the min stop along the allowed arc to `angle`.
    ///
    /// Only meaningful for angles outside the forbidden arc, where the result
    /// lies in `[0, allowed_sweep()]`.
    fn sweep_position(&self, angle: i32) -> i32 {
        (self.min_normalized() - angle).rem_euclid(360)
    }
}

/// Owns the current rotation and converts raw drag samples into validated
/// angle updates.
///
/// The angle lives in `[0, 360)` and only ever changes through
/// [`apply_scroll`](Self::apply_scroll) or
/// [`set_rotation`](Self::set_rotation). Sub-degree scroll residue is carried
/// across calls rather than reset, so slow drags still accumulate.
#[derive(Debug, Clone)]
pub struct RotationEngine {
    range: RotationRange,
    current_angle: i32,
    scroll_remainder: f32,
}

impl RotationEngine {
    pub fn new(range: RotationRange) -> Self {
        Self {
            range,
            current_angle: 0,
            scroll_remainder: 0.0,
        }
    }

    /// The latest committed angle, for the indicator's render transform.
    pub fn current_angle(&self) -> i32 {
        self.current_angle
    }

    pub fn range(&self) -> RotationRange {
        self.range
    }

    /// Translate an (dx, dy) scroll vector into a signed scalar rotation.
    ///
    /// `rel_x`/`rel_y` are the touch position relative to the rotation
    /// center. The sign comes from the dot product of the drag against the
    /// vector perpendicular to the touch radius, so tangential motion rotates
    /// at full magnitude while a purely radial drag yields zero.
    pub fn vector_to_scalar_scroll(dx: f32, dy: f32, rel_x: f32, rel_y: f32) -> f32 {
        let length = (dx * dx + dy * dy).sqrt();

        let cross_x = -rel_y;
        let cross_y = rel_x;
        let dot = cross_x * dx + cross_y * dy;
        // f32::signum maps 0.0 to 1.0; a zero dot must yield zero rotation.
        let sign = if dot > 0.0 {
            1.0
        } else if dot < 0.0 {
            -1.0
        } else {
            0.0
        };

        length * sign
    }

    /// Apply one drag sample. Returns `(accepted, angle)`.
    ///
    /// The scaled delta joins the carried remainder, the whole degrees are
    /// taken as the step and the fraction stays for the next sample. A
    /// candidate inside the forbidden arc is absorbed without rotating --
    /// the mechanical stop, reported as `accepted = false`, never an error.
    pub fn apply_scroll(
        &mut self,
        dx: f32,
        dy: f32,
        rel_x: f32,
        rel_y: f32,
        velocity_downscale: f32,
    ) -> (bool, i32) {
        let scalar = Self::vector_to_scalar_scroll(dx, dy, rel_x, rel_y);
        let total = scalar / velocity_downscale + self.scroll_remainder;
        let step = total.floor();
        self.scroll_remainder = total - step;

        let candidate = (self.current_angle + step as i32).rem_euclid(360);
        if self.is_valid_rotation(candidate) {
            self.current_angle = candidate;
            (true, candidate)
        } else {
            (false, self.current_angle)
        }
    }

    /// Whether `angle` (in `[0, 360)`) sits outside the forbidden arc.
    /// Both stop endpoints are valid; only the strict interior is rejected.
    ///
    /// This comparison is only correct with min in the third quadrant and
    /// max in the fourth, as enforced by [`RotationRange::new`]; it does not
    /// generalize to arcs wrapping past zero.
    pub fn is_valid_rotation(&self, angle: i32) -> bool {
        let min = self.range.min_normalized();
        let max = self.range.max_normalized();
        !(angle > min && angle < max)
    }

    /// Set the rotation directly. Normalizes, then silently ignores values
    /// inside the forbidden arc. Returns whether the value was taken.
    pub fn set_rotation(&mut self, rotation: i32) -> bool {
        let rotation = rotation.rem_euclid(360);
        if self.is_valid_rotation(rotation) {
            self.current_angle = rotation;
            true
        } else {
            false
        }
    }

    /// Map the current angle onto a discrete level in `0..=max_level`.
    ///
    /// Labeling only: level 0 sits at the min stop, `max_level` at the max
    /// stop, linear along the allowed arc in between. The angle math never
    /// reads this.
    pub fn level(&self, max_level: u32) -> u32 {
        let pos = self.range.sweep_position(self.current_angle) as f32;
        let span = self.range.allowed_sweep() as f32;
        (pos / span * max_level as f32).round() as u32
    }
}

impl Default for RotationEngine {
    fn default() -> Self {
        Self::new(RotationRange::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_engine() -> RotationEngine {
        RotationEngine::new(RotationRange::new(-135, -45).unwrap())
    }

    /// With the touch to the right of center, a downward drag maps onto a
    /// pure positive scalar: dy becomes the rotation magnitude.
    fn drag_down(engine: &mut RotationEngine, dy: f32) -> (bool, i32) {
        engine.apply_scroll(0.0, dy, 1.0, 0.0, VELOCITY_DOWNSCALE)
    }

    #[test]
    fn range_accepts_reference_defaults() {
        let range = RotationRange::new(-135, -45).unwrap();
        assert_eq!(range.min_normalized(), 225);
        assert_eq!(range.max_normalized(), 315);
        assert_eq!(range.allowed_sweep(), 270);
    }

    #[test]
    fn range_rejects_min_outside_third_quadrant() {
        assert_eq!(
            RotationRange::new(-90, -45),
            Err(KnobError::MinAngleOutOfQuadrant(-90))
        );
        // Boundary values are excluded, the interval is open.
        assert_eq!(
            RotationRange::new(180, -45),
            Err(KnobError::MinAngleOutOfQuadrant(180))
        );
        assert_eq!(
            RotationRange::new(270, -45),
            Err(KnobError::MinAngleOutOfQuadrant(270))
        );
    }

    #[test]
    fn range_rejects_max_outside_fourth_quadrant() {
        assert_eq!(
            RotationRange::new(-135, -100),
            Err(KnobError::MaxAngleOutOfQuadrant(-100))
        );
        assert_eq!(
            RotationRange::new(-135, 0),
            Err(KnobError::MaxAngleOutOfQuadrant(0))
        );
        assert_eq!(
            RotationRange::new(-135, 270),
            Err(KnobError::MaxAngleOutOfQuadrant(270))
        );
    }

    #[test]
    fn forbidden_arc_is_a_strict_open_interval() {
        let engine = default_engine();
        // Endpoints belong to the allowed arc.
        assert!(engine.is_valid_rotation(225));
        assert!(engine.is_valid_rotation(315));
        // Strict interior is forbidden.
        for angle in 226..315 {
            assert!(!engine.is_valid_rotation(angle), "angle {angle}");
        }
        // Everything else is allowed.
        for angle in (0..=225).chain(315..360) {
            assert!(engine.is_valid_rotation(angle), "angle {angle}");
        }
    }

    #[test]
    fn scalar_scroll_reference_vector() {
        // Touch at (5, 0), drag straight down by 5: cross = (0, 5),
        // dot = 25 > 0, so the result is +length.
        let s = RotationEngine::vector_to_scalar_scroll(0.0, 5.0, 5.0, 0.0);
        assert_eq!(s, 5.0);
    }

    #[test]
    fn scalar_scroll_is_odd_under_drag_negation() {
        let samples = [
            (3.0, -4.0, 10.0, 2.0),
            (0.5, 0.25, -7.0, 7.0),
            (-2.0, -2.0, 0.0, 5.0),
        ];
        for (dx, dy, x, y) in samples {
            let forward = RotationEngine::vector_to_scalar_scroll(dx, dy, x, y);
            let reverse = RotationEngine::vector_to_scalar_scroll(-dx, -dy, x, y);
            assert_eq!(forward, -reverse, "({dx}, {dy}) at ({x}, {y})");
        }
    }

    #[test]
    fn radial_drag_produces_no_rotation() {
        // Drag parallel to the touch radius: (6, 8) along (3, 4).
        let s = RotationEngine::vector_to_scalar_scroll(6.0, 8.0, 3.0, 4.0);
        assert_eq!(s, 0.0);
        // And the degenerate zero drag.
        let s = RotationEngine::vector_to_scalar_scroll(0.0, 0.0, 3.0, 4.0);
        assert_eq!(s, 0.0);
    }

    #[test]
    fn candidate_in_forbidden_arc_is_absorbed() {
        let mut engine = default_engine();
        // 675 / 2.5 = 270 degrees, dead center of the forbidden arc.
        let (accepted, angle) = drag_down(&mut engine, 675.0);
        assert!(!accepted);
        assert_eq!(angle, 0);
        assert_eq!(engine.current_angle(), 0);

        // 250 / 2.5 = 100 degrees, well inside the allowed arc.
        let (accepted, angle) = drag_down(&mut engine, 250.0);
        assert!(accepted);
        assert_eq!(angle, 100);
        assert_eq!(engine.current_angle(), 100);
    }

    #[test]
    fn angle_never_enters_forbidden_arc() {
        let mut engine = default_engine();
        // A mix of coarse and fine samples in both directions.
        for dy in [40.0, 900.0, -12.5, 675.0, 3.0, -701.0, 249.9, 550.0] {
            drag_down(&mut engine, dy);
            assert!(
                engine.is_valid_rotation(engine.current_angle()),
                "angle {} after dy {dy}",
                engine.current_angle()
            );
        }
    }

    #[test]
    fn sub_degree_residue_accumulates_across_samples() {
        let mut engine = default_engine();
        // Each sample is 1.5 / 2.5 = 0.6 degrees; alone it rounds down to
        // nothing, but the residue carries.
        let (accepted, angle) = drag_down(&mut engine, 1.5);
        assert!(accepted);
        assert_eq!(angle, 0);
        let (accepted, angle) = drag_down(&mut engine, 1.5);
        assert!(accepted);
        assert_eq!(angle, 1);
    }

    #[test]
    fn counter_clockwise_drag_wraps_below_zero() {
        let mut engine = default_engine();
        // -25 / 2.5 = -10 degrees from zero wraps to 350.
        let (accepted, angle) = drag_down(&mut engine, -25.0);
        assert!(accepted);
        assert_eq!(angle, 350);
    }

    #[test]
    fn set_rotation_normalizes_and_validates() {
        let mut engine = default_engine();
        assert!(engine.set_rotation(-45));
        assert_eq!(engine.current_angle(), 315);
        // Forbidden values are ignored silently.
        assert!(!engine.set_rotation(270));
        assert_eq!(engine.current_angle(), 315);
        assert!(engine.set_rotation(720));
        assert_eq!(engine.current_angle(), 0);
    }

    #[test]
    fn level_maps_the_allowed_sweep() {
        let mut engine = default_engine();
        engine.set_rotation(225);
        assert_eq!(engine.level(10), 0);
        engine.set_rotation(315);
        assert_eq!(engine.level(10), 10);
        engine.set_rotation(90);
        // 135 degrees of the 270-degree sweep.
        assert_eq!(engine.level(10), 5);
    }
}
