// ============================================================================
// BOUNDED GEOMETRY LAYOUT
// ============================================================================

/// Padding around the drawable area, in container-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Padding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Padding {
    pub const fn uniform(pad: f32) -> Self {
        Self {
            left: pad,
            top: pad,
            right: pad,
            bottom: pad,
        }
    }
}

/// An axis-aligned square region in the container's local coordinate space.
///
/// Stored as four `f32` edges, matching the float rectangles the layout math
/// produces. No rounding happens here; pixel snapping is the renderer's job.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// A square of side `diameter` anchored at the origin.
    fn from_diameter(diameter: f32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: diameter,
            bottom: diameter,
        }
    }

    /// The same box translated by `(dx, dy)`.
    fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    pub fn radius(&self) -> f32 {
        self.width() / 2.0
    }
}

/// The four nested layer boxes of the knob, replaced wholesale on every
/// resize so their nesting always holds as a unit.
///
/// `indicator` shares the knob face's bounds: the indicator glyph renders
/// over the rotatable knob and rotates about its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnobGeometry {
    pub background: BoundingBox,
    pub base: BoundingBox,
    pub knob: BoundingBox,
    pub indicator: BoundingBox,
}

/// Turn a container size and padding into the four nested square regions.
///
/// The available diameter is the smaller usable dimension after padding.
/// Each inner layer insets by a fixed proportion of that diameter: the base
/// by 1/20 per side, the knob by a further 1/40 per side. A zero usable area
/// degenerates the background to a point and is not an error.
///
/// Pure: identical inputs always yield identical boxes.
pub fn compute_layout(container_width: f32, container_height: f32, padding: Padding) -> KnobGeometry {
    let usable_w = container_width - padding.left - padding.right;
    let usable_h = container_height - padding.top - padding.bottom;
    let bg_diameter = usable_w.min(usable_h);

    let mut offset_x = padding.left;
    let mut offset_y = padding.top;
    let background = BoundingBox::from_diameter(bg_diameter).offset(offset_x, offset_y);

    let bg_to_base = bg_diameter / 20.0;
    let base_diameter = (bg_diameter - 2.0 * bg_to_base).max(1.0);
    offset_x += bg_to_base;
    offset_y += bg_to_base;
    let base = BoundingBox::from_diameter(base_diameter).offset(offset_x, offset_y);

    let base_to_knob = bg_diameter / 40.0;
    let knob_diameter = (base_diameter - 2.0 * base_to_knob).max(1.0);
    offset_x += base_to_knob;
    offset_y += base_to_knob;
    let knob = BoundingBox::from_diameter(knob_diameter).offset(offset_x, offset_y);

    KnobGeometry {
        background,
        base,
        knob,
        indicator: knob,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_box(b: BoundingBox, left: f32, top: f32, right: f32, bottom: f32) {
        assert_close(b.left, left);
        assert_close(b.top, top);
        assert_close(b.right, right);
        assert_close(b.bottom, bottom);
    }

    fn strictly_inside(inner: BoundingBox, outer: BoundingBox) -> bool {
        inner.left > outer.left
            && inner.top > outer.top
            && inner.right < outer.right
            && inner.bottom < outer.bottom
    }

    #[test]
    fn layout_512_square_no_padding() {
        let g = compute_layout(512.0, 512.0, Padding::default());
        assert_box(g.background, 0.0, 0.0, 512.0, 512.0);
        // base insets by 512/20 = 25.6 per side
        assert_box(g.base, 25.6, 25.6, 486.4, 486.4);
        // knob insets by a further 512/40 = 12.8 per side
        assert_box(g.knob, 38.4, 38.4, 473.6, 473.6);
    }

    #[test]
    fn indicator_shares_knob_bounds() {
        let g = compute_layout(300.0, 200.0, Padding::uniform(10.0));
        assert_eq!(g.indicator, g.knob);
    }

    #[test]
    fn boxes_are_strictly_nested() {
        for (w, h, pad) in [
            (512.0, 512.0, Padding::default()),
            (300.0, 180.0, Padding::uniform(8.0)),
            (
                640.0,
                480.0,
                Padding {
                    left: 12.0,
                    top: 4.0,
                    right: 20.0,
                    bottom: 16.0,
                },
            ),
            (37.0, 37.0, Padding::default()),
        ] {
            let g = compute_layout(w, h, pad);
            assert!(strictly_inside(g.base, g.background), "{w}x{h}");
            assert!(strictly_inside(g.knob, g.base), "{w}x{h}");
        }
    }

    #[test]
    fn asymmetric_padding_anchors_at_left_top() {
        let pad = Padding {
            left: 30.0,
            top: 10.0,
            right: 10.0,
            bottom: 50.0,
        };
        // usable = min(400 - 40, 400 - 60) = 340
        let g = compute_layout(400.0, 400.0, pad);
        assert_box(g.background, 30.0, 10.0, 370.0, 350.0);
    }

    #[test]
    fn shorter_dimension_bounds_the_diameter() {
        let g = compute_layout(800.0, 200.0, Padding::default());
        assert_close(g.background.width(), 200.0);
        assert_close(g.background.height(), 200.0);
    }

    #[test]
    fn zero_usable_area_degenerates_to_a_point() {
        let g = compute_layout(20.0, 20.0, Padding::uniform(10.0));
        assert_box(g.background, 10.0, 10.0, 10.0, 10.0);
        assert_close(g.background.width(), 0.0);
    }

    #[test]
    fn layout_is_pure() {
        let pad = Padding::uniform(7.0);
        let a = compute_layout(311.0, 257.0, pad);
        let b = compute_layout(311.0, 257.0, pad);
        assert_eq!(a, b);
    }

    #[test]
    fn box_accessors() {
        let g = compute_layout(512.0, 512.0, Padding::default());
        assert_close(g.background.center_x(), 256.0);
        assert_close(g.background.center_y(), 256.0);
        assert_close(g.background.radius(), 256.0);
        assert_close(g.knob.center_x(), 256.0);
    }
}
