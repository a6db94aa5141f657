/// A real-valued rectangle, as reported by a renderer for its source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        RectF {
            x,
            y,
            width,
            height,
        }
    }
}

/// An integer-aligned pixel region.
///
/// Produced from a [`RectF`] by rounding outward to whole pixels, so the
/// integral extent always covers the real-valued one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Extent {
            x,
            y,
            width,
            height,
        }
    }

    /// Round a real-valued rect outward to whole pixels.
    ///
    /// Degenerate rects (non-finite or non-positive size) map to an empty
    /// extent rather than an error.
    pub fn integral(rect: RectF) -> Self {
        if !rect.x.is_finite()
            || !rect.y.is_finite()
            || !rect.width.is_finite()
            || !rect.height.is_finite()
            || rect.width <= 0.0
            || rect.height <= 0.0
        {
            return Extent::new(0, 0, 0, 0);
        }

        let x0 = rect.x.floor();
        let y0 = rect.y.floor();
        let x1 = (rect.x + rect.width).ceil();
        let y1 = (rect.y + rect.height).ceil();
        Extent {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_rounds_outward() {
        let e = Extent::integral(RectF::new(0.25, -0.75, 2.5, 1.5));
        assert_eq!(e, Extent::new(0, -1, 3, 2));
    }

    #[test]
    fn integral_keeps_whole_pixel_rects() {
        let e = Extent::integral(RectF::new(2.0, 3.0, 4.0, 5.0));
        assert_eq!(e, Extent::new(2, 3, 4, 5));
    }

    #[test]
    fn integral_maps_degenerate_rects_to_empty() {
        assert!(Extent::integral(RectF::new(0.0, 0.0, 0.0, 10.0)).is_empty());
        assert!(Extent::integral(RectF::new(0.0, 0.0, -1.0, 10.0)).is_empty());
        assert!(Extent::integral(RectF::new(f32::NAN, 0.0, 2.0, 2.0)).is_empty());
    }

    #[test]
    fn pixel_count_multiplies_dimensions() {
        assert_eq!(Extent::new(0, 0, 10, 10).pixel_count(), 100);
        assert_eq!(Extent::new(-3, 7, 2, 2).pixel_count(), 4);
    }
}
