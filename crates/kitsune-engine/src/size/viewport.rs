/// Upper bound applied to the device pixel ratio. Above 2 the extra render cost
/// buys nothing visible.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Viewport size in logical pixels plus the pixel ratio to render with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
    /// Always within `[1, MAX_PIXEL_RATIO]`.
    pub pixel_ratio: f64,
}

impl ViewportSize {
    /// Builds a size from raw metrics, applying the pixel ratio policy.
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Width over height. A zero height yields 1 so projections stay finite.
    #[inline]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Drawing buffer size in physical pixels.
    #[inline]
    pub fn physical(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).round() as u32,
            (self.height * self.pixel_ratio).round() as u32,
        )
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// `min(device_ratio, 2)`, with non-finite or sub-1 ratios mapped into `[1, 2]`.
pub(crate) fn clamp_pixel_ratio(device_ratio: f64) -> f64 {
    if !device_ratio.is_finite() || device_ratio <= 0.0 {
        return 1.0;
    }
    device_ratio.clamp(1.0, MAX_PIXEL_RATIO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_capped_at_two() {
        assert_eq!(ViewportSize::new(10.0, 10.0, 3.0).pixel_ratio, 2.0);
        assert_eq!(ViewportSize::new(10.0, 10.0, 1.5).pixel_ratio, 1.5);
    }

    #[test]
    fn pixel_ratio_never_drops_below_one() {
        assert_eq!(ViewportSize::new(10.0, 10.0, 0.5).pixel_ratio, 1.0);
        assert_eq!(ViewportSize::new(10.0, 10.0, f64::NAN).pixel_ratio, 1.0);
        assert_eq!(ViewportSize::new(10.0, 10.0, -2.0).pixel_ratio, 1.0);
    }

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(ViewportSize::new(800.0, 0.0, 1.0).aspect(), 1.0);
        assert_eq!(ViewportSize::new(800.0, 400.0, 1.0).aspect(), 2.0);
    }

    #[test]
    fn physical_size_applies_ratio() {
        assert_eq!(ViewportSize::new(800.0, 600.0, 2.0).physical(), (1600, 1200));
    }

    #[test]
    fn negative_extents_collapse_to_empty() {
        let s = ViewportSize::new(-5.0, f64::INFINITY, 1.0);
        assert!(s.is_empty());
    }
}
