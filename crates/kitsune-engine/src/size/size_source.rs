use crate::core::Listenable;
use crate::event::{EventSource, Subscription};

use super::viewport::ViewportSize;

/// Tracks the environment's viewport metrics and announces genuine resizes.
///
/// The host reports window metrics through [`SizeSource::resize`]; the source only
/// emits when the derived [`ViewportSize`] actually changed, never per frame.
pub struct SizeSource {
    width: f64,
    height: f64,
    device_pixel_ratio: f64,
    events: EventSource<ViewportSize>,
}

impl SizeSource {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            events: EventSource::new(),
        }
    }

    /// Current viewport size. Pure query; repeated calls agree until a resize.
    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height, self.device_pixel_ratio)
    }

    /// Records new environment metrics.
    ///
    /// Returns the new size when it differs from the previous one, after pushing it
    /// to every subscriber.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) -> Option<ViewportSize> {
        let before = self.size();
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;

        let after = self.size();
        if after == before {
            return None;
        }

        log::debug!(
            "viewport resized to {}x{} @{}",
            after.width,
            after.height,
            after.pixel_ratio
        );
        self.events.emit(after);
        Some(after)
    }

    /// Raw device pixel ratio as last reported by the host, before the cap.
    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

impl Listenable<ViewportSize> for SizeSource {
    fn listen(&mut self) -> Subscription<ViewportSize> {
        self.events.subscribe()
    }
}
