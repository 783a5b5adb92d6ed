use crate::core::Listenable;
use crate::event::{EventSource, Subscription};

use super::clock::{Clock, SystemClock};

/// Time bundle of the experience for one frame. All values are in milliseconds.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Epoch timestamp taken when the time source was created.
    pub start: f64,

    /// Epoch timestamp of the current tick.
    pub current: f64,

    /// Time since the previous tick. Zero on the first tick.
    pub delta: f64,

    /// Time since `start`.
    pub elapsed: f64,
}

impl FrameTime {
    /// Delta converted to seconds, the unit animation clips play in.
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        (self.delta * 0.001) as f32
    }

    /// Elapsed time converted to seconds.
    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        (self.elapsed * 0.001) as f32
    }
}

/// Produces a `FrameTime` per display refresh and pushes it to subscribers.
///
/// The first tick reports a zero delta instead of `current - 0`, and a clock that
/// goes backwards also yields zero. An optional clamp bounds the delta after long
/// stalls (debugger pauses, minimized windows).
pub struct TimeSource<C: Clock = SystemClock> {
    clock: C,
    time: FrameTime,
    ticked: bool,
    max_delta: Option<f64>,
    events: EventSource<FrameTime>,
}

impl TimeSource<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TimeSource<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TimeSource<C> {
    pub fn with_clock(clock: C) -> Self {
        let start = clock.now_millis();
        Self {
            clock,
            time: FrameTime {
                start,
                current: start,
                delta: 0.0,
                elapsed: 0.0,
            },
            ticked: false,
            max_delta: None,
            events: EventSource::new(),
        }
    }

    /// Clamps every delta to `max_millis`.
    pub fn with_max_delta(mut self, max_millis: Option<f64>) -> Self {
        self.max_delta = max_millis.filter(|m| m.is_finite() && *m >= 0.0);
        self
    }

    /// Advances the time bundle, pushes it to every subscriber and returns it.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.clock.now_millis();

        let mut delta = if self.ticked { now - self.time.current } else { 0.0 };
        if !delta.is_finite() || delta < 0.0 {
            delta = 0.0;
        }
        if let Some(max) = self.max_delta {
            delta = delta.min(max);
        }

        self.ticked = true;
        self.time.delta = delta;
        self.time.current = now;
        self.time.elapsed = (now - self.time.start).max(0.0);

        self.events.emit(self.time);
        self.time
    }

    /// Snapshot of the latest time bundle. Mutating it does not affect the source.
    pub fn experience_time(&self) -> FrameTime {
        self.time
    }

    /// Whether at least one tick happened.
    pub fn has_ticked(&self) -> bool {
        self.ticked
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

impl<C: Clock> Listenable<FrameTime> for TimeSource<C> {
    fn listen(&mut self) -> Subscription<FrameTime> {
        self.events.subscribe()
    }
}
