//! Time subsystem.
//!
//! Provides the per-frame time bundle of the experience without coupling to the
//! host loop. Intended usage:
//! - the host calls `TimeSource::tick()` once per display refresh
//! - participants subscribe through `Listenable::listen` and receive `FrameTime`

mod clock;
mod time_source;

pub use clock::{Clock, ManualClock, SystemClock};
pub use time_source::{FrameTime, TimeSource};
