//! Optional debug panel capability.
//!
//! Participants register tunables and actions on a panel when one is injected;
//! without a panel they skip registration entirely.

mod mode;
mod panel;
mod tweak;

pub use mode::DebugMode;
pub use panel::{DebugPanel, SharedDebugPanel};
pub use tweak::{TunableRange, Tweak};
