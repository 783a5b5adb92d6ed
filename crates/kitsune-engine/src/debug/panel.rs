use std::cell::RefCell;
use std::rc::Rc;

use super::tweak::{TunableRange, Tweak};

/// Debug panel shared by every participant that registers on it.
pub type SharedDebugPanel = Rc<RefCell<dyn DebugPanel>>;

/// External observer that exposes tunables and actions to a developer.
///
/// The core only ever registers on a panel; nothing it does depends on one
/// being present.
pub trait DebugPanel {
    /// Exposes `tweak` under `folder`, bounded by `range`.
    fn add_tunable(&mut self, folder: &str, tweak: Tweak, range: TunableRange);

    /// Exposes a button labelled `label` under `folder`.
    fn add_action(&mut self, folder: &str, label: &str, action: Box<dyn FnMut()>);

    /// Releases the panel. Calling it again must be a no-op.
    fn destroy(&mut self);
}
