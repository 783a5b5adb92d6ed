use kitsune_engine::debug::{DebugPanel, TunableRange, Tweak};
use kitsune_engine::input::{Key, Modifiers};

/// Steps per arrow press, and with shift held.
const NUDGE_STEPS: f32 = 10.0;
const FAST_NUDGE_STEPS: f32 = 100.0;

struct Tunable {
    folder: String,
    tweak: Tweak,
    range: TunableRange,
}

struct Action {
    folder: String,
    label: String,
    run: Box<dyn FnMut()>,
}

/// Debug panel driven from the keyboard, reporting through the log.
///
/// - `1`..`9` run the registered actions in registration order
/// - `Tab` selects the next tunable (`Shift+Tab` the previous one)
/// - arrow keys step the selected tunable up or down; shift steps faster
#[derive(Default)]
pub struct KeyboardPanel {
    tunables: Vec<Tunable>,
    actions: Vec<Action>,
    selected: usize,
    destroyed: bool,
}

impl KeyboardPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tunable_count(&self) -> usize {
        self.tunables.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// `folder/label` of the selected tunable.
    pub fn selected(&self) -> Option<String> {
        self.tunables
            .get(self.selected)
            .map(|t| format!("{}/{}", t.folder, t.range.label))
    }

    /// Logs every binding at info level.
    pub fn log_bindings(&self) {
        if self.tunables.is_empty() && self.actions.is_empty() {
            return;
        }
        log::info!(
            "debug panel: {} actions on 1-9, {} tunables on Tab and the arrow keys",
            self.action_count(),
            self.tunable_count()
        );
        for (i, action) in self.actions.iter().enumerate().take(9) {
            log::info!("  [{}] {}/{}", i + 1, action.folder, action.label);
        }
        for t in &self.tunables {
            log::info!("  {}/{} = {:.3}", t.folder, t.range.label, t.tweak.get());
        }
    }

    /// Applies a key press. Returns whether the panel consumed it.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if self.destroyed {
            return false;
        }

        if let Some(digit) = key.digit() {
            return self.run_action(digit);
        }

        match key {
            Key::Tab => self.cycle(if modifiers.shift { -1 } else { 1 }),
            Key::ArrowUp | Key::ArrowRight => self.nudge(1.0, modifiers),
            Key::ArrowDown | Key::ArrowLeft => self.nudge(-1.0, modifiers),
            _ => false,
        }
    }

    fn run_action(&mut self, digit: u8) -> bool {
        let Some(action) = (digit as usize).checked_sub(1).and_then(|i| self.actions.get_mut(i)) else {
            return false;
        };
        log::info!("debug action {}/{}", action.folder, action.label);
        (action.run)();
        true
    }

    fn cycle(&mut self, direction: isize) -> bool {
        let len = self.tunables.len();
        if len == 0 {
            return false;
        }
        self.selected = (self.selected as isize + direction).rem_euclid(len as isize) as usize;
        if let Some(name) = self.selected() {
            log::info!("selected {name} = {:.3}", self.tunables[self.selected].tweak.get());
        }
        true
    }

    fn nudge(&mut self, sign: f32, modifiers: Modifiers) -> bool {
        let Some(t) = self.tunables.get(self.selected) else {
            return false;
        };
        let steps = if modifiers.shift { FAST_NUDGE_STEPS } else { NUDGE_STEPS };
        t.tweak.nudge(&t.range, sign * steps);
        log::info!("{}/{} = {:.3}", t.folder, t.range.label, t.tweak.get());
        true
    }
}

impl DebugPanel for KeyboardPanel {
    fn add_tunable(&mut self, folder: &str, tweak: Tweak, range: TunableRange) {
        if self.destroyed {
            return;
        }
        log::debug!("panel tunable {folder}/{}", range.label);
        self.tunables.push(Tunable {
            folder: folder.to_string(),
            tweak,
            range,
        });
    }

    fn add_action(&mut self, folder: &str, label: &str, action: Box<dyn FnMut()>) {
        if self.destroyed {
            return;
        }
        log::debug!("panel action {folder}/{label}");
        self.actions.push(Action {
            folder: folder.to_string(),
            label: label.to_string(),
            run: action,
        });
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.tunables.clear();
        self.actions.clear();
        self.selected = 0;
        log::debug!("debug panel destroyed");
    }
}
