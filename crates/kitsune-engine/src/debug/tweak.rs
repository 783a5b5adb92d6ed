use std::cell::Cell;
use std::rc::Rc;

/// Bounds and presentation of a tunable.
#[derive(Debug, Clone, PartialEq)]
pub struct TunableRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub label: String,
}

impl TunableRange {
    pub fn new(label: impl Into<String>, min: f32, max: f32, step: f32) -> Self {
        Self {
            min,
            max,
            step,
            label: label.into(),
        }
    }

    /// Clamps `value` into `[min, max]` and snaps it to the step grid from `min`.
    pub fn apply(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

#[derive(Debug)]
struct TweakCell {
    value: Cell<f32>,
    changed: Cell<bool>,
}

/// Shared value cell edited by a debug panel and read by its owner.
///
/// Clones observe the same value. The owner polls [`Tweak::take_changed`] on its
/// own turn, so the panel never reaches into the owner's state.
#[derive(Debug, Clone)]
pub struct Tweak {
    cell: Rc<TweakCell>,
}

impl Tweak {
    pub fn new(value: f32) -> Self {
        Self {
            cell: Rc::new(TweakCell {
                value: Cell::new(value),
                changed: Cell::new(false),
            }),
        }
    }

    pub fn get(&self) -> f32 {
        self.cell.value.get()
    }

    /// Stores `value`, flagging a change when it differs.
    pub fn set(&self, value: f32) {
        if self.cell.value.get() != value {
            self.cell.value.set(value);
            self.cell.changed.set(true);
        }
    }

    /// Moves by `steps` increments of `range.step`, staying within `range`.
    pub fn nudge(&self, range: &TunableRange, steps: f32) {
        self.set(range.apply(self.get() + steps * range.step));
    }

    /// Returns whether the value changed since the previous call, clearing the flag.
    pub fn take_changed(&self) -> bool {
        self.cell.changed.replace(false)
    }
}
