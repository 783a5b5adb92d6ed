use std::rc::Rc;

use super::clip::AnimationClip;

slotmap::new_key_type! {
    /// Handle to an action owned by an [`AnimationMixer`](super::AnimationMixer).
    pub struct ActionId;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoopMode {
    /// Plays through once, then disables itself.
    Once,
    Repeat,
}

/// Scheduled linear weight ramp, in mixer time.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Fade {
    start: f32,
    duration: f32,
    from: f32,
    to: f32,
}

impl Fade {
    fn value_at(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ((now - self.start) / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn is_done(&self, now: f32) -> bool {
        now >= self.start + self.duration
    }
}

/// Playback state of one clip inside a mixer.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Rc<AnimationClip>,
    /// Local play head, seconds.
    pub time: f32,
    pub time_scale: f32,
    /// Weight before fades are applied.
    pub weight: f32,
    pub loop_mode: LoopMode,
    enabled: bool,
    running: bool,
    fade: Option<Fade>,
    effective_weight: f32,
}

impl AnimationAction {
    pub(super) fn new(clip: Rc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            enabled: true,
            running: false,
            fade: None,
            effective_weight: 0.0,
        }
    }

    pub fn clip(&self) -> &Rc<AnimationClip> {
        &self.clip
    }

    pub fn is_running(&self) -> bool {
        self.running && self.enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Weight used in the latest blend, fades included.
    pub fn effective_weight(&self) -> f32 {
        self.effective_weight
    }

    /// Rewinds to the start, re-enables and cancels any fade.
    pub(super) fn reset(&mut self) {
        self.time = 0.0;
        self.enabled = true;
        self.fade = None;
    }

    pub(super) fn play(&mut self) {
        self.running = true;
    }

    pub(super) fn stop(&mut self) {
        self.reset();
        self.running = false;
        self.effective_weight = 0.0;
    }

    pub(super) fn fade_in(&mut self, now: f32, duration: f32) {
        self.fade = Some(Fade {
            start: now,
            duration,
            from: 0.0,
            to: 1.0,
        });
    }

    /// Ramps from the current weight so an interrupted fade does not pop.
    pub(super) fn fade_out(&mut self, now: f32, duration: f32) {
        let from = if self.running { self.current_fade_factor(now) } else { 0.0 };
        self.fade = Some(Fade {
            start: now,
            duration,
            from,
            to: 0.0,
        });
    }

    fn current_fade_factor(&self, now: f32) -> f32 {
        self.fade.map_or(1.0, |f| f.value_at(now))
    }

    /// Advances the play head by `delta` seconds and refreshes the blend weight.
    pub(super) fn advance(&mut self, now: f32, delta: f32) {
        if !self.is_running() {
            self.effective_weight = 0.0;
            return;
        }

        self.time += delta * self.time_scale;
        let duration = self.clip.duration;
        match self.loop_mode {
            LoopMode::Repeat if duration > 0.0 => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::Repeat => self.time = 0.0,
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.enabled = false;
                }
            }
        }

        let factor = self.current_fade_factor(now);
        if let Some(fade) = self.fade {
            if fade.is_done(now) {
                self.fade = None;
                if fade.to <= 0.0 {
                    self.enabled = false;
                }
            }
        }

        self.effective_weight = if self.enabled { self.weight * factor } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn action(duration: f32) -> AnimationAction {
        use crate::animation::{KeyframeTrack, TrackValues};
        use glam::Vec3;
        use slotmap::KeyData;

        let track = KeyframeTrack {
            target: crate::scene::NodeId::from(KeyData::from_ffi(1)),
            times: vec![0.0, duration],
            values: TrackValues::Translation(vec![Vec3::ZERO, Vec3::X]),
        };
        AnimationAction::new(Rc::new(AnimationClip::new("c", vec![track])))
    }

    #[test]
    fn repeat_wraps_the_play_head() {
        let mut a = action(2.0);
        a.play();
        a.advance(0.0, 2.5);
        assert_relative_eq!(a.time, 0.5);
        assert_relative_eq!(a.effective_weight(), 1.0);
    }

    #[test]
    fn once_disables_at_the_end() {
        let mut a = action(1.0);
        a.loop_mode = LoopMode::Once;
        a.play();
        a.advance(0.0, 1.5);
        assert!(!a.is_enabled());
        assert_eq!(a.effective_weight(), 0.0);
    }

    #[test]
    fn fade_out_ends_disabled() {
        let mut a = action(1.0);
        a.play();
        a.fade_out(0.0, 1.0);
        a.advance(0.5, 0.5);
        assert_relative_eq!(a.effective_weight(), 0.5);
        a.advance(1.0, 0.5);
        assert!(!a.is_enabled());
        assert!(!a.is_fading());
    }

    #[test]
    fn stopped_action_contributes_nothing() {
        let mut a = action(1.0);
        a.play();
        a.stop();
        a.advance(0.0, 0.1);
        assert!(!a.is_running());
        assert_eq!(a.effective_weight(), 0.0);
    }
}
