use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LookupError;
use crate::scene::Scene;

use super::action::ActionId;
use super::clip::AnimationClip;
use super::mixer::AnimationMixer;

/// Blend window of a clip transition, seconds.
pub const CROSSFADE_SECONDS: f32 = 1.0;

/// Named-clip state machine over an [`AnimationMixer`].
///
/// Exactly one action is current at any time. `play` swaps it in a single call,
/// so nothing observing the holder between frames ever sees a transition half
/// applied.
#[derive(Debug)]
pub struct AnimationHolder {
    mixer: AnimationMixer,
    actions: HashMap<String, ActionId>,
    current: String,
    crossfade: f32,
}

impl AnimationHolder {
    /// Registers `clip` under `name` and starts playing it as the current clip.
    pub fn new(scene: &Scene, name: impl Into<String>, clip: Rc<AnimationClip>) -> Self {
        let name = name.into();
        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(clip, scene);
        mixer.play(action);

        let mut actions = HashMap::new();
        actions.insert(name.clone(), action);
        Self {
            mixer,
            actions,
            current: name,
            crossfade: CROSSFADE_SECONDS,
        }
    }

    /// Makes `clip` available under `name`. Re-registering a name replaces the
    /// previous action unless it is the current one.
    pub fn register(&mut self, scene: &Scene, name: impl Into<String>, clip: Rc<AnimationClip>) {
        let name = name.into();
        if name == self.current {
            log::warn!("animation '{name}' is playing and cannot be replaced");
            return;
        }
        let action = self.mixer.clip_action(clip, scene);
        self.actions.insert(name, action);
    }

    /// Transitions to the clip registered as `name`.
    ///
    /// The target restarts from zero and fades in while the current clip fades
    /// out. Playing the current clip again restarts it without a fade. An unknown
    /// name fails and leaves the current clip untouched.
    pub fn play(&mut self, name: &str) -> Result<(), LookupError> {
        let Some(&next) = self.actions.get(name) else {
            return Err(LookupError::MissingClip {
                name: name.to_string(),
            });
        };
        let previous = self.current_action();

        self.mixer.reset(next);
        self.mixer.play(next);
        if next != previous {
            self.mixer.cross_fade(previous, next, self.crossfade);
        }
        log::debug!("animation '{}' -> '{name}'", self.current);
        self.current = name.to_string();
        Ok(())
    }

    /// Name of the current clip.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn current_action(&self) -> ActionId {
        // The current name always has an entry: it is only ever set to a key of `actions`.
        self.actions[&self.current]
    }

    pub fn action(&self, name: &str) -> Option<ActionId> {
        self.actions.get(name).copied()
    }

    pub fn clip(&self, name: &str) -> Option<&Rc<AnimationClip>> {
        let id = self.action(name)?;
        self.mixer.action(id).map(|a| a.clip())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn set_crossfade(&mut self, seconds: f32) {
        self.crossfade = seconds.max(0.0);
    }

    /// Advances the mixer by `delta_seconds`.
    pub fn update(&mut self, delta_seconds: f32, scene: &mut Scene) {
        self.mixer.update(delta_seconds, scene);
    }

    pub fn stop(&mut self) {
        self.mixer.stop_all();
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{KeyframeTrack, TrackValues};
    use crate::scene::{Node, NodeId};
    use glam::Vec3;

    fn clip(name: &str, node: NodeId) -> Rc<AnimationClip> {
        Rc::new(AnimationClip::new(
            name,
            vec![KeyframeTrack {
                target: node,
                times: vec![0.0, 1.0],
                values: TrackValues::Translation(vec![Vec3::ZERO, Vec3::Y]),
            }],
        ))
    }

    fn fox() -> (Scene, AnimationHolder) {
        let mut scene = Scene::new();
        let root = scene.root();
        let node = scene.spawn(root, Node::group("fox"));
        let mut holder = AnimationHolder::new(&scene, "idle", clip("Survey", node));
        holder.register(&scene, "walking", clip("Walk", node));
        holder.register(&scene, "running", clip("Run", node));
        (scene, holder)
    }

    #[test]
    fn starts_on_the_first_clip() {
        let (_, holder) = fox();
        assert_eq!(holder.current(), "idle");
        let id = holder.current_action();
        assert!(holder.mixer().action(id).unwrap().is_running());
    }

    #[test]
    fn sequential_plays_end_on_the_last_clip() {
        let (_, mut holder) = fox();
        holder.play("walking").unwrap();
        holder.play("running").unwrap();

        assert_eq!(holder.current(), "running");
        assert_eq!(holder.current_action(), holder.action("running").unwrap());
        assert_eq!(holder.clip("idle").unwrap().name, "Survey");
        assert_eq!(holder.clip("walking").unwrap().name, "Walk");
    }

    #[test]
    fn unknown_clip_fails_and_keeps_current() {
        let (_, mut holder) = fox();
        holder.play("walking").unwrap();

        let err = holder.play("nonexistent").unwrap_err();
        assert_eq!(err, LookupError::MissingClip { name: "nonexistent".into() });
        assert_eq!(holder.current(), "walking");
    }

    #[test]
    fn transition_crossfades_over_one_second() {
        let (mut scene, mut holder) = fox();
        holder.update(0.1, &mut scene);
        holder.play("walking").unwrap();

        holder.update(0.5, &mut scene);
        let idle = holder.mixer().action(holder.action("idle").unwrap()).unwrap();
        let walk = holder.mixer().action(holder.action("walking").unwrap()).unwrap();
        assert!(idle.effective_weight() > 0.0 && walk.effective_weight() > 0.0);
        assert!((idle.effective_weight() + walk.effective_weight() - 1.0).abs() < 1e-5);

        holder.update(0.6, &mut scene);
        let idle = holder.mixer().action(holder.action("idle").unwrap()).unwrap();
        assert!(!idle.is_enabled());
    }

    #[test]
    fn replaying_current_restarts_without_fade() {
        let (mut scene, mut holder) = fox();
        holder.update(0.4, &mut scene);
        holder.play("idle").unwrap();

        let id = holder.current_action();
        let action = holder.mixer().action(id).unwrap();
        assert_eq!(action.time, 0.0);
        assert!(!action.is_fading());
    }
}
