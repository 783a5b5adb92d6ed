use std::collections::BTreeMap;
use std::rc::Rc;

use slotmap::SlotMap;

use crate::scene::{NodeId, Scene};

use super::action::{ActionId, AnimationAction};
use super::clip::{AnimationClip, Channel, Sample};

/// Running weighted blend for one bound property.
#[derive(Debug, Copy, Clone)]
struct Accumulator {
    value: Sample,
    weight: f32,
}

impl Accumulator {
    /// Folds `sample` in as a running weighted average.
    fn add(&mut self, sample: Sample, weight: f32) {
        self.weight += weight;
        let mix = weight / self.weight;
        self.value = blend(self.value, sample, mix);
    }
}

fn blend(a: Sample, b: Sample, t: f32) -> Sample {
    match (a, b) {
        (Sample::Translation(a), Sample::Translation(b)) => Sample::Translation(a.lerp(b, t)),
        (Sample::Scale(a), Sample::Scale(b)) => Sample::Scale(a.lerp(b, t)),
        (Sample::Rotation(a), Sample::Rotation(b)) => Sample::Rotation(a.slerp(b, t).normalize()),
        (a, _) => a,
    }
}

/// Plays clip actions against the scene and blends their contributions.
///
/// Properties driven with a total weight below 1 are blended toward the pose the
/// node had when its first action was created, so fading everything out returns
/// the model to rest instead of freezing it.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    time: f32,
    actions: SlotMap<ActionId, AnimationAction>,
    bind_pose: BTreeMap<(NodeId, Channel), Sample>,
}

impl AnimationMixer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mixer clock, seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Creates an action for `clip`, recording the rest pose of every node it drives.
    pub fn clip_action(&mut self, clip: Rc<AnimationClip>, scene: &Scene) -> ActionId {
        for track in &clip.tracks {
            let key = (track.target, track.channel());
            if self.bind_pose.contains_key(&key) {
                continue;
            }
            if let Some(node) = scene.node(track.target) {
                let t = node.transform;
                let rest = match key.1 {
                    Channel::Translation => Sample::Translation(t.translation),
                    Channel::Rotation => Sample::Rotation(t.rotation),
                    Channel::Scale => Sample::Scale(t.scale),
                };
                self.bind_pose.insert(key, rest);
            }
        }
        self.actions.insert(AnimationAction::new(clip))
    }

    pub fn action(&self, id: ActionId) -> Option<&AnimationAction> {
        self.actions.get(id)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut AnimationAction> {
        self.actions.get_mut(id)
    }

    pub fn play(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id) {
            a.play();
        }
    }

    pub fn stop(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id) {
            a.stop();
        }
    }

    pub fn reset(&mut self, id: ActionId) {
        if let Some(a) = self.actions.get_mut(id) {
            a.reset();
        }
    }

    pub fn fade_in(&mut self, id: ActionId, duration: f32) {
        let now = self.time;
        if let Some(a) = self.actions.get_mut(id) {
            a.fade_in(now, duration);
        }
    }

    pub fn fade_out(&mut self, id: ActionId, duration: f32) {
        let now = self.time;
        if let Some(a) = self.actions.get_mut(id) {
            a.fade_out(now, duration);
        }
    }

    /// Fades `from` out while fading `to` in over the same window.
    pub fn cross_fade(&mut self, from: ActionId, to: ActionId, duration: f32) {
        self.fade_out(from, duration);
        self.fade_in(to, duration);
    }

    pub fn stop_all(&mut self) {
        for (_, a) in self.actions.iter_mut() {
            a.stop();
        }
    }

    /// Sum of effective weights of the latest blend.
    pub fn total_weight(&self) -> f32 {
        self.actions.values().map(AnimationAction::effective_weight).sum()
    }

    /// Advances the clock by `delta` seconds and writes the blended pose into `scene`.
    pub fn update(&mut self, delta: f32, scene: &mut Scene) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.time += delta;
        let now = self.time;

        let mut blended: BTreeMap<(NodeId, Channel), Accumulator> = BTreeMap::new();
        for (_, action) in self.actions.iter_mut() {
            action.advance(now, delta);
            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }
            for track in &action.clip().tracks {
                let Some(sample) = track.sample(action.time) else {
                    continue;
                };
                blended
                    .entry((track.target, track.channel()))
                    .and_modify(|acc| acc.add(sample, weight))
                    .or_insert(Accumulator { value: sample, weight });
            }
        }

        for (key, rest) in &self.bind_pose {
            let value = match blended.get(key) {
                Some(acc) if acc.weight >= 1.0 => acc.value,
                Some(acc) => blend(acc.value, *rest, 1.0 - acc.weight),
                None => *rest,
            };
            let Some(node) = scene.node_mut(key.0) else {
                continue;
            };
            match value {
                Sample::Translation(v) => node.transform.translation = v,
                Sample::Rotation(q) => node.transform.rotation = q,
                Sample::Scale(s) => node.transform.scale = s,
            }
        }
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{KeyframeTrack, TrackValues};
    use crate::scene::Node;
    use approx::assert_relative_eq;
    use glam::Vec3;

    fn translation_of(scene: &Scene, node: NodeId) -> Vec3 {
        scene.node(node).map_or(Vec3::ZERO, |n| n.transform.translation)
    }

    /// A clip that holds `node` at `x` along the X axis.
    fn hold_clip(name: &str, node: NodeId, x: f32) -> Rc<AnimationClip> {
        let track = KeyframeTrack {
            target: node,
            times: vec![0.0, 1.0],
            values: TrackValues::Translation(vec![Vec3::new(x, 0.0, 0.0); 2]),
        };
        Rc::new(AnimationClip::new(name, vec![track]))
    }

    fn scene_with_node() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.root();
        let node = scene.spawn(root, Node::group("bone"));
        (scene, node)
    }

    #[test]
    fn single_action_drives_the_node() {
        let (mut scene, node) = scene_with_node();
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(hold_clip("a", node, 2.0), &scene);
        mixer.play(a);
        mixer.update(0.1, &mut scene);
        assert_relative_eq!(translation_of(&scene, node).x, 2.0);
    }

    #[test]
    fn crossfade_blends_without_a_gap() {
        let (mut scene, node) = scene_with_node();
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(hold_clip("a", node, 0.0), &scene);
        let b = mixer.clip_action(hold_clip("b", node, 4.0), &scene);
        mixer.play(a);
        mixer.update(0.1, &mut scene);

        mixer.reset(b);
        mixer.play(b);
        mixer.cross_fade(a, b, 1.0);

        mixer.update(0.5, &mut scene);
        assert_relative_eq!(mixer.total_weight(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(translation_of(&scene, node).x, 2.0, epsilon = 1e-4);

        mixer.update(0.6, &mut scene);
        assert_relative_eq!(translation_of(&scene, node).x, 4.0, epsilon = 1e-4);
        assert!(!mixer.action(a).unwrap().is_enabled());
    }

    #[test]
    fn partial_weight_blends_toward_rest_pose() {
        let (mut scene, node) = scene_with_node();
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(hold_clip("a", node, 2.0), &scene);
        mixer.action_mut(a).unwrap().weight = 0.25;
        mixer.play(a);
        mixer.update(0.1, &mut scene);
        assert_relative_eq!(translation_of(&scene, node).x, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn stopping_everything_restores_the_rest_pose() {
        let (mut scene, node) = scene_with_node();
        scene.node_mut(node).unwrap().transform.translation = Vec3::new(0.0, 1.0, 0.0);
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(hold_clip("a", node, 3.0), &scene);
        mixer.play(a);
        mixer.update(0.1, &mut scene);

        mixer.stop_all();
        mixer.update(0.1, &mut scene);
        assert_eq!(translation_of(&scene, node), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn removed_nodes_are_skipped() {
        let (mut scene, node) = scene_with_node();
        let mut mixer = AnimationMixer::new();
        let a = mixer.clip_action(hold_clip("a", node, 1.0), &scene);
        mixer.play(a);
        scene.remove_subtree(node);
        mixer.update(0.1, &mut scene);
        assert_relative_eq!(mixer.time(), 0.1);
    }
}
