use crossbeam_channel::{unbounded, Receiver};
use glam::Vec3;

use crate::animation::AnimationHolder;
use crate::assets::AssetPipeline;
use crate::config::CharacterConfig;
use crate::core::{Destroyable, Updatable};
use crate::debug::SharedDebugPanel;
use crate::error::{LookupError, Result};
use crate::scene::{NodeId, SharedScene};
use crate::time::FrameTime;

/// The animated fox: the model subtree plus its clip state machine.
pub struct Character {
    scene: SharedScene,
    root: Option<NodeId>,
    animation: AnimationHolder,
    requests: Receiver<String>,
}

impl Character {
    /// Places the model in the scene and starts its first clip.
    pub fn build(
        scene: &SharedScene,
        assets: &AssetPipeline,
        config: &CharacterConfig,
        debug: Option<&SharedDebugPanel>,
    ) -> Result<Self, LookupError> {
        let model = assets.model(&config.model)?;
        let required = config.clips.len().max(1);
        if model.animations.len() < required {
            return Err(LookupError::NotEnoughClips {
                model: config.model.clone(),
                available: model.animations.len(),
                required,
            });
        }
        let Some(first) = config.clips.first() else {
            return Err(LookupError::MissingClip { name: String::new() });
        };

        let mut s = scene.borrow_mut();
        if let Some(node) = s.node_mut(model.root) {
            node.transform.scale = Vec3::splat(config.scale);
        }
        let scene_root = s.root();
        s.attach(scene_root, model.root);
        for (id, _, _) in s.meshes_under(model.root) {
            if let Some(node) = s.node_mut(id) {
                node.cast_shadow = true;
            }
        }

        let mut animation = AnimationHolder::new(&s, first.clone(), model.animations[0].clone());
        for (name, clip) in config.clips.iter().zip(&model.animations).skip(1) {
            animation.register(&s, name.clone(), clip.clone());
        }
        drop(s);

        let (tx, requests) = unbounded();
        if let Some(panel) = debug {
            let mut panel = panel.borrow_mut();
            for name in &config.clips {
                let tx = tx.clone();
                let clip = name.clone();
                panel.add_action("fox", &action_label(name), Box::new(move || {
                    let _ = tx.send(clip.clone());
                }));
            }
            log::debug!("fox: {} debug actions registered", config.clips.len());
        }

        Ok(Self {
            scene: scene.clone(),
            root: Some(model.root),
            animation,
            requests,
        })
    }

    /// Switches to the clip registered as `name`.
    pub fn play(&mut self, name: &str) -> Result<(), LookupError> {
        self.animation.play(name)
    }

    pub fn current_animation(&self) -> &str {
        self.animation.current()
    }

    pub fn animation(&self) -> &AnimationHolder {
        &self.animation
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
}

/// `walking` -> `playWalking`.
fn action_label(clip: &str) -> String {
    let mut chars = clip.chars();
    match chars.next() {
        Some(first) => format!("play{}{}", first.to_uppercase(), chars.as_str()),
        None => "play".to_string(),
    }
}

impl Updatable for Character {
    fn update(&mut self, time: &FrameTime) -> Result<()> {
        if self.root.is_none() {
            return Ok(());
        }
        for name in self.requests.try_iter().collect::<Vec<_>>() {
            self.animation.play(&name)?;
        }
        let mut scene = self.scene.borrow_mut();
        self.animation.update(time.delta_seconds(), &mut scene);
        Ok(())
    }
}

impl Destroyable for Character {
    /// Stops playback and takes the model out of the scene. The subtree and its
    /// resources stay with the asset pipeline, which releases them.
    fn destroy(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        self.animation.stop();
        self.scene.borrow_mut().detach(root);
    }
}
