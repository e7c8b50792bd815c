use std::sync::Arc;

use crate::scene::Scene;

use super::clip::{AnimationClip, TrackData, TrackTarget};
use super::tracks::KeyframeCursor;

#[derive(Clone, Copy, Debug)]
struct Binding {
    track: usize,
    node: usize,
}

/// Plays one clip onto the nodes below a root node.
///
/// The player rests paused: scroll input positions it with [`set_time`]
/// and [`update`] only applies the sampled pose. When unpaused, `update`
/// advances time and loops at the clip end.
///
/// [`set_time`]: AnimationPlayer::set_time
/// [`update`]: AnimationPlayer::update
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    clip: Arc<AnimationClip>,
    root: Option<usize>,
    bindings: Vec<Binding>,
    cursors: Vec<KeyframeCursor>,
    time: f32,
    time_scale: f32,
    paused: bool,
}

impl AnimationPlayer {
    /// Bind `clip` to the subtree under `root` (the whole scene for `None`).
    ///
    /// Track node indices are shifted by `node_offset`, the offset the clip's
    /// hierarchy received when added to `scene`. Tracks pointing outside the
    /// subtree or at missing nodes are dropped.
    pub fn new(
        clip: Arc<AnimationClip>,
        root: Option<usize>,
        scene: &Scene,
        node_offset: usize,
    ) -> Self {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for (i, track) in clip.tracks.iter().enumerate() {
            let node = track.node + node_offset;
            let in_scope = scene.node(node).is_some()
                && root.map_or(true, |r| scene.is_in_subtree(node, r));
            if in_scope {
                bindings.push(Binding { track: i, node });
            } else {
                log::warn!(
                    "[animation] clip '{}' track {} targets node {} outside the player root",
                    clip.name,
                    i,
                    node
                );
            }
        }
        let cursors = vec![KeyframeCursor::default(); clip.tracks.len()];
        Self {
            clip,
            root,
            bindings,
            cursors,
            time: 0.0,
            time_scale: 1.0,
            paused: true,
        }
    }

    #[inline]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    #[inline]
    pub fn bound_tracks(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Playback speed multiplier used while playing; negative runs backwards.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn play(&mut self) {
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Set the playback position directly, independent of the paused flag.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Advance by `dt` seconds (only while playing) and write the pose at the
    /// current time into the bound nodes.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let duration = self.clip.duration;
        if !self.paused && duration > 0.0 {
            self.time = (self.time + dt * self.time_scale).rem_euclid(duration);
        }
        self.apply(scene);
    }

    fn apply(&mut self, scene: &mut Scene) {
        let time = self.time;
        for binding in &self.bindings {
            let track = &self.clip.tracks[binding.track];
            let cursor = &mut self.cursors[binding.track];
            let Some(node) = scene.node_mut(binding.node) else {
                continue;
            };
            let transform = &mut node.transform;
            match (&track.data, track.target) {
                (TrackData::Vector3(t), TrackTarget::Translation) => {
                    if let Some(v) = t.sample(time, cursor) {
                        transform.translation = v;
                    }
                }
                (TrackData::Vector3(t), TrackTarget::Scale) => {
                    if let Some(v) = t.sample(time, cursor) {
                        transform.scale = v;
                    }
                }
                (TrackData::Quaternion(t), TrackTarget::Rotation) => {
                    if let Some(q) = t.sample(time, cursor) {
                        transform.rotation = q;
                    }
                }
                _ => {}
            }
        }
    }
}
