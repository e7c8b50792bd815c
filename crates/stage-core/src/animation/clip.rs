use glam::{Quat, Vec3};

use super::tracks::KeyframeTrack;

/// Node property a track drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackTarget {
    Translation,
    Rotation,
    Scale,
}

#[derive(Clone, Debug)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.end_time(),
            TrackData::Quaternion(t) => t.end_time(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Track {
    /// Index of the node in the stage scene.
    pub node: usize,
    pub target: TrackTarget,
    pub data: TrackData,
}

/// A fixed-duration timeline; immutable once loaded.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is the latest key time over all tracks.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
