pub mod clip;
pub mod player;
pub mod tracks;

pub use clip::{AnimationClip, Track, TrackData, TrackTarget};
pub use player::AnimationPlayer;
pub use tracks::{Interpolatable, Interpolation, KeyframeCursor, KeyframeTrack};
