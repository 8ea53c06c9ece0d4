pub mod clip_player;
pub mod face_puppet;

use std::fmt::Display;

pub use clip_player::ClipPlayer;
pub use face_puppet::FacePuppet;

use crate::{animation::AnimationClip, receivers::ReceiverError};

/// Drives a puppet's morph targets from clips.
///
/// Implemented by whatever owns the rendered model. [ClipPlayer] is the in-crate version.
pub trait AnimationMixer {
    /// Play `clip` once from its start, holding the final pose when it ends.
    fn play_once(&mut self, clip: &AnimationClip);

    /// Advance playback by `delta` seconds.
    fn update(&mut self, delta: f32);
}

#[derive(Debug)]
pub enum PuppetError {
    /// The baked default clip was due but the asset did not provide one.
    NoDefaultClip,
    Receiver(ReceiverError),
}

impl Display for PuppetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDefaultClip => write!(f, "No default clip was registered"),
            Self::Receiver(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PuppetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoDefaultClip => None,
            Self::Receiver(e) => Some(e),
        }
    }
}

impl From<ReceiverError> for PuppetError {
    fn from(value: ReceiverError) -> Self {
        Self::Receiver(value)
    }
}
