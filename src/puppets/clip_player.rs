use super::AnimationMixer;
use crate::{animation::AnimationClip, Logger};

/// A minimal mixer that samples one morph weight track into a list of influences.
///
/// Every clip plays once and holds its last pose, the same way the viewer plays clips.
#[derive(Debug)]
pub struct ClipPlayer {
    logger: Logger,
    track_name: String,
    influences: Vec<f32>,
    clip: Option<AnimationClip>,
    time: f32,
    time_scale: f32,
}

impl ClipPlayer {
    pub fn new(target_count: usize, track_name: impl Into<String>) -> Self {
        Self {
            logger: Logger::create("ClipPlayer"),
            track_name: track_name.into(),
            influences: vec![0.0; target_count],
            clip: None,
            time: 0.0,
            time_scale: 1.0,
        }
    }

    /// Current morph target influences, one per slot.
    pub fn influences(&self) -> &[f32] {
        &self.influences
    }

    /// Manually set one influence, clamped to 0.0-1.0.
    ///
    /// An active clip overwrites this on its next update.
    pub fn set_influence(&mut self, index: usize, weight: f32) -> bool {
        match self.influences.get_mut(index) {
            Some(v) => {
                *v = weight.clamp(0.0, 1.0);
                true
            }
            None => {
                self.logger
                    .warn(format!("No morph target at index {index}, ignoring"));
                false
            }
        }
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.clip.as_ref().map(|v| v.name.as_str())
    }

    /// Whether the current clip has reached its end.
    pub fn is_finished(&self) -> bool {
        self.clip
            .as_ref()
            .map(|v| self.time >= v.duration)
            .unwrap_or(false)
    }

    fn apply(&mut self) {
        let Some(clip) = &self.clip else {
            return;
        };
        let Some(track) = clip.track(&self.track_name) else {
            return;
        };

        for (influence, value) in self.influences.iter_mut().zip(track.sample(self.time)) {
            *influence = value;
        }
    }
}

impl AnimationMixer for ClipPlayer {
    fn play_once(&mut self, clip: &AnimationClip) {
        match clip.track(&self.track_name) {
            None => self.logger.warn(format!(
                "Clip {} has no track named {}, nothing will move",
                clip.name, self.track_name
            )),
            Some(track) if !track.is_ordered() => self.logger.warn(format!(
                "Clip {} has unordered key times, playback will jump",
                clip.name
            )),
            Some(_) => {}
        }

        self.clip = Some(clip.clone());
        self.time = 0.0;
        self.apply();
    }

    fn update(&mut self, delta: f32) {
        let Some(duration) = self.clip.as_ref().map(|v| v.duration) else {
            return;
        };

        self.time = (self.time + delta * self.time_scale).clamp(0.0, duration);
        self.apply();
    }
}
