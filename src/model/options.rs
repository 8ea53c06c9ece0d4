use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{InvalidConfigError, MorphTargetTable};
use crate::animation::ClipLayout;

/// Where the talk service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TalkServiceOptions {
    pub address: String,
    pub port: u16,
    pub path: String,
    pub timeout_secs: u64,
}

impl Default for TalkServiceOptions {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 5000,
            path: "/talk".to_string(),
            timeout_secs: 30,
        }
    }
}

impl TalkServiceOptions {
    pub fn url(&self) -> String {
        let path = self.path.trim_start_matches('/');

        format!("http://{}:{}/{}", self.address, self.port, path)
    }
}

/// How synthesized clips are built and played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackOptions {
    /// Property path the morph weight track animates.
    pub track_name: String,
    /// Weight of any slot a frame does not mention.
    pub neutral_weight: f32,
    /// End time of clips built from talk service responses.
    pub talk_clip_end: f32,
    /// End time of the random blink clip.
    pub blink_clip_end: f32,
    /// Frames of random weights in the blink clip.
    pub blink_frames: usize,
    pub layout: ClipLayout,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            track_name: "mesh_2.morphTargetInfluences".to_string(),
            neutral_weight: crate::timeline::NEUTRAL_WEIGHT,
            talk_clip_end: 2.0,
            blink_clip_end: 3.0,
            blink_frames: 10,
            layout: ClipLayout::default(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub talk_service: TalkServiceOptions,
    pub playback: PlaybackOptions,
    /// JSON morph target table. The built-in facecap table is used when unset.
    pub morph_targets: Option<PathBuf>,
}

impl Config {
    pub fn from_json(data: &str) -> Result<Self, InvalidConfigError> {
        let config = serde_json::from_str::<Config>(data)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InvalidConfigError> {
        Self::from_json(&super::read_file(path.as_ref())?)
    }

    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        let playback = &self.playback;

        if !playback.neutral_weight.is_finite() {
            return Err(invalid("neutral_weight", "must be finite"));
        }
        if !(playback.talk_clip_end > 0.0) {
            return Err(invalid("talk_clip_end", "must be greater than 0"));
        }
        if !(playback.blink_clip_end > 0.0) {
            return Err(invalid("blink_clip_end", "must be greater than 0"));
        }
        if playback.blink_frames == 0 {
            return Err(invalid("blink_frames", "must be at least 1"));
        }
        if self.talk_service.address.is_empty() {
            return Err(invalid("address", "must not be empty"));
        }
        if self.talk_service.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }

        Ok(())
    }

    /// Load the configured morph target table, falling back to facecap.
    pub fn morph_target_table(&self) -> Result<MorphTargetTable, InvalidConfigError> {
        match &self.morph_targets {
            Some(path) => MorphTargetTable::load(path),
            None => Ok(MorphTargetTable::facecap().clone()),
        }
    }
}

fn invalid(option: &'static str, reason: &str) -> InvalidConfigError {
    InvalidConfigError::InvalidOption {
        option,
        reason: reason.to_string(),
    }
}
