/*!
Keyframe tracks and clips in the shape the playback engine consumes.

A track's value stride is `values.len() / times.len()`, matching how the engine
interprets number tracks.
*/

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::timeline::MorphWeightTimeline;

/// How a [MorphWeightTimeline] is laid out as keyframes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipLayout {
    /// Two keys at the start and end, with the whole timeline as their values.
    ///
    /// The engine then treats every frame as part of one oversized value.
    Flattened,
    /// One key per frame spaced evenly between the start and end.
    #[default]
    PerFrame,
}

impl AsRef<str> for ClipLayout {
    fn as_ref(&self) -> &str {
        match self {
            ClipLayout::Flattened => "flattened",
            ClipLayout::PerFrame => "per-frame",
        }
    }
}

/// Values keyed by time.
///
/// `times` must be ascending, see [KeyframeTrack::is_ordered]. Unordered keys still
/// sample without panicking but only ever return values from neighbouring keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack {
    pub name: String,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

impl KeyframeTrack {
    pub fn new(name: impl Into<String>, times: Vec<f32>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            times,
            values,
        }
    }

    /// Number of values per key.
    pub fn value_size(&self) -> usize {
        if self.times.is_empty() {
            0
        } else {
            self.values.len() / self.times.len()
        }
    }

    /// Whether every key time is finite and no earlier than the one before it.
    pub fn is_ordered(&self) -> bool {
        self.times.iter().all(|v| v.is_finite()) && self.times.windows(2).all(|w| w[0] <= w[1])
    }

    pub fn start_time(&self) -> f32 {
        self.times.first().copied().unwrap_or_default()
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or_default()
    }

    /// Linearly interpolated values at `time`. Times outside the keys clamp to the
    /// first or last key.
    pub fn sample(&self, time: f32) -> Vec<f32> {
        let size = self.value_size();
        if size == 0 {
            return vec![];
        }

        let (idx, position) = keyframe_position(&self.times, time);
        let current = &self.values[idx * size..(idx + 1) * size];
        if position <= 0.0 {
            return current.to_vec();
        }

        let next = &self.values[(idx + 1) * size..(idx + 2) * size];
        current
            .iter()
            .zip(next)
            .map(|(a, b)| a + (b - a) * position)
            .collect()
    }
}

/// Find the key before `time` and how far `time` is towards the next key, in 0.0-1.0.
///
/// The returned key always has a successor unless the position is 0.0.
fn keyframe_position(times: &[f32], time: f32) -> (usize, f32) {
    let last = times.len().saturating_sub(1);
    if times.len() < 2 || !(time > times[0]) {
        return (0, 0.0);
    }
    if time >= times[last] {
        return (last, 0.0);
    }

    let idx = times
        .partition_point(|t| *t <= time)
        .saturating_sub(1)
        .min(last - 1);
    let span = times[idx + 1] - times[idx];
    if !(span > 0.0) {
        return (idx + 1, 0.0);
    }

    (idx, ((time - times[idx]) / span).clamp(0.0, 1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    /// Create a clip whose duration is the latest key of any track.
    pub fn new(name: impl Into<String>, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = tracks
            .iter()
            .map(KeyframeTrack::end_time)
            .fold(0.0, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Lay out `timeline` as a single morph weight track between `start` and `end`.
    pub fn from_timeline(
        name: impl Into<String>,
        track_name: impl Into<String>,
        timeline: &MorphWeightTimeline,
        start: f32,
        end: f32,
        layout: ClipLayout,
    ) -> Self {
        let times = match layout {
            ClipLayout::Flattened => vec![start, end],
            ClipLayout::PerFrame => evenly_spaced(timeline.frame_count(), start, end),
        };

        Self::new(
            name,
            vec![KeyframeTrack::new(
                track_name,
                times,
                timeline.as_slice().to_vec(),
            )],
        )
    }

    /// A two key clip of `target_count * frames` random weights in 0.0-1.0.
    pub fn random<R: Rng>(
        name: impl Into<String>,
        track_name: impl Into<String>,
        target_count: usize,
        frames: usize,
        end: f32,
        rng: &mut R,
    ) -> Self {
        let values = (0..target_count * frames)
            .map(|_| rng.gen::<f32>())
            .collect();

        Self::new(
            name,
            vec![KeyframeTrack::new(track_name, vec![0.0, end], values)],
        )
    }

    pub fn track(&self, name: &str) -> Option<&KeyframeTrack> {
        self.tracks.iter().find(|v| v.name == name)
    }
}

fn evenly_spaced(count: usize, start: f32, end: f32) -> Vec<f32> {
    match count {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f32;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f32 })
                .collect()
        }
    }
}
