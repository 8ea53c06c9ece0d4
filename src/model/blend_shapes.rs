use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One frame of blend shape weights as produced by a remote service.
///
/// Keys use the service's naming. Weights are nominally 0.0-1.0 but are not clamped.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendshapeFrame {
    #[serde(default)]
    pub blendshapes: BTreeMap<String, f32>,
}

impl BlendshapeFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, weight: f32) -> Self {
        self.blendshapes.insert(key.into(), weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.blendshapes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.blendshapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blendshapes.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for BlendshapeFrame {
    fn from_iter<T: IntoIterator<Item = (K, f32)>>(iter: T) -> Self {
        Self {
            blendshapes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Frames in temporal order, one per output animation frame.
///
/// Serializes as the talk service response, `{ "blendData": [...] }`. Any other
/// fields in the response are ignored.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendshapeBatch {
    #[serde(rename = "blendData", default)]
    pub frames: Vec<BlendshapeFrame>,
}

impl BlendshapeBatch {
    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlendshapeFrame> {
        self.frames.iter()
    }
}

impl From<Vec<BlendshapeFrame>> for BlendshapeBatch {
    fn from(value: Vec<BlendshapeFrame>) -> Self {
        Self { frames: value }
    }
}

impl FromIterator<BlendshapeFrame> for BlendshapeBatch {
    fn from_iter<T: IntoIterator<Item = BlendshapeFrame>>(iter: T) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_talk_response() {
        let batch = BlendshapeBatch::from_slice(
            br#"{
                "blendData": [
                    { "blendshapes": { "eyeBlinkLeft": 0.9, "jawOpen": 0.25 }, "time": 0.0 },
                    { "blendshapes": {} }
                ],
                "audio": "ignored"
            }"#,
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.frames[0].blendshapes["eyeBlinkLeft"], 0.9);
        assert_eq!(batch.frames[0].blendshapes["jawOpen"], 0.25);
        assert!(batch.frames[1].is_empty());
    }

    #[test]
    fn missing_blend_data() {
        let batch = BlendshapeBatch::from_slice(b"{}").unwrap();

        assert!(batch.is_empty());
    }

    #[test]
    fn frame_without_blendshapes() {
        let batch = BlendshapeBatch::from_slice(br#"{"blendData": [{}]}"#).unwrap();

        assert_eq!(batch.len(), 1);
        assert!(batch.frames[0].is_empty());
    }

    #[test]
    fn non_numeric_weight() {
        assert!(BlendshapeBatch::from_slice(
            br#"{"blendData": [{"blendshapes": {"jawOpen": "wide"}}]}"#
        )
        .is_err());
    }

    #[test]
    fn build_frame() {
        let frame = BlendshapeFrame::new().with("jawOpen", 0.5).with("jawOpen", 0.75);

        assert_eq!(frame.len(), 1);
        assert_eq!(frame.iter().collect::<Vec<_>>(), vec![("jawOpen", 0.75)]);
    }
}
