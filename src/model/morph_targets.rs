/*!
Morph target slots of the face rig.

The rig addresses its morph targets by integer slot. The table here maps the rig's
blend shape names onto those slots and is validated once when it is loaded.
*/

use std::{collections::HashMap, path::Path};

use once_cell::sync::Lazy;

use super::InvalidConfigError;

/// Morph target names of the facecap head mesh, in slot order.
pub const FACECAP_MORPH_TARGETS: [&str; 52] = [
    "browInnerUp",
    "browDown_L",
    "browDown_R",
    "browOuterUp_L",
    "browOuterUp_R",
    "eyeLookUp_L",
    "eyeLookUp_R",
    "eyeLookDown_L",
    "eyeLookDown_R",
    "eyeLookIn_L",
    "eyeLookIn_R",
    "eyeLookOut_L",
    "eyeLookOut_R",
    "eyeBlink_L",
    "eyeBlink_R",
    "eyeSquint_L",
    "eyeSquint_R",
    "eyeWide_L",
    "eyeWide_R",
    "cheekPuff",
    "cheekSquint_L",
    "cheekSquint_R",
    "noseSneer_L",
    "noseSneer_R",
    "jawOpen",
    "jawForward",
    "jawLeft",
    "jawRight",
    "mouthFunnel",
    "mouthPucker",
    "mouthLeft",
    "mouthRight",
    "mouthRollUpper",
    "mouthRollLower",
    "mouthShrugUpper",
    "mouthShrugLower",
    "mouthClose",
    "mouthSmile_L",
    "mouthSmile_R",
    "mouthFrown_L",
    "mouthFrown_R",
    "mouthDimple_L",
    "mouthDimple_R",
    "mouthUpperUp_L",
    "mouthUpperUp_R",
    "mouthLowerDown_L",
    "mouthLowerDown_R",
    "mouthPress_L",
    "mouthPress_R",
    "mouthStretch_L",
    "mouthStretch_R",
    "tongueOut",
];

static FACECAP: Lazy<MorphTargetTable> = Lazy::new(|| MorphTargetTable {
    indices: FACECAP_MORPH_TARGETS
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect(),
    names: FACECAP_MORPH_TARGETS.iter().map(|v| v.to_string()).collect(),
});

/// Immutable mapping from rig blend shape name to morph target slot.
///
/// Slots always form the dense range `0..len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTargetTable {
    indices: HashMap<String, usize>,
    /// Slot -> name.
    names: Vec<String>,
}

impl MorphTargetTable {
    /// The built-in 52 entry table of the facecap model.
    pub fn facecap() -> &'static MorphTargetTable {
        &FACECAP
    }

    /// Build a table from `(name, index)` pairs.
    ///
    /// Every index must be non-negative, less than the number of entries and unique.
    pub fn from_entries<I, K>(entries: I) -> Result<Self, InvalidConfigError>
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<Vec<(String, i64)>>();
        if entries.is_empty() {
            return Err(InvalidConfigError::Empty);
        }

        let len = entries.len();
        let mut slots: Vec<Option<String>> = vec![None; len];
        let mut indices = HashMap::with_capacity(len);

        for (name, index) in entries {
            if index < 0 {
                return Err(InvalidConfigError::NegativeIndex { name, index });
            }
            let slot = index as usize;
            if slot >= len {
                return Err(InvalidConfigError::IndexOutOfRange { name, index, len });
            }
            if indices.contains_key(&name) {
                return Err(InvalidConfigError::DuplicateName(name));
            }
            if let Some(first) = &slots[slot] {
                return Err(InvalidConfigError::DuplicateIndex {
                    index: slot,
                    first: first.clone(),
                    second: name,
                });
            }

            slots[slot] = Some(name.clone());
            indices.insert(name, slot);
        }

        // len unique in-range indices fill every slot
        let names = slots.into_iter().flatten().collect();

        Ok(Self { indices, names })
    }

    /// Parse a JSON object of `{ "name": index }`.
    pub fn from_json(data: &str) -> Result<Self, InvalidConfigError> {
        let entries = serde_json::from_str::<HashMap<String, i64>>(data)?;

        Self::from_entries(entries)
    }

    /// Load a JSON table from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InvalidConfigError> {
        Self::from_json(&super::read_file(path.as_ref())?)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// `(slot, name)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(String::as_str).enumerate()
    }
}
