/*!
Naming used by the talk service.

The service spells sided shapes with a `Left`/`Right` suffix (`eyeBlinkLeft`) while
the rig uses `_L`/`_R` (`eyeBlink_L`). The jaw and mouth sideways shapes are spelled
the same by both.
*/

use std::borrow::Cow;

use super::Mapper;

/// Names that end in `Left`/`Right` but are not sided.
const UNSIDED: [&str; 4] = ["jawLeft", "jawRight", "mouthLeft", "mouthRight"];

/// Convert a talk service key into a rig key.
///
/// Total and idempotent. Keys that match nothing are returned unchanged.
pub fn normalize(key: &str) -> Cow<'_, str> {
    if UNSIDED.contains(&key) {
        return Cow::Borrowed(key);
    }

    if let Some(stem) = key.strip_suffix("Right") {
        Cow::Owned(format!("{stem}_R"))
    } else if let Some(stem) = key.strip_suffix("Left") {
        Cow::Owned(format!("{stem}_L"))
    } else {
        Cow::Borrowed(key)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TalkServiceMapper;

impl Mapper for TalkServiceMapper {
    fn map_name<'a>(&self, key: &'a str) -> Cow<'a, str> {
        normalize(key)
    }
}
