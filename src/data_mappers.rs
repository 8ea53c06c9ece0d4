mod talk_service;

use std::borrow::Cow;

pub use talk_service::{normalize, TalkServiceMapper};

/// Translates blend shape names from a data source into the names used by the rig.
///
/// Mappers are shared across threads while a timeline is built.
pub trait Mapper: Send + Sync {
    fn map_name<'a>(&self, key: &'a str) -> Cow<'a, str>;
}

/// For sources that already use the rig's naming.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughMapper;

impl Mapper for PassThroughMapper {
    fn map_name<'a>(&self, key: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(key)
    }
}
