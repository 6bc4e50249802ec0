//! Identifiers for the resources the service stores.
//!
//! Each key renders the escaped URL prefix its operations hang off.

use std::fmt;

use serde::Serialize;

use crate::util::escape_segment;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FeedKey {
    pub feed: String,
}

impl FeedKey {
    pub fn new(feed: impl Into<String>) -> Self {
        Self { feed: feed.into() }
    }

    pub(crate) fn path(&self) -> String {
        format!("/feed/{}", escape_segment(&self.feed))
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.feed)
    }
}

/// An object is addressed by its id within a feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectKey {
    pub object_id: String,
    pub feed: String,
}

impl ObjectKey {
    pub fn new(object_id: impl Into<String>, feed: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            feed: feed.into(),
        }
    }

    pub fn feed_key(&self) -> FeedKey {
        FeedKey::new(self.feed.clone())
    }

    /// Key for a zone attached to this object.
    pub fn zone(&self, zone_id: impl Into<String>) -> ZoneKey {
        ZoneKey {
            zone_id: zone_id.into(),
            object_id: self.object_id.clone(),
            feed: self.feed.clone(),
        }
    }

    pub(crate) fn path(&self) -> String {
        format!(
            "{}/object/{}",
            self.feed_key().path(),
            escape_segment(&self.object_id)
        )
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.object_id, self.feed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ZoneKey {
    pub zone_id: String,
    pub object_id: String,
    pub feed: String,
}

impl ZoneKey {
    pub fn new(
        zone_id: impl Into<String>,
        object_id: impl Into<String>,
        feed: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            object_id: object_id.into(),
            feed: feed.into(),
        }
    }

    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(self.object_id.clone(), self.feed.clone())
    }

    pub(crate) fn path(&self) -> String {
        format!(
            "{}/zone/{}",
            self.object_key().path(),
            escape_segment(&self.zone_id)
        )
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} in {}", self.zone_id, self.object_id, self.feed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FenceKey {
    pub fence_id: String,
}

impl FenceKey {
    pub fn new(fence_id: impl Into<String>) -> Self {
        Self {
            fence_id: fence_id.into(),
        }
    }

    pub(crate) fn path(&self) -> String {
        format!("/fence/{}", escape_segment(&self.fence_id))
    }
}

impl fmt::Display for FenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fence_id)
    }
}
