//! Records read from a Ghost export and the enriched post handed to callers.
//!
//! Extra fields in the export are ignored by serde. Text fields that Ghost writes as
//! `null` are `Option`s so a null never fails a record.

use crate::date::from_epoch_millis;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use crate::zone::Zone;
use time::OffsetDateTime;

/// Entity id. Ghost 0.x wrote integers, 1.x and later write 24-char hex strings;
/// both are held as text so `1` and `"1"` refer to the same entity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GhostId(String);

impl GhostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for GhostId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for GhostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for GhostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for GhostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

struct GhostIdVisitor;

impl<'de> Visitor<'de> for GhostIdVisitor {
    type Value = GhostId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or string id")
    }
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<GhostId, E> {
        Ok(GhostId(v.to_string()))
    }
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<GhostId, E> {
        Ok(GhostId(v.to_string()))
    }
    fn visit_str<E: de::Error>(self, v: &str) -> Result<GhostId, E> {
        Ok(GhostId(v.to_string()))
    }
    fn visit_string<E: de::Error>(self, v: String) -> Result<GhostId, E> {
        Ok(GhostId(v))
    }
}

impl<'de> Deserialize<'de> for GhostId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GhostIdVisitor)
    }
}

/// Top-level `meta` object: informational only.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMeta {
    #[serde(default)]
    pub exported_on: Option<i64>,
    #[serde(default)]
    pub version: Option<String>,
}

impl ExportMeta {
    /// `exported_on` (epoch milliseconds) as an absolute time in `zone`.
    pub fn exported_at(&self, zone: Zone) -> Option<OffsetDateTime> {
        self.exported_on.and_then(|ms| from_epoch_millis(ms, zone))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: GhostId,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: GhostId,
    #[serde(default)]
    pub name: String,
}

/// One row of the posts<->tags association table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTag {
    pub post_id: GhostId,
    pub tag_id: GhostId,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// A post exactly as decoded. `page`, `featured` and the timestamps are kept raw
/// because their JSON type depends on the export version.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub id: Option<GhostId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub mobiledoc: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    #[serde(default)]
    pub page: Value,
    #[serde(default)]
    pub featured: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub author_id: Option<GhostId>,
    #[serde(default)]
    pub published_at: Value,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default)]
    pub updated_at: Value,
}

/// A post with author, tags, timestamps and flags resolved.
/// `None` timestamps are the zero time: the raw value was absent or unparsable.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Post {
    pub id: Option<GhostId>,
    pub title: String,
    pub slug: String,
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub mobiledoc: Option<String>,
    pub image: Option<String>,
    pub status: String,
    pub meta_description: Option<String>,
    pub author_id: Option<GhostId>,

    #[serde(with = "time::serde::rfc3339::option")]
    pub published: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated: Option<OffsetDateTime>,
    pub is_draft: bool,
    pub is_page: bool,
    pub is_featured: bool,
    pub author: String,
    pub tags: Vec<String>,
}
