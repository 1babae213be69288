use crate::config::DateLayout;
use crate::date::normalize_timestamp;
use crate::index::ReferenceIndex;
use crate::json_utils::coerce_bool;
use crate::model::{Post, RawPost};
use crate::zone::Zone;

/// Status string Ghost uses for unpublished posts. Matched exactly.
pub const DRAFT_STATUS: &str = "draft";

/// Resolve one decoded post against the index: timestamps, flags, author and tags.
/// Missing references resolve to an empty author or a skipped tag, never an error.
pub fn enrich(raw: RawPost, index: &ReferenceIndex, zone: Zone, layout: &DateLayout) -> Post {
    let published = normalize_timestamp(&raw.published_at, zone, layout);
    let created = normalize_timestamp(&raw.created_at, zone, layout);
    let updated = normalize_timestamp(&raw.updated_at, zone, layout);
    let is_draft = raw.status.as_deref() == Some(DRAFT_STATUS);
    let is_page = coerce_bool(&raw.page);
    let is_featured = coerce_bool(&raw.featured);

    let author = raw
        .author_id
        .as_ref()
        .and_then(|id| index.user(id))
        .map(|u| u.name.clone())
        .unwrap_or_default();

    let tags: Vec<String> = match raw.id.as_ref() {
        Some(id) => index
            .links_for(id)
            .filter_map(|link| index.tag(&link.tag_id))
            .map(|t| t.name.clone())
            .collect(),
        None => Vec::new(),
    };

    Post {
        id: raw.id,
        title: raw.title.unwrap_or_default(),
        slug: raw.slug.unwrap_or_default(),
        markdown: raw.markdown,
        html: raw.html,
        mobiledoc: raw.mobiledoc,
        image: raw.image.or(raw.feature_image),
        status: raw.status.unwrap_or_default(),
        meta_description: raw.meta_description,
        author_id: raw.author_id,
        published,
        created,
        updated,
        is_draft,
        is_page,
        is_featured,
        author,
        tags,
    }
}
