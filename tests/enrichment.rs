#[path = "common/mod.rs"]
mod common;

use common::*;
use ghost_export::{
    coerce_bool, enrich, normalize_timestamp, DateLayout, GhostId, PostTag, RawPost, ReferenceIndex, Tag, User, Zone,
};
use serde_json::{json, Value};
use time::macros::{datetime, offset};

fn ada_index() -> ReferenceIndex {
    ReferenceIndex {
        users: vec![User { id: GhostId::from(1), name: "Ada".into() }],
        tags: vec![
            Tag { id: GhostId::from(10), name: "go".into() },
            Tag { id: GhostId::from(11), name: "infra".into() },
        ],
        post_tags: vec![
            PostTag { post_id: GhostId::from(5), tag_id: GhostId::from(10), sort_order: None },
            PostTag { post_id: GhostId::from(5), tag_id: GhostId::from(99), sort_order: None },
        ],
        ..Default::default()
    }
}

fn raw(v: Value) -> RawPost {
    serde_json::from_value(v).unwrap()
}

/// Author and tags resolve through the index; the link to unknown tag 99 is dropped.
#[test]
fn resolves_author_and_skips_unknown_tag() {
    let post = enrich(
        raw(json!({ "id": 5, "author_id": 1, "status": "published" })),
        &ada_index(),
        Zone::UTC,
        &DateLayout::Rfc3339,
    );
    assert_eq!(post.author, "Ada");
    assert_eq!(post.tags, vec!["go".to_string()]);
}

/// Unknown author id leaves the author empty; a post without links has no tags.
#[test]
fn missing_references_resolve_to_empty() {
    let post = enrich(
        raw(json!({ "id": 8, "author_id": 77 })),
        &ada_index(),
        Zone::UTC,
        &DateLayout::Rfc3339,
    );
    assert_eq!(post.author, "");
    assert!(post.tags.is_empty());
}

/// String and integer ids refer to the same entity.
#[test]
fn string_and_integer_ids_match() {
    let post = enrich(
        raw(json!({ "id": "5", "author_id": "1" })),
        &ada_index(),
        Zone::UTC,
        &DateLayout::Rfc3339,
    );
    assert_eq!(post.author, "Ada");
    assert_eq!(post.tags, vec!["go".to_string()]);
}

/// Tag order follows link order in the document, not tag id or name.
#[test]
fn tag_order_follows_links() {
    let mut index = ada_index();
    index.post_tags = vec![
        PostTag { post_id: GhostId::from(5), tag_id: GhostId::from(11), sort_order: Some(1) },
        PostTag { post_id: GhostId::from(5), tag_id: GhostId::from(10), sort_order: Some(0) },
    ];
    let post = enrich(raw(json!({ "id": 5 })), &index, Zone::UTC, &DateLayout::Rfc3339);
    assert_eq!(post.tags, vec!["infra".to_string(), "go".to_string()]);
}

#[test]
fn draft_is_exact_match() {
    let index = ReferenceIndex::default();
    let draft = |status: Value| {
        enrich(raw(json!({ "id": 1, "status": status })), &index, Zone::UTC, &DateLayout::Rfc3339).is_draft
    };
    assert!(draft(json!("draft")));
    assert!(!draft(json!("Draft")));
    assert!(!draft(json!("published")));
    assert!(!draft(json!("")));
    assert!(!draft(Value::Null));
}

#[test]
fn page_flag_coercion() {
    assert!(coerce_bool(&json!(true)));
    assert!(coerce_bool(&json!(1)));
    assert!(!coerce_bool(&json!(0)));
    assert!(!coerce_bool(&json!(false)));
    assert!(coerce_bool(&json!(-3)));
    assert!(!coerce_bool(&json!("true")));
    assert!(!coerce_bool(&json!(1.0)));
    assert!(!coerce_bool(&Value::Null));
    assert!(!coerce_bool(&json!({ "page": true })));

    let index = ReferenceIndex::default();
    let post = enrich(raw(json!({ "page": 1, "featured": true })), &index, Zone::UTC, &DateLayout::Rfc3339);
    assert!(post.is_page);
    assert!(post.is_featured);
}

/// Epoch milliseconds become that instant, displayed in the configured offset.
#[test]
fn epoch_millis_timestamp() {
    let t = normalize_timestamp(&json!(1700000000000i64), offset!(+2).into(), &DateLayout::Rfc3339).unwrap();
    assert_eq!(t, datetime!(2023-11-14 22:13:20 UTC));
    assert_eq!(t.offset(), offset!(+2));
}

#[test]
fn rfc3339_string_timestamp() {
    let t = normalize_timestamp(&json!("2023-11-14T20:00:00+02:00"), Zone::UTC, &DateLayout::Rfc3339).unwrap();
    assert_eq!(t, datetime!(2023-11-14 18:00:00 UTC));
}

/// A layout without an offset is read as wall-clock time in the configured zone.
#[test]
fn custom_layout_uses_configured_zone() {
    let layout = DateLayout::parse("[year]-[month]-[day] [hour]:[minute]:[second]").unwrap();
    let t = normalize_timestamp(&json!("2014-05-12 11:48:26"), offset!(-5).into(), &layout).unwrap();
    assert_eq!(t, datetime!(2014-05-12 16:48:26 UTC));

    let date_only = DateLayout::parse("[year]-[month]-[day]").unwrap();
    let d = normalize_timestamp(&json!("2014-05-12"), Zone::UTC, &date_only).unwrap();
    assert_eq!(d, datetime!(2014-05-12 0:00 UTC));
}

/// A named zone applies the offset in force at each date, not one offset for all.
#[test]
fn named_zone_follows_daylight_saving() {
    let ny = Zone::named("America/New_York").unwrap();
    let layout = DateLayout::parse("[year]-[month]-[day] [hour]:[minute]:[second]").unwrap();

    let winter = normalize_timestamp(&json!("2014-01-12 12:00:00"), ny, &layout).unwrap();
    assert_eq!(winter, datetime!(2014-01-12 17:00:00 UTC));
    assert_eq!(winter.offset(), offset!(-5));

    let summer = normalize_timestamp(&json!("2014-07-12 12:00:00"), ny, &layout).unwrap();
    assert_eq!(summer, datetime!(2014-07-12 16:00:00 UTC));
    assert_eq!(summer.offset(), offset!(-4));

    // the repeated hour when clocks go back reads as the earlier (daylight) time
    let repeated = normalize_timestamp(&json!("2014-11-02 01:30:00"), ny, &layout).unwrap();
    assert_eq!(repeated, datetime!(2014-11-02 05:30:00 UTC));

    // epoch milliseconds are shown with the offset of their own date
    let jan = normalize_timestamp(&json!(1389528000000i64), ny, &DateLayout::Rfc3339).unwrap();
    assert_eq!(jan.offset(), offset!(-5));
    let jul = normalize_timestamp(&json!(1405166400000i64), ny, &DateLayout::Rfc3339).unwrap();
    assert_eq!(jul.offset(), offset!(-4));
}

/// Integers that decode to a year outside 0..=9999 are the zero time.
#[test]
fn out_of_range_years_are_none() {
    for ms in [-70_000_000_000_000i64, 253_402_300_800_000, i64::MAX, i64::MIN] {
        assert!(normalize_timestamp(&json!(ms), Zone::UTC, &DateLayout::Rfc3339).is_none(), "expected None for {ms}");
    }
    let last = normalize_timestamp(&json!(253_402_300_799_000i64), Zone::UTC, &DateLayout::Rfc3339).unwrap();
    assert_eq!(last, datetime!(9999-12-31 23:59:59 UTC));
}

/// Anything that is neither a parsable string nor an integer is the zero time, not an error.
#[test]
fn unparsable_timestamps_are_none() {
    let zone = Zone::UTC;
    let layout = DateLayout::Rfc3339;
    for v in [json!("last tuesday"), json!(null), json!(true), json!(1.5), json!({}), json!([]), json!("")] {
        assert!(normalize_timestamp(&v, zone, &layout).is_none(), "expected None for {v}");
    }
    let post = enrich(
        raw(json!({ "published_at": "nope", "created_at": null })),
        &ReferenceIndex::default(),
        zone,
        &layout,
    );
    assert!(post.published.is_none());
    assert!(post.created.is_none());
}

/// Null text fields decode as absent rather than failing the post.
#[test]
fn null_text_fields_are_tolerated() {
    let p = raw(json!({ "id": 1, "title": null, "image": null, "meta_description": null, "status": null }));
    let post = enrich(p, &ReferenceIndex::default(), Zone::UTC, &DateLayout::Rfc3339);
    assert_eq!(post.title, "");
    assert!(post.image.is_none());
    assert!(!post.is_draft);
}

/// `feature_image` (1.x) stands in for `image` (0.x).
#[test]
fn feature_image_fallback() {
    let p = raw(json!({ "feature_image": "/content/images/cover.jpg" }));
    let post = enrich(p, &ReferenceIndex::default(), Zone::UTC, &DateLayout::Rfc3339);
    assert_eq!(post.image.as_deref(), Some("/content/images/cover.jpg"));
}

/// The shared fixture resolves the same way through the full pipeline.
#[test]
fn fixture_round_trip_matches_direct_enrichment() {
    let posts: Vec<_> = importer().import(cursor(&ada_export())).unwrap().collect();
    assert_eq!(posts[0].author, "Ada");
    assert_eq!(posts[0].tags, vec!["go".to_string()]);
}
