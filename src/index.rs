//! Pass 1: collect `meta`, `users`, `tags` and `posts_tags` into a `ReferenceIndex`.

use crate::model::{ExportMeta, GhostId, PostTag, Tag, User};
use crate::tokens::{Token, TokenReader};
use anyhow::{Context, Result};
use std::io::Read;

/// Lookup tables used to resolve a post's author and tags.
/// Built once before any post is read, then shared read-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceIndex {
    pub meta: ExportMeta,
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    pub post_tags: Vec<PostTag>,
}

impl ReferenceIndex {
    /// First user with this id.
    pub fn user(&self, id: &GhostId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// First tag with this id.
    pub fn tag(&self, id: &GhostId) -> Option<&Tag> {
        self.tags.iter().find(|t| &t.id == id)
    }

    /// Tag links for one post, in document order.
    pub fn links_for<'a>(&'a self, post_id: &'a GhostId) -> impl Iterator<Item = &'a PostTag> + 'a {
        self.post_tags.iter().filter(move |pt| &pt.post_id == post_id)
    }
}

#[derive(Clone, Copy)]
enum Section {
    Meta = 0b0001,
    Users = 0b0010,
    Tags = 0b0100,
    PostsTags = 0b1000,
}

const ALL_SECTIONS: u8 = 0b1111;

impl Section {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "meta" => Some(Self::Meta),
            "users" => Some(Self::Users),
            "tags" => Some(Self::Tags),
            "posts_tags" => Some(Self::PostsTags),
            _ => None,
        }
    }
}

/// Walk the document token by token and decode the four reference sections wherever
/// they appear, in any order. Scanning stops once all four were seen, so the `posts`
/// array that usually follows is never read.
///
/// Malformed JSON before that point is an error. Running out of input first is not:
/// the index holds whatever sections were present.
pub fn build_index<R: Read>(reader: R, buf_bytes: usize) -> Result<ReferenceIndex> {
    let mut tokens = TokenReader::new(reader, buf_bytes);
    let mut index = ReferenceIndex::default();
    let mut seen: u8 = 0;

    while seen != ALL_SECTIONS {
        let Some(tok) = tokens.next_token().context("scan export for reference data")? else {
            tracing::debug!(sections_found = seen.count_ones(), "end of export before all reference sections were found");
            break;
        };
        let Token::Key(key) = tok else { continue };
        let Some(section) = Section::from_key(&key) else { continue };
        match section {
            Section::Meta => index.meta = tokens.decode().context("decode meta")?,
            Section::Users => index.users = tokens.decode().context("decode users")?,
            Section::Tags => index.tags = tokens.decode().context("decode tags")?,
            Section::PostsTags => index.post_tags = tokens.decode().context("decode posts_tags")?,
        }
        seen |= section as u8;
    }

    tracing::debug!(
        users = index.users.len(),
        tags = index.tags.len(),
        post_tags = index.post_tags.len(),
        version = index.meta.version.as_deref().unwrap_or(""),
        bytes_scanned = tokens.position(),
        "reference index built"
    );
    Ok(index)
}
