use crate::config::{DateLayout, ImportOptions};
use crate::index::{build_index, ReferenceIndex};
use crate::progress::make_post_spinner;
use crate::streaming::{locate_posts, spawn_producer, PostStream};
use crate::tokens::TokenReader;
use crate::util::{init_tracing_once, open_with_backoff};
use anyhow::{Context, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use crate::zone::Zone;

/// Entry point: configure, then `import` an export document.
///
/// `import` runs the whole fallible prefix up front (reference index, rewind, locating
/// the posts array) so structural problems surface as an `Err` before any post exists.
/// What comes back is a lazy `PostStream`.
#[derive(Clone, Debug, Default)]
pub struct GhostImport {
    pub(crate) opts: ImportOptions,
}

impl GhostImport {
    pub fn new() -> Self {
        Self { opts: ImportOptions::default() }
    }

    // -------- Builder methods --------
    pub fn options(mut self, opts: ImportOptions) -> Self { self.opts = opts; self }
    pub fn time_zone(mut self, tz: impl Into<Zone>) -> Self { self.opts = self.opts.with_time_zone(tz); self }
    pub fn date_layout(mut self, layout: DateLayout) -> Self { self.opts = self.opts.with_date_layout(layout); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }

    pub fn opts(&self) -> &ImportOptions {
        &self.opts
    }

    /// Pass 1 only: read the reference sections and stop.
    pub fn build_index_only<R: Read>(&self, reader: R) -> Result<ReferenceIndex> {
        init_tracing_once();
        build_index(reader, self.opts.read_buffer_bytes)
    }

    /// Build the index, rewind, find `posts`, and start streaming.
    pub fn import<R>(self, mut reader: R) -> Result<PostStream>
    where
        R: Read + Seek + Send + 'static,
    {
        init_tracing_once();
        let buf = self.opts.read_buffer_bytes;

        let index = build_index(&mut reader, buf).context("build reference index")?;
        tracing::info!(
            users = index.users.len(),
            tags = index.tags.len(),
            post_tags = index.post_tags.len(),
            "reference data loaded"
        );

        reader.seek(SeekFrom::Start(0)).context("rewind export for posts pass")?;

        let mut tokens = TokenReader::new(reader, buf);
        locate_posts(&mut tokens).context("locate posts array")?;

        let pb = if self.opts.progress {
            Some(make_post_spinner(self.opts.progress_label.as_deref()))
        } else {
            None
        };
        spawn_producer(tokens, Arc::new(index), self.opts.time_zone, self.opts.date_layout, pb)
    }

    /// Open `path` and `import` it.
    pub fn import_path(self, path: &Path) -> Result<PostStream> {
        let file = open_with_backoff(path, 16, 50).with_context(|| format!("open {}", path.display()))?;
        tracing::info!(path = %path.display(), "importing ghost export");
        self.import(file).with_context(|| format!("import {}", path.display()))
    }
}
