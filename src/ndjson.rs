use crate::model::Post;
use crate::sink::PostSink;
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered NDJSON post writer: one JSON object per line.
///
/// With `create_atomic` the lines go to a `.tmp` sibling and the final path only
/// appears once `finish` succeeds, so a failed import never leaves a partial file.
pub struct NdjsonWriter {
    path: PathBuf,
    final_path: Option<PathBuf>,
    w: Option<BufWriter<File>>,
    lines: u64,
}

impl NdjsonWriter {
    pub fn create(path: &Path, buf_bytes: usize) -> Result<Self> {
        let f = create_with_backoff(path, 16, 50).with_context(|| format!("create {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            final_path: None,
            w: Some(BufWriter::with_capacity(buf_bytes.max(8 * 1024), f)),
            lines: 0,
        })
    }

    pub fn create_atomic(final_path: &Path, buf_bytes: usize) -> Result<Self> {
        let mut tmp = final_path.as_os_str().to_owned();
        tmp.push(".tmp");
        let mut w = Self::create(Path::new(&tmp), buf_bytes)?;
        w.final_path = Some(final_path.to_path_buf());
        Ok(w)
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn write_post(&mut self, post: &Post) -> Result<()> {
        if let Some(w) = &mut self.w {
            serde_json::to_writer(&mut *w, post).with_context(|| format!("write {}", self.path.display()))?;
            w.write_all(b"\n")?;
            self.lines += 1;
        }
        Ok(())
    }
}

impl PostSink for NdjsonWriter {
    fn accept(&mut self, post: Post) -> Result<()> {
        self.write_post(&post)
    }

    /// Flush, then promote the temp file when created with `create_atomic`.
    fn finish(&mut self) -> Result<()> {
        if let Some(mut w) = self.w.take() {
            w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        }
        if let Some(final_path) = self.final_path.take() {
            replace_file_atomic_backoff(&self.path, &final_path)?;
            tracing::debug!(lines = self.lines, path = %final_path.display(), "ndjson output promoted");
            self.path = final_path;
        }
        Ok(())
    }
}
