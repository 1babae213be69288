#![allow(dead_code)]

use ghost_export::GhostImport;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::path::{Path, PathBuf};
use time::UtcOffset;

/// Wrap reference sections and posts in the `{"db":[{"meta", "data"}]}` envelope Ghost writes.
pub fn export_doc(users: Value, tags: Value, posts_tags: Value, posts: Value) -> Value {
    json!({
        "db": [{
            "meta": { "exported_on": 1388805572000i64, "version": "003" },
            "data": {
                "users": users,
                "tags": tags,
                "posts_tags": posts_tags,
                "posts": posts
            }
        }]
    })
}

/// Small but realistic export:
/// - users: Ada (1), Grace (2)
/// - tags: go (10), infra (11)
/// - links: post 5 -> go, post 5 -> 99 (unknown tag), post 6 -> infra, post 6 -> go
/// - posts: 5 (published, Ada, epoch-ms timestamps, page=0),
///          6 (draft, Grace, string timestamps, page=true),
///          7 (status "Draft", unknown author 42, page=1, null timestamps)
pub fn ada_export() -> Value {
    export_doc(
        json!([{ "id": 1, "name": "Ada", "email": "ada@example.com" }, { "id": 2, "name": "Grace" }]),
        json!([{ "id": 10, "name": "go", "slug": "go" }, { "id": 11, "name": "infra" }]),
        json!([
            { "id": 1, "post_id": 5, "tag_id": 10, "sort_order": 0 },
            { "id": 2, "post_id": 5, "tag_id": 99 },
            { "id": 3, "post_id": 6, "tag_id": 11, "sort_order": 0 },
            { "id": 4, "post_id": 6, "tag_id": 10, "sort_order": 1 }
        ]),
        json!([
            {
                "id": 5, "title": "Hello", "slug": "hello", "markdown": "# Hello",
                "image": null, "page": 0, "status": "published", "meta_description": null,
                "author_id": 1, "published_at": 1700000000000i64, "created_at": 1699990000000i64
            },
            {
                "id": 6, "title": "Wip", "slug": "wip", "markdown": "soon",
                "page": true, "status": "draft", "author_id": 2,
                "published_at": "2023-11-14T22:13:20Z", "created_at": "2023-11-14T20:00:00+02:00"
            },
            {
                "id": 7, "title": "About", "slug": "about", "markdown": "me",
                "page": 1, "status": "Draft", "author_id": 42,
                "published_at": null, "created_at": "last tuesday"
            }
        ]),
    )
}

pub fn cursor(doc: &Value) -> Cursor<Vec<u8>> {
    Cursor::new(doc.to_string().into_bytes())
}

pub fn raw_cursor(text: &str) -> Cursor<Vec<u8>> {
    Cursor::new(text.as_bytes().to_vec())
}

/// In-memory reader that raises a flag when it is dropped, so a test can see
/// whether whoever owned it let go.
pub struct TrackedReader {
    inner: Cursor<Vec<u8>>,
    released: Arc<AtomicBool>,
}

impl Read for TrackedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for TrackedReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

pub fn tracked_cursor(doc: &Value) -> (TrackedReader, Arc<AtomicBool>) {
    let released = Arc::new(AtomicBool::new(false));
    let reader = TrackedReader { inner: cursor(doc), released: Arc::clone(&released) };
    (reader, released)
}

/// Poll `flag` until it is set or `limit` passes.
pub fn wait_for(flag: &AtomicBool, limit: Duration) -> bool {
    let start = Instant::now();
    while !flag.load(Ordering::SeqCst) {
        if start.elapsed() > limit {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    true
}

/// Importer pinned to UTC with progress off so results don't depend on the host.
pub fn importer() -> GhostImport {
    GhostImport::new().time_zone(UtcOffset::UTC).progress(false)
}

/// Write `text` to `<dir>/<name>` and return the path.
pub fn write_export(dir: &Path, name: &str, text: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Read an NDJSON file into values (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<Value> {
    let f = File::open(path).unwrap();
    BufReader::new(f)
        .lines()
        .map(|l| l.unwrap())
        .filter(|s| !s.is_empty())
        .map(|s| serde_json::from_str(&s).unwrap())
        .collect()
}
