//! Pass 2: position on the `posts` array and stream its elements, one enriched post
//! at a time, from a producer thread to the caller.

use crate::config::DateLayout;
use crate::enrich::enrich;
use crate::index::ReferenceIndex;
use crate::model::{Post, RawPost};
use crate::sink::PostSink;
use crate::tokens::{Token, TokenReader};
use anyhow::{anyhow, bail, Context, Result};
use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use std::io::Read;
use std::sync::Arc;
use crate::zone::Zone;

/// What the producer hands across the rendezvous.
enum Delivery {
    Post(Post),
    /// The posts array could not be read to its end; nothing follows.
    Truncated(anyhow::Error),
}

/// Advance `tokens` past the object key `posts` and its opening `[`.
pub fn locate_posts<R: Read>(tokens: &mut TokenReader<R>) -> Result<()> {
    if !tokens.seek_key("posts").context("scan export for posts")? {
        bail!("export has no \"posts\" key");
    }
    match tokens.next_token().context("read start of posts")? {
        Some(Token::BeginArray) => Ok(()),
        Some(other) => Err(anyhow!("\"posts\" is not an array (found {other:?})")),
        None => Err(anyhow!("export ends right after the \"posts\" key")),
    }
}

/// Start the producer on a reader already positioned inside the posts array.
///
/// The channel has zero capacity: the producer blocks after each post until the caller
/// takes it, so at most one post is in flight. If the caller drops the stream the next
/// handoff fails and the producer exits, releasing the reader.
pub(crate) fn spawn_producer<R>(
    tokens: TokenReader<R>,
    index: Arc<ReferenceIndex>,
    zone: Zone,
    layout: DateLayout,
    progress: Option<ProgressBar>,
) -> Result<PostStream>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded::<Delivery>(0);
    std::thread::Builder::new()
        .name("ghost-posts".into())
        .spawn(move || produce(tokens, &index, zone, &layout, &tx))
        .context("spawn post producer thread")?;
    Ok(PostStream { rx, truncation: None, delivered: 0, done: false, progress })
}

fn produce<R: Read>(
    mut tokens: TokenReader<R>,
    index: &ReferenceIndex,
    zone: Zone,
    layout: &DateLayout,
    tx: &Sender<Delivery>,
) {
    let mut produced: u64 = 0;
    loop {
        match tokens.more() {
            Ok(true) => {}
            Ok(false) => match tokens.next_token() {
                Ok(Some(Token::EndArray)) => break,
                Ok(other) => {
                    let err = anyhow!("posts array not closed (next token {other:?} at byte {})", tokens.position());
                    truncate(tx, produced, err);
                    return;
                }
                Err(e) => {
                    truncate(tx, produced, e);
                    return;
                }
            },
            Err(e) => {
                truncate(tx, produced, e);
                return;
            }
        }
        let raw: RawPost = match tokens.decode() {
            Ok(raw) => raw,
            Err(e) => {
                truncate(tx, produced, e.context(format!("decode post #{}", produced + 1)));
                return;
            }
        };
        let post = enrich(raw, index, zone, layout);
        if tx.send(Delivery::Post(post)).is_err() {
            tracing::debug!(produced, "post stream dropped by consumer; producer stopping");
            return;
        }
        produced += 1;
    }
    tracing::debug!(produced, "posts array exhausted");
}

fn truncate(tx: &Sender<Delivery>, produced: u64, err: anyhow::Error) {
    tracing::warn!(produced, "post stream truncated: {err:#}");
    let _ = tx.send(Delivery::Truncated(err));
}

/// Lazily produced, document-ordered sequence of enriched posts.
///
/// The stream ends either when the posts array is exhausted or when a post fails to
/// decode. Posts already yielded stay valid in both cases; `truncation()` tells the two apart.
pub struct PostStream {
    rx: Receiver<Delivery>,
    truncation: Option<anyhow::Error>,
    delivered: u64,
    done: bool,
    progress: Option<ProgressBar>,
}

impl PostStream {
    /// The decode error that cut the stream short, if any. Only meaningful once `next()`
    /// has returned `None`.
    pub fn truncation(&self) -> Option<&anyhow::Error> {
        self.truncation.as_ref()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }

    /// Posts handed to the caller so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Feed every remaining post to `sink`, then call `sink.finish()`.
    /// Returns the number of posts the sink accepted; `truncation()` is still available
    /// afterwards. A sink error stops the drain before `finish()`.
    pub fn drain_into<S: PostSink + ?Sized>(&mut self, sink: &mut S) -> Result<u64> {
        let mut accepted = 0u64;
        for post in self.by_ref() {
            sink.accept(post)?;
            accepted += 1;
        }
        sink.finish()?;
        Ok(accepted)
    }

    fn finish_progress(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.finish_with_message(format!("{} posts", self.delivered));
        }
    }
}

impl Iterator for PostStream {
    type Item = Post;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.rx.recv() {
            Ok(Delivery::Post(post)) => {
                self.delivered += 1;
                if let Some(pb) = &self.progress {
                    pb.inc(1);
                }
                Some(post)
            }
            Ok(Delivery::Truncated(err)) => {
                self.truncation = Some(err);
                self.done = true;
                self.finish_progress();
                None
            }
            Err(_) => {
                self.done = true;
                self.finish_progress();
                None
            }
        }
    }
}

impl Drop for PostStream {
    fn drop(&mut self) {
        if let Some(pb) = self.progress.take() {
            pb.abandon();
        }
    }
}
