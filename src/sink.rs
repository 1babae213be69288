use crate::model::Post;
use anyhow::Result;

/// Receiver for finished posts. A site generator implements this to render posts;
/// the crate itself only produces them.
pub trait PostSink {
    fn accept(&mut self, post: Post) -> Result<()>;

    /// Called once after the last post. Flush buffers here.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects posts in memory.
impl PostSink for Vec<Post> {
    fn accept(&mut self, post: Post) -> Result<()> {
        self.push(post);
        Ok(())
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> PostSink for FnSink<F>
where
    F: FnMut(Post) -> Result<()>,
{
    fn accept(&mut self, post: Post) -> Result<()> {
        (self.0)(post)
    }
}
