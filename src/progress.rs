//! Progress reporting: a count spinner for posts streamed out of an export.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Arc, OnceLock};

/// Optional global MultiProgress that allows multiple bars to render concurrently.
/// If unset, progress bars draw to the default terminal target.
static GLOBAL_MP: OnceLock<Arc<MultiProgress>> = OnceLock::new();

/// Install a global MultiProgress used by all subsequently created progress bars.
/// Safe to call once; additional calls are ignored.
pub fn set_global_multiprogress(mp: Arc<MultiProgress>) {
    let _ = GLOBAL_MP.set(mp);
}

/// Spinner counting posts; the total is unknown until the posts array ends.
pub fn make_post_spinner(label: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let pb = match GLOBAL_MP.get() {
        Some(mp) => mp.add(pb),
        None => pb,
    };
    // The template is a literal; fall back to the default style if indicatif rejects it.
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} {pos} posts  it/s: {per_sec}  elapsed: {elapsed_precise}") {
        pb.set_style(style);
    }
    if let Some(msg) = label {
        pb.set_message(msg.to_string());
    }
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
