use anyhow::{bail, Result};
use ghost_export::{init_tracing_once, GhostImport, ImportOptions, NdjsonWriter};
use std::path::PathBuf;

const DEFAULT_OUT: &str = "./posts.ndjson";

fn main() -> Result<()> {
    init_tracing_once();

    let mut args = std::env::args_os().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        bail!("usage: ghost-export <export.json> [out.ndjson]");
    };
    let out = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    let opts = ImportOptions::from_env()?
        .with_progress(true)
        .with_progress_label("Importing posts");
    let buf = opts.read_buffer_bytes;

    let mut posts = GhostImport::new().options(opts).import_path(&input)?;
    let mut sink = NdjsonWriter::create_atomic(&out, buf)?;
    let written = posts.drain_into(&mut sink)?;

    println!("Wrote {} posts to {}", written, out.display());
    if let Some(err) = posts.truncation() {
        bail!("export ended early after {} posts: {:#}", written, err);
    }
    Ok(())
}
