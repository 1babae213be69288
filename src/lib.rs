mod config;
mod zone;
mod date;
mod json_utils;
mod tokens;

mod model;
mod index;
mod enrich;
mod streaming;
mod pipeline;

mod sink;
mod ndjson;
mod progress;
mod util;

pub use crate::config::{DateLayout, ImportOptions, parse_time_zone, ENV_DATE_LAYOUT, ENV_TIME_ZONE};
pub use crate::zone::{Zone, local_offset_or_utc};
pub use crate::pipeline::GhostImport;
pub use crate::streaming::{PostStream, locate_posts};
pub use crate::model::{ExportMeta, GhostId, Post, PostTag, RawPost, Tag, User};
pub use crate::index::{ReferenceIndex, build_index};
pub use crate::enrich::{enrich, DRAFT_STATUS};

// Expose the normalizers so site generators can apply the same rules to their own fields.
pub use crate::date::{normalize_timestamp, from_epoch_millis, parse_in_zone};
pub use crate::json_utils::coerce_bool;

// export the token-level scanner
pub use crate::tokens::{Token, TokenReader};

// export sinks
pub use crate::sink::{FnSink, PostSink};
pub use crate::ndjson::NdjsonWriter;

pub use crate::progress::set_global_multiprogress;
pub use crate::util::{init_tracing_once, open_with_backoff, create_with_backoff, replace_file_atomic_backoff};
