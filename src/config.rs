use anyhow::{anyhow, Context, Result};
use crate::zone::Zone;
use time::format_description::{BorrowedFormatItem, OwnedFormatItem};
use time::macros::format_description;
use time::UtcOffset;

/// Env override for the time zone (`local`, `UTC`, `Z`, `+HH:MM`, `-HH:MM`, `Europe/Paris`).
pub const ENV_TIME_ZONE: &str = "GHOST_EXPORT_TZ";
/// Env override for the string timestamp layout (`rfc3339` or a `time` format description).
pub const ENV_DATE_LAYOUT: &str = "GHOST_EXPORT_DATE_LAYOUT";

/// Layout used when a timestamp arrives as a string.
#[derive(Clone, Debug, Default)]
pub enum DateLayout {
    /// `2016-02-24T21:22:02.000Z`, the layout modern exports use.
    #[default]
    Rfc3339,
    /// Any `time` format description, e.g. `[year]-[month]-[day] [hour]:[minute]:[second]`.
    Custom(OwnedFormatItem),
}

impl DateLayout {
    /// Parse a layout name or format description.
    pub fn parse(layout: &str) -> Result<Self> {
        let s = layout.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("rfc3339") {
            return Ok(Self::Rfc3339);
        }
        let item = time::format_description::parse_owned::<2>(s)
            .with_context(|| format!("invalid date layout {s:?}"))?;
        Ok(Self::Custom(item))
    }
}

/// Parse `local`, `UTC`/`Z`, a fixed `±HH:MM` / `±HH` offset, or an IANA zone name.
pub fn parse_time_zone(zone: &str) -> Result<Zone> {
    let s = zone.trim();
    if s.eq_ignore_ascii_case("local") {
        return Ok(Zone::local());
    }
    if s.eq_ignore_ascii_case("utc") || s == "Z" {
        return Ok(Zone::UTC);
    }
    if let Ok(off) = UtcOffset::parse(s, OFFSET_HH_MM).or_else(|_| UtcOffset::parse(s, OFFSET_HH)) {
        return Ok(Zone::Fixed(off));
    }
    Zone::named(s).ok_or_else(|| anyhow!("time zone must be local, UTC, ±HH:MM or an IANA name, got {s:?}"))
}

const OFFSET_HH_MM: &[BorrowedFormatItem<'static>] = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
const OFFSET_HH: &[BorrowedFormatItem<'static>] = format_description!("[offset_hour sign:mandatory]");

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ImportOptions {
    pub time_zone: Zone,
    pub date_layout: DateLayout,
    pub read_buffer_bytes: usize,        // BufReader capacity for both passes
    pub progress: bool,                  // spinner counting delivered posts
    pub progress_label: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            time_zone: Zone::local(),
            date_layout: DateLayout::Rfc3339,
            read_buffer_bytes: 64 * 1024,
            progress: false,
            progress_label: None,
        }
    }
}

impl ImportOptions {
    /// Defaults, then `GHOST_EXPORT_TZ` / `GHOST_EXPORT_DATE_LAYOUT` when set.
    /// A set-but-invalid variable is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let mut opts = Self::default();
        if let Ok(tz) = std::env::var(ENV_TIME_ZONE) {
            if !tz.trim().is_empty() {
                opts.time_zone = parse_time_zone(&tz).context(ENV_TIME_ZONE)?;
            }
        }
        if let Ok(layout) = std::env::var(ENV_DATE_LAYOUT) {
            if !layout.trim().is_empty() {
                opts.date_layout = DateLayout::parse(&layout).context(ENV_DATE_LAYOUT)?;
            }
        }
        Ok(opts)
    }

    pub fn with_time_zone(mut self, tz: impl Into<Zone>) -> Self {
        self.time_zone = tz.into();
        self
    }
    pub fn with_date_layout(mut self, layout: DateLayout) -> Self {
        self.date_layout = layout;
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}
