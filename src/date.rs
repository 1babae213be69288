//! Timestamp normalization for the two encodings Ghost exports use:
//! epoch milliseconds (0.x) and formatted strings (1.x and later).

use crate::config::DateLayout;
use crate::zone::Zone;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Normalize a raw timestamp into an absolute time shown in `zone`.
///
/// Integers are epoch milliseconds; strings are parsed with `layout`. Everything else,
/// and anything that fails to parse, is `None` (the zero time): a single noisy field
/// never fails the record.
pub fn normalize_timestamp(raw: &Value, zone: Zone, layout: &DateLayout) -> Option<OffsetDateTime> {
    if let Some(ms) = raw.as_i64() {
        return from_epoch_millis(ms, zone);
    }
    if let Some(s) = raw.as_str() {
        return parse_in_zone(s, zone, layout);
    }
    None
}

/// Epoch milliseconds to an `OffsetDateTime` shown in `zone`. Values whose year falls
/// outside 0..=9999 are `None`.
pub fn from_epoch_millis(ms: i64, zone: Zone) -> Option<OffsetDateTime> {
    let nanos = i128::from(ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| zone.convert(dt))
        .filter(printable)
}

/// Parse `s` with `layout`. A layout that carries its own offset keeps the parsed instant;
/// one without an offset is read as wall-clock time in `zone`; a date-only layout is midnight.
pub fn parse_in_zone(s: &str, zone: Zone, layout: &DateLayout) -> Option<OffsetDateTime> {
    let s = s.trim();
    let parsed = match layout {
        DateLayout::Rfc3339 => OffsetDateTime::parse(s, &Rfc3339).ok().and_then(|dt| zone.convert(dt)),
        DateLayout::Custom(fmt) => {
            if let Ok(dt) = OffsetDateTime::parse(s, fmt) {
                zone.convert(dt)
            } else if let Ok(dt) = PrimitiveDateTime::parse(s, fmt) {
                zone.assume(dt)
            } else {
                Date::parse(s, fmt)
                    .ok()
                    .and_then(|d| zone.assume(PrimitiveDateTime::new(d, Time::MIDNIGHT)))
            }
        }
    };
    parsed.filter(printable)
}

/// RFC 3339 only covers four-digit years.
fn printable(dt: &OffsetDateTime) -> bool {
    (0..=9999).contains(&dt.year())
}
