//! Time zone used to interpret and display timestamps.
//!
//! A named zone resolves its offset per instant from the tz database, so a date on
//! either side of a daylight-saving change gets the offset in force at that date.

use std::fmt;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset as _, TimeZone as _, Tz};

#[derive(Clone, Copy)]
pub enum Zone {
    /// The same offset for every instant.
    Fixed(UtcOffset),
    /// A tz database zone such as `Europe/Paris`.
    Named(&'static Tz),
}

impl Zone {
    pub const UTC: Zone = Zone::Fixed(UtcOffset::UTC);

    /// Look up an IANA zone name.
    pub fn named(name: &str) -> Option<Self> {
        time_tz::timezones::get_by_name(name).map(Zone::Named)
    }

    /// The system zone. When it cannot be identified, the current local offset
    /// (or UTC) is used as a fixed zone.
    pub fn local() -> Self {
        match time_tz::system::get_timezone() {
            Ok(tz) => Zone::Named(tz),
            Err(e) => {
                tracing::debug!("system time zone unavailable ({e}); using the current offset");
                Zone::Fixed(local_offset_or_utc())
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            Zone::Fixed(off) => off.to_string(),
            Zone::Named(tz) => tz.name().to_string(),
        }
    }

    /// Offset in force at the instant `at`. Historical offsets with a seconds part
    /// (local mean time) are cut to whole minutes so they stay RFC 3339 printable.
    pub fn offset_at(&self, at: OffsetDateTime) -> UtcOffset {
        match self {
            Zone::Fixed(off) => *off,
            Zone::Named(tz) => {
                let off = tz.get_offset_utc(&at).to_utc();
                UtcOffset::from_hms(off.whole_hours(), off.minutes_past_hour(), 0).unwrap_or(UtcOffset::UTC)
            }
        }
    }

    /// The same instant shown in this zone. `None` when the local date leaves the
    /// representable range.
    pub fn convert(&self, at: OffsetDateTime) -> Option<OffsetDateTime> {
        at.checked_to_offset(self.offset_at(at))
    }

    /// Read a wall-clock time in this zone. A time repeated by a backward shift
    /// takes the earlier offset; a time skipped by a forward shift is read with the
    /// offset before the shift and shown after it.
    pub fn assume(&self, wall: PrimitiveDateTime) -> Option<OffsetDateTime> {
        match self {
            Zone::Fixed(off) => Some(wall.assume_offset(*off)),
            Zone::Named(_) => {
                let guess = self.offset_at(wall.assume_utc());
                let first = wall.assume_offset(guess);
                let actual = self.offset_at(first);
                if actual == guess {
                    return Some(first);
                }
                let second = wall.assume_offset(actual);
                if self.offset_at(second) == actual {
                    return Some(second);
                }
                self.convert(first)
            }
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Zone::local()
    }
}

impl From<UtcOffset> for Zone {
    fn from(off: UtcOffset) -> Self {
        Zone::Fixed(off)
    }
}

impl From<&'static Tz> for Zone {
    fn from(tz: &'static Tz) -> Self {
        Zone::Named(tz)
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Zone::Fixed(a), Zone::Fixed(b)) => a == b,
            (Zone::Named(a), Zone::Named(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Fixed(off) => write!(f, "Fixed({off})"),
            Zone::Named(tz) => write!(f, "Named({})", tz.name()),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The system's current offset. `time` refuses to read it when it cannot do so soundly
/// (multi-threaded unix processes), in which case UTC is used.
pub fn local_offset_or_utc() -> UtcOffset {
    match UtcOffset::current_local_offset() {
        Ok(off) => off,
        Err(e) => {
            tracing::debug!("local offset unavailable ({e}); using UTC");
            UtcOffset::UTC
        }
    }
}
