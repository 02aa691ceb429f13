//! Capture-time normalization: absolute time, local time, and timezone
//! resolution from partial inputs.
//!
//! The guarantees are: once a UTC capture time is set, a local time is
//! always set alongside it (local = UTC when no zone is known), and the
//! year/month/day partition fields are derived from local time only.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::models::Record;
use crate::source::Provenance;

/// Lowest plausible capture year; anything below is treated as unset.
pub const YEAR_MIN: i32 = 1000;

/// Highest supported capture year.
pub const YEAR_MAX: i32 = 2500;

const UTC_NAME: &str = "UTC";

/// Convert a UTC time into a zone's local wall-clock time.
///
/// Returns `None` when the zone name does not parse as an IANA zone.
pub fn local_in_zone(utc: DateTime<Utc>, zone: &str) -> Option<NaiveDateTime> {
    let tz = Tz::from_str(zone).ok()?;
    Some(utc.with_timezone(&tz).naive_local())
}

/// Interpret a local wall-clock time in a zone and convert it to UTC.
///
/// On DST ambiguity the earlier mapping wins; a non-existent local time
/// (spring-forward gap) or an unparseable zone yields `None`.
pub fn utc_from_local(local: NaiveDateTime, zone: &str) -> Option<DateTime<Utc>> {
    let tz = Tz::from_str(zone).ok()?;

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn round_second(t: DateTime<Utc>) -> DateTime<Utc> {
    t.with_nanosecond(0).unwrap_or(t)
}

fn round_second_naive(t: NaiveDateTime) -> NaiveDateTime {
    t.with_nanosecond(0).unwrap_or(t)
}

impl Record {
    /// Local time computed from the stored UTC time and stored zone.
    fn local_from_stored_zone(&self) -> Option<NaiveDateTime> {
        local_in_zone(self.taken_at?, self.time_zone.as_deref()?)
    }

    /// UTC time computed from the stored local time and stored zone.
    fn utc_from_stored_zone(&self) -> Option<DateTime<Utc>> {
        utc_from_local(self.taken_at_local?, self.time_zone.as_deref()?)
    }

    /// Set the capture time from possibly-partial inputs.
    ///
    /// Candidates outside the supported year range and candidates from a
    /// source ranked below the current time source are dropped. Times from
    /// file names carry no reliable zone, so a zone supplied with them is
    /// discarded. Automatic-tier candidates may never move an existing
    /// date later (a later timestamp from a low-trust source is more
    /// likely an error than a correction); earlier candidates pass.
    pub fn set_taken_at(
        &mut self,
        taken: DateTime<Utc>,
        local: Option<NaiveDateTime>,
        zone: Option<&str>,
        source: Provenance,
    ) -> bool {
        if taken.year() < YEAR_MIN || taken.year() > YEAR_MAX {
            debug!(field = "taken_at", year = taken.year(), "capture year out of range");
            return false;
        }

        if source < self.taken_source && self.taken_at.is_some() {
            return false;
        }

        // Remove the zone if the time was extracted from a file name.
        let zone = if source == Provenance::Name { None } else { zone };
        let zone = zone.map(str::trim).filter(|z| !z.is_empty());

        // Round times to avoid jitter between extraction passes.
        let taken = round_second(taken);
        let local = match local {
            Some(l) if l.year() >= YEAR_MIN => round_second_naive(l),
            _ => taken.naive_utc(),
        };

        // Don't update to a later date from a low-trust source.
        if source <= Provenance::Auto {
            if let Some(existing) = self.taken_at {
                if taken > existing {
                    debug!(
                        field = "taken_at",
                        source = %source,
                        "later candidate from low-trust source rejected"
                    );
                    return false;
                }
            }
        }

        self.taken_at = Some(taken);
        self.taken_at_local = Some(local);
        self.taken_source = source;

        match zone {
            Some(z) if z == UTC_NAME && self.time_zone.is_some() => {
                // Zone already on record, recompute local from UTC.
                if let Some(l) = self.local_from_stored_zone() {
                    self.taken_at_local = Some(l);
                }
            }
            Some(z) => {
                // Adopt the supplied zone and recompute UTC from local.
                self.time_zone = Some(z.to_string());
                if let Some(u) = self.utc_from_stored_zone() {
                    self.taken_at = Some(u);
                }
            }
            None if self.time_zone.as_deref() == Some(UTC_NAME) => {
                // Local is UTC.
                self.time_zone = None;
                self.taken_at_local = Some(taken.naive_utc());
            }
            None if self.time_zone.is_some() => {
                // Apply the existing zone.
                if let Some(l) = self.local_from_stored_zone() {
                    self.taken_at_local = Some(l);
                }
            }
            None => {}
        }

        self.update_date_fields();

        true
    }

    /// Apply a timezone correction.
    ///
    /// No-op for an empty or UTC zone, and for records whose time field is
    /// locked by manual-or-higher provenance.
    pub fn update_time_zone(&mut self, zone: &str) -> bool {
        let zone = zone.trim();

        if zone.is_empty() || zone == UTC_NAME {
            return false;
        }

        if self.taken_source >= Provenance::Manual && self.time_zone.is_some() {
            return false;
        }

        if self.time_zone.as_deref() == Some(UTC_NAME) {
            self.time_zone = Some(zone.to_string());
            if let Some(l) = self.local_from_stored_zone() {
                self.taken_at_local = Some(l);
            }
        } else {
            self.time_zone = Some(zone.to_string());
            if let Some(u) = self.utc_from_stored_zone() {
                self.taken_at = Some(u);
            }
        }

        true
    }

    /// Recompute the year/month/day partition fields from local time.
    ///
    /// An estimated capture time close to the record's creation time is a
    /// filler (no real capture date exists), so the partitions become
    /// unknown. Manually dated records keep their partitions untouched.
    pub fn update_date_fields(&mut self) {
        let taken = match self.taken_at {
            Some(t) if t.year() >= YEAR_MIN => t,
            _ => return,
        };

        let local = match self.taken_at_local {
            Some(l) if l.year() >= YEAR_MIN => l,
            _ => {
                let l = taken.naive_utc();
                self.taken_at_local = Some(l);
                l
            }
        };

        if self.taken_source == Provenance::Estimated
            && taken > self.created_at - Duration::hours(24)
        {
            self.year = None;
            self.month = None;
            self.day = None;
        } else if self.taken_source != Provenance::Manual {
            self.year = Some(local.year());
            self.month = Some(local.month());
            self.day = Some(local.day());
        }
    }
}
