//! DST transition handling for local wall-clock readings.
//!
//! A wall-clock reading can map to zero instants (clocks sprang forward over
//! it) or two instants (clocks fell back). Slots are always resolved the same
//! way so that compiling the same selection twice yields the same instants.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};

/// How a local reading was mapped onto the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one instant has this reading.
    Exact,
    /// Clocks fell back; the earlier of the two instants was taken.
    Earliest,
    /// Reading falls in a spring-forward gap; interpreted with the offset in
    /// force before the gap, which shifts it forward by the gap length.
    ShiftedForward,
}

/// Resolve a local reading in `zone` to a UTC instant.
pub fn resolve_local<Z: TimeZone>(zone: &Z, local: &NaiveDateTime) -> (DateTime<Utc>, Resolution) {
    match zone.from_local_datetime(local) {
        LocalResult::Single(dt) => (dt.with_timezone(&Utc), Resolution::Exact),
        LocalResult::Ambiguous(earliest, _) => {
            (earliest.with_timezone(&Utc), Resolution::Earliest)
        }
        LocalResult::None => {
            // Offsets never exceed a day, so one day back is safely before the gap.
            let before = zone
                .offset_from_utc_datetime(&(*local - Duration::days(1)))
                .fix()
                .local_minus_utc();
            (
                local.and_utc() - Duration::seconds(i64::from(before)),
                Resolution::ShiftedForward,
            )
        }
    }
}
