//! Canned open-slot listings.
//!
//! There is no scheduling backend behind the slot picker; the API offers four fixed 30-minute
//! slots over the next two days in the caller's timezone.

use chrono::{DateTime, Days, Duration, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use fhir::Slot;

/// Default timezone when the caller does not send one.
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

const SLOT_MINUTES: i64 = 30;

/// Part of the day the caller prefers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentPeriod {
    Morning,
    Afternoon,
}

impl AppointmentPeriod {
    /// `"morning"` selects morning; anything else, including nothing, is afternoon.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("morning") => AppointmentPeriod::Morning,
            _ => AppointmentPeriod::Afternoon,
        }
    }

    /// `(days from today, hour, minute)` of each slot start.
    fn starts(self) -> [(u64, u32, u32); 4] {
        match self {
            AppointmentPeriod::Morning => [(1, 9, 0), (1, 9, 30), (2, 9, 0), (2, 9, 30)],
            AppointmentPeriod::Afternoon => [(1, 12, 0), (1, 12, 30), (2, 14, 0), (2, 14, 30)],
        }
    }
}

/// Parse an IANA timezone name, falling back to [`DEFAULT_TIMEZONE`] when absent.
///
/// # Errors
///
/// Returns the unparsed name if it is not a known timezone.
pub fn parse_timezone(raw: Option<&str>) -> Result<Tz, String> {
    let name = raw
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_TIMEZONE);
    name.parse::<Tz>().map_err(|_| name.to_string())
}

/// The free slots offered at `now`, rendered as UTC instants with millisecond precision.
///
/// Local times that do not exist in the timezone (DST gaps) are skipped.
pub fn canned_slots(now: DateTime<Tz>, period: AppointmentPeriod) -> Vec<Slot> {
    let tz = now.timezone();
    let today = now.date_naive();

    period
        .starts()
        .into_iter()
        .filter_map(|(days, hour, minute)| {
            let local = today
                .checked_add_days(Days::new(days))?
                .and_hms_opt(hour, minute, 0)?;
            let start = tz.from_local_datetime(&local).earliest()?;
            let end = start + Duration::minutes(SLOT_MINUTES);
            Some(Slot::free(iso_utc(start), iso_utc(end)))
        })
        .collect()
}

fn iso_utc(instant: DateTime<Tz>) -> String {
    instant
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
