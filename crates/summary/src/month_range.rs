use chrono::{DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open UTC range `[start, end)` covering one calendar month as
/// experienced in a target timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String, // YYYY-MM
}

#[derive(Debug, thiserror::Error)]
pub enum MonthRangeError {
    #[error("Invalid month label: {0}")]
    InvalidLabel(String),
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Resolves a `YYYY-MM` label (or, when absent, the current month as seen
/// in `timezone`) into UTC month boundaries.
///
/// Wall-clock midnights are resolved against the timezone database: an
/// ambiguous local midnight (clocks rolled back) maps to the earlier
/// offset, a nonexistent one (clocks rolled forward past midnight) maps
/// to the first valid instant after the gap.
pub fn resolve(label: Option<&str>, timezone: &str) -> Result<MonthRange, MonthRangeError> {
    let tz: Tz = timezone
        .parse()
        .map_err(|_| MonthRangeError::UnknownTimezone(timezone.to_string()))?;

    let (year, month) = match label {
        Some(l) => parse_label(l)?,
        None => {
            // "Current month" follows the caller's timezone, not the server's
            let today = Utc::now().with_timezone(&tz).date_naive();
            (today.year(), today.month())
        }
    };

    // parse_label only accepts labels that form a valid first-of-month
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| MonthRangeError::InvalidLabel(format!("{year:04}-{month:02}")))?;
    let next = first + Months::new(1);

    Ok(MonthRange {
        start: local_midnight_utc(tz, first),
        end: local_midnight_utc(tz, next),
        label: match label {
            Some(l) => l.to_string(),
            None => format!("{year:04}-{month:02}"),
        },
    })
}

fn parse_label(label: &str) -> Result<(i32, u32), MonthRangeError> {
    if label.len() != 7 {
        return Err(MonthRangeError::InvalidLabel(label.to_string()));
    }

    NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d")
        .map(|d| (d.year(), d.month()))
        .map_err(|_| MonthRangeError::InvalidLabel(label.to_string()))
}

fn local_midnight_utc(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            // Midnight fell into a DST gap; the first valid wall-clock
            // instant is within the next hour
            let shifted = midnight + Duration::hours(1);
            match tz.from_local_datetime(&shifted).earliest() {
                Some(dt) => dt.with_timezone(&Utc),
                None => Utc.from_utc_datetime(&midnight),
            }
        }
    }
}
