use chrono::{DateTime, Local, NaiveDate, TimeZone};

pub const ANALYSIS_DATE_FORMAT: &str = "%d/%m/%Y";
const REPORT_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Date printed on the cover page and returned to callers, e.g. `05/03/2026`.
pub fn analysis_date(date: NaiveDate) -> String {
    date.format(ANALYSIS_DATE_FORMAT).to_string()
}

/// Report file stamp with microsecond resolution, e.g. `20260305_141502_004211`.
pub fn report_stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(REPORT_STAMP_FORMAT).to_string()
}

/// True when `s` has exactly the shape produced by [`report_stamp`].
pub fn is_report_stamp(s: &str) -> bool {
    let parts: Vec<&str> = s.split('_').collect();
    matches!(parts.as_slice(), [d, t, us]
        if d.len() == 8 && t.len() == 6 && us.len() == 6
            && parts.iter().all(|p| p.bytes().all(|b| b.is_ascii_digit())))
}
