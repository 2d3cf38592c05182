// src/clock.rs
use chrono::{FixedOffset, NaiveDate, Utc};

// East Africa Time. The region observes no daylight saving, so a fixed
// offset is exact for civil-date arithmetic.
const EAT_OFFSET_SECS: i32 = 3 * 3600;

/// Current civil date in East Africa Time. All "is this activity overdue"
/// comparisons use this date, never the server's UTC date, so status never
/// flips a day early or late around midnight UTC.
pub fn today() -> NaiveDate {
    let eat = FixedOffset::east_opt(EAT_OFFSET_SECS).expect("valid offset");
    Utc::now().with_timezone(&eat).date_naive()
}
