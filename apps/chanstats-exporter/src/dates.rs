use chrono::NaiveDate;

/// Every date from `start` through `end` inclusive, one day at a time. An
/// inverted range yields nothing.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}
