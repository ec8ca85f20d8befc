use chrono::{DateTime, Datelike, Local, TimeZone};

/// Format an epoch timestamp for the task list: `Mar 04` within the current
/// year, `2023-03-04` otherwise.
pub fn format_date<Tz: TimeZone>(epoch: i64, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let Some(date) = tz.timestamp_opt(epoch, 0).single() else {
        return String::new();
    };
    if date.year() == now.year() {
        date.format("%b %d").to_string()
    } else {
        date.format("%F").to_string()
    }
}

/// The current date as shown in the title bar
pub fn today(now: &DateTime<Local>) -> String {
    format_date(now.timestamp(), now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[test]
    fn current_year_is_short() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap().timestamp();
        assert_eq!(format_date(due, &now), "Mar 04");
    }

    #[test]
    fn other_years_are_full() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap().timestamp();
        assert_eq!(format_date(due, &now), "2023-12-31");
    }
}
