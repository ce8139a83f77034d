use chrono::{Datelike, Duration, NaiveDate};

/// First and last day of the calendar month before `today`.
pub fn last_month_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first_of_this_month = today.with_day(1).unwrap_or(today);
    let end = first_of_this_month - Duration::days(1);
    let start = end.with_day(1).unwrap_or(end);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_last_month_range_handles_year_transition() {
        assert_eq!(last_month_range(d(2025, 1, 5)), (d(2024, 12, 1), d(2024, 12, 31)));
    }

    #[test]
    fn test_last_month_range_leap_february() {
        assert_eq!(last_month_range(d(2024, 3, 31)), (d(2024, 2, 1), d(2024, 2, 29)));
    }

    #[test]
    fn test_last_month_range_first_of_month() {
        assert_eq!(last_month_range(d(2025, 7, 1)), (d(2025, 6, 1), d(2025, 6, 30)));
    }
}
