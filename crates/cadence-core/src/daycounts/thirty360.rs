//! 30E/360 day count convention.

use rust_decimal::Decimal;

use super::DayCount;
use crate::types::Date;

/// 30E/360 (Eurobond basis).
///
/// Both day-of-month values of 31 are treated as 30; February is not
/// adjusted.
///
/// # Formula
///
/// $$\text{Days} = 360(Y_2 - Y_1) + 30(M_2 - M_1) + (D_2 - D_1)$$
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thirty360E;

impl DayCount for Thirty360E {
    fn name(&self) -> &'static str {
        "30E/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> Decimal {
        Decimal::from(self.day_count(start, end)) / Decimal::from(360)
    }

    fn day_count(&self, start: Date, end: Date) -> i64 {
        let y1 = i64::from(start.year());
        let y2 = i64::from(end.year());
        let m1 = i64::from(start.month());
        let m2 = i64::from(end.month());
        let d1 = i64::from(start.day().min(30));
        let d2 = i64::from(end.day().min(30));

        360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_full_year() {
        assert_eq!(Thirty360E.day_count(d(2025, 1, 1), d(2026, 1, 1)), 360);
        assert_eq!(Thirty360E.year_fraction(d(2025, 1, 1), d(2026, 1, 1)), dec!(1));
    }

    #[test]
    fn test_both_31st_become_30th() {
        assert_eq!(Thirty360E.day_count(d(2025, 1, 31), d(2025, 3, 31)), 60);
    }

    #[test]
    fn test_end_31st_always_adjusted() {
        assert_eq!(Thirty360E.day_count(d(2025, 1, 15), d(2025, 3, 31)), 75);
    }

    #[test]
    fn test_february_not_adjusted() {
        // Feb 28 -> Mar 31: 30 * 1 + (30 - 28)
        assert_eq!(Thirty360E.day_count(d(2025, 2, 28), d(2025, 3, 31)), 32);
    }
}
