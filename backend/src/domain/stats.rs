//! Production statistics windows and totals.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::FieldError;

/// Reporting period ending at a reference date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for Period {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(FieldError::new(
                "period",
                "unknown_period",
                format!("unknown period `{raw}`; expected daily, weekly, monthly or yearly"),
            )),
        }
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AggregationWindow {
    /// Window for `period` ending at `as_of`.
    ///
    /// # Errors
    ///
    /// A [`FieldError`] on `as_of` when the window start falls outside the
    /// supported calendar.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use herdbook::domain::{AggregationWindow, Period};
    ///
    /// let as_of = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// let window = AggregationWindow::ending(Period::Monthly, as_of).unwrap();
    /// assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    /// assert_eq!(window.end, as_of);
    /// ```
    pub fn ending(period: Period, as_of: NaiveDate) -> Result<Self, FieldError> {
        let start = match period {
            Period::Daily => Some(as_of),
            Period::Weekly => as_of.checked_sub_signed(Duration::days(7)),
            Period::Monthly => as_of.with_day(1),
            Period::Yearly => as_of.with_ordinal(1),
        };
        let start = start.ok_or_else(|| {
            FieldError::new(
                "as_of",
                "out_of_range",
                format!("as_of {as_of} is too early for a {period:?} window"),
            )
        })?;
        Ok(Self { start, end: as_of })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Litres of milk across a farm's animals.
    Milk,
    /// Eggs collected across a farm's batches.
    Eggs,
}

/// Sum and number of contributing records within a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductionTotals {
    #[schema(value_type = String, example = "84.50")]
    pub total: Decimal,
    pub count: u64,
}

impl ProductionTotals {
    /// Fold one record into the totals.
    pub fn add(mut self, amount: Decimal) -> Self {
        self.total += amount;
        self.count += 1;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[rstest]
    #[case(Period::Daily, date(2024, 3, 15))]
    #[case(Period::Weekly, date(2024, 3, 8))]
    #[case(Period::Monthly, date(2024, 3, 1))]
    #[case(Period::Yearly, date(2024, 1, 1))]
    fn windows_end_at_reference_date(#[case] period: Period, #[case] start: NaiveDate) {
        let window = AggregationWindow::ending(period, date(2024, 3, 15)).expect("window");
        assert_eq!(window.start, start);
        assert_eq!(window.end, date(2024, 3, 15));
    }

    #[rstest]
    fn windows_are_inclusive() {
        let window = AggregationWindow::ending(Period::Weekly, date(2024, 3, 15)).expect("window");
        assert!(window.contains(date(2024, 3, 8)));
        assert!(window.contains(date(2024, 3, 15)));
        assert!(!window.contains(date(2024, 3, 7)));
        assert!(!window.contains(date(2024, 3, 16)));
    }

    #[rstest]
    fn weekly_windows_before_the_calendar_start_are_rejected() {
        let earliest = NaiveDate::MIN
            .checked_add_signed(Duration::days(2))
            .expect("near the minimum date");

        let err = AggregationWindow::ending(Period::Weekly, earliest).expect_err("out of range");

        assert_eq!(err.field, "as_of");
        assert!(AggregationWindow::ending(Period::Daily, earliest).is_ok());
    }

    #[rstest]
    #[case("daily", Period::Daily)]
    #[case("Weekly", Period::Weekly)]
    #[case(" monthly ", Period::Monthly)]
    #[case("yearly", Period::Yearly)]
    fn parses_known_periods(#[case] raw: &str, #[case] expected: Period) {
        assert_eq!(raw.parse::<Period>().expect("known period"), expected);
    }

    #[rstest]
    fn rejects_unknown_period() {
        let err = "fortnightly".parse::<Period>().expect_err("unknown period");
        assert_eq!(err.field, "period");
        assert_eq!(err.code, "unknown_period");
    }

    #[rstest]
    fn empty_totals_are_zero() {
        let totals = ProductionTotals::default();
        assert!(totals.total.is_zero());
        assert_eq!(totals.count, 0);
    }
}
