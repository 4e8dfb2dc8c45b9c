//! Period statistics over an in-memory expense list.

use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::models::Expense;

/// Fixed calendar lookback measured back from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Bucket size of a [`Summary::timeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Granularity {
    Day,
    Week,
    Month,
}

impl Period {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "1D",
            Self::Week => "1W",
            Self::Month => "1M",
            Self::Quarter => "3M",
            Self::Year => "1Y",
        }
    }

    /// Unknown labels fall back to one month.
    pub(crate) fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "1D" | "D" | "DAY" => Self::Day,
            "1W" | "W" | "WEEK" => Self::Week,
            "3M" | "Q" | "QUARTER" => Self::Quarter,
            "1Y" | "Y" | "YEAR" => Self::Year,
            _ => Self::Month,
        }
    }

    pub(crate) fn all() -> &'static [Period] {
        &[Self::Day, Self::Week, Self::Month, Self::Quarter, Self::Year]
    }

    pub(crate) fn granularity(&self) -> Granularity {
        match self {
            Self::Day | Self::Week | Self::Month => Granularity::Day,
            Self::Quarter => Granularity::Week,
            Self::Year => Granularity::Month,
        }
    }

    /// The date one period before `date`. Windows are `(back(end), end]`.
    pub(crate) fn back(&self, date: NaiveDate) -> NaiveDate {
        let shifted = match self {
            Self::Day => date.checked_sub_days(Days::new(1)),
            Self::Week => date.checked_sub_days(Days::new(7)),
            Self::Month => date.checked_sub_months(Months::new(1)),
            Self::Quarter => date.checked_sub_months(Months::new(3)),
            Self::Year => date.checked_sub_months(Months::new(12)),
        };
        shifted.unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Summary {
    pub(crate) period: Period,
    /// Exclusive lower bound of the current window.
    pub(crate) start: NaiveDate,
    /// Inclusive upper bound of the current window.
    pub(crate) end: NaiveDate,
    /// Totals per category, largest first.
    pub(crate) per_category: Vec<(String, Decimal)>,
    /// Totals per bucket, oldest first, zero-filled.
    pub(crate) timeline: Vec<(NaiveDate, Decimal)>,
    pub(crate) current_total: Decimal,
    pub(crate) previous_total: Decimal,
    /// Percent change from the previous window to the current one.
    pub(crate) trend: Decimal,
    pub(crate) count: usize,
}

/// A pie-chart slice.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Slice {
    pub(crate) category: String,
    pub(crate) amount: Decimal,
    pub(crate) percent: Decimal,
}

pub(crate) fn summarize(expenses: &[Expense], period: Period, today: NaiveDate) -> Summary {
    let start = period.back(today);
    let prev_start = period.back(start);

    let mut by_category: HashMap<&str, Decimal> = HashMap::new();
    let mut by_bucket: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut current_total = Decimal::ZERO;
    let mut previous_total = Decimal::ZERO;
    let mut count = 0;

    let granularity = period.granularity();

    for e in expenses {
        if e.date > start && e.date <= today {
            current_total = current_total.saturating_add(e.amount);
            count += 1;
            let cat = by_category.entry(e.category.as_str()).or_default();
            *cat = cat.saturating_add(e.amount);
            let bucket = by_bucket.entry(bucket_of(e.date, granularity)).or_default();
            *bucket = bucket.saturating_add(e.amount);
        } else if e.date > prev_start && e.date <= start {
            previous_total = previous_total.saturating_add(e.amount);
        }
    }

    let mut per_category: Vec<(String, Decimal)> = by_category
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    per_category.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let timeline = bucket_keys(start, today, granularity)
        .into_iter()
        .map(|key| (key, by_bucket.get(&key).copied().unwrap_or_default()))
        .collect();

    Summary {
        period,
        start,
        end: today,
        per_category,
        timeline,
        current_total,
        previous_total,
        trend: trend_percent(current_total, previous_total),
        count,
    }
}

/// `(current - previous) / previous` as a percentage, two decimals.
///
/// With nothing to compare against the trend is 100% if anything was spent
/// and 0% otherwise.
pub(crate) fn trend_percent(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
    }
    current
        .checked_sub(previous)
        .and_then(|diff| diff.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::MAX, |pct| pct.round_dp(2))
}

/// Shape per-category totals into pie slices that carry their share of the total.
pub(crate) fn category_shares(summary: &Summary) -> Vec<Slice> {
    let total = summary.current_total;
    summary
        .per_category
        .iter()
        .map(|(category, amount)| Slice {
            category: category.clone(),
            amount: *amount,
            percent: if total.is_zero() {
                Decimal::ZERO
            } else {
                (*amount / total * Decimal::ONE_HUNDRED).round_dp(1)
            },
        })
        .collect()
}

pub(crate) fn bucket_of(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => date
            .checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
            .unwrap_or(date),
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Every bucket key overlapping `(start, end]`, oldest first.
fn bucket_keys(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    let Some(first_day) = start.succ_opt() else {
        return Vec::new();
    };
    let mut keys = Vec::new();
    let last = bucket_of(end, granularity);
    let mut key = bucket_of(first_day, granularity);
    while key <= last {
        keys.push(key);
        let next = match granularity {
            Granularity::Day => key.succ_opt(),
            Granularity::Week => key.checked_add_days(Days::new(7)),
            Granularity::Month => key.checked_add_months(Months::new(1)),
        };
        match next {
            Some(n) => key = n,
            None => break,
        }
    }
    keys
}
