//! Date-range helpers: window normalization and day-by-day decomposition.

use std::future::Future;

use chrono::NaiveDate;
use log::warn;

use crate::models::{Price, ProviderKey, Rate};
use crate::response::ProviderResponse;

/// Every calendar day in `[start, end]`, ascending. Empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Keep rates inside `[start, end]`, sort them by date and keep one rate per date.
pub fn normalize_rates(mut rates: Vec<Rate>, start: NaiveDate, end: NaiveDate) -> Vec<Rate> {
    rates.retain(|r| r.date >= start && r.date <= end);
    rates.sort_by_key(|r| r.date);
    rates.dedup_by_key(|r| r.date);
    rates
}

/// Same as [`normalize_rates`] for prices.
pub fn normalize_prices(mut prices: Vec<Price>, start: NaiveDate, end: NaiveDate) -> Vec<Price> {
    prices.retain(|p| p.date >= start && p.date <= end);
    prices.sort_by_key(|p| p.date);
    prices.dedup_by_key(|p| p.date);
    prices
}

/// Serve a range request as sequential single-day fetches.
///
/// A day whose fetch fails is logged and left out; the others are returned,
/// normalized. One bad day never fails the whole range.
pub(crate) async fn collect_daily_rates<F, Fut>(
    provider: ProviderKey,
    from: &str,
    to: &str,
    start: NaiveDate,
    end: NaiveDate,
    mut fetch_day: F,
) -> Vec<Rate>
where
    F: FnMut(NaiveDate) -> Fut,
    Fut: Future<Output = ProviderResponse<Rate>>,
{
    let mut rates = Vec::new();

    for date in days_in_range(start, end) {
        match fetch_day(date).await {
            ProviderResponse::Success(rate) => rates.push(rate),
            ProviderResponse::Failure(error) => {
                warn!(
                    "{}: failed to fetch rate for {} to {} on {}: {}",
                    provider, from, to, date, error.message
                );
            }
        }
    }

    normalize_rates(rates, start, end)
}
