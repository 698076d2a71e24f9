//! Sales summaries over a trailing window of days.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::types::{ItemType, Order};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;
const TOP_N: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemTypeTotals {
    pub count: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub name: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub days: u32,
    pub since: DateTime<Utc>,
    pub order_count: u64,
    pub revenue: f64,
    pub average_order_value: f64,
    pub by_status: BTreeMap<String, u64>,
    pub by_item_type: BTreeMap<String, ItemTypeTotals>,
    pub top_feteer_types: Vec<RankedItem>,
    pub top_sweets: Vec<RankedItem>,
    /// One entry per calendar day (UTC) in the window, oldest first, zero days included
    pub daily: Vec<DailyTotals>,
}

/// Clamp a requested window to `1..=MAX_WINDOW_DAYS`
pub fn window_days(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS)
}

fn ranked(counts: HashMap<String, u64>) -> Vec<RankedItem> {
    let mut items: Vec<RankedItem> = counts
        .into_iter()
        .map(|(name, quantity)| RankedItem { name, quantity })
        .collect();
    items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    items.truncate(TOP_N);
    items
}

/// Midnight (UTC) opening a window of `days` calendar days ending today
pub fn window_start(days: u32, now: DateTime<Utc>) -> DateTime<Utc> {
    let first_day = now.date_naive() - Duration::days(i64::from(days.max(1)) - 1);
    first_day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Summarize orders created within the last `days` days before `now`
pub fn summarize(orders: &[Order], days: u32, now: DateTime<Utc>) -> AnalyticsSummary {
    let since = window_start(days, now);
    let first_day = since.date_naive();

    let mut daily: BTreeMap<NaiveDate, DailyTotals> = first_day
        .iter_days()
        .take_while(|d| *d <= now.date_naive())
        .map(|date| (date, DailyTotals { date, orders: 0, revenue: 0.0 }))
        .collect();

    let mut by_status = BTreeMap::new();
    let mut by_item_type: BTreeMap<String, ItemTypeTotals> = BTreeMap::new();
    let mut feteer_counts: HashMap<String, u64> = HashMap::new();
    let mut sweet_counts: HashMap<String, u64> = HashMap::new();
    let mut order_count = 0u64;
    let mut revenue = 0.0;

    for order in orders.iter().filter(|o| o.created_at >= since && o.created_at <= now) {
        order_count += 1;
        revenue += order.price;

        *by_status.entry(order.status.clone()).or_insert(0) += 1;

        let totals = by_item_type.entry(order.item_type.as_str().to_string()).or_default();
        totals.count += 1;
        totals.revenue += order.price;

        if let Some(day) = daily.get_mut(&order.created_at.date_naive()) {
            day.orders += 1;
            day.revenue += order.price;
        }

        match order.item_type {
            ItemType::Feteer => {
                if let Some(kind) = order.feteer_type.as_deref().filter(|k| !k.is_empty()) {
                    *feteer_counts.entry(kind.to_string()).or_insert(0) += 1;
                }
            }
            ItemType::Sweet => {
                let selections = order.sweet_quantities();
                if selections.is_empty() {
                    if let Some(sweet) = order.sweet_type.as_deref().filter(|s| !s.is_empty()) {
                        *sweet_counts.entry(sweet.to_string()).or_insert(0) += 1;
                    }
                }
                for (name, qty) in selections {
                    *sweet_counts.entry(name).or_insert(0) += u64::from(qty);
                }
            }
        }
    }

    let average_order_value = if order_count == 0 { 0.0 } else { revenue / order_count as f64 };

    AnalyticsSummary {
        days,
        since,
        order_count,
        revenue,
        average_order_value,
        by_status,
        by_item_type,
        top_feteer_types: ranked(feteer_counts),
        top_sweets: ranked(sweet_counts),
        daily: daily.into_values().collect(),
    }
}
