//! Cost listing helpers
//!
//! The previous-month reporting window and the filtering of a Cost Explorer
//! `GetCostAndUsage` response down to services that actually cost money.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Inclusive first and last day of a reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CostWindow {
    /// The calendar month before the one containing `today`
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let end = first_of_month - Duration::days(1);
        let start = end.with_day(1).unwrap_or(end);
        Self { start, end }
    }

    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Subset of a `GetCostAndUsage` response grouped by SERVICE
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct CostAndUsageResponse {
    #[serde(default)]
    pub results_by_time: Vec<ResultByTime>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ResultByTime {
    #[serde(default)]
    pub groups: Vec<CostGroup>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostGroup {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub metrics: HashMap<String, MetricValue>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    pub amount: String,
}

const COST_METRIC: &str = "UnblendedCost";

/// Service names with a strictly positive unblended cost, sorted and unique.
/// Amounts that do not parse count as zero.
pub fn services_with_cost(response: &CostAndUsageResponse) -> Vec<String> {
    let mut services = BTreeSet::new();

    for result in &response.results_by_time {
        for group in &result.groups {
            let amount = group
                .metrics
                .get(COST_METRIC)
                .and_then(|m| m.amount.parse::<f64>().ok())
                .unwrap_or(0.0);
            if amount > 0.0 {
                if let Some(service) = group.keys.first() {
                    services.insert(service.clone());
                }
            }
        }
    }

    services.into_iter().collect()
}
