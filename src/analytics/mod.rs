//! Dashboard analytics, derived read-only from a lead collection.
//!
//! Everything here is a pure function over the leads the caller is allowed to
//! see; visibility filtering happens before aggregation.

use chrono::{DateTime, Datelike};
use serde::Serialize;

use crate::models::{Lead, LeadStatus, ProductType};

/// French short month labels, January first, as the dashboard charts them.
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Juin", "Juil", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// Label of the synthetic bucket returned for an empty lead collection, so
/// downstream charts always have a series to render.
pub const EMPTY_BUCKET_LABEL: &str = "Aucune donnée";

/// Commission total for one calendar month.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCommission {
    pub month: String,
    pub total_commission: f64,
}

/// Occurrence count for one product across all leads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCount {
    pub label: String,
    pub count: u32,
}

/// Headline totals for the dashboard stat cards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of commissions on INSTALLED/PAID leads.
    pub earned_commission: f64,
    /// Sum of commissions on leads strictly between NEW and INSTALLED.
    pub pending_commission: f64,
    pub lead_count: usize,
}

/// Full analytics payload for one year.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub year: i32,
    pub totals: Totals,
    pub monthly: Vec<MonthlyCommission>,
    pub by_product: Vec<ProductCount>,
}

/// Aggregate a lead collection into the dashboard's chart and card data.
pub fn aggregate(leads: &[Lead], year: i32) -> AnalyticsSummary {
    AnalyticsSummary {
        year,
        totals: totals(leads),
        monthly: monthly_commissions(leads, year),
        by_product: product_counts(leads),
    }
}

/// Headline totals across the whole collection, independent of year.
pub fn totals(leads: &[Lead]) -> Totals {
    let earned_commission = leads
        .iter()
        .filter(|l| l.status.is_earned())
        .map(|l| l.estimated_commission)
        .sum();
    let pending_commission = leads
        .iter()
        .filter(|l| l.status.is_pending())
        .map(|l| l.estimated_commission)
        .sum();

    Totals {
        earned_commission,
        pending_commission,
        lead_count: leads.len(),
    }
}

/// Bucket commissions by calendar month of `date_added` for the given year.
///
/// NEW leads carry no realized or pending value yet and are excluded; leads
/// with an unparsable date are skipped rather than failing the whole chart.
fn monthly_commissions(leads: &[Lead], year: i32) -> Vec<MonthlyCommission> {
    let mut buckets = [0.0f64; 12];

    for lead in leads {
        if lead.status == LeadStatus::New {
            continue;
        }
        let Ok(date) = DateTime::parse_from_rfc3339(&lead.date_added) else {
            continue;
        };
        if date.year() == year {
            buckets[date.month0() as usize] += lead.estimated_commission;
        }
    }

    MONTH_LABELS
        .iter()
        .zip(buckets)
        .map(|(label, total_commission)| MonthlyCommission {
            month: (*label).to_string(),
            total_commission,
        })
        .collect()
}

/// Count product occurrences across all leads' product sets.
///
/// A lead with two products contributes to two buckets. Products nobody has
/// referred are omitted. An empty collection yields the synthetic
/// "no data" bucket.
fn product_counts(leads: &[Lead]) -> Vec<ProductCount> {
    if leads.is_empty() {
        return vec![ProductCount {
            label: EMPTY_BUCKET_LABEL.to_string(),
            count: 1,
        }];
    }

    let mut counts = [0u32; ProductType::ALL.len()];
    for lead in leads {
        for product in &lead.products {
            let idx = ProductType::ALL.iter().position(|p| p == product).unwrap_or(0);
            counts[idx] += 1;
        }
    }

    ProductType::ALL
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(product, count)| ProductCount {
            label: product.label().to_string(),
            count,
        })
        .collect()
}
