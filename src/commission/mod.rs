//! Commission estimation.
//!
//! The rate table is program configuration: one `(min, max)` range per
//! product, in euros. An estimate is the arithmetic mean of the range, summed
//! over the distinct products of a lead.

use serde::{Deserialize, Serialize};

use crate::models::ProductType;

/// Commission range for one product, in euros.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRate {
    pub product: ProductType,
    pub min: u32,
    pub max: u32,
}

/// The program's commission table. Invariant: one row per product, min <= max.
pub const COMMISSION_RATES: [CommissionRate; 5] = [
    CommissionRate {
        product: ProductType::Solar,
        min: 500,
        max: 1200,
    },
    CommissionRate {
        product: ProductType::HeatPump,
        min: 300,
        max: 800,
    },
    CommissionRate {
        product: ProductType::Isolation,
        min: 400,
        max: 600,
    },
    CommissionRate {
        product: ProductType::WaterHeater,
        min: 200,
        max: 350,
    },
    CommissionRate {
        product: ProductType::EvCharger,
        min: 100,
        max: 200,
    },
];

/// Look up the rate for a product.
pub fn rate_for(product: ProductType) -> CommissionRate {
    // The table covers the closed enum, so the lookup cannot miss.
    COMMISSION_RATES
        .iter()
        .copied()
        .find(|r| r.product == product)
        .unwrap_or(CommissionRate {
            product,
            min: 0,
            max: 0,
        })
}

/// Estimate the commission for a lead's product set.
///
/// Duplicates and ordering are irrelevant; an empty slice yields 0.0 (create
/// and update flows reject empty product sets before getting here).
pub fn estimate(products: &[ProductType]) -> f64 {
    crate::models::dedup_products(products)
        .into_iter()
        .map(|p| {
            let rate = rate_for(p);
            (rate.min as f64 + rate.max as f64) / 2.0
        })
        .sum()
}
