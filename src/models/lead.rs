//! Lead model: a prospect referred by a partner into the sales pipeline.

use serde::{Deserialize, Serialize};

/// Pipeline stage of a lead, from referral to paid commission.
///
/// The order below is the canonical pipeline order. The store enforces no
/// transition guard: an admin may set any value to correct a mis-set status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Meeting,
    Quote,
    Signed,
    Installed,
    Paid,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Meeting => "MEETING",
            LeadStatus::Quote => "QUOTE",
            LeadStatus::Signed => "SIGNED",
            LeadStatus::Installed => "INSTALLED",
            LeadStatus::Paid => "PAID",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(LeadStatus::New),
            "CONTACTED" => Some(LeadStatus::Contacted),
            "MEETING" => Some(LeadStatus::Meeting),
            "QUOTE" => Some(LeadStatus::Quote),
            "SIGNED" => Some(LeadStatus::Signed),
            "INSTALLED" => Some(LeadStatus::Installed),
            "PAID" => Some(LeadStatus::Paid),
            _ => None,
        }
    }

    /// French display label, as shown in the dashboard and in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "Nouveau",
            LeadStatus::Contacted => "Contact établi",
            LeadStatus::Meeting => "Rendez-vous planifié",
            LeadStatus::Quote => "Devis envoyé",
            LeadStatus::Signed => "Signé",
            LeadStatus::Installed => "Installé",
            LeadStatus::Paid => "Commission payée",
        }
    }

    /// Commission is earned once the installation is done or paid out.
    pub fn is_earned(&self) -> bool {
        matches!(self, LeadStatus::Installed | LeadStatus::Paid)
    }

    /// Commission is pending while the lead sits strictly between NEW and INSTALLED.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            LeadStatus::Contacted | LeadStatus::Meeting | LeadStatus::Quote | LeadStatus::Signed
        )
    }
}

/// Product referred with a lead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Solar,
    HeatPump,
    Isolation,
    WaterHeater,
    /// Deprecated: only appears in legacy leads, kept for compatibility.
    EvCharger,
}

impl ProductType {
    pub const ALL: [ProductType; 5] = [
        ProductType::Solar,
        ProductType::HeatPump,
        ProductType::Isolation,
        ProductType::WaterHeater,
        ProductType::EvCharger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Solar => "SOLAR",
            ProductType::HeatPump => "HEAT_PUMP",
            ProductType::Isolation => "ISOLATION",
            ProductType::WaterHeater => "WATER_HEATER",
            ProductType::EvCharger => "EV_CHARGER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SOLAR" => Some(ProductType::Solar),
            "HEAT_PUMP" => Some(ProductType::HeatPump),
            "ISOLATION" => Some(ProductType::Isolation),
            "WATER_HEATER" => Some(ProductType::WaterHeater),
            "EV_CHARGER" => Some(ProductType::EvCharger),
            _ => None,
        }
    }

    /// French display label, as shown in the dashboard and analytics charts.
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::Solar => "Panneaux solaires",
            ProductType::HeatPump => "Pompe à chaleur",
            ProductType::Isolation => "Isolation thermique",
            ProductType::WaterHeater => "Chauffe-eau solaire",
            ProductType::EvCharger => "Borne de recharge",
        }
    }
}

/// A prospect referred by a partner.
///
/// `partner_id`, `partner_name` and `date_added` are fixed at creation and
/// survive every update, including admin edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub partner_id: String,
    pub partner_name: String,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Set semantics: deduplicated on write, order not meaningful.
    pub products: Vec<ProductType>,
    pub status: LeadStatus,
    pub date_added: String,
    /// Recomputed from `products` on every write; never hand-edited.
    pub estimated_commission: f64,
    /// Internal version for optimistic concurrency control
    #[serde(default)]
    pub version: i64,
}

/// Request body for registering a new lead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub products: Vec<ProductType>,
}

/// Request body for updating an existing lead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub products: Option<Vec<ProductType>>,
    #[serde(default)]
    pub status: Option<LeadStatus>,
    /// Expected version for optimistic concurrency control
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Deduplicate a product list while keeping first-seen order.
pub fn dedup_products(products: &[ProductType]) -> Vec<ProductType> {
    let mut seen = Vec::with_capacity(products.len());
    for p in products {
        if !seen.contains(p) {
            seen.push(*p);
        }
    }
    seen
}
