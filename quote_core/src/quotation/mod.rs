//! # Quotations
//!
//! The quotation document and the engine that produces it.
//!
//! ## Structure
//!
//! ```text
//! Quotation
//! ├── header: id, reference, project name/location, generated_at
//! ├── items: Vec<QuotationItem>          (bill-of-quantities order)
//! ├── transport_breakdown: Vec<LineTransport>  (one per item, same order)
//! ├── totals: subtotal + transport + VAT = grand total
//! ├── payment_schedule: 5 fixed phases
//! ├── supplier_summary: per-supplier totals
//! └── budget: optional comparison with the client budget
//! ```
//!
//! ## Example
//!
//! ```rust
//! use quote_core::pricing::NoVariation;
//! use quote_core::project::ProjectSpecification;
//! use quote_core::quotation::QuotationEngine;
//! use quote_core::reference::ReferenceData;
//!
//! let engine = QuotationEngine::new(ReferenceData::builtin().clone()).unwrap();
//! let spec = ProjectSpecification::new(120.0, 1, 3, 2, "nairobi");
//! let quotation = engine.generate_with(&spec, &mut NoVariation, chrono::Utc::now()).unwrap();
//!
//! let t = &quotation.totals;
//! assert!((t.grand_total - (t.subtotal + t.transport_total + t.tax_amount)).abs() < 0.01);
//! assert_eq!(quotation.payment_schedule.len(), 5);
//! ```

pub mod engine;
pub mod schedule;

pub use engine::QuotationEngine;
pub use schedule::{budget_check, payment_schedule, supplier_summary, PAYMENT_PHASES};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::materials::MaterialLine;
use crate::pricing::PriceQuote;
use crate::transport::TransportCost;

/// Current schema version for saved quotation documents
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Value added tax applied to materials plus transport
pub const VAT_RATE: f64 = 0.16;

/// Currency all amounts are expressed in
pub const CURRENCY: &str = "KES";

/// How long a quotation's prices hold
pub const VALIDITY_DAYS: u32 = 30;

/// Supplier a line is sourced from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRef {
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_location: String,
}

/// One priced line of the quotation.
///
/// `total` is always `round(quantity × unit_rate, 2)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationItem {
    #[serde(flatten)]
    pub material: MaterialLine,
    /// Unit price charged
    pub unit_rate: f64,
    /// Line total
    pub total: f64,
    #[serde(flatten)]
    pub supplier: SupplierRef,
    /// True when the project location had no preferred supplier
    pub supplier_defaulted: bool,
    /// Confidence of the unit price (0 when the base price is missing)
    pub price_confidence: f64,
    /// Full pricing breakdown
    pub price: PriceQuote,
}

/// Transport cost for one quotation item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTransport {
    pub item_code: String,
    #[serde(flatten)]
    pub cost: TransportCost,
}

/// Totals block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub transport_total: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
    pub currency: String,
}

/// One instalment of the payment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPhase {
    pub phase: String,
    pub percentage: u32,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub description: String,
}

/// Per-supplier contribution to the quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierSummary {
    pub supplier_id: String,
    pub supplier_name: String,
    pub location: String,
    pub total_amount: f64,
    pub item_count: usize,
}

/// Comparison of the grand total with the client's budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCheck {
    pub budget: f64,
    pub grand_total: f64,
    /// Budget minus grand total; negative when over budget
    pub variance: f64,
    pub within_budget: bool,
}

/// A complete, priced quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    /// Document schema version (for load compatibility)
    pub schema_version: String,
    pub id: Uuid,
    /// Human-facing reference, e.g. "QUO-20260115-042"
    pub reference: String,
    pub project_name: String,
    /// Site location, title-cased
    pub project_location: String,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<QuotationItem>,
    pub transport_breakdown: Vec<LineTransport>,
    pub totals: Totals,
    pub payment_schedule: Vec<PaymentPhase>,
    pub supplier_summary: Vec<SupplierSummary>,
    #[serde(default)]
    pub budget: Option<BudgetCheck>,
    pub validity_days: u32,
    pub notes: Vec<String>,
}

impl Quotation {
    /// Item codes whose base price was missing (zero-priced lines)
    pub fn degraded_items(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.price.is_missing())
            .map(|item| item.material.item_code.as_str())
            .collect()
    }

    /// Find an item by code
    pub fn item(&self, item_code: &str) -> Option<&QuotationItem> {
        self.items.iter().find(|i| i.material.item_code == item_code)
    }

    /// Transport cost for an item
    pub fn transport_for(&self, item_code: &str) -> Option<&TransportCost> {
        self.transport_breakdown
            .iter()
            .find(|t| t.item_code == item_code)
            .map(|t| &t.cost)
    }

    /// Last day the quoted prices hold
    pub fn valid_until(&self) -> NaiveDate {
        (self.generated_at + Duration::days(i64::from(self.validity_days))).date_naive()
    }
}
