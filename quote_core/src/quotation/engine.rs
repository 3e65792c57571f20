//! Quotation Engine
//!
//! Drives the pipeline for one specification:
//!
//! 1. classify materials into a bill of quantities
//! 2. for each line: pick the supplier, predict the unit price, total the
//!    line, cost its delivery from the supplier depot to the site
//! 3. subtotal + transport + 16% VAT = grand total
//! 4. split the grand total into the fixed payment phases
//! 5. summarise spend per supplier
//!
//! Missing prices and unknown places never stop a quotation; they surface as
//! zero-confidence lines and `*_defaulted` flags. Only an invalid
//! specification or broken reference data is an error.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use super::schedule::{budget_check, payment_schedule, supplier_summary};
use super::{
    LineTransport, Quotation, QuotationItem, SupplierRef, Totals, CURRENCY, SCHEMA_VERSION,
    VALIDITY_DAYS, VAT_RATE,
};
use crate::errors::{QuoteError, QuoteResult};
use crate::materials::{BillOfQuantities, MaterialClassifier, YieldFactors};
use crate::pricing::{MarketVariation, PricePredictor, UniformVariation};
use crate::project::ProjectSpecification;
use crate::reference::{ReferenceData, SupplierDirectory};
use crate::transport::{MultiSupplierTransport, SupplierShipment, TransportOptimizer};
use crate::units::{round2, Kilograms};

/// Standard terms printed on every quotation
const QUOTATION_NOTES: [&str; 5] = [
    "All prices are in Kenya Shillings (KES) and include VAT where applicable",
    "Material costs based on current market rates",
    "Transport costs calculated based on optimal logistics",
    "Prices valid for 30 days from quotation date",
    "Payment terms as per agreed schedule",
];

/// Builds quotations from project specifications.
///
/// The engine only holds immutable reference data, so one instance can serve
/// any number of callers; per-call state (the randomness source and the
/// running totals) lives in each `generate` call.
#[derive(Debug, Clone)]
pub struct QuotationEngine {
    classifier: MaterialClassifier,
    predictor: PricePredictor,
    transport: TransportOptimizer,
    suppliers: SupplierDirectory,
}

impl QuotationEngine {
    /// Create an engine over validated reference data.
    ///
    /// # Returns
    ///
    /// * `Ok(QuotationEngine)` - Ready to generate
    /// * `Err(QuoteError::Configuration)` - The reference data is unusable
    pub fn new(reference: ReferenceData) -> QuoteResult<Self> {
        reference.validate()?;
        let ReferenceData {
            pricing,
            transport,
            suppliers,
        } = reference;
        Ok(QuotationEngine {
            classifier: MaterialClassifier::default(),
            predictor: PricePredictor::new(pricing),
            transport: TransportOptimizer::new(transport),
            suppliers,
        })
    }

    /// Replace the classifier's yield factors (builder pattern)
    pub fn with_yield_factors(mut self, factors: YieldFactors) -> Self {
        self.classifier = MaterialClassifier::new(factors);
        self
    }

    pub fn classifier(&self) -> &MaterialClassifier {
        &self.classifier
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    pub fn transport(&self) -> &TransportOptimizer {
        &self.transport
    }

    /// Bill of quantities for a specification, after validating it.
    pub fn classify(&self, spec: &ProjectSpecification) -> QuoteResult<BillOfQuantities> {
        spec.validate()?;
        Ok(self.classifier.classify(spec))
    }

    /// Generate a quotation now, with non-reproducible market variation.
    pub fn generate(&self, spec: &ProjectSpecification) -> QuoteResult<Quotation> {
        let mut variation = UniformVariation::thread_local();
        self.generate_with(spec, &mut variation, Utc::now())
    }

    /// Generate a quotation with an explicit variation source and clock.
    ///
    /// The season is taken from `now`'s month and payment due dates are
    /// offset from `now`.
    pub fn generate_with(
        &self,
        spec: &ProjectSpecification,
        variation: &mut dyn MarketVariation,
        now: DateTime<Utc>,
    ) -> QuoteResult<Quotation> {
        spec.validate()?;
        let _span = tracing::info_span!("generate_quotation", location = %spec.location).entered();

        let bill = self.classifier.classify(spec);
        let project_location = spec.location_key();

        let supplier = self.suppliers.for_location(&project_location).ok_or_else(|| {
            QuoteError::configuration(
                "suppliers.default_supplier_id",
                format!("no supplier resolvable for '{}'", project_location),
            )
        })?;
        let supplier_defaulted = supplier.is_defaulted();
        if supplier_defaulted {
            tracing::debug!(location = %project_location, "no preferred supplier, using default");
        }
        let supplier = supplier.into_inner();
        let supplier_ref = SupplierRef {
            supplier_id: supplier.id.clone(),
            supplier_name: supplier.name.clone(),
            supplier_location: supplier.location.clone(),
        };

        let mut items = Vec::with_capacity(bill.len());
        let mut transport_breakdown = Vec::with_capacity(bill.len());
        let mut subtotal = 0.0;

        for line in bill.lines() {
            let price = self.predictor.predict_for_month(
                &line.item_code,
                line.category,
                &project_location,
                Some(supplier.id.as_str()),
                now.month(),
                variation,
            );
            let total = round2(line.quantity * price.unit_price);
            subtotal += total;

            let weight_factor = self.transport.tables().weight_factor(line.category).value();
            let weight = Kilograms(line.quantity * weight_factor);
            let cost = self.transport.cost(weight, &supplier.location, &project_location);
            transport_breakdown.push(LineTransport {
                item_code: line.item_code.clone(),
                cost,
            });

            items.push(QuotationItem {
                material: line.clone(),
                unit_rate: price.unit_price,
                total,
                supplier: supplier_ref.clone(),
                supplier_defaulted,
                price_confidence: price.confidence,
                price,
            });
        }

        let subtotal = round2(subtotal);
        let transport_total = round2(
            transport_breakdown
                .iter()
                .map(|t| t.cost.total_transport_cost)
                .sum::<f64>(),
        );
        let tax_amount = round2((subtotal + transport_total) * VAT_RATE);
        let grand_total = round2(subtotal + transport_total + tax_amount);

        let id = Uuid::new_v4();
        let quotation = Quotation {
            schema_version: SCHEMA_VERSION.to_string(),
            id,
            reference: format!("QUO-{}-{:03}", now.format("%Y%m%d"), id.as_u128() % 1000),
            project_name: spec.display_name().to_string(),
            project_location: title_case(&project_location),
            generated_at: now,
            payment_schedule: payment_schedule(grand_total, now),
            supplier_summary: supplier_summary(&items),
            budget: budget_check(spec.budget, grand_total),
            items,
            transport_breakdown,
            totals: Totals {
                subtotal,
                transport_total,
                tax_rate: VAT_RATE,
                tax_amount,
                grand_total,
                currency: CURRENCY.to_string(),
            },
            validity_days: VALIDITY_DAYS,
            notes: QUOTATION_NOTES.iter().map(|n| n.to_string()).collect(),
        };

        let degraded = quotation.degraded_items();
        if !degraded.is_empty() {
            tracing::warn!(items = ?degraded, "quotation contains unpriced lines");
        }
        tracing::info!(
            reference = %quotation.reference,
            items = quotation.items.len(),
            grand_total = quotation.totals.grand_total,
            "quotation generated"
        );

        Ok(quotation)
    }

    /// Re-cost a quotation's deliveries as one shipment per supplier.
    ///
    /// Weights are summed per supplier from the quotation's own transport
    /// lines, so the specification is not needed again.
    pub fn consolidated_transport(&self, quotation: &Quotation) -> MultiSupplierTransport {
        let weights: HashMap<&str, f64> = quotation
            .transport_breakdown
            .iter()
            .map(|t| (t.item_code.as_str(), t.cost.weight_kg))
            .collect();

        let mut shipments: Vec<SupplierShipment> = Vec::new();
        for item in &quotation.items {
            let weight = weights.get(item.material.item_code.as_str()).copied().unwrap_or(0.0);
            match shipments
                .iter_mut()
                .find(|s| s.supplier_id == item.supplier.supplier_id)
            {
                Some(shipment) => {
                    shipment.total_weight_kg += weight;
                    shipment.materials.push(item.material.item_code.clone());
                }
                None => shipments.push(SupplierShipment {
                    supplier_id: item.supplier.supplier_id.clone(),
                    location: item.supplier.supplier_location.clone(),
                    project_location: quotation.project_location.to_lowercase(),
                    total_weight_kg: weight,
                    materials: vec![item.material.item_code.clone()],
                }),
            }
        }

        self.transport.plan_multi_supplier(&shipments)
    }
}

/// "nairobi west" -> "Nairobi West"
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
