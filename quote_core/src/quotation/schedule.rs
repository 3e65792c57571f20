//! Payment schedule, supplier summary and budget check.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::{BudgetCheck, PaymentPhase, QuotationItem, SupplierSummary};
use crate::units::round2;

/// A fixed instalment: name, percentage of the grand total, days after
/// generation, description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTemplate {
    pub phase: &'static str,
    pub percentage: u32,
    pub due_after_days: i64,
    pub description: &'static str,
}

/// Construction payment phases, always emitted in this order.
pub const PAYMENT_PHASES: [PhaseTemplate; 5] = [
    PhaseTemplate {
        phase: "Mobilization",
        percentage: 10,
        due_after_days: 7,
        description: "Initial mobilization payment",
    },
    PhaseTemplate {
        phase: "Foundation",
        percentage: 25,
        due_after_days: 30,
        description: "Foundation completion",
    },
    PhaseTemplate {
        phase: "Structural Work",
        percentage: 35,
        due_after_days: 60,
        description: "Structural work completion",
    },
    PhaseTemplate {
        phase: "Finishing",
        percentage: 25,
        due_after_days: 90,
        description: "Finishing work completion",
    },
    PhaseTemplate {
        phase: "Final Payment",
        percentage: 5,
        due_after_days: 100,
        description: "Final payment upon handover",
    },
];

/// Split `grand_total` over the fixed phases.
///
/// Each amount is rounded to 2 decimals; the last phase takes whatever the
/// rounding left over so the amounts add up to `grand_total` exactly.
pub fn payment_schedule(grand_total: f64, generated_at: DateTime<Utc>) -> Vec<PaymentPhase> {
    let mut allocated = 0.0;
    let last = PAYMENT_PHASES.len() - 1;

    PAYMENT_PHASES
        .iter()
        .enumerate()
        .map(|(i, template)| {
            let amount = if i == last {
                round2(grand_total - allocated)
            } else {
                round2(grand_total * f64::from(template.percentage) / 100.0)
            };
            allocated += amount;
            PaymentPhase {
                phase: template.phase.to_string(),
                percentage: template.percentage,
                amount,
                due_date: (generated_at + Duration::days(template.due_after_days)).date_naive(),
                description: template.description.to_string(),
            }
        })
        .collect()
}

/// Group items by supplier, in order of first appearance.
pub fn supplier_summary(items: &[QuotationItem]) -> Vec<SupplierSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summary: Vec<SupplierSummary> = Vec::new();

    for item in items {
        let slot = *index.entry(item.supplier.supplier_id.as_str()).or_insert_with(|| {
            summary.push(SupplierSummary {
                supplier_id: item.supplier.supplier_id.clone(),
                supplier_name: item.supplier.supplier_name.clone(),
                location: item.supplier.supplier_location.clone(),
                total_amount: 0.0,
                item_count: 0,
            });
            summary.len() - 1
        });
        let entry = &mut summary[slot];
        entry.total_amount = round2(entry.total_amount + item.total);
        entry.item_count += 1;
    }

    summary
}

/// Compare a grand total with an optional client budget.
pub fn budget_check(budget: Option<f64>, grand_total: f64) -> Option<BudgetCheck> {
    budget.map(|budget| {
        let variance = round2(budget - grand_total);
        BudgetCheck {
            budget,
            grand_total,
            variance,
            within_budget: variance >= 0.0,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{MaterialCategory, MaterialLine, Unit};
    use crate::pricing::{PriceQuote, PriceStatus, Season};
    use crate::quotation::SupplierRef;
    use chrono::{NaiveDate, TimeZone};

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn item(code: &str, supplier: &str, total: f64) -> QuotationItem {
        QuotationItem {
            material: MaterialLine::new(code, code, MaterialCategory::Blocks, Unit::Piece, 1.0),
            unit_rate: total,
            total,
            supplier: SupplierRef {
                supplier_id: supplier.to_string(),
                supplier_name: format!("{} Ltd", supplier),
                supplier_location: "nairobi".to_string(),
            },
            supplier_defaulted: false,
            price_confidence: 0.85,
            price: PriceQuote {
                unit_price: total,
                base_price: total,
                location_factor: 1.0,
                seasonal_factor: 1.0,
                season: Season::Dry,
                supplier_factor: 1.0,
                market_variation: 1.0,
                confidence: 0.85,
                status: PriceStatus::Quoted,
                location_defaulted: false,
            },
        }
    }

    #[test]
    fn test_schedule_shape() {
        let schedule = payment_schedule(1_000_000.0, at_noon());
        assert_eq!(schedule.len(), 5);
        let total_pct: u32 = schedule.iter().map(|p| p.percentage).sum();
        assert_eq!(total_pct, 100);
        let names: Vec<_> = schedule.iter().map(|p| p.phase.as_str()).collect();
        assert_eq!(names, ["Mobilization", "Foundation", "Structural Work", "Finishing", "Final Payment"]);
        assert_eq!(schedule[2].amount, 350_000.0);
    }

    #[test]
    fn test_schedule_due_dates() {
        let schedule = payment_schedule(100.0, at_noon());
        assert_eq!(schedule[0].due_date, NaiveDate::from_ymd_opt(2026, 1, 22).unwrap());
        assert_eq!(schedule[1].due_date, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
        assert_eq!(schedule[4].due_date, NaiveDate::from_ymd_opt(2026, 4, 25).unwrap());
    }

    #[test]
    fn test_schedule_amounts_sum_to_total() {
        for grand_total in [0.0, 0.03, 1_234_567.89, 5_843_210.07] {
            let schedule = payment_schedule(grand_total, at_noon());
            let sum: f64 = schedule.iter().map(|p| p.amount).sum();
            assert!((sum - grand_total).abs() < 1e-6, "sum {} vs {}", sum, grand_total);
            for phase in &schedule {
                let nominal = grand_total * f64::from(phase.percentage) / 100.0;
                assert!((phase.amount - nominal).abs() <= 0.05);
            }
        }
    }

    #[test]
    fn test_supplier_summary_groups_in_order() {
        let items = vec![
            item("C001", "SUP002", 100.0),
            item("S001", "SUP001", 50.5),
            item("B001", "SUP002", 20.25),
        ];
        let summary = supplier_summary(&items);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].supplier_id, "SUP002");
        assert_eq!(summary[0].item_count, 2);
        assert_eq!(summary[0].total_amount, 120.25);
        assert_eq!(summary[1].supplier_name, "SUP001 Ltd");
        assert_eq!(summary[1].total_amount, 50.5);
    }

    #[test]
    fn test_budget_check() {
        assert!(budget_check(None, 10.0).is_none());

        let over = budget_check(Some(1_000.0), 1_200.5).unwrap();
        assert_eq!(over.variance, -200.5);
        assert!(!over.within_budget);

        let under = budget_check(Some(1_000.0), 1_000.0).unwrap();
        assert!(under.within_budget);
    }
}
