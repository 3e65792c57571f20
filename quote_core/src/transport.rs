//! # Transport Costing
//!
//! Picks a truck for a payload and prices the round trip between a supplier
//! depot and the site:
//!
//! ```text
//! fuel    = (distance × 2 / km_per_liter[vehicle]) × fuel_price
//! driver  = distance × driver_rate
//! loading = flat charge
//! total   = fuel + driver + loading
//! ```
//!
//! Distances come from a symmetric city-pair table. Unlisted pairs use the
//! table default (100 km in the built-in data); treat those figures as rough.
//! There is no route optimisation: deliveries from several suppliers are
//! costed independently and summed.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::reference::ReferenceData;
//! use quote_core::transport::{TransportOptimizer, VehicleClass};
//! use quote_core::units::Kilograms;
//!
//! let optimizer = TransportOptimizer::new(ReferenceData::builtin().transport.clone());
//! let cost = optimizer.cost(Kilograms(3_000.0), "nairobi", "nakuru");
//!
//! assert_eq!(cost.vehicle_type, VehicleClass::SmallTruck);
//! assert_eq!(cost.distance_km, 160.0);
//! // fuel 6000 + driver 3200 + loading 2000
//! assert_eq!(cost.total_transport_cost, 11_200.0);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::lookup::Lookup;
use crate::reference::TransportTables;
use crate::units::{round2, Kilograms, Kilometers};

/// Truck class, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    SmallTruck,
    MediumTruck,
    LargeTruck,
}

impl VehicleClass {
    /// All classes in ascending capacity order
    pub const ALL: [VehicleClass; 3] = [
        VehicleClass::SmallTruck,
        VehicleClass::MediumTruck,
        VehicleClass::LargeTruck,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            VehicleClass::SmallTruck => "small_truck",
            VehicleClass::MediumTruck => "medium_truck",
            VehicleClass::LargeTruck => "large_truck",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Cost breakdown for one delivery.
///
/// ## JSON Example
///
/// ```json
/// {
///   "vehicle_type": "large_truck",
///   "weight_kg": 43200.0,
///   "distance_km": 100.0,
///   "distance_defaulted": true,
///   "fuel_cost": 7500.0,
///   "driver_cost": 2000.0,
///   "loading_cost": 2000.0,
///   "total_transport_cost": 11500.0,
///   "cost_per_kg": 0.27
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportCost {
    pub vehicle_type: VehicleClass,
    pub weight_kg: f64,
    /// One-way distance
    pub distance_km: f64,
    /// True when the route was not in the distance table
    pub distance_defaulted: bool,
    pub fuel_cost: f64,
    pub driver_cost: f64,
    pub loading_cost: f64,
    pub total_transport_cost: f64,
    /// Total divided by weight; 0 for an empty load
    pub cost_per_kg: f64,
}

/// Materials one supplier sends to one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierShipment {
    pub supplier_id: String,
    /// Supplier depot
    pub location: String,
    pub project_location: String,
    pub total_weight_kg: f64,
    /// Item codes carried
    pub materials: Vec<String>,
}

/// One supplier's leg of a multi-supplier delivery plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierLeg {
    pub supplier_id: String,
    pub materials: Vec<String>,
    #[serde(flatten)]
    pub cost: TransportCost,
}

/// Delivery plan across several suppliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSupplierTransport {
    pub total_transport_cost: f64,
    pub transport_breakdown: Vec<SupplierLeg>,
    /// Savings from joint routing. Route optimisation is not implemented, so
    /// this is always 0.
    pub optimization_savings: f64,
}

/// Prices deliveries from injected transport tables.
#[derive(Debug, Clone)]
pub struct TransportOptimizer {
    tables: TransportTables,
    distances: HashMap<(String, String), f64>,
}

impl TransportOptimizer {
    pub fn new(tables: TransportTables) -> Self {
        let distances = tables
            .routes
            .iter()
            .map(|r| (route_key(&r.from, &r.to), r.distance_km))
            .collect();
        TransportOptimizer { tables, distances }
    }

    /// The transport tables in use
    pub fn tables(&self) -> &TransportTables {
        &self.tables
    }

    /// One-way distance between two places, in either direction.
    pub fn distance(&self, origin: &str, destination: &str) -> Lookup<Kilometers> {
        let found = self.distances.get(&route_key(origin, destination)).copied();
        Lookup::or_default_with(found, || self.tables.default_distance_km).map(Kilometers)
    }

    /// Smallest truck whose capacity covers the payload.
    ///
    /// Payloads above the largest capacity still get the largest truck; the
    /// overload is not split across trips.
    pub fn select_vehicle(&self, weight: Kilograms) -> VehicleClass {
        VehicleClass::ALL
            .into_iter()
            .find(|class| weight.0 <= self.tables.fleet.spec(*class).capacity_kg)
            .unwrap_or(VehicleClass::LargeTruck)
    }

    /// Price a round-trip delivery of `weight` from `origin` to `destination`.
    pub fn cost(&self, weight: Kilograms, origin: &str, destination: &str) -> TransportCost {
        let distance = self.distance(origin, destination);
        if distance.is_defaulted() {
            tracing::debug!(origin, destination, "route not in distance table, using default distance");
        }
        let km = distance.value();
        let vehicle_type = self.select_vehicle(weight);
        let km_per_liter = self.tables.fleet.spec(vehicle_type).km_per_liter;

        let fuel_liters = km.round_trip().0 / km_per_liter;
        let fuel_cost = fuel_liters * self.tables.fuel_price_per_liter;
        let driver_cost = km.0 * self.tables.driver_rate_per_km;
        let loading_cost = self.tables.loading_cost;
        let total = fuel_cost + driver_cost + loading_cost;

        let cost_per_kg = if weight.0 > 0.0 { round2(total / weight.0) } else { 0.0 };

        TransportCost {
            vehicle_type,
            weight_kg: weight.0,
            distance_km: km.0,
            distance_defaulted: distance.is_defaulted(),
            fuel_cost: round2(fuel_cost),
            driver_cost: round2(driver_cost),
            loading_cost,
            total_transport_cost: round2(total),
            cost_per_kg,
        }
    }

    /// Cost each supplier's shipment independently and sum the results.
    pub fn plan_multi_supplier(&self, shipments: &[SupplierShipment]) -> MultiSupplierTransport {
        let transport_breakdown: Vec<SupplierLeg> = shipments
            .iter()
            .map(|s| SupplierLeg {
                supplier_id: s.supplier_id.clone(),
                materials: s.materials.clone(),
                cost: self.cost(Kilograms(s.total_weight_kg), &s.location, &s.project_location),
            })
            .collect();

        let total: f64 = transport_breakdown.iter().map(|l| l.cost.total_transport_cost).sum();

        MultiSupplierTransport {
            total_transport_cost: round2(total),
            transport_breakdown,
            optimization_savings: 0.0,
        }
    }
}

/// Order-independent, case-insensitive key for a city pair
fn route_key(a: &str, b: &str) -> (String, String) {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;

    fn optimizer() -> TransportOptimizer {
        TransportOptimizer::new(ReferenceData::builtin().transport.clone())
    }

    #[test]
    fn test_vehicle_selection_boundaries() {
        let opt = optimizer();
        assert_eq!(opt.select_vehicle(Kilograms(0.0)), VehicleClass::SmallTruck);
        assert_eq!(opt.select_vehicle(Kilograms(5000.0)), VehicleClass::SmallTruck);
        assert_eq!(opt.select_vehicle(Kilograms(5000.01)), VehicleClass::MediumTruck);
        assert_eq!(opt.select_vehicle(Kilograms(10000.0)), VehicleClass::MediumTruck);
        assert_eq!(opt.select_vehicle(Kilograms(10000.5)), VehicleClass::LargeTruck);
        assert_eq!(opt.select_vehicle(Kilograms(20000.0)), VehicleClass::LargeTruck);
        assert_eq!(opt.select_vehicle(Kilograms(43200.0)), VehicleClass::LargeTruck);
    }

    #[test]
    fn test_vehicle_selection_is_monotonic() {
        let opt = optimizer();
        let mut previous = VehicleClass::SmallTruck;
        for step in 0..500 {
            let class = opt.select_vehicle(Kilograms(step as f64 * 50.0));
            assert!(class >= previous);
            previous = class;
        }
    }

    #[test]
    fn test_distance_symmetric() {
        let opt = optimizer();
        for route in &ReferenceData::builtin().transport.routes {
            let forward = opt.distance(&route.from, &route.to);
            let back = opt.distance(&route.to, &route.from);
            assert_eq!(forward, back);
            assert_eq!(forward, Lookup::Found(Kilometers(route.distance_km)));
        }
    }

    #[test]
    fn test_distance_case_insensitive() {
        assert_eq!(optimizer().distance("Nairobi", " MOMBASA"), Lookup::Found(Kilometers(480.0)));
    }

    #[test]
    fn test_unknown_route_defaults() {
        let opt = optimizer();
        for city in ["nairobi", "mombasa", "nakuru", "kisumu", "eldoret"] {
            assert_eq!(opt.distance("timbuktu", city), Lookup::Defaulted(Kilometers(100.0)));
        }
        // Same-city deliveries are not in the table either
        assert!(opt.distance("nairobi", "nairobi").is_defaulted());
    }

    #[test]
    fn test_cost_formula() {
        // 8000 kg -> medium truck (6 km/l), nairobi-kisumu 350 km
        let cost = optimizer().cost(Kilograms(8000.0), "kisumu", "nairobi");
        assert_eq!(cost.vehicle_type, VehicleClass::MediumTruck);
        assert_eq!(cost.distance_km, 350.0);
        assert!(!cost.distance_defaulted);
        assert_eq!(cost.fuel_cost, 17_500.0);
        assert_eq!(cost.driver_cost, 7_000.0);
        assert_eq!(cost.loading_cost, 2_000.0);
        assert_eq!(cost.total_transport_cost, 26_500.0);
        assert_eq!(cost.cost_per_kg, round2(26_500.0 / 8000.0));
    }

    #[test]
    fn test_zero_weight_has_zero_cost_per_kg() {
        let cost = optimizer().cost(Kilograms(0.0), "nairobi", "nakuru");
        assert_eq!(cost.cost_per_kg, 0.0);
        assert!(cost.total_transport_cost > 0.0);
    }

    #[test]
    fn test_multi_supplier_sums_legs() {
        let opt = optimizer();
        let shipments = vec![
            SupplierShipment {
                supplier_id: "SUP001".to_string(),
                location: "nairobi".to_string(),
                project_location: "nakuru".to_string(),
                total_weight_kg: 3000.0,
                materials: vec!["B001".to_string()],
            },
            SupplierShipment {
                supplier_id: "SUP002".to_string(),
                location: "mombasa".to_string(),
                project_location: "nakuru".to_string(),
                total_weight_kg: 12000.0,
                materials: vec!["C001".to_string(), "C002".to_string()],
            },
        ];
        let plan = opt.plan_multi_supplier(&shipments);

        let expected = opt.cost(Kilograms(3000.0), "nairobi", "nakuru").total_transport_cost
            + opt.cost(Kilograms(12000.0), "mombasa", "nakuru").total_transport_cost;
        assert_eq!(plan.total_transport_cost, round2(expected));
        assert_eq!(plan.transport_breakdown.len(), 2);
        assert_eq!(plan.transport_breakdown[1].materials, ["C001", "C002"]);
        assert_eq!(plan.optimization_savings, 0.0);
    }

    #[test]
    fn test_leg_serializes_flat() {
        let plan = optimizer().plan_multi_supplier(&[SupplierShipment {
            supplier_id: "SUP001".to_string(),
            location: "nairobi".to_string(),
            project_location: "eldoret".to_string(),
            total_weight_kg: 100.0,
            materials: vec![],
        }]);
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["transport_breakdown"][0]["supplier_id"], "SUP001");
        assert_eq!(json["transport_breakdown"][0]["vehicle_type"], "small_truck");
        assert_eq!(json["optimization_savings"], 0.0);
    }
}
