//! # Reference Data
//!
//! The read-only tables every quotation is computed against: base prices and
//! pricing factors, the transport fleet and distance table, and the supplier
//! directory. A [`ReferenceData`] value is loaded once by the host (see
//! [`crate::file_io::load_reference_data`]) or taken from the built-in Kenyan
//! market snapshot, validated, and injected into the engine.
//!
//! Nothing in this module mutates after construction. Hosts that reload feeds
//! build a new value and swap it in themselves.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::materials::MaterialCategory;
//! use quote_core::reference::ReferenceData;
//!
//! let reference = ReferenceData::builtin();
//! assert!(reference.validate().is_ok());
//! assert_eq!(reference.pricing.base_price(MaterialCategory::Concrete, "C001"), Some(8500.0));
//! assert!(reference.pricing.location_factor("Timbuktu").is_defaulted());
//! ```

use std::collections::{BTreeMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};
use crate::lookup::Lookup;
use crate::materials::MaterialCategory;
use crate::pricing::Season;
use crate::transport::VehicleClass;

static BUILTIN: Lazy<ReferenceData> = Lazy::new(ReferenceData::kenya_market);

/// Complete reference snapshot for one quotation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub pricing: PricingTables,
    pub transport: TransportTables,
    pub suppliers: SupplierDirectory,
}

impl ReferenceData {
    /// Shared built-in snapshot of the Kenyan market tables.
    pub fn builtin() -> &'static ReferenceData {
        &BUILTIN
    }

    /// Check every table for values the pipeline cannot compute with.
    ///
    /// Returns the first problem found as a [`QuoteError::Configuration`]
    /// naming the offending table.
    pub fn validate(&self) -> QuoteResult<()> {
        self.pricing.validate()?;
        self.transport.validate()?;
        self.suppliers.validate()?;
        Ok(())
    }

    /// Kenyan market tables, prices in KES.
    pub fn kenya_market() -> Self {
        let mut base_prices: BTreeMap<MaterialCategory, BTreeMap<String, f64>> = BTreeMap::new();
        let price_rows: [(MaterialCategory, &str, f64); 12] = [
            (MaterialCategory::Concrete, "C001", 8500.0),
            (MaterialCategory::Concrete, "C002", 9200.0),
            (MaterialCategory::Concrete, "C003", 10000.0),
            (MaterialCategory::Steel, "S001", 83.0),
            (MaterialCategory::Steel, "S002", 85.0),
            (MaterialCategory::Steel, "S003", 90.0),
            (MaterialCategory::Blocks, "B001", 45.0),
            (MaterialCategory::Roofing, "R001", 850.0),
            (MaterialCategory::Finishing, "F001", 450.0),
            (MaterialCategory::Finishing, "F002", 1200.0),
            (MaterialCategory::Electrical, "E001", 25000.0),
            (MaterialCategory::Plumbing, "P001", 35000.0),
        ];
        for (category, code, price) in price_rows {
            base_prices.entry(category).or_default().insert(code.to_string(), price);
        }

        ReferenceData {
            pricing: PricingTables {
                base_prices,
                location_factors: string_table(&[
                    ("nairobi", 1.0),
                    ("mombasa", 1.05),
                    ("nakuru", 0.95),
                    ("kisumu", 0.90),
                    ("eldoret", 0.88),
                ]),
                default_location_factor: 0.92,
                seasonal_factors: SeasonalFactors::default(),
                supplier_factors: string_table(&[
                    ("SUP001", 0.98),
                    ("SUP002", 1.02),
                    ("SUP003", 1.05),
                ]),
                default_supplier_factor: 1.0,
            },
            transport: TransportTables {
                fuel_price_per_liter: 150.0,
                driver_rate_per_km: 20.0,
                loading_cost: 2000.0,
                fleet: Fleet::default(),
                routes: vec![
                    Route::new("nairobi", "mombasa", 480.0),
                    Route::new("nairobi", "nakuru", 160.0),
                    Route::new("nairobi", "kisumu", 350.0),
                    Route::new("nairobi", "eldoret", 320.0),
                    Route::new("mombasa", "nakuru", 640.0),
                    Route::new("mombasa", "kisumu", 830.0),
                    Route::new("nakuru", "kisumu", 190.0),
                    Route::new("nakuru", "eldoret", 160.0),
                ],
                default_distance_km: 100.0,
                weight_factors: [
                    (MaterialCategory::Concrete, 2400.0),
                    (MaterialCategory::Steel, 1.0),
                    (MaterialCategory::Blocks, 15.0),
                    (MaterialCategory::Roofing, 5.0),
                    (MaterialCategory::Finishing, 1.5),
                    (MaterialCategory::Electrical, 50.0),
                    (MaterialCategory::Plumbing, 100.0),
                ]
                .into_iter()
                .collect(),
                default_weight_factor: 10.0,
            },
            suppliers: SupplierDirectory {
                suppliers: vec![
                    Supplier::new("SUP001", "Nairobi Building Supplies", "nairobi", 4.5),
                    Supplier::new("SUP002", "Coast Cement Ltd", "mombasa", 4.2),
                    Supplier::new("SUP003", "Rift Valley Hardware", "nakuru", 4.0),
                    Supplier::new("SUP004", "Western Kenya Suppliers", "kisumu", 3.8),
                ],
                location_suppliers: [
                    ("nairobi", "SUP001"),
                    ("mombasa", "SUP002"),
                    ("nakuru", "SUP003"),
                    ("kisumu", "SUP004"),
                ]
                .into_iter()
                .map(|(loc, id)| (loc.to_string(), id.to_string()))
                .collect(),
                default_supplier_id: "SUP001".to_string(),
            },
        }
    }
}

fn string_table(rows: &[(&str, f64)]) -> BTreeMap<String, f64> {
    rows.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn check_factor(feed: &str, key: &str, value: f64) -> QuoteResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(QuoteError::configuration(
            feed,
            format!("value for '{}' must be a non-negative number, got {}", key, value),
        ));
    }
    Ok(())
}

fn check_positive(feed: &str, key: &str, value: f64) -> QuoteResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(QuoteError::configuration(
            feed,
            format!("value for '{}' must be positive, got {}", key, value),
        ));
    }
    Ok(())
}

// ============================================================================
// Pricing
// ============================================================================

/// Base prices and the multipliers applied on top of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTables {
    /// Base unit price keyed by category then item code
    pub base_prices: BTreeMap<MaterialCategory, BTreeMap<String, f64>>,
    /// Location multiplier keyed by lowercase place name
    pub location_factors: BTreeMap<String, f64>,
    /// Multiplier for places missing from `location_factors`
    pub default_location_factor: f64,
    /// Multiplier per season
    pub seasonal_factors: SeasonalFactors,
    /// Discount or premium keyed by supplier id
    pub supplier_factors: BTreeMap<String, f64>,
    /// Multiplier for suppliers missing from `supplier_factors`
    pub default_supplier_factor: f64,
}

impl PricingTables {
    /// Base price for an item, if the survey has one
    pub fn base_price(&self, category: MaterialCategory, item_code: &str) -> Option<f64> {
        self.base_prices.get(&category)?.get(item_code).copied()
    }

    /// Location multiplier, matched case-insensitively
    pub fn location_factor(&self, location: &str) -> Lookup<f64> {
        let key = location.trim().to_lowercase();
        Lookup::or_default_with(self.location_factors.get(&key).copied(), || {
            self.default_location_factor
        })
    }

    /// Supplier multiplier; no supplier or an unknown one gets the default
    pub fn supplier_factor(&self, supplier_id: Option<&str>) -> Lookup<f64> {
        let found = supplier_id.and_then(|id| self.supplier_factors.get(id).copied());
        Lookup::or_default_with(found, || self.default_supplier_factor)
    }

    fn validate(&self) -> QuoteResult<()> {
        for (category, items) in &self.base_prices {
            for (code, price) in items {
                check_factor("pricing.base_prices", &format!("{}/{}", category.code(), code), *price)?;
            }
        }
        for (location, factor) in &self.location_factors {
            check_positive("pricing.location_factors", location, *factor)?;
        }
        check_positive("pricing.default_location_factor", "default", self.default_location_factor)?;
        for season in Season::ALL {
            check_positive("pricing.seasonal_factors", season.code(), self.seasonal_factors.factor(season))?;
        }
        for (supplier, factor) in &self.supplier_factors {
            check_positive("pricing.supplier_factors", supplier, *factor)?;
        }
        check_positive("pricing.default_supplier_factor", "default", self.default_supplier_factor)?;
        Ok(())
    }
}

/// Price multipliers per construction season
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    pub dry_season: f64,
    pub peak_construction: f64,
    pub rainy_season: f64,
}

impl SeasonalFactors {
    /// Multiplier for a season
    pub fn factor(&self, season: Season) -> f64 {
        match season {
            Season::Dry => self.dry_season,
            Season::PeakConstruction => self.peak_construction,
            Season::Rainy => self.rainy_season,
        }
    }
}

impl Default for SeasonalFactors {
    fn default() -> Self {
        SeasonalFactors {
            dry_season: 1.0,
            peak_construction: 1.1,
            rainy_season: 1.15,
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Capacity and fuel economy of one vehicle class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    /// Maximum payload in kg
    pub capacity_kg: f64,
    /// Fuel economy in km per litre
    pub km_per_liter: f64,
}

/// The three truck classes available for deliveries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub small_truck: VehicleSpec,
    pub medium_truck: VehicleSpec,
    pub large_truck: VehicleSpec,
}

impl Fleet {
    /// Spec for a vehicle class
    pub fn spec(&self, class: VehicleClass) -> &VehicleSpec {
        match class {
            VehicleClass::SmallTruck => &self.small_truck,
            VehicleClass::MediumTruck => &self.medium_truck,
            VehicleClass::LargeTruck => &self.large_truck,
        }
    }
}

impl Default for Fleet {
    fn default() -> Self {
        Fleet {
            small_truck: VehicleSpec { capacity_kg: 5000.0, km_per_liter: 8.0 },
            medium_truck: VehicleSpec { capacity_kg: 10000.0, km_per_liter: 6.0 },
            large_truck: VehicleSpec { capacity_kg: 20000.0, km_per_liter: 4.0 },
        }
    }
}

/// Road distance between two named places; direction does not matter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from: String,
    pub to: String,
    pub distance_km: f64,
}

impl Route {
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance_km: f64) -> Self {
        Route {
            from: from.into(),
            to: to.into(),
            distance_km,
        }
    }
}

/// Fuel, labour and fleet constants plus the distance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportTables {
    /// Diesel price in KES per litre
    pub fuel_price_per_liter: f64,
    /// Driver cost in KES per km of one-way distance
    pub driver_rate_per_km: f64,
    /// Flat loading/unloading charge per delivery
    pub loading_cost: f64,
    pub fleet: Fleet,
    pub routes: Vec<Route>,
    /// Distance assumed for unlisted routes
    pub default_distance_km: f64,
    /// Shipping weight in kg per unit of material, by category
    pub weight_factors: BTreeMap<MaterialCategory, f64>,
    /// Weight per unit for categories missing from `weight_factors`
    pub default_weight_factor: f64,
}

impl TransportTables {
    /// Shipping weight per unit for a category
    pub fn weight_factor(&self, category: MaterialCategory) -> Lookup<f64> {
        Lookup::or_default_with(self.weight_factors.get(&category).copied(), || {
            self.default_weight_factor
        })
    }

    fn validate(&self) -> QuoteResult<()> {
        check_positive("transport.fuel_price_per_liter", "fuel", self.fuel_price_per_liter)?;
        check_factor("transport.driver_rate_per_km", "driver", self.driver_rate_per_km)?;
        check_factor("transport.loading_cost", "loading", self.loading_cost)?;
        check_positive("transport.default_distance_km", "default", self.default_distance_km)?;
        check_factor("transport.default_weight_factor", "default", self.default_weight_factor)?;

        let mut last_capacity = 0.0;
        for class in VehicleClass::ALL {
            let spec = self.fleet.spec(class);
            check_positive("transport.fleet", class.code(), spec.km_per_liter)?;
            if !spec.capacity_kg.is_finite() || spec.capacity_kg <= last_capacity {
                return Err(QuoteError::configuration(
                    "transport.fleet",
                    format!(
                        "capacity of {} must exceed the smaller class, got {}",
                        class.code(),
                        spec.capacity_kg
                    ),
                ));
            }
            last_capacity = spec.capacity_kg;
        }

        for route in &self.routes {
            if route.from.trim().is_empty() || route.to.trim().is_empty() {
                return Err(QuoteError::configuration("transport.routes", "route endpoints must be named"));
            }
            check_positive(
                "transport.routes",
                &format!("{}-{}", route.from, route.to),
                route.distance_km,
            )?;
        }

        for (category, factor) in &self.weight_factors {
            check_factor("transport.weight_factors", category.code(), *factor)?;
        }
        Ok(())
    }
}

// ============================================================================
// Suppliers
// ============================================================================

/// A material supplier from the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    /// Depot location, used as the transport origin
    pub location: String,
    /// Customer rating out of 5
    pub rating: f64,
}

impl Supplier {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>, rating: f64) -> Self {
        Supplier {
            id: id.into(),
            name: name.into(),
            location: location.into(),
            rating,
        }
    }
}

/// Supplier directory plus the preferred supplier per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDirectory {
    pub suppliers: Vec<Supplier>,
    /// Preferred supplier id keyed by lowercase project location
    pub location_suppliers: BTreeMap<String, String>,
    /// Supplier used when the project location has no preferred supplier
    pub default_supplier_id: String,
}

impl SupplierDirectory {
    /// Find a supplier by id
    pub fn get(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    /// Preferred supplier for a project location.
    ///
    /// Returns `None` only when the directory itself is inconsistent, which
    /// [`ReferenceData::validate`] rules out.
    pub fn for_location(&self, location: &str) -> Option<Lookup<&Supplier>> {
        let key = location.trim().to_lowercase();
        match self.location_suppliers.get(&key) {
            Some(id) => self.get(id).map(Lookup::Found),
            None => self.get(&self.default_supplier_id).map(Lookup::Defaulted),
        }
    }

    fn validate(&self) -> QuoteResult<()> {
        if self.suppliers.is_empty() {
            return Err(QuoteError::configuration("suppliers", "supplier directory is empty"));
        }
        let mut seen = HashSet::new();
        for supplier in &self.suppliers {
            if !seen.insert(supplier.id.as_str()) {
                return Err(QuoteError::configuration(
                    "suppliers",
                    format!("duplicate supplier id '{}'", supplier.id),
                ));
            }
        }
        for (location, id) in &self.location_suppliers {
            if self.get(id).is_none() {
                return Err(QuoteError::configuration(
                    "suppliers.location_suppliers",
                    format!("location '{}' points at unknown supplier '{}'", location, id),
                ));
            }
        }
        if self.get(&self.default_supplier_id).is_none() {
            return Err(QuoteError::configuration(
                "suppliers.default_supplier_id",
                format!("unknown supplier '{}'", self.default_supplier_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        assert!(ReferenceData::builtin().validate().is_ok());
    }

    #[test]
    fn test_location_factor_case_insensitive() {
        let pricing = &ReferenceData::builtin().pricing;
        assert_eq!(pricing.location_factor("MOMBASA"), Lookup::Found(1.05));
        assert_eq!(pricing.location_factor("timbuktu"), Lookup::Defaulted(0.92));
    }

    #[test]
    fn test_supplier_factor_defaults() {
        let pricing = &ReferenceData::builtin().pricing;
        assert_eq!(pricing.supplier_factor(Some("SUP002")), Lookup::Found(1.02));
        assert_eq!(pricing.supplier_factor(Some("SUP004")), Lookup::Defaulted(1.0));
        assert_eq!(pricing.supplier_factor(None), Lookup::Defaulted(1.0));
    }

    #[test]
    fn test_missing_base_price() {
        let pricing = &ReferenceData::builtin().pricing;
        assert_eq!(pricing.base_price(MaterialCategory::Steel, "S001"), Some(83.0));
        assert_eq!(pricing.base_price(MaterialCategory::Timber, "T001"), None);
        assert_eq!(pricing.base_price(MaterialCategory::Steel, "C001"), None);
    }

    #[test]
    fn test_supplier_for_location() {
        let suppliers = &ReferenceData::builtin().suppliers;
        let mombasa = suppliers.for_location("Mombasa").unwrap();
        assert!(!mombasa.is_defaulted());
        assert_eq!(mombasa.into_inner().id, "SUP002");

        let eldoret = suppliers.for_location("eldoret").unwrap();
        assert!(eldoret.is_defaulted());
        assert_eq!(eldoret.into_inner().id, "SUP001");
    }

    #[test]
    fn test_weight_factor_default_for_timber() {
        let transport = &ReferenceData::builtin().transport;
        assert_eq!(transport.weight_factor(MaterialCategory::Concrete), Lookup::Found(2400.0));
        assert_eq!(transport.weight_factor(MaterialCategory::Timber), Lookup::Defaulted(10.0));
    }

    #[test]
    fn test_rejects_negative_price() {
        let mut reference = ReferenceData::kenya_market();
        reference
            .pricing
            .base_prices
            .entry(MaterialCategory::Blocks)
            .or_default()
            .insert("B001".to_string(), -45.0);
        let err = reference.validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("blocks/B001"));
    }

    #[test]
    fn test_rejects_unknown_default_supplier() {
        let mut reference = ReferenceData::kenya_market();
        reference.suppliers.default_supplier_id = "SUP999".to_string();
        assert!(matches!(
            reference.validate(),
            Err(QuoteError::Configuration { ref feed, .. }) if feed == "suppliers.default_supplier_id"
        ));
    }

    #[test]
    fn test_rejects_duplicate_supplier() {
        let mut reference = ReferenceData::kenya_market();
        let dup = reference.suppliers.suppliers[0].clone();
        reference.suppliers.suppliers.push(dup);
        assert!(reference.validate().is_err());
    }

    #[test]
    fn test_rejects_unordered_fleet() {
        let mut reference = ReferenceData::kenya_market();
        reference.transport.fleet.medium_truck.capacity_kg = 4000.0;
        assert!(reference.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_distance_route() {
        let mut reference = ReferenceData::kenya_market();
        reference.transport.routes.push(Route::new("nairobi", "thika", 0.0));
        assert!(reference.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip() {
        let reference = ReferenceData::kenya_market();
        let json = serde_json::to_string_pretty(&reference).unwrap();
        assert!(json.contains("\"concrete\""));
        assert!(json.contains("\"C001\": 8500.0"));
        let roundtrip: ReferenceData = serde_json::from_str(&json).unwrap();
        assert_eq!(reference, roundtrip);
    }
}
