//! # Price Prediction
//!
//! Unit prices are a base price scaled by four multipliers:
//!
//! ```text
//! unit_price = base × location × seasonal × supplier × market_variation
//! ```
//!
//! The first three come from [`PricingTables`]; the season is derived from the
//! calendar month. Market variation is a random draw from ±5% supplied by a
//! [`MarketVariation`] source, so tests and reproducible runs can pin it.
//!
//! An item with no base price is not an error. It yields a zero-price quote
//! with zero confidence and [`PriceStatus::MissingBasePrice`], and the caller
//! decides what to do with it.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::materials::MaterialCategory;
//! use quote_core::pricing::{NoVariation, PricePredictor, PriceStatus};
//! use quote_core::reference::ReferenceData;
//!
//! let predictor = PricePredictor::new(ReferenceData::builtin().pricing.clone());
//!
//! // July is dry season (factor 1.0); Nairobi is the 1.0 baseline; SUP001 gets 2% off
//! let quote = predictor.predict_for_month(
//!     "C001",
//!     MaterialCategory::Concrete,
//!     "nairobi",
//!     Some("SUP001"),
//!     7,
//!     &mut NoVariation,
//! );
//! assert_eq!(quote.status, PriceStatus::Quoted);
//! assert_eq!(quote.unit_price, 8330.0);
//! ```

use chrono::{Datelike, Utc};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::materials::MaterialCategory;
use crate::reference::PricingTables;
use crate::units::round2;

/// Confidence attached to a quote computed from a surveyed base price
pub const PRICED_CONFIDENCE: f64 = 0.85;

/// Lower bound of the market variation draw
pub const MARKET_VARIATION_LOW: f64 = 0.95;

/// Upper bound of the market variation draw
pub const MARKET_VARIATION_HIGH: f64 = 1.05;

// ============================================================================
// Seasons
// ============================================================================

/// Construction season, derived from the calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// June through September
    #[serde(rename = "dry_season")]
    Dry,
    /// March to May and October to December
    #[serde(rename = "peak_construction")]
    PeakConstruction,
    /// January and February
    #[serde(rename = "rainy_season")]
    Rainy,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Dry, Season::PeakConstruction, Season::Rainy];

    /// Season for a calendar month (1 = January)
    pub fn from_month(month: u32) -> Self {
        match month {
            6..=9 => Season::Dry,
            3..=5 | 10..=12 => Season::PeakConstruction,
            _ => Season::Rainy,
        }
    }

    /// Key used in reference feeds
    pub fn code(&self) -> &'static str {
        match self {
            Season::Dry => "dry_season",
            Season::PeakConstruction => "peak_construction",
            Season::Rainy => "rainy_season",
        }
    }
}

// ============================================================================
// Market variation
// ============================================================================

/// Source of the per-call market variation multiplier.
pub trait MarketVariation {
    /// Draw the next multiplier
    fn draw(&mut self) -> f64;
}

/// Always returns 1.0. Use for deterministic pricing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariation;

impl MarketVariation for NoVariation {
    fn draw(&mut self) -> f64 {
        1.0
    }
}

/// Uniform draw from `[low, high]` backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct UniformVariation<R: Rng> {
    rng: R,
    low: f64,
    high: f64,
}

impl<R: Rng> UniformVariation<R> {
    /// Wrap a generator with the standard ±5% range
    pub fn new(rng: R) -> Self {
        UniformVariation {
            rng,
            low: MARKET_VARIATION_LOW,
            high: MARKET_VARIATION_HIGH,
        }
    }

    /// Override the draw range (builder pattern)
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.low = low.min(high);
        self.high = high.max(low);
        self
    }
}

impl UniformVariation<ThreadRng> {
    /// Non-reproducible source seeded from the OS
    pub fn thread_local() -> Self {
        UniformVariation::new(rand::rng())
    }
}

impl UniformVariation<StdRng> {
    /// Reproducible source: the same seed yields the same sequence
    pub fn seeded(seed: u64) -> Self {
        UniformVariation::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MarketVariation for UniformVariation<R> {
    fn draw(&mut self) -> f64 {
        self.rng.random_range(self.low..=self.high)
    }
}

// ============================================================================
// Quotes
// ============================================================================

/// Whether a quote is backed by a base price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    /// Priced from the reference survey
    Quoted,
    /// No base price exists; unit price is zero
    MissingBasePrice,
}

/// Predicted unit price and the factors behind it.
///
/// ## JSON Example
///
/// ```json
/// {
///   "unit_price": 9163.0,
///   "base_price": 8500.0,
///   "location_factor": 1.0,
///   "seasonal_factor": 1.1,
///   "season": "peak_construction",
///   "supplier_factor": 0.98,
///   "market_variation": 1.0,
///   "confidence": 0.85,
///   "status": "quoted",
///   "location_defaulted": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Final unit price, rounded to 2 decimals
    pub unit_price: f64,
    /// Reference price before adjustments
    pub base_price: f64,
    pub location_factor: f64,
    pub seasonal_factor: f64,
    pub season: Season,
    pub supplier_factor: f64,
    /// The random multiplier drawn for this quote (1.0 when not drawn)
    pub market_variation: f64,
    /// 0.0 for missing prices, otherwise [`PRICED_CONFIDENCE`]
    pub confidence: f64,
    pub status: PriceStatus,
    /// True when the location was not in the factor table
    pub location_defaulted: bool,
}

impl PriceQuote {
    /// True for a degraded zero-price quote
    pub fn is_missing(&self) -> bool {
        self.status == PriceStatus::MissingBasePrice
    }
}

/// Predicts unit prices from injected pricing tables.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    tables: PricingTables,
}

impl PricePredictor {
    pub fn new(tables: PricingTables) -> Self {
        PricePredictor { tables }
    }

    /// The pricing tables in use
    pub fn tables(&self) -> &PricingTables {
        &self.tables
    }

    /// Predict a price using the current UTC calendar month.
    pub fn predict(
        &self,
        item_code: &str,
        category: MaterialCategory,
        location: &str,
        supplier_id: Option<&str>,
        variation: &mut dyn MarketVariation,
    ) -> PriceQuote {
        let month = Utc::now().month();
        self.predict_for_month(item_code, category, location, supplier_id, month, variation)
    }

    /// Predict a price for an explicit calendar month (1 = January).
    ///
    /// A missing base price does not consume a draw from `variation`.
    pub fn predict_for_month(
        &self,
        item_code: &str,
        category: MaterialCategory,
        location: &str,
        supplier_id: Option<&str>,
        month: u32,
        variation: &mut dyn MarketVariation,
    ) -> PriceQuote {
        let location_factor = self.tables.location_factor(location);
        if location_factor.is_defaulted() {
            tracing::debug!(location, "location not in pricing table, using default factor");
        }
        let season = Season::from_month(month);
        let seasonal_factor = self.tables.seasonal_factors.factor(season);
        let supplier_factor = self.tables.supplier_factor(supplier_id).value();

        let base_price = match self.tables.base_price(category, item_code) {
            Some(price) if price > 0.0 => price,
            _ => {
                tracing::warn!(item_code, category = category.code(), "no base price found");
                return PriceQuote {
                    unit_price: 0.0,
                    base_price: 0.0,
                    location_factor: location_factor.value(),
                    seasonal_factor,
                    season,
                    supplier_factor,
                    market_variation: 1.0,
                    confidence: 0.0,
                    status: PriceStatus::MissingBasePrice,
                    location_defaulted: location_factor.is_defaulted(),
                };
            }
        };

        let market_variation = variation.draw();
        let unit_price =
            base_price * location_factor.value() * seasonal_factor * supplier_factor * market_variation;

        PriceQuote {
            unit_price: round2(unit_price),
            base_price,
            location_factor: location_factor.value(),
            seasonal_factor,
            season,
            supplier_factor,
            market_variation,
            confidence: PRICED_CONFIDENCE,
            status: PriceStatus::Quoted,
            location_defaulted: location_factor.is_defaulted(),
        }
    }
}
