//! # Unit Types
//!
//! Lightweight newtype wrappers for the physical quantities that cross
//! component boundaries, plus the single rounding policy used for every
//! quantity and money value in a quotation.
//!
//! ## Rounding
//!
//! All values are rounded to 2 decimals, half away from zero (the behaviour of
//! [`f64::round`]). Count-like units keep their decimals too: a 120 m² roof
//! needs 132.6 sheets, not 133.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::units::{round2, Kilograms, Tonnes};
//!
//! let payload = Kilograms(7_250.0);
//! let tonnes: Tonnes = payload.into();
//! assert_eq!(tonnes.0, 7.25);
//!
//! assert_eq!(round2(2.675_000_1), 2.68);
//! assert_eq!(round2(-1.005_000_1), -1.01);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Round to 2 decimals, half away from zero.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// ============================================================================
// Mass
// ============================================================================

/// Mass in kilograms
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilograms(pub f64);

/// Mass in metric tonnes (1 t = 1000 kg)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tonnes(pub f64);

impl From<Kilograms> for Tonnes {
    fn from(kg: Kilograms) -> Self {
        Tonnes(kg.0 / 1000.0)
    }
}

impl From<Tonnes> for Kilograms {
    fn from(t: Tonnes) -> Self {
        Kilograms(t.0 * 1000.0)
    }
}

impl Add for Kilograms {
    type Output = Kilograms;
    fn add(self, rhs: Kilograms) -> Kilograms {
        Kilograms(self.0 + rhs.0)
    }
}

impl Mul<f64> for Kilograms {
    type Output = Kilograms;
    fn mul(self, rhs: f64) -> Kilograms {
        Kilograms(self.0 * rhs)
    }
}

impl std::iter::Sum for Kilograms {
    fn sum<I: Iterator<Item = Kilograms>>(iter: I) -> Self {
        iter.fold(Kilograms(0.0), |acc, kg| acc + kg)
    }
}

// ============================================================================
// Distance
// ============================================================================

/// Road distance in kilometres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kilometers(pub f64);

impl Kilometers {
    /// Out-and-back distance for a delivery run
    pub fn round_trip(self) -> Kilometers {
        Kilometers(self.0 * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(17.999999999999996), 18.0);
        assert_eq!(round2(132.6), 132.6);
    }

    #[test]
    fn test_round_to_zero_places() {
        assert_eq!(round_to(1457.5, 0), 1458.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_mass_conversion() {
        let t: Tonnes = Kilograms(2_400.0).into();
        assert_eq!(t.0, 2.4);
        let kg: Kilograms = Tonnes(5.0).into();
        assert_eq!(kg.0, 5_000.0);
    }

    #[test]
    fn test_mass_sum() {
        let total: Kilograms = [Kilograms(100.0), Kilograms(250.5)].into_iter().sum();
        assert_eq!(total, Kilograms(350.5));
        assert_eq!(Kilograms(10.0) * 15.0, Kilograms(150.0));
    }

    #[test]
    fn test_round_trip_distance() {
        assert_eq!(Kilometers(160.0).round_trip(), Kilometers(320.0));
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&Kilometers(480.0)).unwrap();
        assert_eq!(json, "480.0");
    }
}
