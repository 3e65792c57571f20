//! Material Classifier
//!
//! Derives a bill of quantities from coarse project parameters using fixed
//! yield factors. The rules are deterministic: the same specification always
//! produces the same quantities.
//!
//! | Code | Rule                                  | Unit   |
//! |------|---------------------------------------|--------|
//! | C001 | area × 0.15                           | m3     |
//! | C002 | area × 0.12                           | m3     |
//! | S001 | (foundation + slab) × 45 kg/m³        | kg     |
//! | B001 | area × 2.5 wall ratio × 12.5 per m²   | pcs    |
//! | R001 | area × 1.3 pitch × 0.85 sheets per m² | pcs    |
//! | F001 | area × 0.3                            | liters |
//! | F002 | area × 0.8                            | m2     |
//! | E001 | 1                                     | lot    |
//! | P001 | bathrooms                             | lot    |

use serde::{Deserialize, Serialize};

use super::{BillOfQuantities, MaterialCategory, MaterialLine, Unit};
use crate::project::ProjectSpecification;
use crate::units::round2;

/// Per-category yield factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldFactors {
    /// Foundation concrete, m³ per m² of floor area
    pub foundation_m3_per_m2: f64,
    /// Floor slab concrete, m³ per m² of floor area
    pub slab_m3_per_m2: f64,
    /// Reinforcement steel, kg per m³ of concrete
    pub steel_kg_per_m3: f64,
    /// Wall area per m² of floor area
    pub wall_area_ratio: f64,
    /// Blocks per m² of wall
    pub blocks_per_m2_wall: f64,
    /// Roof area per m² of floor area (pitch and overhang)
    pub roof_area_ratio: f64,
    /// Iron sheets per m² of roof
    pub sheets_per_m2_roof: f64,
    /// Emulsion paint, litres per m² of floor area
    pub paint_l_per_m2: f64,
    /// Floor tiles, m² per m² of floor area
    pub tiles_m2_per_m2: f64,
}

impl Default for YieldFactors {
    fn default() -> Self {
        YieldFactors {
            foundation_m3_per_m2: 0.15,
            slab_m3_per_m2: 0.12,
            steel_kg_per_m3: 45.0,
            wall_area_ratio: 2.5,
            blocks_per_m2_wall: 12.5,
            roof_area_ratio: 1.3,
            sheets_per_m2_roof: 0.85,
            paint_l_per_m2: 0.3,
            tiles_m2_per_m2: 0.8,
        }
    }
}

/// Turns a [`ProjectSpecification`] into a [`BillOfQuantities`].
///
/// The classifier does not validate its input; the engine rejects bad
/// specifications before calling it.
#[derive(Debug, Clone, Default)]
pub struct MaterialClassifier {
    factors: YieldFactors,
}

impl MaterialClassifier {
    /// Create a classifier with custom yield factors
    pub fn new(factors: YieldFactors) -> Self {
        MaterialClassifier { factors }
    }

    /// The yield factors in use
    pub fn factors(&self) -> &YieldFactors {
        &self.factors
    }

    /// Classify and quantify the materials a project needs.
    pub fn classify(&self, spec: &ProjectSpecification) -> BillOfQuantities {
        let f = &self.factors;
        let area = spec.building_area;
        let mut bill = BillOfQuantities::new();

        // Concrete
        let foundation_m3 = area * f.foundation_m3_per_m2;
        let slab_m3 = area * f.slab_m3_per_m2;
        bill.push(MaterialLine::new(
            "C001",
            "Concrete Grade 25 - Foundation",
            MaterialCategory::Concrete,
            Unit::CubicMeter,
            round2(foundation_m3),
        ));
        bill.push(MaterialLine::new(
            "C002",
            "Concrete Grade 30 - Floor Slab",
            MaterialCategory::Concrete,
            Unit::CubicMeter,
            round2(slab_m3),
        ));

        // Steel follows the unrounded concrete volume
        bill.push(MaterialLine::new(
            "S001",
            "Steel Reinforcement Mixed Sizes",
            MaterialCategory::Steel,
            Unit::Kilogram,
            round2((foundation_m3 + slab_m3) * f.steel_kg_per_m3),
        ));

        // Masonry
        let wall_area = area * f.wall_area_ratio;
        bill.push(MaterialLine::new(
            "B001",
            "6-inch Concrete Blocks",
            MaterialCategory::Blocks,
            Unit::Piece,
            round2(wall_area * f.blocks_per_m2_wall),
        ));

        // Roofing
        let roof_area = area * f.roof_area_ratio;
        bill.push(MaterialLine::new(
            "R001",
            "Corrugated Iron Sheets - 30 Gauge",
            MaterialCategory::Roofing,
            Unit::Piece,
            round2(roof_area * f.sheets_per_m2_roof),
        ));

        // Finishing
        bill.push(MaterialLine::new(
            "F001",
            "Interior Paint - Emulsion",
            MaterialCategory::Finishing,
            Unit::Liter,
            round2(area * f.paint_l_per_m2),
        ));
        bill.push(MaterialLine::new(
            "F002",
            "Ceramic Floor Tiles",
            MaterialCategory::Finishing,
            Unit::SquareMeter,
            round2(area * f.tiles_m2_per_m2),
        ));

        // Services
        bill.push(MaterialLine::new(
            "E001",
            "Electrical Installation Package",
            MaterialCategory::Electrical,
            Unit::Lot,
            1.0,
        ));
        bill.push(MaterialLine::new(
            "P001",
            format!("Plumbing Installation - {} Bathrooms", spec.bathrooms),
            MaterialCategory::Plumbing,
            Unit::Lot,
            f64::from(spec.bathrooms),
        ));

        bill
    }
}
