//! # Materials
//!
//! Material categories, measurement units and the bill of quantities the
//! classifier produces for a project.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::materials::{MaterialCategory, MaterialClassifier};
//! use quote_core::project::ProjectSpecification;
//!
//! let spec = ProjectSpecification::new(120.0, 1, 3, 2, "nairobi");
//! let bill = MaterialClassifier::default().classify(&spec);
//!
//! let concrete = bill.section(MaterialCategory::Concrete).unwrap();
//! assert_eq!(concrete[0].item_code, "C001");
//! assert!((concrete[0].quantity - 18.0).abs() < 0.01);
//! ```

pub mod classifier;

pub use classifier::{MaterialClassifier, YieldFactors};

use serde::{Deserialize, Serialize};

/// Trade category a material line belongs to.
///
/// Categories key the base price table and the transport weight factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Concrete,
    Steel,
    Blocks,
    Roofing,
    Finishing,
    Electrical,
    Plumbing,
    Timber,
}

impl MaterialCategory {
    /// All categories, in bill-of-quantities order
    pub const ALL: [MaterialCategory; 8] = [
        MaterialCategory::Concrete,
        MaterialCategory::Steel,
        MaterialCategory::Blocks,
        MaterialCategory::Roofing,
        MaterialCategory::Finishing,
        MaterialCategory::Electrical,
        MaterialCategory::Plumbing,
        MaterialCategory::Timber,
    ];

    /// Lowercase key used in reference feeds (e.g., "concrete")
    pub fn code(&self) -> &'static str {
        match self {
            MaterialCategory::Concrete => "concrete",
            MaterialCategory::Steel => "steel",
            MaterialCategory::Blocks => "blocks",
            MaterialCategory::Roofing => "roofing",
            MaterialCategory::Finishing => "finishing",
            MaterialCategory::Electrical => "electrical",
            MaterialCategory::Plumbing => "plumbing",
            MaterialCategory::Timber => "timber",
        }
    }

    /// Parse from a reference-feed key, ignoring case and whitespace
    pub fn from_code(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase();
        MaterialCategory::ALL.into_iter().find(|c| c.code() == key)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialCategory::Concrete => "Concrete",
            MaterialCategory::Steel => "Steel",
            MaterialCategory::Blocks => "Masonry Blocks",
            MaterialCategory::Roofing => "Roofing",
            MaterialCategory::Finishing => "Finishing",
            MaterialCategory::Electrical => "Electrical",
            MaterialCategory::Plumbing => "Plumbing",
            MaterialCategory::Timber => "Timber",
        }
    }
}

impl std::fmt::Display for MaterialCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Unit of measure for a material line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Cubic metres
    #[serde(rename = "m3")]
    CubicMeter,
    /// Kilograms
    #[serde(rename = "kg")]
    Kilogram,
    /// Pieces
    #[serde(rename = "pcs")]
    Piece,
    /// Square metres
    #[serde(rename = "m2")]
    SquareMeter,
    /// Litres
    #[serde(rename = "liters")]
    Liter,
    /// Lump-sum package
    #[serde(rename = "lot")]
    Lot,
}

impl Unit {
    /// Short symbol as printed on quotations
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::CubicMeter => "m3",
            Unit::Kilogram => "kg",
            Unit::Piece => "pcs",
            Unit::SquareMeter => "m2",
            Unit::Liter => "liters",
            Unit::Lot => "lot",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One entry in the bill of quantities.
///
/// ## JSON Example
///
/// ```json
/// {
///   "item_code": "S001",
///   "description": "Steel Reinforcement Mixed Sizes",
///   "category": "steel",
///   "unit": "kg",
///   "quantity": 1458.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Item code, unique within a quotation (e.g., "C001")
    pub item_code: String,
    /// Human-readable description
    pub description: String,
    /// Trade category
    pub category: MaterialCategory,
    /// Unit of measure
    pub unit: Unit,
    /// Quantity in `unit`, rounded to 2 decimals
    pub quantity: f64,
}

impl MaterialLine {
    /// Create a new material line
    pub fn new(
        item_code: impl Into<String>,
        description: impl Into<String>,
        category: MaterialCategory,
        unit: Unit,
        quantity: f64,
    ) -> Self {
        MaterialLine {
            item_code: item_code.into(),
            description: description.into(),
            category,
            unit,
            quantity,
        }
    }
}

/// Lines of a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySection {
    pub category: MaterialCategory,
    pub lines: Vec<MaterialLine>,
}

/// Bill of quantities: categories in a fixed order, each with its lines in
/// the order the classifier produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillOfQuantities {
    sections: Vec<CategorySection>,
}

impl BillOfQuantities {
    /// Create an empty bill
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, opening a new section the first time a category is seen
    pub fn push(&mut self, line: MaterialLine) {
        match self.sections.iter_mut().find(|s| s.category == line.category) {
            Some(section) => section.lines.push(line),
            None => self.sections.push(CategorySection {
                category: line.category,
                lines: vec![line],
            }),
        }
    }

    /// Lines for one category, if any were produced
    pub fn section(&self, category: MaterialCategory) -> Option<&[MaterialLine]> {
        self.sections
            .iter()
            .find(|s| s.category == category)
            .map(|s| s.lines.as_slice())
    }

    /// Sections in bill order
    pub fn sections(&self) -> &[CategorySection] {
        &self.sections
    }

    /// All lines, categories first then lines within category
    pub fn lines(&self) -> impl Iterator<Item = &MaterialLine> {
        self.sections.iter().flat_map(|s| s.lines.iter())
    }

    /// Find a line by item code
    pub fn line(&self, item_code: &str) -> Option<&MaterialLine> {
        self.lines().find(|l| l.item_code == item_code)
    }

    /// Total number of lines
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.lines.len()).sum()
    }

    /// True when no lines were produced
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_codes_roundtrip() {
        for category in MaterialCategory::ALL {
            assert_eq!(MaterialCategory::from_code(category.code()), Some(category));
        }
        assert_eq!(MaterialCategory::from_code(" Steel "), Some(MaterialCategory::Steel));
        assert_eq!(MaterialCategory::from_code("glass"), None);
    }

    #[test]
    fn test_unit_serialization() {
        assert_eq!(serde_json::to_string(&Unit::CubicMeter).unwrap(), "\"m3\"");
        assert_eq!(serde_json::to_string(&Unit::Liter).unwrap(), "\"liters\"");
        let unit: Unit = serde_json::from_str("\"pcs\"").unwrap();
        assert_eq!(unit, Unit::Piece);
    }

    #[test]
    fn test_bill_preserves_order() {
        let mut bill = BillOfQuantities::new();
        bill.push(MaterialLine::new("C001", "Foundation", MaterialCategory::Concrete, Unit::CubicMeter, 1.0));
        bill.push(MaterialLine::new("S001", "Rebar", MaterialCategory::Steel, Unit::Kilogram, 45.0));
        bill.push(MaterialLine::new("C002", "Slab", MaterialCategory::Concrete, Unit::CubicMeter, 2.0));

        let codes: Vec<_> = bill.lines().map(|l| l.item_code.as_str()).collect();
        assert_eq!(codes, ["C001", "C002", "S001"]);
        assert_eq!(bill.len(), 3);
        assert_eq!(bill.section(MaterialCategory::Concrete).unwrap().len(), 2);
        assert!(bill.section(MaterialCategory::Timber).is_none());
        assert_eq!(bill.line("S001").unwrap().quantity, 45.0);
    }
}
