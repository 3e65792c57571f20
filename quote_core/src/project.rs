//! # Project Specification
//!
//! The coarse building description a quotation is generated from. It is
//! supplied by the calling system (a web layer, the CLI) and never mutated by
//! the pipeline.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::project::ProjectSpecification;
//!
//! let spec = ProjectSpecification::new(120.0, 1, 3, 2, "nairobi")
//!     .with_name("Kilimani Villa")
//!     .with_budget(4_500_000.0);
//!
//! assert!(spec.validate().is_ok());
//! let json = serde_json::to_string_pretty(&spec).unwrap();
//! assert!(json.contains("\"building_area\": 120.0"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{QuoteError, QuoteResult};

/// Name used on quotations for projects that were not given one
pub const DEFAULT_PROJECT_NAME: &str = "Construction Project";

/// Input parameters for a quotation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "building_area": 120.0,
///   "floors": 1,
///   "bedrooms": 3,
///   "bathrooms": 2,
///   "location": "nairobi",
///   "name": "Kilimani Villa",
///   "budget": 4500000.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpecification {
    /// Gross floor area in m²
    pub building_area: f64,

    /// Number of storeys
    pub floors: u32,

    /// Bedroom count
    pub bedrooms: u32,

    /// Bathroom count (drives plumbing lots)
    pub bathrooms: u32,

    /// Site location, matched case-insensitively against reference tables
    pub location: String,

    /// Optional project name shown on the quotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional client budget in KES
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl ProjectSpecification {
    /// Create a specification without name or budget.
    pub fn new(
        building_area: f64,
        floors: u32,
        bedrooms: u32,
        bathrooms: u32,
        location: impl Into<String>,
    ) -> Self {
        ProjectSpecification {
            building_area,
            floors,
            bedrooms,
            bathrooms,
            location: location.into(),
            name: None,
            budget: None,
        }
    }

    /// Set the project name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the client budget (builder pattern)
    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Reject specifications that would produce meaningless quantities.
    ///
    /// Zero bathrooms is accepted and simply yields no plumbing lots.
    pub fn validate(&self) -> QuoteResult<()> {
        if !self.building_area.is_finite() || self.building_area <= 0.0 {
            return Err(QuoteError::invalid_specification(
                "building_area",
                self.building_area.to_string(),
                "Building area must be a positive number of square metres",
            ));
        }
        if self.floors == 0 {
            return Err(QuoteError::invalid_specification(
                "floors",
                "0",
                "A building needs at least one floor",
            ));
        }
        if self.location.trim().is_empty() {
            return Err(QuoteError::invalid_specification(
                "location",
                self.location.clone(),
                "Location must not be blank",
            ));
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(QuoteError::invalid_specification(
                    "budget",
                    budget.to_string(),
                    "Budget cannot be negative",
                ));
            }
        }
        Ok(())
    }

    /// Location key used for reference-table lookups
    pub fn location_key(&self) -> String {
        self.location.trim().to_lowercase()
    }

    /// Project name, or the default when none was given
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_PROJECT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectSpecification {
        ProjectSpecification::new(120.0, 1, 3, 2, "Nairobi")
    }

    #[test]
    fn test_valid_specification() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_zero_bathrooms_accepted() {
        let mut spec = sample();
        spec.bathrooms = 0;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_area() {
        for area in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let mut spec = sample();
            spec.building_area = area;
            let err = spec.validate().unwrap_err();
            assert_eq!(err.error_code(), "INVALID_SPECIFICATION");
        }
    }

    #[test]
    fn test_rejects_zero_floors() {
        let mut spec = sample();
        spec.floors = 0;
        assert!(matches!(
            spec.validate(),
            Err(QuoteError::InvalidSpecification { ref field, .. }) if field == "floors"
        ));
    }

    #[test]
    fn test_rejects_blank_location_and_negative_budget() {
        let mut spec = sample();
        spec.location = "   ".to_string();
        assert!(spec.validate().is_err());

        let spec = sample().with_budget(-1.0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_location_key_and_name() {
        let spec = ProjectSpecification::new(80.0, 1, 2, 1, "  Mombasa ");
        assert_eq!(spec.location_key(), "mombasa");
        assert_eq!(spec.display_name(), DEFAULT_PROJECT_NAME);
        assert_eq!(spec.with_name("Nyali").display_name(), "Nyali");
    }

    #[test]
    fn test_optional_fields_deserialize() {
        let json = r#"{"building_area":90,"floors":2,"bedrooms":2,"bathrooms":1,"location":"kisumu"}"#;
        let spec: ProjectSpecification = serde_json::from_str(json).unwrap();
        assert_eq!(spec.floors, 2);
        assert!(spec.name.is_none());
        assert!(spec.budget.is_none());
    }
}
