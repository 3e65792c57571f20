//! # quote_core - Construction Quotation Engine
//!
//! `quote_core` turns a building specification (floor area, floors, rooms,
//! location) into a priced construction quotation: a bill of quantities,
//! unit prices adjusted for location, season and supplier, delivery costs,
//! VAT, a payment schedule and a per-supplier summary. All inputs and outputs
//! are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Injected reference data**: prices, factors, routes and suppliers are
//!   plain tables passed to the engine, never globals it reaches for
//! - **Degrade, don't fail**: a missing price or an unknown place yields a
//!   flagged line, not an error
//! - **Reproducible on demand**: market variation comes from a pluggable
//!   source that tests can pin
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::{ProjectSpecification, QuotationEngine, ReferenceData};
//!
//! let engine = QuotationEngine::new(ReferenceData::builtin().clone()).unwrap();
//! let spec = ProjectSpecification::new(120.0, 1, 3, 2, "nairobi");
//! let quotation = engine.generate(&spec).unwrap();
//!
//! let json = serde_json::to_string_pretty(&quotation).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project specification and validation
//! - [`materials`] - Material categories and the quantity takeoff
//! - [`pricing`] - Unit price prediction and market variation
//! - [`transport`] - Vehicle selection and delivery costing
//! - [`quotation`] - Quotation document and engine
//! - [`reference`] - Reference tables and the built-in Kenyan snapshot
//! - [`lookup`] - Found/defaulted tagging for table lookups
//! - [`units`] - Unit wrappers and rounding
//! - [`errors`] - Structured error types
//! - [`file_io`] - JSON persistence with atomic saves and feed locking
//! - [`pdf`] - Quotation PDF rendering

pub mod errors;
pub mod file_io;
pub mod lookup;
pub mod materials;
pub mod pdf;
pub mod pricing;
pub mod project;
pub mod quotation;
pub mod reference;
pub mod transport;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{QuoteError, QuoteResult};
pub use file_io::{load_quotation, load_reference_data, load_specification, save_quotation};
pub use project::ProjectSpecification;
pub use quotation::{Quotation, QuotationEngine};
pub use reference::ReferenceData;
