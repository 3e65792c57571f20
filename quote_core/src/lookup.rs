//! # Reference Lookups
//!
//! Every reference-table lookup in the pipeline either finds a value or falls
//! back to a documented default. [`Lookup`] keeps that distinction instead of
//! handing back a bare number, so a caller can tell a Nairobi location factor
//! from the 0.92 used for a town nobody has priced yet.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::lookup::Lookup;
//!
//! let factor = Lookup::Defaulted(0.92);
//! assert!(factor.is_defaulted());
//! assert_eq!(factor.value(), 0.92);
//! ```

use serde::{Deserialize, Serialize};

/// Outcome of a reference-table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Lookup<T> {
    /// The key was present in the reference table
    Found(T),
    /// The key was missing and the table default was used
    Defaulted(T),
}

impl<T> Lookup<T> {
    /// Wrap an optional table hit, falling back to `default` when it is absent.
    pub fn or_default_with(found: Option<T>, default: impl FnOnce() -> T) -> Self {
        match found {
            Some(value) => Lookup::Found(value),
            None => Lookup::Defaulted(default()),
        }
    }

    /// True when the table default was used
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Lookup::Defaulted(_))
    }

    /// Consume the lookup, discarding provenance
    pub fn into_inner(self) -> T {
        match self {
            Lookup::Found(v) | Lookup::Defaulted(v) => v,
        }
    }

    /// Borrow the looked-up value
    pub fn as_ref(&self) -> Lookup<&T> {
        match self {
            Lookup::Found(v) => Lookup::Found(v),
            Lookup::Defaulted(v) => Lookup::Defaulted(v),
        }
    }

    /// Transform the value, keeping provenance
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::Defaulted(v) => Lookup::Defaulted(f(v)),
        }
    }
}

impl<T: Copy> Lookup<T> {
    /// Copy the looked-up value out
    pub fn value(&self) -> T {
        match self {
            Lookup::Found(v) | Lookup::Defaulted(v) => *v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_default_with() {
        let found = Lookup::or_default_with(Some(1.05), || 0.92);
        assert_eq!(found, Lookup::Found(1.05));
        assert!(!found.is_defaulted());

        let missing = Lookup::or_default_with(None, || 0.92);
        assert_eq!(missing, Lookup::Defaulted(0.92));
        assert!(missing.is_defaulted());
    }

    #[test]
    fn test_map_keeps_provenance() {
        let km = Lookup::Defaulted(100.0).map(|d: f64| d * 2.0);
        assert_eq!(km, Lookup::Defaulted(200.0));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Lookup::Defaulted(100.0)).unwrap();
        assert_eq!(json, r#"{"source":"defaulted","value":100.0}"#);
    }
}
