//! # File I/O Module
//!
//! JSON persistence for reference feeds, specifications and quotations:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **Feed locking**: feeds are read under a shared OS lock and written under
//!   an exclusive one, so a reader never sees a half-written feed
//! - **Version validation**: saved quotations carry a schema version
//!
//! Reference feed problems are reported as [`QuoteError::Configuration`]
//! naming the feed; everything else uses the generic file errors.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::file_io::{load_reference_data, save_quotation};
//! use quote_core::project::ProjectSpecification;
//! use quote_core::quotation::QuotationEngine;
//! use std::path::Path;
//!
//! let reference = load_reference_data(Path::new("kenya_market.json"))?;
//! let engine = QuotationEngine::new(reference)?;
//! let quotation = engine.generate(&ProjectSpecification::new(120.0, 1, 3, 2, "nairobi"))?;
//! save_quotation(&quotation, Path::new("quotation.json"))?;
//! # Ok::<(), quote_core::errors::QuoteError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::Serialize;

use crate::errors::{QuoteError, QuoteResult};
use crate::project::ProjectSpecification;
use crate::quotation::{Quotation, SCHEMA_VERSION};
use crate::reference::ReferenceData;

/// Load and validate a reference feed.
///
/// The feed is read under a shared lock; a writer holding the exclusive lock
/// makes this fail fast rather than wait.
///
/// # Returns
///
/// * `Ok(ReferenceData)` - Parsed and validated tables
/// * `Err(QuoteError::FileLocked)` - A writer is replacing the feed
/// * `Err(QuoteError::Configuration)` - Unreadable, malformed or invalid feed
pub fn load_reference_data(path: &Path) -> QuoteResult<ReferenceData> {
    let feed = path.display().to_string();

    let mut file = File::open(path)
        .map_err(|e| QuoteError::configuration(feed.clone(), format!("cannot open feed: {}", e)))?;

    FileExt::try_lock_shared(&file)
        .map_err(|_| QuoteError::file_locked(feed.clone(), "a reference data writer"))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| QuoteError::configuration(feed.clone(), format!("cannot read feed: {}", e)))?;

    let reference: ReferenceData = serde_json::from_str(&contents)
        .map_err(|e| QuoteError::configuration(feed.clone(), format!("malformed feed: {}", e)))?;

    reference.validate().map_err(|e| match e {
        QuoteError::Configuration { feed: table, reason } => {
            QuoteError::configuration(feed.clone(), format!("{}: {}", table, reason))
        }
        other => other,
    })?;

    tracing::debug!(path = %feed, "reference data loaded");
    Ok(reference)
}

/// Write a reference feed atomically under an exclusive lock.
pub fn save_reference_data(reference: &ReferenceData, path: &Path) -> QuoteResult<()> {
    // Hold the exclusive lock on the current feed while it is replaced
    let _guard = if path.exists() {
        let existing = OpenOptions::new().read(true).open(path).map_err(|e| {
            QuoteError::file_error("open", path.display().to_string(), e.to_string())
        })?;
        FileExt::try_lock_exclusive(&existing)
            .map_err(|_| QuoteError::file_locked(path.display().to_string(), "a reference data reader"))?;
        Some(existing)
    } else {
        None
    };

    write_json_atomic(reference, path)
}

/// Load a project specification.
///
/// The specification is parsed but not validated; the engine validates it
/// before generating.
pub fn load_specification(path: &Path) -> QuoteResult<ProjectSpecification> {
    let contents = read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| QuoteError::SerializationError {
        reason: format!("Invalid specification in {}: {}", path.display(), e),
    })
}

/// Save a quotation with atomic write semantics.
///
/// The save process:
/// 1. Serialize the quotation to JSON
/// 2. Write to a temporary file (`.tmp`)
/// 3. Sync to disk (fsync)
/// 4. Rename over the target
///
/// # Example
///
/// ```rust,no_run
/// use quote_core::file_io::save_quotation;
/// use quote_core::project::ProjectSpecification;
/// use quote_core::quotation::QuotationEngine;
/// use quote_core::reference::ReferenceData;
/// use std::path::Path;
///
/// let engine = QuotationEngine::new(ReferenceData::builtin().clone())?;
/// let quotation = engine.generate(&ProjectSpecification::new(90.0, 1, 2, 1, "kisumu"))?;
/// save_quotation(&quotation, Path::new("quotation.json"))?;
/// # Ok::<(), quote_core::errors::QuoteError>(())
/// ```
pub fn save_quotation(quotation: &Quotation, path: &Path) -> QuoteResult<()> {
    write_json_atomic(quotation, path)
}

/// Load a saved quotation.
///
/// # Returns
///
/// * `Ok(Quotation)` - Successfully loaded
/// * `Err(QuoteError::VersionMismatch)` - Saved by an incompatible version
/// * `Err(QuoteError::SerializationError)` - Invalid JSON
/// * `Err(QuoteError::FileError)` - I/O error
pub fn load_quotation(path: &Path) -> QuoteResult<Quotation> {
    let contents = read_to_string(path)?;

    let quotation: Quotation =
        serde_json::from_str(&contents).map_err(|e| QuoteError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&quotation.schema_version)?;

    Ok(quotation)
}

fn read_to_string(path: &Path) -> QuoteResult<String> {
    let mut file = File::open(path)
        .map_err(|e| QuoteError::file_error("open", path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| QuoteError::file_error("read", path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> QuoteResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| QuoteError::SerializationError {
        reason: e.to_string(),
    })?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        QuoteError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        QuoteError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        QuoteError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        QuoteError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// `quotation.json` -> `quotation.json.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Check that a saved document's version is compatible with this build.
///
/// Major versions must match; within 0.x a newer minor is rejected.
fn validate_version(file_version: &str) -> QuoteResult<()> {
    let mismatch = || QuoteError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::NoVariation;
    use crate::quotation::QuotationEngine;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("quote_core_test_{}_{}.json", name, std::process::id()))
    }

    fn sample_quotation() -> Quotation {
        let engine = QuotationEngine::new(ReferenceData::builtin().clone()).unwrap();
        let spec = ProjectSpecification::new(120.0, 1, 3, 2, "nairobi");
        engine.generate_with(&spec, &mut NoVariation, chrono::Utc::now()).unwrap()
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path_for(Path::new("/a/b/q.json")), Path::new("/a/b/q.json.tmp"));
        assert_eq!(tmp_path_for(Path::new("feed")), Path::new("feed.tmp"));
    }

    #[test]
    fn test_reference_export_and_reload() {
        let path = temp_path("reference_roundtrip");
        save_reference_data(ReferenceData::builtin(), &path).unwrap();

        let loaded = load_reference_data(&path).unwrap();
        assert_eq!(loaded.suppliers, ReferenceData::builtin().suppliers);
        assert_eq!(loaded.transport.routes.len(), 8);
        assert!(!tmp_path_for(&path).exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_feed_is_configuration_error() {
        let err = load_reference_data(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_malformed_feed_is_configuration_error() {
        let path = temp_path("malformed_feed");
        fs::write(&path, "{ \"pricing\": ").unwrap();

        let err = load_reference_data(&path).unwrap_err();
        match err {
            QuoteError::Configuration { feed, .. } => assert_eq!(feed, path.display().to_string()),
            other => panic!("expected configuration error, got {:?}", other),
        }

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_feed_values_rejected() {
        let path = temp_path("invalid_feed");
        let mut reference = ReferenceData::kenya_market();
        reference.pricing.default_location_factor = 0.0;
        save_reference_data(&reference, &path).unwrap();

        let err = load_reference_data(&path).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("default_location_factor"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_feed_locked_by_writer() {
        let path = temp_path("locked_feed");
        save_reference_data(ReferenceData::builtin(), &path).unwrap();

        let writer = File::open(&path).unwrap();
        FileExt::lock_exclusive(&writer).unwrap();

        let err = load_reference_data(&path).unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "FILE_LOCKED");

        drop(writer);
        assert!(load_reference_data(&path).is_ok());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_save_and_load_quotation() {
        let path = temp_path("quotation_roundtrip");
        let quotation = sample_quotation();
        save_quotation(&quotation, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let loaded = load_quotation(&path).unwrap();
        assert_eq!(loaded.id, quotation.id);
        assert_eq!(loaded.reference, quotation.reference);
        assert_eq!(loaded.items.len(), quotation.items.len());
        assert_eq!(loaded.payment_schedule.len(), 5);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_quotation_rejects_newer_schema() {
        let path = temp_path("quotation_newer");
        let mut quotation = sample_quotation();
        quotation.schema_version = "0.9.0".to_string();
        save_quotation(&quotation, &path).unwrap();

        let err = load_quotation(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_specification() {
        let path = temp_path("specification");
        fs::write(
            &path,
            r#"{"building_area": 150.0, "floors": 2, "bedrooms": 4, "bathrooms": 3, "location": "Mombasa"}"#,
        )
        .unwrap();

        let spec = load_specification(&path).unwrap();
        assert_eq!(spec.floors, 2);
        assert_eq!(spec.location_key(), "mombasa");
        assert!(spec.name.is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_specification_missing_file() {
        let err = load_specification(Path::new("/definitely/not/here.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
