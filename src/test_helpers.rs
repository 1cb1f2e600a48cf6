//! Shared test utilities for the luthier-site test suite.
//!
//! Provides fixture setup, canned contact forms, and extractors that keep
//! assertions short.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gallery = sample_gallery();
//! let mut filter = GalleryFilter::new(&gallery);
//! filter.set_search("tallado");
//! assert_eq!(item_ids(&filter.visible_items()), vec!["2"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::contact::{ContactSubmission, ContactValidator, RawFormInput};
use crate::gallery::{GalleryCollection, GalleryItem};
use crate::locale::LocaleConfig;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixtures_dir(), tmp.path()).unwrap();
    tmp
}

fn fixtures_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content")
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The six-item workshop gallery from `fixtures/content/gallery.toml`.
///
/// Ids are `"1"` to `"6"`: two finished (both featured), two process, one
/// materials, one workshop.
pub fn sample_gallery() -> GalleryCollection {
    GalleryCollection::load(&fixtures_dir()).unwrap()
}

// =========================================================================
// Contact forms
// =========================================================================

/// A form that passes validation under both built-in locales.
pub fn valid_form() -> RawFormInput {
    RawFormInput {
        name: "Ana Pérez".into(),
        email: "ana@example.com".into(),
        phone: None,
        subject: "Encargo cuatro".into(),
        message: "Quisiera un cuatro de concierto".into(),
        instrument_type: None,
        budget: None,
    }
}

/// `valid_form()` validated under the Venezuelan locale.
pub fn valid_submission() -> ContactSubmission {
    ContactValidator::new(LocaleConfig::venezuela())
        .validate(&valid_form())
        .unwrap()
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Item ids in order.
pub fn item_ids<'a>(items: &[&'a GalleryItem]) -> Vec<&'a str> {
    items.iter().map(|i| i.id.as_str()).collect()
}
