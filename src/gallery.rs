//! Gallery collection and filtering.
//!
//! The gallery is a fixed list of photos (finished instruments, build process,
//! tonewoods, the workshop itself) described in `gallery.toml`:
//!
//! ```toml
//! [[items]]
//! id = "cuatro-tradicional-1"
//! src = "/images/gallery/cuatro-tradicional-1.jpg"
//! alt = "Cuatro tradicional con tapa de cedro"
//! title = "Cuatro Tradicional Premium"
//! description = "Tapa de cedro, aros y fondo de caoba."
//! category = "finished"
//! featured = true
//! ```
//!
//! The collection is loaded once and never changes. A [`GalleryFilter`] holds
//! the visitor's filter state (category + search term) and derives the visible
//! items from `(collection, category, term)` on every call, so there is no
//! cached view to go stale:
//!
//! - category `all` keeps everything, any other category keeps exact matches
//! - a non-empty term keeps items whose title, description or alt text
//!   contains it, ignoring case
//! - collection order is preserved
//!
//! Category counts always describe the whole collection, regardless of the
//! current filter.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Name of the gallery description file within the content directory.
pub const GALLERY_FILENAME: &str = "gallery.toml";

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Duplicate gallery item id: {0}")]
    DuplicateId(String),
    #[error("Gallery item #{index} has an empty `{field}`")]
    EmptyField { index: usize, field: &'static str },
    #[error("Unknown gallery category: {0}")]
    UnknownCategory(String),
}

/// Fixed tags partitioning the gallery.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Finished,
    Process,
    Materials,
    Workshop,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Finished,
        Category::Process,
        Category::Materials,
        Category::Workshop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Finished => "finished",
            Category::Process => "process",
            Category::Materials => "materials",
            Category::Workshop => "workshop",
        }
    }

    /// Button label.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Finished => "Instrumentos Terminados",
            Category::Process => "Proceso de Construcción",
            Category::Materials => "Materiales",
            Category::Workshop => "Taller",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Finished => "Instrumentos completamente terminados",
            Category::Process => "Pasos del proceso artesanal",
            Category::Materials => "Maderas y materiales utilizados",
            Category::Workshop => "Espacio de trabajo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| GalleryError::UnknownCategory(s.to_string()))
    }
}

/// Category selection: a single category, or the `all` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Every selectable filter, `all` first.
    pub fn choices() -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Todos",
            CategoryFilter::Only(c) => c.name(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CategoryFilter::All => "Ver toda la galería",
            CategoryFilter::Only(c) => c.description(),
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = GalleryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// A single gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryItem {
    pub id: String,
    pub src: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub featured: bool,
}

impl GalleryItem {
    /// Case-insensitive substring match against title, description and alt.
    ///
    /// `needle` must already be lowercased.
    fn mentions(&self, needle: &str) -> bool {
        [self.title.as_deref(), self.description.as_deref(), Some(self.alt.as_str())]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GalleryFile {
    #[serde(default)]
    items: Vec<GalleryItem>,
}

/// The full, immutable gallery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryCollection {
    items: Vec<GalleryItem>,
}

impl GalleryCollection {
    /// Build a collection, rejecting duplicate ids and empty required fields.
    pub fn new(items: Vec<GalleryItem>) -> Result<Self, GalleryError> {
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            for (field, value) in [("id", &item.id), ("src", &item.src), ("alt", &item.alt)] {
                if value.trim().is_empty() {
                    return Err(GalleryError::EmptyField { index, field });
                }
            }
            if !seen.insert(item.id.as_str()) {
                return Err(GalleryError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Parse a `gallery.toml` document.
    pub fn from_toml(content: &str) -> Result<Self, GalleryError> {
        let file: GalleryFile = toml::from_str(content)?;
        Self::new(file.items)
    }

    /// Load `gallery.toml` from the content directory.
    ///
    /// A missing file is an empty gallery, not an error.
    pub fn load(root: &Path) -> Result<Self, GalleryError> {
        let path = root.join(GALLERY_FILENAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no gallery file, using empty gallery");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)?;
        let collection = Self::from_toml(&content)?;
        tracing::debug!(items = collection.len(), "gallery loaded");
        Ok(collection)
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GalleryItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Featured items, in collection order.
    pub fn featured(&self) -> Vec<&GalleryItem> {
        self.items.iter().filter(|i| i.featured).collect()
    }

    /// Items per category over the whole collection, plus `all`.
    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts: BTreeMap<CategoryFilter, usize> = CategoryFilter::choices()
            .into_iter()
            .map(|f| (f, 0))
            .collect();
        for item in &self.items {
            *counts.entry(CategoryFilter::Only(item.category)).or_default() += 1;
        }
        counts.insert(CategoryFilter::All, self.items.len());
        CategoryCounts(counts)
    }
}

/// Number of items per category filter. Every filter has an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts(BTreeMap<CategoryFilter, usize>);

impl CategoryCounts {
    pub fn get(&self, filter: CategoryFilter) -> usize {
        self.0.get(&filter).copied().unwrap_or(0)
    }

    pub fn all(&self) -> usize {
        self.get(CategoryFilter::All)
    }

    /// `all` first, then categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryFilter, usize)> + '_ {
        self.0.iter().map(|(f, n)| (*f, *n))
    }
}

/// The visitor's filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilterState {
    pub selected_category: CategoryFilter,
    pub search_term: String,
}

/// Filtered, searchable view over a [`GalleryCollection`].
#[derive(Debug, Clone)]
pub struct GalleryFilter<'a> {
    collection: &'a GalleryCollection,
    state: GalleryFilterState,
}

impl<'a> GalleryFilter<'a> {
    pub fn new(collection: &'a GalleryCollection) -> Self {
        Self {
            collection,
            state: GalleryFilterState::default(),
        }
    }

    pub fn state(&self) -> &GalleryFilterState {
        &self.state
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.state.selected_category = category;
    }

    /// Store the search term as typed. Debouncing is the caller's business.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.state.search_term = term.into();
    }

    /// Back to `all` with no search term.
    pub fn reset(&mut self) {
        self.state = GalleryFilterState::default();
    }

    /// Items matching the current category and search term, in collection order.
    pub fn visible_items(&self) -> Vec<&'a GalleryItem> {
        let category = self.state.selected_category;
        let needle = self.state.search_term.to_lowercase();
        self.collection
            .items
            .iter()
            .filter(|item| category.matches(item.category))
            .filter(|item| needle.is_empty() || item.mentions(&needle))
            .collect()
    }

    /// Counts over the unfiltered collection.
    pub fn category_counts(&self) -> CategoryCounts {
        self.collection.category_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{item_ids, sample_gallery};

    #[test]
    fn all_with_empty_search_shows_everything() {
        let gallery = sample_gallery();
        let filter = GalleryFilter::new(&gallery);
        assert_eq!(filter.visible_items().len(), gallery.len());
    }

    #[test]
    fn category_keeps_only_that_category_in_order() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_category(CategoryFilter::Only(Category::Finished));
        filter.set_search("");
        assert_eq!(item_ids(&filter.visible_items()), vec!["1", "4"]);
    }

    #[test]
    fn search_is_case_insensitive_across_title() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_category(CategoryFilter::All);
        filter.set_search("tallado");
        let visible = filter.visible_items();
        assert_eq!(visible.len(), 1);
        assert_eq!(
            visible[0].title.as_deref(),
            Some("Tallado Artesanal del Mástil")
        );
    }

    #[test]
    fn search_matches_description_and_alt() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        // only in a description
        filter.set_search("ÉBANO");
        assert_eq!(item_ids(&filter.visible_items()), vec!["3"]);
        // only in an alt text
        filter.set_search("vista del taller");
        assert_eq!(item_ids(&filter.visible_items()), vec!["5"]);
    }

    #[test]
    fn category_and_search_combine() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_category(CategoryFilter::Only(Category::Process));
        filter.set_search("barniz");
        assert_eq!(item_ids(&filter.visible_items()), vec!["6"]);

        filter.set_category(CategoryFilter::Only(Category::Finished));
        assert!(filter.visible_items().is_empty());
    }

    #[test]
    fn no_match_is_an_empty_view() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_search("bandola eléctrica");
        assert!(filter.visible_items().is_empty());
    }

    #[test]
    fn setting_all_twice_is_idempotent() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_search("cuatro");
        filter.set_category(CategoryFilter::All);
        let once = item_ids(&filter.visible_items());
        filter.set_category(CategoryFilter::All);
        assert_eq!(item_ids(&filter.visible_items()), once);
    }

    #[test]
    fn counts_ignore_current_filter() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        let before = filter.category_counts();
        filter.set_category(CategoryFilter::Only(Category::Workshop));
        filter.set_search("nothing matches this");
        let after = filter.category_counts();

        assert_eq!(before, after);
        assert_eq!(after.all(), gallery.len());
        assert_eq!(after.get(CategoryFilter::Only(Category::Finished)), 2);
        assert_eq!(after.get(CategoryFilter::Only(Category::Process)), 2);
        assert_eq!(after.get(CategoryFilter::Only(Category::Materials)), 1);
        assert_eq!(after.get(CategoryFilter::Only(Category::Workshop)), 1);
    }

    #[test]
    fn counts_include_empty_categories() {
        let gallery = GalleryCollection::default();
        let counts = gallery.category_counts();
        assert_eq!(counts.all(), 0);
        assert_eq!(counts.iter().count(), 5);
        assert_eq!(counts.get(CategoryFilter::Only(Category::Workshop)), 0);
    }

    #[test]
    fn reset_clears_state() {
        let gallery = sample_gallery();
        let mut filter = GalleryFilter::new(&gallery);
        filter.set_category(CategoryFilter::Only(Category::Materials));
        filter.set_search("madera");
        filter.reset();
        assert_eq!(filter.state(), &GalleryFilterState::default());
        assert_eq!(filter.visible_items().len(), gallery.len());
    }

    #[test]
    fn featured_in_order() {
        let gallery = sample_gallery();
        let ids: Vec<&str> = gallery.featured().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn category_filter_parses() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "workshop".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Workshop)
        );
        assert!(matches!(
            "guitars".parse::<CategoryFilter>(),
            Err(GalleryError::UnknownCategory(_))
        ));
    }

    #[test]
    fn parse_gallery_toml() {
        let gallery = GalleryCollection::from_toml(
            r#"
[[items]]
id = "a"
src = "/a.jpg"
alt = "Alt A"
category = "materials"

[[items]]
id = "b"
src = "/b.jpg"
alt = "Alt B"
title = "B"
category = "finished"
featured = true
"#,
        )
        .unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.get("b").unwrap().title.as_deref(), Some("B"));
        assert!(gallery.get("b").unwrap().featured);
        assert!(!gallery.get("a").unwrap().featured);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let result = GalleryCollection::from_toml(
            r#"
[[items]]
id = "a"
src = "/a.jpg"
alt = "A"
category = "process"

[[items]]
id = "a"
src = "/b.jpg"
alt = "B"
category = "process"
"#,
        );
        assert!(matches!(result, Err(GalleryError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn empty_alt_rejected() {
        let result = GalleryCollection::from_toml(
            r#"
[[items]]
id = "a"
src = "/a.jpg"
alt = "  "
category = "process"
"#,
        );
        assert!(matches!(
            result,
            Err(GalleryError::EmptyField { index: 0, field: "alt" })
        ));
    }

    #[test]
    fn unknown_keys_and_categories_rejected() {
        assert!(GalleryCollection::from_toml(
            "[[items]]\nid = \"a\"\nsrc = \"/a\"\nalt = \"A\"\ncategory = \"process\"\nsize = 3\n"
        )
        .is_err());
        assert!(GalleryCollection::from_toml(
            "[[items]]\nid = \"a\"\nsrc = \"/a\"\nalt = \"A\"\ncategory = \"guitars\"\n"
        )
        .is_err());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gallery = GalleryCollection::load(tmp.path()).unwrap();
        assert!(gallery.is_empty());
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(
            tmp.path().join(GALLERY_FILENAME),
            "[[items]]\nid = \"x\"\nsrc = \"/x.jpg\"\nalt = \"X\"\ncategory = \"workshop\"\n",
        )
        .unwrap();
        let gallery = GalleryCollection::load(tmp.path()).unwrap();
        assert_eq!(gallery.len(), 1);
    }
}
