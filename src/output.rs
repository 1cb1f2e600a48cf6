//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what an entity *is* (a gallery item's position and
//! title, a form field's name) and shows paths and raw values as indented
//! context lines underneath.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Config
//!     site.toml
//!     Locale: VE
//!     Theme: system
//!
//! Gallery (6 items, 2 featured)
//!     Todos: 6
//!     Instrumentos Terminados: 2
//!     ...
//! ```
//!
//! ## Validate
//!
//! ```text
//! Valid submission
//!     name: Ana Pérez
//!     email: ana@example.com
//! ```
//!
//! ```text
//! 2 invalid fields
//!     name: El nombre debe tener al menos 2 caracteres
//!     phone: Formato de teléfono venezolano inválido
//! ```
//!
//! ## Gallery
//!
//! ```text
//! 002 Tallado Artesanal del Mástil [process]
//!     Source: /images/gallery/proceso-tallado.jpg
//!
//! Showing 1 of 6 (category: all, search: "tallado")
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::{CONFIG_FILENAME, SiteConfig};
use crate::contact::{ContactSubmission, FieldErrors};
use crate::gallery::{CategoryCounts, GalleryCollection, GalleryFilterState, GalleryItem};
use crate::generate::BuildSummary;
use crate::submission::{SubmissionState, SubmitOutcome};
use crate::theme::{ResolvedTheme, ThemePreference};
use std::path::Path;

const DESCRIPTION_WIDTH: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// One line per category: display name and item count.
fn count_lines(counts: &CategoryCounts, depth: usize) -> Vec<String> {
    counts
        .iter()
        .map(|(filter, n)| format!("{}{}: {}", indent(depth), filter.name(), n))
        .collect()
}

// ============================================================================
// check
// ============================================================================

/// Format the `check` summary: resolved config and gallery inventory.
pub fn format_check_output(
    config: &SiteConfig,
    gallery: &GalleryCollection,
    source_root: &Path,
) -> Vec<String> {
    let mut lines = vec!["Config".to_string()];
    let config_path = source_root.join(CONFIG_FILENAME);
    if config_path.exists() {
        lines.push(format!("{}{}", indent(1), CONFIG_FILENAME));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }
    lines.push(format!("{}Locale: {}", indent(1), config.locale));
    lines.push(format!("{}Theme: {}", indent(1), config.theme.default));
    lines.push(format!(
        "{}Reset after: {}ms",
        indent(1),
        config.submission.reset_after.as_millis()
    ));
    lines.push(String::new());

    lines.push(format!(
        "Gallery ({}, {} featured)",
        plural(gallery.len(), "item", "items"),
        gallery.featured().len()
    ));
    lines.extend(count_lines(&gallery.category_counts(), 1));
    lines
}

pub fn print_check_output(config: &SiteConfig, gallery: &GalleryCollection, source_root: &Path) {
    for line in format_check_output(config, gallery, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// validate
// ============================================================================

/// Format the normalized submission, one populated field per line.
pub fn format_submission(submission: &ContactSubmission) -> Vec<String> {
    let mut lines = vec!["Valid submission".to_string()];
    let fields = [
        ("name", Some(submission.name())),
        ("email", Some(submission.email())),
        ("phone", submission.phone()),
        ("subject", Some(submission.subject())),
        ("instrumentType", submission.instrument_type()),
        ("budget", submission.budget()),
        ("message", Some(submission.message())),
    ];
    for (key, value) in fields {
        if let Some(v) = value {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                key,
                truncate_desc(v, DESCRIPTION_WIDTH)
            ));
        }
    }
    lines
}

/// Format field errors in form order.
pub fn format_field_errors(errors: &FieldErrors) -> Vec<String> {
    let mut lines = vec![plural(errors.len(), "invalid field", "invalid fields")];
    for (field, message) in errors.iter() {
        lines.push(format!("{}{}: {}", indent(1), field.as_str(), message));
    }
    lines
}

pub fn format_validation(result: &Result<ContactSubmission, FieldErrors>) -> Vec<String> {
    match result {
        Ok(submission) => format_submission(submission),
        Err(errors) => format_field_errors(errors),
    }
}

pub fn print_field_errors(errors: &FieldErrors) {
    for line in format_field_errors(errors) {
        println!("{}", line);
    }
}

pub fn print_validation(result: &Result<ContactSubmission, FieldErrors>) {
    for line in format_validation(result) {
        println!("{}", line);
    }
}

// ============================================================================
// submit
// ============================================================================

/// One line per observed state change.
///
/// ```text
/// → submitting
/// → success
/// ```
pub fn format_state_change(state: SubmissionState) -> String {
    format!("→ {}", state)
}

pub fn format_submit_outcome(outcome: &SubmitOutcome) -> Vec<String> {
    match outcome {
        SubmitOutcome::Delivered => vec![
            "¡Mensaje enviado exitosamente!".to_string(),
            format!("{}Te contactaremos pronto.", indent(1)),
        ],
        SubmitOutcome::Failed { reason } => vec![
            "Error al enviar el mensaje".to_string(),
            format!("{}{}", indent(1), reason),
        ],
    }
}

pub fn print_state_change(state: SubmissionState) {
    println!("{}", format_state_change(state));
}

pub fn print_submit_outcome(outcome: &SubmitOutcome) {
    for line in format_submit_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// gallery
// ============================================================================

/// Format the visible gallery items followed by a summary line and counts.
///
/// Positions are 1-based indices into the full collection, so an item keeps
/// its number regardless of the filter.
pub fn format_gallery_listing(
    gallery: &GalleryCollection,
    visible: &[&GalleryItem],
    state: &GalleryFilterState,
) -> Vec<String> {
    let mut lines = Vec::new();
    for item in visible {
        let position = gallery
            .items()
            .iter()
            .position(|i| i.id == item.id)
            .map(|p| p + 1)
            .unwrap_or(0);
        let title = item.title.as_deref().unwrap_or(&item.alt);
        let star = if item.featured { " *" } else { "" };
        lines.push(format!(
            "{} {} [{}]{}",
            format_index(position),
            title,
            item.category,
            star
        ));
        lines.push(format!("{}Source: {}", indent(1), item.src));
        if let Some(desc) = &item.description {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(desc, DESCRIPTION_WIDTH)
            ));
        }
    }
    if visible.is_empty() {
        lines.push("No se encontraron imágenes".to_string());
    }

    lines.push(String::new());
    let search = if state.search_term.is_empty() {
        String::new()
    } else {
        format!(", search: \"{}\"", state.search_term)
    };
    lines.push(format!(
        "Showing {} of {} (category: {}{})",
        visible.len(),
        gallery.len(),
        state.selected_category,
        search
    ));
    lines.extend(count_lines(&gallery.category_counts(), 1));
    lines
}

pub fn print_gallery_listing(
    gallery: &GalleryCollection,
    visible: &[&GalleryItem],
    state: &GalleryFilterState,
) {
    for line in format_gallery_listing(gallery, visible, state) {
        println!("{}", line);
    }
}

// ============================================================================
// theme
// ============================================================================

pub fn format_theme(
    preference: ThemePreference,
    resolved: ResolvedTheme,
    store_path: &Path,
) -> Vec<String> {
    vec![
        format!("Theme: {} (painted {})", preference, resolved),
        format!("{}Store: {}", indent(1), store_path.display()),
    ]
}

pub fn print_theme(preference: ThemePreference, resolved: ResolvedTheme, store_path: &Path) {
    for line in format_theme(preference, resolved, store_path) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec![format!("Home → {}", summary.index_path.display())];
    lines.push(format!(
        "{}Gallery: {}, {} featured",
        indent(1),
        plural(summary.gallery_items, "item", "items"),
        summary.featured_items
    ));
    lines.push(format!(
        "{}About: {}",
        indent(1),
        if summary.has_about { "about.md" } else { "(none)" }
    ));
    lines.push(format!(
        "{}Assets: {}",
        indent(1),
        plural(summary.assets_copied, "file", "files")
    ));
    lines
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}
