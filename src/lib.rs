//! # Luthier Site
//!
//! Core of a brochure site for an instrument workshop: a landing page with a
//! filterable photo gallery and a contact form, plus the validation and
//! submission logic behind that form.
//!
//! # Architecture
//!
//! Everything is plain data transformed by small, separately testable pieces:
//!
//! ```text
//! RawFormInput ──validate──▶ ContactSubmission ──submit──▶ SubmissionState
//!                  (locale)                      (sender)   idle → submitting
//!                                                            → success | error
//!                                                            → idle (after 5s)
//!
//! gallery.toml ──load──▶ GalleryCollection ──filter(category, term)──▶ visible items
//!
//! site.toml + gallery.toml + about.md ──generate──▶ dist/index.html
//! ```
//!
//! Validation is pure and synchronous. Sending is the only async step and
//! goes through the [`submission::ContactSender`] trait, so the pipeline never
//! knows whether it talks to an email API, an outbox directory, or the demo
//! sender.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`contact`] | Contact form schema: field rules, Spanish messages, `FieldErrors` |
//! | [`locale`] | Regional tables: phone pattern, instrument catalog, budget bands, currency |
//! | [`submission`] | Submission state machine with timed reset, senders |
//! | [`gallery`] | Gallery collection, category/search filtering, category counts |
//! | [`theme`] | Light/dark/system preference over a key-value store |
//! | [`config`] | `site.toml` loading, validation, merging, and CSS generation |
//! | [`generate`] | Renders the landing page using Maud |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Parse, Don't Validate
//!
//! A [`contact::ContactSubmission`] can only come out of
//! [`contact::ContactValidator::validate`]. Its fields are private, so a
//! sender never sees unchecked input.
//!
//! ## Derived Gallery Views
//!
//! The filter holds only `(category, search term)`. Visible items and counts
//! are recomputed from the immutable collection on every call, so there is no
//! cached view to invalidate.
//!
//! ## Generation-Guarded Reset
//!
//! The success/error banner returns to idle after a delay. Each submit bumps a
//! generation counter and a pending reset only fires if its generation is
//! still current, so a quick second submit is never cut short by the first
//! one's timer.
//!
//! ## Region As Data
//!
//! The Venezuelan (cuatro) and Spanish (guitar) variants differ only in
//! tables: phone pattern, catalog, budgets, currency. Both are a
//! [`locale::LocaleConfig`] value selected by `locale` in `site.toml`.

pub mod config;
pub mod contact;
pub mod gallery;
pub mod generate;
pub mod locale;
pub mod output;
pub mod submission;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_helpers;
