//! Landing page generation.
//!
//! Reads the content directory and renders the whole brochure site as one
//! static page.
//!
//! ## Sections
//!
//! - **Navbar**: logo plus anchors to each section and the theme toggle
//! - **Hero** (`#hero`): headline from `[hero]`
//! - **About** (`#about`): `about.md` converted to HTML (optional)
//! - **Gallery** (`#gallery`): category buttons with counts, search box, one
//!   card per `gallery.toml` item
//! - **Contact** (`#contact`): the contact form with the locale's instrument
//!   and budget options, plus contact details
//! - **Footer**: social links, section links, email and phone
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html          # The landing page
//! └── ...                 # Everything under content/assets/, copied as-is
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/site.js`: Theme toggle, gallery filtering, form submission
//!
//! The script mirrors the Rust behaviour: the theme is stored under the same
//! `theme` key, filtering follows the rules in [`crate::gallery`], and the
//! form banner resets after `submission.reset_after`.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, ConfigError, SiteConfig};
use crate::contact::Field;
use crate::gallery::{CategoryCounts, CategoryFilter, GalleryCollection, GalleryError, GalleryItem};
use crate::locale::{LocaleConfig, SelectOption};
use crate::theme::THEME_KEY;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Markdown body of the about section, within the content directory.
pub const ABOUT_FILENAME: &str = "about.md";
/// Directory copied verbatim to the output root.
pub const ASSETS_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
}

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub index_path: PathBuf,
    pub gallery_items: usize,
    pub featured_items: usize,
    pub has_about: bool,
    pub assets_copied: usize,
}

/// Everything the page template needs.
pub struct LandingPage<'a> {
    pub config: &'a SiteConfig,
    pub gallery: &'a GalleryCollection,
    /// Raw markdown of the about section.
    pub about: Option<&'a str>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

const NAV_LINKS: [(&str, &str); 4] = [
    ("Inicio", "#hero"),
    ("Sobre Mí", "#about"),
    ("Galería", "#gallery"),
    ("Contacto", "#contact"),
];

/// Build the site from `source` into `output_dir`.
pub fn generate(source: &Path, output_dir: &Path) -> Result<BuildSummary, GenerateError> {
    let config = config::load_config(source)?;
    let gallery = GalleryCollection::load(source)?;
    let about = read_about(source)?;

    let page = LandingPage {
        config: &config,
        gallery: &gallery,
        about: about.as_deref(),
    };

    fs::create_dir_all(output_dir)?;
    let index_path = output_dir.join("index.html");
    fs::write(&index_path, render_page(&page).into_string())?;
    tracing::info!(path = %index_path.display(), "generated landing page");

    let assets = source.join(ASSETS_DIR);
    let assets_copied = if assets.is_dir() {
        copy_dir_recursive(&assets, output_dir)?
    } else {
        0
    };
    tracing::debug!(count = assets_copied, "copied assets");

    Ok(BuildSummary {
        index_path,
        gallery_items: gallery.len(),
        featured_items: gallery.featured().len(),
        has_about: about.is_some(),
        assets_copied,
    })
}

fn read_about(source: &Path) -> Result<Option<String>, std::io::Error> {
    let path = source.join(ABOUT_FILENAME);
    if !path.exists() {
        return Ok(None);
    }
    let body = fs::read_to_string(path)?;
    Ok((!body.trim().is_empty()).then_some(body))
}

/// Copies `src` into `dst`, returning the number of files copied.
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the full landing page.
pub fn render_page(page: &LandingPage) -> Markup {
    let config = page.config;
    let locale = config.locale_config();
    let counts = page.gallery.category_counts();

    let content = html! {
        a.skip-link href="#main-content" { "Saltar al contenido principal" }
        (render_navbar(config))
        main id="main-content" {
            (render_hero(config))
            @if let Some(about) = page.about {
                (render_about(about))
            }
            (render_gallery(page.gallery.items(), &counts))
            (render_contact(config, &locale))
        }
        (render_footer(config, &locale))
    };

    base_document(config, &locale, content)
}

/// Renders the base HTML document structure with SEO metadata
fn base_document(config: &SiteConfig, locale: &LocaleConfig, content: Markup) -> Markup {
    let site = &config.site;
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    );
    let og_image = absolute_url(&site.url, &site.og_image);

    html! {
        (DOCTYPE)
        html lang=(locale.html_lang) data-theme=(config.theme.default.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (site.title) }
                meta name="description" content=(site.description);
                @if !site.keywords.is_empty() {
                    meta name="keywords" content=(site.keywords.join(", "));
                }
                meta name="author" content=(site.name);
                meta name="generator" content=(concat!("luthier-site ", env!("CARGO_PKG_VERSION")));
                meta name="robots" content="index, follow";
                link rel="canonical" href=(site.url);
                meta name="theme-color" media="(prefers-color-scheme: light)" content=(config.colors.light.background);
                meta name="theme-color" media="(prefers-color-scheme: dark)" content=(config.colors.dark.background);
                meta property="og:type" content="website";
                meta property="og:locale" content=(locale.og_locale);
                meta property="og:url" content=(site.url);
                meta property="og:site_name" content=(site.name);
                meta property="og:title" content=(site.title);
                meta property="og:description" content=(site.description);
                meta property="og:image" content=(og_image);
                meta name="twitter:card" content="summary_large_image";
                meta name="twitter:title" content=(site.title);
                meta name="twitter:description" content=(site.description);
                meta name="twitter:image" content=(og_image);
                @if let Some(handle) = &site.twitter_handle {
                    meta name="twitter:site" content=(handle);
                    meta name="twitter:creator" content=(handle);
                }
                // Applied before first paint so a stored theme never flashes.
                script {
                    (PreEscaped(format!(
                        "(function(){{try{{var t=localStorage.getItem('{THEME_KEY}');if(t==='light'||t==='dark')document.documentElement.dataset.theme=t;}}catch(e){{}}}})();"
                    )))
                }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Joins a site-relative path onto the canonical URL.
fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn render_navbar(config: &SiteConfig) -> Markup {
    html! {
        header.navbar {
            a.logo href="#hero" { (config.site.name) }
            input.nav-toggle type="checkbox" id="nav-toggle";
            label.nav-hamburger for="nav-toggle" aria-label="Abrir menú" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            nav.site-nav {
                ul {
                    @for (label, href) in NAV_LINKS {
                        li { a href=(href) { (label) } }
                    }
                }
            }
            (theme_toggle())
        }
    }
}

fn theme_toggle() -> Markup {
    html! {
        button.theme-toggle type="button" data-theme-toggle aria-label="Cambiar tema" {
            span.icon-light aria-hidden="true" { "☀" }
            span.icon-dark aria-hidden="true" { "☾" }
        }
    }
}

fn render_hero(config: &SiteConfig) -> Markup {
    let hero = &config.hero;
    html! {
        section.hero id="hero" {
            div.hero-text {
                h1 {
                    span.headline { (hero.headline) }
                    " "
                    span.highlight { (hero.highlight) }
                }
                p { (hero.text) }
                div.hero-actions {
                    a.button.primary href="#gallery" { "Ver Galería" }
                    a.button.secondary href="#contact" { "Encargar Instrumento" }
                }
            }
            @if let Some(image) = &hero.image {
                img.hero-image src=(image) alt=(format!("{} {}", hero.headline, hero.highlight));
            }
        }
    }
}

fn render_about(markdown: &str) -> Markup {
    let parser = Parser::new(markdown);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    html! {
        section.about id="about" {
            article.about-content {
                (PreEscaped(body_html))
            }
        }
    }
}

/// Renders the gallery section: filter buttons, search box, column toggle,
/// every card and the lightbox.
///
/// All items are rendered; `site.js` hides the ones the current filter
/// excludes. Cards carry their category and lowercased search text as data
/// attributes.
pub fn render_gallery(items: &[GalleryItem], counts: &CategoryCounts) -> Markup {
    html! {
        section.gallery id="gallery" {
            h2 { "Galería" }
            div.gallery-controls {
                div.category-filters role="group" aria-label="Filtrar por categoría" {
                    @for (filter, count) in counts.iter() {
                        (category_button(filter, count))
                    }
                }
                input.gallery-search type="search" data-gallery-search
                    placeholder="Buscar en la galería..." aria-label="Buscar en la galería";
                div.grid-toggle role="group" aria-label="Columnas de la galería" {
                    @for cols in [2, 3] {
                        (grid_button(cols))
                    }
                }
            }
            div.gallery-grid data-cols=(DEFAULT_GRID_COLS) {
                @for item in items {
                    (gallery_card(item))
                }
            }
            p.gallery-empty data-gallery-empty hidden {
                "No se encontraron imágenes"
            }
            (lightbox())
        }
    }
}

/// Columns the gallery grid starts with on wide screens.
const DEFAULT_GRID_COLS: u8 = 3;

fn grid_button(cols: u8) -> Markup {
    let active = cols == DEFAULT_GRID_COLS;
    html! {
        button.grid-button.active[active] type="button"
            data-grid-cols=(cols)
            aria-label=(format!("{cols} columnas"))
            aria-pressed=(if active { "true" } else { "false" }) {
            (cols)
        }
    }
}

/// Single `<dialog>` reused for every card; `site.js` fills it on click.
/// A native modal dialog closes on Escape.
fn lightbox() -> Markup {
    html! {
        dialog.lightbox data-lightbox aria-label="Imagen ampliada" {
            form method="dialog" {
                button.lightbox-close type="submit" aria-label="Cerrar" { "×" }
            }
            img data-lightbox-image src="" alt="";
            div.lightbox-caption {
                h3 data-lightbox-title {}
                p data-lightbox-description {}
            }
        }
    }
}

fn category_button(filter: CategoryFilter, count: usize) -> Markup {
    let active = filter == CategoryFilter::All;
    html! {
        button.filter-button.active[active] type="button"
            data-filter=(filter.as_str())
            title=(filter.description())
            aria-pressed=(if active { "true" } else { "false" }) {
            (filter.name())
            " "
            span.count { (count) }
        }
    }
}

fn gallery_card(item: &GalleryItem) -> Markup {
    html! {
        figure.gallery-card.featured[item.featured]
            data-id=(item.id)
            data-category=(item.category.as_str())
            data-search=(search_text(item)) {
            button.card-open type="button"
                data-lightbox-open
                data-title=[item.title.as_deref()]
                data-description=[item.description.as_deref()]
                aria-haspopup="dialog"
                aria-label=(format!("Ampliar: {}", item.title.as_deref().unwrap_or(&item.alt))) {
                img src=(item.src) alt=(item.alt) loading="lazy";
            }
            @if item.featured {
                span.badge { "Destacado" }
            }
            @if item.title.is_some() || item.description.is_some() {
                figcaption {
                    @if let Some(title) = &item.title {
                        h3 { (title) }
                    }
                    @if let Some(description) = &item.description {
                        p { (description) }
                    }
                }
            }
        }
    }
}

/// Lowercased title, description and alt text joined for client-side search.
fn search_text(item: &GalleryItem) -> String {
    [
        item.title.as_deref(),
        item.description.as_deref(),
        Some(item.alt.as_str()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
    .to_lowercase()
}

/// Renders the contact section with the locale's select options.
pub fn render_contact(config: &SiteConfig, locale: &LocaleConfig) -> Markup {
    let contact = &config.contact;
    let reset_ms = config.submission.reset_after.as_millis().to_string();

    html! {
        section.contact id="contact" {
            h2 {
                "Encarga "
                span.highlight { "Tu Instrumento" }
            }
            div.contact-layout {
                form.contact-form
                    action=[contact.form_action.as_deref()]
                    method="post"
                    novalidate
                    data-contact-form
                    data-reset-after=(reset_ms) {
                    div.form-status.success data-status="success" role="status" hidden {
                        p { strong { "¡Mensaje enviado exitosamente!" } }
                        p { "Te contactaremos pronto." }
                    }
                    div.form-status.error data-status="error" role="alert" hidden {
                        p { strong { "Error al enviar el mensaje" } }
                        p { "Por favor intenta nuevamente o contáctanos directamente." }
                    }
                    (text_field(Field::Name, "Nombre completo", "text", "Tu nombre", 2, 50))
                    (text_field(Field::Email, "Email", "email", "tu@email.com", 1, 100))
                    (text_field(Field::Phone, "Teléfono", "tel", &phone_placeholder(locale), 0, 20))
                    (select_field(Field::InstrumentType, "Tipo de instrumento", "Selecciona un tipo (opcional)", &locale.instruments))
                    (select_field(Field::Budget, "Presupuesto estimado", "Selecciona un rango (opcional)", &locale.budgets))
                    (text_field(Field::Subject, "Asunto", "text", "Describe brevemente tu consulta", 5, 100))
                    div.field {
                        label for=(Field::Message.as_str()) { "Mensaje *" }
                        textarea id=(Field::Message.as_str()) name=(Field::Message.as_str())
                            rows="6" required minlength="10" maxlength="1000"
                            placeholder="Cuéntanos más detalles sobre lo que necesitas." {}
                    }
                    button.button.primary type="submit" data-submit {
                        span.label-idle { "Enviar Mensaje" }
                        span.label-submitting { "Enviando..." }
                    }
                }
                aside.contact-details {
                    dl {
                        dt { "Email" }
                        dd { a href=(format!("mailto:{}", contact.email)) { (contact.email) } }
                        @if let Some(phone) = &contact.phone {
                            dt { "Teléfono" }
                            dd { a href=(format!("tel:{}", phone_href(phone))) { (locale.format_phone(phone)) } }
                        }
                        @if let Some(address) = &contact.address {
                            dt { "Ubicación" }
                            dd { (address) }
                        }
                        @if let Some(hours) = &contact.hours {
                            dt { "Horario" }
                            dd { (hours) }
                        }
                    }
                }
            }
        }
    }
}

fn text_field(
    field: Field,
    label: &str,
    input_type: &str,
    placeholder: &str,
    min: usize,
    max: usize,
) -> Markup {
    let required = !field.is_optional();
    let key = field.as_str();
    html! {
        div.field {
            label for=(key) {
                (label)
                @if required { " *" }
            }
            input id=(key) name=(key) type=(input_type) placeholder=(placeholder)
                required[required]
                minlength=[(min > 0).then_some(min)]
                maxlength=(max);
        }
    }
}

fn select_field(field: Field, label: &str, prompt: &str, options: &[SelectOption]) -> Markup {
    let key = field.as_str();
    html! {
        div.field {
            label for=(key) { (label) }
            select id=(key) name=(key) {
                option value="" { (prompt) }
                @for option in options {
                    option value=(option.value) { (option.label) }
                }
            }
        }
    }
}

/// A sample international number, formatted the way the locale displays it.
fn phone_placeholder(locale: &LocaleConfig) -> String {
    let format = &locale.phone_format;
    let digits: String = format
        .groups
        .iter()
        .enumerate()
        .map(|(i, len)| {
            let base = if i == 0 { "412" } else { "345" };
            base.chars().cycle().take(*len).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("+{} {}", format.country_code, digits)
}

fn phone_href(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
}

fn render_footer(config: &SiteConfig, locale: &LocaleConfig) -> Markup {
    let contact = &config.contact;
    html! {
        footer.site-footer {
            div.footer-brand {
                span.logo { (config.site.name) }
                p { (config.site.description) }
                ul.social {
                    @for (label, url) in config.social.entries() {
                        li { a href=(url) target="_blank" rel="noopener noreferrer" aria-label=(label) { (label) } }
                    }
                    li { a href=(format!("mailto:{}", contact.email)) aria-label="Email" { "Email" } }
                }
            }
            nav.footer-nav aria-label="Enlaces del pie de página" {
                ul {
                    @for (label, href) in NAV_LINKS {
                        li { a href=(href) { (label) } }
                    }
                }
            }
            div.footer-contact {
                @if let Some(address) = &contact.address {
                    p { (address) }
                }
                @if let Some(phone) = &contact.phone {
                    p { a href=(format!("tel:{}", phone_href(phone))) { (locale.format_phone(phone)) } }
                }
                p { a href=(format!("mailto:{}", contact.email)) { (contact.email) } }
            }
            p.copyright { "© " (config.site.name) ". Todos los derechos reservados." }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
