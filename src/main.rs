use clap::{Parser, Subcommand, ValueEnum};
use luthier_site::contact::{ContactValidator, RawFormInput};
use luthier_site::gallery::{CategoryFilter, GalleryCollection, GalleryFilter};
use luthier_site::submission::{
    ContactSender, OutboxSender, SimulatedSender, SubmissionPipeline, SubmissionState,
};
use luthier_site::theme::{JsonFileStore, ResolvedTheme, ThemePreference, ThemeStore};
use luthier_site::{config, generate, output};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "luthier-site")]
#[command(about = "Brochure site and contact pipeline for a luthier workshop")]
#[command(long_about = "\
Brochure site and contact pipeline for a luthier workshop

Builds a single landing page (hero, about, filterable gallery, contact form)
from a content directory, and runs the same contact-form validation and
submission flow from the command line.

Content structure:

  content/
  ├── site.toml        # Site config (optional; locale, SEO, contact, colors)
  ├── gallery.toml     # Gallery items ([[items]] tables)
  ├── about.md         # About section body (optional)
  └── assets/          # Copied verbatim to the output root

Run 'luthier-site gen-config' to generate a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the landing page into the output directory
    Build,
    /// Validate site.toml and gallery.toml without building
    Check,
    /// Validate a contact form given as JSON
    Validate {
        /// JSON file with the form fields (camelCase keys)
        form: PathBuf,
    },
    /// Validate a contact form and submit it
    Submit {
        /// JSON file with the form fields (camelCase keys)
        form: PathBuf,
        /// Directory the submission is written to
        #[arg(long, default_value = "outbox", conflicts_with = "simulate")]
        outbox: PathBuf,
        /// Use the demo sender (2s delay, 10% failure) instead of the outbox
        #[arg(long)]
        simulate: bool,
    },
    /// List gallery items through the category and search filter
    Gallery {
        /// all, finished, process, materials or workshop
        #[arg(long, default_value = "all")]
        category: CategoryFilter,
        /// Case-insensitive text matched against title, description and alt
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show or change the stored theme preference
    Theme {
        /// light, dark or system; omit to show the current preference
        preference: Option<ThemePreference>,
        /// Flip the painted theme and store it
        #[arg(long, conflicts_with = "preference")]
        toggle: bool,
        /// What the operating system reports, for resolving `system`
        #[arg(long, value_enum, default_value = "light")]
        os: OsTheme,
        /// Preferences file
        #[arg(long, default_value = ".luthier-site/preferences.json")]
        store: PathBuf,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum OsTheme {
    Light,
    Dark,
}

impl From<OsTheme> for ResolvedTheme {
    fn from(os: OsTheme) -> Self {
        match os {
            OsTheme::Light => ResolvedTheme::Light,
            OsTheme::Dark => ResolvedTheme::Dark,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build => {
            println!("==> Building {}", cli.source.display());
            let summary = generate::generate(&cli.source, &cli.output)?;
            output::print_build_summary(&summary);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = config::load_config(&cli.source)?;
            let gallery = GalleryCollection::load(&cli.source)?;
            output::print_check_output(&site, &gallery, &cli.source);
            println!("==> Content is valid");
        }
        Command::Validate { form } => {
            let site = config::load_config(&cli.source)?;
            let validator = ContactValidator::new(site.locale_config());
            let result = validator.validate(&read_form(&form)?);
            output::print_validation(&result);
            if result.is_err() {
                std::process::exit(1);
            }
        }
        Command::Submit {
            form,
            outbox,
            simulate,
        } => {
            let site = config::load_config(&cli.source)?;
            let validator = ContactValidator::new(site.locale_config());
            let raw = read_form(&form)?;
            let reset_after = site.submission.reset_after;
            let delivered = if simulate {
                run_submit(SimulatedSender::default(), reset_after, &validator, &raw).await?
            } else {
                run_submit(OutboxSender::new(&outbox), reset_after, &validator, &raw).await?
            };
            if !delivered {
                std::process::exit(1);
            }
        }
        Command::Gallery { category, search } => {
            let gallery = GalleryCollection::load(&cli.source)?;
            let mut filter = GalleryFilter::new(&gallery);
            filter.set_category(category);
            filter.set_search(&search);
            output::print_gallery_listing(&gallery, &filter.visible_items(), filter.state());
        }
        Command::Theme {
            preference,
            toggle,
            os,
            store,
        } => {
            let site = config::load_config(&cli.source)?;
            let os = ResolvedTheme::from(os);
            let mut themes = ThemeStore::load(JsonFileStore::open(&store), site.theme.default);
            if toggle {
                themes.toggle(os)?;
            } else if let Some(preference) = preference {
                themes.set_preference(preference)?;
            }
            output::print_theme(themes.preference(), themes.resolved(os), &store);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so they never mix with command output.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();
}

fn read_form(path: &Path) -> Result<RawFormInput, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Validate and submit, printing each state the pipeline moves through.
///
/// Returns whether the submission was delivered. Exits on validation errors
/// without touching the sender.
async fn run_submit<S: ContactSender>(
    sender: S,
    reset_after: std::time::Duration,
    validator: &ContactValidator,
    raw: &RawFormInput,
) -> Result<bool, Box<dyn std::error::Error>> {
    let pipeline = SubmissionPipeline::with_reset_after(sender, reset_after);
    let mut states = pipeline.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            output::print_state_change(state);
            if state != SubmissionState::Submitting {
                break;
            }
        }
    });

    match pipeline.submit_form(validator, raw).await {
        Ok(outcome) => {
            printer.await?;
            output::print_submit_outcome(&outcome);
            Ok(outcome.is_delivered())
        }
        Err(errors) => {
            printer.abort();
            output::print_field_errors(&errors);
            std::process::exit(1);
        }
    }
}
