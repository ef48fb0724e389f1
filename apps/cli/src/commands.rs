//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use monotone_content::resolver_from_config;
use monotone_core::{CycleOutcome, RenderedContent, Route, RouteLoader, TutorialIndex};
use monotone_markdown::{RenderOptions, RenderedDocument, renderer_for};
use monotone_shared::{AppConfig, ContentSource, RouteParam, init_config, load_config, validate};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Monotone: miscellaneous tutorials in your terminal.
#[derive(Parser)]
#[command(
    name = "monotone",
    version,
    about = "List and read Monotone tutorials.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Content backend: bundled, dir, or http (overrides config).
    #[arg(long, global = true)]
    pub source: Option<ContentSource>,

    /// Directory of `<id>.md` files (overrides config, implies --source dir).
    #[arg(long, global = true)]
    pub dir: Option<String>,

    /// Base URL serving `<id>.md` files (overrides config, implies --source http).
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List tutorials in display order.
    List {
        /// Print the index as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Load and render one tutorial.
    Show {
        /// Tutorial id (`3`) or route (`#/tutorial/3`).
        target: String,

        /// Print HTML instead of plain text.
        #[arg(long)]
        html: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "monotone=warn",
        1 => "monotone=info",
        2 => "monotone=debug",
        _ => "monotone=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
///
/// Config is resolved per handler; `config init` never reads the existing
/// file so it can replace an invalid one.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::List { json } => cmd_list(&resolve_config(&cli)?, *json),
        Command::Show { target, html } => cmd_show(&resolve_config(&cli)?, target, *html).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        },
    }
}

/// Merge CLI overrides into the loaded config file.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = load_config()?;
    apply_overrides(&mut config, cli);
    validate(&config)?;
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(dir) = &cli.dir {
        config.content.dir = dir.clone();
        config.content.source = ContentSource::Dir;
    }
    if let Some(base_url) = &cli.base_url {
        config.content.base_url = base_url.clone();
        config.content.source = ContentSource::Http;
    }
    if let Some(source) = cli.source {
        config.content.source = source;
    }
}

/// Interpret a `show` target as a route parameter.
fn target_param(target: &str) -> Result<RouteParam> {
    if target.starts_with('#') || target.starts_with('/') {
        return match Route::parse(target) {
            Route::Tutorial(param) => Ok(param),
            other => Err(eyre!("'{target}' is not a tutorial route (parsed as {other})")),
        };
    }
    Ok(RouteParam::new(target))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_list(config: &AppConfig, json: bool) -> Result<()> {
    let index = TutorialIndex::from_config(&config.content)?;
    info!(entries = index.len(), "listing tutorials");

    if json {
        println!("{}", serde_json::to_string_pretty(index.list())?);
        return Ok(());
    }

    if index.is_empty() {
        println!("No tutorials.");
        return Ok(());
    }

    for entry in index.list() {
        println!(
            "  {:>3}  {}  ({})",
            entry.id,
            entry.title,
            entry.created_at.format("%Y-%m-%d")
        );
        println!("       {}", entry.description);
    }

    Ok(())
}

async fn cmd_show(config: &AppConfig, target: &str, html: bool) -> Result<()> {
    let param = target_param(target)?;
    let resolver = resolver_from_config(&config.content)?;
    let renderer = renderer_for(RenderOptions::from(&config.render));
    let loader = RouteLoader::new(resolver, renderer);

    info!(%param, source = ?config.content.source, "showing tutorial");

    let handle = loader
        .set_route(Some(param.clone()))
        .ok_or_else(|| eyre!("loader did not start a cycle for '{param}'"))?;

    let spinner = Spinner::new(&format!("Loading tutorial {param}"));
    let outcome = handle.wait().await;
    spinner.finish();

    if outcome == CycleOutcome::Superseded {
        return Err(eyre!("load of '{param}' was superseded"));
    }

    match loader.state().content {
        RenderedContent::Loaded { document, .. } => {
            if html {
                print!("{}", document.html);
            } else {
                print!("{}", html_to_text(&document.html));
            }
            eprintln!("{}", summary_line(&param, &document));
            Ok(())
        }
        RenderedContent::NotFound { param } => Err(eyre!("no tutorial found for '{param}'")),
        RenderedContent::Failed { param, message } => {
            Err(eyre!("failed to load tutorial '{param}': {message}"))
        }
        RenderedContent::Placeholder => Err(eyre!("nothing was loaded for '{param}'")),
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

/// One-line description of a loaded tutorial for stderr.
fn summary_line(param: &RouteParam, document: &RenderedDocument) -> String {
    let title = document.title.as_deref().unwrap_or("untitled");
    let unit = if document.word_count == 1 { "word" } else { "words" };
    format!("#/tutorial/{param}: {title} ({} {unit})", document.word_count)
}

/// Flatten rendered HTML to its text content.
fn html_to_text(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    let mut out = text.trim().to_string();
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// Spinner
// ---------------------------------------------------------------------------

/// Spinner on stderr while a load cycle is in flight.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn new(msg: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(msg.to_string());
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}
