//! GA4 event debugger CLI.
//!
//! Drives the instrumented demo site through the debugger, builds UTM-tagged
//! links, and inspects exported event files.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use debugger::{
    default_config_toml, read_export, DataLayer, Debugger, DebuggerConfig, EventRow, EventSink,
    JsonlSink, Session,
};
use demo_site::shop::{INITIAL_PAGE_VIEW_DELAY, ITEM_LIST_DELAY};
use demo_site::{track_label, AudioTracker, LandingPage, Scenario, ScriptedWidget, SitePage};
use tag_events::{Counters, Filter, SystemClock};
use utm_builder::UtmBuilder;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ga4-debugger")]
#[command(about = "GA4 event debugger with an instrumented demo site")]
struct Args {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Debugger configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a seeded shopper against the demo site and print the panel
    Demo {
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of shopper actions
        #[arg(long, default_value_t = 40)]
        steps: usize,

        /// Panel filter: all, page, ecommerce, engagement or custom
        #[arg(long, default_value = "all")]
        filter: String,

        /// Append every dataLayer record to this JSONL file
        #[arg(long)]
        data_layer: Option<PathBuf>,

        /// Export the history when the run ends
        #[arg(long)]
        export: bool,
    },

    /// Build a UTM-tagged URL
    Utm {
        /// Landing page URL (http or https)
        base_url: String,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        medium: Option<String>,

        #[arg(long)]
        campaign: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        term: Option<String>,
    },

    /// Summarize an exported events file
    Inspect {
        path: PathBuf,

        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Print the default configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<DebuggerConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(DebuggerConfig::from_file(path)?),
        None => Ok(DebuggerConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Demo {
            seed,
            steps,
            filter,
            data_layer,
            export,
        } => {
            let config = load_config(args.config.as_ref())?;
            run_demo(config, seed, steps, &filter, data_layer, export).await
        }
        Commands::Utm {
            base_url,
            source,
            medium,
            campaign,
            content,
            term,
        } => {
            let config = load_config(args.config.as_ref())?;
            let fields = UtmFields {
                source,
                medium,
                campaign,
                content,
                term,
            };
            run_utm(config, &base_url, fields)
        }
        Commands::Inspect { path, filter } => {
            let config = load_config(args.config.as_ref())?;
            run_inspect(config, &path, &filter)
        }
        Commands::Config => {
            print!("{}", default_config_toml()?);
            Ok(())
        }
    }
}

async fn run_demo(
    config: DebuggerConfig,
    seed: u64,
    steps: usize,
    filter: &str,
    data_layer: Option<PathBuf>,
    export: bool,
) -> Result<(), Box<dyn Error>> {
    println!("GA4 Event Debugger");
    println!("==================");
    println!("Seed: {}", seed);
    println!("Steps: {}", steps);
    println!();

    let sink: Box<dyn EventSink> = match &data_layer {
        Some(path) => Box::new(JsonlSink::append(path)?),
        None => Box::new(DataLayer::new()),
    };
    let debugger = Debugger::new(config, sink, Arc::new(SystemClock))?;
    let (session, handle) = Session::new(debugger);
    let runner = tokio::spawn(session.run());

    let mut producer = handle.clone();

    let landing = LandingPage::new(SitePage::Home);
    landing.load(&mut producer);
    landing.hover_image("img-hero", &mut producer);
    landing.navigation_click(Some("playlist"), &mut producer);

    let widget = Arc::new(ScriptedWidget::new(Duration::from_millis(50)));
    widget.seek(Duration::from_secs(42));
    let mut audio = AudioTracker::new(track_label(Some("Night Drive"), 0), widget, handle.clone());
    if let Some(play) = audio.on_play() {
        play.await?;
    }
    audio.on_pause().await?;

    let mut scenario = Scenario::new(seed);
    scenario.shop().open(&mut producer);
    let actions = scenario.run(steps, &mut producer)?;
    tracing::info!("Shopper performed {} actions", actions.len());

    // Let delayed page views and item lists land
    tokio::time::sleep(INITIAL_PAGE_VIEW_DELAY + ITEM_LIST_DELAY).await;

    producer.set_filter(filter);
    if export {
        producer.export();
    }
    producer.shutdown();
    drop(audio);
    drop(producer);
    drop(handle);

    let debugger = runner.await?;
    print!("{}", debugger.panel());

    if let Some(path) = data_layer {
        println!();
        println!("dataLayer records appended to {}", path.display());
    }
    Ok(())
}

struct UtmFields {
    source: Option<String>,
    medium: Option<String>,
    campaign: Option<String>,
    content: Option<String>,
    term: Option<String>,
}

fn run_utm(config: DebuggerConfig, base_url: &str, fields: UtmFields) -> Result<(), Box<dyn Error>> {
    let mut debugger = Debugger::new(config, Box::new(DataLayer::new()), Arc::new(SystemClock))?;
    let mut builder = UtmBuilder::default();

    builder.load(&mut debugger);
    if !builder.input_base_url(base_url, &mut debugger) {
        return Err(format!("invalid base URL: '{}'", base_url).into());
    }
    if let Some(source) = &fields.source {
        builder.select_source(source, &mut debugger)?;
    }
    if let Some(medium) = &fields.medium {
        builder.select_medium(medium, &mut debugger)?;
    }
    builder.set_campaign(fields.campaign.as_deref().unwrap_or_default());
    builder.set_content(fields.content.as_deref().unwrap_or_default());
    builder.set_term(fields.term.as_deref().unwrap_or_default());

    let generated = builder.generate()?;
    println!("{}", generated.url);
    for (key, value) in &generated.breakdown {
        println!("  {:<13} {}", key, value);
    }

    if !generated.is_untagged() {
        let mut clipboard = String::new();
        builder.copy(&mut clipboard, &mut debugger)?;
    }
    println!();
    print!("{}", debugger.panel());
    Ok(())
}

fn run_inspect(config: DebuggerConfig, path: &Path, filter: &str) -> Result<(), Box<dyn Error>> {
    let events = read_export(path)?;
    let filter = Filter::parse_lossy(filter);

    let mut counters = Counters::default();
    for event in &events {
        counters.record(event.category);
    }

    println!("{}", path.display());
    println!(
        "Events: {} | Page views: {} | Ecommerce: {} | Filter: {}",
        counters.total, counters.page_views, counters.ecommerce_events, filter
    );

    let rows: Vec<EventRow> = events
        .iter()
        .filter(|event| event.matches(filter))
        .take(config.render.max_rows)
        .map(|event| EventRow::from_event(event, &config.render))
        .collect();
    if rows.is_empty() {
        println!("  No events match this filter");
    }
    for row in rows {
        print!("  [{:<10}] {} {}", row.category, row.time, row.name);
        for param in &row.preview {
            print!("  {}: {}", param.key, param.value);
        }
        println!();
    }
    Ok(())
}
