//! Magpie CLI - page inspector
//!
//! Fetches a page through a same-origin relay, sizes its images, classifies
//! its links, and keeps a persisted search history.

mod config;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use magpie_core::{
    FileStore, HistoryStore, InspectConfig, InspectEvent, Inspector, InternalLinkPolicy,
    RelayClient,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "magpie")]
#[command(author, version, about = "Inspect a page's images and links", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// URL to inspect (shortcut for `magpie inspect <url>`)
    url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a URL and print the report
    Inspect {
        /// URL to inspect (free-form; http://site.com or www.site.com)
        url: String,

        /// Also search data-src / data-fallback-src attributes
        #[arg(long)]
        data_attributes: bool,

        /// Base URL of a running relay (default: start one in-process)
        #[arg(long)]
        relay: Option<String>,

        /// Output format: report, json
        #[arg(short, long, default_value = "report")]
        format: OutputFormat,

        /// Internal link rewriting: origin, resolve
        #[arg(long)]
        links: Option<LinkMode>,
    },

    /// Show the persisted search history
    History {
        /// Remove every stored entry instead of listing
        #[arg(long)]
        clear: bool,
    },

    /// Run the relay standalone
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1:9210")]
        addr: SocketAddr,
    },
}

#[derive(Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Report,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" | "text" => Ok(OutputFormat::Report),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum LinkMode {
    Origin,
    Resolve,
}

impl std::str::FromStr for LinkMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "origin" => Ok(LinkMode::Origin),
            "resolve" => Ok(LinkMode::Resolve),
            _ => Err(format!("Unknown link mode: {}", s)),
        }
    }
}

impl From<LinkMode> for InternalLinkPolicy {
    fn from(mode: LinkMode) -> Self {
        match mode {
            LinkMode::Origin => InternalLinkPolicy::OriginOnly,
            LinkMode::Resolve => InternalLinkPolicy::Resolve,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    if cli.verbose {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::EnvFilter::new("debug"))
            .init();
    }

    match cli.command {
        Some(Commands::Inspect {
            url,
            data_attributes,
            relay,
            format,
            links,
        }) => {
            run_inspect(&url, data_attributes, relay, format, links).await?;
        }
        Some(Commands::History { clear }) => {
            run_history(clear)?;
        }
        Some(Commands::Serve { addr }) => {
            run_serve(addr).await?;
        }
        None => {
            if let Some(url) = cli.url {
                run_inspect(&url, false, None, OutputFormat::Report, None).await?;
            } else {
                // Nothing to do without a URL
                eprintln!("Usage: magpie <url>  (or `magpie --help`)");
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

async fn run_inspect(
    url: &str,
    data_attributes: bool,
    relay: Option<String>,
    format: OutputFormat,
    links: Option<LinkMode>,
) -> Result<()> {
    let config = Config::load()?;

    let inspect_config = InspectConfig {
        use_data_fallback: data_attributes || config.general.data_attributes,
        link_policy: links.map(Into::into).unwrap_or_else(|| config.link_policy()),
    };

    let relay_base = resolve_relay(relay.or_else(|| config.general.relay.clone())).await?;
    let inspector_relay = RelayClient::new(relay_base);
    let mut inspector = Inspector::new(inspector_relay, open_history(), inspect_config);

    let page = inspector
        .inspect(url, |event| {
            if let InspectEvent::ImageLoaded { loaded, total } = event {
                eprintln!("Loaded {} of {} images", loaded, total);
            }
        })
        .await?;

    match format {
        OutputFormat::Report => print!("{}", report::render_page(&page)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
    }

    Ok(())
}

fn run_history(clear: bool) -> Result<()> {
    let mut history = HistoryStore::new(open_store());
    if clear {
        history.clear()?;
        println!("History cleared.");
    } else {
        print!("{}", report::render_history(&history.list()));
    }
    Ok(())
}

async fn run_serve(addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Relay listening on http://{}", listener.local_addr()?);
    magpie_relay::serve_on(listener).await
}

/// Use the given relay base, or start an in-process relay on an ephemeral
/// local port.
async fn resolve_relay(base: Option<String>) -> Result<Url> {
    if let Some(base) = base {
        return Ok(Url::parse(&base)?);
    }
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://{}", listener.local_addr()?);
    tokio::spawn(async move {
        if let Err(err) = magpie_relay::serve_on(listener).await {
            tracing::error!("In-process relay stopped: {}", err);
        }
    });
    Ok(Url::parse(&base)?)
}

fn open_history() -> HistoryStore<FileStore> {
    HistoryStore::new(open_store())
}

fn open_store() -> FileStore {
    FileStore::open().unwrap_or_else(|| FileStore::at(PathBuf::from(".magpie")))
}
