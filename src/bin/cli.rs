//! Superset Embedded CLI
//!
//! Command-line tools around the embedded page:
//! - Compute retry decisions for a page URL
//! - Validate handshake envelopes
//! - Resolve embedded routes
//! - Fetch embedded dashboard metadata with a guest token
//! - Run a simulated embedding session

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

use superset_embedded::client::GuestClientSettings;
use superset_embedded::config::{generate_default_config, Config};
use superset_embedded::embedded::{current_attempt, next_attempt, EmbeddedRoute, RetryDecision};
use superset_embedded::host::run_simulation;
use superset_embedded::logging::init_tracing;
use superset_embedded::protocol::{validate_message, OriginPolicy};
use superset_embedded::{ApiClient, SupersetClient};

#[derive(Parser)]
#[command(name = "superset-embedded-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tools for the Superset embedded dashboard page")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show what the page would do after a render failure at this URL
    Retry {
        /// Current page URL
        url: String,
        /// Override the configured retry ceiling
        #[arg(long)]
        ceiling: Option<u32>,
    },

    /// Check whether a window message would be accepted as a handshake
    Validate {
        /// Message data as JSON
        json: String,
        /// Sender origin
        #[arg(long, default_value = "")]
        origin: String,
    },

    /// Resolve a location path to an embedded route
    Route {
        /// Path, e.g. /embedded/<uuid>/
        path: String,
    },

    /// Fetch embedded dashboard metadata using a guest token
    Dashboard {
        /// Embedded dashboard uuid
        uuid: String,
        /// Guest token issued by the host's backend
        #[arg(short, long, env = "SUPERSET_EMBEDDED_GUEST_TOKEN")]
        token: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a simulated host/frame session
    Simulate {
        /// Page URL the frame is loaded at
        #[arg(long, default_value = "http://localhost:8088/embedded/00000000-0000-0000-0000-000000000000/")]
        href: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default(),
    };
    init_tracing(&config.logging);

    let json = cli.format == "json";

    match cli.command {
        Commands::Retry { url, ceiling } => {
            let location = Url::parse(&url).with_context(|| format!("Invalid URL: {url}"))?;
            let ceiling = ceiling.unwrap_or(config.embedded.retry_ceiling);
            let decision = next_attempt(&location, ceiling);

            if json {
                let value = match &decision {
                    RetryDecision::Reload { url, attempt } => {
                        serde_json::json!({"decision": "reload", "attempt": attempt, "url": url})
                    }
                    RetryDecision::Exhausted { attempt } => {
                        serde_json::json!({"decision": "exhausted", "attempt": attempt})
                    }
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Current attempt: {}", current_attempt(&location));
                println!("Ceiling:         {}", ceiling);
                match decision {
                    RetryDecision::Reload { url, attempt } => {
                        println!("Decision:        reload (attempt {})", attempt);
                        println!("Next URL:        {}", url);
                    }
                    RetryDecision::Exhausted { .. } => {
                        println!("Decision:        give up, show \"Unexpected error\"");
                    }
                }
            }
        }

        Commands::Validate { json: raw, origin } => {
            let data: serde_json::Value =
                serde_json::from_str(&raw).context("Message data is not valid JSON")?;
            let policy = OriginPolicy::from_allowed(&config.embedded.allowed_origins);

            match validate_message(&origin, &data, &policy) {
                Ok(envelope) => {
                    println!("Accepted");
                    println!("  port transfer: {}", envelope.is_port_transfer());
                }
                Err(e) => bail!("Rejected: {e}"),
            }
        }

        Commands::Route { path } => match EmbeddedRoute::parse(&path) {
            Some(EmbeddedRoute::Embedded { uuid }) => {
                println!("Embedded dashboard {uuid}");
                println!("  GET /api/v1/embedded_dashboard/{uuid}");
            }
            Some(EmbeddedRoute::LegacyDashboard { id_or_slug }) => {
                println!("Dashboard {id_or_slug}");
                println!("  GET /api/v1/dashboard/{id_or_slug}");
            }
            None => bail!("No embedded route matches {path}"),
        },

        Commands::Dashboard { uuid, token } => {
            let client = SupersetClient::new(&config.api)?;
            client.configure(GuestClientSettings::new(
                token,
                config.embedded.guest_token_header_name.as_str(),
            ));

            let embedded = client
                .embedded_dashboard(&uuid)
                .await
                .with_context(|| format!("Cannot fetch embedded dashboard {uuid} from {}", client.base_url()))?;
            let dashboard = client.dashboard(&embedded.dashboard_id.to_string()).await?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "uuid": embedded.uuid,
                        "dashboard_id": embedded.dashboard_id,
                        "title": dashboard.dashboard_title,
                    }))?
                );
            } else {
                println!("{:<12} {}", "Uuid", embedded.uuid);
                println!("{:<12} {}", "Dashboard", embedded.dashboard_id);
                println!("{:<12} {}", "Title", dashboard.dashboard_title);
            }
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &config)?;
                println!("Config written to: {}", path.display());
            } else {
                println!("{}", config);
            }
        }

        Commands::Simulate { href } => {
            let report = run_simulation(&config, &href)?;

            println!("Phase:          {:?}", report.phase);
            println!("Tokens sent:    {}", report.guest_tokens_sent);
            println!("Mounts:         {}", report.mounts);
            match report.scroll_size {
                Some(size) => println!("Scroll size:    {}x{}", size.width, size.height),
                None => println!("Scroll size:    -"),
            }
            if let Some(error) = report.undefined_method_error {
                println!("Unknown method: {}", error);
            }
            println!("Toasts:         {}", report.toasts);
        }
    }

    Ok(())
}
