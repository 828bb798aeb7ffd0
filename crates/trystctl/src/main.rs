//! trystctl: Command-line interface for the Tryst relay.
//!
//! Posts offers and answers, and inspects the offers currently waiting on a
//! relay.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tryst::client::{ConnectConfig, DEFAULT_ENDPOINT};

/// Command-line interface for the Tryst offer/answer relay.
#[derive(Parser)]
#[command(name = "trystctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Relay endpoint (e.g., http://localhost:8080)
    #[arg(short, long, env = "TRYST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Post an offer and wait for its answer
    Offer {
        /// Uid to publish the offer under
        uid: String,
        /// Offer JSON (or use --file, or stdin)
        payload: Option<String>,
        /// Read offer from file
        #[arg(short, long)]
        file: Option<String>,
        /// Number of posts before giving up when no answer arrives in time
        #[arg(long, default_value = "10")]
        attempts: u32,
    },
    /// Answer the offer waiting under a uid
    Answer {
        /// Uid of the waiting offer
        uid: String,
        /// Answer JSON (or use --file, or stdin)
        payload: Option<String>,
        /// Read answer from file
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Inspect pending offers
    Offers {
        #[command(subcommand)]
        action: OffersAction,
    },
}

#[derive(Subcommand)]
enum OffersAction {
    /// List uids of all pending offers
    List,
    /// Show the offer pending under a uid
    Describe { uid: String },
    /// Pick any pending offer
    Match {
        /// Never pick this uid (usually your own)
        #[arg(long)]
        exclude: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ConnectConfig {
        endpoint: cli.endpoint,
        ..ConnectConfig::default()
    };

    match cli.command {
        Commands::Offer {
            uid,
            payload,
            file,
            attempts,
        } => {
            let config = ConnectConfig {
                offer_attempts: attempts,
                ..config
            };
            commands::offer::run(config, &uid, payload, file, cli.output).await?;
        }
        Commands::Answer { uid, payload, file } => {
            commands::answer::run(config, &uid, payload, file, cli.output).await?;
        }
        Commands::Offers { action } => match action {
            OffersAction::List => commands::offers::list(config, cli.output).await?,
            OffersAction::Describe { uid } => {
                commands::offers::describe(config, &uid, cli.output).await?
            }
            OffersAction::Match { exclude } => {
                commands::offers::matching(config, exclude.as_deref(), cli.output).await?
            }
        },
    }

    Ok(())
}
