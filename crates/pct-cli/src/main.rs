use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pct", version, about = "Persisted claims token CLI")]
struct Cli {
    /// Path to pct.toml (defaults to $PCT_CONFIG, then ./pct.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create and persist a fresh token for a client
    Create {
        #[arg(long)]
        client: String,
    },

    /// Show a token by code
    Show { code: String },

    /// Merge claims into the authoritative token of a flow
    Merge {
        #[arg(long)]
        client: String,

        /// Code of the caller's current token
        #[arg(long)]
        current: Option<String>,

        /// Ticket-scoped token code carried by the first pending grant
        #[arg(long)]
        ticket: Option<String>,

        /// Identity claims as a JSON object, e.g. '{"sub":"alice"}'
        #[arg(long)]
        claims: Option<String>,
    },

    /// Delete tokens by code (missing codes are ignored)
    Delete {
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Delete expired tokens
    Sweep {
        /// Reference instant (RFC 3339). Defaults to now.
        #[arg(long, conflicts_with = "every")]
        now: Option<String>,

        /// Keep sweeping at this interval (e.g. "10m") until interrupted
        #[arg(long)]
        every: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;
    let service = commands::open_service(&config)?;

    match cli.cmd {
        Command::Create { client } => commands::token::create(&service, &client).await?,
        Command::Show { code } => commands::token::show(&service, &code).await?,
        Command::Merge {
            client,
            current,
            ticket,
            claims,
        } => {
            commands::token::merge(
                &service,
                &client,
                current.as_deref(),
                ticket.as_deref(),
                claims.as_deref(),
            )
            .await?
        }
        Command::Delete { codes } => commands::token::delete(&service, &codes).await?,
        Command::Sweep { now, every } => match every {
            Some(every) => commands::sweep::run_periodic(&service, &every).await?,
            None => commands::sweep::run_once(&service, now.as_deref()).await?,
        },
    }

    Ok(())
}
