//! vectord: vector similarity index service and CLI client

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vectord::{
    client::Client,
    config::{ClientConfig, Config, LogFormat, LogLevel, LoggingConfig},
    daemon::Daemon,
};

#[derive(Parser)]
#[command(name = "vectord")]
#[command(about = "Vector similarity index service")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "vectord.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Base log level, replacing `logging.level` from the config file
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Where client commands send their requests
#[derive(clap::Args)]
struct Target {
    /// Daemon host
    #[arg(long)]
    host: Option<String>,

    /// Daemon port
    #[arg(long)]
    port: Option<u16>,

    /// Start an in-process daemon if none is listening locally
    #[arg(long)]
    auto_start: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daemon until Ctrl+C or SIGTERM
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create an index
    CreateIndex {
        name: String,

        /// Index type (0 flat, 2 NSW, 3 HNSW)
        #[arg(short = 't', long, default_value = "3")]
        index_type: i32,

        /// Distance method (0 L2, 1 cosine)
        #[arg(short, long, default_value = "0")]
        method: i32,

        /// Vector dimensions
        #[arg(short, long)]
        dims: u16,

        #[command(flatten)]
        target: Target,
    },

    /// Insert a vector
    Insert {
        name: String,
        id: u64,

        /// Comma-separated components
        vector: String,

        #[command(flatten)]
        target: Target,
    },

    /// Search the nearest vectors
    Search {
        name: String,

        /// Comma-separated components
        vector: String,

        /// Number of results
        #[arg(short, long, default_value = "1")]
        k: usize,

        #[command(flatten)]
        target: Target,
    },

    /// Show index info and stats
    Info {
        name: String,

        #[command(flatten)]
        target: Target,
    },

    /// List indexes
    List {
        #[command(flatten)]
        target: Target,
    },

    /// Delete a vector
    Delete {
        name: String,
        id: u64,

        #[command(flatten)]
        target: Target,
    },

    /// Destroy an index
    DropIndex {
        name: String,

        #[command(flatten)]
        target: Target,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    let mut logging = config.logging.clone();
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    init_logging(&logging, cli.verbose)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let daemon = Daemon::from_config(&config);
            daemon.run_until_signal().await?;
        }
        Commands::CreateIndex {
            name,
            index_type,
            method,
            dims,
            target,
        } => {
            let mut client = connect(&config, &target).await?;
            let info = client.create_index(&name, index_type, method, dims).await;
            finish(&mut client, info).await?;
        }
        Commands::Insert {
            name,
            id,
            vector,
            target,
        } => {
            let vector = parse_vector(&vector)?;
            let mut client = connect(&config, &target).await?;
            let inserted = client.insert_vector(&name, id, &vector).await;
            finish(&mut client, inserted).await?;
        }
        Commands::Search {
            name,
            vector,
            k,
            target,
        } => {
            let vector = parse_vector(&vector)?;
            let mut client = connect(&config, &target).await?;
            let matches = client.search_vector_n(&name, &vector, k).await;
            finish(&mut client, matches).await?;
        }
        Commands::Info { name, target } => {
            let mut client = connect(&config, &target).await?;
            let info = async {
                let info = client.index_info(&name).await?;
                let stats = client.index_stats(&name).await?;
                Ok::<_, vectord::ClientError>(serde_json::json!({ "index": info, "stats": stats }))
            }
            .await;
            finish(&mut client, info).await?;
        }
        Commands::List { target } => {
            let mut client = connect(&config, &target).await?;
            let indexes = client.list_indexes().await;
            finish(&mut client, indexes).await?;
        }
        Commands::Delete { name, id, target } => {
            let mut client = connect(&config, &target).await?;
            let deleted = client
                .delete_vector(&name, id)
                .await
                .map(|()| serde_json::json!({ "deleted": id }));
            finish(&mut client, deleted).await?;
        }
        Commands::DropIndex { name, target } => {
            let mut client = connect(&config, &target).await?;
            let dropped = client
                .drop_index(&name)
                .await
                .map(|()| serde_json::json!({ "dropped": name }));
            finish(&mut client, dropped).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig, verbose: u8) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.filter_directives(verbose))
            .context("Invalid logging directives")?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

async fn connect(config: &Config, target: &Target) -> Result<Client> {
    let mut client_config: ClientConfig = config.client.clone();
    if let Some(host) = &target.host {
        client_config.host = host.clone();
    }
    if let Some(port) = target.port {
        client_config.port = port;
    }
    client_config.auto_start_daemon = target.auto_start;

    Client::connect(client_config)
        .await
        .context("Failed to connect to vectord daemon")
}

/// Print the result as JSON, then close the client either way
async fn finish<T: Serialize>(
    client: &mut Client,
    result: Result<T, vectord::ClientError>,
) -> Result<()> {
    let closed = client.close().await;
    let value = result?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    closed?;
    Ok(())
}

fn parse_vector(raw: &str) -> Result<Vec<f32>> {
    raw.split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid vector component '{}'", token.trim()))
        })
        .collect()
}
