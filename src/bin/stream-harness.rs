use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kinesis_probe::client::{
    DeleteStreamInput, DescribeStreamInput, HttpStreamClient, ListStreamsInput, StreamClient,
};
use kinesis_probe::config::{load_config, validate_config, ConfigError, HarnessConfig};
use kinesis_probe::observability::init_tracing;
use kinesis_probe::probe::await_deleted;
use kinesis_probe::scenario::run_lifecycle;

#[derive(Parser)]
#[command(name = "stream-harness")]
#[command(about = "Lifecycle checks against a Kinesis-compatible endpoint", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Endpoint URL, overriding the configuration
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a stream, write and read a record, delete it again
    Run {
        /// Stream name; generated from the configured prefix if omitted
        #[arg(long)]
        name: Option<String>,
        /// Shard count, overriding the configuration
        #[arg(long)]
        shards: Option<u32>,
    },
    /// List stream names
    List,
    /// Describe a stream
    Describe { name: String },
    /// Delete a stream
    Delete {
        name: String,
        /// Wait until the stream is gone
        #[arg(long)]
        wait: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli)?;
    let client = config.http_client()?;

    match cli.command {
        Commands::Run { name, shards } => {
            let mut config = config;
            if let Some(shards) = shards {
                config.stream.shard_count = shards;
            }
            let name = name.unwrap_or_else(|| config.unique_stream_name());
            let settings = config.scenario_settings(name);

            match run_lifecycle(&client, &settings).await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(e) => {
                    tracing::error!(stream = %settings.stream_name, error = %e, "lifecycle check failed");
                    eprintln!("Error: {}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::List => {
            for name in list_all(&client).await? {
                println!("{}", name);
            }
        }
        Commands::Describe { name } => {
            let described = client
                .describe_stream(DescribeStreamInput::new(name))
                .await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&described.stream_description)?
            );
        }
        Commands::Delete { name, wait } => {
            client
                .delete_stream(DeleteStreamInput {
                    stream_name: name.clone(),
                })
                .await?;
            if wait {
                await_deleted(&client, &name, &config.retry.deletion_policy()).await?;
                println!("{} deleted", name);
            } else {
                println!("{} deleting", name);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_config(cli: &Cli) -> Result<HarnessConfig, ConfigError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.url = endpoint.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    tracing::info!(
        endpoint = %config.endpoint.url,
        shard_count = config.stream.shard_count,
        "Configuration loaded"
    );
    Ok(config)
}

async fn list_all(client: &HttpStreamClient) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut names = Vec::new();
    let mut after = None;
    loop {
        let page = client
            .list_streams(ListStreamsInput {
                limit: None,
                exclusive_start_stream_name: after,
            })
            .await?;
        let more = page.has_more_streams && !page.stream_names.is_empty();
        after = page.stream_names.last().cloned();
        names.extend(page.stream_names);
        if !more {
            return Ok(names);
        }
    }
}
