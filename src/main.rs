//! newsledger CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use newsledger::{
    commands::{
        cmd_ingest, cmd_init, cmd_list_topics, cmd_report, cmd_show_topic, cmd_status,
        print_ingest_report, print_init, print_report, print_status, print_topic_listing,
        print_topics, prompt_topic, InitOptions, ReportOptions,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
    report::DEFAULT_CHART_TITLE,
    store::TopicStore,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "newsledger")]
#[command(version, about = "Collect topic coverage from news and video sources", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize newsledger configuration and database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch a topic from every enabled source and store new records
    Ingest {
        /// Topic to search for (prompted for when omitted)
        topic: Option<String>,
    },

    /// List stored topics
    Topics,

    /// Show the records stored for a topic
    Show {
        /// Topic name, as typed or as its stored key
        topic: String,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Count records per topic and source
    Report {
        /// Write the counts as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write a grouped bar chart figure (Plotly JSON)
        #[arg(long)]
        chart: Option<PathBuf>,

        /// Chart title
        #[arg(long, default_value = DEFAULT_CHART_TITLE)]
        title: String,
    },

    /// Show system status
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(LogWriterFactory))
        .with(filter)
        .init();

    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config, force).await;
    }

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "newsledger", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let store = TopicStore::connect(&config).await?;

    match cli.command {
        Commands::Ingest { topic } => {
            let topic = match topic {
                Some(topic) => topic,
                None => prompt_topic()?,
            };
            let report = cmd_ingest(&config, &store, &topic).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_ingest_report(report.as_ref());
            }
        }

        Commands::Topics => {
            let topics = cmd_list_topics(&store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&topics)?);
            } else {
                print_topics(&topics);
            }
        }

        Commands::Show { topic, limit } => {
            let listing = cmd_show_topic(&store, &topic, limit).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                print_topic_listing(&listing);
            }
        }

        Commands::Report { csv, chart, title } => {
            let options = ReportOptions { csv, chart, title };
            let counts = cmd_report(&store, &options).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                print_report(&counts, &options);
            }
        }

        Commands::Status => {
            let status = cmd_status(&config, &store).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }

        Commands::Init { .. } | Commands::Completions { .. } => {}
    }

    store.close().await;
    Ok(())
}

async fn handle_init(config: Option<PathBuf>, force: bool) -> Result<()> {
    // A custom config file keeps its database next to it
    let (base_dir, config_path) = match config {
        Some(path) => {
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            (base, path)
        }
        None => (Config::default_base_dir(), Config::default_config_path()),
    };

    let config = cmd_init(InitOptions {
        base_dir,
        config_path,
        force,
    })
    .await?;
    print_init(&config);
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) if !path.exists() => return Err(newsledger::Error::NotInitialized),
        Some(path) => Config::load(path)?,
        None => Config::load_from(None)?,
    };

    if !config.is_initialized() {
        return Err(newsledger::Error::NotInitialized);
    }

    Ok(config)
}
