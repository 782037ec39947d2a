use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod commands;

#[derive(Parser)]
#[command(name = "unisync")]
#[command(about = "Incremental sync of institution records into PostgreSQL", long_about = None)]
struct Cli {
    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync once and print the run report as JSON.
    Run {
        /// Exit with an error when the run aborts.
        #[arg(long)]
        strict: bool,
    },
    /// Run the sync on a fixed interval, with retries, until Ctrl-C.
    Schedule,
    /// Create the destination table if it does not exist.
    InitDb,
    /// Print the institution type derived from a name.
    Classify { name: String },
    /// Print the number of stored institutions.
    Count,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// `RUST_LOG` directives win; `info` applies only when none are given.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn init_logging(format: LogFormat) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(directives.as_deref());
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Commands::Run { strict } => commands::run::run(strict).await?,
        Commands::Schedule => commands::schedule::run().await?,
        Commands::InitDb => commands::init_db::run().await?,
        Commands::Classify { name } => commands::classify::run(&name),
        Commands::Count => commands::count::run().await?,
    }

    Ok(())
}
