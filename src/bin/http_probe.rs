use std::time::Duration;

use clap::Parser;
use http_probe::client::{Client, ProbeConfig};
use http_probe::emitter::{Emitter, HumanReadableEmitter, JsonEmitter};
use http_probe::params;
use http_probe::target::Target;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, clap::ValueEnum)]
enum Format {
    Human,
    Json,
}

#[derive(Parser, Debug)]
struct Cli {
    /// URL of the resource to fetch on every round (http only)
    #[arg(long)]
    url: Option<String>,
    /// Number of request/response rounds over the connection
    #[arg(long, default_value_t = params::ROUNDS)]
    rounds: u32,
    /// Reads to skip, once per session, before steady-state bandwidth is measured
    #[arg(long, default_value_t = params::WARMUP_SKIPS)]
    warmup_skips: u32,
    /// A round ends after this many milliseconds without data
    #[arg(long, default_value_t = params::IDLE_TIMEOUT.as_millis() as u64)]
    idle_timeout_ms: u64,
    /// Size of the socket read buffer in bytes
    #[arg(long, default_value_t = params::READ_BUFFER_SIZE)]
    buffer_size: usize,
    /// Output format to use: 'human' or 'json' for batch processing
    #[arg(long, default_value = "human")]
    format: Format,
    /// Emit results and errors only
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();

    let cli = Cli::parse();

    let mut emitter: Box<dyn Emitter> = match cli.format {
        Format::Human => Box::new(HumanReadableEmitter::new(std::io::stdout())),
        Format::Json => Box::new(JsonEmitter::new(std::io::stdout())),
    };

    let result = async {
        let target = match cli.url.as_deref() {
            Some(url) => Target::from_url(url)?,
            None => Target::default(),
        };
        let client = Client::new(ProbeConfig {
            target,
            rounds: cli.rounds,
            warmup_skips: cli.warmup_skips,
            idle_timeout: Duration::from_millis(cli.idle_timeout_ms),
            read_buffer_size: cli.buffer_size,
            progress: !cli.quiet,
        })?;
        client.run(&mut *emitter).await
    }
    .await;

    if let Err(err) = result {
        emitter.on_error(&err.to_string())?;
        std::process::exit(1);
    }

    Ok(())
}
