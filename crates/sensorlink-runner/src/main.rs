use std::fs::File;
use std::io::{self, BufReader, Write};

use clap::Parser;
use sensorlink_runner::cli::{Cli, Commands};
use sensorlink_runner::{oneshot, replay, tcp, RunnerConfig, RunnerError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), RunnerError> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    sensorlink_metrics::describe_metrics();

    let config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    debug!("configuration: {:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Encode { command, uart } => {
            let settings = uart.apply(config.uart);
            writeln!(out, "{}", oneshot::encode_command(command, &settings)?)?;
        }
        Commands::Decode { frame, payload } => {
            let decoded = oneshot::decode_frame(&frame, payload.into())?;
            serde_json::to_writer_pretty(&mut out, &decoded)?;
            writeln!(out)?;
        }
        Commands::Replay { file, chunk_size } => {
            let input = BufReader::new(File::open(file)?);
            let chunk_size = chunk_size.unwrap_or(config.chunk_size);
            let summary = replay::replay(input, chunk_size, &config.engine, &mut out)?;
            serde_json::to_writer(&mut out, &summary)?;
            writeln!(out)?;
        }
        Commands::Connect { addr, seconds } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            let summary = runtime.block_on(tcp::run_session(&addr, &config, seconds, &mut out))?;
            serde_json::to_writer(&mut out, &summary)?;
            writeln!(out)?;
        }
    }

    Ok(())
}

/// Initialize tracing to stderr, keeping stdout for JSON output.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
