use std::{error::Error, process::ExitCode};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use linewire::{
    Connection, ConnectionConfig, ConnectionError, LineReader, LineWriter,
    config::{CliConfig, LogLevel},
};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "linewire";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliConfig::from_args();
    init_tracing(cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{APP_NAME}: {e}");
            ExitCode::FAILURE
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

fn init_tracing(level: LogLevel) {
    // Logs go to stderr; stdout carries received lines.
    let filter =
        EnvFilter::try_new(level.directive()).unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn load_config(cli: &CliConfig) -> Result<ConnectionConfig, Box<dyn Error>> {
    match &cli.config_file_location {
        Some(path) => Ok(ConnectionConfig::from_file(path).await?),
        None => Ok(ConnectionConfig::default()),
    }
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run(cli: CliConfig) -> Result<(), Box<dyn Error>> {
    let config = load_config(&cli).await?;

    let mut conn = Connection::with_config(config);
    conn.connect(&cli.host, cli.port).await?;
    info!("{} connected to {}:{}", APP_NAME, cli.host, cli.port);

    let (mut reader, mut writer) = conn.into_split()?;
    let outcome = pump(&mut reader, &mut writer).await;

    if let Err(e) = writer.shutdown().await {
        warn!("shutdown: {e}");
    }
    info!("{} disconnected", APP_NAME);

    outcome
}

/// Forward stdin lines to the peer and peer lines to stdout until either side
/// runs dry or the user interrupts.
async fn pump(reader: &mut LineReader, writer: &mut LineWriter) -> Result<(), Box<dyn Error>> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("{} interrupted", APP_NAME);
                return Ok(());
            }

            input = stdin.next_line() => {
                match input? {
                    Some(line) => writer.send(&line).await?,
                    None => {
                        info!("stdin closed");
                        return Ok(());
                    }
                }
            }

            received = reader.receive_line() => {
                match received {
                    Ok(line) => {
                        stdout.write_all(line.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;
                    }
                    Err(ConnectionError::ConnectionClosed) => {
                        info!("peer closed the connection");
                        return Ok(());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
