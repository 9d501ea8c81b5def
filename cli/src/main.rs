mod settings;
mod transport;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mantle_core::{Mantle, Reply, RequestEnvelope};

use settings::{FileStore, SettingsError};
use transport::UreqClient;

/// Forward a request to the Luminate Online REST API.
#[derive(Parser)]
#[command(name = "mantle", version)]
struct Args {
    /// YAML file holding the luminate_mantle_* settings.
    #[arg(short, long, default_value = "mantle.yaml")]
    config: PathBuf,

    /// Form-encoded request, e.g. "servlet=cons&method=getUser&cons_id=42".
    #[arg(short, long)]
    data: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("could not encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

fn init_logging(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<Reply, CliError> {
    let store = FileStore::new(&args.config);
    // Surface a broken file here instead of as missing credentials.
    store.read()?;

    let envelope = args
        .data
        .as_deref()
        .map(RequestEnvelope::from_data)
        .unwrap_or_default();
    let mantle = Mantle::new(store, UreqClient::new());
    Ok(mantle.reply(&envelope))
}

/// Write the reply JSON to `out` or the error to `err`; returns the exit status.
fn report(result: Result<Reply, CliError>, out: &mut impl Write, err: &mut impl Write) -> u8 {
    let written = result.and_then(|reply| {
        let json = serde_json::to_string(&reply)?;
        Ok((json, reply.success))
    });
    match written {
        Ok((json, success)) => {
            let _ = writeln!(out, "{json}");
            if success {
                0
            } else {
                1
            }
        }
        Err(e) => {
            let _ = writeln!(err, "mantle: {e}");
            2
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let code = report(run(&args), &mut std::io::stdout(), &mut std::io::stderr());
    ExitCode::from(code)
}
