// converse-cli/src/main.rs
mod models;
mod rendering;

use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use converse_core::{
    ClientConfig, ConverseClient, ConverseError, load_payload,
    report::{write_payload_summary, write_response},
};

use crate::models::cli::Cli;
use crate::rendering::{print_banner, print_converse_error, rule};

use time::macros::format_description;
use tracing::{debug, error, info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR_NAME: &str = "converse";
const LOG_FILE_NAME: &str = "converse.log";

/// Logs to stderr and to `<cache dir>/converse/converse.log`. `RUST_LOG`
/// overrides the level picked by `-v`.
fn init_logging(verbose: u8) -> Result<WorkerGuard> {
    let default_level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default_level.into()));

    let log_dir = dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join(LOG_DIR_NAME);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME));

    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_line_number(true)
        .with_timer(timer.clone());
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_timer(timer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "Logging at {} to stderr and {}",
        default_level,
        log_dir.join(LOG_FILE_NAME).display()
    );
    Ok(guard)
}

/// Loads the payload, prints its summary, then makes the single Converse call
/// and prints the reply. `connect` is only awaited once the payload is valid.
async fn run<W, F, Fut>(payload_path: &Path, out: &mut W, connect: F) -> Result<()>
where
    W: Write,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ConverseClient, ConverseError>>,
{
    let payload = load_payload(payload_path)?;
    info!(path = %payload_path.display(), messages = payload.messages.len(), "Payload loaded");

    write_payload_summary(out, payload_path, &payload).context("Failed to write payload summary")?;

    let client = connect().await?;
    writeln!(out, "\n{}", rule())?;
    writeln!(out, "Calling Converse API with model {}...", client.config().model_id)?;
    writeln!(out, "{}", rule())?;
    out.flush()?;

    let response = client.converse(&payload).await?;
    debug!(
        "Converse response: {}",
        serde_json::to_string_pretty(&response).unwrap_or_default()
    );

    writeln!(out, "Response:")?;
    writeln!(out, "{}", "-".repeat(40))?;
    write_response(out, &response).context("Failed to write response")?;
    writeln!(out, "\n{}", rule())?;
    Ok(())
}

/// Prints the completion line or the error headline and picks the exit code.
fn report_outcome(result: Result<()>, cwd: &Path) -> ExitCode {
    match result {
        Ok(()) => {
            println!("{}", "Converse API call completed successfully!".green().bold());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Operation failed: {:#}", e);
            match e.downcast_ref::<ConverseError>() {
                Some(converse_err) => print_converse_error(converse_err, cwd),
                None => eprintln!("{} Operation failed: {:#}", "Error:".red(), e),
            }
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let _guard = match init_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            return ExitCode::FAILURE;
        }
    };

    print_banner(&cli.payload_file);

    let result = {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run(&cli.payload_file, &mut out, || async {
            ClientConfig::from_env().await.map(ConverseClient::new)
        })
        .await
    };

    let cwd = env::current_dir().unwrap_or_else(|_| ".".into());
    report_outcome(result, &cwd)
}
