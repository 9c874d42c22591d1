use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use promportal::duration::format_duration;
use promportal::{Engine, HandlerRegistry, OperationRequest, Settings};
use promportal_adapters::MetricsBackend;

#[derive(Parser, Debug)]
#[command(name = "promportal")]
#[command(about = "Answer monitoring portal queries from a Prometheus server")]
struct Args {
    /// Settings file (YAML or TOML); PROMPORTAL_* variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON operation request to answer ("-" reads stdin)
    #[arg(short, long, default_value = "-", conflicts_with = "probe")]
    request: String,

    /// Only check that the backend is reachable
    #[arg(long)]
    probe: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let settings = Settings::load(args.config.as_deref())?;
    let backend = Arc::new(settings.build_backend()?);

    info!(
        backend = backend.target(),
        timeout = %format_duration(settings.backend.timeout),
        probe_timeout = %format_duration(settings.backend.probe_timeout),
        retry_attempts = settings.backend.retry_attempts,
        objects = settings.objects.len(),
        "Loaded settings"
    );

    if args.probe {
        if backend.probe().await {
            info!(backend = backend.target(), "Backend reachable");
            return Ok(ExitCode::SUCCESS);
        }
        error!(backend = backend.target(), "Backend unreachable");
        return Ok(ExitCode::FAILURE);
    }

    let request = read_request(&args.request)?;

    let engine = Engine::new(
        Arc::new(settings.catalog()),
        backend,
        settings.engine_settings(),
    );
    let registry = HandlerRegistry::from_kinds(settings.handlers.kinds(), Arc::new(engine));

    let response = registry.dispatch(&request).await?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &response)?;
    writeln!(stdout)?;
    Ok(ExitCode::SUCCESS)
}

/// Read an operation request from a file, or stdin for "-".
fn read_request(source: &str) -> Result<OperationRequest> {
    let raw = if source == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read request from stdin")?;
        raw
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read request file {}", source))?
    };
    serde_json::from_str(&raw).context("Failed to parse operation request")
}
