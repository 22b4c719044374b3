//! MailGuard
//!
//! Masks PII/PCI data in support emails and routes them to a category.
//!
//! `mailguard serve` runs the HTTP service; the other subcommands run the
//! same pipeline once from the command line or train new model artifacts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info, warn};

use mailguard_classifiers::{
    demask, load_dataset, validate_body, ArtifactConfig, EmailPipeline, PiiMasker, Trainer,
    TrainingConfig,
};
use mailguard_core::Entity;
use mailguard_server::{create_router, AppState, ConfigOverrides, MaskResponse, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "mailguard", version)]
#[command(about = "PII/PCI masking and email classification", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true, env = "MAILGUARD_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// Mask and classify one email
    Classify(ClassifyArgs),
    /// Mask one email without classifying it
    Mask(InputArgs),
    /// Restore masked values into text
    Demask(DemaskArgs),
    /// Train and export model artifacts
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "mailguard.yaml", env = "MAILGUARD_CONFIG")]
    config: PathBuf,

    /// Listen address
    #[arg(short = 'l', long, env = "MAILGUARD_LISTEN")]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "MAILGUARD_PORT")]
    port: Option<u16>,

    /// Model artifact path
    #[arg(long, env = "MAILGUARD_MODEL")]
    model: Option<PathBuf>,

    /// Label codec artifact path
    #[arg(long, env = "MAILGUARD_LABELS")]
    labels: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Input file, or `-` for stdin
    input: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Model artifact path
    #[arg(long, env = "MAILGUARD_MODEL")]
    model: Option<PathBuf>,

    /// Label codec artifact path
    #[arg(long, env = "MAILGUARD_LABELS")]
    labels: Option<PathBuf>,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct DemaskArgs {
    /// JSON file with the masked entities (a list, or a mask/classify response)
    #[arg(short, long)]
    entities: PathBuf,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON Lines dataset of `{"email", "type"}` records
    #[arg(short, long)]
    data: PathBuf,

    /// Directory for the exported artifacts
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Fraction of records held out for evaluation
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Vocabulary cap
    #[arg(long)]
    max_features: Option<usize>,

    /// Naive Bayes smoothing
    #[arg(long)]
    alpha: Option<f64>,

    /// Write one JSON prediction per held-out email
    #[arg(long)]
    export_examples: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Classify(args) => classify(args),
        Command::Mask(args) => mask(args),
        Command::Demask(args) => demask_text(args),
        Command::Train(args) => train(args),
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    info!("Starting MailGuard server");

    // Load configuration
    let config = ServerConfig::load(&args.config)?.with_overrides(ConfigOverrides {
        listen: args.listen,
        port: args.port,
        model_path: args.model,
        labels_path: args.labels,
    });
    info!("Configuration loaded successfully");
    info!("Model: {}", config.classifier.artifacts.model_path.display());
    info!("Labels: {}", config.classifier.artifacts.labels_path.display());

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Artifacts load before the listener binds; failure aborts startup
    let addr: SocketAddr = config.bind_address().parse()?;
    let state = AppState::new(config, metrics_handle)?;
    info!("Application state initialized successfully");

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MailGuard listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn classify(args: ClassifyArgs) -> Result<()> {
    let defaults = ArtifactConfig::default();
    let artifacts = ArtifactConfig {
        model_path: args.model.unwrap_or(defaults.model_path),
        labels_path: args.labels.unwrap_or(defaults.labels_path),
    };

    let pipeline = EmailPipeline::load(&artifacts).context("failed to load model artifacts")?;
    let body = read_input(args.input.input.as_deref())?;
    let result = pipeline.process(&body)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn mask(args: InputArgs) -> Result<()> {
    let body = read_input(args.input.as_deref())?;
    validate_body(&body)?;

    let result = PiiMasker::new()?.mask(&body);
    let response = MaskResponse {
        masked_email: result.masked_text,
        list_of_masked_entities: result.entities,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Entities file accepted by `demask`
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum EntitiesFile {
    List(Vec<Entity>),
    Record { list_of_masked_entities: Vec<Entity> },
}

fn demask_text(args: DemaskArgs) -> Result<()> {
    let content = std::fs::read_to_string(&args.entities)
        .with_context(|| format!("failed to read {}", args.entities.display()))?;
    let entities = match serde_json::from_str::<EntitiesFile>(&content)
        .with_context(|| format!("invalid entities file {}", args.entities.display()))?
    {
        EntitiesFile::List(entities) => entities,
        EntitiesFile::Record { list_of_masked_entities } => list_of_masked_entities,
    };

    let masked = read_input(args.input.input.as_deref())?;
    print!("{}", demask(&masked, &entities));
    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let defaults = TrainingConfig::default();
    let config = TrainingConfig {
        max_features: args.max_features.unwrap_or(defaults.max_features),
        alpha: args.alpha.unwrap_or(defaults.alpha),
        test_size: args.test_size.unwrap_or(defaults.test_size),
        seed: args.seed.unwrap_or(defaults.seed),
    };

    let records = load_dataset(&args.data)?;
    let outcome = Trainer::new(config)?.train(&records)?;
    println!("{}", outcome.report);

    let artifacts = outcome.export(&args.output_dir, args.export_examples)?;
    info!(
        "Artifacts written to {} and {}",
        artifacts.model_path.display(),
        artifacts.labels_path.display()
    );
    Ok(())
}

/// Read the whole input file, or stdin for `None` / `-`
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
///
/// Logs go to stderr so subcommands can print JSON on stdout.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mailguard=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    mailguard_telemetry::describe_metrics();

    info!("Metrics exporter initialized");
    Ok(handle)
}
