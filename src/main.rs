// src/main.rs
// Triage - message and document triage service

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use triage::classify::{Classifier, GeminiClassifier};
use triage::config::Settings;
use triage::http::create_shared_client;
use triage::pipeline::{ClassificationOrchestrator, Upload};
use triage::web::{self, state::AppState};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Classify messages and documents as productive or unproductive")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (default)
    Serve(ServeArgs),

    /// Classify a single file or text and print the JSON result
    Classify {
        /// File to classify (.txt or .pdf)
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Text to classify
        #[arg(short, long)]
        text: Option<String>,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Address to bind (overrides TRIAGE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides TRIAGE_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_settings() -> Result<Settings> {
    let settings = Settings::from_env()?;
    let validation = settings.validate();
    for warning in &validation.warnings {
        warn!("{}", warning);
    }
    if !validation.is_valid() {
        bail!("invalid configuration\n{}", validation.report());
    }
    Ok(settings)
}

fn build_classifier(settings: &Settings) -> Arc<dyn Classifier> {
    // The gateway deadline fires first; the client timeout is a backstop
    let client = create_shared_client(settings.classify_timeout + Duration::from_secs(1));
    Arc::new(GeminiClassifier::new(
        settings.gemini_api_key.clone(),
        settings.gemini_model.clone(),
        client,
    ))
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let mut settings = load_settings()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", settings.host, settings.port))?;

    info!(
        model = %settings.gemini_model,
        max_chars = settings.max_chars,
        max_upload_mb = settings.max_upload_mb,
        classify_timeout_secs = settings.classify_timeout.as_secs(),
        request_timeout_secs = settings.request_timeout.as_secs(),
        "Starting triage service"
    );

    let classifier = build_classifier(&settings);
    let state = AppState::from_settings(settings, classifier);
    web::serve(state, addr).await
}

async fn run_classify(file: Option<PathBuf>, text: Option<String>) -> Result<()> {
    let settings = load_settings()?;
    let orchestrator = ClassificationOrchestrator::from_settings(&settings, build_classifier(&settings));
    let request_id = uuid::Uuid::new_v4().to_string();

    let result = match (file, text) {
        (Some(path), _) => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content_type = mime_guess::from_path(&path).first_or_octet_stream();
            orchestrator
                .classify_file(&request_id, Upload::new(filename, content_type.essence_str(), bytes))
                .await?
        }
        (None, Some(text)) => orchestrator.classify_text(&request_id, &text).await?,
        (None, None) => bail!("pass --file or --text"),
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("triage=info,tower_http=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => run_server(args).await,
        Commands::Classify { file, text } => run_classify(file, text).await,
    }
}
