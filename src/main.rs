use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sidekick::answerer::{DocumentAnswerer, DocumentAnswererBuilder};
use sidekick::extract::DocumentKind;
use sidekick::remote::{ChatClientTrait, ChatCompletionClientBuilder, NoopChatClient};
use sidekick::{Config, DocumentStore, ServiceError, SidekickService, server};
use tracing_subscriber::EnvFilter;

/// sidekick - ask questions about a text or PDF document
#[derive(Parser)]
#[command(name = "sidekick")]
#[command(about = "Answers questions strictly from an uploaded document")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP backend
    Serve(ServeCommand),
    /// Answer one question about a local .txt or .pdf file
    Ask(AskCommand),
}

/// Run the HTTP backend
#[derive(Parser)]
struct ServeCommand {
    /// Address to bind (overrides HOST)
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Never contact the remote model; always use the local fallback
    #[arg(long)]
    offline: bool,
}

/// Answer one question about a local file
#[derive(Parser)]
struct AskCommand {
    /// Path to a .txt or .pdf file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// The question to answer
    #[arg(value_name = "QUESTION")]
    question: String,

    /// Never contact the remote model; always use the local fallback
    #[arg(long)]
    offline: bool,
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Serve(cmd) => handle_serve(cmd),
        Commands::Ask(cmd) => handle_ask(cmd),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Logs go to stderr so `ask` output stays clean on stdout.
///
/// Defaults to `info`; `RUST_LOG` overrides.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are request problems the caller can fix, such as an
/// unsupported file type or an unreadable PDF.
fn is_user_error(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<ServiceError>()
        .is_some_and(ServiceError::is_user_error)
}

/// Builds the answerer, talking to the remote model unless `offline` is set.
fn build_answerer(offline: bool) -> Result<DocumentAnswerer> {
    let client: Arc<dyn ChatClientTrait> = if offline {
        tracing::info!("Offline mode: answers use the local fallback only");
        Arc::new(NoopChatClient)
    } else {
        let client = ChatCompletionClientBuilder::new()
            .build()
            .context("Failed to configure chat-completion client")?;
        if !client.has_credential() {
            tracing::warn!("HF_API_TOKEN is not set; answers will use the local fallback");
        }
        tracing::info!(
            model = client.model(),
            timeout_secs = client.timeout().as_secs(),
            "Remote model configured"
        );
        Arc::new(client)
    };

    Ok(DocumentAnswererBuilder::new().client(client).build())
}

/// Handles the serve command.
///
/// The blocking HTTP client must not be dropped inside the async runtime, so
/// the service is built here and outlives the runtime.
fn handle_serve(cmd: &ServeCommand) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(host) = &cmd.host {
        config.host = host.clone();
    }
    if let Some(port) = cmd.port {
        config.port = port;
    }

    let store = DocumentStore::in_memory().context("Failed to open document store")?;
    let service = Arc::new(SidekickService::new(store, build_answerer(cmd.offline)?));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let served = runtime.block_on(server::serve(&config, service.clone()));
    drop(runtime);

    service.store().clear()?;
    served
}

/// Handles the ask command by loading the file and answering once.
fn handle_ask(cmd: &AskCommand) -> Result<()> {
    let bytes = std::fs::read(&cmd.file)
        .with_context(|| format!("Failed to read {}", cmd.file.display()))?;

    let answer = execute_ask(cmd, &bytes, build_answerer(cmd.offline)?)?;
    println!("{answer}");
    Ok(())
}

/// Executes the ask command logic with a provided answerer.
///
/// Separated from `handle_ask` so tests can run it without touching the
/// network or the filesystem.
fn execute_ask(cmd: &AskCommand, bytes: &[u8], answerer: DocumentAnswerer) -> Result<String> {
    let name = cmd
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| cmd.file.display().to_string());
    let mime = DocumentKind::from_path(&cmd.file)
        .map(DocumentKind::mime)
        .unwrap_or("application/octet-stream");

    let store = DocumentStore::in_memory().context("Failed to open document store")?;
    let service = SidekickService::new(store, answerer);

    let summary = service.upload_document(&name, mime, bytes)?;
    let reply = service.ask(summary.id.as_str(), &cmd.question)?;
    Ok(reply.content)
}
