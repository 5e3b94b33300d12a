mod cli;
mod client;
mod handle;
mod host;
mod ipc;
mod picker;
mod provider;
mod resolver;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, none_if_empty};
use picker::native::CommandSource;
use picker::{Orchestrator, PickOptions};
use provider::fs::FsProvider;
use provider::{ContentProvider, StorageLayout};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { content_root } => {
            let orchestrator = match build_orchestrator(content_root) {
                Ok(o) => o,
                Err(e) => exit_with("serve", &e),
            };
            if let Err(e) = host::run(orchestrator).await {
                tracing::error!(error = %e, "serve failed");
                exit_with("serve", &e.to_string());
            }
        }

        Command::Pick {
            extensions,
            mime_types,
            invalid_symbols,
            content_root,
        } => {
            let orchestrator = match build_orchestrator(content_root) {
                Ok(o) => o,
                Err(e) => exit_with("pick", &e),
            };
            let options = PickOptions {
                allowed_extensions: none_if_empty(extensions),
                allowed_mime_types: none_if_empty(mime_types),
                invalid_name_symbols: none_if_empty(invalid_symbols),
            };
            match orchestrator.pick_document(options).await {
                Some(path) => println!("{path}"),
                None => std::process::exit(1),
            }
        }

        Command::Resolve { uri, content_root } => {
            let orchestrator = match build_orchestrator(content_root) {
                Ok(o) => o,
                Err(e) => exit_with("resolve", &e),
            };
            match orchestrator.resolve_uri(&uri).await {
                Ok(path) => println!("{path}"),
                Err(e) => {
                    tracing::info!(error = %e, "resolution failed");
                    std::process::exit(1);
                }
            }
        }

        Command::Client { action } => match client::run(action).await {
            Ok(Some(path)) => println!("{path}"),
            Ok(None) => std::process::exit(1),
            Err(e) => {
                tracing::error!(error = %e, "client failed");
                exit_with("client", &e.to_string());
            }
        },
    }
}

fn build_orchestrator(content_root: Option<PathBuf>) -> Result<Arc<Orchestrator>, String> {
    let layout = StorageLayout::from_env().map_err(|e| e.to_string())?;
    let content_root = content_root
        .or_else(|| std::env::var_os("DOCPICK_CONTENT_ROOT").map(PathBuf::from))
        .unwrap_or_else(|| layout.cache_dir.join("content"));
    let provider: Arc<dyn ContentProvider> = Arc::new(FsProvider::new(content_root, layout));
    Ok(Arc::new(Orchestrator::new(Arc::new(CommandSource), provider)))
}

fn exit_with(command: &str, error: &str) -> ! {
    eprintln!("docpickd {command}: {error}");
    std::process::exit(1);
}
