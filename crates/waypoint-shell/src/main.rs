//! Waypoint headless shell entry point.

use std::error::Error;
use std::sync::Arc;

use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;
use waypoint_core::store::KeyValueStore;
use waypoint_preferences::{JsonFileStore, MemoryStore};
use waypoint_shell::{PageCatalog, PageShell, ShellConfig, ShellPorts, run_session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    tracing::info!("Starting Waypoint shell");

    // Read configuration from environment.
    let config = ShellConfig::from_env()?;
    let catalog = match &config.pages_dir {
        Some(dir) => PageCatalog::from_dir(dir)?,
        None => PageCatalog::builtin(),
    };
    let store: Arc<dyn KeyValueStore> = match &config.preferences_path {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(MemoryStore::new()),
    };

    let mut shell = PageShell::new(
        &config,
        catalog,
        ShellPorts::headless(store, config.reduced_motion),
    );
    shell.start()?;

    let stdin = BufReader::new(tokio::io::stdin());
    run_session(&mut shell, stdin, &mut std::io::stdout()).await;
    Ok(())
}
