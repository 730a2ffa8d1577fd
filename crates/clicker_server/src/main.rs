//! Byte clicker - local terminal game or multi-player SSH server.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clicker_core::persistence::PersistenceAdapter;
use clicker_server::hub::{Hub, HubConfig};
use clicker_server::logging::{self, LogTarget};
use clicker_server::store::FileStore;
use clicker_server::{local, ssh, Cli, Result, ServerConfig};
use tracing::{error, info};

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!(port = config.port, saves = %config.save_dir.display(), "Starting byte clicker server");
    let store: Arc<dyn PersistenceAdapter> = Arc::new(FileStore::new(&config.save_dir));
    let hub = Hub::new(HubConfig::server(&config), store);
    let (handle, events) = Hub::channel();

    // Fails fast on a missing host key or busy port, before the hub runs.
    let listener = tokio::spawn({
        let config = config.clone();
        async move { ssh::serve(&config, handle).await }
    });
    let listener_failed = async {
        match listener.await {
            Ok(Ok(())) => std::future::pending().await,
            Ok(Err(e)) => e,
            Err(e) => std::io::Error::other(e).into(),
        }
    };

    tokio::pin!(listener_failed);
    let mut failure = None;
    hub.run(events, async {
        tokio::select! {
            () = shutdown_signal() => {}
            e = &mut listener_failed => failure = Some(e),
        }
    })
    .await;

    match failure {
        Some(e) => Err(e),
        None => {
            info!("Server stopped");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let config = match cli.server_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("byte-clicker: {e}");
            return ExitCode::FAILURE;
        }
    };

    let target = if cli.is_server() {
        LogTarget::Stderr
    } else {
        LogTarget::latest_in(std::path::Path::new("."))
    };
    if let Err(e) = logging::init(&target, cli.verbose) {
        eprintln!("byte-clicker: could not open log: {e}");
        return ExitCode::FAILURE;
    }

    let outcome = if cli.is_server() {
        run_server(config).await
    } else {
        local::play(&config, &cli.save_file, cli.debug, shutdown_signal()).await
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Exiting");
            eprintln!("byte-clicker: {e}");
            ExitCode::FAILURE
        }
    }
}
