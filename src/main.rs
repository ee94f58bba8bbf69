use std::sync::Arc;

use tracing::{error, info};

use pooled_httpd::config::Config;
use pooled_httpd::core::HelloHandler;
use pooled_httpd::listener::Listener;
use pooled_httpd::{logging, VERSION};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;
    logging::init(&config.logging)?;

    info!("Starting pooled_httpd {}...", VERSION);
    config.log_summary();

    let listener = Arc::new(Listener::bind(config.listener_config(), HelloHandler)?);

    // The accept loop and workers are plain threads; the runtime only waits for signals
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(listener))
}

async fn run(listener: Arc<Listener>) -> Result<(), BoxError> {
    let mut acceptor = {
        let listener = Arc::clone(&listener);
        tokio::task::spawn_blocking(move || listener.start())
    };

    let finished_early = tokio::select! {
        result = &mut acceptor => {
            match result {
                Ok(Ok(())) => info!("Accept loop exited"),
                Ok(Err(e)) => error!(error = %e, "Accept loop failed"),
                Err(e) => error!(error = %e, "Accept loop panicked"),
            }
            true
        }
        _ = shutdown_signal() => {
            info!("Shutting down...");
            false
        }
    };

    let stopped = tokio::task::spawn_blocking(move || listener.shutdown()).await?;
    if let Err(e) = stopped {
        error!(error = %e, "Shutdown failed");
    }

    if !finished_early {
        acceptor.await??;
    }

    info!("Goodbye");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
