//! Process shutdown signalling shared by the binaries.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `task`, then cancel `shutdown` however it ended.
///
/// Used for tasks whose exit, clean or failed, must stop their siblings.
pub async fn cancel_on_exit<F>(shutdown: CancellationToken, task: F) -> F::Output
where
    F: Future,
{
    let output = task.await;
    shutdown.cancel();
    output
}

/// Cancel `shutdown` on Ctrl-C, or SIGTERM on unix.
///
/// Returns without logging if `shutdown` is cancelled by something else first, so a binary can
/// spawn this alongside its own failure paths.
pub async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => return,
    }

    tracing::info!("shutdown requested");
    shutdown.cancel();
}
