// Signal handling module
//
// Supported signals:
// - SIGHUP:  Reload the model artifact (startup load strategy)
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGUSR1: Reopen log files

use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::{AppState, LoadStrategy};
use crate::logger;

/// Reload the cached model, if the server caches one
pub async fn reload_model(state: &AppState) {
    match state.models.strategy() {
        LoadStrategy::Startup => match state.models.reload().await {
            Ok(()) => logger::log_info("[SIGNAL] Model reloaded"),
            Err(e) => logger::log_error(&format!(
                "Model reload failed, keeping the current model: {e}"
            )),
        },
        LoadStrategy::PerRequest => {
            logger::log_info("[SIGNAL] Model is read on every request; nothing to reload");
        }
    }
}

/// Start signal handlers (Unix only)
///
/// | Signal  | Action              |
/// |---------|---------------------|
/// | SIGHUP  | Reload model        |
/// | SIGTERM | Graceful stop       |
/// | SIGINT  | Graceful stop       |
/// | SIGUSR1 | Reopen log files    |
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>, shutdown: Arc<Notify>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let signals = (
            signal(SignalKind::hangup()),
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::user_defined1()),
        );
        let (Ok(mut sighup), Ok(mut sigterm), Ok(mut sigint), Ok(mut sigusr1)) = signals else {
            logger::log_error("Failed to register signal handlers; falling back to Ctrl+C only");
            wait_for_ctrl_c(shutdown).await;
            return;
        };

        logger::log_info(&format!(
            "[SIGNAL] Handlers registered (HUP: reload model, TERM/INT: shutdown, USR1: reopen logs), pid {}",
            std::process::id()
        ));

        loop {
            tokio::select! {
                _ = sighup.recv() => {
                    logger::log_info("[SIGNAL] SIGHUP received");
                    reload_model(&state).await;
                }

                _ = sigterm.recv() => {
                    logger::log_info("[SIGNAL] SIGTERM received, shutting down");
                    shutdown.notify_one();
                    break;
                }

                _ = sigint.recv() => {
                    logger::log_info("[SIGNAL] SIGINT received, shutting down");
                    shutdown.notify_one();
                    break;
                }

                _ = sigusr1.recv() => {
                    logger::log_info("[SIGNAL] SIGUSR1 received");
                    logger::reopen();
                }
            }
        }
    });
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(_state: Arc<AppState>, shutdown: Arc<Notify>) {
    tokio::spawn(wait_for_ctrl_c(shutdown));
}

async fn wait_for_ctrl_c(shutdown: Arc<Notify>) {
    if let Ok(()) = tokio::signal::ctrl_c().await {
        logger::log_info("[SIGNAL] Ctrl+C received, shutting down");
        shutdown.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_reload_model_picks_up_new_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut cfg = Config::defaults().unwrap();
        cfg.model.path = path.to_string_lossy().into_owned();
        cfg.model.load_strategy = LoadStrategy::Startup;
        let state = AppState::new(&cfg).await;
        assert!(!state.models.is_available().await);

        std::fs::write(
            &path,
            r#"{"estimator": {"type": "linear_regression", "coefficients": [1.0]}}"#,
        )
        .unwrap();
        reload_model(&state).await;
        assert!(state.models.is_available().await);
    }
}
