//! Ctrl+C / SIGTERM handling for commands.
//!
//! Registry fetches and RPC calls can hang on an unresponsive endpoint, so
//! every command future runs through [`SigDown::run`], which drops it and
//! reports [`Error::Interrupted`] as soon as the process is asked to stop.

use std::future::Future;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use safe_connect::Error;

/// Interrupt listener shared by all commands of one invocation.
#[allow(missing_debug_implementations)]
pub struct SigDown {
    listener: TaskTracker,
    interrupted: CancellationToken,
}

impl SigDown {
    /// Registers the signal handlers and starts listening.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if a handler cannot be installed.
    #[allow(clippy::unnecessary_wraps)]
    pub fn try_new() -> Result<Self, std::io::Error> {
        let interrupted = CancellationToken::new();
        let listener = TaskTracker::new();
        let trip = interrupted.clone();

        #[cfg(unix)]
        {
            let mut terminate = signal(SignalKind::terminate())?;
            let mut interrupt = signal(SignalKind::interrupt())?;
            listener.spawn(async move {
                tokio::select! {
                    _ = terminate.recv() => tracing::debug!("SIGTERM"),
                    _ = interrupt.recv() => tracing::debug!("SIGINT"),
                }
                trip.cancel();
            });
        }

        #[cfg(windows)]
        listener.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trip.cancel();
            }
        });

        listener.close();
        Ok(Self {
            listener,
            interrupted,
        })
    }

    /// Drives `work` to completion unless the process is interrupted first.
    ///
    /// # Errors
    ///
    /// Returns the error of `work`, or [`Error::Interrupted`] when a signal
    /// arrives before it finishes.
    pub async fn run<T>(&self, work: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        tokio::select! {
            result = work => result,
            () = self.interrupted.cancelled() => {
                tracing::warn!("interrupted, abandoning command");
                self.listener.wait().await;
                Err(Error::Interrupted)
            }
        }
    }
}
