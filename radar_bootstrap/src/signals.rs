// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # OS Signal Handling
//!
//! Cross-platform signal handling for graceful shutdown.
//!
//! ## Design Pattern
//!
//! The `SystemSignals` trait abstracts over platform differences so the
//! composition root can await "shutdown requested" without branching on
//! `cfg(unix)`/`cfg(windows)` itself:
//!
//! - **Unix**: SIGTERM, SIGINT, SIGHUP all trigger shutdown.
//! - **Windows**: Ctrl-C is the only signal available.
//! - **Test**: a no-op handler that never fires, so loop-termination tests
//!   can drive shutdown purely through a `CancellationToken` instead.

use std::future::Future;
use std::pin::Pin;

/// Callback invoked once a shutdown signal has been received.
pub type ShutdownCallback = Box<dyn FnOnce() + Send + 'static>;

/// Waits for an OS shutdown signal and invokes a callback.
pub trait SystemSignals: Send + Sync {
    /// Waits for a shutdown signal, then calls `on_shutdown`.
    ///
    /// Returns once the callback has run. Callers typically `tokio::select!`
    /// this future against a cancellation token so either can win the race.
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

#[cfg(unix)]
pub struct UnixSignalHandler;

#[cfg(unix)]
impl UnixSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl Default for UnixSignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl SystemSignals for UnixSignalHandler {
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("failed to install SIGTERM handler: {}", e);
                    return;
                }
            };
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("failed to install SIGINT handler: {}", e);
                    return;
                }
            };
            let mut sighup = match signal(SignalKind::hangup()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("failed to install SIGHUP handler: {}", e);
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
                _ = sighup.recv() => tracing::info!("received SIGHUP"),
            }

            on_shutdown();
        })
    }
}

#[cfg(windows)]
pub struct WindowsSignalHandler;

#[cfg(windows)]
impl WindowsSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
impl Default for WindowsSignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
impl SystemSignals for WindowsSignalHandler {
    fn wait_for_signal(&self, on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("received Ctrl-C"),
                Err(e) => tracing::error!("failed to listen for Ctrl-C: {}", e),
            }
            on_shutdown();
        })
    }
}

/// Never resolves. Used in tests that drive shutdown via a cancellation
/// token instead of a real signal.
pub struct NoOpSignalHandler;

impl NoOpSignalHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpSignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSignals for NoOpSignalHandler {
    fn wait_for_signal(&self, _on_shutdown: ShutdownCallback) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(std::future::pending())
    }
}

/// Constructs the signal handler appropriate for the current platform.
pub fn create_signal_handler() -> Box<dyn SystemSignals> {
    #[cfg(unix)]
    {
        Box::new(UnixSignalHandler::new())
    }
    #[cfg(windows)]
    {
        Box::new(WindowsSignalHandler::new())
    }
    #[cfg(not(any(unix, windows)))]
    {
        Box::new(NoOpSignalHandler::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn noop_handler_never_fires() {
        let handler = NoOpSignalHandler::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = fired.clone();

        let wait = handler.wait_for_signal(Box::new(move || {
            fired_clone.store(true, Ordering::SeqCst);
        }));

        let result = tokio::time::timeout(Duration::from_millis(50), wait).await;
        assert!(result.is_err(), "no-op handler must never resolve");
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[test]
    fn create_signal_handler_does_not_panic() {
        let _handler = create_signal_handler();
    }
}
