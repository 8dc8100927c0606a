// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Build tracker runner (§4.3, §9 "Run(ctx, ready)").
//!
//! `Track()` itself just asks the repository for pending builds and logs
//! them - advancing a build's own state machine is outside this unit's
//! responsibility (§1); what's specified here is the edge-triggered loop
//! shape: tick, `build_started`, `atc_shutdown`, and cancellation, with
//! `Track` invoked exactly once unconditionally right after subscribing.

use radar_bootstrap::shutdown::CancellationToken;
use radar_domain::{BuildRepository, NotificationBus, NotificationStream, RadarError, CHANNEL_ATC_SHUTDOWN, CHANNEL_BUILD_STARTED};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};

pub struct BuildTrackerRunner {
    bus: Arc<dyn NotificationBus>,
    builds: Arc<dyn BuildRepository>,
    tick_interval: Duration,
}

impl BuildTrackerRunner {
    pub fn new(bus: Arc<dyn NotificationBus>, builds: Arc<dyn BuildRepository>, tick_interval: Duration) -> Self {
        Self { bus, builds, tick_interval }
    }

    /// Runs until `ctx` is cancelled. `ready` is signaled once both
    /// notification channels are subscribed, before the unconditional first
    /// `Track()` call - callers waiting on process readiness block on it.
    pub async fn run(&self, ctx: CancellationToken, ready: oneshot::Sender<()>) -> Result<(), RadarError> {
        let mut shutdown_stream = self.bus.listen(CHANNEL_ATC_SHUTDOWN).await;
        let mut build_started_stream = self.bus.listen(CHANNEL_BUILD_STARTED).await;
        let _ = ready.send(());

        self.track().await;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await; // first tick fires immediately; already covered by the unconditional Track above

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("build tracker runner cancelled, shutting down");
                    break;
                }
                event = shutdown_stream.recv() => {
                    match event {
                        Some(()) => {
                            info!("atc_shutdown notification received");
                            self.track().await;
                        }
                        None => {
                            warn!("atc_shutdown stream closed unexpectedly");
                            break;
                        }
                    }
                }
                event = build_started_stream.recv() => {
                    match event {
                        Some(()) => {
                            info!("build_started notification received");
                            self.track().await;
                        }
                        None => {
                            warn!("build_started stream closed unexpectedly");
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.track().await;
                }
            }
        }

        self.bus.unlisten(CHANNEL_ATC_SHUTDOWN, shutdown_stream).await;
        self.bus.unlisten(CHANNEL_BUILD_STARTED, build_started_stream).await;
        Ok(())
    }

    /// Picks up builds needing advancement. Logged and swallowed on error
    /// (§7 "the tracker runner logs and continues ... never terminates on
    /// transient failure").
    async fn track(&self) {
        match self.builds.find_pending_builds().await {
            Ok(pending) => info!(count = pending.len(), "tracked pending builds"),
            Err(err) => warn!(error = %err, "failed to list pending builds"),
        }
    }
}

#[allow(dead_code)]
fn _assert_stream_object_safe(_: &dyn NotificationStream) {}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use radar_domain::{Build, RadarError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, Mutex};

    struct FakeStream {
        rx: mpsc::Receiver<()>,
    }

    #[async_trait]
    impl NotificationStream for FakeStream {
        async fn recv(&mut self) -> Option<()> {
            self.rx.recv().await
        }
    }

    struct FakeBus {
        shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
        build_started_tx: Mutex<Option<mpsc::Sender<()>>>,
    }

    #[async_trait]
    impl NotificationBus for FakeBus {
        async fn listen(&self, channel: &str) -> Box<dyn NotificationStream> {
            let (tx, rx) = mpsc::channel(4);
            if channel == CHANNEL_ATC_SHUTDOWN {
                *self.shutdown_tx.lock().await = Some(tx);
            } else {
                *self.build_started_tx.lock().await = Some(tx);
            }
            Box::new(FakeStream { rx })
        }

        async fn unlisten(&self, _channel: &str, _stream: Box<dyn NotificationStream>) {}

        async fn notify(&self, _channel: &str) {}
    }

    struct CountingBuildRepository {
        track_calls: AtomicUsize,
    }

    #[async_trait]
    impl BuildRepository for CountingBuildRepository {
        async fn save_job(&self, _job: &radar_domain::Job) -> Result<(), RadarError> {
            Ok(())
        }
        async fn list_jobs(&self, _pipeline_id: &radar_domain::PipelineId) -> Result<Vec<radar_domain::Job>, RadarError> {
            Ok(Vec::new())
        }
        async fn find_job(&self, _id: &radar_domain::JobId) -> Result<Option<radar_domain::Job>, RadarError> {
            Ok(None)
        }
        async fn save_build(&self, _build: &Build) -> Result<(), RadarError> {
            Ok(())
        }
        async fn update_build(&self, _build: &Build) -> Result<(), RadarError> {
            Ok(())
        }
        async fn find_build(&self, _id: &radar_domain::BuildId) -> Result<Option<Build>, RadarError> {
            Ok(None)
        }
        async fn find_pending_builds(&self) -> Result<Vec<Build>, RadarError> {
            self.track_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
        async fn list_builds_for_pipeline(&self, _pipeline_id: &radar_domain::PipelineId) -> Result<Vec<Build>, RadarError> {
            Ok(Vec::new())
        }
        async fn save_build_input(&self, _input: &radar_domain::BuildInput) -> Result<(), RadarError> {
            Ok(())
        }
        async fn save_build_output(&self, _output: &radar_domain::BuildOutput) -> Result<(), RadarError> {
            Ok(())
        }
        async fn list_build_inputs(&self, _build_id: &radar_domain::BuildId) -> Result<Vec<radar_domain::BuildInput>, RadarError> {
            Ok(Vec::new())
        }
        async fn list_build_outputs(&self, _build_id: &radar_domain::BuildId) -> Result<Vec<radar_domain::BuildOutput>, RadarError> {
            Ok(Vec::new())
        }
        async fn delete_build_events_by_build_ids(&self, _build_ids: &[radar_domain::BuildId], _now: chrono::DateTime<chrono::Utc>) -> Result<(), RadarError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn tracks_once_immediately_after_subscribing() {
        let bus = Arc::new(FakeBus {
            shutdown_tx: Mutex::new(None),
            build_started_tx: Mutex::new(None),
        });
        let builds = Arc::new(CountingBuildRepository { track_calls: AtomicUsize::new(0) });
        let runner = BuildTrackerRunner::new(bus, builds.clone(), Duration::from_secs(3600));

        let ctx = test_cancellation_token();
        let (ready_tx, ready_rx) = oneshot::channel();
        let ctx_clone = ctx.clone();
        let handle = tokio::spawn(async move { runner.run(ctx_clone, ready_tx).await });

        ready_rx.await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();
        handle.await.unwrap().unwrap();

        assert_eq!(builds.track_calls.load(Ordering::SeqCst), 1);
    }

    fn test_cancellation_token() -> CancellationToken {
        radar_bootstrap::shutdown::ShutdownCoordinator::new(Duration::from_secs(1)).token()
    }
}
