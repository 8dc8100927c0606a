// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root for the `radar` binary.
//!
//! Three commands, all built on the same `AppConfig`/sqlite pool:
//!
//! - `run` - the long-lived process: one `RadarScanner` sweep loop per
//!   pipeline/resource plus the `BuildTrackerRunner`, both cancelled by the
//!   same `CancellationToken` the signal handler feeds.
//! - `scan` - a one-shot manual check (§4.1 `ScanFromVersion`).
//! - `migrate` - applies pending sqlite migrations and exits.

use radar_bootstrap::cli::ValidatedCommand;
use radar_bootstrap::config::{AppConfig, LogLevel};
use radar_bootstrap::shutdown::{CancellationToken, ShutdownCoordinator};
use radar_bootstrap::{parse_and_validate, ExitCode};
use radar_domain::{PipelineRepository, RadarError, ResourceRepository, Space};
use radar_engine::infrastructure::clock::SystemClock;
use radar_engine::infrastructure::credentials::StaticCredentialVariables;
use radar_engine::infrastructure::lock::SqliteLockService;
use radar_engine::infrastructure::logging;
use radar_engine::infrastructure::notification::BroadcastNotificationBus;
use radar_engine::infrastructure::repositories::{schema, SqliteBuildRepository, SqlitePipelineRepository, SqliteResourceRepository};
use radar_engine::infrastructure::resource_driver::ProcessResourceDriver;
use radar_engine::{BuildTrackerRunner, RadarScanner};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let validated = match parse_and_validate() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("invalid command line: {err}");
            return std::process::ExitCode::from(ExitCode::UsageError.as_i32() as u8);
        }
    };

    let outcome = match validated.command {
        ValidatedCommand::Run { database_url, check_every, tracker_interval_secs, worker_name } => {
            run_command(database_url, check_every, tracker_interval_secs, worker_name, validated.verbose).await
        }
        ValidatedCommand::Scan { pipeline, resource, from_version } => {
            scan_command(pipeline, resource, from_version, validated.verbose).await
        }
        ValidatedCommand::Migrate { database_url } => migrate_command(database_url, validated.verbose).await,
    };

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, category = err.category(), "fatal error");
            std::process::ExitCode::from(ExitCode::from_error_with_category(&err, Some(err.category())).as_i32() as u8)
        }
    }
}

fn log_level_for(verbose: bool) -> LogLevel {
    if verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

async fn open_pool(database_url: &str) -> Result<SqlitePool, RadarError> {
    schema::initialize_database(database_url).await.map_err(|e| RadarError::database_error(e.to_string()))
}

async fn migrate_command(database_url: String, verbose: bool) -> Result<(), RadarError> {
    logging::init(log_level_for(verbose));
    let pool = open_pool(&database_url).await?;
    pool.close().await;
    info!(%database_url, "migrations applied");
    Ok(())
}

async fn scan_command(pipeline: String, resource: String, from_version: Option<String>, verbose: bool) -> Result<(), RadarError> {
    logging::init(log_level_for(verbose));
    let config = AppConfig::builder().app_name("radar").verbose(verbose).try_build().map_err(RadarError::config)?;
    let pool = open_pool(config.database_url()).await?;

    let pipelines: Arc<dyn PipelineRepository> = Arc::new(SqlitePipelineRepository::new(pool.clone()));
    let resources: Arc<dyn ResourceRepository> = Arc::new(SqliteResourceRepository::new(pool.clone()));
    let scanner = build_scanner(pool, pipelines.clone(), resources.clone(), &config);

    let found = pipelines
        .list_all()
        .await?
        .into_iter()
        .find(|p| p.name() == pipeline)
        .ok_or_else(|| RadarError::PipelineNotFound(pipeline.clone()))?;

    let target = resources
        .list_resources(found.id())
        .await?
        .into_iter()
        .find(|r| r.name() == resource)
        .ok_or_else(|| RadarError::ResourceNotFound(resource.clone()))?;

    let from = match from_version {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| RadarError::config(format!("invalid --from-version JSON: {e}")))?,
        None => serde_json::Value::Null,
    };

    scanner.scan_from_version(target.id(), Space::default_space(), from).await?;
    info!(%pipeline, %resource, "manual scan finished");
    Ok(())
}

async fn run_command(
    database_url: String,
    check_every: Option<String>,
    tracker_interval_secs: u64,
    worker_name: String,
    verbose: bool,
) -> Result<(), RadarError> {
    let mut builder = AppConfig::builder()
        .app_name("radar")
        .verbose(verbose)
        .database_url(database_url)
        .tracker_interval(Duration::from_secs(tracker_interval_secs))
        .worker_name(worker_name)
        .log_level(log_level_for(verbose));
    if let Some(ce) = check_every {
        let interval = humantime::parse_duration(&ce).map_err(|e| RadarError::config(format!("invalid --check-every: {e}")))?;
        builder = builder.default_check_interval(interval);
    }
    let config = builder.try_build().map_err(RadarError::config)?;

    logging::init(config.log_level());
    info!(app = config.app_name(), worker = config.worker_name(), "starting radar engine");

    let pool = open_pool(config.database_url()).await?;
    let pipelines: Arc<dyn PipelineRepository> = Arc::new(SqlitePipelineRepository::new(pool.clone()));
    let resources: Arc<dyn ResourceRepository> = Arc::new(SqliteResourceRepository::new(pool.clone()));
    let builds = Arc::new(SqliteBuildRepository::new(pool.clone()));
    let bus = Arc::new(BroadcastNotificationBus::new());

    let scanner = Arc::new(build_scanner(pool.clone(), pipelines.clone(), resources.clone(), &config));
    let tracker = BuildTrackerRunner::new(bus, builds, config.tracker_interval());

    let coordinator = Arc::new(ShutdownCoordinator::new(config.shutdown_grace_period()));
    let ctx = coordinator.token();

    let signal_handler = radar_bootstrap::signals::create_signal_handler();
    let signal_coordinator = coordinator.clone();
    let signal_task = tokio::spawn(async move {
        signal_handler
            .wait_for_signal(Box::new(move || signal_coordinator.initiate_shutdown()))
            .await;
    });

    let (tracker_ready_tx, tracker_ready_rx) = oneshot::channel();
    let tracker_ctx = ctx.clone();
    let tracker_task = tokio::spawn(async move { tracker.run(tracker_ctx, tracker_ready_tx).await });
    let _ = tracker_ready_rx.await;

    let scan_ctx = ctx.clone();
    let scan_scanner = scanner.clone();
    let scan_pipelines = pipelines.clone();
    let scan_resources = resources.clone();
    let default_interval = config.default_check_interval();
    let sweep_task = tokio::spawn(async move {
        sweep_loop(scan_scanner, scan_pipelines, scan_resources, default_interval, scan_ctx).await
    });

    let join_coordinator = coordinator.clone();
    let join_task = tokio::spawn(async move {
        let tracker_result = tracker_task.await;
        let sweep_result = sweep_task.await;
        join_coordinator.complete_shutdown();
        (tracker_result, sweep_result)
    });

    ctx.cancelled().await;
    if !coordinator.wait_for_shutdown().await {
        warn!("shutdown grace period expired, some tasks may still be running");
    }
    signal_task.abort();

    let (tracker_result, sweep_result) = join_task.await.map_err(|e| RadarError::internal_error(e.to_string()))?;
    match tracker_result {
        Ok(Ok(())) => {}
        Ok(Err(err)) => error!(%err, "build tracker runner exited with error"),
        Err(err) => error!(%err, "build tracker runner task panicked"),
    }
    if let Err(err) = sweep_result {
        error!(%err, "radar sweep task panicked");
    }

    info!("shutdown complete");
    Ok(())
}

fn build_scanner(pool: SqlitePool, pipelines: Arc<dyn PipelineRepository>, resources: Arc<dyn ResourceRepository>, config: &AppConfig) -> RadarScanner {
    let lock_service = Arc::new(SqliteLockService::new(pool));
    let driver = Arc::new(ProcessResourceDriver::new());
    let credentials = Arc::new(StaticCredentialVariables::new(HashMap::new()));
    let clock = Arc::new(SystemClock);
    RadarScanner::new(pipelines, resources, lock_service, driver, credentials, clock)
}

/// Sweeps every pipeline's resources and custom resource types once per
/// `default_interval`, stopping as soon as `ctx` is cancelled. Each
/// resource's own `resolve_check_interval` still gates how often its
/// `check` script actually runs (§4.1 rule 1); this loop is just the
/// outer tick that drives the sweep.
async fn sweep_loop(
    scanner: Arc<RadarScanner>,
    pipelines: Arc<dyn PipelineRepository>,
    resources: Arc<dyn ResourceRepository>,
    default_interval: Duration,
    ctx: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = ctx.cancelled() => return,
            () = tokio::time::sleep(default_interval) => {}
        }

        let all_pipelines = match pipelines.list_all().await {
            Ok(p) => p,
            Err(err) => {
                warn!(%err, "failed to list pipelines for sweep");
                continue;
            }
        };

        for pipeline in &all_pipelines {
            if ctx.is_cancelled() {
                return;
            }
            let Ok(owned_resources) = resources.list_resources(pipeline.id()).await else { continue };
            for resource in owned_resources {
                if let Err(err) = scanner.scan_resource(resource.id(), default_interval, false).await {
                    warn!(resource_id = %resource.id(), %err, "resource check failed");
                }
            }

            let Ok(resource_types) = resources.list_resource_types(pipeline.id()).await else { continue };
            for resource_type in resource_types {
                if let Err(err) = scanner.scan_resource_type(pipeline.id(), resource_type.id(), default_interval, false).await {
                    warn!(resource_type_id = %resource_type.id(), %err, "resource type check failed");
                }
            }
        }
    }
}
