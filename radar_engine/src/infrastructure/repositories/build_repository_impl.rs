// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`BuildRepository`]. `find_pending_builds` is the query
//! the tracker runner's select loop (§4.3) polls on every tick and on
//! every build-started notification.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use radar_domain::{
    Build, BuildId, BuildInput, BuildOutput, BuildRepository, BuildStatus, Job, JobId, PipelineId, RadarError,
    ResourceConfigId, ResourceId, ResourceVersionId, Space,
};
use sqlx::{Row, SqlitePool};

pub struct SqliteBuildRepository {
    pool: SqlitePool,
}

impl SqliteBuildRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(err: sqlx::Error) -> RadarError {
    RadarError::database_error(err.to_string())
}

fn status_to_str(status: BuildStatus) -> &'static str {
    match status {
        BuildStatus::Pending => "pending",
        BuildStatus::Started => "started",
        BuildStatus::Succeeded => "succeeded",
        BuildStatus::Failed => "failed",
        BuildStatus::Errored => "errored",
        BuildStatus::Aborted => "aborted",
    }
}

fn status_from_str(value: &str) -> Result<BuildStatus, RadarError> {
    match value {
        "pending" => Ok(BuildStatus::Pending),
        "started" => Ok(BuildStatus::Started),
        "succeeded" => Ok(BuildStatus::Succeeded),
        "failed" => Ok(BuildStatus::Failed),
        "errored" => Ok(BuildStatus::Errored),
        "aborted" => Ok(BuildStatus::Aborted),
        other => Err(RadarError::internal_error(format!("unknown build status: {other}"))),
    }
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<Job, RadarError> {
    let pipeline_id: String = row.try_get("pipeline_id").map_err(map_sqlx)?;
    let name: String = row.try_get("name").map_err(map_sqlx)?;
    let serial: bool = row.try_get("serial").map_err(map_sqlx)?;
    let serial_groups: String = row.try_get("serial_groups").map_err(map_sqlx)?;
    let first_logged_build_id: Option<String> = row.try_get("first_logged_build_id").map_err(map_sqlx)?;

    let groups: Vec<String> = serde_json::from_str(&serial_groups)?;
    let mut job = Job::new(PipelineId::from_string(&pipeline_id)?, name).with_serial(serial, groups);
    if let Some(build_id) = first_logged_build_id {
        job.set_first_logged_build_id(BuildId::from_string(&build_id)?);
    }
    Ok(job)
}

fn row_to_build(row: &sqlx::sqlite::SqliteRow) -> Result<Build, RadarError> {
    let id: String = row.try_get("id").map_err(map_sqlx)?;
    let job_id: Option<String> = row.try_get("job_id").map_err(map_sqlx)?;
    let pipeline_id: Option<String> = row.try_get("pipeline_id").map_err(map_sqlx)?;
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    let engine: String = row.try_get("engine").map_err(map_sqlx)?;
    let engine_metadata: String = row.try_get("engine_metadata").map_err(map_sqlx)?;
    let start_time: Option<DateTime<Utc>> = row.try_get("start_time").map_err(map_sqlx)?;
    let end_time: Option<DateTime<Utc>> = row.try_get("end_time").map_err(map_sqlx)?;
    let reap_time: Option<DateTime<Utc>> = row.try_get("reap_time").map_err(map_sqlx)?;
    let has_events: bool = row.try_get("has_events").map_err(map_sqlx)?;

    Ok(Build::from_parts(
        BuildId::from_string(&id)?,
        job_id.map(|v| JobId::from_string(&v)).transpose()?,
        pipeline_id.map(|v| PipelineId::from_string(&v)).transpose()?,
        status_from_str(&status)?,
        engine,
        serde_json::from_str(&engine_metadata)?,
        start_time,
        end_time,
        reap_time,
        has_events,
    ))
}

fn row_to_build_input(row: &sqlx::sqlite::SqliteRow) -> Result<BuildInput, RadarError> {
    let build_id: String = row.try_get("build_id").map_err(map_sqlx)?;
    let name: String = row.try_get("name").map_err(map_sqlx)?;
    let resource_id: String = row.try_get("resource_id").map_err(map_sqlx)?;
    let space: String = row.try_get("space").map_err(map_sqlx)?;
    let version_id: String = row.try_get("version_id").map_err(map_sqlx)?;
    let first_occurrence: bool = row.try_get("first_occurrence").map_err(map_sqlx)?;

    Ok(BuildInput::new(
        BuildId::from_string(&build_id)?,
        name,
        ResourceId::from_string(&resource_id)?,
        Space::new(space)?,
        ResourceVersionId::from_string(&version_id)?,
        first_occurrence,
    ))
}

fn row_to_build_output(row: &sqlx::sqlite::SqliteRow) -> Result<BuildOutput, RadarError> {
    let build_id: String = row.try_get("build_id").map_err(map_sqlx)?;
    let resource_config_id: String = row.try_get("resource_config_id").map_err(map_sqlx)?;
    let space: String = row.try_get("space").map_err(map_sqlx)?;
    let version_id: String = row.try_get("version_id").map_err(map_sqlx)?;
    let output_name: String = row.try_get("output_name").map_err(map_sqlx)?;
    let resource_name: String = row.try_get("resource_name").map_err(map_sqlx)?;

    Ok(BuildOutput::new(
        BuildId::from_string(&build_id)?,
        ResourceConfigId::from_string(&resource_config_id)?,
        Space::new(space)?,
        ResourceVersionId::from_string(&version_id)?,
        output_name,
        resource_name,
    ))
}

#[async_trait]
impl BuildRepository for SqliteBuildRepository {
    async fn save_job(&self, job: &Job) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO jobs (id, pipeline_id, name, serial, serial_groups, first_logged_build_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(job.id().to_string())
        .bind(job.pipeline_id().to_string())
        .bind(job.name())
        .bind(job.is_serial())
        .bind(serde_json::to_string(job.serial_groups())?)
        .bind(job.first_logged_build_id().map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list_jobs(&self, pipeline_id: &PipelineId) -> Result<Vec<Job>, RadarError> {
        let rows = sqlx::query("SELECT * FROM jobs WHERE pipeline_id = ?")
            .bind(pipeline_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_job).collect()
    }

    async fn find_job(&self, id: &JobId) -> Result<Option<Job>, RadarError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn save_build(&self, build: &Build) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO builds (id, job_id, pipeline_id, status, engine, engine_metadata, start_time, end_time, reap_time, has_events)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(build.id().to_string())
        .bind(build.job_id().map(|id| id.to_string()))
        .bind(build.pipeline_id().map(|id| id.to_string()))
        .bind(status_to_str(build.status()))
        .bind(build.engine())
        .bind(serde_json::to_string(build.engine_metadata())?)
        .bind(build.start_time())
        .bind(build.end_time())
        .bind(build.reap_time())
        .bind(build.has_events())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update_build(&self, build: &Build) -> Result<(), RadarError> {
        sqlx::query(
            "UPDATE builds SET status = ?, start_time = ?, end_time = ?, reap_time = ?, has_events = ? WHERE id = ?",
        )
        .bind(status_to_str(build.status()))
        .bind(build.start_time())
        .bind(build.end_time())
        .bind(build.reap_time())
        .bind(build.has_events())
        .bind(build.id().to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_build(&self, id: &BuildId) -> Result<Option<Build>, RadarError> {
        let row = sqlx::query("SELECT * FROM builds WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_build).transpose()
    }

    async fn find_pending_builds(&self) -> Result<Vec<Build>, RadarError> {
        let rows = sqlx::query("SELECT * FROM builds WHERE status IN ('pending', 'started')")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_build).collect()
    }

    async fn list_builds_for_pipeline(&self, pipeline_id: &PipelineId) -> Result<Vec<Build>, RadarError> {
        let rows = sqlx::query("SELECT * FROM builds WHERE pipeline_id = ?")
            .bind(pipeline_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_build).collect()
    }

    async fn save_build_input(&self, input: &BuildInput) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO build_inputs (build_id, name, resource_id, space, version_id, first_occurrence)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(input.build_id().to_string())
        .bind(input.name())
        .bind(input.resource_id().to_string())
        .bind(input.space().as_str())
        .bind(input.version_id().to_string())
        .bind(input.is_first_occurrence())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn save_build_output(&self, output: &BuildOutput) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO build_outputs (build_id, resource_config_id, space, version_id, output_name, resource_name)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(output.build_id().to_string())
        .bind(output.resource_config_id().to_string())
        .bind(output.space().as_str())
        .bind(output.version_id().to_string())
        .bind(output.output_name())
        .bind(output.resource_name())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list_build_inputs(&self, build_id: &BuildId) -> Result<Vec<BuildInput>, RadarError> {
        let rows = sqlx::query("SELECT * FROM build_inputs WHERE build_id = ?")
            .bind(build_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_build_input).collect()
    }

    async fn list_build_outputs(&self, build_id: &BuildId) -> Result<Vec<BuildOutput>, RadarError> {
        let rows = sqlx::query("SELECT * FROM build_outputs WHERE build_id = ?")
            .bind(build_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_build_output).collect()
    }

    async fn delete_build_events_by_build_ids(&self, build_ids: &[BuildId], now: DateTime<Utc>) -> Result<(), RadarError> {
        if build_ids.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        for build_id in build_ids {
            sqlx::query("UPDATE builds SET reap_time = ? WHERE id = ? AND has_events = 1")
                .bind(now)
                .bind(build_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        }
        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_domain::PipelineRepository;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::infrastructure::repositories::schema::ensure_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_pipeline(pool: &SqlitePool) -> PipelineId {
        let repo = crate::infrastructure::repositories::pipeline_repository_impl::SqlitePipelineRepository::new(pool.clone());
        let pipeline = radar_domain::Pipeline::new("release", "team-a").unwrap();
        repo.save(&pipeline).await.unwrap();
        pipeline.id().clone()
    }

    #[tokio::test]
    async fn save_and_find_job_round_trips() {
        let pool = pool().await;
        let pipeline_id = seed_pipeline(&pool).await;
        let repo = SqliteBuildRepository::new(pool);

        let job = Job::new(pipeline_id, "deploy").with_serial(true, vec!["prod".into()]);
        repo.save_job(&job).await.unwrap();

        let found = repo.find_job(job.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "deploy");
        assert!(found.is_serial());
        assert_eq!(found.serial_groups(), &["prod".to_string()]);
    }

    #[tokio::test]
    async fn find_pending_builds_excludes_terminal_builds() {
        let pool = pool().await;
        let repo = SqliteBuildRepository::new(pool);

        let mut running = Build::new_one_off("exec");
        running.start();
        repo.save_build(&running).await.unwrap();

        let mut finished = Build::new_one_off("exec");
        finished.start();
        finished.finish(BuildStatus::Succeeded);
        repo.save_build(&finished).await.unwrap();

        let pending = repo.find_pending_builds().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id(), running.id());
    }

    #[tokio::test]
    async fn update_build_persists_terminal_status() {
        let pool = pool().await;
        let repo = SqliteBuildRepository::new(pool);

        let mut build = Build::new_one_off("exec");
        repo.save_build(&build).await.unwrap();

        build.start();
        build.finish(BuildStatus::Failed);
        repo.update_build(&build).await.unwrap();

        let found = repo.find_build(build.id()).await.unwrap().unwrap();
        assert_eq!(found.status(), BuildStatus::Failed);
    }

    #[tokio::test]
    async fn delete_build_events_only_reaps_builds_that_had_events() {
        let pool = pool().await;
        let repo = SqliteBuildRepository::new(pool);

        let mut with_events = Build::new_one_off("exec");
        with_events.record_event();
        repo.save_build(&with_events).await.unwrap();

        let without_events = Build::new_one_off("exec");
        repo.save_build(&without_events).await.unwrap();

        let now = Utc::now();
        repo.delete_build_events_by_build_ids(&[with_events.id().clone(), without_events.id().clone()], now)
            .await
            .unwrap();

        let a = repo.find_build(with_events.id()).await.unwrap().unwrap();
        let b = repo.find_build(without_events.id()).await.unwrap().unwrap();
        assert!(a.reap_time().is_some());
        assert!(b.reap_time().is_none());
    }
}
