// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`PipelineRepository`]. `delete` cascades through the
//! owned jobs/resources/builds (§3 invariant 6); resource-configs shared
//! with another pipeline are left alone.

use async_trait::async_trait;
use radar_domain::{Pipeline, PipelineId, PipelineRepository, RadarError};
use sqlx::{Row, SqlitePool};

pub struct SqlitePipelineRepository {
    pool: SqlitePool,
}

impl SqlitePipelineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(err: sqlx::Error) -> RadarError {
    RadarError::database_error(err.to_string())
}

fn row_to_pipeline(row: &sqlx::sqlite::SqliteRow) -> Result<Pipeline, RadarError> {
    let id: String = row.try_get("id").map_err(map_sqlx)?;
    let name: String = row.try_get("name").map_err(map_sqlx)?;
    let team_id: String = row.try_get("team_id").map_err(map_sqlx)?;
    let paused: bool = row.try_get("paused").map_err(map_sqlx)?;
    let config_version: i64 = row.try_get("config_version").map_err(map_sqlx)?;
    Ok(Pipeline::from_parts(
        PipelineId::from_string(&id)?,
        name,
        team_id,
        paused,
        config_version as u64,
    ))
}

#[async_trait]
impl PipelineRepository for SqlitePipelineRepository {
    async fn save(&self, pipeline: &Pipeline) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO pipelines (id, name, team_id, paused, config_version) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(pipeline.id().to_string())
        .bind(pipeline.name())
        .bind(pipeline.team_id())
        .bind(pipeline.is_paused())
        .bind(pipeline.config_version() as i64)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: &PipelineId) -> Result<Option<Pipeline>, RadarError> {
        let row = sqlx::query("SELECT * FROM pipelines WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_pipeline).transpose()
    }

    async fn find_by_team_and_name(&self, team_id: &str, name: &str) -> Result<Option<Pipeline>, RadarError> {
        let row = sqlx::query("SELECT * FROM pipelines WHERE team_id = ? AND name = ?")
            .bind(team_id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_pipeline).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Pipeline>, RadarError> {
        let rows = sqlx::query("SELECT * FROM pipelines").fetch_all(&self.pool).await.map_err(map_sqlx)?;
        rows.iter().map(row_to_pipeline).collect()
    }

    async fn update(&self, pipeline: &Pipeline) -> Result<(), RadarError> {
        sqlx::query("UPDATE pipelines SET name = ?, paused = ?, config_version = ? WHERE id = ?")
            .bind(pipeline.name())
            .bind(pipeline.is_paused())
            .bind(pipeline.config_version() as i64)
            .bind(pipeline.id().to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn delete(&self, id: &PipelineId) -> Result<bool, RadarError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let id_str = id.to_string();

        // Cascade through jobs/resources/builds owned exclusively by this
        // pipeline. Resource-configs are left in place - other pipelines may
        // still reference them (§3 invariant 5).
        sqlx::query(
            "DELETE FROM build_outputs WHERE build_id IN (SELECT id FROM builds WHERE pipeline_id = ?)",
        )
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        sqlx::query(
            "DELETE FROM build_inputs WHERE build_id IN (SELECT id FROM builds WHERE pipeline_id = ?)",
        )
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        sqlx::query("DELETE FROM builds WHERE pipeline_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        sqlx::query("DELETE FROM jobs WHERE pipeline_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        sqlx::query("DELETE FROM resources WHERE pipeline_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        sqlx::query("DELETE FROM resource_types WHERE pipeline_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        let result = sqlx::query("DELETE FROM pipelines WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        crate::infrastructure::repositories::schema::ensure_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn save_and_find_round_trips() {
        let repo = SqlitePipelineRepository::new(pool().await);
        let pipeline = Pipeline::new("release", "team-a").unwrap();
        repo.save(&pipeline).await.unwrap();

        let found = repo.find_by_id(pipeline.id()).await.unwrap().unwrap();
        assert_eq!(found.name(), "release");
        assert_eq!(found.team_id(), "team-a");
    }

    #[tokio::test]
    async fn find_by_team_and_name_resolves_after_rename() {
        let repo = SqlitePipelineRepository::new(pool().await);
        let mut pipeline = Pipeline::new("release", "team-a").unwrap();
        repo.save(&pipeline).await.unwrap();

        pipeline.rename("release-2").unwrap();
        repo.update(&pipeline).await.unwrap();

        assert!(repo.find_by_team_and_name("team-a", "release").await.unwrap().is_none());
        let found = repo.find_by_team_and_name("team-a", "release-2").await.unwrap().unwrap();
        assert_eq!(found.config_version(), 2);
    }

    #[tokio::test]
    async fn delete_cascades_jobs_and_resources() {
        let repo = SqlitePipelineRepository::new(pool().await);
        let pipeline = Pipeline::new("release", "team-a").unwrap();
        repo.save(&pipeline).await.unwrap();

        assert!(repo.delete(pipeline.id()).await.unwrap());
        assert!(repo.find_by_id(pipeline.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_pipeline_returns_false() {
        let repo = SqlitePipelineRepository::new(pool().await);
        assert!(!repo.delete(&PipelineId::new()).await.unwrap());
    }
}
