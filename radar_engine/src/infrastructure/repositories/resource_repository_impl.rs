// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`ResourceRepository`]. `save_versions` is the one method
//! that touches `check_order`: every other path that references an
//! existing `ResourceVersion` row (build inputs/outputs, get-step) must
//! leave it untouched (§3 invariant 2).

use async_trait::async_trait;
use radar_domain::{
    CheckObservation, CheckOrder, PipelineId, RadarError, Resource, ResourceCache, ResourceConfig, ResourceConfigId,
    ResourceId, ResourceRepository, ResourceType, ResourceTypeId, ResourceVersion, ResourceVersionId, Space,
};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

pub struct SqliteResourceRepository {
    pool: SqlitePool,
}

impl SqliteResourceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx(err: sqlx::Error) -> RadarError {
    RadarError::database_error(err.to_string())
}

fn row_to_resource(row: &sqlx::sqlite::SqliteRow) -> Result<Resource, RadarError> {
    let pipeline_id: String = row.try_get("pipeline_id").map_err(map_sqlx)?;
    let name: String = row.try_get("name").map_err(map_sqlx)?;
    let resource_type: String = row.try_get("resource_type").map_err(map_sqlx)?;
    let source: String = row.try_get("source").map_err(map_sqlx)?;
    let check_every: Option<String> = row.try_get("check_every").map_err(map_sqlx)?;
    let check_error: Option<String> = row.try_get("check_error").map_err(map_sqlx)?;
    let resource_config_id: Option<String> = row.try_get("resource_config_id").map_err(map_sqlx)?;

    let mut resource = Resource::new(
        PipelineId::from_string(&pipeline_id)?,
        name,
        resource_type,
        serde_json::from_str(&source)?,
    )
    .with_check_every(check_every);
    if let Some(message) = check_error {
        resource.set_check_error(message);
    }
    if let Some(config_id) = resource_config_id {
        resource.bind_resource_config(ResourceConfigId::from_string(&config_id)?);
    }
    Ok(resource)
}

fn row_to_resource_type(row: &sqlx::sqlite::SqliteRow) -> Result<ResourceType, RadarError> {
    let pipeline_id: String = row.try_get("pipeline_id").map_err(map_sqlx)?;
    let name: String = row.try_get("name").map_err(map_sqlx)?;
    let resource_type: String = row.try_get("resource_type").map_err(map_sqlx)?;
    let source: String = row.try_get("source").map_err(map_sqlx)?;
    let check_error: Option<String> = row.try_get("check_error").map_err(map_sqlx)?;
    let resource_config_id: Option<String> = row.try_get("resource_config_id").map_err(map_sqlx)?;
    let version: Option<String> = row.try_get("version").map_err(map_sqlx)?;

    let mut entity = ResourceType::new(PipelineId::from_string(&pipeline_id)?, name, resource_type, serde_json::from_str(&source)?);
    if let Some(message) = check_error {
        entity.set_check_error(message);
    }
    if let Some(config_id) = resource_config_id {
        entity.bind_resource_config(ResourceConfigId::from_string(&config_id)?);
    }
    if let Some(version) = version {
        entity.set_version(serde_json::from_str(&version)?);
    }
    Ok(entity)
}

fn row_to_resource_version(row: &sqlx::sqlite::SqliteRow) -> Result<ResourceVersion, RadarError> {
    let resource_config_id: String = row.try_get("resource_config_id").map_err(map_sqlx)?;
    let space: String = row.try_get("space").map_err(map_sqlx)?;
    let version: String = row.try_get("version").map_err(map_sqlx)?;
    let metadata: String = row.try_get("metadata").map_err(map_sqlx)?;
    let check_order: i64 = row.try_get("check_order").map_err(map_sqlx)?;

    let mut entity = ResourceVersion::new_unchecked(
        ResourceConfigId::from_string(&resource_config_id)?,
        Space::new(space)?,
        serde_json::from_str(&version)?,
    );
    if check_order > 0 {
        CheckObservation::apply(&mut entity, CheckOrder::new(check_order as u64), serde_json::from_str(&metadata)?);
    }
    Ok(entity)
}

#[async_trait]
impl ResourceRepository for SqliteResourceRepository {
    async fn save_resource(&self, resource: &Resource) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO resources (id, pipeline_id, name, resource_type, source, check_every, check_error, resource_config_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(resource.id().to_string())
        .bind(resource.pipeline_id().to_string())
        .bind(resource.name())
        .bind(resource.resource_type())
        .bind(serde_json::to_string(resource.source())?)
        .bind(resource.check_every())
        .bind(resource.check_error())
        .bind(resource.resource_config_id().map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_resource(&self, id: &ResourceId) -> Result<Option<Resource>, RadarError> {
        let row = sqlx::query("SELECT * FROM resources WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_resource).transpose()
    }

    async fn find_resource_by_name(&self, pipeline_id: &PipelineId, name: &str) -> Result<Option<Resource>, RadarError> {
        let row = sqlx::query("SELECT * FROM resources WHERE pipeline_id = ? AND name = ?")
            .bind(pipeline_id.to_string())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_resource).transpose()
    }

    async fn list_resources(&self, pipeline_id: &PipelineId) -> Result<Vec<Resource>, RadarError> {
        let rows = sqlx::query("SELECT * FROM resources WHERE pipeline_id = ?")
            .bind(pipeline_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_resource).collect()
    }

    async fn update_resource(&self, resource: &Resource) -> Result<(), RadarError> {
        sqlx::query(
            "UPDATE resources SET check_every = ?, check_error = ?, resource_config_id = ? WHERE id = ?",
        )
        .bind(resource.check_every())
        .bind(resource.check_error())
        .bind(resource.resource_config_id().map(|id| id.to_string()))
        .bind(resource.id().to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn save_resource_type(&self, resource_type: &ResourceType) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO resource_types (id, pipeline_id, name, resource_type, source, check_every, check_error, resource_config_id, version)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(resource_type.id().to_string())
        .bind(resource_type.pipeline_id().to_string())
        .bind(resource_type.name())
        .bind(resource_type.resource_type())
        .bind(serde_json::to_string(resource_type.source())?)
        .bind(Option::<String>::None)
        .bind(resource_type.check_error())
        .bind(resource_type.resource_config_id().map(|id| id.to_string()))
        .bind(resource_type.version().map(serde_json::to_string).transpose()?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list_resource_types(&self, pipeline_id: &PipelineId) -> Result<Vec<ResourceType>, RadarError> {
        let rows = sqlx::query("SELECT * FROM resource_types WHERE pipeline_id = ?")
            .bind(pipeline_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_resource_type).collect()
    }

    async fn update_resource_type(&self, resource_type: &ResourceType) -> Result<(), RadarError> {
        sqlx::query(
            "UPDATE resource_types SET check_error = ?, resource_config_id = ?, version = ? WHERE id = ?",
        )
        .bind(resource_type.check_error())
        .bind(resource_type.resource_config_id().map(|id| id.to_string()))
        .bind(resource_type.version().map(serde_json::to_string).transpose()?)
        .bind(resource_type.id().to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_or_create_resource_config(
        &self,
        resource_type: &str,
        source: &Value,
        versioned_types: &[Value],
    ) -> Result<ResourceConfig, RadarError> {
        let candidate = ResourceConfig::new(resource_type, source.clone(), versioned_types);
        let source_json = serde_json::to_string(source)?;

        let existing = sqlx::query("SELECT id FROM resource_configs WHERE resource_type = ? AND source = ? AND resource_types_digest = ?")
            .bind(resource_type)
            .bind(&source_json)
            .bind(candidate.resource_types_digest())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if let Some(row) = existing {
            let id: String = row.try_get("id").map_err(map_sqlx)?;
            return self
                .find_resource_config(&ResourceConfigId::from_string(&id)?)
                .await?
                .ok_or_else(|| RadarError::internal_error("resource_config vanished after lookup"));
        }

        sqlx::query("INSERT INTO resource_configs (id, resource_type, source, resource_types_digest) VALUES (?, ?, ?, ?)")
            .bind(candidate.id().to_string())
            .bind(resource_type)
            .bind(&source_json)
            .bind(candidate.resource_types_digest())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(candidate)
    }

    async fn find_resource_config(&self, id: &ResourceConfigId) -> Result<Option<ResourceConfig>, RadarError> {
        let row = sqlx::query("SELECT * FROM resource_configs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        let Some(row) = row else { return Ok(None) };

        let resource_type: String = row.try_get("resource_type").map_err(map_sqlx)?;
        let source: String = row.try_get("source").map_err(map_sqlx)?;
        let mut config = ResourceConfig::new(resource_type, serde_json::from_str(&source)?, &[]);

        let latest = sqlx::query("SELECT space, version FROM resource_config_latest_versions WHERE resource_config_id = ?")
            .bind(id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        for latest_row in latest {
            let space: String = latest_row.try_get("space").map_err(map_sqlx)?;
            let version: String = latest_row.try_get("version").map_err(map_sqlx)?;
            config.save_space_latest_version(Space::new(space)?, serde_json::from_str(&version)?);
        }
        Ok(Some(config))
    }

    async fn save_versions(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        versions: &[(Value, Value)],
    ) -> Result<(), RadarError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let mut order = self.max_check_order(resource_config_id, space).await?;

        for (version, metadata) in versions {
            let version_json = serde_json::to_string(version)?;
            let existing = sqlx::query("SELECT id FROM resource_versions WHERE resource_config_id = ? AND space = ? AND version = ?")
                .bind(resource_config_id.to_string())
                .bind(space.as_str())
                .bind(&version_json)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;

            order = order.next();
            let metadata_json = serde_json::to_string(metadata)?;

            if let Some(row) = existing {
                let id: String = row.try_get("id").map_err(map_sqlx)?;
                sqlx::query("UPDATE resource_versions SET check_order = ?, metadata = ? WHERE id = ?")
                    .bind(order.value() as i64)
                    .bind(&metadata_json)
                    .bind(&id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx)?;
            } else {
                sqlx::query(
                    "INSERT INTO resource_versions (id, resource_config_id, space, version, metadata, check_order)
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(ResourceVersionId::new().to_string())
                .bind(resource_config_id.to_string())
                .bind(space.as_str())
                .bind(&version_json)
                .bind(&metadata_json)
                .bind(order.value() as i64)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
            }
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn save_space_latest_version(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
    ) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO resource_config_latest_versions (resource_config_id, space, version) VALUES (?, ?, ?)
             ON CONFLICT(resource_config_id, space) DO UPDATE SET version = excluded.version",
        )
        .bind(resource_config_id.to_string())
        .bind(space.as_str())
        .bind(serde_json::to_string(version)?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn latest_versions(&self, resource_config_id: &ResourceConfigId) -> Result<Vec<ResourceVersion>, RadarError> {
        let rows = sqlx::query(
            "SELECT * FROM resource_versions rv
             WHERE resource_config_id = ?
               AND check_order = (SELECT MAX(check_order) FROM resource_versions WHERE resource_config_id = rv.resource_config_id AND space = rv.space)",
        )
        .bind(resource_config_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;
        rows.iter().map(row_to_resource_version).collect()
    }

    async fn find_or_create_unchecked_version(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
    ) -> Result<ResourceVersion, RadarError> {
        let version_json = serde_json::to_string(version)?;
        let existing = sqlx::query("SELECT * FROM resource_versions WHERE resource_config_id = ? AND space = ? AND version = ?")
            .bind(resource_config_id.to_string())
            .bind(space.as_str())
            .bind(&version_json)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        if let Some(row) = existing {
            return row_to_resource_version(&row);
        }

        let entity = ResourceVersion::new_unchecked(resource_config_id.clone(), space.clone(), version.clone());
        sqlx::query(
            "INSERT INTO resource_versions (id, resource_config_id, space, version, metadata, check_order) VALUES (?, ?, ?, ?, ?, 0)",
        )
        .bind(entity.id().to_string())
        .bind(resource_config_id.to_string())
        .bind(space.as_str())
        .bind(&version_json)
        .bind(serde_json::to_string(entity.metadata())?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(entity)
    }

    async fn find_version(&self, id: &ResourceVersionId) -> Result<Option<ResourceVersion>, RadarError> {
        let row = sqlx::query("SELECT * FROM resource_versions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_resource_version).transpose()
    }

    async fn disable_version(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<(), RadarError> {
        sqlx::query("INSERT OR IGNORE INTO resource_version_disabled (resource_id, version_id) VALUES (?, ?)")
            .bind(resource_id.to_string())
            .bind(version_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn enable_version(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<(), RadarError> {
        sqlx::query("DELETE FROM resource_version_disabled WHERE resource_id = ? AND version_id = ?")
            .bind(resource_id.to_string())
            .bind(version_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn is_disabled(&self, resource_id: &ResourceId, version_id: &ResourceVersionId) -> Result<bool, RadarError> {
        let row = sqlx::query("SELECT 1 FROM resource_version_disabled WHERE resource_id = ? AND version_id = ?")
            .bind(resource_id.to_string())
            .bind(version_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.is_some())
    }

    async fn set_resource_check_error(&self, resource_id: &ResourceId, message: Option<&str>) -> Result<(), RadarError> {
        sqlx::query("UPDATE resources SET check_error = ? WHERE id = ?")
            .bind(message)
            .bind(resource_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn set_resource_type_check_error(&self, resource_type_id: &ResourceTypeId, message: Option<&str>) -> Result<(), RadarError> {
        sqlx::query("UPDATE resource_types SET check_error = ? WHERE id = ?")
            .bind(message)
            .bind(resource_type_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn bind_resource_config(&self, resource_id: &ResourceId, resource_config_id: &ResourceConfigId) -> Result<(), RadarError> {
        sqlx::query("UPDATE resources SET resource_config_id = ? WHERE id = ?")
            .bind(resource_config_id.to_string())
            .bind(resource_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn max_check_order(&self, resource_config_id: &ResourceConfigId, space: &Space) -> Result<CheckOrder, RadarError> {
        let row = sqlx::query("SELECT MAX(check_order) as max_order FROM resource_versions WHERE resource_config_id = ? AND space = ?")
            .bind(resource_config_id.to_string())
            .bind(space.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        let max_order: Option<i64> = row.try_get("max_order").map_err(map_sqlx)?;
        Ok(CheckOrder::new(max_order.unwrap_or(0) as u64))
    }

    async fn find_or_create_resource_cache(
        &self,
        resource_config_id: &ResourceConfigId,
        space: &Space,
        version: &Value,
        params: &Value,
    ) -> Result<ResourceCache, RadarError> {
        let candidate = ResourceCache::new(resource_config_id.clone(), space.clone(), version.clone(), params);
        let version_json = serde_json::to_string(version)?;

        let existing = sqlx::query(
            "SELECT id FROM resource_caches WHERE resource_config_id = ? AND space = ? AND version = ? AND params_digest = ?",
        )
        .bind(resource_config_id.to_string())
        .bind(space.as_str())
        .bind(&version_json)
        .bind(candidate.params_digest())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if existing.is_some() {
            return Ok(candidate);
        }

        sqlx::query("INSERT INTO resource_caches (id, resource_config_id, space, version, params_digest) VALUES (?, ?, ?, ?, ?)")
            .bind(candidate.id().to_string())
            .bind(resource_config_id.to_string())
            .bind(space.as_str())
            .bind(&version_json)
            .bind(candidate.params_digest())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(candidate)
    }

    async fn list_versions_for_pipeline(&self, pipeline_id: &PipelineId) -> Result<Vec<(ResourceId, ResourceVersion)>, RadarError> {
        let rows = sqlx::query(
            "SELECT r.id as resource_id, rv.* FROM resource_versions rv
             JOIN resources r ON r.resource_config_id = rv.resource_config_id
             WHERE r.pipeline_id = ?",
        )
        .bind(pipeline_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter()
            .map(|row| {
                let resource_id: String = row.try_get("resource_id").map_err(map_sqlx)?;
                Ok((ResourceId::from_string(&resource_id)?, row_to_resource_version(row)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_domain::PipelineRepository;
    use serde_json::json;

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
    async fn find_or_create_resource_config_is_idempotent() {
        let pool = pool().await;
        let repo = SqliteResourceRepository::new(pool);
        let source = json!({"uri": "x"});
        let a = repo.find_or_create_resource_config("git", &source, &[]).await.unwrap();
        let b = repo.find_or_create_resource_config("git", &source, &[]).await.unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[tokio::test]
    async fn save_versions_assigns_monotonic_check_order() {
        let pool = pool().await;
        let repo = SqliteResourceRepository::new(pool);
        let config = repo.find_or_create_resource_config("git", &json!({}), &[]).await.unwrap();
        let space = Space::default_space();

        repo.save_versions(config.id(), &space, &[(json!({"ref": "a"}), json!({}))]).await.unwrap();
        repo.save_versions(config.id(), &space, &[(json!({"ref": "b"}), json!({}))]).await.unwrap();

        let versions = repo.latest_versions(config.id()).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version(), &json!({"ref": "b"}));
    }

    #[tokio::test]
    async fn save_versions_does_not_duplicate_rows_for_same_version() {
        let pool = pool().await;
        let repo = SqliteResourceRepository::new(pool);
        let config = repo.find_or_create_resource_config("git", &json!({}), &[]).await.unwrap();
        let space = Space::default_space();

        repo.save_versions(config.id(), &space, &[(json!({"ref": "a"}), json!({}))]).await.unwrap();
        repo.save_versions(config.id(), &space, &[(json!({"ref": "a"}), json!({"note": "again"}))]).await.unwrap();

        let max_order = repo.max_check_order(config.id(), &space).await.unwrap();
        assert_eq!(max_order, CheckOrder::new(2));
    }

    #[tokio::test]
    async fn disable_then_enable_round_trips() {
        let pool = pool().await;
        let pipeline_id = seed_pipeline(&pool).await;
        let repo = SqliteResourceRepository::new(pool);

        let resource = radar_domain::Resource::new(pipeline_id, "app-repo", "git", json!({}));
        repo.save_resource(&resource).await.unwrap();
        let config = repo.find_or_create_resource_config("git", &json!({}), &[]).await.unwrap();
        let version = repo.find_or_create_unchecked_version(config.id(), &Space::default_space(), &json!({"ref": "a"})).await.unwrap();

        assert!(!repo.is_disabled(resource.id(), version.id()).await.unwrap());
        repo.disable_version(resource.id(), version.id()).await.unwrap();
        assert!(repo.is_disabled(resource.id(), version.id()).await.unwrap());
        repo.enable_version(resource.id(), version.id()).await.unwrap();
        assert!(!repo.is_disabled(resource.id(), version.id()).await.unwrap());
    }

    #[tokio::test]
    async fn find_or_create_unchecked_version_is_idempotent() {
        let pool = pool().await;
        let repo = SqliteResourceRepository::new(pool);
        let config = repo.find_or_create_resource_config("git", &json!({}), &[]).await.unwrap();
        let space = Space::default_space();
        let version = json!({"ref": "a"});

        let first = repo.find_or_create_unchecked_version(config.id(), &space, &version).await.unwrap();
        let second = repo.find_or_create_unchecked_version(config.id(), &space, &version).await.unwrap();
        assert_eq!(first.id(), second.id());
        assert!(!first.is_checked());
    }
}
