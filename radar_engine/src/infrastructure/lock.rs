// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`LockService`] (§5 "shared resources").
//!
//! `checking_locks` stores one row per key. `acquired_at` is the instant of
//! the most recent acquire *or* release and drives the non-immediate
//! interval gate: a `try_acquire` with `immediate = false` fails whenever
//! that instant is within `interval` of now. `held` is a separate
//! row-level mutex that only the immediate path sets and checks: two
//! concurrent immediate acquires of the same key must not both succeed
//! (§4.4 step 2 - the content-hash lock relies on this to serialize
//! identical concurrent fetches), so the immediate path is a single
//! atomic upsert guarded by `WHERE held = 0` rather than a separate
//! check-then-touch. A non-immediate acquire never sets `held`, since it
//! models a periodic interval gate rather than exclusive in-flight use.

use async_trait::async_trait;
use chrono::Utc;
use radar_domain::{LockHandle, LockService, RadarError};
use sqlx::SqlitePool;
use std::time::Duration;

fn map_sqlx(err: sqlx::Error) -> RadarError {
    RadarError::database_error(err.to_string())
}

pub struct SqliteLockService {
    pool: SqlitePool,
}

impl SqliteLockService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn touch(&self, key: &str, held: bool) -> Result<(), RadarError> {
        sqlx::query(
            "INSERT INTO checking_locks (key, acquired_at, held) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET acquired_at = excluded.acquired_at, held = excluded.held",
        )
        .bind(key)
        .bind(Utc::now())
        .bind(held)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }
}

struct SqliteLockHandle {
    pool: SqlitePool,
    key: String,
}

#[async_trait]
impl LockHandle for SqliteLockHandle {
    async fn release(self: Box<Self>) {
        let _ = sqlx::query("UPDATE checking_locks SET acquired_at = ?, held = 0 WHERE key = ?")
            .bind(Utc::now())
            .bind(&self.key)
            .execute(&self.pool)
            .await;
    }
}

#[async_trait]
impl LockService for SqliteLockService {
    async fn try_acquire(
        &self,
        key: &str,
        interval: Duration,
        immediate: bool,
    ) -> Result<Option<Box<dyn LockHandle>>, RadarError> {
        if !immediate {
            let row: Option<(chrono::DateTime<Utc>, bool)> = sqlx::query_as("SELECT acquired_at, held FROM checking_locks WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

            if let Some((acquired_at, _held)) = row {
                let elapsed = Utc::now().signed_duration_since(acquired_at);
                if elapsed < chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::zero()) {
                    return Ok(None);
                }
            }

            self.touch(key, false).await?;
            return Ok(Some(Box::new(SqliteLockHandle {
                pool: self.pool.clone(),
                key: key.to_string(),
            })));
        }

        // Atomic acquire-if-not-held: the WHERE clause on the upsert makes
        // the whole statement a no-op (0 rows affected) when another caller
        // already holds this key, instead of a select-then-write race.
        let result = sqlx::query(
            "INSERT INTO checking_locks (key, acquired_at, held) VALUES (?, ?, 1)
             ON CONFLICT(key) DO UPDATE SET acquired_at = excluded.acquired_at, held = 1
             WHERE checking_locks.held = 0",
        )
        .bind(key)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Box::new(SqliteLockHandle {
            pool: self.pool.clone(),
            key: key.to_string(),
        })))
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
    async fn immediate_acquire_ignores_the_interval_gate() {
        let service = SqliteLockService::new(pool().await);
        let handle = service.try_acquire("k", Duration::from_secs(60), true).await.unwrap().unwrap();
        handle.release().await;
        assert!(service.try_acquire("k", Duration::from_secs(60), true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_immediate_acquires_of_the_same_key_serialize() {
        let service = SqliteLockService::new(pool().await);
        let handle = service.try_acquire("k", Duration::from_secs(60), true).await.unwrap().unwrap();

        let second = service.try_acquire("k", Duration::from_secs(60), true).await.unwrap();
        assert!(second.is_none(), "a key already held by another immediate acquire must not be acquired twice");

        handle.release().await;
        assert!(service.try_acquire("k", Duration::from_secs(60), true).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn non_immediate_acquire_fails_within_interval() {
        let service = SqliteLockService::new(pool().await);
        let handle = service.try_acquire("k", Duration::from_secs(60), false).await.unwrap();
        assert!(handle.is_some());

        let second = service.try_acquire("k", Duration::from_secs(60), false).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn release_restarts_the_interval_gate() {
        let service = SqliteLockService::new(pool().await);
        let handle = service.try_acquire("k", Duration::from_secs(60), false).await.unwrap().unwrap();
        handle.release().await;

        let second = service.try_acquire("k", Duration::from_secs(60), false).await.unwrap();
        assert!(second.is_none(), "a release still starts a fresh interval window");
    }

    #[tokio::test]
    async fn acquire_succeeds_once_interval_elapses() {
        let service = SqliteLockService::new(pool().await);
        service.try_acquire("k", Duration::from_millis(10), false).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(service.try_acquire("k", Duration::from_millis(10), false).await.unwrap().is_some());
    }
}
