//! Session repository for database operations

use crate::db::connection::DatabasePool;
use crate::db::models::Session;
use chrono::Utc;

/// Session repository for managing session database operations
pub struct SessionRepository;

impl SessionRepository {
    /// Create a new session
    pub async fn create(
        pool: &DatabasePool,
        id: String,
        client_id: String,
        connection_type: String,
    ) -> Result<Session, sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, client_id, connection_type, is_active, created_at, updated_at, last_heartbeat)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
        .bind(&id)
        .bind(&client_id)
        .bind(&connection_type)
        .bind(1)
        .bind(&now)
        .bind(&now)
        .bind(&now)
        .fetch_one(pool)
        .await
    }

    /// Get a session by ID
    pub async fn get_by_id(
        pool: &DatabasePool,
        id: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Get a session by client ID
    pub async fn get_by_client_id(
        pool: &DatabasePool,
        client_id: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE client_id = ?")
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// List all active sessions
    pub async fn list_active(pool: &DatabasePool) -> Result<Vec<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE is_active = 1 ORDER BY last_heartbeat DESC"
        )
        .fetch_all(pool)
        .await
    }

    /// List all inactive sessions
    pub async fn list_inactive(pool: &DatabasePool) -> Result<Vec<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE is_active = 0 ORDER BY updated_at DESC"
        )
        .fetch_all(pool)
        .await
    }

    /// List sessions by user
    pub async fn list_by_user(
        pool: &DatabasePool,
        user_id: &str,
    ) -> Result<Vec<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = ? ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update session heartbeat
    pub async fn update_heartbeat(pool: &DatabasePool, id: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE sessions SET last_heartbeat = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Mark session as active
    pub async fn mark_active(pool: &DatabasePool, id: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE sessions SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(1)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Mark session as inactive
    pub async fn mark_inactive(pool: &DatabasePool, id: &str) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE sessions SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(0)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Update session user ID
    pub async fn update_user_id(
        pool: &DatabasePool,
        id: &str,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE sessions SET user_id = ?, updated_at = ? WHERE id = ?")
            .bind(user_id)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Update session metadata
    pub async fn update_metadata(
        pool: &DatabasePool,
        id: &str,
        metadata: &str,
    ) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE sessions SET metadata = ?, updated_at = ? WHERE id = ?")
            .bind(metadata)
            .bind(&now)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete a session
    pub async fn delete(pool: &DatabasePool, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete all inactive sessions
    pub async fn delete_inactive(pool: &DatabasePool) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM sessions WHERE is_active = 0")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Count total sessions
    pub async fn count(pool: &DatabasePool) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions")
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// Count active sessions
    pub async fn count_active(pool: &DatabasePool) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE is_active = 1")
            .fetch_one(pool)
            .await?;

        Ok(result.0)
    }

    /// List sessions with stale heartbeat (older than duration_secs)
    pub async fn list_stale(
        pool: &DatabasePool,
        duration_secs: i64,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let cutoff = Utc::now()
            .checked_sub_signed(chrono::Duration::seconds(duration_secs))
            .unwrap()
            .to_rfc3339();

        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE is_active = 1 AND last_heartbeat < ? ORDER BY last_heartbeat ASC"
        )
        .bind(&cutoff)
        .fetch_all(pool)
        .await
    }
}
