use crate::db::models::{DbNamespace, DbProject};
use crate::db::patch::ProjectPatch;
use crate::db::schema::SQLITE_INIT;
use crate::error::GlsyncError;
use chrono::Utc;
use glsync_schema::{RemoteProject, Visibility};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::{debug, info};

/// Outcome of an upsert, for the sync report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

/// Optional filters for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
}

/// CRUD over the local project mirror. Owns the SQLite pool; the pool is
/// there for connection robustness (busy timeout, validated acquire), not
/// parallel callers.
#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    /// Opens (creating if missing) the database and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self, GlsyncError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .test_before_acquire(true)
            .connect_with(connect_opts)
            .await?;

        apply_schema(&pool).await?;

        info!(database_url, "database initialized");
        Ok(Self { pool })
    }

    /// Inserts a new project (and its namespace, in the same transaction).
    ///
    /// Unlike `upsert`, an existing id is rejected with `DuplicateKey`.
    pub async fn create(&self, remote: &RemoteProject) -> Result<DbProject, GlsyncError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let res = sqlx::query(
            r"
            INSERT INTO projects (
                id, name, description, path_with_namespace, web_url,
                visibility, archived, created_at, last_activity_at, last_synced
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(remote.id)
        .bind(&remote.name)
        .bind(&remote.description)
        .bind(&remote.path_with_namespace)
        .bind(&remote.web_url)
        .bind(remote.visibility.as_str())
        .bind(remote.archived)
        .bind(remote.created_at)
        .bind(remote.last_activity_at)
        .bind(now)
        .execute(&mut *tx)
        .await;

        if let Err(sqlx::Error::Database(db_err)) = &res {
            if db_err.is_unique_violation() {
                return Err(GlsyncError::DuplicateKey(remote.id));
            }
        }
        res?;

        if let Some(ns) = &remote.namespace {
            insert_namespace(&mut tx, remote.id, ns).await?;
        }

        tx.commit().await?;
        debug!(id = remote.id, name = %remote.name, "project created");
        self.get(remote.id).await
    }

    /// Fetches one project by id.
    pub async fn get(&self, id: i64) -> Result<DbProject, GlsyncError> {
        sqlx::query_as::<_, DbProject>(
            r"
            SELECT id, name, description, path_with_namespace, web_url,
                   visibility, archived, created_at, last_activity_at, last_synced
            FROM projects
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(GlsyncError::NotFound(id))
    }

    /// The namespace row attached to a project, if any.
    pub async fn namespace_of(&self, project_id: i64) -> Result<Option<DbNamespace>, GlsyncError> {
        let row = sqlx::query_as::<_, DbNamespace>(
            r"
            SELECT id, project_id, name, path, kind, full_path
            FROM namespaces
            WHERE project_id = ?
            ",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lists stored projects, ordered by id.
    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<DbProject>, GlsyncError> {
        let visibility = filter.visibility.map(Visibility::as_str);
        let rows = sqlx::query_as::<_, DbProject>(
            r"
            SELECT id, name, description, path_with_namespace, web_url,
                   visibility, archived, created_at, last_activity_at, last_synced
            FROM projects
            WHERE (?1 IS NULL OR visibility = ?1)
              AND (?2 IS NULL OR archived = ?2)
            ORDER BY id
            ",
        )
        .bind(visibility)
        .bind(filter.archived)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Applies a partial update; absent fields keep their current value.
    pub async fn update(&self, id: i64, patch: &ProjectPatch) -> Result<DbProject, GlsyncError> {
        let now = Utc::now();
        let visibility = patch.visibility.map(Visibility::as_str);

        let res = sqlx::query(
            r"
            UPDATE projects
            SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                visibility = COALESCE(?, visibility),
                archived = COALESCE(?, archived),
                last_synced = ?
            WHERE id = ?
            ",
        )
        .bind(&patch.name)
        .bind(&patch.description)
        .bind(visibility)
        .bind(patch.archived)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(GlsyncError::NotFound(id));
        }
        debug!(id, "project updated");
        self.get(id).await
    }

    /// Deletes a project; namespace rows go with it via the FK cascade.
    /// Deleting an absent id fails with `NotFound` (re-delete included).
    pub async fn delete(&self, id: i64) -> Result<(), GlsyncError> {
        let res = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(GlsyncError::NotFound(id));
        }
        debug!(id, "project deleted");
        Ok(())
    }

    /// Inserts or updates a project keyed by its remote id, replacing the
    /// namespace row, all in one transaction. Used by sync: last write wins.
    pub async fn upsert(&self, remote: &RemoteProject) -> Result<Upserted, GlsyncError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM projects WHERE id = ?")
            .bind(remote.id)
            .fetch_optional(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO projects (
                id, name, description, path_with_namespace, web_url,
                visibility, archived, created_at, last_activity_at, last_synced
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                path_with_namespace = excluded.path_with_namespace,
                web_url = excluded.web_url,
                visibility = excluded.visibility,
                archived = excluded.archived,
                created_at = excluded.created_at,
                last_activity_at = excluded.last_activity_at,
                last_synced = excluded.last_synced
            ",
        )
        .bind(remote.id)
        .bind(&remote.name)
        .bind(&remote.description)
        .bind(&remote.path_with_namespace)
        .bind(&remote.web_url)
        .bind(remote.visibility.as_str())
        .bind(remote.archived)
        .bind(remote.created_at)
        .bind(remote.last_activity_at)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // Replace this project's namespace row wholesale; a stale row must
        // not survive the project moving between groups. Rows are keyed per
        // (namespace, project), so siblings sharing a group are untouched.
        sqlx::query("DELETE FROM namespaces WHERE project_id = ?")
            .bind(remote.id)
            .execute(&mut *tx)
            .await?;

        if let Some(ns) = &remote.namespace {
            insert_namespace(&mut tx, remote.id, ns).await?;
        }

        tx.commit().await?;

        let outcome = if existing.is_some() {
            Upserted::Updated
        } else {
            Upserted::Created
        };
        debug!(id = remote.id, ?outcome, "project upserted");
        Ok(outcome)
    }
}

async fn insert_namespace(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    project_id: i64,
    ns: &glsync_schema::RemoteNamespace,
) -> Result<(), GlsyncError> {
    sqlx::query(
        r"
        INSERT INTO namespaces (id, project_id, name, path, kind, full_path)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id, project_id) DO UPDATE SET
            name = excluded.name,
            path = excluded.path,
            kind = excluded.kind,
            full_path = excluded.full_path
        ",
    )
    .bind(ns.id)
    .bind(project_id)
    .bind(&ns.name)
    .bind(&ns.path)
    .bind(&ns.kind)
    .bind(&ns.full_path)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), GlsyncError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
