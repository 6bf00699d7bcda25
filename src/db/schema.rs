//! SQL DDL for initializing the database schema.

/// SQLite schema:
/// - `projects` table (one row per remote project, remote id as primary key)
/// - `namespaces` table (owning group/user of a project, cascade-deleted)
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Projects (remote-assigned id is the upsert key)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NULL,
    path_with_namespace TEXT NULL,
    web_url TEXT NULL,
    visibility TEXT NOT NULL DEFAULT 'private',
    archived INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NULL, -- RFC3339
    last_activity_at TEXT NULL, -- RFC3339
    last_synced TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_projects_visibility ON projects(visibility);

-- ---------------------------------------------------------------------------
-- Namespaces (scoped per project, removed with the parent row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS namespaces (
    id INTEGER NOT NULL,
    project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    path TEXT NOT NULL,
    kind TEXT NULL,
    full_path TEXT NULL,
    PRIMARY KEY (id, project_id)
);

CREATE INDEX IF NOT EXISTS idx_namespaces_project_id ON namespaces(project_id);
";
