//! Database schema and migrations for filevault.
//!
//! Migrations run in order; `schema_version` records which ones are applied.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    password    TEXT NOT NULL,           -- Argon2 hash
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: sessions issued by GET /connect
    r#"
CREATE TABLE sessions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    token_id    TEXT NOT NULL UNIQUE,    -- JWT `jti`
    expires_at  TEXT NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
"#,
    // v3: file/folder nodes
    //
    // AUTOINCREMENT keeps ids strictly increasing and never reused, so 0 stays
    // free as the root sentinel and a deleted folder's id cannot be handed to
    // a new node that would then adopt its orphaned children.
    r#"
CREATE TABLE nodes (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL,
    name        TEXT NOT NULL,
    node_type   TEXT NOT NULL CHECK (node_type IN ('folder', 'file', 'image')),
    is_public   INTEGER NOT NULL DEFAULT 0,
    parent_id   INTEGER NOT NULL DEFAULT 0,
    local_path  TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_nodes_owner_parent ON nodes(user_id, parent_id, id);
"#,
];
