//! Node metadata store.

use async_trait::async_trait;

use super::node::{NewNode, Node};
use crate::db::DbPool;
use crate::{Result, VaultError};

const NODE_COLUMNS: &str =
    "id, user_id, name, node_type, is_public, parent_id, local_path, created_at";

/// Persistence for node records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a node and return it with its assigned ID.
    async fn insert(&self, node: &NewNode) -> Result<Node>;

    /// Get a node by ID.
    async fn get(&self, id: i64) -> Result<Option<Node>>;

    /// List an owner's nodes under `parent_id` in insertion order.
    async fn list_by_parent(
        &self,
        owner: i64,
        parent_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Node>>;

    /// Set the visibility flag. Returns `false` if no such node exists.
    async fn set_public(&self, id: i64, is_public: bool) -> Result<bool>;

    /// Delete a node record. Returns `false` if no such node exists.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Count all nodes.
    async fn count(&self) -> Result<i64>;
}

/// SQLite-backed metadata store.
#[derive(Clone)]
pub struct NodeRepository {
    pool: DbPool,
}

impl NodeRepository {
    /// Create a new repository on the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for NodeRepository {
    async fn insert(&self, node: &NewNode) -> Result<Node> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO nodes (user_id, name, node_type, is_public, parent_id, local_path)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(node.user_id)
        .bind(&node.name)
        .bind(node.node_type.as_str())
        .bind(node.is_public)
        .bind(node.parent_id)
        .bind(&node.local_path)
        .fetch_one(&self.pool)
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| VaultError::NotFound("node".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Node>> {
        let sql = format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?");
        let node = sqlx::query_as::<_, Node>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(node)
    }

    async fn list_by_parent(
        &self,
        owner: i64,
        parent_id: i64,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Node>> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM nodes
             WHERE user_id = ? AND parent_id = ?
             ORDER BY id
             LIMIT ? OFFSET ?"
        );
        let nodes = sqlx::query_as::<_, Node>(&sql)
            .bind(owner)
            .bind(parent_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(nodes)
    }

    async fn set_public(&self, id: i64, is_public: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE nodes SET is_public = ? WHERE id = ?")
            .bind(is_public)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM nodes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nodes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
